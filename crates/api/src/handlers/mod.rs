pub mod defense;
pub mod evaluation;
pub mod proposal;

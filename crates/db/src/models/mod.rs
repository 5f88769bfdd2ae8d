//! Database row structs.
//!
//! Each submodule holds `FromRow` structs mirroring one or more tables,
//! plus conversions into the `tesis-core` domain types. Status and role
//! columns are stored as text and parsed on the way out; a value that does
//! not parse means the row was written outside this crate and is reported
//! as a store error.

pub mod defense;
pub mod evaluation;
pub mod proposal;

use tesis_core::error::CoreError;
use tesis_core::types::DbId;

/// Re-tag a parse failure on a stored column as a store error.
pub(crate) fn corrupt_row<T>(
    table: &'static str,
    id: DbId,
    parsed: Result<T, CoreError>,
) -> Result<T, CoreError> {
    parsed.map_err(|e| CoreError::Store(format!("Corrupt {table} row {id}: {e}")))
}

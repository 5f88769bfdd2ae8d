//! Request extractors: identity, role checks and JSON bodies.
//!
//! - [`auth::AuthUser`] -- the evaluator identified by the Bearer token.
//! - [`rbac::RequireFinalizer`] -- requires `DIRECTOR` or `COORDINADOR`.
//! - [`rbac::RequireAuth`] -- requires any authenticated evaluator.
//! - [`json::AppJson`] -- JSON body with envelope-shaped rejections.

pub mod auth;
pub mod json;
pub mod rbac;

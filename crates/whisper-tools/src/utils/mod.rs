//! Shared helpers for operation definitions and parameter parsing.

pub mod schema;
pub mod validation;

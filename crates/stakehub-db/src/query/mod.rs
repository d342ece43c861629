//! Query helper layer
//!
//! Builds parameterized SQL from a closed set of filter operators and
//! mutations. Every value travels as a `$n` parameter; identifiers are
//! double-quoted.

mod builder;
mod casing;
mod filter;
mod value;

pub use builder::{
    count, delete, group_by, insert, select, sum, update, BuiltQuery, SelectBuilder,
    SortDirection,
};
pub use casing::{keys_to_camel_case, keys_to_snake_case, to_camel_case, to_snake_case, to_snake_case_value};
pub use filter::{Filter, FilterOp, UpdateOp};
pub use value::SqlValue;

use crate::error::DbError;

/// Double-quote an identifier, doubling embedded quotes
///
/// # Errors
/// `DbError::InvalidQuery` for an empty identifier
pub fn quote_ident(name: &str) -> Result<String, DbError> {
    if name.trim().is_empty() {
        return Err(DbError::InvalidQuery("empty identifier".to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

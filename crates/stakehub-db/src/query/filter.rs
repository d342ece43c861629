//! Filter conditions and column mutations

use super::quote_ident;
use super::value::SqlValue;
use crate::error::DbError;

/// Comparison applied to one column
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Eq(SqlValue),
    In(Vec<SqlValue>),
    NotIn(Vec<SqlValue>),
    Lt(SqlValue),
    Lte(SqlValue),
    Gt(SqlValue),
    Gte(SqlValue),
    /// Case-insensitive substring match
    Contains(String),
    /// Case-insensitive prefix match
    StartsWith(String),
    /// Case-insensitive suffix match
    EndsWith(String),
    Not(SqlValue),
    /// `true` for `IS NULL`, `false` for `IS NOT NULL`
    IsNull(bool),
}

/// Change applied to one column by an update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Set(SqlValue),
    Increment(SqlValue),
    Decrement(SqlValue),
    /// Stored as JSONB
    Json(serde_json::Value),
}

/// Conjunction of column conditions. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, FilterOp)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition
    pub fn and(mut self, column: impl Into<String>, op: FilterOp) -> Self {
        self.conditions.push((column.into(), op));
        self
    }

    /// Shorthand for an equality condition
    pub fn eq(self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.and(column, FilterOp::Eq(value.into()))
    }

    /// Add a condition only when a value is present
    pub fn and_some<T>(self, column: &str, value: Option<T>, op: impl FnOnce(T) -> FilterOp) -> Self {
        match value {
            Some(v) => self.and(column, op(v)),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render as ` WHERE ...` (or nothing when empty), pushing values into `params`
    pub(crate) fn render_where(&self, params: &mut Params) -> Result<String, DbError> {
        if self.conditions.is_empty() {
            return Ok(String::new());
        }

        let clauses = self
            .conditions
            .iter()
            .map(|(column, op)| render_condition(&quote_ident(column)?, op, params))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!(" WHERE {}", clauses.join(" AND ")))
    }
}

/// Collected parameters; hands out `$n` placeholders in order
#[derive(Debug, Default)]
pub(crate) struct Params {
    pub(crate) values: Vec<SqlValue>,
}

impl Params {
    /// Placeholder for `value`, or `NULL` for a null value
    pub(crate) fn push(&mut self, value: &SqlValue) -> String {
        if value.is_null() {
            return "NULL".to_string();
        }
        self.values.push(value.clone());
        format!("${}", self.values.len())
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn render_list(
    col: &str,
    values: &[SqlValue],
    keyword: &str,
    when_empty: &str,
    params: &mut Params,
) -> String {
    if values.is_empty() {
        return when_empty.to_string();
    }
    let placeholders: Vec<String> = values.iter().map(|v| params.push(v)).collect();
    format!("{col} {keyword} ({})", placeholders.join(", "))
}

fn render_condition(col: &str, op: &FilterOp, params: &mut Params) -> Result<String, DbError> {
    let compare = |sym: &str, v: &SqlValue, params: &mut Params| -> Result<String, DbError> {
        if v.is_null() {
            return Err(DbError::InvalidQuery(format!(
                "cannot compare {col} {sym} NULL"
            )));
        }
        Ok(format!("{col} {sym} {}", params.push(v)))
    };

    match op {
        FilterOp::Eq(v) if v.is_null() => Ok(format!("{col} IS NULL")),
        FilterOp::Eq(v) => compare("=", v, params),
        FilterOp::Not(v) if v.is_null() => Ok(format!("{col} IS NOT NULL")),
        FilterOp::Not(v) => compare("<>", v, params),
        FilterOp::In(values) => Ok(render_list(col, values, "IN", "FALSE", params)),
        FilterOp::NotIn(values) => Ok(render_list(col, values, "NOT IN", "TRUE", params)),
        FilterOp::Lt(v) => compare("<", v, params),
        FilterOp::Lte(v) => compare("<=", v, params),
        FilterOp::Gt(v) => compare(">", v, params),
        FilterOp::Gte(v) => compare(">=", v, params),
        FilterOp::Contains(s) => Ok(format!(
            "{col} ILIKE {}",
            params.push(&SqlValue::Text(format!("%{}%", escape_like(s))))
        )),
        FilterOp::StartsWith(s) => Ok(format!(
            "{col} ILIKE {}",
            params.push(&SqlValue::Text(format!("{}%", escape_like(s))))
        )),
        FilterOp::EndsWith(s) => Ok(format!(
            "{col} ILIKE {}",
            params.push(&SqlValue::Text(format!("%{}", escape_like(s))))
        )),
        FilterOp::IsNull(true) => Ok(format!("{col} IS NULL")),
        FilterOp::IsNull(false) => Ok(format!("{col} IS NOT NULL")),
    }
}

impl UpdateOp {
    /// Render the right-hand side of `"col" = ...`
    pub(crate) fn render(&self, col: &str, params: &mut Params) -> String {
        match self {
            Self::Set(v) => params.push(v),
            Self::Increment(v) => format!("COALESCE({col}, 0) + {}", params.push(v)),
            Self::Decrement(v) => format!("COALESCE({col}, 0) - {}", params.push(v)),
            Self::Json(v) => format!("{}::jsonb", params.push(&SqlValue::Json(v.clone()))),
        }
    }
}

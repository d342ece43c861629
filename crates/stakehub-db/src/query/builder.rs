//! SQL statement builders

use sqlx::postgres::{PgArguments, PgPool, PgRow};
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::{FromRow, Postgres};

use super::filter::{Filter, Params, UpdateOp};
use super::quote_ident;
use super::value::SqlValue;
use crate::error::DbError;

/// A finished statement and its parameters in `$n` order
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

macro_rules! bind_all {
    ($query:expr, $params:expr) => {{
        let mut q = $query;
        for value in $params {
            q = match value {
                // Rendered inline, never bound
                SqlValue::Null => q,
                SqlValue::Bool(v) => q.bind(*v),
                SqlValue::Int(v) => q.bind(*v),
                SqlValue::Float(v) => q.bind(*v),
                SqlValue::Text(v) => q.bind(v.as_str()),
                SqlValue::Timestamp(v) => q.bind(*v),
                SqlValue::Json(v) => q.bind(sqlx::types::Json(v.clone())),
            };
        }
        q
    }};
}

impl BuiltQuery {
    /// Bind onto a plain query
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        bind_all!(sqlx::query(&self.sql), &self.params)
    }

    /// Bind onto a typed query
    pub fn query_as<O>(&self) -> QueryAs<'_, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        bind_all!(sqlx::query_as::<_, O>(&self.sql), &self.params)
    }

    /// Bind onto a single-column query
    pub fn query_scalar<O>(&self) -> QueryScalar<'_, Postgres, O, PgArguments>
    where
        (O,): for<'r> FromRow<'r, PgRow>,
    {
        bind_all!(sqlx::query_scalar::<_, O>(&self.sql), &self.params)
    }

    /// Wrap the statement so each result row comes back as a JSON object
    pub fn as_json_rows(&self) -> BuiltQuery {
        BuiltQuery {
            sql: format!("WITH q AS ({}) SELECT row_to_json(q) FROM q", self.sql),
            params: self.params.clone(),
        }
    }

    /// Fetch all rows as JSON objects keyed by column name
    ///
    /// # Errors
    /// Driver errors
    pub async fn fetch_json(&self, pool: &PgPool) -> Result<Vec<serde_json::Value>, sqlx::Error> {
        let wrapped = self.as_json_rows();
        wrapped
            .query_scalar::<serde_json::Value>()
            .fetch_all(pool)
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// `SELECT` builder
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    columns: Vec<String>,
    filter: Filter,
    order_by: Vec<(String, SortDirection)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Start a `SELECT` on `table`
pub fn select(table: impl Into<String>) -> SelectBuilder {
    SelectBuilder {
        table: table.into(),
        columns: Vec::new(),
        filter: Filter::new(),
        order_by: Vec::new(),
        limit: None,
        offset: None,
    }
}

impl SelectBuilder {
    /// Restrict the projection; all columns otherwise
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// # Errors
    /// `DbError::InvalidQuery` for empty identifiers or null comparisons
    pub fn build(&self) -> Result<BuiltQuery, DbError> {
        let mut params = Params::default();

        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            quote_list(&self.columns)?
        };

        let mut sql = format!(
            "SELECT {projection} FROM {}{}",
            quote_ident(&self.table)?,
            self.filter.render_where(&mut params)?
        );

        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|(c, d)| Ok(format!("{} {}", quote_ident(c)?, d.as_sql())))
                .collect::<Result<Vec<_>, DbError>>()?;
            sql.push_str(&format!(" ORDER BY {}", order.join(", ")));
        }

        if let Some(limit) = self.limit {
            let p = params.push(&SqlValue::Int(limit));
            sql.push_str(&format!(" LIMIT {p}"));
        }
        if let Some(offset) = self.offset {
            let p = params.push(&SqlValue::Int(offset));
            sql.push_str(&format!(" OFFSET {p}"));
        }

        Ok(BuiltQuery {
            sql,
            params: params.values,
        })
    }
}

fn quote_list(columns: &[String]) -> Result<String, DbError> {
    Ok(columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Result<Vec<_>, _>>()?
        .join(", "))
}

/// `INSERT ... RETURNING *`
///
/// # Errors
/// `DbError::InvalidQuery` for empty identifiers
pub fn insert(table: &str, values: &[(&str, SqlValue)]) -> Result<BuiltQuery, DbError> {
    let table = quote_ident(table)?;

    if values.is_empty() {
        return Ok(BuiltQuery {
            sql: format!("INSERT INTO {table} DEFAULT VALUES RETURNING *"),
            params: Vec::new(),
        });
    }

    let mut params = Params::default();
    let mut columns = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (column, value) in values {
        columns.push(quote_ident(column)?);
        placeholders.push(params.push(value));
    }

    Ok(BuiltQuery {
        sql: format!(
            "INSERT INTO {table} ({}) VALUES ({}) RETURNING *",
            columns.join(", "),
            placeholders.join(", ")
        ),
        params: params.values,
    })
}

/// `UPDATE ... RETURNING *`
///
/// # Errors
/// `DbError::InvalidQuery` when there is nothing to set or an identifier is empty
pub fn update(
    table: &str,
    changes: &[(&str, UpdateOp)],
    filter: &Filter,
) -> Result<BuiltQuery, DbError> {
    if changes.is_empty() {
        return Err(DbError::InvalidQuery("update without changes".to_string()));
    }

    let mut params = Params::default();
    let assignments = changes
        .iter()
        .map(|(column, op)| {
            let col = quote_ident(column)?;
            let rhs = op.render(&col, &mut params);
            Ok(format!("{col} = {rhs}"))
        })
        .collect::<Result<Vec<_>, DbError>>()?;

    let sql = format!(
        "UPDATE {} SET {}{} RETURNING *",
        quote_ident(table)?,
        assignments.join(", "),
        filter.render_where(&mut params)?
    );

    Ok(BuiltQuery {
        sql,
        params: params.values,
    })
}

/// `DELETE`
///
/// # Errors
/// `DbError::InvalidQuery` for empty identifiers
pub fn delete(table: &str, filter: &Filter) -> Result<BuiltQuery, DbError> {
    let mut params = Params::default();
    let sql = format!(
        "DELETE FROM {}{}",
        quote_ident(table)?,
        filter.render_where(&mut params)?
    );
    Ok(BuiltQuery {
        sql,
        params: params.values,
    })
}

/// `SELECT COUNT(*) AS "count"`
///
/// # Errors
/// `DbError::InvalidQuery` for empty identifiers
pub fn count(table: &str, filter: &Filter) -> Result<BuiltQuery, DbError> {
    let mut params = Params::default();
    let sql = format!(
        "SELECT COUNT(*) AS \"count\" FROM {}{}",
        quote_ident(table)?,
        filter.render_where(&mut params)?
    );
    Ok(BuiltQuery {
        sql,
        params: params.values,
    })
}

/// `SELECT COALESCE(SUM(col), 0) AS "sum"`
///
/// # Errors
/// `DbError::InvalidQuery` for empty identifiers
pub fn sum(table: &str, column: &str, filter: &Filter) -> Result<BuiltQuery, DbError> {
    let mut params = Params::default();
    let sql = format!(
        "SELECT COALESCE(SUM({}), 0) AS \"sum\" FROM {}{}",
        quote_ident(column)?,
        quote_ident(table)?,
        filter.render_where(&mut params)?
    );
    Ok(BuiltQuery {
        sql,
        params: params.values,
    })
}

/// Row counts per distinct combination of `columns`
///
/// # Errors
/// `DbError::InvalidQuery` when no column is given or an identifier is empty
pub fn group_by(table: &str, columns: &[&str], filter: &Filter) -> Result<BuiltQuery, DbError> {
    if columns.is_empty() {
        return Err(DbError::InvalidQuery("group by without columns".to_string()));
    }

    let owned: Vec<String> = columns.iter().map(|c| (*c).to_string()).collect();
    let cols = quote_list(&owned)?;

    let mut params = Params::default();
    let sql = format!(
        "SELECT {cols}, COUNT(*) AS \"count\" FROM {}{} GROUP BY {cols} ORDER BY {cols}",
        quote_ident(table)?,
        filter.render_where(&mut params)?
    );
    Ok(BuiltQuery {
        sql,
        params: params.values,
    })
}

use crate::sql_dialect::SqlDialect;
use crate::Value;

/// Reference to a table in the public schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn quoted(&self, dialect: &dyn SqlDialect) -> String {
        dialect.quote_identifier(&self.name)
    }
}

/// Equality filter contributed by a sidebar widget.
#[derive(Debug, Clone, PartialEq)]
pub struct EqFilter {
    pub column: String,
    pub value: Value,
}

impl EqFilter {
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// A read query over one table: explicit column list, optional equality
/// filters, optional row bound.
///
/// Identifiers are interpolated into the SQL text, so callers must
/// validate table and column names against the schema listing before
/// building; the builder itself always quotes them.
#[derive(Debug, Clone)]
pub struct SelectRequest {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub filters: Vec<EqFilter>,
    pub limit: Option<u32>,
}

impl SelectRequest {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            columns: Vec::new(),
            filters: Vec::new(),
            limit: None,
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_filters(mut self, filters: Vec<EqFilter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build_sql(&self, dialect: &dyn SqlDialect) -> String {
        let column_list = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| dialect.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!(
            "SELECT {} FROM {}",
            column_list,
            self.table.quoted(dialect)
        );

        if !self.filters.is_empty() {
            let conditions: Vec<String> = self
                .filters
                .iter()
                .map(|f| {
                    let column = dialect.quote_identifier(&f.column);
                    if f.value.is_null() {
                        format!("{} IS NULL", column)
                    } else {
                        format!("{} = {}", column, dialect.value_to_literal(&f.value))
                    }
                })
                .collect();

            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }
}

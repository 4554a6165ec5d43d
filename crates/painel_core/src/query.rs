use crate::Value;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for executing a SQL statement.
///
/// No statement timeout and no cancellation token: the transport's own
/// behavior is trusted end to end.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// The SQL text to execute.
    pub sql: String,

    /// Bind parameters for parameterized statements.
    pub params: Vec<Value>,

    /// Upper bound on returned rows, applied by the driver on top of any
    /// LIMIT already present in the SQL text.
    pub limit: Option<u32>,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A single row of query results.
pub type Row = Vec<Value>;

/// Metadata for a result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name as returned by the database.
    pub name: String,

    /// Database-specific type name (e.g., "varchar", "int4").
    pub type_name: String,

    /// Whether the column allows NULL values.
    pub nullable: bool,
}

impl ColumnMeta {
    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
        }
    }
}

/// Result of executing a SQL statement.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Metadata for each column in the result set.
    pub columns: Vec<ColumnMeta>,

    /// Row data; each row's values match `columns` order.
    pub rows: Vec<Row>,

    /// Rows affected by a write statement. `None` for reads.
    pub affected_rows: Option<u64>,

    /// Wall-clock time the driver spent executing.
    pub execution_time: Duration,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: None,
            execution_time: Duration::ZERO,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

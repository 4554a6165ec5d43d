use painel_core::{ColumnMeta, QueryResult, Row, Value};
use std::time::Duration;

/// Build a result set with the given column names and rows.
pub fn result_with(columns: &[&str], rows: Vec<Row>) -> QueryResult {
    QueryResult {
        columns: columns
            .iter()
            .map(|name| ColumnMeta::named(*name, "text"))
            .collect(),
        rows,
        affected_rows: None,
        execution_time: Duration::from_millis(1),
    }
}

/// A row of text cells.
pub fn text_row(cells: &[&str]) -> Row {
    cells
        .iter()
        .map(|c| Value::Text(c.to_string()))
        .collect()
}

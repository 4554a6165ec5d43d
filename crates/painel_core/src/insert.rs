use crate::select::TableRef;
use crate::sql_dialect::SqlDialect;
use crate::Value;

/// A single-row insert. Values are always bound as parameters, never
/// interpolated into the SQL text; only validated identifiers are.
#[derive(Debug, Clone)]
pub struct InsertStatement {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl InsertStatement {
    pub fn new(table: TableRef, columns: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            table,
            columns,
            values,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.columns.is_empty() && self.columns.len() == self.values.len()
    }

    /// Build `INSERT INTO "t" ("c1", "c2") VALUES ($1, $2)`.
    ///
    /// Returns `None` for an empty or mismatched column/value list.
    pub fn to_sql(&self, dialect: &dyn SqlDialect) -> Option<String> {
        if !self.is_valid() {
            return None;
        }

        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| dialect.quote_identifier(c))
            .collect();

        let style = dialect.placeholder_style();
        let placeholders: Vec<String> = (1..=self.values.len())
            .map(|i| style.placeholder(i))
            .collect();

        Some(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table.quoted(dialect),
            columns.join(", "),
            placeholders.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_dialect::PostgresDialect;

    #[test]
    fn builds_parameterized_insert() {
        let stmt = InsertStatement::new(
            TableRef::new("vendas"),
            vec!["produto".to_string(), "valor".to_string()],
            vec![Value::Text("Teclado".to_string()), Value::Float(150.5)],
        );

        assert_eq!(
            stmt.to_sql(&PostgresDialect).unwrap(),
            "INSERT INTO \"vendas\" (\"produto\", \"valor\") VALUES ($1, $2)"
        );
    }

    #[test]
    fn empty_columns_build_nothing() {
        let stmt = InsertStatement::new(TableRef::new("vendas"), vec![], vec![]);
        assert!(stmt.to_sql(&PostgresDialect).is_none());
    }

    #[test]
    fn mismatched_lengths_build_nothing() {
        let stmt = InsertStatement::new(
            TableRef::new("vendas"),
            vec!["produto".to_string()],
            vec![Value::Int(1), Value::Int(2)],
        );
        assert!(stmt.to_sql(&PostgresDialect).is_none());
    }

    #[test]
    fn identifiers_are_quoted() {
        let stmt = InsertStatement::new(
            TableRef::new("my\"table"),
            vec!["a".to_string()],
            vec![Value::Null],
        );

        assert_eq!(
            stmt.to_sql(&PostgresDialect).unwrap(),
            "INSERT INTO \"my\"\"table\" (\"a\") VALUES ($1)"
        );
    }
}

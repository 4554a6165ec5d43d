use crate::{
    ColumnMeta, ConnectionProfile, DbError, InsertStatement, QueryRequest, QueryResult, TableRef,
};

/// Factory for creating database connections.
///
/// One implementation per engine; the explorer only ever sees the
/// trait objects.
pub trait DbDriver: Send + Sync {
    /// Create a connection.
    ///
    /// The password is provided separately from the profile so that
    /// credentials live in the secret store, never in serialized config.
    fn connect(
        &self,
        profile: &ConnectionProfile,
        password: Option<&str>,
    ) -> Result<Box<dyn Connection>, DbError>;

    /// Test if a connection can be established without keeping it open.
    fn test_connection(
        &self,
        profile: &ConnectionProfile,
        password: Option<&str>,
    ) -> Result<(), DbError> {
        let conn = self.connect(profile, password)?;
        conn.ping()
    }
}

/// Active database connection.
///
/// Implementations must be thread-safe: many sessions issue statements
/// through one shared handle, and the connection may hold its internal
/// lock for at most a single statement.
pub trait Connection: Send + Sync {
    /// Check if the connection is still alive (`SELECT 1` or similar).
    fn ping(&self) -> Result<(), DbError>;

    /// Execute a statement and collect the full result set.
    fn execute(&self, req: &QueryRequest) -> Result<QueryResult, DbError>;

    /// List tables in the public schema via catalog introspection,
    /// ordered by name.
    fn list_tables(&self) -> Result<Vec<String>, DbError>;

    /// Discover a table's columns with a zero-row probe; the probe is
    /// prepared but never executed.
    fn table_columns(&self, table: &TableRef) -> Result<Vec<ColumnMeta>, DbError>;

    /// Execute a parameterized single-row insert inside a transaction
    /// that commits or rolls back atomically. Returns rows affected.
    fn insert_row(&self, stmt: &InsertStatement) -> Result<u64, DbError>;

    /// On-disk size of a table in bytes, via the engine's own
    /// size-reporting facility.
    fn table_disk_size(&self, table: &TableRef) -> Result<i64, DbError>;

    /// Close the connection and release resources.
    fn close(&mut self) -> Result<(), DbError> {
        Ok(())
    }
}

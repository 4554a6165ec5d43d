use painel_core::{
    ColumnMeta, Connection, ConnectionProfile, DbDriver, DbError, InsertStatement, QueryRequest,
    QueryResult, TableRef,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

#[derive(Clone)]
enum FakeOutcome {
    Success(QueryResult),
    Error(String),
}

#[derive(Default)]
struct FakeState {
    tables: RwLock<Vec<String>>,
    columns: RwLock<HashMap<String, Vec<ColumnMeta>>>,
    table_sizes: RwLock<HashMap<String, i64>>,
    query_outcomes: RwLock<HashMap<String, FakeOutcome>>,
    default_outcome: RwLock<Option<FakeOutcome>>,
    executed: Mutex<Vec<String>>,
    inserts: Mutex<Vec<InsertStatement>>,
    insert_error: RwLock<Option<String>>,
    connect_error: RwLock<Option<String>>,
    connect_calls: AtomicUsize,
}

/// Scripted in-memory driver for cache and controller tests.
///
/// Clones share state, so a test can keep the driver, hand a connection
/// to the code under test, and observe what was executed.
#[derive(Clone, Default)]
pub struct FakeDriver {
    state: Arc<FakeState>,
}

fn read<'a, T>(lock: &'a RwLock<T>) -> std::sync::RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<'a, T>(lock: &'a RwLock<T>) -> std::sync::RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn locked<'a, T>(lock: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|e| e.into_inner())
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(self, tables: &[&str]) -> Self {
        *write(&self.state.tables) = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_columns(self, table: &str, columns: &[&str]) -> Self {
        let metas = columns
            .iter()
            .map(|name| ColumnMeta::named(*name, "text"))
            .collect();
        write(&self.state.columns).insert(table.to_string(), metas);
        self
    }

    pub fn with_table_size(self, table: &str, bytes: i64) -> Self {
        write(&self.state.table_sizes).insert(table.to_string(), bytes);
        self
    }

    pub fn with_query_result(self, sql: impl Into<String>, result: QueryResult) -> Self {
        write(&self.state.query_outcomes).insert(sql.into(), FakeOutcome::Success(result));
        self
    }

    pub fn with_query_error(self, sql: impl Into<String>, message: impl Into<String>) -> Self {
        write(&self.state.query_outcomes).insert(sql.into(), FakeOutcome::Error(message.into()));
        self
    }

    pub fn with_default_result(self, result: QueryResult) -> Self {
        *write(&self.state.default_outcome) = Some(FakeOutcome::Success(result));
        self
    }

    pub fn with_insert_error(self, message: impl Into<String>) -> Self {
        *write(&self.state.insert_error) = Some(message.into());
        self
    }

    pub fn with_connect_error(self, message: impl Into<String>) -> Self {
        *write(&self.state.connect_error) = Some(message.into());
        self
    }

    /// Replace the scripted outcome for one statement mid-test.
    pub fn set_query_result(&self, sql: impl Into<String>, result: QueryResult) {
        write(&self.state.query_outcomes).insert(sql.into(), FakeOutcome::Success(result));
    }

    /// Every statement executed so far, in order.
    pub fn executed_statements(&self) -> Vec<String> {
        locked(&self.state.executed).clone()
    }

    /// How many times one exact statement has been executed.
    pub fn execution_count(&self, sql: &str) -> usize {
        locked(&self.state.executed)
            .iter()
            .filter(|s| s.as_str() == sql)
            .count()
    }

    /// Every insert that reached the connection, in order.
    pub fn inserts(&self) -> Vec<InsertStatement> {
        locked(&self.state.inserts).clone()
    }

    /// How many times `connect` was attempted.
    pub fn connect_count(&self) -> usize {
        self.state.connect_calls.load(Ordering::Relaxed)
    }

    pub fn connection(&self) -> FakeConnection {
        FakeConnection {
            state: self.state.clone(),
        }
    }
}

impl DbDriver for FakeDriver {
    fn connect(
        &self,
        _profile: &ConnectionProfile,
        _password: Option<&str>,
    ) -> Result<Box<dyn Connection>, DbError> {
        self.state.connect_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(message) = read(&self.state.connect_error).clone() {
            return Err(DbError::Configuration(message));
        }

        Ok(Box::new(self.connection()))
    }
}

pub struct FakeConnection {
    state: Arc<FakeState>,
}

impl Connection for FakeConnection {
    fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    fn execute(&self, req: &QueryRequest) -> Result<QueryResult, DbError> {
        locked(&self.state.executed).push(req.sql.clone());

        let outcome = read(&self.state.query_outcomes)
            .get(&req.sql)
            .cloned()
            .or_else(|| read(&self.state.default_outcome).clone());

        match outcome {
            Some(FakeOutcome::Success(result)) => Ok(result),
            Some(FakeOutcome::Error(message)) => Err(DbError::QueryExecution(message)),
            None => Err(DbError::QueryExecution(format!(
                "no scripted result for: {}",
                req.sql
            ))),
        }
    }

    fn list_tables(&self) -> Result<Vec<String>, DbError> {
        Ok(read(&self.state.tables).clone())
    }

    fn table_columns(&self, table: &TableRef) -> Result<Vec<ColumnMeta>, DbError> {
        read(&self.state.columns)
            .get(&table.name)
            .cloned()
            .ok_or_else(|| DbError::Schema(format!("relation \"{}\" does not exist", table.name)))
    }

    fn insert_row(&self, stmt: &InsertStatement) -> Result<u64, DbError> {
        if let Some(message) = read(&self.state.insert_error).clone() {
            return Err(DbError::Write(message));
        }

        locked(&self.state.inserts).push(stmt.clone());
        Ok(1)
    }

    fn table_disk_size(&self, table: &TableRef) -> Result<i64, DbError> {
        Ok(read(&self.state.table_sizes)
            .get(&table.name)
            .copied()
            .unwrap_or(0))
    }
}

/// Per-session mutable state, owned by the session that created it.
///
/// Distinct from the process-wide caches: every interactive session gets
/// its own instance at start and drops it at end. No locking; only the
/// owning session mutates it.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    queries_run: u64,
    visited_tables: Vec<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one explicit run action. Called before execution, so failed
    /// and cache-served runs count the same as fresh ones.
    pub fn record_run(&mut self) -> u64 {
        self.queries_run += 1;
        self.queries_run
    }

    /// Remember a visited table, keeping first-seen order without
    /// duplicates.
    pub fn record_table_visit(&mut self, table: &str) {
        if !self.visited_tables.iter().any(|t| t == table) {
            self.visited_tables.push(table.to_string());
        }
    }

    pub fn queries_run(&self) -> u64 {
        self.queries_run
    }

    pub fn visited_tables(&self) -> &[String] {
        &self.visited_tables
    }
}

use crate::query_safety::is_read_only_query;
use crate::{
    ColumnMeta, DbError, EqFilter, Handle, HistoryEntry, HistoryStore, InsertStatement,
    QueryCache, QueryRequest, QueryResult, SchemaCache, SelectRequest, SessionContext, SqlDialect,
    TableRef, Value,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Row bound applied to interactive explorer reads.
pub const DEFAULT_ROW_LIMIT: u32 = 100;

/// How many of the table's leading columns the insert form binds.
pub const INSERT_FORM_FIELDS: usize = 4;

const DEFAULT_COLUMN_COUNT: usize = 3;

/// Where the explorer currently sits in its select/run/insert cycle.
///
/// Querying and inserting are transient: a failed run or insert lands
/// back in `ColumnsSelected`, a committed insert reloads the table view.
#[derive(Debug, Clone)]
pub enum ExplorerState {
    Idle,
    TableSelected {
        table: TableRef,
        columns: Vec<ColumnMeta>,
    },
    ColumnsSelected {
        table: TableRef,
        columns: Vec<ColumnMeta>,
        selected: Vec<String>,
    },
    Rendered {
        table: TableRef,
        columns: Vec<ColumnMeta>,
        selected: Vec<String>,
    },
}

impl ExplorerState {
    fn table(&self) -> Option<&TableRef> {
        match self {
            ExplorerState::Idle => None,
            ExplorerState::TableSelected { table, .. }
            | ExplorerState::ColumnsSelected { table, .. }
            | ExplorerState::Rendered { table, .. } => Some(table),
        }
    }

    fn columns(&self) -> Option<&[ColumnMeta]> {
        match self {
            ExplorerState::Idle => None,
            ExplorerState::TableSelected { columns, .. }
            | ExplorerState::ColumnsSelected { columns, .. }
            | ExplorerState::Rendered { columns, .. } => Some(columns),
        }
    }
}

/// What a successful run hands back for display, export and audit.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// The (possibly cache-served) result set.
    pub result: Arc<QueryResult>,

    /// The generated SQL text, for transparency.
    pub sql: String,

    /// Wall-clock time of the run as the user saw it, cache hits
    /// included.
    pub elapsed: Duration,
}

impl QueryOutcome {
    pub fn row_count(&self) -> usize {
        self.result.row_count()
    }
}

/// Drives the UI-to-query pipeline: validates selections against the
/// schema listing, builds SQL, consults the query cache, runs inserts
/// and invalidates after writes.
///
/// One controller per session; the caches behind it are shared
/// process-wide.
pub struct ExplorerController {
    handle: Handle,
    schema: Arc<SchemaCache>,
    queries: Arc<QueryCache>,
    dialect: Box<dyn SqlDialect>,
    session: SessionContext,
    history: Option<HistoryStore>,
    row_limit: u32,
    state: ExplorerState,
    last_outcome: Option<QueryOutcome>,
}

impl ExplorerController {
    pub fn new(
        handle: Handle,
        schema: Arc<SchemaCache>,
        queries: Arc<QueryCache>,
        dialect: Box<dyn SqlDialect>,
    ) -> Self {
        Self {
            handle,
            schema,
            queries,
            dialect,
            session: SessionContext::new(),
            history: None,
            row_limit: DEFAULT_ROW_LIMIT,
            state: ExplorerState::Idle,
            last_outcome: None,
        }
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_row_limit(mut self, limit: u32) -> Self {
        self.row_limit = limit;
        self
    }

    pub fn state(&self) -> &ExplorerState {
        &self.state
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn last_outcome(&self) -> Option<&QueryOutcome> {
        self.last_outcome.as_ref()
    }

    /// Tables available for selection, from the memoized listing.
    pub fn list_tables(&self) -> Result<Arc<Vec<String>>, DbError> {
        self.schema.list_tables(&self.handle)
    }

    /// Pick a table. The name must appear in the schema listing; unknown
    /// names are rejected before any SQL is built. Discovers columns and
    /// records the visit in the session history.
    pub fn select_table(&mut self, name: &str) -> Result<Vec<ColumnMeta>, DbError> {
        if !self.schema.is_known_table(&self.handle, name)? {
            return Err(DbError::Validation(format!("Unknown table: {name}")));
        }

        let table = TableRef::new(name);
        let columns = self.schema.columns_of(&self.handle, &table)?;

        self.session.record_table_visit(name);
        self.state = ExplorerState::TableSelected {
            table,
            columns: columns.clone(),
        };
        self.last_outcome = None;

        Ok(columns)
    }

    /// Columns of the currently selected table, if any.
    pub fn available_columns(&self) -> Option<&[ColumnMeta]> {
        self.state.columns()
    }

    /// The default selection: the table's first three columns (or fewer).
    pub fn default_columns(&self) -> Option<Vec<String>> {
        self.state.columns().map(|cols| {
            cols.iter()
                .take(DEFAULT_COLUMN_COUNT)
                .map(|c| c.name.clone())
                .collect()
        })
    }

    /// Pick a non-empty subset of the discovered columns.
    pub fn select_columns(&mut self, selected: Vec<String>) -> Result<(), DbError> {
        let (table, columns) = match &self.state {
            ExplorerState::Idle => {
                return Err(DbError::Validation("No table selected".to_string()));
            }
            ExplorerState::TableSelected { table, columns }
            | ExplorerState::ColumnsSelected { table, columns, .. }
            | ExplorerState::Rendered { table, columns, .. } => {
                (table.clone(), columns.clone())
            }
        };

        if selected.is_empty() {
            return Err(DbError::Validation(
                "Select at least one column".to_string(),
            ));
        }

        for name in &selected {
            if !columns.iter().any(|c| c.name == *name) {
                return Err(DbError::Validation(format!("Unknown column: {name}")));
            }
        }

        self.state = ExplorerState::ColumnsSelected {
            table,
            columns,
            selected,
        };

        Ok(())
    }

    /// Select the default columns and return them.
    pub fn select_default_columns(&mut self) -> Result<Vec<String>, DbError> {
        let defaults = self
            .default_columns()
            .ok_or_else(|| DbError::Validation("No table selected".to_string()))?;

        self.select_columns(defaults.clone())?;
        Ok(defaults)
    }

    /// Run the current selection, optionally narrowed by equality
    /// filters. Counts as one run action whether the result comes from
    /// the cache, the database, or fails.
    pub fn run_query(&mut self, filters: &[EqFilter]) -> Result<QueryOutcome, DbError> {
        let (table, columns, selected) = match &self.state {
            ExplorerState::ColumnsSelected {
                table,
                columns,
                selected,
            }
            | ExplorerState::Rendered {
                table,
                columns,
                selected,
            } => (table.clone(), columns.clone(), selected.clone()),
            _ => {
                return Err(DbError::Validation(
                    "Select a table and columns before running".to_string(),
                ));
            }
        };

        for filter in filters {
            if !columns.iter().any(|c| c.name == filter.column) {
                return Err(DbError::Validation(format!(
                    "Unknown filter column: {}",
                    filter.column
                )));
            }
        }

        self.session.record_run();

        let sql = SelectRequest::new(table.clone())
            .with_columns(selected.clone())
            .with_filters(filters.to_vec())
            .with_limit(self.row_limit)
            .build_sql(self.dialect.as_ref());

        match self.execute_cached(&sql, Some(&table)) {
            Ok(outcome) => {
                self.state = ExplorerState::Rendered {
                    table,
                    columns,
                    selected,
                };
                Ok(outcome)
            }
            Err(e) => {
                self.state = ExplorerState::ColumnsSelected {
                    table,
                    columns,
                    selected,
                };
                Err(e)
            }
        }
    }

    /// Batch path for dashboard feeds: a single read statement, no row
    /// bound, still cached and still counted as a run action.
    pub fn run_raw_sql(&mut self, sql: &str) -> Result<QueryOutcome, DbError> {
        if !is_read_only_query(sql) {
            return Err(DbError::Validation(
                "Only a single read statement is allowed here".to_string(),
            ));
        }

        self.session.record_run();
        self.execute_cached(sql, None)
    }

    fn execute_cached(
        &mut self,
        sql: &str,
        table: Option<&TableRef>,
    ) -> Result<QueryOutcome, DbError> {
        let request = QueryRequest::new(sql);

        let started = Instant::now();
        let result = self.queries.execute(&self.handle, &request)?;
        let elapsed = started.elapsed();

        let outcome = QueryOutcome {
            result,
            sql: sql.to_string(),
            elapsed,
        };

        self.record_history(&outcome, table);
        self.last_outcome = Some(outcome.clone());

        Ok(outcome)
    }

    /// The columns the insert form binds: the first four (or fewer) of
    /// the selected table.
    pub fn insert_form_columns(&self) -> Option<Vec<String>> {
        self.state.columns().map(|cols| {
            cols.iter()
                .take(INSERT_FORM_FIELDS)
                .map(|c| c.name.clone())
                .collect()
        })
    }

    /// Submit the insert form. Blank fields are omitted; an all-blank
    /// submission is rejected before any statement is sent. On commit
    /// the whole query cache is invalidated and the view reloads to
    /// `TableSelected`.
    pub fn insert_row(&mut self, fields: &[(String, String)]) -> Result<u64, DbError> {
        let (table, columns) = match &self.state {
            ExplorerState::Idle => {
                return Err(DbError::Validation("No table selected".to_string()));
            }
            ExplorerState::TableSelected { table, columns }
            | ExplorerState::ColumnsSelected { table, columns, .. }
            | ExplorerState::Rendered { table, columns, .. } => {
                (table.clone(), columns.clone())
            }
        };

        let mut insert_columns = Vec::new();
        let mut insert_values = Vec::new();

        for (name, raw) in fields {
            if raw.trim().is_empty() {
                continue;
            }

            if !columns.iter().any(|c| c.name == *name) {
                return Err(DbError::Validation(format!("Unknown column: {name}")));
            }

            insert_columns.push(name.clone());
            insert_values.push(Value::parse_input(raw));
        }

        if insert_columns.is_empty() {
            return Err(DbError::Validation(
                "Fill in at least one field".to_string(),
            ));
        }

        let stmt = InsertStatement::new(table.clone(), insert_columns, insert_values);

        match self.handle.conn().insert_row(&stmt) {
            Ok(affected) => {
                self.queries.invalidate_all();
                log::info!(
                    "Inserted {} row(s) into {}, query cache invalidated",
                    affected,
                    table.name
                );

                // The reload: back to the freshly selected table.
                self.state = ExplorerState::TableSelected { table, columns };
                self.last_outcome = None;

                Ok(affected)
            }
            Err(e) => {
                // Nothing was committed; fall back to the column
                // selection so a retry is one action away.
                if let ExplorerState::Rendered {
                    table,
                    columns,
                    selected,
                } = self.state.clone()
                {
                    self.state = ExplorerState::ColumnsSelected {
                        table,
                        columns,
                        selected,
                    };
                }

                Err(e)
            }
        }
    }

    /// On-disk size of the selected table, in bytes.
    pub fn table_disk_size(&self) -> Result<i64, DbError> {
        let table = self
            .state
            .table()
            .ok_or_else(|| DbError::Validation("No table selected".to_string()))?;

        self.handle.conn().table_disk_size(table)
    }

    /// The SQL text of the last successful run, for the audit readout.
    pub fn last_sql(&self) -> Option<&str> {
        self.last_outcome.as_ref().map(|o| o.sql.as_str())
    }

    fn record_history(&mut self, outcome: &QueryOutcome, table: Option<&TableRef>) {
        let Some(history) = self.history.as_mut() else {
            return;
        };

        history.add(HistoryEntry::new(
            outcome.sql.clone(),
            table.map(|t| t.name.clone()),
            outcome.elapsed,
            outcome.row_count(),
        ));

        if let Err(e) = history.save() {
            log::warn!("Could not persist query history: {}", e);
        }
    }
}


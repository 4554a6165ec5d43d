use crate::{ColumnMeta, DbError, Handle, TableRef};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Process-wide cache of catalog introspection results.
///
/// The table listing is fetched once per distinct handle identity and
/// kept for the life of the process: tables created after the first
/// listing are not observed until restart. Column discovery is a
/// pass-through probe on every call.
#[derive(Default)]
pub struct SchemaCache {
    tables: RwLock<HashMap<Uuid, Arc<Vec<String>>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables in the public schema, memoized per handle identity.
    pub fn list_tables(&self, handle: &Handle) -> Result<Arc<Vec<String>>, DbError> {
        if let Ok(cached) = self.tables.read() {
            if let Some(tables) = cached.get(&handle.id()) {
                log::debug!("Schema cache hit for handle {}", handle.id());
                return Ok(tables.clone());
            }
        }

        log::debug!("Schema cache miss for handle {}, listing tables", handle.id());
        let tables = Arc::new(handle.conn().list_tables()?);

        // Concurrent misses may race here; the first stored listing wins
        // and is what every caller sees from then on.
        let mut cached = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let stored = cached
            .entry(handle.id())
            .or_insert_with(|| tables)
            .clone();

        Ok(stored)
    }

    /// Whether `name` appears in the (possibly stale) table listing.
    pub fn is_known_table(&self, handle: &Handle, name: &str) -> Result<bool, DbError> {
        Ok(self.list_tables(handle)?.iter().any(|t| t == name))
    }

    /// Column metadata via a zero-row probe. Not memoized: each call
    /// observes the live table shape.
    pub fn columns_of(
        &self,
        handle: &Handle,
        table: &TableRef,
    ) -> Result<Vec<ColumnMeta>, DbError> {
        handle.conn().table_columns(table)
    }
}


use crate::{DbError, Handle, QueryRequest, QueryResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Default time-to-live for cached result sets.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

struct CacheEntry {
    result: Arc<QueryResult>,
    stored_at: Instant,
}

/// Time-expiring memoization of query text to result set.
///
/// Keyed by the literal SQL string; the connection identity is implicit
/// since one provider serves the whole process. Entries are immutable
/// once written. Concurrent misses on the same key may execute
/// redundantly; the last writer wins. Failed executions never populate
/// the cache.
pub struct QueryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached result for `req.sql` if fresh, otherwise
    /// execute against the handle and (re)populate the entry.
    pub fn execute(
        &self,
        handle: &Handle,
        req: &QueryRequest,
    ) -> Result<Arc<QueryResult>, DbError> {
        if let Some(result) = self.fresh(&req.sql) {
            log::debug!("Query cache hit: {}", req.sql);
            return Ok(result);
        }

        log::debug!("Query cache miss, executing: {}", req.sql);
        let result = Arc::new(handle.conn().execute(req)?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            req.sql.clone(),
            CacheEntry {
                result: result.clone(),
                stored_at: Instant::now(),
            },
        );

        Ok(result)
    }

    fn fresh(&self, sql: &str) -> Option<Arc<QueryResult>> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(sql)?;

        (entry.stored_at.elapsed() < self.ttl).then(|| entry.result.clone())
    }

    /// Drop every entry regardless of age. This is the only
    /// invalidation primitive; there is no per-key eviction.
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let dropped = entries.len();
        entries.clear();
        log::info!("Query cache invalidated ({} entries dropped)", dropped);
    }

    /// Number of entries currently held, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}


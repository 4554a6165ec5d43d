mod error;
mod explorer;
mod history;
mod insert;
mod profile;
mod provider;
mod query;
mod query_cache;
mod query_safety;
mod schema_cache;
mod secrets;
mod select;
mod session;
mod sql_dialect;
mod store;
mod traits;
mod value;

pub use error::DbError;
pub use explorer::{
    DEFAULT_ROW_LIMIT, ExplorerController, ExplorerState, INSERT_FORM_FIELDS, QueryOutcome,
};
pub use history::{HistoryEntry, HistoryStore};
pub use insert::InsertStatement;
pub use profile::{ConnectionProfile, DbConfig, SslMode};
pub use provider::{ConnectionProvider, Handle};
pub use query::{ColumnMeta, QueryRequest, QueryResult, Row};
pub use query_cache::{DEFAULT_TTL, QueryCache};
pub use query_safety::is_read_only_query;
pub use schema_cache::SchemaCache;
pub use secrets::{
    KeyringSecretStore, MemorySecretStore, NoopSecretStore, SecretStore, connection_secret_ref,
    create_secret_store,
};
pub use select::{EqFilter, SelectRequest, TableRef};
pub use session::SessionContext;
pub use sql_dialect::{PlaceholderStyle, PostgresDialect, SqlDialect};
pub use store::ProfileStore;
pub use traits::{Connection, DbDriver};
pub use value::Value;

pub use chrono;

/// Truncate a string at a character boundary, appending "..." when cut.
pub fn truncate_safe(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let budget = max_len.saturating_sub(3);
    let end = s
        .char_indices()
        .take_while(|(idx, _)| *idx <= budget)
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(0);

    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::truncate_safe;

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_safe("vendas", 10), "vendas");
    }

    #[test]
    fn long_strings_are_cut_with_ellipsis() {
        let cut = truncate_safe("SELECT * FROM a_very_long_table_name", 16);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 17);
    }

    #[test]
    fn multibyte_boundaries_are_respected() {
        let cut = truncate_safe("relatório de preços em ação", 12);
        assert!(cut.ends_with("..."));
    }
}

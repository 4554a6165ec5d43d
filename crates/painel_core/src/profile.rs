use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// SSL/TLS mode for PostgreSQL connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SslMode {
    /// No SSL (unencrypted connection).
    #[default]
    Disable,

    /// Try SSL, fall back to unencrypted if unavailable.
    Prefer,

    /// Require SSL (fail if the server doesn't support it).
    Require,
}

/// Database-specific connection parameters.
///
/// Only PostgreSQL is wired in today; the enum keeps the driver seam
/// open for other engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DbConfig {
    Postgres {
        host: String,
        port: u16,
        user: String,
        database: String,
        #[serde(default)]
        ssl_mode: SslMode,
    },
}

/// A saved connection. The password is never part of the profile; it is
/// resolved through the secret store at connect time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub id: Uuid,
    pub name: String,
    pub config: DbConfig,
}

impl ConnectionProfile {
    pub fn new(name: impl Into<String>, config: DbConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config,
        }
    }

    pub fn secret_ref(&self) -> String {
        crate::secrets::connection_secret_ref(&self.id)
    }
}

use crate::{Connection, ConnectionProfile, DbDriver, DbError, SecretStore};
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Shared reference to an open connection.
///
/// Cloning a handle never reconnects: all clones point at the same
/// underlying connection, and `id()` names that identity for the caches
/// keyed on it.
#[derive(Clone)]
pub struct Handle {
    id: Uuid,
    conn: Arc<dyn Connection>,
}

impl Handle {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conn,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn conn(&self) -> &dyn Connection {
        self.conn.as_ref()
    }

    /// Identity comparison: same underlying connection, not equal config.
    pub fn same_as(&self, other: &Handle) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.conn, &other.conn)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("id", &self.id).finish()
    }
}

enum ProviderState {
    Untried,
    Ready(Handle),
    Failed(String),
}

/// Process-lifetime connection singleton.
///
/// This is a resource cache, not a data cache: the first call's outcome,
/// success or failure, is the outcome for the rest of the process. There
/// is no invalidation path; a credential change requires a restart.
pub struct ConnectionProvider {
    driver: Box<dyn DbDriver>,
    profile: ConnectionProfile,
    secrets: Arc<dyn SecretStore>,
    state: Mutex<ProviderState>,
}

impl ConnectionProvider {
    pub fn new(
        driver: Box<dyn DbDriver>,
        profile: ConnectionProfile,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            driver,
            profile,
            secrets,
            state: Mutex::new(ProviderState::Untried),
        }
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// Return the process-wide handle, constructing it on the first call.
    pub fn get(&self) -> Result<Handle, DbError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match &*state {
            ProviderState::Ready(handle) => Ok(handle.clone()),
            ProviderState::Failed(message) => Err(DbError::Configuration(message.clone())),
            ProviderState::Untried => match self.connect() {
                Ok(handle) => {
                    log::info!(
                        "Connection established for profile '{}' (handle {})",
                        self.profile.name,
                        handle.id()
                    );
                    *state = ProviderState::Ready(handle.clone());
                    Ok(handle)
                }
                Err(e) => {
                    let message = e.to_string();
                    log::error!(
                        "Connection setup failed for profile '{}': {}",
                        self.profile.name,
                        message
                    );
                    *state = ProviderState::Failed(message.clone());
                    Err(DbError::Configuration(message))
                }
            },
        }
    }

    fn connect(&self) -> Result<Handle, DbError> {
        let password = self
            .secrets
            .get(&self.profile.secret_ref())
            .map_err(|e| DbError::Configuration(e.to_string()))?;

        let conn = self.driver.connect(&self.profile, password.as_deref())?;

        Ok(Handle::new(Arc::from(conn)))
    }
}


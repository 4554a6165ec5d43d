use crate::DbError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Source of connection passwords, kept out of the serialized profile.
pub trait SecretStore: Send + Sync {
    fn is_available(&self) -> bool;
    fn get(&self, secret_ref: &str) -> Result<Option<String>, DbError>;
    fn set(&self, secret_ref: &str, value: &str) -> Result<(), DbError>;
    fn delete(&self, secret_ref: &str) -> Result<(), DbError>;
}

pub struct NoopSecretStore;

impl SecretStore for NoopSecretStore {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _secret_ref: &str) -> Result<Option<String>, DbError> {
        Ok(None)
    }

    fn set(&self, _secret_ref: &str, _value: &str) -> Result<(), DbError> {
        Ok(())
    }

    fn delete(&self, _secret_ref: &str) -> Result<(), DbError> {
        Ok(())
    }
}

/// In-memory store for prompted passwords and tests.
#[derive(Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(secret_ref: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        let mut entries = store.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(secret_ref.into(), value.into());
        drop(entries);
        store
    }
}

impl SecretStore for MemorySecretStore {
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, secret_ref: &str) -> Result<Option<String>, DbError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(secret_ref).cloned())
    }

    fn set(&self, secret_ref: &str, value: &str) -> Result<(), DbError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(secret_ref.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, secret_ref: &str) -> Result<(), DbError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(secret_ref);
        Ok(())
    }
}

const SERVICE_NAME: &str = "painel";

pub struct KeyringSecretStore {
    available: bool,
}

impl KeyringSecretStore {
    pub fn new() -> Self {
        let available = Self::check_availability();
        Self { available }
    }

    fn check_availability() -> bool {
        let test_entry = keyring::Entry::new(SERVICE_NAME, "__painel_test__");
        match test_entry {
            Ok(entry) => {
                let _ = entry.get_password();
                true
            }
            Err(_) => false,
        }
    }
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringSecretStore {
    fn is_available(&self) -> bool {
        self.available
    }

    fn get(&self, secret_ref: &str) -> Result<Option<String>, DbError> {
        if !self.available {
            return Ok(None);
        }

        let entry = keyring::Entry::new(SERVICE_NAME, secret_ref)
            .map_err(|e| DbError::Configuration(e.to_string()))?;

        match entry.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(DbError::Configuration(e.to_string())),
        }
    }

    fn set(&self, secret_ref: &str, value: &str) -> Result<(), DbError> {
        if !self.available {
            return Ok(());
        }

        let entry = keyring::Entry::new(SERVICE_NAME, secret_ref)
            .map_err(|e| DbError::Configuration(e.to_string()))?;

        entry
            .set_password(value)
            .map_err(|e| DbError::Configuration(e.to_string()))
    }

    fn delete(&self, secret_ref: &str) -> Result<(), DbError> {
        if !self.available {
            return Ok(());
        }

        let entry = keyring::Entry::new(SERVICE_NAME, secret_ref)
            .map_err(|e| DbError::Configuration(e.to_string()))?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(DbError::Configuration(e.to_string())),
        }
    }
}

pub fn connection_secret_ref(profile_id: &uuid::Uuid) -> String {
    format!("painel:conn:{}", profile_id)
}

pub fn create_secret_store() -> Box<dyn SecretStore> {
    let keyring_store = KeyringSecretStore::new();
    if keyring_store.is_available() {
        Box::new(keyring_store)
    } else {
        Box::new(NoopSecretStore)
    }
}

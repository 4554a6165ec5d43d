use crate::{ConnectionProfile, DbError};
use std::fs;
use std::path::PathBuf;

/// JSON persistence for saved connection profiles.
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new() -> Result<Self, DbError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            DbError::Configuration("Could not find config directory".to_string())
        })?;

        let app_dir = config_dir.join("painel");
        fs::create_dir_all(&app_dir)?;

        Ok(Self {
            path: app_dir.join("profiles.json"),
        })
    }

    pub fn load(&self) -> Result<Vec<ConnectionProfile>, DbError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let profiles: Vec<ConnectionProfile> = serde_json::from_str(&content)
            .map_err(|e| DbError::Configuration(e.to_string()))?;

        Ok(profiles)
    }

    pub fn save(&self, profiles: &[ConnectionProfile]) -> Result<(), DbError> {
        let content = serde_json::to_string_pretty(profiles)
            .map_err(|e| DbError::Configuration(e.to_string()))?;

        fs::write(&self.path, content)?;

        Ok(())
    }

    pub fn find(&self, name: &str) -> Result<Option<ConnectionProfile>, DbError> {
        Ok(self.load()?.into_iter().find(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbConfig, SslMode};

    fn temp_store() -> (tempfile::TempDir, ProfileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore {
            path: dir.path().join("profiles.json"),
        };
        (dir, store)
    }

    fn sample_profile(name: &str) -> ConnectionProfile {
        ConnectionProfile::new(
            name,
            DbConfig::Postgres {
                host: "localhost".to_string(),
                port: 5432,
                user: "painel".to_string(),
                database: "painel".to_string(),
                ssl_mode: SslMode::Disable,
            },
        )
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let (_dir, store) = temp_store();

        let profiles = vec![sample_profile("prod"), sample_profile("staging")];
        store.save(&profiles).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "prod");
        assert_eq!(loaded[0].id, profiles[0].id);
    }

    #[test]
    fn find_by_name() {
        let (_dir, store) = temp_store();
        store.save(&[sample_profile("prod")]).unwrap();

        assert!(store.find("prod").unwrap().is_some());
        assert!(store.find("missing").unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_a_configuration_error() {
        let (_dir, store) = temp_store();
        fs::write(&store.path, "not json").unwrap();

        assert!(matches!(store.load(), Err(DbError::Configuration(_))));
    }
}

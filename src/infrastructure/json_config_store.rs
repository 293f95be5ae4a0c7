// Connection configuration persisted as one key in a JSON key-value file
use crate::application::config_store::ConfigStore;
use crate::domain::connection::ConnectionConfig;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key the configuration blob is stored under.
pub const CONFIG_KEY: &str = "gasMonitorConfig";

#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize configuration: {0}")]
    Serialize(serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All keys currently in the file; empty if the file does not exist.
    async fn read_entries(&self) -> Result<Map<String, Value>, ConfigStoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(ConfigStoreError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(|e| ConfigStoreError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), ConfigStoreError> {
        let content = serde_json::to_string_pretty(entries).map_err(ConfigStoreError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigStoreError::Write {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigStoreError::Write {
                path: self.path.clone(),
                source: e,
            })
    }
}

#[async_trait]
impl ConfigStore for JsonConfigStore {
    async fn load(&self) -> anyhow::Result<Option<ConnectionConfig>> {
        let mut entries = self.read_entries().await?;
        let Some(value) = entries.remove(CONFIG_KEY) else {
            return Ok(None);
        };

        let config = serde_json::from_value(value).map_err(|e| ConfigStoreError::Parse {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(config))
    }

    async fn save(&self, config: &ConnectionConfig) -> anyhow::Result<()> {
        // Other keys in the file belong to someone else; keep them.
        let mut entries = self.read_entries().await?;
        let value = serde_json::to_value(config).map_err(ConfigStoreError::Serialize)?;
        entries.insert(CONFIG_KEY.to_string(), value);
        self.write_entries(&entries).await?;

        tracing::info!("Saved connection configuration to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectionConfig {
        ConnectionConfig {
            endpoint_url: "https://abc.supabase.co/rest/v1".to_string(),
            api_key: "anon".to_string(),
            sensor_id: "mq2-kitchen".to_string(),
            table_name: "sensor_readings".to_string(),
            refresh_interval_seconds: 15,
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonConfigStore::new(temp_dir.path().join("settings.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonConfigStore::new(temp_dir.path().join("nested/settings.json"));

        store.save(&sample()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(sample()));
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"gasMonitorConfig\""));
        assert!(raw.contains("\"refreshIntervalSeconds\": 15"));
    }

    #[tokio::test]
    async fn test_save_preserves_other_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();
        let store = JsonConfigStore::new(&path);

        store.save(&sample()).await.unwrap();

        let entries: Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(entries.get("theme"), Some(&Value::String("dark".to_string())));
        assert!(entries.contains_key(CONFIG_KEY));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "this is not json").unwrap();
        let store = JsonConfigStore::new(&path);

        let err = store.load().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigStoreError>(),
            Some(ConfigStoreError::Parse { .. })
        ));
    }
}

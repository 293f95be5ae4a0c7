// Connection configuration for the remote reading source
use super::error::AcquisitionError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TABLE_NAME: &str = "sensor_readings";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionConfig {
    pub endpoint_url: String,
    pub api_key: String,
    pub sensor_id: String,
    pub table_name: String,
    pub refresh_interval_seconds: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            api_key: String::new(),
            sensor_id: String::new(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl ConnectionConfig {
    /// Check that every required string field is filled in.
    pub fn validate(&self) -> Result<(), AcquisitionError> {
        let fields = [
            ("endpointUrl", &self.endpoint_url),
            ("apiKey", &self.api_key),
            ("sensorId", &self.sensor_id),
            ("tableName", &self.table_name),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(AcquisitionError::Configuration {
                field: (*name).to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn is_fully_specified(&self) -> bool {
        self.validate().is_ok()
    }

    /// Refresh cadence, never shorter than one second.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds.max(1))
    }

    /// Trim whitespace and normalise the interval before saving.
    pub fn normalized(mut self) -> Self {
        self.endpoint_url = self.endpoint_url.trim().trim_end_matches('/').to_string();
        self.api_key = self.api_key.trim().to_string();
        self.sensor_id = self.sensor_id.trim().to_string();
        self.table_name = self.table_name.trim().to_string();
        self.refresh_interval_seconds = self.refresh_interval_seconds.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> ConnectionConfig {
        ConnectionConfig {
            endpoint_url: "https://example.supabase.co/rest/v1".to_string(),
            api_key: "secret".to_string(),
            sensor_id: "mq2-kitchen".to_string(),
            table_name: "sensor_readings".to_string(),
            refresh_interval_seconds: 10,
        }
    }

    #[test]
    fn test_default_is_not_fully_specified() {
        let config = ConnectionConfig::default();
        assert!(!config.is_fully_specified());
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_names_first_missing_field() {
        let mut config = configured();
        config.sensor_id = "   ".to_string();
        match config.validate() {
            Err(AcquisitionError::Configuration { field }) => assert_eq!(field, "sensorId"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_normalized() {
        let mut config = configured();
        config.endpoint_url = " https://example.supabase.co/rest/v1/ ".to_string();
        config.refresh_interval_seconds = 0;
        let config = config.normalized();
        assert_eq!(config.endpoint_url, "https://example.supabase.co/rest/v1");
        assert_eq!(config.refresh_interval_seconds, 1);
    }

    #[test]
    fn test_deserialize_partial_blob_uses_defaults() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"endpointUrl":"https://x","sensorId":"s1"}"#).unwrap();
        assert_eq!(config.endpoint_url, "https://x");
        assert_eq!(config.sensor_id, "s1");
        assert_eq!(config.api_key, "");
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert_eq!(config.refresh_interval_seconds, DEFAULT_REFRESH_INTERVAL_SECS);
    }
}

use crate::domain::reading::Span;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub source: SourceSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Key-value JSON file holding the saved connection configuration.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    /// Line and fill colour of the chart.
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub default_span: Span,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/settings.json")
}

fn default_color() -> String {
    "#22c55e".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            color: default_color(),
            default_span: Span::default(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Load `config/monitor.{toml,json,yaml}` if present, overridden by
/// `MONITOR__SECTION__KEY` environment variables.
pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/monitor").required(false))
        .add_source(config::Environment::with_prefix("MONITOR").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

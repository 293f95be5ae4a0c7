// REST reading source (PostgREST-style table endpoint)
use crate::application::reading_source::{Bound, ReadingQuery, ReadingSource};
use crate::domain::connection::ConnectionConfig;
use crate::domain::error::AcquisitionError;
use crate::domain::reading::{DeviceInfo, Reading, SourceRow};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RestReadingSource {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ReadingRow {
    recorded_at: DateTime<Utc>,
    raw_value: i64,
    #[serde(default)]
    metadata: Option<RowMetadata>,
}

#[derive(Debug, Deserialize)]
struct RowMetadata {
    #[serde(default)]
    rssi: Option<f64>,
    #[serde(default)]
    device: Option<String>,
    #[serde(default)]
    uptime_s: Option<f64>,
}

impl From<ReadingRow> for SourceRow {
    fn from(row: ReadingRow) -> Self {
        // An all-null metadata object carries nothing worth keeping.
        let metadata = row
            .metadata
            .map(|m| DeviceInfo {
                signal_strength: m.rssi,
                device_name: m.device,
                uptime_seconds: m.uptime_s,
            })
            .filter(|info| !info.is_empty());
        SourceRow::new(Reading::from_raw(row.recorded_at, row.raw_value), metadata)
    }
}

impl RestReadingSource {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    fn build_query_url(config: &ConnectionConfig, query: &ReadingQuery) -> String {
        let operator = match query.bound {
            Bound::Inclusive => "gte",
            Bound::Exclusive => "gt",
        };
        let since = query.since.to_rfc3339_opts(SecondsFormat::AutoSi, true);

        let mut url = format!(
            "{}/{}?sensor_id=eq.{}&recorded_at={}.{}&order=recorded_at.asc",
            config.endpoint_url.trim_end_matches('/'),
            urlencoding::encode(&config.table_name),
            urlencoding::encode(&config.sensor_id),
            operator,
            urlencoding::encode(&since)
        );
        if let Some(page) = query.page {
            url.push_str(&format!("&limit={}&offset={}", page.limit, page.offset));
        }
        url
    }

    fn parse_rows(body: &str) -> Result<Vec<SourceRow>, serde_json::Error> {
        let rows: Vec<ReadingRow> = serde_json::from_str(body)?;
        Ok(rows.into_iter().map(SourceRow::from).collect())
    }
}

#[async_trait]
impl ReadingSource for RestReadingSource {
    async fn fetch(
        &self,
        config: &ConnectionConfig,
        query: &ReadingQuery,
    ) -> Result<Vec<SourceRow>, AcquisitionError> {
        let url = Self::build_query_url(config, query);
        tracing::debug!("Fetching readings: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &config.api_key)
            .bearer_auth(&config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| AcquisitionError::fetch(None, format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AcquisitionError::fetch(Some(status.as_u16()), format!("failed to read body: {}", e))
        })?;

        if !status.is_success() {
            return Err(AcquisitionError::fetch(Some(status.as_u16()), body));
        }

        Self::parse_rows(&body).map_err(|e| {
            AcquisitionError::fetch(Some(status.as_u16()), format!("invalid response body: {}", e))
        })
    }
}

// Sensor reading domain models
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Largest value the sensor's 12-bit ADC can report.
pub const ADC_MAX: u16 = 4095;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: u16,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, value: u16) -> Self {
        Self {
            timestamp,
            value: value.min(ADC_MAX),
        }
    }

    /// Build a reading from an untrusted raw value, clamping into the ADC range.
    pub fn from_raw(timestamp: DateTime<Utc>, raw_value: i64) -> Self {
        let value = raw_value.clamp(0, ADC_MAX as i64) as u16;
        Self { timestamp, value }
    }
}

/// Latest known device metadata. Every field may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub signal_strength: Option<f64>,
    pub device_name: Option<String>,
    pub uptime_seconds: Option<f64>,
}

impl DeviceInfo {
    pub fn is_empty(&self) -> bool {
        self.signal_strength.is_none() && self.device_name.is_none() && self.uptime_seconds.is_none()
    }
}

/// A reading as delivered by a source, with the metadata that came along with it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub reading: Reading,
    pub metadata: Option<DeviceInfo>,
}

impl SourceRow {
    pub fn new(reading: Reading, metadata: Option<DeviceInfo>) -> Self {
        Self { reading, metadata }
    }
}

/// Lookback window the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Span {
    #[serde(rename = "1h")]
    #[default]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    TwentyFourHours,
    #[serde(rename = "7d")]
    SevenDays,
}

impl Span {
    pub fn duration(&self) -> Duration {
        match self {
            Span::OneHour => Duration::hours(1),
            Span::SixHours => Duration::hours(6),
            Span::TwentyFourHours => Duration::hours(24),
            Span::SevenDays => Duration::days(7),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Span::OneHour => "1h",
            Span::SixHours => "6h",
            Span::TwentyFourHours => "24h",
            Span::SevenDays => "7d",
        }
    }

    /// Oldest instant still inside the span when looking back from `now`.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

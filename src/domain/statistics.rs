// Summary statistics and alert status derived from a data window
use super::window::DataWindow;
use serde::Serialize;

/// Readings strictly above this value raise an alert.
pub const ALERT_THRESHOLD: u16 = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub min: u16,
    pub max: u16,
    pub average: u16,
    pub current: u16,
}

impl Statistics {
    /// All four figures are zero for an empty window.
    pub fn from_window(window: &DataWindow) -> Self {
        let Some(last) = window.last() else {
            return Self::default();
        };

        let mut min = u16::MAX;
        let mut max = u16::MIN;
        let mut sum: u64 = 0;
        for value in window.values() {
            min = min.min(value);
            max = max.max(value);
            sum += value as u64;
        }

        let count = window.len() as u64;
        // Integer round-half-up.
        let average = ((2 * sum + count) / (2 * count)) as u16;

        Self {
            min,
            max,
            average,
            current: last.value,
        }
    }

    pub fn status(&self) -> Status {
        Status::from_current(self.current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Normal,
    Alert,
}

impl Status {
    pub fn from_current(current: u16) -> Self {
        if current > ALERT_THRESHOLD {
            Status::Alert
        } else {
            Status::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Normal => "NORMAL",
            Status::Alert => "ALERT",
        }
    }
}

// Data window - ordered, span-bounded run of readings
use super::reading::{Reading, Span};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Readings in ascending timestamp order.
///
/// Timestamps never decrease. Duplicate timestamps are kept as delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataWindow {
    readings: Vec<Reading>,
}

impl DataWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a window from readings in any order.
    pub fn from_readings(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.readings.last().map(|r| r.timestamp)
    }

    /// Append newer readings, then drop everything older than `now - span`.
    ///
    /// Returns the number of readings appended. Incoming readings older than
    /// the current tail are skipped so the ordering invariant survives a
    /// misbehaving source.
    pub fn merge_and_trim(
        &mut self,
        incoming: impl IntoIterator<Item = Reading>,
        span: Span,
        now: DateTime<Utc>,
    ) -> usize {
        let mut appended = 0;
        for reading in incoming {
            if let Some(tail) = self.last_timestamp() {
                if reading.timestamp < tail {
                    tracing::debug!(
                        "Skipping out-of-order reading at {} (tail is {})",
                        reading.timestamp,
                        tail
                    );
                    continue;
                }
            }
            self.readings.push(reading);
            appended += 1;
        }

        self.trim(span, now);
        appended
    }

    /// Drop readings whose timestamp is before `now - span`.
    pub fn trim(&mut self, span: Span, now: DateTime<Utc>) {
        let cutoff = span.start(now);
        let stale = self.readings.partition_point(|r| r.timestamp < cutoff);
        if stale > 0 {
            self.readings.drain(..stale);
        }
    }

    pub fn values(&self) -> impl Iterator<Item = u16> + '_ {
        self.readings.iter().map(|r| r.value)
    }
}

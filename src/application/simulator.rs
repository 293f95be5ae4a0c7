// Synthetic reading generator used while no remote source is configured
use crate::domain::reading::{ADC_MAX, Reading, Span};
use crate::domain::window::DataWindow;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SERIES_LEN: usize = 60;
const START_VALUE: i32 = 1500;
const MAX_STEP: i32 = 150;

/// Bounded random walk over the ADC range.
pub struct Simulator {
    rng: StdRng,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A full window of evenly spaced readings ending at `now`.
    pub fn series(&mut self, span: Span, now: DateTime<Utc>) -> DataWindow {
        let step = span.duration() / (SERIES_LEN as i32 - 1);
        let start = span.start(now);

        let mut value = START_VALUE;
        let readings = (0..SERIES_LEN)
            .map(|i| {
                if i > 0 {
                    value = self.walk(value);
                }
                Reading::new(start + step * i as i32, value as u16)
            })
            .collect();

        DataWindow::from_readings(readings)
    }

    /// Append one reading at `now` that wanders from the previous value,
    /// then trim the window to `span`.
    pub fn step(&mut self, window: &mut DataWindow, span: Span, now: DateTime<Utc>) {
        let previous = window.last().map(|r| r.value as i32).unwrap_or(START_VALUE);
        let next = Reading::new(now, self.walk(previous) as u16);
        window.merge_and_trim([next], span, now);
    }

    fn walk(&mut self, value: i32) -> i32 {
        let delta = self.rng.random_range(-MAX_STEP..=MAX_STEP);
        (value + delta).clamp(0, ADC_MAX as i32)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

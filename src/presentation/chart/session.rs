// Chart session - interaction state bound to the data it was built against
use super::interaction::{ChartInteraction, GestureEvent, GestureState};
use super::scene::{ChartScene, render_chart};
use crate::domain::reading::Reading;
use serde::Serialize;

pub const DEFAULT_WIDTH: f64 = 800.0;

/// One chart's interaction state plus the container size it was last seen at.
///
/// A change in row count resets zoom and pan; a resize does not.
#[derive(Debug, Clone)]
pub struct ChartSession {
    interaction: ChartInteraction,
    width: f64,
    last_row_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub width: f64,
    pub zoom: f64,
    pub pan: f64,
    pub max_pan: f64,
    pub hovered_index: Option<usize>,
    pub gesture: GestureState,
}

impl Default for ChartSession {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl ChartSession {
    pub fn new(width: f64) -> Self {
        Self {
            interaction: ChartInteraction::default(),
            width: sanitize_width(width),
            last_row_count: None,
        }
    }

    /// Record the current row count, resetting interaction when it changed.
    pub fn observe_rows(&mut self, count: usize) {
        if self.last_row_count.is_some_and(|last| last != count) {
            tracing::debug!("Row count changed to {}, resetting chart interaction", count);
            self.interaction.reset();
        }
        self.last_row_count = Some(count);
    }

    pub fn resize(&mut self, width: f64) {
        self.width = sanitize_width(width);
    }

    pub fn apply(&mut self, event: &GestureEvent, count: usize) -> ChartView {
        self.observe_rows(count);
        self.interaction.apply(event, self.width, count);
        self.view(count)
    }

    pub fn reset(&mut self) {
        self.interaction.reset();
    }

    pub fn render(&mut self, readings: &[Reading], color: &str) -> ChartScene {
        self.observe_rows(readings.len());
        render_chart(readings, self.width, &self.interaction, color)
    }

    pub fn view(&self, count: usize) -> ChartView {
        let geometry = self.interaction.geometry(self.width, count);
        ChartView {
            width: self.width,
            zoom: geometry.zoom(),
            pan: geometry.pan(),
            max_pan: geometry.max_pan(),
            hovered_index: self.interaction.hovered_index(),
            gesture: self.interaction.state(),
        }
    }
}

fn sanitize_width(width: f64) -> f64 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        DEFAULT_WIDTH
    }
}

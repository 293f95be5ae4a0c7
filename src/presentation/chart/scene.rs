// Chart scene - the drawable output of one render pass
use super::geometry::{ChartGeometry, PADDING};
use super::interaction::ChartInteraction;
use crate::domain::reading::{ADC_MAX, Reading};
use serde::Serialize;

/// Values the horizontal grid lines are drawn at.
pub const GRID_VALUES: [u16; 5] = [0, 1024, 2048, 3072, ADC_MAX];

const LABEL_CHAR_WIDTH: f64 = 7.0;
const LABEL_PADDING: f64 = 8.0;
const LABEL_HEIGHT: f64 = 38.0;
const LABEL_GAP: f64 = 12.0;
pub const MARKER_RADIUS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLine {
    pub value: u16,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverLabel {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub time_text: String,
    pub value_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverMarker {
    pub index: usize,
    pub point: Point,
    pub label: HoverLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartScene {
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub grid: Vec<GridLine>,
    /// Stroked polyline through every reading.
    pub line: Vec<Point>,
    /// Closed fill outline: the polyline, then back along the baseline.
    pub area: Vec<Point>,
    pub baseline: f64,
    pub hover: Option<HoverMarker>,
}

/// Render `readings` for a container `width` pixels wide.
///
/// Pure: the same inputs always produce the same scene.
pub fn render_chart(
    readings: &[Reading],
    width: f64,
    interaction: &ChartInteraction,
    color: &str,
) -> ChartScene {
    let geometry = interaction.geometry(width, readings.len());

    let grid = GRID_VALUES
        .iter()
        .map(|&value| GridLine {
            value,
            y: geometry.y(value),
        })
        .collect();

    let line: Vec<Point> = readings
        .iter()
        .enumerate()
        .map(|(i, r)| Point {
            x: geometry.x(i),
            y: geometry.y(r.value),
        })
        .collect();

    let baseline = geometry.baseline();
    let area = match (line.first(), line.last()) {
        (Some(first), Some(last)) => {
            let mut area = line.clone();
            area.push(Point { x: last.x, y: baseline });
            area.push(Point { x: first.x, y: baseline });
            area
        }
        _ => Vec::new(),
    };

    let hover = interaction
        .hovered_index()
        .and_then(|index| hover_marker(&geometry, readings, index));

    ChartScene {
        width: geometry.width(),
        height: geometry.height(),
        color: color.to_string(),
        grid,
        line,
        area,
        baseline,
        hover,
    }
}

fn hover_marker(geometry: &ChartGeometry, readings: &[Reading], index: usize) -> Option<HoverMarker> {
    let reading = readings.get(index)?;
    let point = Point {
        x: geometry.x(index),
        y: geometry.y(reading.value),
    };
    // Resizes and zooms can move a previously hovered point out of view.
    if !geometry.is_visible_x(point.x) {
        return None;
    }

    let time_text = reading.timestamp.format("%b %d %H:%M:%S").to_string();
    let value_text = format!("ADC {}", reading.value);
    let chars = time_text.chars().count().max(value_text.chars().count());
    let label_width = chars as f64 * LABEL_CHAR_WIDTH + 2.0 * LABEL_PADDING;

    let max_x = (geometry.width() - label_width).max(0.0);
    let label = HoverLabel {
        x: (point.x - label_width / 2.0).clamp(0.0, max_x),
        y: (point.y - LABEL_HEIGHT - LABEL_GAP).max(PADDING / 4.0),
        width: label_width,
        height: LABEL_HEIGHT,
        time_text,
        value_text,
    };

    Some(HoverMarker { index, point, label })
}

// Chart interaction - gesture state machine for hover, pinch zoom and pan
use super::geometry::{ChartGeometry, MIN_ZOOM, clamp_pan, clamp_zoom};
use serde::{Deserialize, Serialize};

const WHEEL_ZOOM_OUT: f64 = 0.9;
const WHEEL_ZOOM_IN: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn distance_to(&self, other: &TouchPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Input events in container-relative pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    PointerMove { x: f64 },
    PointerLeave,
    TouchStart { touches: Vec<TouchPoint> },
    TouchMove { touches: Vec<TouchPoint> },
    TouchEnd,
    /// Positive `delta_y` scrolls down (zoom out), negative scrolls up (zoom in).
    Wheel { delta_y: f64 },
    ResetZoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GestureState {
    #[default]
    Idle,
    Hovering { index: usize },
    /// `last_distance` is `None` until the first two-finger sample arrives.
    PinchZooming { last_distance: Option<f64> },
    /// `last_x` is `None` until the first one-finger sample arrives.
    Panning { last_x: Option<f64> },
}

/// Zoom, pan and gesture tracking for one chart.
///
/// Only [`ChartInteraction::apply`] and [`ChartInteraction::reset`] mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartInteraction {
    zoom: f64,
    pan: f64,
    state: GestureState,
}

impl Default for ChartInteraction {
    fn default() -> Self {
        Self {
            zoom: MIN_ZOOM,
            pan: 0.0,
            state: GestureState::Idle,
        }
    }
}

impl ChartInteraction {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Stored pan offset; geometry clamps it again on every read.
    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn hovered_index(&self) -> Option<usize> {
        match self.state {
            GestureState::Hovering { index } => Some(index),
            _ => None,
        }
    }

    pub fn geometry(&self, width: f64, count: usize) -> ChartGeometry {
        ChartGeometry::new(width, count, self.zoom, self.pan)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply one input event for a chart `width` pixels wide showing `count` points.
    pub fn apply(&mut self, event: &GestureEvent, width: f64, count: usize) {
        match event {
            GestureEvent::PointerMove { x } => self.probe(*x, width, count),
            GestureEvent::PointerLeave | GestureEvent::TouchEnd => {
                self.state = GestureState::Idle;
            }
            GestureEvent::TouchStart { touches } => self.touch_start(touches, width, count),
            GestureEvent::TouchMove { touches } => self.touch_move(touches, width, count),
            GestureEvent::Wheel { delta_y } => {
                let factor = if *delta_y > 0.0 {
                    WHEEL_ZOOM_OUT
                } else if *delta_y < 0.0 {
                    WHEEL_ZOOM_IN
                } else {
                    return;
                };
                self.set_zoom(self.zoom * factor, width);
            }
            GestureEvent::ResetZoom => {
                self.zoom = MIN_ZOOM;
                self.pan = 0.0;
            }
        }
    }

    fn touch_start(&mut self, touches: &[TouchPoint], width: f64, count: usize) {
        match touches {
            [first, second, ..] => {
                self.state = GestureState::PinchZooming {
                    last_distance: Some(first.distance_to(second)),
                };
            }
            [only] if self.zoom > MIN_ZOOM => {
                self.state = GestureState::Panning {
                    last_x: Some(only.x),
                };
            }
            [only] => self.probe(only.x, width, count),
            [] => {}
        }
    }

    fn touch_move(&mut self, touches: &[TouchPoint], width: f64, count: usize) {
        match touches {
            [first, second, ..] => {
                let distance = first.distance_to(second);
                if let GestureState::PinchZooming {
                    last_distance: Some(previous),
                } = self.state
                {
                    if previous > 0.0 {
                        self.set_zoom(self.zoom * (distance / previous), width);
                    }
                }
                self.state = GestureState::PinchZooming {
                    last_distance: Some(distance),
                };
            }
            [only] if self.zoom > MIN_ZOOM => {
                if let GestureState::Panning { last_x: Some(last_x) } = self.state {
                    self.pan = clamp_pan(self.pan - (only.x - last_x), width, self.zoom);
                }
                self.state = GestureState::Panning {
                    last_x: Some(only.x),
                };
            }
            [only] => self.probe(only.x, width, count),
            [] => {}
        }
    }

    fn set_zoom(&mut self, zoom: f64, width: f64) {
        self.zoom = clamp_zoom(zoom);
        self.pan = clamp_pan(self.pan, width, self.zoom);
    }

    fn probe(&mut self, x: f64, width: f64, count: usize) {
        self.state = match self.geometry(width, count).index_at(x) {
            Some(index) => GestureState::Hovering { index },
            None => GestureState::Idle,
        };
    }
}

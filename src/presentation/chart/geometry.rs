// Chart geometry - value/index to pixel mapping under zoom and pan
use crate::domain::reading::ADC_MAX;

/// Fixed logical height of the chart container.
pub const CHART_HEIGHT: f64 = 300.0;
pub const PADDING: f64 = 20.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 5.0;

pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        MIN_ZOOM
    } else {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

/// Furthest the content may be panned either way at `zoom`.
pub fn max_pan(width: f64, zoom: f64) -> f64 {
    ((width * clamp_zoom(zoom) - width) / 2.0).max(0.0)
}

pub fn clamp_pan(pan: f64, width: f64, zoom: f64) -> f64 {
    let limit = max_pan(width, zoom);
    if limit == 0.0 || pan.is_nan() {
        0.0
    } else {
        pan.clamp(-limit, limit)
    }
}

/// Pixel mapping for `count` points in a container `width` pixels wide.
///
/// Zoom stretches the plot about its middle; pan then shifts it left. The
/// applied pan is always clamped so neither end of the data can move inside
/// the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    width: f64,
    height: f64,
    zoom: f64,
    pan: f64,
    count: usize,
}

impl ChartGeometry {
    pub fn new(width: f64, count: usize, zoom: f64, pan: f64) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let zoom = clamp_zoom(zoom);
        Self {
            width,
            height: CHART_HEIGHT,
            zoom,
            pan: clamp_pan(pan, width, zoom),
            count,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Pan offset actually applied, after clamping.
    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn effective_width(&self) -> f64 {
        self.width * self.zoom
    }

    pub fn max_pan(&self) -> f64 {
        max_pan(self.width, self.zoom)
    }

    fn plot_width(&self) -> f64 {
        (self.effective_width() - 2.0 * PADDING).max(0.0)
    }

    fn shift(&self) -> f64 {
        (self.effective_width() - self.width) / 2.0 + self.pan
    }

    /// Horizontal pixel of point `index`. At `pan = 0` a zoomed chart is
    /// centred on the middle of the data, not left-aligned.
    pub fn x(&self, index: usize) -> f64 {
        let fraction = if self.count > 1 {
            index as f64 / (self.count - 1) as f64
        } else {
            0.0
        };
        fraction * self.plot_width() + PADDING - self.shift()
    }

    pub fn y(&self, value: u16) -> f64 {
        let fraction = value.min(ADC_MAX) as f64 / ADC_MAX as f64;
        let bottom = self.height - PADDING;
        bottom - fraction * (self.height - 2.0 * PADDING)
    }

    /// Baseline the filled area closes against.
    pub fn baseline(&self) -> f64 {
        self.height - PADDING
    }

    pub fn is_visible_x(&self, x: f64) -> bool {
        (0.0..=self.width).contains(&x)
    }

    /// Nearest data index under `pointer_x`, if it lands on visible data.
    pub fn index_at(&self, pointer_x: f64) -> Option<usize> {
        if self.count == 0 || !self.is_visible_x(pointer_x) {
            return None;
        }

        let plot_width = self.plot_width();
        let raw = if self.count == 1 || plot_width == 0.0 {
            0.0
        } else {
            (pointer_x + self.shift() - PADDING) / plot_width * (self.count - 1) as f64
        };

        let rounded = raw.round();
        if rounded < 0.0 || rounded > (self.count - 1) as f64 {
            return None;
        }

        let index = rounded as usize;
        self.is_visible_x(self.x(index)).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_mapping_is_inverted() {
        let geometry = ChartGeometry::new(800.0, 10, 1.0, 0.0);
        assert_eq!(geometry.y(0), CHART_HEIGHT - PADDING);
        assert_eq!(geometry.y(ADC_MAX), PADDING);
        assert!(geometry.y(3000) < geometry.y(1000));
    }

    #[test]
    fn test_horizontal_mapping_at_unit_zoom() {
        let geometry = ChartGeometry::new(820.0, 5, 1.0, 0.0);
        assert_eq!(geometry.x(0), PADDING);
        assert_eq!(geometry.x(4), 800.0);
        assert_eq!(geometry.x(2), 410.0);
    }

    #[test]
    fn test_pan_is_forced_to_zero_at_unit_zoom() {
        let geometry = ChartGeometry::new(800.0, 5, 1.0, 250.0);
        assert_eq!(geometry.pan(), 0.0);
        assert_eq!(geometry.max_pan(), 0.0);
    }

    #[test]
    fn test_zoom_and_pan_are_clamped() {
        let geometry = ChartGeometry::new(400.0, 5, 9.0, -10_000.0);
        assert_eq!(geometry.zoom(), MAX_ZOOM);
        assert_eq!(geometry.max_pan(), 800.0);
        assert_eq!(geometry.pan(), -800.0);

        let geometry = ChartGeometry::new(400.0, 5, 0.2, 10.0);
        assert_eq!(geometry.zoom(), MIN_ZOOM);
        assert_eq!(geometry.pan(), 0.0);
    }

    #[test]
    fn test_x_is_monotonic_for_any_zoom_and_pan() {
        for zoom in [1.0, 1.5, 2.75, 5.0] {
            for pan in [-1000.0, -37.5, 0.0, 120.0, 1000.0] {
                for width in [10.0, 320.0, 1280.0] {
                    let geometry = ChartGeometry::new(width, 50, zoom, pan);
                    for i in 1..50 {
                        assert!(geometry.x(i - 1) <= geometry.x(i));
                    }
                    assert!(geometry.x(0) <= geometry.x(49));
                }
            }
        }
    }

    #[test]
    fn test_zoom_without_pan_stays_centred() {
        let geometry = ChartGeometry::new(400.0, 3, 2.0, 0.0);
        assert_eq!(geometry.x(1), 200.0);
        assert!(geometry.x(0) < 0.0);
        assert!(geometry.x(2) > 400.0);
    }

    #[test]
    fn test_panning_never_exposes_space_past_the_data() {
        let width = 600.0;
        for zoom in [1.0, 2.0, 5.0] {
            let limit = max_pan(width, zoom);
            for pan in [-limit, 0.0, limit] {
                let geometry = ChartGeometry::new(width, 100, zoom, pan);
                assert!(geometry.x(0) <= PADDING + 1e-9);
                assert!(geometry.x(99) >= width - PADDING - 1e-9);
            }
        }
    }

    #[test]
    fn test_index_at_inverts_x() {
        let geometry = ChartGeometry::new(820.0, 5, 1.0, 0.0);
        assert_eq!(geometry.index_at(20.0), Some(0));
        assert_eq!(geometry.index_at(400.0), Some(2));
        assert_eq!(geometry.index_at(800.0), Some(4));
        assert_eq!(geometry.index_at(0.0), Some(0));

        let zoomed = ChartGeometry::new(500.0, 101, 3.0, 120.0);
        for index in [0usize, 25, 50, 75, 100] {
            let x = zoomed.x(index);
            if zoomed.is_visible_x(x) {
                assert_eq!(zoomed.index_at(x), Some(index));
            }
        }
    }

    #[test]
    fn test_index_at_rejects_pointer_outside_container() {
        let geometry = ChartGeometry::new(500.0, 40, 2.0, 100.0);
        assert_eq!(geometry.index_at(-1.0), None);
        assert_eq!(geometry.index_at(500.5), None);
        assert_eq!(ChartGeometry::new(500.0, 0, 1.0, 0.0).index_at(250.0), None);
    }

    #[test]
    fn test_single_point() {
        let geometry = ChartGeometry::new(300.0, 1, 1.0, 0.0);
        assert_eq!(geometry.x(0), PADDING);
        assert_eq!(geometry.index_at(150.0), Some(0));
    }
}

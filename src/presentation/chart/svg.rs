// SVG serialisation of a chart scene
use super::scene::{ChartScene, MARKER_RADIUS, Point};
use std::fmt::Write;

const GRID_COLOR: &str = "#e5e7eb";
const LABEL_BACKGROUND: &str = "#111827";
const LABEL_TEXT: &str = "#f9fafb";

pub fn scene_to_svg(scene: &ChartScene) -> String {
    let mut svg = String::with_capacity(256 + scene.line.len() * 16);
    let color = escape_xml(&scene.color);

    // Writing into a String cannot fail.
    let _ = write_svg(&mut svg, scene, &color);
    svg
}

fn write_svg(svg: &mut String, scene: &ChartScene, color: &str) -> std::fmt::Result {
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = scene.width,
        h = scene.height
    )?;
    writeln!(
        svg,
        r#"<defs><linearGradient id="area-fill" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="{color}" stop-opacity="0.35"/><stop offset="100%" stop-color="{color}" stop-opacity="0"/></linearGradient></defs>"#
    )?;

    for grid in &scene.grid {
        writeln!(
            svg,
            r#"<line class="grid" x1="0" y1="{y:.1}" x2="{w:.1}" y2="{y:.1}" stroke="{GRID_COLOR}" stroke-dasharray="4 4"/>"#,
            y = grid.y,
            w = scene.width
        )?;
        writeln!(
            svg,
            r##"<text x="2" y="{:.1}" font-size="10" fill="#9ca3af">{}</text>"##,
            grid.y - 2.0,
            grid.value
        )?;
    }

    if !scene.area.is_empty() {
        writeln!(
            svg,
            r#"<path class="area" d="{}" fill="url(#area-fill)"/>"#,
            path_data(&scene.area)
        )?;
        writeln!(
            svg,
            r#"<polyline class="line" points="{}" fill="none" stroke="{color}" stroke-width="2" stroke-linejoin="round"/>"#,
            points_attr(&scene.line)
        )?;
    }

    if let Some(hover) = &scene.hover {
        let p = hover.point;
        let label = &hover.label;
        writeln!(
            svg,
            r#"<line class="guide" x1="{x:.1}" y1="0" x2="{x:.1}" y2="{h:.1}" stroke="{color}" stroke-opacity="0.5"/>"#,
            x = p.x,
            h = scene.height
        )?;
        writeln!(
            svg,
            r##"<circle class="marker" cx="{:.1}" cy="{:.1}" r="{MARKER_RADIUS}" fill="{color}" stroke="#ffffff" stroke-width="2"/>"##,
            p.x, p.y
        )?;
        writeln!(
            svg,
            r#"<g class="label"><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="4" fill="{LABEL_BACKGROUND}" fill-opacity="0.9"/>"#,
            label.x, label.y, label.width, label.height
        )?;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="11" fill="{LABEL_TEXT}">{}</text>"#,
            label.x + 8.0,
            label.y + 15.0,
            escape_xml(&label.time_text)
        )?;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" font-weight="bold" fill="{LABEL_TEXT}">{}</text></g>"#,
            label.x + 8.0,
            label.y + 31.0,
            escape_xml(&label.value_text)
        )?;
    }

    writeln!(svg, "</svg>")
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn path_data(points: &[Point]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{:.1} {:.1} ", command, p.x, p.y);
    }
    d.push('Z');
    d
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

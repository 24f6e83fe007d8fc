//! SVG renderings of the analyses.
//!
//! The renderers only read the exported results; nothing in the analyses depends on
//! this module. World coordinates have Y pointing up and are flipped onto the SVG
//! canvas, whose Y axis points down.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use log::info;

use crate::amplification::{ResponseAnalysis, ResponseCurve};
use crate::geometry::{Bounds, FloorBoundary, Point};
use crate::rays::RayDiagram;
use crate::tributary::{Column, Distribution};

/// Fill colours cycled through for the tributary cells.
const CELL_PALETTE: [&str; 5] = ["lightblue", "lightgreen", "lightpink", "lightyellow", "lightgray"];
/// Width of floor drawings in pixels; the height follows the floor's aspect ratio.
const FLOOR_WIDTH_PX: f64 = 800.0;
/// Canvas size of response plots in pixels.
const PLOT_SIZE_PX: (f64, f64) = (800.0, 600.0);
/// Blank border around every drawing in pixels.
const MARGIN_PX: f64 = 50.0;

/// Finished SVG markup.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDocument(String);

impl SvgDocument {
    /// Markup as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Write the markup to `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path.as_ref(), self.0.as_bytes())?;
        info!("wrote {}", path.as_ref().display());
        Ok(())
    }
}

/// Maps world coordinates onto the canvas.
#[derive(Clone, Copy, Debug)]
struct Frame {
    x_min: f64,
    y_max: f64,
    x_scale: f64,
    y_scale: f64,
}

impl Frame {
    /// Frame showing `bounds` at the same scale on both axes, `width` pixels wide.
    fn uniform(bounds: &Bounds, width: f64) -> (Self, f64) {
        let scale = width / bounds.width().max(f64::EPSILON);
        let height = bounds.height() * scale;
        (
            Self {
                x_min: bounds.min.x,
                y_max: bounds.max.y,
                x_scale: scale,
                y_scale: scale,
            },
            height,
        )
    }

    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        (
            MARGIN_PX + (x - self.x_min) * self.x_scale,
            MARGIN_PX + (self.y_max - y) * self.y_scale,
        )
    }

    fn map_point(&self, p: Point) -> (f64, f64) {
        self.map(p.x, p.y)
    }
}

/// Accumulates SVG elements.
struct SvgBuilder {
    content: String,
}

impl SvgBuilder {
    /// Header, style sheet and white background for a canvas of the given drawing size.
    fn new(width: f64, height: f64, style: &str) -> Self {
        let total_width = width + 2.0 * MARGIN_PX;
        let total_height = height + 2.0 * MARGIN_PX;
        let mut content = String::new();
        write!(
            content,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{total_width:.0}" height="{total_height:.0}" viewBox="0 0 {total_width:.3} {total_height:.3}" xmlns="http://www.w3.org/2000/svg">
  <style>
    text {{ font-family: "Times New Roman", serif; }}
{style}
  </style>
  <rect x="0" y="0" width="{total_width:.3}" height="{total_height:.3}" fill="white" />
"#
        )
        .expect("writing to string cannot fail");
        Self { content }
    }

    fn polygon(&mut self, points: &[(f64, f64)], class: &str, fill: Option<&str>) {
        if points.len() < 3 {
            return;
        }
        let fill = fill.map(|colour| format!(r#" fill="{colour}""#)).unwrap_or_default();
        writeln!(
            self.content,
            r#"  <polygon points="{}" class="{class}"{fill} />"#,
            join_points(points)
        )
        .expect("writing to string cannot fail");
    }

    fn polyline(&mut self, points: &[(f64, f64)], class: &str) {
        if points.len() < 2 {
            return;
        }
        writeln!(
            self.content,
            r#"  <polyline points="{}" class="{class}" />"#,
            join_points(points)
        )
        .expect("writing to string cannot fail");
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), class: &str) {
        writeln!(
            self.content,
            r#"  <line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" class="{class}" />"#,
            from.0, from.1, to.0, to.1
        )
        .expect("writing to string cannot fail");
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, class: &str) {
        writeln!(
            self.content,
            r#"  <circle cx="{:.3}" cy="{:.3}" r="{radius:.3}" class="{class}" />"#,
            center.0, center.1
        )
        .expect("writing to string cannot fail");
    }

    fn text(&mut self, at: (f64, f64), text: &str, class: &str) {
        writeln!(
            self.content,
            r#"  <text x="{:.3}" y="{:.3}" class="{class}">{}</text>"#,
            at.0,
            at.1,
            escape(text)
        )
        .expect("writing to string cannot fail");
    }

    /// Open a group clipped to the rectangle between two canvas corners.
    fn begin_clip(&mut self, id: &str, top_left: (f64, f64), bottom_right: (f64, f64)) {
        writeln!(
            self.content,
            r#"  <clipPath id="{id}"><rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" /></clipPath>
  <g clip-path="url(#{id})">"#,
            top_left.0,
            top_left.1,
            bottom_right.0 - top_left.0,
            bottom_right.1 - top_left.1
        )
        .expect("writing to string cannot fail");
    }

    fn end_group(&mut self) {
        self.content.push_str("  </g>\n");
    }

    fn finish(mut self) -> SvgDocument {
        self.content.push_str("</svg>\n");
        SvgDocument(self.content)
    }
}

fn join_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.3},{y:.3}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn draw_boundary(svg: &mut SvgBuilder, frame: &Frame, boundary: &FloorBoundary) {
    let outline: Vec<(f64, f64)> = boundary
        .vertices()
        .iter()
        .map(|&vertex| frame.map_point(vertex))
        .collect();
    svg.polygon(&outline, "boundary", None);
}

/// Filled tributary cells labelled with column name and force.
#[must_use]
pub fn tributary_svg(distribution: &Distribution, force_unit: &str) -> SvgDocument {
    let bounds = distribution.boundary.bounds();
    let (frame, height) = Frame::uniform(&bounds, FLOOR_WIDTH_PX);
    let mut svg = SvgBuilder::new(
        FLOOR_WIDTH_PX,
        height,
        r#"    .boundary { fill: none; stroke: black; stroke-width: 2; }
    .cell { fill-opacity: 0.5; stroke: black; stroke-width: 1; }
    .column { fill: black; }
    .label { font-size: 13px; font-weight: bold; text-anchor: middle; dominant-baseline: middle; }
    .title { font-size: 18px; text-anchor: middle; }"#,
    );

    let cells = distribution
        .allocations
        .iter()
        .filter(|allocation| !allocation.cell.is_degenerate());
    for (index, allocation) in cells.enumerate() {
        let colour = CELL_PALETTE[index % CELL_PALETTE.len()];
        for ring in allocation.cell.rings() {
            let mapped: Vec<(f64, f64)> = ring.iter().map(|&p| frame.map_point(p)).collect();
            svg.polygon(&mapped, "cell", Some(colour));
        }
    }
    draw_boundary(&mut svg, &frame, &distribution.boundary);

    for allocation in &distribution.allocations {
        let (x, y) = frame.map_point(allocation.position);
        svg.circle((x, y), 3.0, "column");
        svg.text((x, y - 9.0), &allocation.label, "label");
        svg.text(
            (x, y + 9.0),
            &format!("{:.1} {force_unit}", allocation.force),
            "label",
        );
    }

    svg.text(
        (MARGIN_PX + FLOOR_WIDTH_PX / 2.0, MARGIN_PX * 0.6),
        &format!(
            "Tributary areas ({:.2} m × {:.2} m)",
            bounds.width(),
            bounds.height()
        ),
        "title",
    );
    svg.finish()
}

/// Visible region of a response plot in plot coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotWindow {
    /// Left edge (frequency ratio).
    pub x_min: f64,
    /// Right edge (frequency ratio).
    pub x_max: f64,
    /// Bottom edge (response factor).
    pub y_min: f64,
    /// Top edge (response factor).
    pub y_max: f64,
}

impl PlotWindow {
    /// Whole sampled range, from zero response to a little above the highest sample.
    #[must_use]
    pub fn full(curve: &ResponseCurve) -> Self {
        let peak = curve
            .sample()
            .into_iter()
            .map(|(_, response)| response)
            .filter(|response| response.is_finite())
            .fold(1.0_f64, f64::max);
        Self {
            x_min: curve.ratio_min,
            x_max: curve.ratio_max,
            y_min: 0.0,
            y_max: peak * 1.05,
        }
    }

    /// Close-up of the flat region around unit response.
    #[must_use]
    pub fn zoomed() -> Self {
        Self {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.95,
            y_max: 1.05,
        }
    }

    fn frame(&self) -> Frame {
        let (width, height) = PLOT_SIZE_PX;
        Frame {
            x_min: self.x_min,
            y_max: self.y_max,
            x_scale: width / (self.x_max - self.x_min).max(f64::EPSILON),
            y_scale: height / (self.y_max - self.y_min).max(f64::EPSILON),
        }
    }
}

/// Response curve with threshold lines, crossing markers and shaded in-band intervals.
#[must_use]
pub fn response_svg(
    curve: &ResponseCurve,
    analysis: &ResponseAnalysis,
    window: &PlotWindow,
) -> SvgDocument {
    let (width, height) = PLOT_SIZE_PX;
    let frame = window.frame();
    let mut svg = SvgBuilder::new(
        width,
        height,
        r#"    .axes { fill: none; stroke: black; stroke-width: 1; }
    .grid { stroke: #dddddd; stroke-width: 1; }
    .curve { fill: none; stroke: #1f77b4; stroke-width: 2; }
    .upper { stroke: red; stroke-width: 1.5; stroke-dasharray: 6,4; }
    .lower { stroke: green; stroke-width: 1.5; stroke-dasharray: 6,4; }
    .upper-root { fill: red; }
    .lower-root { fill: green; }
    .band-low { fill: orange; fill-opacity: 0.3; stroke: none; }
    .band-high { fill: cyan; fill-opacity: 0.3; stroke: none; }
    .tick { font-size: 12px; text-anchor: middle; }
    .axis-label { font-size: 16px; text-anchor: middle; }"#,
    );
    let top_left = (MARGIN_PX, MARGIN_PX);
    let bottom_right = (MARGIN_PX + width, MARGIN_PX + height);

    // Grid with five divisions per axis.
    for step in 0..=5 {
        let fraction = f64::from(step) / 5.0;
        let x = window.x_min + fraction * (window.x_max - window.x_min);
        let y = window.y_min + fraction * (window.y_max - window.y_min);
        svg.line(frame.map(x, window.y_min), frame.map(x, window.y_max), "grid");
        svg.line(frame.map(window.x_min, y), frame.map(window.x_max, y), "grid");
        let (tick_x, tick_bottom) = frame.map(x, window.y_min);
        svg.text((tick_x, tick_bottom + 16.0), &format!("{x:.2}"), "tick");
        let (tick_left, tick_y) = frame.map(window.x_min, y);
        svg.text((tick_left - 24.0, tick_y + 4.0), &format!("{y:.3}"), "tick");
    }

    svg.begin_clip("plot-area", top_left, bottom_right);
    let samples = curve.sample();
    for (index, &(low, high)) in analysis.band_intervals.iter().enumerate() {
        let mut outline = vec![frame.map(low, 0.0), frame.map(low, curve.response(low))];
        outline.extend(
            samples
                .iter()
                .filter(|(ratio, _)| *ratio > low && *ratio < high)
                .map(|&(ratio, response)| frame.map(ratio, response)),
        );
        outline.push(frame.map(high, curve.response(high)));
        outline.push(frame.map(high, 0.0));
        let class = if index == 0 { "band-low" } else { "band-high" };
        svg.polygon(&outline, class, None);
    }
    let points: Vec<(f64, f64)> = samples
        .iter()
        .filter(|(_, response)| response.is_finite())
        .map(|&(ratio, response)| frame.map(ratio, response))
        .collect();
    svg.polyline(&points, "curve");
    for (level, class) in [(analysis.band.upper, "upper"), (analysis.band.lower, "lower")] {
        svg.line(frame.map(window.x_min, level), frame.map(window.x_max, level), class);
    }
    for &root in &analysis.upper_crossings {
        svg.circle(frame.map(root, analysis.band.upper), 4.0, "upper-root");
    }
    for &root in &analysis.lower_crossings {
        svg.circle(frame.map(root, analysis.band.lower), 4.0, "lower-root");
    }
    svg.end_group();

    svg.polygon(
        &[
            top_left,
            (bottom_right.0, top_left.1),
            bottom_right,
            (top_left.0, bottom_right.1),
        ],
        "axes",
        None,
    );
    svg.text(
        (MARGIN_PX + width / 2.0, bottom_right.1 + 40.0),
        "f / fn",
        "axis-label",
    );
    svg.text(
        (MARGIN_PX + width / 2.0, MARGIN_PX * 0.6),
        &format!(
            "ωn² u0 / üg0 for ζ = {:.2} (band {:.2} to {:.2})",
            curve.damping_ratio, analysis.band.lower, analysis.band.upper
        ),
        "axis-label",
    );
    svg.finish()
}

/// Floor outline, columns, rays and bisectors.
#[must_use]
pub fn ray_svg(boundary: &FloorBoundary, columns: &[Column], diagram: &RayDiagram) -> SvgDocument {
    // One metre of blank floor around the outline.
    let bounds = boundary.bounds();
    let padded = Bounds {
        min: Point::new(bounds.min.x - 1.0, bounds.min.y - 1.0),
        max: Point::new(bounds.max.x + 1.0, bounds.max.y + 1.0),
    };
    let (frame, height) = Frame::uniform(&padded, FLOOR_WIDTH_PX);
    let mut svg = SvgBuilder::new(
        FLOOR_WIDTH_PX,
        height,
        r#"    .boundary { fill: none; stroke: black; stroke-width: 2; }
    .ray { stroke: blue; stroke-width: 1; stroke-dasharray: 5,4; }
    .bisector { stroke: green; stroke-width: 2; stroke-opacity: 0.7; }
    .column { fill: red; }
    .column-label { font-size: 12px; fill: white; text-anchor: middle; dominant-baseline: middle; }"#,
    );

    draw_boundary(&mut svg, &frame, boundary);
    for ray in &diagram.rays {
        svg.line(frame.map_point(ray.start), frame.map_point(ray.end), "ray");
    }
    for bisector in &diagram.bisectors {
        svg.line(
            frame.map_point(bisector.origin),
            frame.map_point(bisector.end),
            "bisector",
        );
    }
    for column in columns {
        let center = frame.map_point(column.position);
        svg.circle(center, 9.0, "column");
        svg.text(center, &column.label, "column-label");
    }
    svg.finish()
}

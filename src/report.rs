use crate::analysis::{DistributionSummary, ResponseSummary};
use std::fmt::Write;
use tributary::RayDiagram;

/// Render a per-column table of tributary areas and forces.
///
/// Columns appear in the order they were defined so the table lines up with the
/// input drawing.
#[must_use]
pub fn render_distribution(summary: &DistributionSummary) -> String {
    let distribution = &summary.distribution;
    let unit = &summary.force_unit;
    let mut output = String::new();

    writeln!(
        &mut output,
        "Tributary-area distribution (total force = {:.1} {unit}, floor area = {:.3} m²)",
        distribution.total_force,
        distribution.boundary_area()
    )
    .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "{:<8} {:>10} {:>10} {:>12} {:>12}",
        "column",
        "x [m]",
        "y [m]",
        "area [m²]",
        format!("force [{unit}]")
    )
    .expect("writing to string cannot fail");

    for allocation in &distribution.allocations {
        writeln!(
            &mut output,
            "{:<8} {:>10.3} {:>10.3} {:>12.3} {:>12.1}",
            allocation.label,
            allocation.position.x,
            allocation.position.y,
            allocation.area(),
            allocation.force
        )
        .expect("writing to string cannot fail");
    }

    writeln!(
        &mut output,
        "Total: area = {:.3} m², force = {:.1} {unit}",
        distribution.total_area,
        distribution.force_sum()
    )
    .expect("writing to string cannot fail");

    // Round-off from clipping leaves slivers far below this.
    if distribution.unassigned_area > 1.0e-9 * distribution.boundary_area() {
        writeln!(
            &mut output,
            "Warning: {:.6} m² of the floor is not tributary to any column",
            distribution.unassigned_area
        )
        .expect("writing to string cannot fail");
    }
    writeln!(
        &mut output,
        "Padding ratio used: {}",
        distribution.padding_ratio
    )
    .expect("writing to string cannot fail");

    output
}

/// Render the threshold crossings of the response study.
#[must_use]
pub fn render_response(summary: &ResponseSummary) -> String {
    let analysis = &summary.analysis;
    let mut output = String::new();

    writeln!(
        &mut output,
        "Deformation response factor (damping ratio = {:.2}, f/fn in [{}, {}])",
        summary.curve.damping_ratio, summary.curve.ratio_min, summary.curve.ratio_max
    )
    .expect("writing to string cannot fail");

    match summary.peak {
        Some((ratio, response)) => writeln!(
            &mut output,
            "Resonant peak: R = {response:.4} at f/fn = {ratio:.4}"
        )
        .expect("writing to string cannot fail"),
        None => output.push_str("Resonant peak: none (response decreases from f/fn = 0)\n"),
    }

    for (name, level, roots) in [
        ("upper", analysis.band.upper, &analysis.upper_crossings),
        ("lower", analysis.band.lower, &analysis.lower_crossings),
    ] {
        let formatted: Vec<String> = roots.iter().map(|root| format!("{root:.6}")).collect();
        writeln!(
            &mut output,
            "Crossings of the {name} threshold R = {level}: [{}]",
            formatted.join(", ")
        )
        .expect("writing to string cannot fail");
    }

    if analysis.band_intervals.is_empty() {
        output.push_str("No positive frequency ratio keeps the response inside the band\n");
    }
    for (low, high) in &analysis.band_intervals {
        writeln!(
            &mut output,
            "Response within [{}, {}] for f/fn in [{low:.6}, {high:.6}]",
            analysis.band.lower, analysis.band.upper
        )
        .expect("writing to string cannot fail");
    }

    output
}

/// Render the rays and bisectors of the ray construction.
#[must_use]
pub fn render_rays(diagram: &RayDiagram) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Ray construction: {} rays, {} bisectors",
        diagram.rays.len(),
        diagram.bisectors.len()
    )
    .expect("writing to string cannot fail");

    for ray in &diagram.rays {
        writeln!(
            &mut output,
            "ray {:<6} {:>6.1}°  ({:.3}, {:.3}) -> ({:.3}, {:.3})  length {:.3} m",
            ray.column,
            ray.angle_degrees,
            ray.start.x,
            ray.start.y,
            ray.end.x,
            ray.end.y,
            ray.length()
        )
        .expect("writing to string cannot fail");
    }
    for bisector in &diagram.bisectors {
        writeln!(
            &mut output,
            "bisector {}/{}  ({:.3}, {:.3}) -> ({:.3}, {:.3})",
            bisector.columns.0,
            bisector.columns.1,
            bisector.origin.x,
            bisector.origin.y,
            bisector.end.x,
            bisector.end.y
        )
        .expect("writing to string cannot fail");
    }

    output
}

//! Diagonal rays cast from each column and the bisectors between crossing rays.
//!
//! Every column sends rays at fixed angles towards the slab edge. A ray stops at the
//! nearest point where it crosses a ray of another column inside the slab. Wherever two
//! of the shortened rays still cross, a bisector of the two ray directions is drawn
//! until it reaches the slab edge or passes through another crossing.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::Line;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::errors::RayError;
use crate::geometry::{FloorBoundary, Point, COINCIDENT_TOLERANCE};
use crate::tributary::{Column, FloorPlan};

/// Ray sums shorter than this are treated as opposite directions.
const PARALLEL_TOLERANCE: f64 = 1.0e-8;
/// Largest offset from a bisector at which a crossing still counts as lying on it.
const ON_LINE_TOLERANCE: f64 = 1.0e-6;

/// Angles and lengths used for the construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaySettings {
    /// Directions of the rays in degrees, counter-clockwise from +X.
    pub angles_degrees: Vec<f64>,
    /// Length of a ray before it is cut at the slab edge, in metres.
    pub ray_length: f64,
    /// Length of a bisector before it is cut, in metres.
    pub bisector_length: f64,
}

impl Default for RaySettings {
    fn default() -> Self {
        Self {
            angles_degrees: vec![45.0, 135.0, 225.0, 315.0],
            ray_length: 20.0,
            bisector_length: 10.0,
        }
    }
}

impl RaySettings {
    /// Check that lengths are positive and angles finite.
    ///
    /// # Errors
    ///
    /// Returns [`RayError`] naming the first unusable setting.
    pub fn validate(&self) -> Result<(), RayError> {
        for (name, value) in [
            ("ray_length", self.ray_length),
            ("bisector_length", self.bisector_length),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RayError::NonPositiveLength { name, value });
            }
        }
        if let Some(&angle) = self.angles_degrees.iter().find(|angle| !angle.is_finite()) {
            return Err(RayError::NonFiniteAngle(angle));
        }
        Ok(())
    }
}

/// Ray from a column towards the slab edge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ray {
    /// Label of the column the ray starts at.
    pub column: String,
    /// Direction in degrees.
    pub angle_degrees: f64,
    /// Column position.
    pub start: Point,
    /// Where the ray stops.
    pub end: Point,
}

impl Ray {
    /// Unit vector along the ray.
    #[must_use]
    pub fn direction(&self) -> Vector2<f64> {
        unit_vector(self.angle_degrees)
    }

    /// Length of the ray in metres.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Bisector drawn from the crossing of two rays.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bisector {
    /// Columns owning the two crossing rays.
    pub columns: (String, String),
    /// Crossing the bisector starts at.
    pub origin: Point,
    /// Where the bisector stops.
    pub end: Point,
}

/// Rays and bisectors for a floor plan.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RayDiagram {
    /// Rays grouped by column in insertion order, then by angle.
    pub rays: Vec<Ray>,
    /// Bisectors in the order their crossings were found.
    pub bisectors: Vec<Bisector>,
}

/// Crossing of two rays of different columns strictly inside the slab.
#[derive(Clone, Copy, Debug)]
struct Crossing {
    first: usize,
    second: usize,
    at: Point,
}

fn unit_vector(angle_degrees: f64) -> Vector2<f64> {
    let radians = angle_degrees.to_radians();
    Vector2::new(radians.cos(), radians.sin())
}

fn single_crossing(a: Line<f64>, b: Line<f64>) -> Option<Point> {
    match line_intersection(a, b) {
        Some(LineIntersection::SinglePoint { intersection, .. }) => Some(intersection.into()),
        _ => None,
    }
}

fn nearest(from: Point, candidates: impl IntoIterator<Item = Point>) -> Option<Point> {
    candidates
        .into_iter()
        .min_by(|a, b| from.distance(*a).total_cmp(&from.distance(*b)))
}

impl FloorPlan {
    /// Cast rays from every column and draw the bisectors between crossing rays.
    ///
    /// # Errors
    ///
    /// Returns [`RayError`] when `settings` are unusable.
    pub fn cast_rays(&self, settings: &RaySettings) -> Result<RayDiagram, RayError> {
        cast_rays(self.columns(), self.boundary(), settings)
    }
}

/// Build the ray diagram for `columns` inside `boundary`.
///
/// A ray whose only contact with the edge is its own start point, or that is too short
/// to reach the edge, is dropped.
///
/// # Errors
///
/// Returns [`RayError`] when `settings` are unusable.
pub fn cast_rays(
    columns: &[Column],
    boundary: &FloorBoundary,
    settings: &RaySettings,
) -> Result<RayDiagram, RayError> {
    settings.validate()?;

    let mut rays = Vec::new();
    for column in columns {
        let start = column.position;
        for &angle_degrees in &settings.angles_degrees {
            let far: Point =
                (start.to_vector() + unit_vector(angle_degrees) * settings.ray_length).into();
            let hits = boundary
                .segment_hits(start, far)
                .into_iter()
                .filter(|hit| hit.distance(start) > COINCIDENT_TOLERANCE);
            if let Some(end) = nearest(start, hits) {
                rays.push(Ray {
                    column: column.label.clone(),
                    angle_degrees,
                    start,
                    end,
                });
            }
        }
    }

    // Crossings of the full-length rays decide where each ray stops.
    let crossings = ray_crossings(&rays, boundary);
    let stops: Vec<Option<Point>> = (0..rays.len())
        .map(|index| {
            nearest(
                rays[index].start,
                crossings
                    .iter()
                    .filter(|crossing| crossing.first == index || crossing.second == index)
                    .map(|crossing| crossing.at),
            )
        })
        .collect();
    for (ray, stop) in rays.iter_mut().zip(stops) {
        if let Some(stop) = stop {
            ray.end = stop;
        }
    }

    // The shortened rays still cross where both reach the crossing.
    let reaches = |crossing: &Crossing, index: usize| {
        let ray = &rays[index];
        ray.start.distance(crossing.at) <= ray.length() + COINCIDENT_TOLERANCE
    };
    let remaining: Vec<Crossing> = crossings
        .iter()
        .filter(|crossing| reaches(crossing, crossing.first) && reaches(crossing, crossing.second))
        .copied()
        .collect();

    let bisectors = remaining
        .iter()
        .map(|crossing| bisector(crossing, &remaining, &rays, boundary, settings))
        .collect();

    Ok(RayDiagram { rays, bisectors })
}

/// Pairwise crossings of rays from different columns strictly inside the slab.
fn ray_crossings(rays: &[Ray], boundary: &FloorBoundary) -> Vec<Crossing> {
    let mut crossings = Vec::new();
    for first in 0..rays.len() {
        for second in first + 1..rays.len() {
            if rays[first].column == rays[second].column {
                continue;
            }
            let segment = |ray: &Ray| Line::new(ray.start, ray.end);
            if let Some(at) = single_crossing(segment(&rays[first]), segment(&rays[second])) {
                if boundary.contains(at) {
                    crossings.push(Crossing { first, second, at });
                }
            }
        }
    }
    crossings
}

fn bisector(
    crossing: &Crossing,
    crossings: &[Crossing],
    rays: &[Ray],
    boundary: &FloorBoundary,
    settings: &RaySettings,
) -> Bisector {
    let first = &rays[crossing.first];
    let second = &rays[crossing.second];
    let v1 = first.direction();
    let mut direction = v1 + second.direction();
    if direction.norm() < PARALLEL_TOLERANCE {
        direction = Vector2::new(-v1.y, v1.x);
    }
    let direction = direction.normalize();

    let origin = crossing.at;
    let far: Point = (origin.to_vector() + direction * settings.bisector_length).into();
    let mut targets = boundary.segment_hits(origin, far);
    for other in crossings {
        if other.first == crossing.first && other.second == crossing.second {
            continue;
        }
        let offset = other.at.to_vector() - origin.to_vector();
        let along = offset.dot(&direction);
        if along > PARALLEL_TOLERANCE && (offset - direction * along).norm() < ON_LINE_TOLERANCE {
            targets.push(other.at);
        }
    }

    Bisector {
        columns: (first.column.clone(), second.column.clone()),
        origin,
        end: nearest(origin, targets).unwrap_or(far),
    }
}

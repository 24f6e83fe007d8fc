//! Fundamental planar types for floor layouts.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Contains, Coord, Line, LineString, Polygon};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::errors::BoundaryError;

/// Distance below which two positions are treated as the same location, in metres.
pub(crate) const COINCIDENT_TOLERANCE: f64 = 1.0e-9;

/// Position on the floor plane measured in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point> for Vector2<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

impl From<Coord<f64>> for Point {
    fn from(value: Coord<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point> for Coord<f64> {
    fn from(value: Point) -> Self {
        Coord {
            x: value.x,
            y: value.y,
        }
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use tributary::point;
///
/// let origin = point(0.0, 3.1);
/// assert_eq!(origin.y, 3.1);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    /// Corner with the smallest coordinates.
    pub min: Point,
    /// Corner with the largest coordinates.
    pub max: Point,
}

impl Bounds {
    /// Smallest box enclosing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        points.into_iter().fold(None, |bounds, p| {
            Some(match bounds {
                None => Self { min: p, max: p },
                Some(Self { min, max }) => Self {
                    min: point(min.x.min(p.x), min.y.min(p.y)),
                    max: point(max.x.max(p.x), max.y.max(p.y)),
                },
            })
        })
    }

    /// Extent along X.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Grow the box by `ratio` of its width on both X sides and of its height on both Y sides.
    #[must_use]
    pub fn expanded(&self, ratio: f64) -> Self {
        let pad_x = self.width() * ratio;
        let pad_y = self.height() * ratio;
        Self {
            min: point(self.min.x - pad_x, self.min.y - pad_y),
            max: point(self.max.x + pad_x, self.max.y + pad_y),
        }
    }

    /// Corners in counter-clockwise order starting at `min`.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            point(self.max.x, self.min.y),
            self.max,
            point(self.min.x, self.max.y),
        ]
    }

    /// Part of a convex ring inside the box (Sutherland-Hodgman).
    ///
    /// Crossing points are snapped onto the box edge, so neighbouring rings clipped
    /// against the same box share their edge points exactly.
    #[must_use]
    pub fn clip_ring(&self, ring: &[Point]) -> Vec<Point> {
        let mut output = ring.to_vec();
        for side in [Side::Left, Side::Right, Side::Bottom, Side::Top] {
            let input = std::mem::take(&mut output);
            let Some(&last) = input.last() else {
                break;
            };
            let mut previous = last;
            for &current in &input {
                let current_inside = self.keeps(side, current);
                if current_inside != self.keeps(side, previous) {
                    output.push(self.crossing(side, previous, current));
                }
                if current_inside {
                    output.push(current);
                }
                previous = current;
            }
        }
        dedup_ring(output)
    }

    fn keeps(&self, side: Side, p: Point) -> bool {
        match side {
            Side::Left => p.x >= self.min.x,
            Side::Right => p.x <= self.max.x,
            Side::Bottom => p.y >= self.min.y,
            Side::Top => p.y <= self.max.y,
        }
    }

    /// Where segment `a`-`b` meets the line of `side`; only called when it does.
    fn crossing(&self, side: Side, a: Point, b: Point) -> Point {
        // Interpolate in a fixed direction so both traversals round the same way.
        let (p, q) = if (a.x, a.y) <= (b.x, b.y) { (a, b) } else { (b, a) };
        let along_x = |x: f64| point(x, p.y + (q.y - p.y) * (x - p.x) / (q.x - p.x));
        let along_y = |y: f64| point(p.x + (q.x - p.x) * (y - p.y) / (q.y - p.y), y);
        match side {
            Side::Left => along_x(self.min.x),
            Side::Right => along_x(self.max.x),
            Side::Bottom => along_y(self.min.y),
            Side::Top => along_y(self.max.y),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Left,
    Right,
    Bottom,
    Top,
}

/// Drop consecutive vertices closer than [`COINCIDENT_TOLERANCE`], including a closing
/// vertex that repeats the first.
pub(crate) fn dedup_ring(vertices: impl IntoIterator<Item = Point>) -> Vec<Point> {
    let mut distinct: Vec<Point> = Vec::new();
    for vertex in vertices {
        if distinct
            .last()
            .map_or(true, |last| last.distance(vertex) > COINCIDENT_TOLERANCE)
        {
            distinct.push(vertex);
        }
    }
    while let [first, .., last] = distinct.as_slice() {
        if first.distance(*last) > COINCIDENT_TOLERANCE {
            break;
        }
        distinct.pop();
    }
    distinct
}

/// Simple closed polygon outlining a floor slab.
///
/// Construction validates the outline, so every [`FloorBoundary`] in circulation has at
/// least three distinct finite vertices, a positive area and no crossing edges.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FloorBoundary {
    /// Vertices in input order, without a repeated closing vertex.
    vertices: Vec<Point>,
    /// Enclosed area in square metres.
    area: f64,
    /// Cached polygon used for clipping and containment queries.
    #[serde(skip)]
    polygon: Polygon<f64>,
}

impl FloorBoundary {
    /// Validate an outline and build the boundary.
    ///
    /// A closing vertex equal to the first one is accepted and dropped, as are
    /// consecutive repeats.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] when the outline has non-finite coordinates, fewer than
    /// three distinct vertices, zero area or intersecting edges.
    ///
    /// # Examples
    /// ```
    /// use tributary::{point, BoundaryError, FloorBoundary};
    ///
    /// let bow_tie = vec![
    ///     point(0.0, 0.0),
    ///     point(4.0, 4.0),
    ///     point(4.0, 0.0),
    ///     point(0.0, 6.0),
    /// ];
    /// let error = FloorBoundary::new(bow_tie).expect_err("crossing edges rejected");
    /// assert!(matches!(error, BoundaryError::SelfIntersection { .. }));
    /// ```
    pub fn new(vertices: Vec<Point>) -> Result<Self, BoundaryError> {
        if let Some(index) = vertices.iter().position(|vertex| !vertex.is_finite()) {
            return Err(BoundaryError::NonFiniteVertex(index));
        }
        let distinct = dedup_ring(vertices);
        if distinct.len() < 3 {
            return Err(BoundaryError::TooFewVertices(distinct.len()));
        }

        let ring: Vec<Coord<f64>> = distinct.iter().map(|&vertex| vertex.into()).collect();
        let polygon = Polygon::new(LineString::new(ring), vec![]);
        let boundary = Self {
            vertices: distinct,
            area: polygon.unsigned_area(),
            polygon,
        };
        if boundary.area <= f64::EPSILON {
            return Err(BoundaryError::ZeroArea);
        }
        boundary.check_simple()?;
        Ok(boundary)
    }

    /// Build an axis-aligned rectangle from two opposite corners.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] when the corners are not finite or the rectangle is flat.
    pub fn rectangle(min: Point, max: Point) -> Result<Self, BoundaryError> {
        if let Some(index) = [min, max].iter().position(|corner| !corner.is_finite()) {
            return Err(BoundaryError::NonFiniteVertex(index));
        }
        let bounds = Bounds::from_points([min, max]).ok_or(BoundaryError::TooFewVertices(0))?;
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(BoundaryError::ZeroArea);
        }
        Self::new(bounds.corners().to_vec())
    }

    /// Vertices of the outline in input order.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Enclosed area in square metres.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Bounding box of the outline.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        // A validated boundary always has vertices.
        Bounds::from_points(self.vertices.iter().copied()).unwrap_or(Bounds {
            min: point(0.0, 0.0),
            max: point(0.0, 0.0),
        })
    }

    /// Whether the outline fills its bounding box, i.e. is an axis-aligned rectangle.
    #[must_use]
    pub fn is_rectangle(&self) -> bool {
        let bounds = self.bounds();
        (bounds.width() * bounds.height() - self.area).abs() <= 1.0e-12 * self.area
    }

    /// Outline as a `geo` polygon.
    #[must_use]
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Edges of the outline; edge `i` runs from vertex `i` to vertex `i + 1`.
    pub fn edges(&self) -> impl Iterator<Item = Line<f64>> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Line::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Whether `p` lies strictly inside the outline; points on an edge are outside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.polygon.contains(&geo::Point::new(p.x, p.y))
    }

    /// Points where the segment from `start` to `end` meets the outline.
    #[must_use]
    pub fn segment_hits(&self, start: Point, end: Point) -> Vec<Point> {
        let segment = Line::new(start, end);
        let mut hits = Vec::new();
        for edge in self.edges() {
            match line_intersection(segment, edge) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    hits.push(intersection.into());
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    hits.push(intersection.start.into());
                    hits.push(intersection.end.into());
                }
                None => {}
            }
        }
        hits
    }

    /// Reject outlines whose edges cross or fold back on each other.
    fn check_simple(&self) -> Result<(), BoundaryError> {
        let edges: Vec<Line<f64>> = self.edges().collect();
        let n = edges.len();
        for first in 0..n {
            for second in first + 1..n {
                let adjacent = second == first + 1 || (first == 0 && second == n - 1);
                match line_intersection(edges[first], edges[second]) {
                    Some(LineIntersection::Collinear { .. }) => {
                        return Err(BoundaryError::SelfIntersection { first, second });
                    }
                    Some(LineIntersection::SinglePoint { .. }) if !adjacent => {
                        return Err(BoundaryError::SelfIntersection { first, second });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn point_to_vector_roundtrip() {
        let origin = Point::new(1.0, 2.0);
        let vector: Vector2<f64> = origin.into();
        assert_eq!(vector, Vector2::new(1.0, 2.0));
        assert_eq!(Point::from(vector), origin);
    }

    #[test]
    fn rectangle_reports_area_and_bounds() {
        let boundary = FloorBoundary::rectangle(point(0.0, 0.0), point(18.69, 11.51))
            .expect("rectangle accepted");
        assert_relative_eq!(boundary.area(), 18.69 * 11.51, epsilon = 1.0e-9);
        let bounds = boundary.bounds();
        assert_relative_eq!(bounds.width(), 18.69);
        assert_relative_eq!(bounds.height(), 11.51);
        assert_eq!(boundary.vertices().len(), 4);
    }

    #[test]
    fn closing_vertex_is_dropped() {
        let boundary = FloorBoundary::new(vec![
            point(0.0, 0.0),
            point(2.0, 0.0),
            point(2.0, 2.0),
            point(0.0, 0.0),
        ])
        .expect("triangle accepted");
        assert_eq!(boundary.vertices().len(), 3);
        assert_relative_eq!(boundary.area(), 2.0);
    }

    #[test]
    fn degenerate_outlines_are_rejected() {
        assert_eq!(
            FloorBoundary::new(vec![point(0.0, 0.0), point(1.0, 0.0)]),
            Err(BoundaryError::TooFewVertices(2))
        );
        assert_eq!(
            FloorBoundary::new(vec![point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0)]),
            Err(BoundaryError::ZeroArea)
        );
        assert_eq!(
            FloorBoundary::new(vec![point(0.0, 0.0), point(f64::NAN, 0.0), point(0.0, 1.0)]),
            Err(BoundaryError::NonFiniteVertex(1))
        );
    }

    #[test]
    fn non_convex_outline_is_accepted() {
        let l_shape = FloorBoundary::new(vec![
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 4.0),
            point(4.0, 4.0),
            point(4.0, 10.0),
            point(0.0, 10.0),
        ])
        .expect("L-shape accepted");
        assert_relative_eq!(l_shape.area(), 64.0, epsilon = 1.0e-9);
        assert!(l_shape.contains(point(2.0, 8.0)));
        assert!(!l_shape.contains(point(8.0, 8.0)));
    }

    #[test]
    fn points_on_the_edge_are_not_contained() {
        let boundary =
            FloorBoundary::rectangle(point(0.0, 0.0), point(4.0, 4.0)).expect("square accepted");
        assert!(boundary.contains(point(2.0, 2.0)));
        assert!(!boundary.contains(point(0.0, 2.0)));
    }

    #[test]
    fn flat_rectangle_has_zero_area() {
        assert_eq!(
            FloorBoundary::rectangle(point(0.0, 0.0), point(5.0, 0.0)),
            Err(BoundaryError::ZeroArea)
        );
        assert_eq!(
            FloorBoundary::rectangle(point(0.0, 0.0), point(f64::NAN, 1.0)),
            Err(BoundaryError::NonFiniteVertex(1))
        );
    }

    #[test]
    fn only_box_shaped_outlines_are_rectangles() {
        let square =
            FloorBoundary::rectangle(point(0.0, 0.0), point(4.0, 4.0)).expect("square accepted");
        assert!(square.is_rectangle());
        let triangle = FloorBoundary::new(vec![point(0.0, 0.0), point(4.0, 0.0), point(0.0, 4.0)])
            .expect("triangle accepted");
        assert!(!triangle.is_rectangle());
    }

    #[test]
    fn ring_clipping_keeps_the_part_inside_the_box() {
        let bounds = Bounds {
            min: point(0.0, 0.0),
            max: point(10.0, 0.01),
        };
        // A tall Voronoi-like face reaching far beyond a slender box.
        let face = [
            point(100.0, -3.1e6),
            point(200.0, -3.1e6),
            point(200.0, 3.1e6),
            point(100.0, 3.1e6),
        ];
        assert!(bounds.clip_ring(&face).is_empty());

        let face = [
            point(2.0, -3.1e6),
            point(6.0, -3.1e6),
            point(6.0, 3.1e6),
            point(2.0, 3.1e6),
        ];
        let clipped = bounds.clip_ring(&face);
        assert_eq!(clipped.len(), 4);
        let ring: Vec<Coord<f64>> = clipped.iter().map(|&p| p.into()).collect();
        let area = Polygon::new(LineString::new(ring), vec![]).unsigned_area();
        assert_relative_eq!(area, 0.04, epsilon = 1.0e-15);
    }

    #[test]
    fn near_duplicate_corners_are_merged() {
        let ring = dedup_ring(vec![
            point(7.745, 6.950_000_000_000_001),
            point(7.745, 6.95),
            point(9.0, 7.0),
            point(8.0, 9.0),
            point(7.745, 6.950_000_000_000_001),
        ]);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn segment_hits_report_edge_crossings() {
        let boundary =
            FloorBoundary::rectangle(point(0.0, 0.0), point(4.0, 4.0)).expect("square accepted");
        let hits = boundary.segment_hits(point(2.0, 2.0), point(2.0, 10.0));
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].y, 4.0);
    }
}

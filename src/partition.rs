//! Nearest-point partition of a floor boundary.
//!
//! Cells are the Voronoi faces of the column positions, read off the dual of a Delaunay
//! triangulation and clipped to the floor outline. Four auxiliary points outside the
//! outline's bounding box close off the faces of the outermost columns; they take part in
//! the triangulation but never own a reported cell.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use log::{debug, warn};
use serde::{Deserialize, Serialize, Serializer};
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::errors::{DistributionError, LayoutError};
use crate::geometry::{dedup_ring, point, Bounds, FloorBoundary, Point, COINCIDENT_TOLERANCE};

/// Share of the boundary area below which a clipped cell counts as empty.
const DEGENERATE_AREA_RATIO: f64 = 1.0e-12;
/// Share of the boundary area that may stay unowned before the padding is widened.
const UNASSIGNED_AREA_RATIO: f64 = 1.0e-7;

/// Placement of the auxiliary points that bound the outer cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartitionSettings {
    /// Initial offset of each auxiliary point beyond the bounding box, as a share of the
    /// box width (X) and height (Y).
    pub padding_ratio: f64,
    /// How many times the offset may be doubled while part of the floor is left unowned.
    pub max_padding_rounds: usize,
}

impl Default for PartitionSettings {
    fn default() -> Self {
        Self {
            padding_ratio: 0.1,
            max_padding_rounds: 8,
        }
    }
}

impl PartitionSettings {
    /// Check that the padding ratio is usable.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidPadding`] when the ratio is not positive and finite.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.padding_ratio.is_finite() && self.padding_ratio > 0.0 {
            Ok(())
        } else {
            Err(LayoutError::InvalidPadding(self.padding_ratio))
        }
    }
}

/// Region of the floor closer to one column than to any other site.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
    /// Clipped region; empty for a degenerate cell.
    #[serde(serialize_with = "serialize_region")]
    pub region: MultiPolygon<f64>,
    /// Area of the region in square metres.
    pub area: f64,
}

impl Cell {
    /// A cell that owns no part of the floor.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            region: MultiPolygon::new(vec![]),
            area: 0.0,
        }
    }

    /// Whether the cell owns no part of the floor.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.region.0.is_empty()
    }

    /// Outer rings of the region as vertex lists.
    #[must_use]
    pub fn rings(&self) -> Vec<Vec<Point>> {
        self.region
            .0
            .iter()
            .map(|polygon| polygon.exterior().coords().map(|&c| c.into()).collect())
            .collect()
    }
}

fn serialize_region<S: Serializer>(
    region: &MultiPolygon<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let rings: Vec<Vec<[f64; 2]>> = region
        .0
        .iter()
        .map(|polygon| polygon.exterior().coords().map(|c| [c.x, c.y]).collect())
        .collect();
    rings.serialize(serializer)
}

/// Cells for a set of sites, in site order.
#[derive(Clone, Debug)]
pub struct Partition {
    /// One cell per input site.
    pub cells: Vec<Cell>,
    /// Floor area owned by no site, in square metres.
    pub unassigned_area: f64,
    /// Padding ratio used for the final triangulation.
    pub padding_ratio: f64,
}

/// Auxiliary points beyond each corner of `bounds`.
///
/// # Examples
/// ```
/// use tributary::{padding_points, point, Bounds};
///
/// let bounds = Bounds { min: point(0.0, 0.0), max: point(10.0, 20.0) };
/// let pads = padding_points(&bounds, 0.1);
/// assert_eq!(pads[0], point(-1.0, -2.0));
/// assert_eq!(pads[2], point(11.0, 22.0));
/// ```
#[must_use]
pub fn padding_points(bounds: &Bounds, ratio: f64) -> [Point; 4] {
    bounds.expanded(ratio).corners()
}

/// Partition `boundary` among `sites` by nearest site.
///
/// Sites that share a position with another site receive empty cells and are left out
/// of the triangulation, so the remaining sites still cover the floor. When part of the
/// floor ends up owned by an auxiliary point, the padding ratio is doubled and the
/// partition rebuilt, at most `settings.max_padding_rounds` times.
///
/// # Errors
///
/// Returns [`DistributionError::Triangulation`] when a site cannot be triangulated.
pub fn partition(
    sites: &[Point],
    boundary: &FloorBoundary,
    settings: &PartitionSettings,
) -> Result<Partition, DistributionError> {
    if let Some(site) = sites.iter().find(|site| !site.is_finite()) {
        return Err(DistributionError::Triangulation {
            x: site.x,
            y: site.y,
            reason: "non-finite coordinate".to_owned(),
        });
    }
    let active = distinct_sites(sites);
    if !active.iter().any(|&keep| keep) {
        return Ok(Partition {
            cells: vec![Cell::empty(); sites.len()],
            unassigned_area: boundary.area(),
            padding_ratio: settings.padding_ratio,
        });
    }

    let tolerance = UNASSIGNED_AREA_RATIO * boundary.area();
    let mut ratio = settings.padding_ratio;
    let mut round = 0;
    loop {
        let cells = build_cells(sites, &active, boundary, ratio)?;
        let owned: f64 = cells.iter().map(|cell| cell.area).sum();
        let unassigned_area = (boundary.area() - owned).max(0.0);
        if unassigned_area <= tolerance {
            return Ok(Partition {
                cells,
                unassigned_area,
                padding_ratio: ratio,
            });
        }
        if round >= settings.max_padding_rounds {
            warn!(
                "padding ratio {ratio} still leaves {unassigned_area:.6} m² of the floor unowned"
            );
            return Ok(Partition {
                cells,
                unassigned_area,
                padding_ratio: ratio,
            });
        }
        debug!("padding ratio {ratio} leaves {unassigned_area:.6} m² unowned, doubling");
        ratio *= 2.0;
        round += 1;
    }
}

/// Flag the sites that do not coincide with any other site.
fn distinct_sites(sites: &[Point]) -> Vec<bool> {
    sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            sites
                .iter()
                .enumerate()
                .all(|(j, other)| i == j || site.distance(*other) > COINCIDENT_TOLERANCE)
        })
        .collect()
}

/// Triangulate the active sites plus padding and clip every site's face to the floor.
fn build_cells(
    sites: &[Point],
    active: &[bool],
    boundary: &FloorBoundary,
    ratio: f64,
) -> Result<Vec<Cell>, DistributionError> {
    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    let mut handles = Vec::with_capacity(sites.len());
    for (&site, &keep) in sites.iter().zip(active) {
        handles.push(if keep {
            Some(insert_site(&mut triangulation, site)?)
        } else {
            None
        });
    }
    for pad in padding_points(&boundary.bounds(), ratio) {
        insert_site(&mut triangulation, pad)?;
    }

    Ok(handles
        .into_iter()
        .map(|handle| {
            handle
                .and_then(|handle| clipped_cell(&triangulation, handle, boundary))
                .unwrap_or_else(Cell::empty)
        })
        .collect())
}

fn insert_site(
    triangulation: &mut DelaunayTriangulation<Point2<f64>>,
    site: Point,
) -> Result<FixedVertexHandle, DistributionError> {
    triangulation
        .insert(Point2::new(site.x, site.y))
        .map_err(|err| DistributionError::Triangulation {
            x: site.x,
            y: site.y,
            reason: format!("{err:?}"),
        })
}

/// Corners of the Voronoi face of a vertex with near-duplicates merged, or `None` when
/// the face is unbounded.
fn voronoi_corners(
    triangulation: &DelaunayTriangulation<Point2<f64>>,
    handle: FixedVertexHandle,
) -> Option<Vec<Point>> {
    let face = triangulation.vertex(handle).as_voronoi_face();
    let corners = face
        .adjacent_edges()
        .map(|edge| edge.from().position().map(|corner| point(corner.x, corner.y)))
        .collect::<Option<Vec<_>>>()?;
    // Co-circular sites put several face corners at one spot.
    Some(dedup_ring(corners))
}

fn ring_polygon(ring: &[Point]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring.iter().map(|&corner| corner.into()).collect();
    Polygon::new(LineString::new(coords), vec![])
}

fn clipped_cell(
    triangulation: &DelaunayTriangulation<Point2<f64>>,
    handle: FixedVertexHandle,
    boundary: &FloorBoundary,
) -> Option<Cell> {
    let corners = voronoi_corners(triangulation, handle)?;
    // Faces of outer sites reach far past the floor; cut them down before the polygon
    // intersection so it works on coordinates of the floor's magnitude.
    let face = boundary.bounds().clip_ring(&corners);
    if face.len() < 3 {
        return None;
    }
    let face = ring_polygon(&face);
    let region = if boundary.is_rectangle() {
        MultiPolygon::new(vec![face])
    } else {
        face.intersection(boundary.polygon())
    };
    let area = region.unsigned_area();
    (area > DEGENERATE_AREA_RATIO * boundary.area()).then_some(Cell { region, area })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn square(side: f64) -> FloorBoundary {
        FloorBoundary::rectangle(point(0.0, 0.0), point(side, side)).expect("square accepted")
    }

    #[test]
    fn two_sites_split_the_square_in_half() {
        let boundary = square(10.0);
        let result = partition(
            &[point(2.0, 5.0), point(8.0, 5.0)],
            &boundary,
            &PartitionSettings::default(),
        )
        .expect("partition succeeds");
        assert_relative_eq!(result.cells[0].area, 50.0, epsilon = 1.0e-9);
        assert_relative_eq!(result.cells[1].area, 50.0, epsilon = 1.0e-9);
        assert!(result.unassigned_area < 1.0e-9);
    }

    #[test]
    fn regular_grid_cells_keep_their_full_area() {
        // Grid sites are co-circular, so neighbouring faces share repeated corners.
        let boundary = square(12.0);
        let sites: Vec<Point> = [2.0, 6.0, 10.0]
            .iter()
            .flat_map(|&y| [2.0, 6.0, 10.0].map(|x| point(x, y)))
            .collect();
        let result = partition(&sites, &boundary, &PartitionSettings::default())
            .expect("partition succeeds");
        for cell in &result.cells {
            assert_relative_eq!(cell.area, 16.0, epsilon = 1.0e-9);
        }
        assert!(result.unassigned_area < 1.0e-9);
    }

    #[test]
    fn slender_floor_is_split_between_collinear_sites() {
        let boundary = FloorBoundary::rectangle(point(0.0, 0.0), point(1000.0, 0.01))
            .expect("strip accepted");
        let sites: Vec<Point> = (0..10)
            .map(|i| point(50.0 + 100.0 * f64::from(i), 0.005))
            .collect();
        let result = partition(&sites, &boundary, &PartitionSettings::default())
            .expect("partition succeeds");
        for cell in &result.cells {
            assert_relative_eq!(cell.area, 1.0, epsilon = 1.0e-9);
        }
        assert_relative_eq!(result.padding_ratio, 0.1);
    }

    #[test]
    fn padding_is_widened_until_the_floor_is_covered() {
        // With 10 % padding the auxiliary points are nearer to the corners than the column.
        let boundary = square(10.0);
        let result = partition(&[point(5.0, 5.0)], &boundary, &PartitionSettings::default())
            .expect("partition succeeds");
        assert_relative_eq!(result.cells[0].area, 100.0, epsilon = 1.0e-9);
        assert!(result.padding_ratio > 0.1);
    }

    #[test]
    fn exhausted_padding_reports_unowned_area() {
        let boundary = square(10.0);
        let settings = PartitionSettings {
            padding_ratio: 0.1,
            max_padding_rounds: 0,
        };
        let result = partition(&[point(5.0, 5.0)], &boundary, &settings)
            .expect("partition succeeds");
        assert!(result.unassigned_area > 0.0);
        assert_relative_eq!(
            result.cells[0].area + result.unassigned_area,
            100.0,
            epsilon = 1.0e-9
        );
    }

    #[test]
    fn coincident_sites_get_empty_cells() {
        let boundary = square(10.0);
        let result = partition(
            &[point(3.0, 3.0), point(3.0, 3.0), point(7.0, 7.0)],
            &boundary,
            &PartitionSettings::default(),
        )
        .expect("partition succeeds");
        assert!(result.cells[0].is_degenerate());
        assert!(result.cells[1].is_degenerate());
        assert_relative_eq!(result.cells[2].area, 100.0, epsilon = 1.0e-9);
    }

    #[test]
    fn no_distinct_sites_leaves_the_floor_unowned() {
        let boundary = square(10.0);
        let result = partition(&[], &boundary, &PartitionSettings::default())
            .expect("partition succeeds");
        assert!(result.cells.is_empty());
        assert_relative_eq!(result.unassigned_area, 100.0);
    }

    #[test]
    fn non_finite_site_is_a_triangulation_error() {
        let boundary = square(10.0);
        let error = partition(
            &[point(f64::NAN, 1.0)],
            &boundary,
            &PartitionSettings::default(),
        )
        .expect_err("NaN rejected");
        assert!(matches!(error, DistributionError::Triangulation { .. }));
    }

    #[test]
    fn invalid_padding_is_rejected() {
        let settings = PartitionSettings {
            padding_ratio: -0.5,
            ..PartitionSettings::default()
        };
        assert_eq!(settings.validate(), Err(LayoutError::InvalidPadding(-0.5)));
    }
}

//! Error types produced while building floor plans or running analyses.

use thiserror::Error;

/// Error returned when a floor boundary polygon is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BoundaryError {
    /// Returned when fewer than three distinct vertices are supplied.
    #[error("boundary needs at least 3 distinct vertices (received {0})")]
    TooFewVertices(usize),
    /// Returned when a vertex coordinate is NaN or infinite.
    #[error("boundary vertex {0} is not finite")]
    NonFiniteVertex(usize),
    /// Returned when the polygon encloses no area.
    #[error("boundary encloses zero area")]
    ZeroArea,
    /// Returned when two edges of the polygon cross or overlap.
    #[error("boundary edges {first} and {second} intersect")]
    SelfIntersection {
        /// Index of the first offending edge.
        first: usize,
        /// Index of the second offending edge.
        second: usize,
    },
}

/// Error returned when editing a [`FloorPlan`](crate::FloorPlan) with invalid data.
///
/// # Examples
///
/// ```
/// use tributary::{point, FloorBoundary, FloorPlan, LayoutError};
///
/// let boundary = FloorBoundary::rectangle(point(0.0, 0.0), point(10.0, 10.0)).unwrap();
/// let mut plan = FloorPlan::new(boundary);
/// plan.add_column("A", point(2.0, 5.0)).unwrap();
/// let error = plan
///     .add_column("A", point(8.0, 5.0))
///     .expect_err("label reuse is rejected");
/// assert_eq!(error, LayoutError::DuplicateLabel("A".to_owned()));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LayoutError {
    /// Returned when a column label is already in use.
    #[error("column label {0:?} is already in use")]
    DuplicateLabel(String),
    /// Returned when a column coordinate is NaN or infinite.
    #[error("column {0:?} has a non-finite position")]
    NonFiniteColumn(String),
    /// Returned when the boundary polygon is rejected.
    #[error("invalid boundary: {0}")]
    InvalidBoundary(#[from] BoundaryError),
    /// Returned when the padding ratio is not a positive finite number.
    #[error("padding ratio must be positive and finite (received {0})")]
    InvalidPadding(f64),
}

/// Error returned when distributing a force across the columns fails.
#[derive(Debug, Error, PartialEq)]
pub enum DistributionError {
    /// Returned when the total force is not a positive finite number.
    #[error("total force must be positive and finite (received {0})")]
    InvalidForce(f64),
    /// Returned when a site cannot be inserted into the triangulation.
    #[error("triangulation rejected site ({x}, {y}): {reason}")]
    Triangulation {
        /// X coordinate of the rejected site.
        x: f64,
        /// Y coordinate of the rejected site.
        y: f64,
        /// Message reported by the triangulation.
        reason: String,
    },
    /// Returned when no column owns any part of the floor.
    #[error("no valid partition: no valid allocation possible")]
    NoValidPartition,
}

/// Error returned by the dynamic amplification study.
#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    /// Returned when the damping ratio is negative or not finite.
    #[error("damping ratio must be non-negative and finite (received {0})")]
    InvalidDamping(f64),
    /// Returned when the sampled frequency-ratio range is empty or not finite.
    #[error("frequency ratio range [{min}, {max}] is empty")]
    InvalidRange {
        /// Lower end of the range.
        min: f64,
        /// Upper end of the range.
        max: f64,
    },
    /// Returned when fewer than two samples are requested.
    #[error("at least 2 samples are required (received {0})")]
    TooFewSamples(usize),
    /// Returned when the threshold band is inverted or not finite.
    #[error("threshold band lower {lower} must be below upper {upper}")]
    InvalidBand {
        /// Lower threshold.
        lower: f64,
        /// Upper threshold.
        upper: f64,
    },
    /// Returned when the bracketing root finder fails.
    #[error("root finding failed in [{low}, {high}]: {reason}")]
    RootFinding {
        /// Left end of the bracket.
        low: f64,
        /// Right end of the bracket.
        high: f64,
        /// Message reported by the solver.
        reason: String,
    },
}

/// Error returned when the ray construction settings are unusable.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RayError {
    /// Returned when a ray or bisector length is not positive.
    #[error("{name} must be positive and finite (received {value})")]
    NonPositiveLength {
        /// Name of the offending setting.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Returned when an angle is not finite.
    #[error("ray angle {0} is not finite")]
    NonFiniteAngle(f64),
}

/// Error returned while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the file cannot be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when the file is not valid JSON for the expected schema.
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// Returned when the configured layout is rejected.
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
    /// Returned when the configured ray settings are rejected.
    #[error("invalid ray settings: {0}")]
    Rays(#[from] RayError),
}

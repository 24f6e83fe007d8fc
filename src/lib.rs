#![warn(clippy::all)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod amplification;
mod config;
mod errors;
mod geometry;
mod partition;
mod rays;
pub mod render;
mod tributary;

pub use amplification::{
    deformation_response_factor, ResponseAnalysis, ResponseCurve, ThresholdBand,
};
pub use config::{BoundaryConfig, ColumnConfig, FloorConfig, ResponseConfig};
pub use errors::{
    BoundaryError, ConfigError, DistributionError, LayoutError, RayError, ResponseError,
};
pub use geometry::{point, Bounds, FloorBoundary, Point};
pub use partition::{padding_points, partition, Cell, Partition, PartitionSettings};
pub use rays::{cast_rays, Bisector, Ray, RayDiagram, RaySettings};
pub use tributary::{Column, Distribution, FloorPlan, LoadAllocation};

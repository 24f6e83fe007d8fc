//! JSON configuration for floor plans and the response study.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::amplification::{ResponseCurve, ThresholdBand};
use crate::errors::{ConfigError, LayoutError};
use crate::geometry::{point, FloorBoundary, Point};
use crate::partition::PartitionSettings;
use crate::rays::RaySettings;
use crate::tributary::FloorPlan;

fn default_force_unit() -> String {
    "kN".to_owned()
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Floor outline, either an axis-aligned rectangle or an explicit polygon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundaryConfig {
    /// Rectangle given by two opposite corners.
    Rectangle {
        /// Corner with the smallest coordinates, `[x, y]`.
        min: [f64; 2],
        /// Corner with the largest coordinates, `[x, y]`.
        max: [f64; 2],
    },
    /// Simple polygon given by its vertices in order.
    Polygon {
        /// Vertices as `[x, y]` pairs.
        vertices: Vec<[f64; 2]>,
    },
}

impl BoundaryConfig {
    /// Validate the outline.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidBoundary`] when the outline is rejected.
    pub fn build(&self) -> Result<FloorBoundary, LayoutError> {
        let boundary = match self {
            Self::Rectangle { min, max } => {
                FloorBoundary::rectangle(point(min[0], min[1]), point(max[0], max[1]))?
            }
            Self::Polygon { vertices } => {
                FloorBoundary::new(vertices.iter().map(|&[x, y]| point(x, y)).collect())?
            }
        };
        Ok(boundary)
    }
}

/// Labelled column position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Unique label.
    pub label: String,
    /// X coordinate in metres.
    pub x: f64,
    /// Y coordinate in metres.
    pub y: f64,
}

/// Floor plan, applied force and construction settings.
///
/// # Examples
/// ```
/// use tributary::FloorConfig;
///
/// let config = FloorConfig::from_json(
///     r#"{
///         "total_force": 120.0,
///         "boundary": { "min": [0.0, 0.0], "max": [12.0, 6.0] },
///         "columns": [
///             { "label": "A", "x": 3.0, "y": 3.0 },
///             { "label": "B", "x": 9.0, "y": 3.0 }
///         ]
///     }"#,
/// )
/// .unwrap();
/// let plan = config.build_plan().unwrap();
/// let distribution = plan.distribute(config.total_force).unwrap();
/// assert!((distribution.allocations[1].force - 60.0).abs() < 1.0e-6);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorConfig {
    /// Force spread over the columns.
    pub total_force: f64,
    /// Unit printed next to forces.
    #[serde(default = "default_force_unit")]
    pub force_unit: String,
    /// Floor outline.
    pub boundary: BoundaryConfig,
    /// Columns in reporting order.
    pub columns: Vec<ColumnConfig>,
    /// Initial padding ratio of the auxiliary points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_ratio: Option<f64>,
    /// Limit on padding doublings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_padding_rounds: Option<usize>,
    /// Ray construction settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rays: Option<RaySettings>,
}

impl FloorConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text does not match the schema.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json(&read(path)?)?;
        debug!(
            "loaded {} columns from {}",
            config.columns.len(),
            path.display()
        );
        Ok(config)
    }

    /// The 18.69 m × 11.51 m slab with two rows of seven columns under 300 kN.
    #[must_use]
    pub fn sample_slab() -> Self {
        const COLUMNS: [(&str, f64, f64); 14] = [
            ("A", 0.0, 3.1),
            ("B", 3.11, 3.1),
            ("C", 6.17, 3.1),
            ("D", 9.32, 3.1),
            ("E", 12.47, 3.1),
            ("F", 15.6, 3.1),
            ("G", 18.69, 3.1),
            ("H", 0.0, 10.8),
            ("I", 3.08, 10.8),
            ("J", 6.17, 10.8),
            ("K", 9.32, 10.8),
            ("L", 12.47, 10.8),
            ("M", 15.37, 10.8),
            ("N", 18.57, 10.8),
        ];
        Self {
            total_force: 300.0,
            force_unit: default_force_unit(),
            boundary: BoundaryConfig::Rectangle {
                min: [0.0, 0.0],
                max: [18.69, 11.51],
            },
            columns: COLUMNS
                .iter()
                .map(|&(label, x, y)| ColumnConfig {
                    label: label.to_owned(),
                    x,
                    y,
                })
                .collect(),
            padding_ratio: None,
            max_padding_rounds: None,
            rays: None,
        }
    }

    /// Partition settings with unset fields at their defaults.
    #[must_use]
    pub fn partition_settings(&self) -> PartitionSettings {
        let defaults = PartitionSettings::default();
        PartitionSettings {
            padding_ratio: self.padding_ratio.unwrap_or(defaults.padding_ratio),
            max_padding_rounds: self
                .max_padding_rounds
                .unwrap_or(defaults.max_padding_rounds),
        }
    }

    /// Ray settings, defaulted when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Rays`] when the configured settings are unusable.
    pub fn ray_settings(&self) -> Result<RaySettings, ConfigError> {
        let settings = self.rays.clone().unwrap_or_default();
        settings.validate()?;
        Ok(settings)
    }

    /// Build the floor plan described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Layout`] when the outline, a column or the padding is
    /// rejected.
    pub fn build_plan(&self) -> Result<FloorPlan, ConfigError> {
        let boundary = self.boundary.build()?;
        let mut plan = FloorPlan::new(boundary).with_settings(self.partition_settings())?;
        for column in &self.columns {
            plan.add_column(column.label.as_str(), Point::new(column.x, column.y))?;
        }
        Ok(plan)
    }
}

/// Parameters of the dynamic amplification study.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Sampled curve.
    #[serde(flatten)]
    pub curve: ResponseCurve,
    /// Acceptable response band.
    pub band: ThresholdBand,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            curve: ResponseCurve::default(),
            band: ThresholdBand::default(),
        }
    }
}

impl ResponseConfig {
    /// Read and parse a response configuration file; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(&read(path.as_ref())?)?)
    }
}

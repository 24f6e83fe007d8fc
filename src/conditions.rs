use std::path::Path;

use tributary::{ConfigError, FloorConfig, FloorPlan, RaySettings, ResponseConfig};

/// Floor plan and loading used by the floor studies.
#[derive(Debug, Clone)]
pub struct FloorConditions {
    /// Validated floor plan with every column placed.
    pub plan: FloorPlan,
    /// Force spread over the columns.
    pub total_force: f64,
    /// Unit printed next to forces.
    pub force_unit: String,
    /// Ray construction settings.
    pub rays: RaySettings,
}

/// Load the floor from `path`, or fall back to the built-in sample slab.
pub fn load_floor_conditions(path: Option<&Path>) -> Result<FloorConditions, ConfigError> {
    let config = match path {
        Some(path) => FloorConfig::load(path)?,
        None => FloorConfig::sample_slab(),
    };
    Ok(FloorConditions {
        plan: config.build_plan()?,
        rays: config.ray_settings()?,
        total_force: config.total_force,
        force_unit: config.force_unit,
    })
}

/// Overrides given on the command line for the response study.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResponseOverrides {
    /// Damping ratio.
    pub damping: Option<f64>,
    /// Upper threshold.
    pub upper: Option<f64>,
    /// Lower threshold.
    pub lower: Option<f64>,
}

/// Load the response parameters from `path` (or the defaults) and apply the overrides.
pub fn response_conditions(
    path: Option<&Path>,
    overrides: ResponseOverrides,
) -> Result<ResponseConfig, ConfigError> {
    let mut config = match path {
        Some(path) => ResponseConfig::load(path)?,
        None => ResponseConfig::default(),
    };
    if let Some(damping) = overrides.damping {
        config.curve.damping_ratio = damping;
    }
    if let Some(upper) = overrides.upper {
        config.band.upper = upper;
    }
    if let Some(lower) = overrides.lower {
        config.band.lower = lower;
    }
    Ok(config)
}

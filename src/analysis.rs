use crate::conditions::FloorConditions;
use tributary::{
    Distribution, DistributionError, RayDiagram, RayError, ResponseAnalysis, ResponseConfig,
    ResponseCurve, ResponseError,
};

/// Outcome of distributing the floor force.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSummary {
    /// Per-column areas and forces.
    pub distribution: Distribution,
    /// Unit printed next to forces.
    pub force_unit: String,
}

/// Split the configured force among the columns by tributary area.
pub fn run_distribution(
    conditions: &FloorConditions,
) -> Result<DistributionSummary, DistributionError> {
    let distribution = conditions.plan.distribute(conditions.total_force)?;
    Ok(DistributionSummary {
        distribution,
        force_unit: conditions.force_unit.clone(),
    })
}

/// Outcome of the dynamic amplification study.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSummary {
    /// Curve that was analysed.
    pub curve: ResponseCurve,
    /// Threshold crossings and in-band intervals.
    pub analysis: ResponseAnalysis,
    /// Resonant frequency ratio and peak response, if the curve peaks.
    pub peak: Option<(f64, f64)>,
}

/// Find where the response curve leaves the acceptable band.
pub fn run_response(config: &ResponseConfig) -> Result<ResponseSummary, ResponseError> {
    let analysis = config.curve.analyse(&config.band)?;
    Ok(ResponseSummary {
        curve: config.curve,
        analysis,
        peak: config.curve.resonant_peak(),
    })
}

/// Cast the diagonal rays and their bisectors.
pub fn run_rays(conditions: &FloorConditions) -> Result<RayDiagram, RayError> {
    conditions.plan.cast_rays(&conditions.rays)
}

//! Dynamic amplification of a damped single-degree-of-freedom system.
//!
//! Under harmonic ground acceleration the steady-state deformation, normalised by its
//! static value, is the deformation response factor
//! `R(r) = 1 / sqrt((1 - r²)² + (2ζr)²)` where `r` is the ratio of forcing to natural
//! frequency and `ζ` the damping ratio. See
//! <https://en.wikipedia.org/wiki/Harmonic_oscillator#Driven_harmonic_oscillators>.

use argmin::core::{CostFunction, Error as ArgminError, Executor};
use argmin::solver::brent::BrentRoot;
use serde::{Deserialize, Serialize};

use crate::errors::ResponseError;

/// Absolute tolerance handed to the bracketing root finder.
const ROOT_TOLERANCE: f64 = 1.0e-12;
/// Iteration cap for a single bracket.
const MAX_ROOT_ITERATIONS: u64 = 200;
/// Roots closer than this are reported once.
const DUPLICATE_ROOT_TOLERANCE: f64 = 1.0e-4;

/// Deformation response factor for frequency ratio `ratio` and damping ratio `damping`.
///
/// # Examples
/// ```
/// use tributary::deformation_response_factor;
///
/// assert_eq!(deformation_response_factor(0.0, 0.6), 1.0);
/// assert!(deformation_response_factor(3.0, 0.05) < 0.2);
/// ```
#[must_use]
pub fn deformation_response_factor(ratio: f64, damping: f64) -> f64 {
    let stiffness_term = 1.0 - ratio * ratio;
    let damping_term = 2.0 * damping * ratio;
    1.0 / (stiffness_term * stiffness_term + damping_term * damping_term).sqrt()
}

/// Sampled response curve over a range of frequency ratios.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseCurve {
    /// Fraction of critical damping.
    pub damping_ratio: f64,
    /// Smallest sampled frequency ratio.
    pub ratio_min: f64,
    /// Largest sampled frequency ratio.
    pub ratio_max: f64,
    /// Number of evenly spaced samples, end points included.
    pub samples: usize,
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self {
            damping_ratio: 0.6,
            ratio_min: -2.0,
            ratio_max: 2.0,
            samples: 1000,
        }
    }
}

/// Band of acceptable response around unity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdBand {
    /// Upper threshold on the response factor.
    pub upper: f64,
    /// Lower threshold on the response factor.
    pub lower: f64,
}

impl Default for ThresholdBand {
    fn default() -> Self {
        Self {
            upper: 1.01,
            lower: 0.99,
        }
    }
}

impl ThresholdBand {
    /// Check that the band is finite and not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidBand`] otherwise.
    pub fn validate(&self) -> Result<(), ResponseError> {
        if self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper {
            Ok(())
        } else {
            Err(ResponseError::InvalidBand {
                lower: self.lower,
                upper: self.upper,
            })
        }
    }

    /// Whether `value` lies inside the band, thresholds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Threshold crossings and in-band intervals of a [`ResponseCurve`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResponseAnalysis {
    /// Band the curve was checked against.
    pub band: ThresholdBand,
    /// Frequency ratios where the response equals the upper threshold, ascending.
    pub upper_crossings: Vec<f64>,
    /// Frequency ratios where the response equals the lower threshold, ascending.
    pub lower_crossings: Vec<f64>,
    /// Positive frequency-ratio intervals where the response stays inside the band.
    pub band_intervals: Vec<(f64, f64)>,
}

/// Residual `R(r) - target` handed to the root finder.
struct ThresholdResidual {
    /// Fraction of critical damping.
    damping_ratio: f64,
    /// Response level being searched for.
    target: f64,
}

impl CostFunction for ThresholdResidual {
    type Param = f64;
    type Output = f64;

    fn cost(&self, ratio: &Self::Param) -> Result<Self::Output, ArgminError> {
        Ok(deformation_response_factor(*ratio, self.damping_ratio) - self.target)
    }
}

impl ResponseCurve {
    /// Curve with the given damping ratio and the default sampling.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidDamping`] for a negative or non-finite ratio.
    pub fn new(damping_ratio: f64) -> Result<Self, ResponseError> {
        let curve = Self {
            damping_ratio,
            ..Self::default()
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Check the damping ratio and the sampling.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] describing the first unusable parameter.
    pub fn validate(&self) -> Result<(), ResponseError> {
        if !(self.damping_ratio.is_finite() && self.damping_ratio >= 0.0) {
            return Err(ResponseError::InvalidDamping(self.damping_ratio));
        }
        if !(self.ratio_min.is_finite() && self.ratio_max.is_finite())
            || self.ratio_min >= self.ratio_max
        {
            return Err(ResponseError::InvalidRange {
                min: self.ratio_min,
                max: self.ratio_max,
            });
        }
        if self.samples < 2 {
            return Err(ResponseError::TooFewSamples(self.samples));
        }
        Ok(())
    }

    /// Response factor at frequency ratio `ratio`.
    #[must_use]
    pub fn response(&self, ratio: f64) -> f64 {
        deformation_response_factor(ratio, self.damping_ratio)
    }

    /// Evenly spaced frequency ratios from `ratio_min` to `ratio_max`.
    #[must_use]
    pub fn ratios(&self) -> Vec<f64> {
        let last = self.samples.saturating_sub(1).max(1) as f64;
        let step = (self.ratio_max - self.ratio_min) / last;
        (0..self.samples)
            .map(|i| self.ratio_min + step * i as f64)
            .collect()
    }

    /// `(ratio, response)` pairs on the sampling grid.
    #[must_use]
    pub fn sample(&self) -> Vec<(f64, f64)> {
        self.ratios()
            .into_iter()
            .map(|ratio| (ratio, self.response(ratio)))
            .collect()
    }

    /// Frequency ratio and height of the resonant peak, when the curve has one.
    ///
    /// Systems damped at or above `1/√2` of critical decrease monotonically from `r = 0`.
    #[must_use]
    pub fn resonant_peak(&self) -> Option<(f64, f64)> {
        let zeta = self.damping_ratio;
        let radicand = 1.0 - 2.0 * zeta * zeta;
        if radicand <= 0.0 {
            return None;
        }
        let ratio = radicand.sqrt();
        Some((ratio, self.response(ratio)))
    }

    /// Frequency ratios where the response equals `target`, ascending.
    ///
    /// Every sign change of `R - target` between neighbouring samples is refined with
    /// Brent's method; a sample sitting exactly on the target counts as a root.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::RootFinding`] when the solver fails on a bracket.
    pub fn crossings(&self, target: f64) -> Result<Vec<f64>, ResponseError> {
        let ratios = self.ratios();
        let residuals: Vec<f64> = ratios
            .iter()
            .map(|&ratio| self.response(ratio) - target)
            .collect();

        let mut roots: Vec<f64> = Vec::new();
        for i in 0..ratios.len() {
            let root = if residuals[i] == 0.0 {
                ratios[i]
            } else if i + 1 < ratios.len() && residuals[i] * residuals[i + 1] < 0.0 {
                self.refine(target, ratios[i], ratios[i + 1])?
            } else {
                continue;
            };
            if !roots
                .iter()
                .any(|known| (known - root).abs() < DUPLICATE_ROOT_TOLERANCE)
            {
                roots.push(root);
            }
        }
        roots.sort_by(f64::total_cmp);
        Ok(roots)
    }

    /// Locate both threshold crossings and the positive intervals that stay in band.
    ///
    /// The positive crossings split `(max(ratio_min, 0), ratio_max)` into pieces; a piece
    /// is in band when the response at its midpoint is.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] for invalid parameters or a failed root search.
    ///
    /// # Examples
    /// ```
    /// use tributary::{ResponseCurve, ThresholdBand};
    ///
    /// let analysis = ResponseCurve::default()
    ///     .analyse(&ThresholdBand::default())
    ///     .unwrap();
    /// assert_eq!(analysis.band_intervals.len(), 2);
    /// assert_eq!(analysis.band_intervals[0].0, 0.0);
    /// ```
    pub fn analyse(&self, band: &ThresholdBand) -> Result<ResponseAnalysis, ResponseError> {
        self.validate()?;
        band.validate()?;
        let upper_crossings = self.crossings(band.upper)?;
        let lower_crossings = self.crossings(band.lower)?;

        let start = self.ratio_min.max(0.0);
        let mut edges: Vec<f64> = upper_crossings
            .iter()
            .chain(&lower_crossings)
            .copied()
            .filter(|&ratio| ratio > start && ratio < self.ratio_max)
            .collect();
        edges.sort_by(f64::total_cmp);
        edges.insert(0, start);
        edges.push(self.ratio_max);

        let band_intervals = edges
            .windows(2)
            .filter(|pair| pair[1] > pair[0])
            .filter(|pair| band.contains(self.response(0.5 * (pair[0] + pair[1]))))
            .map(|pair| (pair[0], pair[1]))
            .collect();

        Ok(ResponseAnalysis {
            band: *band,
            upper_crossings,
            lower_crossings,
            band_intervals,
        })
    }

    /// Refine a bracketed crossing of `target` with Brent's method.
    fn refine(&self, target: f64, low: f64, high: f64) -> Result<f64, ResponseError> {
        let residual = ThresholdResidual {
            damping_ratio: self.damping_ratio,
            target,
        };
        let solver = BrentRoot::new(low, high, ROOT_TOLERANCE);
        let result = Executor::new(residual, solver)
            .configure(|state| state.param(high).max_iters(MAX_ROOT_ITERATIONS))
            .run()
            .map_err(|err| ResponseError::RootFinding {
                low,
                high,
                reason: err.to_string(),
            })?;
        result
            .state()
            .param
            .ok_or_else(|| ResponseError::RootFinding {
                low,
                high,
                reason: "solver produced no estimate".to_owned(),
            })
    }
}

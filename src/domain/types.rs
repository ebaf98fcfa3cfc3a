//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed straight into the evaluation functions
//! - embedded in a caller's own configuration files
//! - inspected in tests without any fitting machinery

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ErrorKind, ShapeError};

/// Number of shape parameters.
pub const PARAM_COUNT: usize = 5;

/// Conventional short names, in parameter-vector order.
pub const PARAM_NAMES: [&str; PARAM_COUNT] = ["c", "mu", "sig", "A", "n"];

/// Named view of the parameter vector `[c, mu, sig, A, n]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoubleCrystalBallParams {
    /// Total amplitude, split evenly between the two lobes.
    pub c: f64,
    /// Shared peak position.
    pub mu: f64,
    /// Shared core width.
    pub sigma: f64,
    /// Core-to-tail distance in units of `sigma`; the lobes use `+alpha` and `-alpha`.
    pub alpha: f64,
    /// Shared tail exponent.
    pub n: f64,
}

impl DoubleCrystalBallParams {
    pub fn from_array(p: [f64; PARAM_COUNT]) -> Self {
        Self {
            c: p[0],
            mu: p[1],
            sigma: p[2],
            alpha: p[3],
            n: p[4],
        }
    }

    /// Build from a slice that must hold exactly [`PARAM_COUNT`] values.
    pub fn try_from_slice(p: &[f64]) -> Result<Self, ShapeError> {
        let arr: [f64; PARAM_COUNT] = p.try_into().map_err(|_| {
            ShapeError::new(
                ErrorKind::ParamCount,
                format!("Expected {PARAM_COUNT} parameters, got {}.", p.len()),
            )
        })?;
        Ok(Self::from_array(arr))
    }

    pub fn to_array(&self) -> [f64; PARAM_COUNT] {
        [self.c, self.mu, self.sigma, self.alpha, self.n]
    }

    /// The same shape with the lobes exchanged (alpha negated).
    pub fn swapped_tails(&self) -> Self {
        Self {
            alpha: -self.alpha,
            ..*self
        }
    }
}

impl From<[f64; PARAM_COUNT]> for DoubleCrystalBallParams {
    fn from(value: [f64; PARAM_COUNT]) -> Self {
        Self::from_array(value)
    }
}

/// Closed interval a parameter is allowed to move in during a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamLimits {
    pub min: f64,
    pub max: f64,
}

impl ParamLimits {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Name, starting value and optional bounds for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub initial: f64,
    #[serde(default)]
    pub limits: Option<ParamLimits>,
}

impl ParamDef {
    pub fn new(name: impl Into<String>, initial: f64, limits: Option<ParamLimits>) -> Self {
        Self {
            name: name.into(),
            initial,
            limits,
        }
    }
}

/// Everything an external fitter needs to know about the shape before it starts:
/// the x-range to fit over and, per parameter, a name, a starting guess and bounds.
///
/// The defaults are a starting point for a narrow peak near zero and should be
/// tuned per use case; not every bound is needed when statistics are good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub params: Vec<ParamDef>,
}

impl Default for FitConfig {
    fn default() -> Self {
        let defs = [
            (1.0, 0.0, 999.0),
            (0.5, -2.0, 2.0),
            (0.05, 0.0, 0.5),
            (1.0, 0.0, 99.0),
            (1.0, 0.0, 999.0),
        ];
        Self {
            x_min: -2.0,
            x_max: 2.0,
            params: PARAM_NAMES
                .iter()
                .zip(defs)
                .map(|(name, (initial, lo, hi))| {
                    ParamDef::new(*name, initial, Some(ParamLimits::new(lo, hi)))
                })
                .collect(),
        }
    }
}

impl FitConfig {
    /// Check the range, the parameter count, and that every starting guess is
    /// finite and inside its bounds.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if !(self.x_min.is_finite() && self.x_max.is_finite() && self.x_max > self.x_min) {
            return Err(ShapeError::new(
                ErrorKind::InvalidConfig,
                format!(
                    "Invalid fit range: [{}, {}] (must be finite with max > min).",
                    self.x_min, self.x_max
                ),
            ));
        }
        if self.params.len() != PARAM_COUNT {
            return Err(ShapeError::new(
                ErrorKind::InvalidConfig,
                format!(
                    "Expected {PARAM_COUNT} parameter definitions, got {}.",
                    self.params.len()
                ),
            ));
        }

        for def in &self.params {
            if !def.initial.is_finite() {
                return Err(ShapeError::new(
                    ErrorKind::InvalidConfig,
                    format!("Initial value for '{}' is not finite.", def.name),
                ));
            }
            let Some(limits) = def.limits else {
                continue;
            };
            if !(limits.min <= limits.max) {
                return Err(ShapeError::new(
                    ErrorKind::InvalidConfig,
                    format!(
                        "Limits for '{}' are inverted: [{}, {}].",
                        def.name, limits.min, limits.max
                    ),
                ));
            }
            if !limits.contains(def.initial) {
                return Err(ShapeError::new(
                    ErrorKind::InvalidConfig,
                    format!(
                        "Initial value {} for '{}' is outside [{}, {}].",
                        def.initial, def.name, limits.min, limits.max
                    ),
                ));
            }
        }

        debug!(x_min = self.x_min, x_max = self.x_max, "fit config validated");
        Ok(())
    }

    /// Starting guesses in parameter-vector order.
    pub fn initial_params(&self) -> Result<[f64; PARAM_COUNT], ShapeError> {
        let guesses: Vec<f64> = self.params.iter().map(|d| d.initial).collect();
        guesses.as_slice().try_into().map_err(|_| {
            ShapeError::new(
                ErrorKind::InvalidConfig,
                format!(
                    "Expected {PARAM_COUNT} parameter definitions, got {}.",
                    self.params.len()
                ),
            )
        })
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|d| d.name == name)
    }

    /// `true` if every bounded parameter of `p` lies inside its limits.
    pub fn within_limits(&self, p: &[f64; PARAM_COUNT]) -> bool {
        self.params
            .iter()
            .zip(p.iter())
            .all(|(def, &v)| def.limits.is_none_or(|l| l.contains(v)))
    }

    /// Project `p` onto the box defined by the limits (unbounded parameters pass through).
    pub fn clamp_to_limits(&self, p: &[f64; PARAM_COUNT]) -> [f64; PARAM_COUNT] {
        let mut out = *p;
        for (v, def) in out.iter_mut().zip(&self.params) {
            if let Some(limits) = def.limits {
                *v = limits.clamp(*v);
            }
        }
        out
    }
}

/// Binned data supplied by the caller: bin centers, contents and per-bin errors.
///
/// The columns are private so every instance, deserialized ones included, has
/// passed [`Histogram::with_errors`]: equal non-zero lengths, finite values and
/// strictly positive errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistogram")]
pub struct Histogram {
    centers: Vec<f64>,
    contents: Vec<f64>,
    errors: Vec<f64>,
}

/// Unchecked wire form of [`Histogram`].
#[derive(Deserialize)]
struct RawHistogram {
    centers: Vec<f64>,
    contents: Vec<f64>,
    errors: Vec<f64>,
}

impl TryFrom<RawHistogram> for Histogram {
    type Error = ShapeError;

    fn try_from(raw: RawHistogram) -> Result<Self, Self::Error> {
        Self::with_errors(raw.centers, raw.contents, raw.errors)
    }
}

impl Histogram {
    /// Build with Poisson-style errors `sqrt(max(content, 1))`.
    ///
    /// The floor of one keeps empty bins from getting zero weight-denominators.
    pub fn new(centers: Vec<f64>, contents: Vec<f64>) -> Result<Self, ShapeError> {
        let errors = contents.iter().map(|&c| c.max(1.0).sqrt()).collect();
        Self::with_errors(centers, contents, errors)
    }

    pub fn with_errors(
        centers: Vec<f64>,
        contents: Vec<f64>,
        errors: Vec<f64>,
    ) -> Result<Self, ShapeError> {
        if centers.is_empty() {
            return Err(ShapeError::new(ErrorKind::InvalidHistogram, "Histogram has no bins."));
        }
        if centers.len() != contents.len() || centers.len() != errors.len() {
            return Err(ShapeError::new(
                ErrorKind::InvalidHistogram,
                format!(
                    "Histogram columns disagree: {} centers, {} contents, {} errors.",
                    centers.len(),
                    contents.len(),
                    errors.len()
                ),
            ));
        }
        if centers.iter().chain(&contents).any(|v| !v.is_finite()) {
            return Err(ShapeError::new(
                ErrorKind::InvalidHistogram,
                "Histogram centers and contents must be finite.",
            ));
        }
        if let Some(i) = errors.iter().position(|e| !(e.is_finite() && *e > 0.0)) {
            return Err(ShapeError::new(
                ErrorKind::InvalidHistogram,
                format!("Bin {i} has a non-positive or non-finite error."),
            ));
        }
        Ok(Self {
            centers,
            contents,
            errors,
        })
    }

    /// Equal-width bins over `[x_min, x_max]`, one per entry of `contents`.
    pub fn uniform(x_min: f64, x_max: f64, contents: Vec<f64>) -> Result<Self, ShapeError> {
        let centers = bin_centers(x_min, x_max, contents.len())?;
        Self::new(centers, contents)
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Keep only bins whose center lies in `[x_min, x_max]`.
    pub fn bins_in_range(&self, x_min: f64, x_max: f64) -> Result<Self, ShapeError> {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.centers[i] >= x_min && self.centers[i] <= x_max)
            .collect();
        let pick = |col: &[f64]| keep.iter().map(|&i| col[i]).collect::<Vec<_>>();
        Self::with_errors(
            pick(&self.centers[..]),
            pick(&self.contents[..]),
            pick(&self.errors[..]),
        )
    }
}

/// Centers of `bins` equal-width bins covering `[x_min, x_max]`.
pub fn bin_centers(x_min: f64, x_max: f64, bins: usize) -> Result<Vec<f64>, ShapeError> {
    if !(x_min.is_finite() && x_max.is_finite() && x_max > x_min) {
        return Err(ShapeError::new(
            ErrorKind::InvalidHistogram,
            format!("Invalid binning range: [{x_min}, {x_max}]."),
        ));
    }
    if bins == 0 {
        return Err(ShapeError::new(ErrorKind::InvalidHistogram, "Bin count must be >= 1."));
    }
    let width = (x_max - x_min) / bins as f64;
    Ok((0..bins).map(|i| x_min + (i as f64 + 0.5) * width).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FitConfig::default();
        config.validate().unwrap();
        assert_eq!(config.initial_params().unwrap(), [1.0, 0.5, 0.05, 1.0, 1.0]);
        let names: Vec<&str> = config.params.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, PARAM_NAMES);
        assert_eq!(config.param_index("sig"), Some(2));
        assert_eq!(config.param_index("sigma"), None);
    }

    #[test]
    fn validate_rejects_guess_outside_limits() {
        let mut config = FitConfig::default();
        config.params[2].initial = 0.9;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("sig"), "{err}");
    }

    #[test]
    fn validate_rejects_bad_range_and_count() {
        let config = FitConfig {
            x_min: 1.0,
            x_max: 1.0,
            ..FitConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = FitConfig::default();
        config.params.pop();
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn limits_clamp_and_check() {
        let config = FitConfig::default();
        let p = [-5.0, 3.0, 0.2, 150.0, 2.0];
        assert!(!config.within_limits(&p));
        let clamped = config.clamp_to_limits(&p);
        assert_eq!(clamped, [0.0, 2.0, 0.2, 99.0, 2.0]);
        assert!(config.within_limits(&clamped));
    }

    #[test]
    fn unbounded_params_pass_through() {
        let mut config = FitConfig::default();
        config.params[1].limits = None;
        let p = [1.0, 40.0, 0.1, 1.0, 2.0];
        assert!(config.within_limits(&p));
        assert_eq!(config.clamp_to_limits(&p)[1], 40.0);
    }

    #[test]
    fn config_survives_json() {
        let config = FitConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: FitConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn params_from_slice_checks_length() {
        let p = DoubleCrystalBallParams::try_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(p.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(p.swapped_tails().alpha, -4.0);
        assert_eq!(DoubleCrystalBallParams::from([1.0, 2.0, 3.0, 4.0, 5.0]), p);

        let err = DoubleCrystalBallParams::try_from_slice(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParamCount);
    }

    #[test]
    fn histogram_errors_floor_at_one() {
        let h = Histogram::new(vec![0.0, 1.0, 2.0], vec![0.0, 4.0, 0.25]).unwrap();
        assert_eq!(h.errors(), [1.0, 2.0, 1.0]);
    }

    #[test]
    fn histogram_rejects_mismatched_columns() {
        let err = Histogram::with_errors(vec![0.0, 1.0], vec![1.0], vec![1.0, 1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHistogram);
        assert!(Histogram::new(vec![], vec![]).is_err());
        assert!(Histogram::with_errors(vec![0.0], vec![1.0], vec![0.0]).is_err());
    }

    #[test]
    fn uniform_bins_and_range_filter() {
        let h = Histogram::uniform(-2.0, 2.0, vec![1.0; 8]).unwrap();
        assert_eq!(h.len(), 8);
        assert!((h.centers()[0] + 1.75).abs() < 1e-12);
        assert!((h.centers()[7] - 1.75).abs() < 1e-12);

        let inner = h.bins_in_range(-1.0, 1.0).unwrap();
        assert_eq!(inner.len(), 4);
        assert!(h.bins_in_range(5.0, 6.0).is_err());
    }

    #[test]
    fn initial_params_reports_short_config() {
        let mut config = FitConfig::default();
        config.params.truncate(3);
        let err = config.initial_params().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn deserialized_histogram_is_validated() {
        let text = r#"{"centers":[0,0.5,1],"contents":[10],"errors":[0,1,1]}"#;
        let err = serde_json::from_str::<Histogram>(text).unwrap_err();
        assert!(err.to_string().contains("columns disagree"), "{err}");

        let text = r#"{"centers":[0,0.5],"contents":[10,4],"errors":[0,1]}"#;
        assert!(serde_json::from_str::<Histogram>(text).is_err());

        let h = Histogram::new(vec![0.0, 0.5], vec![9.0, 4.0]).unwrap();
        let back: Histogram = serde_json::from_str(&serde_json::to_string(&h).unwrap()).unwrap();
        assert_eq!(back, h);
    }
}

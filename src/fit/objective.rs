//! Least-squares objective for an external minimizer.
//!
//! Given a histogram with bin centers `x_i`, contents `y_i` and errors `e_i`,
//! the residual vector is
//!
//! ```text
//! r_i(p) = (y_i - f(x_i; p)) / e_i
//! ```
//!
//! and its Jacobian is `J_ij = -(df/dp_j)(x_i) / e_i`. Those two, plus the
//! chi-square `Σ r_i²`, are what Gauss-Newton / Levenberg-Marquardt style
//! routines ask for. No minimization happens in this crate.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::debug;

use crate::domain::{FitConfig, Histogram, PARAM_COUNT};
use crate::error::ShapeError;
use crate::models::{double_crystal_ball, fill_gradient_row};

/// Evaluate the shape at every `x` (parallel, order preserved).
pub fn evaluate_many(xs: &[f64], p: &[f64; PARAM_COUNT]) -> Vec<f64> {
    xs.par_iter().map(|&x| double_crystal_ball(x, p)).collect()
}

/// Error-scaled residuals, one per bin.
pub fn residuals(hist: &Histogram, p: &[f64; PARAM_COUNT]) -> Vec<f64> {
    hist.centers()
        .par_iter()
        .zip(hist.contents().par_iter())
        .zip(hist.errors().par_iter())
        .map(|((&x, &y), &e)| (y - double_crystal_ball(x, p)) / e)
        .collect()
}

pub fn chi_square(hist: &Histogram, p: &[f64; PARAM_COUNT]) -> f64 {
    residuals(hist, p).iter().map(|r| r * r).sum()
}

/// Jacobian of [`residuals`] with respect to the parameters (`bins × 5`).
pub fn jacobian(hist: &Histogram, p: &[f64; PARAM_COUNT]) -> DMatrix<f64> {
    let rows: Vec<[f64; PARAM_COUNT]> = hist
        .centers()
        .par_iter()
        .zip(hist.errors().par_iter())
        .map(|(&x, &e)| {
            let mut row = [0.0; PARAM_COUNT];
            fill_gradient_row(x, p, &mut row);
            row.map(|d| -d / e)
        })
        .collect();

    DMatrix::from_fn(rows.len(), PARAM_COUNT, |i, j| rows[i][j])
}

/// A histogram bound to a fit configuration.
///
/// Construction validates the configuration and drops bins outside its range,
/// so every later call works on the fitted window only.
#[derive(Debug, Clone)]
pub struct FitObjective {
    hist: Histogram,
    config: FitConfig,
    initial: [f64; PARAM_COUNT],
}

impl FitObjective {
    pub fn new(hist: &Histogram, config: FitConfig) -> Result<Self, ShapeError> {
        config.validate()?;
        let initial = config.initial_params()?;
        let hist = hist.bins_in_range(config.x_min, config.x_max)?;
        debug!(
            bins = hist.len(),
            x_min = config.x_min,
            x_max = config.x_max,
            "fit objective ready"
        );
        Ok(Self {
            hist,
            config,
            initial,
        })
    }

    pub fn histogram(&self) -> &Histogram {
        &self.hist
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Number of bins minus number of parameters.
    pub fn degrees_of_freedom(&self) -> usize {
        self.hist.len().saturating_sub(PARAM_COUNT)
    }

    pub fn initial_params(&self) -> [f64; PARAM_COUNT] {
        self.initial
    }

    pub fn residual_vector(&self, p: &[f64; PARAM_COUNT]) -> DVector<f64> {
        DVector::from_vec(residuals(&self.hist, p))
    }

    pub fn jacobian(&self, p: &[f64; PARAM_COUNT]) -> DMatrix<f64> {
        jacobian(&self.hist, p)
    }

    pub fn chi_square(&self, p: &[f64; PARAM_COUNT]) -> f64 {
        chi_square(&self.hist, p)
    }

    /// Chi-square per degree of freedom, or `None` when there are no spare bins.
    pub fn reduced_chi_square(&self, p: &[f64; PARAM_COUNT]) -> Option<f64> {
        match self.degrees_of_freedom() {
            0 => None,
            ndf => Some(self.chi_square(p) / ndf as f64),
        }
    }
}

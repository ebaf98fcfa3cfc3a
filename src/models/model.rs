//! Double Crystal Ball evaluation.
//!
//! The fit shape is two Crystal Ball lobes that share everything except the
//! sign of alpha:
//!
//! ```text
//! f(x; p) = CB(x; p0/2, p1, p2, +p3, p4) + CB(x; p0/2, p1, p2, -p3, p4)
//! ```
//!
//! so one lobe carries a low-side tail and the other a high-side tail. Fitting
//! code needs three primitive operations, implemented here:
//! - evaluate `f(x)` for residuals and plots
//! - `df/dx` for smoothness checks
//! - fill a gradient row `df/dp_j` for Jacobians

use crate::domain::{DoubleCrystalBallParams, PARAM_COUNT};
use crate::math::CrystalBall;

#[inline]
fn lobes(p: &[f64; PARAM_COUNT]) -> (CrystalBall, CrystalBall) {
    let half = p[0] / 2.0;
    (
        CrystalBall::new(half, p[1], p[2], p[3], p[4]),
        CrystalBall::new(half, p[1], p[2], -p[3], p[4]),
    )
}

/// Evaluate the double Crystal Ball at `x`.
///
/// `p = [c, mu, sig, A, n]`. Parameters are not validated: with `sig <= 0`,
/// `n <= 1` or `A == 0` the result is meaningless or NaN and is returned as-is,
/// so a bad parameter point shows up as a failed fit rather than an error here.
#[must_use]
#[inline]
pub fn double_crystal_ball(x: f64, p: &[f64; PARAM_COUNT]) -> f64 {
    let (low, high) = lobes(p);
    low.evaluate(x) + high.evaluate(x)
}

/// [`double_crystal_ball`] on named parameters.
#[must_use]
#[inline]
pub fn predict(x: f64, params: &DoubleCrystalBallParams) -> f64 {
    double_crystal_ball(x, &params.to_array())
}

/// `d f / d x` at `x`.
#[must_use]
pub fn double_crystal_ball_derivative(x: f64, p: &[f64; PARAM_COUNT]) -> f64 {
    let (low, high) = lobes(p);
    low.derivative(x) + high.derivative(x)
}

/// Fill `out` with `df/dp_j` for `j = 0..5`.
///
/// The amplitude split and the mirrored alpha enter through the chain rule:
/// `df/dp0 = (g_low + g_high) / 2` and `df/dp3 = dlow/dalpha - dhigh/dalpha`.
///
/// # Panics
/// Panics if `out.len() != PARAM_COUNT`.
pub fn fill_gradient_row(x: f64, p: &[f64; PARAM_COUNT], out: &mut [f64]) {
    let (low, high) = lobes(p);
    let gl = low.gradient(x);
    let gh = high.gradient(x);

    out[0] = 0.5 * (gl[0] + gh[0]);
    out[1] = gl[1] + gh[1];
    out[2] = gl[2] + gh[2];
    out[3] = gl[3] - gh[3];
    out[4] = gl[4] + gh[4];
}

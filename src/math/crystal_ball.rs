//! Single-sided Crystal Ball peak shape.
//!
//! With `t = (x - mean) / sigma` (negated when `alpha < 0`, which moves the tail
//! to the high side) and `a = |alpha|`:
//!
//! - core, `t > -a`: `amplitude * exp(-t²/2)`
//! - tail, `t <= -a`: `amplitude * A * (B - t)^(-n)`
//!
//! where `A = (n/a)^n * exp(-a²/2)` and `B = n/a - a`. These constants make the
//! value and its first derivative continuous at `t = -a`.
//!
//! Numerical notes:
//! - `A` overflows quickly for large `n` or small `a`, so the tail is evaluated
//!   as `exp(-a²/2) * (k / (B - t))^n` with `k = n/a`. Since `t <= -a` in the
//!   tail, `B - t >= k > 0` and the ratio stays in `(0, 1]`.
//! - Nothing is validated. `sigma <= 0`, `n <= 1` or `alpha == 0` give
//!   meaningless values or NaN, and those are returned as-is.

/// The continuity constants of the power-law tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailConstants {
    /// `(n/|alpha|)^n * exp(-alpha²/2)`
    pub a: f64,
    /// `n/|alpha| - |alpha|`
    pub b: f64,
}

/// One Crystal Ball lobe.
///
/// This is a plain value: building one per evaluation costs nothing, so callers
/// construct it inline instead of caching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrystalBall {
    pub amplitude: f64,
    pub mean: f64,
    pub sigma: f64,
    pub alpha: f64,
    pub n: f64,
}

impl CrystalBall {
    #[must_use]
    pub fn new(amplitude: f64, mean: f64, sigma: f64, alpha: f64, n: f64) -> Self {
        Self {
            amplitude,
            mean,
            sigma,
            alpha,
            n,
        }
    }

    /// `+1` when the tail sits below the mean, `-1` when it sits above.
    #[inline]
    fn side(&self) -> f64 {
        if self.alpha < 0.0 { -1.0 } else { 1.0 }
    }

    /// Standardized distance from the mean, oriented so the tail is at negative `t`.
    #[inline]
    fn t(&self, x: f64) -> f64 {
        self.side() * (x - self.mean) / self.sigma
    }

    #[must_use]
    pub fn tail_constants(&self) -> TailConstants {
        let a = self.alpha.abs();
        let k = self.n / a;
        TailConstants {
            a: k.powf(self.n) * (-0.5 * a * a).exp(),
            b: k - a,
        }
    }

    /// The `x` at which the core hands over to the tail: `mean - alpha * sigma`.
    #[must_use]
    pub fn transition_point(&self) -> f64 {
        self.mean - self.alpha * self.sigma
    }

    /// The shape with unit amplitude.
    #[must_use]
    #[inline]
    pub fn shape(&self, x: f64) -> f64 {
        let t = self.t(x);
        let a = self.alpha.abs();
        if t > -a {
            (-0.5 * t * t).exp()
        } else {
            let k = self.n / a;
            (-0.5 * a * a).exp() * (k / (k - a - t)).powf(self.n)
        }
    }

    #[must_use]
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.amplitude * self.shape(x)
    }

    /// `d/dt` of the unit-amplitude shape, together with the shape itself.
    #[inline]
    fn shape_and_slope(&self, t: f64) -> (f64, f64) {
        let a = self.alpha.abs();
        if t > -a {
            let g = (-0.5 * t * t).exp();
            (g, -t * g)
        } else {
            let k = self.n / a;
            let u = k - a - t;
            let g = (-0.5 * a * a).exp() * (k / u).powf(self.n);
            (g, g * self.n / u)
        }
    }

    /// `d/dx` of [`CrystalBall::evaluate`].
    #[must_use]
    pub fn derivative(&self, x: f64) -> f64 {
        let (_, slope) = self.shape_and_slope(self.t(x));
        self.amplitude * slope * self.side() / self.sigma
    }

    /// Partial derivatives of [`CrystalBall::evaluate`] with respect to
    /// `[amplitude, mean, sigma, alpha, n]`.
    ///
    /// The alpha and n components vanish in the core; in the tail they are
    /// the derivatives of `ln A - n ln(B - t)`, scaled by the value. Both reach
    /// zero at the junction, so the gradient is continuous there.
    #[must_use]
    pub fn gradient(&self, x: f64) -> [f64; 5] {
        let t = self.t(x);
        let (g, slope) = self.shape_and_slope(t);
        let value = self.amplitude * g;
        let d_dt = self.amplitude * slope;

        let d_mean = -d_dt * self.side() / self.sigma;
        let d_sigma = -d_dt * t / self.sigma;

        let a = self.alpha.abs();
        let (d_alpha, d_n) = if t > -a {
            (0.0, 0.0)
        } else {
            let k = self.n / a;
            let u = k - a - t;
            let dlog_da = -a - k + self.n * (k / a + 1.0) / u;
            let dlog_dn = (k / u).ln() + 1.0 - k / u;
            (value * self.side() * dlog_da, value * dlog_dn)
        };

        [g, d_mean, d_sigma, d_alpha, d_n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finite_diff(f: impl Fn(f64) -> f64, x: f64, h: f64) -> f64 {
        (f(x + h) - f(x - h)) / (2.0 * h)
    }

    #[test]
    fn core_peaks_at_amplitude() {
        let cb = CrystalBall::new(50.0, 1.0, 0.5, 1.5, 3.0);
        assert!((cb.evaluate(1.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn tail_matches_closed_form_constants() {
        let cb = CrystalBall::new(2.0, 0.0, 1.0, 1.5, 3.0);
        let TailConstants { a, b } = cb.tail_constants();
        let x = -4.0;
        let expected = 2.0 * a * (b - x).powf(-3.0);
        assert!((cb.evaluate(x) - expected).abs() < 1e-12, "{} vs {expected}", cb.evaluate(x));
    }

    #[test]
    fn negative_alpha_mirrors_the_tail() {
        let low = CrystalBall::new(1.0, 0.3, 0.7, 1.2, 2.5);
        let high = CrystalBall::new(1.0, 0.3, 0.7, -1.2, 2.5);
        for &d in &[0.0, 0.5, 1.0, 2.0, 5.0, 20.0] {
            let a = low.evaluate(0.3 - d);
            let b = high.evaluate(0.3 + d);
            assert!((a - b).abs() < 1e-12, "d={d}: {a} vs {b}");
        }
    }

    #[test]
    fn value_and_slope_continuous_at_transition() {
        for &alpha in &[0.5, 1.5, -1.5, 3.0] {
            let cb = CrystalBall::new(10.0, 0.2, 0.8, alpha, 2.0);
            let x0 = cb.transition_point();
            let eps = 1e-9;
            let below = cb.evaluate(x0 - eps);
            let above = cb.evaluate(x0 + eps);
            assert!((below - above).abs() < 1e-6, "alpha={alpha}: {below} vs {above}");

            let d_below = cb.derivative(x0 - eps);
            let d_above = cb.derivative(x0 + eps);
            assert!((d_below - d_above).abs() < 1e-6, "alpha={alpha}: {d_below} vs {d_above}");
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let cb = CrystalBall::new(3.0, -0.4, 0.6, 1.1, 4.0);
        for &x in &[-5.0, -1.5, -0.4, 0.3, 2.0] {
            let numeric = finite_diff(|v| cb.evaluate(v), x, 1e-6);
            let analytic = cb.derivative(x);
            assert!((numeric - analytic).abs() < 1e-6, "x={x}: {numeric} vs {analytic}");
        }
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let base = [3.0, -0.4, 0.6, 1.1, 4.0];
        let build = |p: [f64; 5]| CrystalBall::new(p[0], p[1], p[2], p[3], p[4]);
        for &alpha_sign in &[1.0, -1.0] {
            let mut p = base;
            p[3] *= alpha_sign;
            for &x in &[-3.0, -0.9, -0.2, 0.5, 2.5] {
                let grad = build(p).gradient(x);
                for j in 0..5 {
                    let numeric = finite_diff(
                        |v| {
                            let mut q = p;
                            q[j] = v;
                            build(q).evaluate(x)
                        },
                        p[j],
                        1e-6,
                    );
                    assert!(
                        (numeric - grad[j]).abs() < 1e-5,
                        "alpha={} x={x} j={j}: {numeric} vs {}",
                        p[3],
                        grad[j]
                    );
                }
            }
        }
    }

    #[test]
    fn zero_sigma_propagates_nan() {
        let cb = CrystalBall::new(1.0, 0.0, 0.0, 1.0, 2.0);
        assert!(cb.evaluate(0.0).is_nan());
    }
}

//! `double-crystal-ball` library crate.
//!
//! A double-sided Crystal Ball peak shape for fitting binned spectra:
//!
//! - `math`: the single-sided Crystal Ball primitive
//! - `models`: the double Crystal Ball evaluation and its derivatives
//! - `fit`: residuals, chi-square and Jacobian for an external minimizer
//! - `domain`: parameter vector, fit configuration and histogram types
//! - `data`: seeded synthetic histograms
//!
//! ```
//! use double_crystal_ball::models::double_crystal_ball;
//!
//! let p = [100.0, 0.0, 1.0, 1.5, 3.0];
//! assert!((double_crystal_ball(0.0, &p) - 100.0).abs() < 1e-9);
//! ```

pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;

//! Fit plumbing for external minimizers.
//!
//! Responsibilities:
//!
//! - evaluate the shape over many points (parallel)
//! - expose residuals, chi-square and the residual Jacobian for a histogram

pub mod objective;

pub use objective::*;

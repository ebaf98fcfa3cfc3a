//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the named parameter vector (`DoubleCrystalBallParams`)
//! - per-parameter fit metadata (`ParamDef`, `ParamLimits`) and `FitConfig`
//! - the caller-supplied binned data container (`Histogram`)

pub mod types;

pub use types::*;

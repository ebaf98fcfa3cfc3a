//! Synthetic data for exercising the shape.
//!
//! - `sample`: seeded histogram generation from a known parameter point

pub mod sample;

pub use sample::*;

//! Mathematical primitives: the single-sided Crystal Ball shape.

pub mod crystal_ball;

pub use crystal_ball::*;

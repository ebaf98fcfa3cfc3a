//! Fit shape implementations.
//!
//! The shape is implemented as small, pure functions over a fixed-size
//! parameter array so that fitting code can stay generic.

pub mod model;

pub use model::*;

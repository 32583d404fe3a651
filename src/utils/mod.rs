//! # Utilities Module
//!
//! Small numeric helpers shared by the graph and generation code.

pub mod math;

pub use math::*;

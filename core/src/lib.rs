//! # slamview core
//!
//! Math, wireframe meshes and settings shared by the SLAM map viewer crates.

pub mod math;
pub mod mesh;
pub mod settings;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

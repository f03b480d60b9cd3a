//! Export types
//!
//! This module defines the configuration, version table and the source scene
//! snapshot the exporter consumes.

mod config;
mod scene;
mod version;

pub use config::*;
pub use scene::*;
pub use version::*;

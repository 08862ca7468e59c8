//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod generate;
pub mod live;
pub mod presets;
pub mod render;

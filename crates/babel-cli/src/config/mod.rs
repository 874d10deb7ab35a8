//! Layered configuration: built-in defaults, then the TOML file, then `-S`
//! overrides, then dedicated command-line flags.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::{ConvertSettings, OptimizeSettings};

//! Parsing and validation of `breeze.toml` build configuration.
//!
//! This crate reads the JIT section of the project configuration and produces
//! a strongly-typed [`JitConfig`]: per-extension extractor and transformer
//! selection, the sort-key layer layout, and diagnostic policy.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;

//! # tunematch Common Library
//!
//! Shared code for the tunematch service crates:
//! - Error types
//! - Bootstrap configuration loading (TOML + environment)
//! - Credential resolution
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};

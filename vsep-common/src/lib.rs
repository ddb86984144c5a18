//! # VSEP Common Library
//!
//! Shared code for the vsep binaries:
//! - Error type and result alias
//! - TOML configuration loading
//! - Timestamp parsing and segment resolution
//! - Filename sanitization
//! - External tool invocation

pub mod config;
pub mod error;
pub mod naming;
pub mod time;
pub mod tool;

pub use error::{Error, Result};
pub use time::Segment;

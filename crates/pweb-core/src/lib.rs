//! Shared vocabulary for the pweb crates: scalar values and error types.

pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{OutputFormat, Scalar};

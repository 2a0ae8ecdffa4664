//! Shared types, errors, and configuration for the Recall content
//! intelligence engine.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::RecallConfig;
pub use error::{RecallError, Result};
pub use types::*;

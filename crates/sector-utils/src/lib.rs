//! Shared utilities for sector-pulse
//!
//! This crate provides common functionality used across the sector-pulse workspace,
//! including logging setup and application-level configuration.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{init_json_tracing_with, init_tracing, init_tracing_with};

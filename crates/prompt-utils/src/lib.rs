//! Shared utilities for prompt-rs
//!
//! This crate provides the logging setup and configuration loading used by
//! the prompt-rs binaries.

pub mod config;
pub mod logging;

pub use config::{CacheSettings, Config, ConfigError, LogFormat};
pub use logging::{init_tracing, init_tracing_with};

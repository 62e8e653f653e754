//! Common utilities shared by the JetSim crates.
//!
//! This crate provides:
//! - Configuration loading (files, environment, defaults)
//! - Tracing subscriber setup
//! - File checksum verification

pub mod config;
pub mod crypto;
pub mod telemetry;

// Re-export commonly used types
pub use config::{EvalConfig, EvaluationSettings, PathsConfig, TelemetryConfig};
pub use crypto::ChecksumVerifier;
pub use telemetry::init_tracing;

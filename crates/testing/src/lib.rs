//! Testing utilities for JetSim
//!
//! This crate provides:
//! - Fixtures for jet samples, metadata files and checksums
//! - Builder patterns for submission metadata
//! - Mock implementations of the evaluation ports and metrics
//!
//! # Examples
//!
//! ```
//! use jetsim_testing::{builders::*, fixtures::*};
//!
//! let samples = jet_samples(100, 30, 7);
//! assert_eq!(samples.shape(), &[100, 30, 4]);
//!
//! let metadata = SubmissionMetadataBuilder::new("mp-gan")
//!     .with_sample("jetnet", "g30", "https://example.org/g30.hdf5", None)
//!     .build();
//! assert_eq!(metadata.sample_count(), 1);
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

// Re-export testing dependencies for convenience
pub use proptest;
pub use tempfile;
pub use wiremock;

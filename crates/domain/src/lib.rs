//! JetSim Domain Types
//!
//! Core records of the JetSim evaluation pipeline: submission metadata, data
//! class naming, cache layout, scores, reports and the error taxonomy shared by
//! every other crate.
//!
//! ## Architecture
//!
//! - **errors**: Error taxonomy with stable error codes
//! - **data_class**: Parsing of data class names like `g30` and `t150`
//! - **submission**: `metadata.yml` records and declared checksums
//! - **cache**: On-disk naming of EFP caches
//! - **scores**: Metric values and the four-score record
//! - **report**: Persisted evaluation reports
//!
//! ## Usage
//!
//! ```rust
//! use jetsim_domain::data_class::DataClass;
//!
//! let class = DataClass::parse("jetnet", "g30").unwrap();
//! assert_eq!(class.num_particles(), 30);
//! assert_eq!(class.normalized(), "g");
//! ```

#![warn(clippy::all)]

pub mod cache;
pub mod data_class;
pub mod errors;
pub mod report;
pub mod scores;
pub mod submission;

pub use cache::EfpCacheLayout;
pub use data_class::{DataClass, ParticleCount};
pub use errors::{
    ConfigurationError, ErrorCategory, EvalError, EvalResult, IntegrityError, PreconditionError,
    StorageError, TransportError,
};
pub use report::{EvaluationReport, LoadFailure, SubmissionReport, UnitFailure};
pub use scores::{MetricValue, Scores};
pub use submission::{Checksum, ChecksumAlgorithm, SampleSource, SubmissionMetadata};

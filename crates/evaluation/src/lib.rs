//! JetSim Evaluation Pipeline
//!
//! Scores generated jet samples from challenge submissions against reference
//! datasets.
//!
//! ## Architecture
//!
//! - **ports**: Traits for the collaborators the pipeline drives (transfer,
//!   sample reading, reference dataset providers)
//! - **samples**: `SampleSet`, one dataset/data_class collection with its
//!   download state and EFP cache
//! - **registry**: Capability table of supported reference datasets
//! - **resolver**: Resolution of reference samples through the registry
//! - **submission**: Loading and discovery of submissions
//! - **metrics**: The `MetricsProvider` contract and the `JetMetrics` provider
//! - **evaluator**: The fixed four-metric battery
//! - **orchestrator**: The run loop over submissions and pairs
//! - **report**: Report persistence
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jetsim_evaluation::submission::load_submission;
//! use jetsim_domain::EfpCacheLayout;
//! use std::path::Path;
//!
//! let submission = load_submission(
//!     Path::new("submissions"),
//!     "mp-gan",
//!     Path::new("datasets"),
//!     EfpCacheLayout::default(),
//! )
//! .unwrap();
//! println!("{} declares {} sample sets", submission.name(), submission.len());
//! ```

#![warn(clippy::all)]

pub mod evaluator;
pub mod metrics;
pub mod orchestrator;
pub mod ports;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod samples;
pub mod submission;

pub use evaluator::MetricsEvaluator;
pub use metrics::{JetMetrics, MetricsProvider, W1Options};
pub use orchestrator::{LoadOutcome, Orchestrator, SubmissionSelector};
pub use ports::{DatasetProvider, FetchRequest, SampleIo, SampleReader, Transfer};
pub use registry::{DatasetEntry, DatasetRegistry};
pub use resolver::RealDataResolver;
pub use samples::SampleSet;
pub use submission::{discover_submissions, load_submission, Submission};

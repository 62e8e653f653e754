//! Infrastructure layer for JetSim
//!
//! This crate provides implementations of the evaluation ports:
//! - HTTP downloads with progress reporting ([`transfer::HttpTransfer`])
//! - Sample readers for `.npy` arrays and HDF5 containers ([`readers`])
//! - The JetNet reference dataset provider and the standard registry
//!   ([`jetnet`])
//!
//! HDF5 support links against the system library and is behind the `hdf5`
//! feature. Without it, HDF5 containers fail to load with a storage error
//! while `.npy` files keep working.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jetsim_evaluation::{RealDataResolver, SampleIo};
//! use jetsim_infrastructure::{jetnet::standard_registry, ContainerReader, HttpTransfer};
//! use std::sync::Arc;
//!
//! let transfer = Arc::new(HttpTransfer::new());
//! let reader = Arc::new(ContainerReader);
//!
//! let resolver = RealDataResolver::new(standard_registry(transfer.clone(), reader.clone()));
//! let sample_io = SampleIo::new(transfer, reader);
//! ```

pub mod jetnet;
pub mod readers;
pub mod transfer;

pub use jetnet::{standard_registry, JetNetProvider};
#[cfg(feature = "hdf5")]
pub use readers::Hdf5Reader;
pub use readers::{ContainerFormat, ContainerReader, NpyReader};
pub use transfer::HttpTransfer;

//! # FMI Cross-Check Core
//!
//! Shared logic for the FMI cross-check processor: the data model for
//! tools, exported FMUs and cross-check results, the leveled [`report::Reporter`],
//! validation gating, per-vendor table merging, and the [`store::Database`]
//! trait that persistence backends implement.
//!
//! This crate performs no filesystem or process I/O. Everything that touches
//! a vendor repository on disk lives in the `fmi-xc` crate.

pub mod error;
pub mod merge;
pub mod models;
pub mod report;
pub mod store;
pub mod summary;
pub mod validate;

pub use error::XcError;

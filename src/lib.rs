//! # fmi-xc
//!
//! Validates vendor repositories of FMI cross-check data and publishes the
//! merged tool, FMU, and cross-check tables.
//!
//! A vendor repository follows a directory convention: exported FMUs under
//! `Test_FMUs/`, import results under `CrossCheck_Results/`, and INI
//! descriptors for the vendor and its tools at the top level. Each run
//! replaces the processed vendors' rows wholesale and leaves everybody
//! else's rows alone.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌────────────┐   ┌────────────┐
//! │   scan     │──▶│ exports /    │──▶│  validate  │──▶│  Database  │
//! │ (walkdir)  │   │ imports      │   │ + reconcile│   │ file / git │
//! └────────────┘   └──────────────┘   └─────┬──────┘   └────────────┘
//!                                           │
//!                                     ┌─────▼──────┐
//!                                     │  Reporter  │
//!                                     └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! fmixc process ./vendors/acme --db file --output ./artifacts
//! fmixc process ./vendors/* --db git --branch testing --moved
//! fmixc exports ./vendors/acme/Test_FMUs --tool AcmeSim
//! fmixc imports ./vendors/acme/CrossCheck_Results --grouped
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`report`] | Stderr and log-file finding sinks |
//! | [`scan`] | Directory traversal and the per-run listing cache |
//! | [`exports`] | Exported FMU records and their validation |
//! | [`imports`] | Cross-check import records, validation, result markers |
//! | [`reconcile`] | Imports into cross-check rows |
//! | [`ini`] | INI reader for descriptors |
//! | [`tools`] | Tool descriptors and ownership checks |
//! | [`vendor`] | Vendor descriptor loading |
//! | [`process`] | Per-repository and batch orchestration |
//! | [`database`] | Backend selection |
//! | [`db_file`] | JSON-file backend |
//! | [`db_git`] | Git-backed backend |
//! | [`db_dryrun`] | No-op backend |

pub mod config;
pub mod database;
pub mod db_dryrun;
pub mod db_file;
pub mod db_git;
pub mod exports;
pub mod imports;
pub mod ini;
pub mod logging;
pub mod process;
pub mod reconcile;
pub mod report;
pub mod scan;
pub mod tools;
pub mod vendor;

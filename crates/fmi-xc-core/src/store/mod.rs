//! Persistence abstraction for the three output tables.
//!
//! The [`Database`] trait is the narrow interface the processing pipeline
//! talks to. Backends (JSON files, a Git-backed data repository, a dry run,
//! the in-memory store below) all replace a vendor's rows wholesale on each
//! update and persist only on [`commit`](Database::commit)/[`close`](Database::close).
//!
//! # Lifecycle
//!
//! ```text
//! open → (tools | update_* | remove_*)* → commit → close
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CrossCheckTable, FmuTable, ToolsTable};

/// Abstract storage backend for tool, FMU and cross-check tables.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`open`](Database::open) | Load any previously persisted tables |
/// | [`tools`](Database::tools) | Current tool registry, for ownership checks |
/// | [`update_tools`](Database::update_tools) | Replace one vendor's tools |
/// | [`update_fmus`](Database::update_fmus) | Replace one vendor's FMUs |
/// | [`update_cross_checks`](Database::update_cross_checks) | Replace one vendor's cross-check results |
/// | [`remove_vendor`](Database::remove_vendor) | Drop everything a vendor owns |
/// | [`remove_tools`](Database::remove_tools) | Drop other vendors' claims to tool ids |
/// | [`commit`](Database::commit) | Persist the merged tables |
/// | [`close`](Database::close) | Release resources, publish if applicable |
#[async_trait]
pub trait Database: Send {
    async fn open(&mut self) -> Result<()>;

    async fn tools(&self) -> Result<ToolsTable>;

    /// `tools` must all be owned by `vendor_id`.
    async fn update_tools(&mut self, tools: &ToolsTable, vendor_id: &str) -> Result<()>;

    /// `fmus` must all be owned by `vendor_id`.
    async fn update_fmus(&mut self, fmus: &FmuTable, vendor_id: &str) -> Result<()>;

    /// `results` must all be owned by `vendor_id`.
    async fn update_cross_checks(&mut self, results: &CrossCheckTable, vendor_id: &str)
        -> Result<()>;

    async fn remove_vendor(&mut self, vendor_id: &str) -> Result<()>;

    /// Remove `tool_ids` from every vendor other than `except_vendor`.
    async fn remove_tools(&mut self, tool_ids: &[String], except_vendor: &str) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

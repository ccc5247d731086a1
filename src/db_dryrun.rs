//! A [`Database`] that persists nothing.
//!
//! Every call succeeds and is logged at debug level. The registry is always
//! empty, so ownership checks never find a conflict.

use anyhow::Result;
use async_trait::async_trait;

use fmi_xc_core::models::{CrossCheckTable, FmuTable, ToolsTable};
use fmi_xc_core::store::Database;

#[derive(Debug, Default)]
pub struct DryRunDatabase;

#[async_trait]
impl Database for DryRunDatabase {
    async fn open(&mut self) -> Result<()> {
        tracing::debug!("dryrun: opening database");
        Ok(())
    }

    async fn tools(&self) -> Result<ToolsTable> {
        Ok(Vec::new())
    }

    async fn update_tools(&mut self, tools: &ToolsTable, vendor_id: &str) -> Result<()> {
        tracing::debug!(vendor = vendor_id, count = tools.len(), "dryrun: updating tools");
        Ok(())
    }

    async fn update_fmus(&mut self, fmus: &FmuTable, vendor_id: &str) -> Result<()> {
        tracing::debug!(vendor = vendor_id, count = fmus.len(), "dryrun: updating FMUs");
        Ok(())
    }

    async fn update_cross_checks(
        &mut self,
        results: &CrossCheckTable,
        vendor_id: &str,
    ) -> Result<()> {
        tracing::debug!(vendor = vendor_id, count = results.len(), "dryrun: updating cross checks");
        Ok(())
    }

    async fn remove_vendor(&mut self, vendor_id: &str) -> Result<()> {
        tracing::debug!(vendor = vendor_id, "dryrun: removing vendor");
        Ok(())
    }

    async fn remove_tools(&mut self, tool_ids: &[String], except_vendor: &str) -> Result<()> {
        tracing::debug!(?tool_ids, keep = except_vendor, "dryrun: removing tools");
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        tracing::debug!("dryrun: committing database");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        tracing::debug!("dryrun: closing database");
        Ok(())
    }
}

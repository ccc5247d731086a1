//! In-memory [`Database`] implementation.
//!
//! Holds the three tables in a [`Tables`] value. Used by tests, and as the
//! working state behind the file-backed database. `commit` sorts the tables
//! and records how many commits happened; nothing is written anywhere.

use anyhow::Result;
use async_trait::async_trait;

use crate::merge::Tables;
use crate::models::{CrossCheckTable, FmuTable, ToolsTable};

use super::Database;

#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: Tables,
    commits: usize,
    open: bool,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted tables.
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn into_tables(self) -> Tables {
        self.tables
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    async fn tools(&self) -> Result<ToolsTable> {
        Ok(self.tables.tools.clone())
    }

    async fn update_tools(&mut self, tools: &ToolsTable, vendor_id: &str) -> Result<()> {
        self.tables.update_tools(tools, vendor_id)
    }

    async fn update_fmus(&mut self, fmus: &FmuTable, vendor_id: &str) -> Result<()> {
        self.tables.update_fmus(fmus, vendor_id)
    }

    async fn update_cross_checks(
        &mut self,
        results: &CrossCheckTable,
        vendor_id: &str,
    ) -> Result<()> {
        self.tables.update_cross_checks(results, vendor_id)
    }

    async fn remove_vendor(&mut self, vendor_id: &str) -> Result<()> {
        self.tables.remove_vendor(vendor_id);
        Ok(())
    }

    async fn remove_tools(&mut self, tool_ids: &[String], except_vendor: &str) -> Result<()> {
        self.tables.remove_tools(tool_ids, except_vendor);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.tables.sort();
        self.commits += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}

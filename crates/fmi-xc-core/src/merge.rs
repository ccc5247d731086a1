//! Per-vendor replacement of the aggregate tables.
//!
//! A run supplies the complete current state for each vendor it processes.
//! Merging drops every row that vendor owned before and appends the new
//! rows, so re-running with identical input yields an identical table and
//! rows that disappeared from a repository disappear from the table.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::XcError;
use crate::models::{CrossCheckTable, FmuTable, ToolsTable, VendorOwned};

/// Replace `vendor_id`'s rows in `existing` with `updates`.
///
/// Fails without touching anything if any update row belongs to another vendor.
pub fn merge_by_vendor<T>(existing: &[T], updates: &[T], vendor_id: &str) -> Result<Vec<T>>
where
    T: VendorOwned + Clone,
{
    if let Some(stray) = updates.iter().find(|row| row.vendor_id() != vendor_id) {
        return Err(XcError::VendorMismatch {
            expected: vendor_id.to_string(),
            found: stray.vendor_id().to_string(),
        }
        .into());
    }
    let mut merged: Vec<T> = existing
        .iter()
        .filter(|row| row.vendor_id() != vendor_id)
        .cloned()
        .collect();
    merged.extend(updates.iter().cloned());
    Ok(merged)
}

pub fn remove_vendor<T: VendorOwned>(table: &mut Vec<T>, vendor_id: &str) {
    table.retain(|row| row.vendor_id() != vendor_id);
}

/// Sort rows by their compact JSON serialization.
pub fn sort_table<T: Serialize>(table: &mut [T]) {
    table.sort_by_cached_key(|row| serde_json::to_string(row).unwrap_or_default());
}

/// The three published tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    pub tools: ToolsTable,
    pub fmus: FmuTable,
    pub cross_checks: CrossCheckTable,
}

impl Tables {
    pub fn update_tools(&mut self, updates: &ToolsTable, vendor_id: &str) -> Result<()> {
        self.tools = merge_by_vendor(&self.tools, updates, vendor_id)?;
        Ok(())
    }

    pub fn update_fmus(&mut self, updates: &FmuTable, vendor_id: &str) -> Result<()> {
        self.fmus = merge_by_vendor(&self.fmus, updates, vendor_id)?;
        Ok(())
    }

    pub fn update_cross_checks(&mut self, updates: &CrossCheckTable, vendor_id: &str) -> Result<()> {
        self.cross_checks = merge_by_vendor(&self.cross_checks, updates, vendor_id)?;
        Ok(())
    }

    pub fn remove_vendor(&mut self, vendor_id: &str) {
        remove_vendor(&mut self.tools, vendor_id);
        remove_vendor(&mut self.fmus, vendor_id);
        remove_vendor(&mut self.cross_checks, vendor_id);
    }

    /// Drop the given tool ids from every vendor except `except_vendor`.
    pub fn remove_tools(&mut self, tool_ids: &[String], except_vendor: &str) {
        self.tools.retain(|tool| {
            tool.vendor.vendor_id == except_vendor || !tool_ids.contains(&tool.id)
        });
    }

    pub fn sort(&mut self) {
        sort_table(&mut self.tools);
        sort_table(&mut self.fmus);
        sort_table(&mut self.cross_checks);
    }
}

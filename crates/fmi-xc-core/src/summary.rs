//! Grouped view of cross-check results.
//!
//! The published table is flat (one row per importer/exporter/model). Some
//! consumers want the older shape where each importer/exporter pair carries
//! lists of passed, failed and rejected models; this module derives it.

use crate::models::{CrossCheckResult, CrossCheckStatus, CrossCheckSummary, ToolDetails};

/// Fold flat results into one summary per (version, variant, platform,
/// importer, exporter) in first-seen order.
pub fn group_results(results: &[CrossCheckResult]) -> Vec<CrossCheckSummary> {
    let mut groups: Vec<CrossCheckSummary> = Vec::new();
    for result in results {
        let importer = ToolDetails {
            tool: result.import_tool.clone(),
            version: result.import_version.clone(),
        };
        let exporter = ToolDetails {
            tool: result.export_tool.clone(),
            version: result.export_version.clone(),
        };
        let position = groups.iter().position(|g| {
            g.version == result.version
                && g.variant == result.variant
                && g.platform == result.platform
                && g.importer == importer
                && g.exporter == exporter
        });
        let group = match position {
            Some(i) => &mut groups[i],
            None => {
                groups.push(CrossCheckSummary {
                    version: result.version,
                    variant: result.variant,
                    platform: result.platform,
                    importer,
                    exporter,
                    passed: Vec::new(),
                    failed: Vec::new(),
                    rejected: Vec::new(),
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        let bucket = match result.status {
            CrossCheckStatus::Passed => &mut group.passed,
            CrossCheckStatus::Failed => &mut group.failed,
            CrossCheckStatus::Rejected => &mut group.rejected,
        };
        bucket.push(result.model.clone());
    }
    groups
}

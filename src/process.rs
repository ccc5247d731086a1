//! Processing orchestration.
//!
//! Drives one vendor repository through the pipeline (tools, then exports,
//! then imports) and a batch of repositories through one database session.
//! Export and import failures are reported as fatal findings and do not stop
//! the repository; tool and vendor failures abort the repository, roll back
//! its rows, and let the batch continue.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fmi_xc_core::models::VendorDetails;
use fmi_xc_core::report::{ReportLevel, Reporter};
use fmi_xc_core::store::Database;
use fmi_xc_core::validate::validate_all;

use crate::db_file::{to_json_pretty, FMUS_FILE, TOOLS_FILE, XC_FILE};
use crate::exports::{build_fmu_table, get_exports, ExportValidator, EXPORT_DIR};
use crate::imports::{get_imports, ImportValidator, CROSS_CHECK_DIR};
use crate::reconcile::build_cross_check_table;
use crate::scan::DirectoryCache;
use crate::tools::{check_ownership, load_tools, shared_tool_ids, OwnershipPolicy};
use crate::vendor::load_vendor_data;

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Process `CrossCheck_Results` as well as exports.
    pub imports: bool,
    pub ownership: OwnershipPolicy,
    /// Check import tools against local tools and export tools against all known tools.
    pub strict_tools: bool,
    /// Write per-vendor JSON snapshots under this directory.
    pub artifacts: Option<PathBuf>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            imports: true,
            ownership: OwnershipPolicy::Reject,
            strict_tools: false,
            artifacts: None,
        }
    }
}

/// What one repository contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSummary {
    pub dir: PathBuf,
    pub vendor_id: String,
    pub tools: usize,
    /// `None` when there was no export tree or it failed.
    pub fmus: Option<usize>,
    /// `None` when imports were skipped, absent, or failed.
    pub cross_checks: Option<usize>,
    /// Tool ids taken over from other vendors.
    pub moved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Processed(RepoSummary),
    Failed { dir: PathBuf, error: String },
}

fn write_snapshot<T: Serialize>(
    artifacts: Option<&Path>,
    vendor_id: &str,
    file: &str,
    rows: &[T],
) -> Result<()> {
    let Some(root) = artifacts else {
        return Ok(());
    };
    let dir = root.join(vendor_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create artifacts directory: {}", dir.display()))?;
    let path = dir.join(file);
    std::fs::write(&path, to_json_pretty(rows)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(file = %path.display(), rows = rows.len(), "wrote artifact");
    Ok(())
}

async fn process_exports(
    db: &mut dyn Database,
    fmu_dir: &Path,
    vendor_id: &str,
    local: &BTreeSet<String>,
    options: &ProcessOptions,
    cache: &mut DirectoryCache,
    reporter: &mut Reporter,
) -> Result<usize> {
    let all = get_exports(cache, fmu_dir, None)?;
    let validator = ExportValidator::new(local.iter().cloned());
    let exports = validate_all(all, &validator, reporter);
    let fmus = build_fmu_table(&exports, vendor_id)?;
    write_snapshot(options.artifacts.as_deref(), vendor_id, FMUS_FILE, &fmus)?;
    db.update_fmus(&fmus, vendor_id).await?;
    Ok(fmus.len())
}

async fn process_imports(
    db: &mut dyn Database,
    xc_dir: &Path,
    vendor_id: &str,
    validator: &ImportValidator,
    options: &ProcessOptions,
    cache: &mut DirectoryCache,
    reporter: &mut Reporter,
) -> Result<usize> {
    let all = get_imports(cache, xc_dir, None)?;
    let imports = validate_all(all, validator, reporter);
    let results = build_cross_check_table(&imports, vendor_id, reporter)?;
    write_snapshot(options.artifacts.as_deref(), vendor_id, XC_FILE, &results)?;
    db.update_cross_checks(&results, vendor_id).await?;
    Ok(results.len())
}

/// Process one vendor repository into `db`.
#[tracing::instrument(skip(db, vendor, options, cache, reporter), fields(vendor = %vendor.vendor_id))]
pub async fn process_repo(
    db: &mut dyn Database,
    dir: &Path,
    vendor: &VendorDetails,
    options: &ProcessOptions,
    cache: &mut DirectoryCache,
    reporter: &mut Reporter,
) -> Result<RepoSummary> {
    let vendor_id = vendor.vendor_id.as_str();

    let tools = load_tools(dir, vendor, reporter)?;
    let local: BTreeSet<String> = tools.iter().map(|t| t.id.clone()).collect();
    tracing::debug!(?local, "local tools");

    let existing = db.tools().await?;
    for (id, owners) in shared_tool_ids(&existing) {
        reporter.report(
            format!(
                "Tool '{}' is registered by several vendors ({}); the registry needs cleaning up",
                id,
                owners.join(", ")
            ),
            ReportLevel::Major,
        );
    }
    let moved = check_ownership(&existing, &tools, vendor_id, options.ownership)?;
    db.update_tools(&tools, vendor_id).await?;
    write_snapshot(options.artifacts.as_deref(), vendor_id, TOOLS_FILE, &tools)?;

    let fmu_dir = dir.join(EXPORT_DIR);
    let fmus = if fmu_dir.exists() {
        match process_exports(db, &fmu_dir, vendor_id, &local, options, cache, reporter).await {
            Ok(count) => Some(count),
            Err(e) => {
                reporter.report(
                    format!("Error while processing exports in {}: {:#}", dir.display(), e),
                    ReportLevel::Fatal,
                );
                None
            }
        }
    } else {
        tracing::debug!(dir = %fmu_dir.display(), "no export directory, skipping");
        None
    };

    let xc_dir = dir.join(CROSS_CHECK_DIR);
    let cross_checks = if options.imports && xc_dir.exists() {
        let validator = if options.strict_tools {
            let mut known: BTreeSet<String> = existing.iter().map(|t| t.id.clone()).collect();
            known.extend(local.iter().cloned());
            ImportValidator::strict(local.clone(), known)
        } else {
            ImportValidator::new()
        };
        match process_imports(db, &xc_dir, vendor_id, &validator, options, cache, reporter).await {
            Ok(count) => Some(count),
            Err(e) => {
                reporter.report(
                    format!("Error while processing imports in {}: {:#}", dir.display(), e),
                    ReportLevel::Fatal,
                );
                None
            }
        }
    } else {
        if xc_dir.exists() {
            tracing::debug!("skipping import data");
        } else {
            tracing::debug!(dir = %xc_dir.display(), "no cross-check directory, skipping");
        }
        None
    };

    // Previous owners lose their rows only once this repository went through.
    if !moved.is_empty() {
        db.remove_tools(&moved, vendor_id).await?;
    }

    Ok(RepoSummary {
        dir: dir.to_path_buf(),
        vendor_id: vendor_id.to_string(),
        tools: tools.len(),
        fmus,
        cross_checks,
        moved,
    })
}

fn print_summary(summary: &RepoSummary) {
    println!("process {}", summary.dir.display());
    println!("  vendor: {}", summary.vendor_id);
    println!("  tools: {}", summary.tools);
    match summary.fmus {
        Some(n) => println!("  fmus: {}", n),
        None => println!("  fmus: skipped"),
    }
    match summary.cross_checks {
        Some(n) => println!("  cross-check results: {}", n),
        None => println!("  cross-check results: skipped"),
    }
    if !summary.moved.is_empty() {
        println!("  tools moved: {}", summary.moved.join(", "));
    }
    println!("ok");
}

/// Process every directory in one database session.
///
/// The database is opened first and committed and closed after the last
/// directory, whatever happened to the individual directories.
pub async fn run_batch(
    db: &mut dyn Database,
    dirs: &[PathBuf],
    options: &ProcessOptions,
    reporter: &mut Reporter,
) -> Result<Vec<RepoOutcome>> {
    db.open().await.context("Failed to open database")?;
    tracing::debug!("database opened");

    let mut cache = DirectoryCache::new();
    let mut outcomes = Vec::with_capacity(dirs.len());

    for dir in dirs {
        tracing::info!(dir = %dir.display(), "processing directory");
        reporter.set_context(dir.display().to_string());

        let mut vendor_id = None;
        let result = match load_vendor_data(dir) {
            Ok(vendor) => {
                reporter.set_context(vendor.vendor_id.clone());
                vendor_id = Some(vendor.vendor_id.clone());
                process_repo(db, dir, &vendor, options, &mut cache, reporter).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => {
                print_summary(&summary);
                outcomes.push(RepoOutcome::Processed(summary));
            }
            Err(e) => {
                if let Some(id) = &vendor_id {
                    if let Err(rollback) = db.remove_vendor(id).await {
                        tracing::error!(vendor = %id, error = %rollback, "failed to remove vendor rows");
                    }
                }
                let error = format!("{:#}", e);
                reporter.report(
                    format!(
                        "Error while processing directory '{}', skipping: {}",
                        dir.display(),
                        error
                    ),
                    ReportLevel::Fatal,
                );
                outcomes.push(RepoOutcome::Failed {
                    dir: dir.clone(),
                    error,
                });
            }
        }
    }

    db.commit().await.context("Failed to commit database")?;
    tracing::debug!("committed changes to database");
    db.close().await.context("Failed to close database")?;
    tracing::debug!("database closed");
    Ok(outcomes)
}

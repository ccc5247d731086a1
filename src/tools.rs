//! Tool descriptors and tool ownership.
//!
//! A vendor directory declares its tools in `<toolId>.tool` files (current
//! format) or legacy `<toolId>.info` files. Both are INI documents:
//!
//! ```text
//! ; AcmeSim.tool                      ; AcmeSim.info
//! displayName = Acme Sim              [Tool]
//! homepage = https://acme.example     name = Acme Sim
//! [FMI2_0]                            href = https://acme.example
//! import = A                          import_me_20 = A
//! export = P                          export_me_20 = P
//! ```
//!
//! Capability codes are `A` (available), `P` (planned) or empty. Anything
//! else is reported as a `Minor` finding and read as unsupported. A missing
//! required key is a hard error for the file, never a finding.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use fmi_xc_core::models::{Status, ToolSummary, ToolsTable, VariantStatus, VendorDetails};
use fmi_xc_core::report::{ReportLevel, Reporter};
use fmi_xc_core::XcError;

use crate::ini::{self, Section};

pub const TOOL_SUFFIX: &str = ".tool";
pub const LEGACY_TOOL_SUFFIX: &str = ".info";

/// Names of the regular files in `dir` ending in `suffix`, sorted.
pub fn find_files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let listing = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    for entry in listing {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(suffix) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn parse_status(code: Option<&String>, file: &Path, reporter: &mut Reporter) -> Status {
    let code = code.map(|c| c.trim()).unwrap_or("");
    match Status::from_code(code) {
        Some(status) => status,
        None => {
            reporter.report(
                format!(
                    "Unknown status string '{}' found in {}, ignoring",
                    code,
                    file.display()
                ),
                ReportLevel::Minor,
            );
            Status::Unsupported
        }
    }
}

fn variant_status(
    section: Option<&Section>,
    keys: [&str; 4],
    file: &Path,
    reporter: &mut Reporter,
) -> VariantStatus {
    let get = |key: &str| section.and_then(|s| s.get(key));
    VariantStatus {
        import: parse_status(get(keys[0]), file, reporter),
        export: parse_status(get(keys[1]), file, reporter),
        slave: parse_status(get(keys[2]), file, reporter),
        master: parse_status(get(keys[3]), file, reporter),
    }
}

fn required(section: &Section, key: &str, file: &Path) -> Result<String> {
    section
        .get(key)
        .cloned()
        .ok_or_else(|| XcError::malformed(file, format!("missing required key '{}'", key)).into())
}

fn optional(section: &Section, key: &str) -> Option<String> {
    section.get(key).filter(|v| !v.is_empty()).cloned()
}

fn tool_id(file: &Path) -> Result<String> {
    file.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| XcError::malformed(file, "cannot derive a tool id from the file name").into())
}

/// Parse one `.tool` or `.info` file into a summary owned by `vendor`.
pub fn parse_tool_file(
    file: &Path,
    vendor: &VendorDetails,
    reporter: &mut Reporter,
) -> Result<ToolSummary> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| XcError::malformed(file, format!("unreadable: {}", e)))?;
    let doc = ini::parse(&text);
    let id = tool_id(file)?;

    let legacy = file
        .extension()
        .map(|ext| ext == LEGACY_TOOL_SUFFIX.trim_start_matches('.'))
        .unwrap_or(false);

    let summary = if legacy {
        let tool = doc
            .section("Tool")
            .ok_or_else(|| XcError::malformed(file, "missing [Tool] section"))?;
        ToolSummary {
            id,
            display_name: required(tool, "name", file)?,
            homepage: Some(required(tool, "href", file)?),
            email: optional(tool, "email"),
            note: tool.get("note").cloned().unwrap_or_default(),
            fmi1: variant_status(
                Some(tool),
                ["import_me", "export_me", "slave_cs", "master_cs"],
                file,
                reporter,
            ),
            fmi2: variant_status(
                Some(tool),
                ["import_me_20", "export_me_20", "slave_cs_20", "master_cs_20"],
                file,
                reporter,
            ),
            vendor: vendor.clone(),
        }
    } else {
        if let Some(claimed) = optional(&doc.root, "vendorId") {
            if claimed != vendor.vendor_id {
                return Err(XcError::malformed(
                    file,
                    format!(
                        "tool claims vendor '{}' but is loaded from the repository of '{}'",
                        claimed, vendor.vendor_id
                    ),
                )
                .into());
            }
        }
        let keys = ["import", "export", "slave", "master"];
        ToolSummary {
            id,
            display_name: required(&doc.root, "displayName", file)?,
            homepage: optional(&doc.root, "homepage"),
            email: optional(&doc.root, "email"),
            note: doc.root.get("note").cloned().unwrap_or_default(),
            fmi1: variant_status(doc.section("FMI1_0"), keys, file, reporter),
            fmi2: variant_status(doc.section("FMI2_0"), keys, file, reporter),
            vendor: vendor.clone(),
        }
    };

    tracing::debug!(tool = %summary.id, file = %file.display(), "parsed tool descriptor");
    Ok(summary)
}

/// Load every tool descriptor in `dir`.
///
/// A tool id defined by both a `.tool` and a `.info` file is an error.
#[tracing::instrument(level = "debug", skip(vendor, reporter), fields(vendor = %vendor.vendor_id))]
pub fn load_tools(dir: &Path, vendor: &VendorDetails, reporter: &mut Reporter) -> Result<ToolsTable> {
    let mut files = find_files_with_suffix(dir, TOOL_SUFFIX)?;
    files.extend(find_files_with_suffix(dir, LEGACY_TOOL_SUFFIX)?);

    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    let mut tools = Vec::with_capacity(files.len());
    for name in files {
        let path = dir.join(&name);
        let tool = parse_tool_file(&path, vendor, reporter)?;
        if let Some(first) = seen.insert(tool.id.clone(), name.clone()) {
            return Err(XcError::malformed(
                &path,
                format!("tool '{}' is already defined by {}", tool.id, first),
            )
            .into());
        }
        tools.push(tool);
    }
    Ok(tools)
}

/// How a tool id already owned by another vendor is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipPolicy {
    /// Abort the repository with an ownership conflict.
    #[default]
    Reject,
    /// Accept the claim; the previous owner keeps its row as well.
    Suppress,
    /// Accept the claim and purge the previous owner's row.
    Transfer,
}

/// Compare `incoming` tools for `vendor_id` against the persisted registry.
///
/// Returns the ids that must be purged from other vendors (non-empty only
/// under [`OwnershipPolicy::Transfer`]).
pub fn check_ownership(
    existing: &[ToolSummary],
    incoming: &[ToolSummary],
    vendor_id: &str,
    policy: OwnershipPolicy,
) -> Result<Vec<String>> {
    let mut moved = Vec::new();
    for tool in incoming {
        // A claim accepted in an earlier run stays accepted.
        if existing
            .iter()
            .any(|e| e.id == tool.id && e.vendor.vendor_id == vendor_id)
        {
            continue;
        }
        let Some(owner) = existing
            .iter()
            .find(|e| e.id == tool.id && e.vendor.vendor_id != vendor_id)
        else {
            continue;
        };
        match policy {
            OwnershipPolicy::Reject => {
                return Err(XcError::OwnershipConflict {
                    tool: tool.id.clone(),
                    owner: owner.vendor.vendor_id.clone(),
                    claimant: vendor_id.to_string(),
                }
                .into());
            }
            OwnershipPolicy::Suppress => {
                tracing::warn!(
                    tool = %tool.id,
                    owner = %owner.vendor.vendor_id,
                    claimant = vendor_id,
                    "tool already owned by another vendor; conflict suppressed"
                );
            }
            OwnershipPolicy::Transfer => {
                tracing::info!(
                    tool = %tool.id,
                    from = %owner.vendor.vendor_id,
                    to = vendor_id,
                    "transferring tool ownership"
                );
                if !moved.contains(&tool.id) {
                    moved.push(tool.id.clone());
                }
            }
        }
    }
    Ok(moved)
}

/// Tool ids registered by more than one vendor, with their owners in
/// registry order.
pub fn shared_tool_ids(existing: &[ToolSummary]) -> BTreeMap<String, Vec<String>> {
    let mut owners: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for tool in existing {
        let entry = owners.entry(tool.id.clone()).or_default();
        if !entry.contains(&tool.vendor.vendor_id) {
            entry.push(tool.vendor.vendor_id.clone());
        }
    }
    owners.retain(|_, vendors| vendors.len() > 1);
    owners
}

//! Exported FMUs.
//!
//! An export directory sits exactly six levels below the export root:
//!
//! ```text
//! Test_FMUs/<fmiVersion>/<variant>/<platform>/<exportTool>/<exportVersion>/<model>/
//! ```
//!
//! Directories at any other depth are not exports and are skipped silently.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fmi_xc_core::models::{parse_platform, parse_variant, parse_version, FmuDetails, FmuTable};
use fmi_xc_core::report::Finding;
use fmi_xc_core::validate::Validator;
use fmi_xc_core::XcError;

use crate::scan::{DirectoryCache, DirectoryEntry};

/// Name of the export tree inside a vendor repository.
pub const EXPORT_DIR: &str = "Test_FMUs";

/// Artifacts every export directory must contain, as `{model}{suffix}`.
pub const REQUIRED_SUFFIXES: [&str; 6] = [".fmu", "_ref.csv", "_in.csv", "_cc.log", "_cc.csv", "_ref.opt"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub dir: PathBuf,
    pub rel: PathBuf,
    pub fmi_version: String,
    pub variant: String,
    pub platform: String,
    pub export_tool: String,
    pub export_version: String,
    pub model: String,
}

pub fn parse_export(entry: &DirectoryEntry) -> Option<ExportRecord> {
    let [fmi_version, variant, platform, export_tool, export_version, model] =
        entry.parts.as_slice()
    else {
        return None;
    };
    Some(ExportRecord {
        dir: entry.dir.clone(),
        rel: entry.rel.clone(),
        fmi_version: fmi_version.clone(),
        variant: variant.clone(),
        platform: platform.clone(),
        export_tool: export_tool.clone(),
        export_version: export_version.clone(),
        model: model.clone(),
    })
}

/// All export records under `root` accepted by `predicate`.
pub fn get_exports(
    cache: &mut DirectoryCache,
    root: &Path,
    predicate: Option<&dyn Fn(&ExportRecord) -> bool>,
) -> Result<Vec<ExportRecord>> {
    let exports: Vec<ExportRecord> = cache
        .entries(root)?
        .iter()
        .filter_map(parse_export)
        .filter(|record| predicate.map_or(true, |keep| keep(record)))
        .collect();
    tracing::debug!(root = %root.display(), count = exports.len(), "found export directories");
    Ok(exports)
}

pub(crate) fn has_readme(dir: &Path) -> bool {
    dir.join("ReadMe.txt").exists() || dir.join("ReadMe.pdf").exists()
}

/// Checks an export against the tools defined by the current repository.
pub struct ExportValidator {
    local: BTreeSet<String>,
}

impl ExportValidator {
    pub fn new<I, S>(local: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            local: local.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator<ExportRecord> for ExportValidator {
    fn validate(&self, x: &ExportRecord) -> Vec<Finding> {
        let mut findings = Vec::new();

        if !self.local.contains(&x.export_tool) {
            let names: Vec<&str> = self.local.iter().map(String::as_str).collect();
            findings.push(Finding::major(format!(
                "Tool '{}' is not among list of tools defined in this repo: {}",
                x.export_tool,
                names.join(", ")
            )));
        }
        if parse_version(&x.fmi_version).is_none() {
            findings.push(Finding::major(format!("Unknown FMI version '{}'", x.fmi_version)));
        }
        if parse_variant(&x.variant).is_none() {
            findings.push(Finding::major(format!("Unknown FMI variant '{}'", x.variant)));
        }
        if parse_platform(&x.platform).is_none() {
            findings.push(Finding::major(format!("Unknown FMI platform '{}'", x.platform)));
        }

        for suffix in REQUIRED_SUFFIXES {
            let file_name = format!("{}{}", x.model, suffix);
            if !x.dir.join(&file_name).exists() {
                findings.push(Finding::major(format!(
                    "Expected to find a file named {} in {}",
                    file_name,
                    x.dir.display()
                )));
            }
        }

        if !has_readme(&x.dir) {
            findings.push(Finding::minor(format!(
                "No ReadMe.txt or ReadMe.pdf found in {}",
                x.dir.display()
            )));
        }
        let script = |ext: &str| x.dir.join(format!("{}_cc.{}", x.model, ext)).exists();
        if !script("bat") && !script("sh") {
            findings.push(Finding::minor(format!(
                "No shell script (.bat or .sh) found in {}",
                x.dir.display()
            )));
        }

        findings
    }
}

/// Turn validated exports into FMU rows owned by `vendor_id`.
pub fn build_fmu_table(records: &[ExportRecord], vendor_id: &str) -> Result<FmuTable> {
    records
        .iter()
        .map(|x| -> Result<FmuDetails> {
            let invariant = |what: &str, value: &str| {
                XcError::InvariantViolation(format!(
                    "validated export in {} has unparseable {} '{}'",
                    x.dir.display(),
                    what,
                    value
                ))
            };
            Ok(FmuDetails {
                name: x.model.clone(),
                version: parse_version(&x.fmi_version)
                    .ok_or_else(|| invariant("version", &x.fmi_version))?,
                variant: parse_variant(&x.variant).ok_or_else(|| invariant("variant", &x.variant))?,
                platform: parse_platform(&x.platform)
                    .ok_or_else(|| invariant("platform", &x.platform))?,
                vendor_id: vendor_id.to_string(),
                export_tool: x.export_tool.clone(),
                export_version: x.export_version.clone(),
            })
        })
        .collect()
}

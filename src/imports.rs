//! Cross-check import results.
//!
//! An import directory sits eight levels below the cross-check root:
//!
//! ```text
//! CrossCheck_Results/<fmiVersion>/<variant>/<platform>/<importTool>/<importVersion>/<exportTool>/<exportVersion>/<model>/
//! ```
//!
//! Its outcome is encoded by a sentinel file named `passed`, `failed` or
//! `rejected`.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fmi_xc_core::models::{parse_platform, parse_variant, parse_version, CrossCheckStatus};
use fmi_xc_core::report::{Finding, ReportLevel, Reporter};
use fmi_xc_core::validate::Validator;

use crate::exports::has_readme;
use crate::scan::{DirectoryCache, DirectoryEntry};

/// Name of the cross-check tree inside a vendor repository.
pub const CROSS_CHECK_DIR: &str = "CrossCheck_Results";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    pub dir: PathBuf,
    pub rel: PathBuf,
    pub fmi_version: String,
    pub variant: String,
    pub platform: String,
    pub import_tool: String,
    pub import_version: String,
    pub export_tool: String,
    pub export_version: String,
    pub model: String,
}

pub fn parse_import(entry: &DirectoryEntry) -> Option<ImportRecord> {
    let [fmi_version, variant, platform, import_tool, import_version, export_tool, export_version, model] =
        entry.parts.as_slice()
    else {
        return None;
    };
    Some(ImportRecord {
        dir: entry.dir.clone(),
        rel: entry.rel.clone(),
        fmi_version: fmi_version.clone(),
        variant: variant.clone(),
        platform: platform.clone(),
        import_tool: import_tool.clone(),
        import_version: import_version.clone(),
        export_tool: export_tool.clone(),
        export_version: export_version.clone(),
        model: model.clone(),
    })
}

pub fn get_imports(
    cache: &mut DirectoryCache,
    root: &Path,
    predicate: Option<&dyn Fn(&ImportRecord) -> bool>,
) -> Result<Vec<ImportRecord>> {
    let imports: Vec<ImportRecord> = cache
        .entries(root)?
        .iter()
        .filter_map(parse_import)
        .filter(|record| predicate.map_or(true, |keep| keep(record)))
        .collect();
    tracing::debug!(root = %root.display(), count = imports.len(), "found import directories");
    Ok(imports)
}

/// Validates import directories.
///
/// With `local` set, the importing tool must be one of the repository's own
/// tools. With `known` set, the exporting tool must be a known tool of any
/// vendor. Both are off unless strict tool checking is enabled.
#[derive(Debug, Default)]
pub struct ImportValidator {
    local: Option<BTreeSet<String>>,
    known: Option<BTreeSet<String>>,
}

impl ImportValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(local: BTreeSet<String>, known: BTreeSet<String>) -> Self {
        Self {
            local: Some(local),
            known: Some(known),
        }
    }
}

impl Validator<ImportRecord> for ImportValidator {
    fn validate(&self, x: &ImportRecord) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some(local) = &self.local {
            if !local.contains(&x.import_tool) {
                let names: Vec<&str> = local.iter().map(String::as_str).collect();
                findings.push(Finding::major(format!(
                    "Import tool '{}' is not among list of tools defined in this repo: {}",
                    x.import_tool,
                    names.join(", ")
                )));
            }
        }
        if let Some(known) = &self.known {
            if !known.contains(&x.export_tool) {
                findings.push(Finding::major(format!(
                    "Export tool '{}' is not among the list of known FMI tools",
                    x.export_tool
                )));
            }
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

        if x.dir.join("passed").exists() {
            let csv_name = format!("{}_out.csv", x.model);
            if !x.dir.join(&csv_name).exists() {
                findings.push(Finding::minor(format!(
                    "No CSV file named {} found in {}",
                    csv_name,
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

        findings
    }
}

/// Derive the outcome of one import from its sentinel file.
///
/// `passed` wins over `failed`, which wins over `rejected`. No sentinel at
/// all is reported and counts as a failure.
pub fn parse_result(dir: &Path, reporter: &mut Reporter) -> CrossCheckStatus {
    let present: Vec<CrossCheckStatus> = [
        CrossCheckStatus::Passed,
        CrossCheckStatus::Failed,
        CrossCheckStatus::Rejected,
    ]
    .into_iter()
    .filter(|status| dir.join(status.as_str()).exists())
    .collect();

    match present.as_slice() {
        [] => {
            reporter.report(
                format!(
                    "No result file name 'passed', 'failed' or 'rejected' found in {}",
                    dir.display()
                ),
                ReportLevel::Minor,
            );
            CrossCheckStatus::Failed
        }
        [only] => *only,
        [winner, ..] => {
            let names: Vec<&str> = present.iter().map(|s| s.as_str()).collect();
            reporter.report(
                format!(
                    "Conflicting result markers ({}) found in {}, using '{}'",
                    names.join(", "),
                    dir.display(),
                    winner
                ),
                ReportLevel::Minor,
            );
            *winner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmi_xc_core::report::CollectingSink;
    use tempfile::TempDir;

    const REL: &str = "FMI_2.0/CoSimulation/win64/AcmeSim/3.1/Dymola/2019/BouncingBall";

    fn make_import(root: &Path, markers: &[&str]) -> PathBuf {
        let dir = root.join(REL);
        std::fs::create_dir_all(&dir).unwrap();
        for marker in markers {
            std::fs::write(dir.join(marker), "").unwrap();
        }
        dir
    }

    fn collecting() -> (Reporter, CollectingSink) {
        let sink = CollectingSink::new();
        (Reporter::new(ReportLevel::Minor, Box::new(sink.clone())), sink)
    }

    #[test]
    fn test_only_eight_parts_parse() {
        let tmp = TempDir::new().unwrap();
        make_import(tmp.path(), &[]);
        let mut cache = DirectoryCache::new();
        let imports = get_imports(&mut cache, tmp.path(), None).unwrap();
        assert_eq!(imports.len(), 1);
        let x = &imports[0];
        assert_eq!(x.import_tool, "AcmeSim");
        assert_eq!(x.import_version, "3.1");
        assert_eq!(x.export_tool, "Dymola");
        assert_eq!(x.export_version, "2019");
        assert_eq!(x.model, "BouncingBall");
        assert_eq!(x.rel, PathBuf::from(REL));
    }

    #[test]
    fn test_missing_sentinel_defaults_to_failed() {
        let tmp = TempDir::new().unwrap();
        let dir = make_import(tmp.path(), &[]);
        let (mut reporter, sink) = collecting();
        assert_eq!(parse_result(&dir, &mut reporter), CrossCheckStatus::Failed);
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, ReportLevel::Minor);
        assert!(lines[0].1.contains(&dir.display().to_string()));
    }

    #[test]
    fn test_sentinel_precedence() {
        let tmp = TempDir::new().unwrap();
        let dir = make_import(tmp.path(), &["rejected"]);
        let (mut reporter, sink) = collecting();
        assert_eq!(parse_result(&dir, &mut reporter), CrossCheckStatus::Rejected);
        assert!(sink.lines().is_empty());

        std::fs::write(dir.join("passed"), "").unwrap();
        assert_eq!(parse_result(&dir, &mut reporter), CrossCheckStatus::Passed);
        assert_eq!(sink.lines().len(), 1);
        assert!(sink.lines()[0].1.contains("Conflicting result markers (passed, rejected)"));
    }

    #[test]
    fn test_passed_without_output_csv_is_minor() {
        let tmp = TempDir::new().unwrap();
        let dir = make_import(tmp.path(), &["passed"]);
        std::fs::write(dir.join("ReadMe.pdf"), "").unwrap();
        let record = parse_import(&DirectoryEntry {
            dir: dir.clone(),
            rel: PathBuf::from(REL),
            parts: REL.split('/').map(String::from).collect(),
        })
        .unwrap();
        let findings = ImportValidator::new().validate(&record);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].level, ReportLevel::Minor);
        assert!(findings[0].message.contains("BouncingBall_out.csv"));

        std::fs::write(dir.join("BouncingBall_out.csv"), "").unwrap();
        assert!(ImportValidator::new().validate(&record).is_empty());
    }

    #[test]
    fn test_strict_tool_checks() {
        let tmp = TempDir::new().unwrap();
        let dir = make_import(tmp.path(), &["failed"]);
        std::fs::write(dir.join("ReadMe.txt"), "").unwrap();
        let record = parse_import(&DirectoryEntry {
            dir,
            rel: PathBuf::from(REL),
            parts: REL.split('/').map(String::from).collect(),
        })
        .unwrap();

        let local: BTreeSet<String> = ["AcmeSim".to_string()].into();
        let known: BTreeSet<String> = ["AcmeSim".to_string()].into();
        let findings = ImportValidator::strict(local.clone(), known).validate(&record);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Export tool 'Dymola' is not among the list of known FMI tools"
        );

        let known: BTreeSet<String> = ["Dymola".to_string()].into();
        assert!(ImportValidator::strict(local, known).validate(&record).is_empty());
    }
}

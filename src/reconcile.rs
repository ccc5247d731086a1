//! Validated imports into cross-check rows.

use anyhow::Result;

use fmi_xc_core::models::{parse_platform, parse_variant, parse_version, CrossCheckResult, CrossCheckTable};
use fmi_xc_core::report::Reporter;
use fmi_xc_core::XcError;

use crate::imports::{parse_result, ImportRecord};

/// One row per import, tagged with `vendor_id`, status read from the
/// directory's sentinel file.
///
/// Records must already have passed [`ImportValidator`](crate::imports::ImportValidator);
/// an enum that still fails to parse here is an internal error.
pub fn build_cross_check_table(
    records: &[ImportRecord],
    vendor_id: &str,
    reporter: &mut Reporter,
) -> Result<CrossCheckTable> {
    let mut table = Vec::with_capacity(records.len());
    for imp in records {
        let invariant = |what: &str, value: &str| {
            XcError::InvariantViolation(format!(
                "validated import in {} has unparseable {} '{}'",
                imp.dir.display(),
                what,
                value
            ))
        };
        let version = parse_version(&imp.fmi_version).ok_or_else(|| invariant("version", &imp.fmi_version))?;
        let variant = parse_variant(&imp.variant).ok_or_else(|| invariant("variant", &imp.variant))?;
        let platform = parse_platform(&imp.platform).ok_or_else(|| invariant("platform", &imp.platform))?;

        table.push(CrossCheckResult {
            version,
            variant,
            platform,
            vendor_id: vendor_id.to_string(),
            import_tool: imp.import_tool.clone(),
            import_version: imp.import_version.clone(),
            export_tool: imp.export_tool.clone(),
            export_version: imp.export_version.clone(),
            model: imp.model.clone(),
            status: parse_result(&imp.dir, reporter),
        });
    }
    tracing::debug!(vendor = vendor_id, rows = table.len(), "built cross-check table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::parse_import;
    use crate::scan::DirectoryEntry;
    use fmi_xc_core::models::{CrossCheckStatus, FmiPlatform};
    use fmi_xc_core::report::{CollectingSink, ReportLevel};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn record(root: &Path, rel: &str, marker: Option<&str>) -> ImportRecord {
        let dir = root.join(rel);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(marker) = marker {
            std::fs::write(dir.join(marker), "").unwrap();
        }
        parse_import(&DirectoryEntry {
            dir,
            rel: PathBuf::from(rel),
            parts: rel.split('/').map(String::from).collect(),
        })
        .unwrap()
    }

    #[test]
    fn test_one_row_per_import() {
        let tmp = TempDir::new().unwrap();
        let records = vec![
            record(tmp.path(), "FMI_2.0/CoSimulation/linux64/Sim/1/Exp/2/A", Some("passed")),
            record(tmp.path(), "FMI_2.0/CoSimulation/linux64/Sim/1/Exp/2/B", Some("rejected")),
            record(tmp.path(), "FMI_2.0/CoSimulation/linux64/Sim/1/Exp/2/C", None),
        ];
        let sink = CollectingSink::new();
        let mut reporter = Reporter::new(ReportLevel::Minor, Box::new(sink.clone()));
        let table = build_cross_check_table(&records, "acme", &mut reporter).unwrap();

        let statuses: Vec<CrossCheckStatus> = table.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![CrossCheckStatus::Passed, CrossCheckStatus::Rejected, CrossCheckStatus::Failed]
        );
        assert!(table.iter().all(|r| r.vendor_id == "acme"));
        assert_eq!(table[0].platform, FmiPlatform::Linux64);
        assert_eq!(table[1].model, "B");
        assert_eq!(sink.count_at(ReportLevel::Minor), 1);
    }

    #[test]
    fn test_unvalidated_enum_is_invariant_violation() {
        let tmp = TempDir::new().unwrap();
        let records = vec![record(tmp.path(), "FMI_2.0/CoSimulation/amiga/Sim/1/Exp/2/A", Some("passed"))];
        let err = build_cross_check_table(&records, "acme", &mut Reporter::silent()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<XcError>(),
            Some(XcError::InvariantViolation(_))
        ));
    }
}

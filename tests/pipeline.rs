//! Library-level pipeline tests against the JSON-file backend.

use std::fs;
use std::path::{Path, PathBuf};

use fmi_xc::db_file::{load_tables, FileSystemDatabase};
use fmi_xc::process::{run_batch, ProcessOptions, RepoOutcome};
use fmi_xc_core::models::{CrossCheckStatus, FmiPlatform};
use fmi_xc_core::report::{CollectingSink, ReportLevel, Reporter};
use tempfile::TempDir;

const REQUIRED_SUFFIXES: [&str; 6] = [".fmu", "_ref.csv", "_in.csv", "_cc.log", "_cc.csv", "_ref.opt"];

fn vendor_repo(root: &Path, vendor: &str, tool: &str) -> PathBuf {
    let repo = root.join(vendor);
    fs::create_dir_all(&repo).unwrap();
    fs::write(
        repo.join("vendor.ini"),
        format!("vendorId = {v}\ndisplayName = {v}\nrepo = https://example.com/{v}.git\n", v = vendor),
    )
    .unwrap();
    fs::write(
        repo.join(format!("{}.tool", tool)),
        format!("displayName = {}\n[FMI2_0]\nexport = A\nimport = A\n", tool),
    )
    .unwrap();
    repo
}

fn export(repo: &Path, platform: &str, tool: &str, model: &str) {
    let dir = repo
        .join("Test_FMUs/FMI_2.0/ModelExchange")
        .join(platform)
        .join(tool)
        .join("2.0")
        .join(model);
    fs::create_dir_all(&dir).unwrap();
    for suffix in REQUIRED_SUFFIXES {
        fs::write(dir.join(format!("{}{}", model, suffix)), "").unwrap();
    }
    fs::write(dir.join("ReadMe.pdf"), "").unwrap();
    fs::write(dir.join(format!("{}_cc.bat", model)), "").unwrap();
}

fn import(repo: &Path, importer: &str, exporter: &str, model: &str, markers: &[&str]) {
    let dir = repo
        .join("CrossCheck_Results/FMI_2.0/ModelExchange/win64")
        .join(importer)
        .join("1.0")
        .join(exporter)
        .join("2.0")
        .join(model);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("ReadMe.txt"), "").unwrap();
    fs::write(dir.join(format!("{}_out.csv", model)), "").unwrap();
    for marker in markers {
        fs::write(dir.join(marker), "").unwrap();
    }
}

#[tokio::test]
async fn test_second_vendor_leaves_first_untouched() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let acme = vendor_repo(tmp.path(), "acme", "AcmeSim");
    export(&acme, "win64", "AcmeSim", "Pendulum");
    let globex = vendor_repo(tmp.path(), "globex", "GloboSim");
    export(&globex, "linux64", "GloboSim", "Rectifier");

    let mut db = FileSystemDatabase::new(&out);
    run_batch(&mut db, &[acme], &ProcessOptions::default(), &mut Reporter::silent())
        .await
        .unwrap();
    let mut db = FileSystemDatabase::new(&out);
    run_batch(&mut db, &[globex], &ProcessOptions::default(), &mut Reporter::silent())
        .await
        .unwrap();

    let tables = load_tables(&out).unwrap();
    assert_eq!(tables.tools.len(), 2);
    assert_eq!(tables.fmus.len(), 2);
    let acme_fmu = tables.fmus.iter().find(|f| f.vendor_id == "acme").unwrap();
    assert_eq!(acme_fmu.platform, FmiPlatform::Win64);
}

#[tokio::test]
async fn test_reprocessing_replaces_vendor_rows() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let acme = vendor_repo(tmp.path(), "acme", "AcmeSim");
    export(&acme, "win64", "AcmeSim", "Pendulum");
    export(&acme, "win64", "AcmeSim", "Rectifier");

    let mut db = FileSystemDatabase::new(&out);
    run_batch(&mut db, &[acme.clone()], &ProcessOptions::default(), &mut Reporter::silent())
        .await
        .unwrap();
    assert_eq!(load_tables(&out).unwrap().fmus.len(), 2);

    fs::remove_dir_all(acme.join("Test_FMUs/FMI_2.0/ModelExchange/win64/AcmeSim/2.0/Rectifier")).unwrap();
    let mut db = FileSystemDatabase::new(&out);
    run_batch(&mut db, &[acme], &ProcessOptions::default(), &mut Reporter::silent())
        .await
        .unwrap();

    let fmus = load_tables(&out).unwrap().fmus;
    assert_eq!(fmus.len(), 1);
    assert_eq!(fmus[0].name, "Pendulum");
}

#[tokio::test]
async fn test_conflicting_markers_prefer_passed() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let acme = vendor_repo(tmp.path(), "acme", "AcmeSim");
    import(&acme, "AcmeSim", "Dymola", "BouncingBall", &["failed", "passed"]);
    import(&acme, "AcmeSim", "Dymola", "Rectifier", &["rejected", "failed"]);

    let sink = CollectingSink::new();
    let mut reporter = Reporter::new(ReportLevel::Minor, Box::new(sink.clone()));
    let mut db = FileSystemDatabase::new(&out);
    let outcomes = run_batch(&mut db, &[acme], &ProcessOptions::default(), &mut reporter)
        .await
        .unwrap();
    assert!(matches!(&outcomes[0], RepoOutcome::Processed(s) if s.cross_checks == Some(2)));

    let results = load_tables(&out).unwrap().cross_checks;
    let status = |model: &str| results.iter().find(|r| r.model == model).unwrap().status;
    assert_eq!(status("BouncingBall"), CrossCheckStatus::Passed);
    assert_eq!(status("Rectifier"), CrossCheckStatus::Failed);
    assert_eq!(
        sink.lines()
            .iter()
            .filter(|(_, m)| m.starts_with("Conflicting result markers"))
            .count(),
        2
    );
    assert_eq!(reporter.fatal_count(), 0);
}

#[tokio::test]
async fn test_invalid_vendor_file_is_fatal_and_skipped() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let broken = tmp.path().join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("broken.vendor"), "displayName = Broken\n").unwrap();

    let mut reporter = Reporter::silent();
    let mut db = FileSystemDatabase::new(&out);
    let outcomes = run_batch(&mut db, &[broken], &ProcessOptions::default(), &mut reporter)
        .await
        .unwrap();

    assert!(matches!(outcomes[0], RepoOutcome::Failed { .. }));
    assert_eq!(reporter.fatal_count(), 1);
    // Commit still happened: empty tables are on disk.
    assert!(out.join("tools.json").exists());
}

#[tokio::test]
async fn test_damaged_registry_aborts_batch_before_commit() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let globex = vendor_repo(tmp.path(), "globex", "GSim");
    let acme = vendor_repo(tmp.path(), "acme", "GSim");

    let mut db = FileSystemDatabase::new(&out);
    run_batch(&mut db, &[globex], &ProcessOptions::default(), &mut Reporter::silent())
        .await
        .unwrap();

    let tools_path = out.join("tools.json");
    let text = fs::read_to_string(&tools_path).unwrap();
    let truncated = text[..text.len() / 2].to_string();
    fs::write(&tools_path, &truncated).unwrap();

    let mut db = FileSystemDatabase::new(&out);
    let result = run_batch(&mut db, &[acme], &ProcessOptions::default(), &mut Reporter::silent()).await;
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&tools_path).unwrap(), truncated);
}

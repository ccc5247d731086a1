//! Git-backed [`Database`].
//!
//! Workflow:
//! 1. Clone the data repository into a work directory (or fetch and hard
//!    reset an existing clone) and check out the target branch.
//! 2. Configure the commit identity.
//! 3. Delegate all table operations to a [`FileSystemDatabase`] rooted at
//!    `<workdir>/_data`.
//! 4. On `close`, stage everything, and commit and push when anything changed.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::Command;

use fmi_xc_core::models::{CrossCheckTable, FmuTable, ToolsTable};
use fmi_xc_core::store::Database;

use crate::db_file::FileSystemDatabase;

pub const DATA_DIR: &str = "_data";
pub const COMMIT_MESSAGE: &str = "Updates after processing repository";
const USER_NAME: &str = "process_repo script";
const USER_EMAIL: &str = "webmaster@modelica.org";

pub struct GitDatabase {
    repo: String,
    branch: String,
    work_dir: PathBuf,
    inner: FileSystemDatabase,
}

impl GitDatabase {
    /// Without an explicit `work_dir`, clones go to a per-URL cache directory
    /// under the system temp dir.
    pub fn new(work_dir: Option<PathBuf>, repo: &str, branch: &str) -> Self {
        let work_dir = work_dir.unwrap_or_else(|| {
            std::env::temp_dir()
                .join("fmixc-git-cache")
                .join(short_hash(repo))
        });
        let inner = FileSystemDatabase::new(work_dir.join(DATA_DIR));
        Self {
            repo: repo.to_string(),
            branch: branch.to_string(),
            work_dir,
            inner,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn prepare_checkout(&self) -> Result<()> {
        if self.work_dir.join(".git").exists() {
            tracing::info!(dir = %self.work_dir.display(), branch = %self.branch, "updating existing clone");
            git(&self.work_dir, &["fetch", "origin", &self.branch])?;
            let remote_ref = format!("origin/{}", self.branch);
            git(&self.work_dir, &["checkout", "-B", &self.branch, &remote_ref])?;
            git(&self.work_dir, &["reset", "--hard", &remote_ref])?;
        } else {
            tracing::info!(repo = %self.repo, dir = %self.work_dir.display(), "cloning data repository");
            std::fs::create_dir_all(&self.work_dir).with_context(|| {
                format!("Failed to create work directory: {}", self.work_dir.display())
            })?;
            let output = Command::new("git")
                .args(["clone", "--branch", &self.branch, &self.repo])
                .arg(&self.work_dir)
                .output()
                .with_context(|| "Failed to execute 'git clone'. Is git installed?")?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                bail!("git clone failed: {}", stderr.trim());
            }
        }
        git(&self.work_dir, &["config", "user.name", USER_NAME])?;
        git(&self.work_dir, &["config", "user.email", USER_EMAIL])?;
        Ok(())
    }

    fn publish(&self) -> Result<()> {
        git(&self.work_dir, &["add", "."])?;
        let status = git(&self.work_dir, &["status", "--porcelain"])?;
        if status.trim().is_empty() {
            tracing::warn!("No changes, nothing to commit or push");
            return Ok(());
        }

        let message = format!(
            "{}\n\nProcessed at {}",
            COMMIT_MESSAGE,
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        );
        git(&self.work_dir, &["commit", "-m", &message])?;
        git(&self.work_dir, &["push", "origin", &self.branch])?;
        tracing::info!(branch = %self.branch, "pushed updated tables");
        Ok(())
    }
}

/// Run git in `dir`, returning stdout.
fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("Failed to execute 'git {}'", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())[..12].to_string()
}

#[async_trait]
impl Database for GitDatabase {
    async fn open(&mut self) -> Result<()> {
        self.prepare_checkout()?;
        self.inner.open().await
    }

    async fn tools(&self) -> Result<ToolsTable> {
        self.inner.tools().await
    }

    async fn update_tools(&mut self, tools: &ToolsTable, vendor_id: &str) -> Result<()> {
        self.inner.update_tools(tools, vendor_id).await
    }

    async fn update_fmus(&mut self, fmus: &FmuTable, vendor_id: &str) -> Result<()> {
        self.inner.update_fmus(fmus, vendor_id).await
    }

    async fn update_cross_checks(
        &mut self,
        results: &CrossCheckTable,
        vendor_id: &str,
    ) -> Result<()> {
        self.inner.update_cross_checks(results, vendor_id).await
    }

    async fn remove_vendor(&mut self, vendor_id: &str) -> Result<()> {
        self.inner.remove_vendor(vendor_id).await
    }

    async fn remove_tools(&mut self, tool_ids: &[String], except_vendor: &str) -> Result<()> {
        self.inner.remove_tools(tool_ids, except_vendor).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.inner.commit().await
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.close().await?;
        self.publish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmi_xc_core::models::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    /// A bare remote whose `testing` branch has one commit.
    fn seed_remote(tmp: &Path) -> PathBuf {
        let seed = tmp.join("seed");
        std::fs::create_dir_all(&seed).unwrap();
        git(&seed, &["init"]).unwrap();
        git(&seed, &["checkout", "-b", "testing"]).unwrap();
        std::fs::write(seed.join("README.md"), "data\n").unwrap();
        git(&seed, &["add", "."]).unwrap();
        git(
            &seed,
            &["-c", "user.name=t", "-c", "user.email=t@example.com", "commit", "-m", "init"],
        )
        .unwrap();
        let remote = tmp.join("remote.git");
        git(tmp, &["clone", "--bare", "seed", "remote.git"]).unwrap();
        remote
    }

    #[test]
    fn test_default_work_dir_is_keyed_by_url() {
        let a = GitDatabase::new(None, "git@example.com:a.git", "testing");
        let b = GitDatabase::new(None, "git@example.com:b.git", "testing");
        assert_ne!(a.work_dir(), b.work_dir());
        assert_eq!(short_hash("x").len(), 12);
    }

    #[tokio::test]
    async fn test_commits_and_pushes_changes() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let remote = seed_remote(tmp.path());
        let work = tmp.path().join("work");

        let mut db = GitDatabase::new(Some(work.clone()), &remote.to_string_lossy(), "testing");
        db.open().await.unwrap();
        let fmu = FmuDetails {
            name: "Pendulum".to_string(),
            version: FmiVersion::Fmi2,
            variant: FmiVariant::CoSimulation,
            platform: FmiPlatform::Linux64,
            vendor_id: "acme".to_string(),
            export_tool: "AcmeTool".to_string(),
            export_version: "1.2".to_string(),
        };
        db.update_fmus(&vec![fmu], "acme").await.unwrap();
        db.commit().await.unwrap();
        db.close().await.unwrap();

        assert!(work.join(DATA_DIR).join("fmus.json").exists());
        let log = git(&remote, &["log", "--format=%s", "testing"]).unwrap();
        assert!(log.lines().next().unwrap().contains(COMMIT_MESSAGE));

        // Same data again: nothing new to push.
        let mut again = GitDatabase::new(Some(work), &remote.to_string_lossy(), "testing");
        again.open().await.unwrap();
        again.commit().await.unwrap();
        again.close().await.unwrap();
        let log = git(&remote, &["log", "--format=%s", "testing"]).unwrap();
        assert_eq!(log.lines().count(), 2);
    }
}

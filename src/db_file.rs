//! JSON-file [`Database`] backend.
//!
//! The three tables live as `tools.json`, `fmus.json` and `xc_results.json`
//! in one directory. `open` loads whatever is there, updates merge in memory,
//! and `commit` sorts the tables and rewrites all three files.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use fmi_xc_core::merge::Tables;
use fmi_xc_core::models::{CrossCheckTable, FmuTable, ToolsTable};
use fmi_xc_core::store::memory::InMemoryDatabase;
use fmi_xc_core::store::Database;
use fmi_xc_core::XcError;

pub const TOOLS_FILE: &str = "tools.json";
pub const FMUS_FILE: &str = "fmus.json";
pub const XC_FILE: &str = "xc_results.json";

pub struct FileSystemDatabase {
    dir: PathBuf,
    state: InMemoryDatabase,
}

impl FileSystemDatabase {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            state: InMemoryDatabase::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tables(&self) -> &Tables {
        self.state.tables()
    }
}

/// Read one table. A missing file is an empty table; a file that exists but
/// cannot be read or parsed is [`XcError::MalformedInput`], so a damaged
/// registry is never overwritten.
fn load_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(file = %path.display(), "no existing table, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(XcError::malformed(path, format!("unreadable table: {}", e)).into()),
    };
    let rows = serde_json::from_str(&text)
        .map_err(|e| XcError::malformed(path, format!("unparseable table: {}", e)))?;
    Ok(rows)
}

pub fn load_tables(dir: &Path) -> Result<Tables> {
    Ok(Tables {
        tools: load_table(&dir.join(TOOLS_FILE))?,
        fmus: load_table(&dir.join(FMUS_FILE))?,
        cross_checks: load_table(&dir.join(XC_FILE))?,
    })
}

/// Pretty JSON with four-space indentation.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Write the three tables into `dir`, creating it if needed.
pub fn write_tables(dir: &Path, tables: &Tables) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    write_json(&dir.join(TOOLS_FILE), &tables.tools)?;
    write_json(&dir.join(FMUS_FILE), &tables.fmus)?;
    write_json(&dir.join(XC_FILE), &tables.cross_checks)?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, to_json_pretty(value)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(file = %path.display(), "wrote table");
    Ok(())
}

#[async_trait]
impl Database for FileSystemDatabase {
    async fn open(&mut self) -> Result<()> {
        tracing::debug!(dir = %self.dir.display(), "loading existing tables");
        self.state = InMemoryDatabase::with_tables(load_tables(&self.dir)?);
        self.state.open().await
    }

    async fn tools(&self) -> Result<ToolsTable> {
        self.state.tools().await
    }

    async fn update_tools(&mut self, tools: &ToolsTable, vendor_id: &str) -> Result<()> {
        tracing::debug!(vendor = vendor_id, count = tools.len(), "updating tools");
        self.state.update_tools(tools, vendor_id).await
    }

    async fn update_fmus(&mut self, fmus: &FmuTable, vendor_id: &str) -> Result<()> {
        tracing::debug!(vendor = vendor_id, count = fmus.len(), "updating FMUs");
        self.state.update_fmus(fmus, vendor_id).await
    }

    async fn update_cross_checks(
        &mut self,
        results: &CrossCheckTable,
        vendor_id: &str,
    ) -> Result<()> {
        tracing::debug!(vendor = vendor_id, count = results.len(), "updating cross-check results");
        self.state.update_cross_checks(results, vendor_id).await
    }

    async fn remove_vendor(&mut self, vendor_id: &str) -> Result<()> {
        self.state.remove_vendor(vendor_id).await
    }

    async fn remove_tools(&mut self, tool_ids: &[String], except_vendor: &str) -> Result<()> {
        self.state.remove_tools(tool_ids, except_vendor).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.state.commit().await?;
        write_tables(&self.dir, self.state.tables())?;
        tracing::info!(dir = %self.dir.display(), "tables written");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.state.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmi_xc_core::models::*;
    use tempfile::TempDir;

    fn fmu(vendor: &str, name: &str) -> FmuDetails {
        FmuDetails {
            name: name.to_string(),
            version: FmiVersion::Fmi2,
            variant: FmiVariant::ModelExchange,
            platform: FmiPlatform::Win64,
            vendor_id: vendor.to_string(),
            export_tool: "Tool".to_string(),
            export_version: "1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_files_start_empty() {
        let tmp = TempDir::new().unwrap();
        let mut db = FileSystemDatabase::new(tmp.path().join("absent"));
        db.open().await.unwrap();
        assert_eq!(db.tables(), &Tables::default());
    }

    #[tokio::test]
    async fn test_commit_writes_sorted_indented_json() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("out");
        let mut db = FileSystemDatabase::new(&dir);
        db.open().await.unwrap();
        db.update_fmus(&vec![fmu("acme", "Zed"), fmu("acme", "Alpha")], "acme")
            .await
            .unwrap();
        db.commit().await.unwrap();
        db.close().await.unwrap();

        let text = std::fs::read_to_string(dir.join(FMUS_FILE)).unwrap();
        assert!(text.starts_with("[\n    {\n        \"name\": \"Alpha\""));
        assert_eq!(std::fs::read_to_string(dir.join(TOOLS_FILE)).unwrap(), "[]");
        assert!(dir.join(XC_FILE).exists());
    }

    #[tokio::test]
    async fn test_reopen_merges_with_persisted_rows() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();

        let mut first = FileSystemDatabase::new(&dir);
        first.open().await.unwrap();
        first.update_fmus(&vec![fmu("acme", "A")], "acme").await.unwrap();
        first.update_fmus(&vec![fmu("globex", "G")], "globex").await.unwrap();
        first.commit().await.unwrap();

        let mut second = FileSystemDatabase::new(&dir);
        second.open().await.unwrap();
        second.update_fmus(&vec![fmu("acme", "B")], "acme").await.unwrap();
        second.commit().await.unwrap();

        let reloaded = load_tables(&dir).unwrap();
        let names: Vec<&str> = reloaded.fmus.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["B", "G"]);
    }

    #[tokio::test]
    async fn test_truncated_table_fails_open_and_is_kept() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();

        let mut first = FileSystemDatabase::new(&dir);
        first.open().await.unwrap();
        first.update_fmus(&vec![fmu("globex", "G")], "globex").await.unwrap();
        first.commit().await.unwrap();

        let path = dir.join(FMUS_FILE);
        let text = std::fs::read_to_string(&path).unwrap();
        let truncated = &text[..text.len() / 2];
        std::fs::write(&path, truncated).unwrap();

        let mut second = FileSystemDatabase::new(&dir);
        let err = second.open().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<XcError>(),
            Some(XcError::MalformedInput { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), truncated);
    }
}

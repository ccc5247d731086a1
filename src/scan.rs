//! Directory traversal into path-component tuples.
//!
//! Every directory below a root becomes a [`DirectoryEntry`] carrying its
//! absolute path, its path relative to the root, and the relative path split
//! into components. Files are ignored at this stage; the export and import
//! parsers decide what a directory means from the component count alone.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Version-control metadata never holds FMUs or results.
const DEFAULT_EXCLUDES: &[&str] = &["**/.git", "**/.git/**", "**/.svn", "**/.svn/**"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Absolute (or root-joined) path of the directory.
    pub dir: PathBuf,
    /// Path relative to the scanned root.
    pub rel: PathBuf,
    /// `rel` split into its components.
    pub parts: Vec<String>,
}

/// List every directory below `root`, excluding `root` itself.
///
/// A missing root yields an empty list. Any traversal error (for example a
/// permission problem part-way down) fails the whole scan.
pub fn list_directories(root: &Path) -> Result<Vec<DirectoryEntry>> {
    if !root.exists() {
        tracing::debug!(root = %root.display(), "scan root missing, nothing to list");
        return Ok(Vec::new());
    }

    let patterns: Vec<String> = DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect();
    let exclude_set = build_globset(&patterns)?;

    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            !exclude_set.is_match(relative)
        });

    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to traverse directory tree {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let parts = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        entries.push(DirectoryEntry {
            dir: path.to_path_buf(),
            rel: relative.to_path_buf(),
            parts,
        });
    }

    tracing::debug!(root = %root.display(), count = entries.len(), "listed directories");
    Ok(entries)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Memoized traversals for one processing run.
///
/// Owned by whoever drives the run and dropped with it, so listings are
/// never reused across runs.
#[derive(Debug, Default)]
pub struct DirectoryCache {
    listings: HashMap<PathBuf, Vec<DirectoryEntry>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing for `root`, traversing on first use.
    pub fn entries(&mut self, root: &Path) -> Result<&[DirectoryEntry]> {
        if !self.listings.contains_key(root) {
            let listing = list_directories(root)?;
            self.listings.insert(root.to_path_buf(), listing);
        }
        Ok(self
            .listings
            .get(root)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    pub fn invalidate(&mut self, root: &Path) {
        self.listings.remove(root);
    }

    pub fn clear(&mut self) {
        self.listings.clear();
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lists_nested_directories_only() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("a/b/c")).unwrap();
        std::fs::create_dir_all(root.join("d")).unwrap();
        std::fs::write(root.join("a/file.txt"), "x").unwrap();

        let entries = list_directories(root).unwrap();
        let rels: Vec<Vec<String>> = entries.iter().map(|e| e.parts.clone()).collect();
        assert_eq!(
            rels,
            vec![
                vec!["a".to_string()],
                vec!["a".to_string(), "b".to_string()],
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["d".to_string()],
            ]
        );
        assert_eq!(entries[2].dir, root.join("a/b/c"));
        assert_eq!(entries[2].rel, PathBuf::from("a/b/c"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let entries = list_directories(&tmp.path().join("nope")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_skips_vcs_directories() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git/objects/ab")).unwrap();
        std::fs::create_dir_all(tmp.path().join("keep")).unwrap();
        let entries = list_directories(tmp.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].parts, vec!["keep".to_string()]);
    }

    #[test]
    fn test_cache_memoizes_until_invalidated() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("one")).unwrap();
        let mut cache = DirectoryCache::new();
        assert_eq!(cache.entries(tmp.path()).unwrap().len(), 1);

        std::fs::create_dir_all(tmp.path().join("two")).unwrap();
        assert_eq!(cache.entries(tmp.path()).unwrap().len(), 1);

        cache.invalidate(tmp.path());
        assert_eq!(cache.entries(tmp.path()).unwrap().len(), 2);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}

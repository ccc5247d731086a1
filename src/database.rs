//! Backend selection.

use anyhow::{bail, Result};
use std::path::PathBuf;

use fmi_xc_core::store::Database;

use crate::db_dryrun::DryRunDatabase;
use crate::db_file::FileSystemDatabase;
use crate::db_git::GitDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DatabaseKind {
    /// JSON files in the output directory.
    File,
    /// A clone of the data repository, committed and pushed on close.
    Git,
    /// Persist nothing.
    Dryrun,
}

impl DatabaseKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(Self::File),
            "git" => Ok(Self::Git),
            "dryrun" => Ok(Self::Dryrun),
            other => bail!("Unknown database kind: '{}'", other),
        }
    }
}

pub fn create_database(
    kind: DatabaseKind,
    output: Option<PathBuf>,
    repo: &str,
    branch: &str,
) -> Box<dyn Database> {
    match kind {
        DatabaseKind::File => match output {
            Some(dir) => Box::new(FileSystemDatabase::new(dir)),
            None => {
                tracing::warn!("file database requested without an output directory; running dry");
                Box::new(DryRunDatabase)
            }
        },
        DatabaseKind::Git => Box::new(GitDatabase::new(output, repo, branch)),
        DatabaseKind::Dryrun => Box::new(DryRunDatabase),
    }
}

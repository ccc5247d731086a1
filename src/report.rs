//! Where surfaced findings are written.
//!
//! The [`Reporter`](fmi_xc_core::report::Reporter) decides *whether* a
//! finding is shown; the sinks here decide *where*. Findings go to stderr
//! (`WARNING: ...` / `ERROR: ...`) or, with `--logfile`, to a log file that
//! is truncated when the run starts. Every finding is also traced at debug
//! level under the `fmixc::finding` target.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fmi_xc_core::report::{ReportLevel, ReportSink, Reporter};

fn prefix(level: ReportLevel) -> &'static str {
    match level {
        ReportLevel::Fatal => "ERROR",
        ReportLevel::Major | ReportLevel::Minor => "WARNING",
    }
}

fn trace_finding(level: ReportLevel, message: &str) {
    tracing::debug!(target: "fmixc::finding", %level, "{}", message);
}

/// Human-readable findings on stderr.
pub struct StderrSink;

impl ReportSink for StderrSink {
    fn emit(&self, level: ReportLevel, message: &str) {
        trace_finding(level, message);
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}: {}", prefix(level), message);
        let _ = err.flush();
    }
}

/// Findings appended to a log file, one per line.
pub struct LogFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogFileSink {
    /// Create (or truncate) the log file.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for LogFileSink {
    fn emit(&self, level: ReportLevel, message: &str) {
        trace_finding(level, message);
        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(file, "{}: {}", prefix(level), message);
    }
}

/// How findings are surfaced for a CLI run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReportMode {
    Stderr,
    LogFile(PathBuf),
}

impl ReportMode {
    pub fn from_logfile(logfile: Option<PathBuf>) -> Self {
        match logfile {
            Some(path) if !path.as_os_str().is_empty() => ReportMode::LogFile(path),
            _ => ReportMode::Stderr,
        }
    }

    /// `pedantic` lowers the visible threshold from `Major` to `Minor`.
    pub fn reporter(&self, pedantic: bool) -> Result<Reporter> {
        let min = if pedantic {
            ReportLevel::Minor
        } else {
            ReportLevel::Major
        };
        let sink: Box<dyn ReportSink> = match self {
            ReportMode::Stderr => Box::new(StderrSink),
            ReportMode::LogFile(path) => Box::new(LogFileSink::create(path)?),
        };
        Ok(Reporter::new(min, sink))
    }
}

//! Leveled, de-duplicating reporting of data-quality findings.
//!
//! Every component that inspects a vendor repository reports soft problems
//! (missing optional files, unknown enum strings, absent result markers)
//! through a single [`Reporter`]. The reporter:
//!
//! - surfaces each distinct message at most once per instance,
//! - hides messages below its minimum level from the sink,
//! - accumulates `Fatal` messages per vendor context for the end-of-run
//!   summary and the process exit code.
//!
//! Where messages end up is decided by a [`ReportSink`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Severity of a finding. Ordered `Minor < Major < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportLevel {
    Minor,
    Major,
    Fatal,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLevel::Minor => write!(f, "minor"),
            ReportLevel::Major => write!(f, "major"),
            ReportLevel::Fatal => write!(f, "fatal"),
        }
    }
}

/// A single finding produced by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub level: ReportLevel,
}

impl Finding {
    pub fn new(message: impl Into<String>, level: ReportLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn minor(message: impl Into<String>) -> Self {
        Self::new(message, ReportLevel::Minor)
    }

    pub fn major(message: impl Into<String>) -> Self {
        Self::new(message, ReportLevel::Major)
    }

    /// True when this finding excludes its record from the validated set.
    pub fn is_blocking(&self) -> bool {
        self.level >= ReportLevel::Major
    }
}

/// Destination for surfaced findings.
pub trait ReportSink: Send + Sync {
    /// Emit a finding that passed the reporter's level filter.
    fn emit(&self, level: ReportLevel, message: &str);
}

/// Discards everything.
pub struct NullSink;

impl ReportSink for NullSink {
    fn emit(&self, _level: ReportLevel, _message: &str) {}
}

/// Keeps surfaced findings in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct CollectingSink {
    lines: Arc<Mutex<Vec<(ReportLevel, String)>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn lines(&self) -> Vec<(ReportLevel, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count_at(&self, level: ReportLevel) -> usize {
        self.lines().iter().filter(|(l, _)| *l == level).count()
    }
}

impl ReportSink for CollectingSink {
    fn emit(&self, level: ReportLevel, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message.to_string()));
    }
}

/// The de-duplicating reporter shared by one processing run.
pub struct Reporter {
    min: ReportLevel,
    sink: Box<dyn ReportSink>,
    reported: HashSet<String>,
    errors: BTreeMap<String, Vec<String>>,
    context: String,
}

impl Reporter {
    pub fn new(min: ReportLevel, sink: Box<dyn ReportSink>) -> Self {
        Self {
            min,
            sink,
            reported: HashSet::new(),
            errors: BTreeMap::new(),
            context: String::new(),
        }
    }

    /// A reporter whose sink discards everything (fatal counts still accumulate).
    pub fn silent() -> Self {
        Self::new(ReportLevel::Fatal, Box::new(NullSink))
    }

    pub fn min_level(&self) -> ReportLevel {
        self.min
    }

    /// Switch the vendor context used to key fatal messages.
    pub fn set_context(&mut self, vendor: impl Into<String>) {
        self.context = vendor.into();
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn report(&mut self, message: impl Into<String>, level: ReportLevel) {
        let message = message.into();
        if !self.reported.insert(message.clone()) {
            return;
        }
        if level >= self.min {
            self.sink.emit(level, &message);
        }
        if level >= ReportLevel::Fatal {
            self.errors
                .entry(self.context.clone())
                .or_default()
                .push(message);
        }
    }

    pub fn report_finding(&mut self, finding: Finding) {
        self.report(finding.message, finding.level);
    }

    /// Fatal messages grouped by vendor context.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn fatal_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Write the end-of-run summary and return the number of fatal messages.
    pub fn summarize(&self, out: &mut impl Write) -> std::io::Result<usize> {
        let mut count = 0;
        for (vendor, messages) in &self.errors {
            if messages.is_empty() {
                continue;
            }
            writeln!(out, "Errors for vendor: {}", vendor)?;
            for message in messages {
                writeln!(out, "  {}", message)?;
                count += 1;
            }
        }
        if count == 0 {
            writeln!(out, "Processing completed without any errors")?;
        }
        Ok(count)
    }
}

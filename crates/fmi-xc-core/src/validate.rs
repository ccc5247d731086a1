//! Validation gating.
//!
//! A [`Validator`] inspects one record and returns its findings. The gate
//! forwards every finding to the [`Reporter`] and keeps only the records
//! without a `Major`-or-worse finding.

use crate::report::{Finding, Reporter};

pub trait Validator<T> {
    fn validate(&self, record: &T) -> Vec<Finding>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Vec<Finding>,
{
    fn validate(&self, record: &T) -> Vec<Finding> {
        self(record)
    }
}

/// Validate every record, returning the retained ones in their original order.
pub fn validate_all<T, V>(records: Vec<T>, validator: &V, reporter: &mut Reporter) -> Vec<T>
where
    V: Validator<T> + ?Sized,
{
    let mut retained = Vec::with_capacity(records.len());
    for record in records {
        let findings = validator.validate(&record);
        let blocking = findings.iter().any(Finding::is_blocking);
        for finding in findings {
            reporter.report_finding(finding);
        }
        if !blocking {
            retained.push(record);
        }
    }
    retained
}

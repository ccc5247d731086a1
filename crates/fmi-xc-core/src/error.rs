//! Typed failures that callers need to tell apart.
//!
//! Application code works in `anyhow::Result`; these variants are raised
//! where the category matters (e.g. a vendor run aborting on an ownership
//! conflict) and recovered with `downcast_ref` at the top level.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XcError {
    /// A descriptor file or directory tree that cannot be interpreted at all.
    #[error("malformed input in {path}: {reason}")]
    MalformedInput { path: PathBuf, reason: String },

    /// A tool id already owned by another vendor in the persisted registry.
    #[error("this repo (owned by {claimant}) defines tool '{tool}' which was already owned by {owner}")]
    OwnershipConflict {
        tool: String,
        owner: String,
        claimant: String,
    },

    /// A batch of rows submitted for one vendor contains a row owned by another.
    #[error("found entity owned by {found} while updating entities for vendor {expected}")]
    VendorMismatch { expected: String, found: String },

    /// A value that passed validation failed to parse later on.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl XcError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

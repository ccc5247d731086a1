//! Vendor descriptor loading.
//!
//! Each vendor repository carries exactly one `*.vendor` INI file (older
//! repositories use `vendor.ini`) naming the vendor that owns everything in
//! the directory.

use anyhow::Result;
use std::path::Path;

use fmi_xc_core::models::VendorDetails;
use fmi_xc_core::XcError;

use crate::ini;
use crate::tools::find_files_with_suffix;

pub const VENDOR_SUFFIX: &str = ".vendor";
pub const LEGACY_VENDOR_FILE: &str = "vendor.ini";

pub fn load_vendor_data(dir: &Path) -> Result<VendorDetails> {
    let mut files = find_files_with_suffix(dir, VENDOR_SUFFIX)?;
    if files.is_empty() && dir.join(LEGACY_VENDOR_FILE).is_file() {
        files.push(LEGACY_VENDOR_FILE.to_string());
    }
    let file = match files.as_slice() {
        [] => {
            return Err(XcError::malformed(dir, "no .vendor file found").into());
        }
        [only] => dir.join(only),
        many => {
            return Err(XcError::malformed(
                dir,
                format!("multiple .vendor files found: {}", many.join(", ")),
            )
            .into());
        }
    };

    let text = std::fs::read_to_string(&file)
        .map_err(|e| XcError::malformed(&file, format!("unreadable: {}", e)))?;
    let doc = ini::parse(&text);
    let props = &doc.root;
    let required = |key: &str| -> Result<String> {
        props
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| XcError::malformed(&file, format!("no property '{}' found", key)).into())
    };
    let optional = |key: &str| props.get(key).filter(|v| !v.is_empty()).cloned();

    let vendor = VendorDetails {
        vendor_id: required("vendorId")?,
        display_name: required("displayName")?,
        href: optional("href"),
        email: optional("email"),
        repo: required("repo")?,
    };
    tracing::debug!(vendor = %vendor.vendor_id, file = %file.display(), "loaded vendor descriptor");
    Ok(vendor)
}

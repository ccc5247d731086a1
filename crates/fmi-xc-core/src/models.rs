//! Core data models used throughout the processor.
//!
//! These types represent the tools, exported FMUs, and cross-check results
//! that flow from a vendor repository into the three published tables. The
//! JSON field names match the published `tools.json`, `fmus.json` and
//! `xc_results.json` files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Closed enumerations
// ═══════════════════════════════════════════════════════════════════════

/// FMI standard version, as encoded in the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FmiVersion {
    #[serde(rename = "FMI_1.0")]
    Fmi1,
    #[serde(rename = "FMI_2.0")]
    Fmi2,
}

impl FmiVersion {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FMI_1.0" => Some(Self::Fmi1),
            "FMI_2.0" => Some(Self::Fmi2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fmi1 => "FMI_1.0",
            Self::Fmi2 => "FMI_2.0",
        }
    }
}

/// FMI execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FmiVariant {
    CoSimulation,
    ModelExchange,
}

impl FmiVariant {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CoSimulation" => Some(Self::CoSimulation),
            "ModelExchange" => Some(Self::ModelExchange),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoSimulation => "CoSimulation",
            Self::ModelExchange => "ModelExchange",
        }
    }
}

/// Target platform of an exported FMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FmiPlatform {
    #[serde(rename = "c-code")]
    CCode,
    #[serde(rename = "win32")]
    Win32,
    #[serde(rename = "win64")]
    Win64,
    #[serde(rename = "linux32")]
    Linux32,
    #[serde(rename = "linux64")]
    Linux64,
}

impl FmiPlatform {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "c-code" => Some(Self::CCode),
            "win32" => Some(Self::Win32),
            "win64" => Some(Self::Win64),
            "linux32" => Some(Self::Linux32),
            "linux64" => Some(Self::Linux64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CCode => "c-code",
            Self::Win32 => "win32",
            Self::Win64 => "win64",
            Self::Linux32 => "linux32",
            Self::Linux64 => "linux64",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(FmiVersion, FmiVariant, FmiPlatform, CrossCheckStatus);

/// Error returned when a path token is outside its closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown FMI {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownToken {}

macro_rules! from_str_via_parse {
    ($($ty:ty => $kind:literal),*) => {
        $(impl FromStr for $ty {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::parse(s).ok_or_else(|| UnknownToken {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        })*
    };
}

from_str_via_parse!(FmiVersion => "version", FmiVariant => "variant", FmiPlatform => "platform");

pub fn parse_version(s: &str) -> Option<FmiVersion> {
    FmiVersion::parse(s)
}

pub fn parse_variant(s: &str) -> Option<FmiVariant> {
    FmiVariant::parse(s)
}

pub fn parse_platform(s: &str) -> Option<FmiPlatform> {
    FmiPlatform::parse(s)
}

// ═══════════════════════════════════════════════════════════════════════
// Tools and vendors
// ═══════════════════════════════════════════════════════════════════════

/// Support level of one FMI capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unsupported,
    Planned,
    Available,
}

impl Status {
    /// Maps a descriptor code (`A`, `P`, or empty). Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::Available),
            "P" => Some(Self::Planned),
            "" => Some(Self::Unsupported),
            _ => None,
        }
    }
}

/// Capability flags for one FMI version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantStatus {
    pub import: Status,
    pub export: Status,
    pub slave: Status,
    pub master: Status,
}

/// Owner of a batch of tool, FMU, and cross-check data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDetails {
    pub vendor_id: String,
    pub display_name: String,
    pub href: Option<String>,
    pub email: Option<String>,
    pub repo: String,
}

/// A tool descriptor as published in `tools.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSummary {
    pub id: String,
    pub display_name: String,
    pub homepage: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub note: String,
    pub fmi1: VariantStatus,
    pub fmi2: VariantStatus,
    pub vendor: VendorDetails,
}

// ═══════════════════════════════════════════════════════════════════════
// FMUs and cross-check results
// ═══════════════════════════════════════════════════════════════════════

/// One exported FMU, as published in `fmus.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FmuDetails {
    pub name: String,
    pub version: FmiVersion,
    pub variant: FmiVariant,
    pub platform: FmiPlatform,
    #[serde(rename = "vendorId")]
    pub vendor_id: String,
    pub export_tool: String,
    pub export_version: String,
}

/// Outcome of one tool importing one exported FMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossCheckStatus {
    Passed,
    Failed,
    Rejected,
}

impl CrossCheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }
}

/// One row of `xc_results.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossCheckResult {
    pub version: FmiVersion,
    pub variant: FmiVariant,
    pub platform: FmiPlatform,
    #[serde(rename = "vendorId")]
    pub vendor_id: String,
    pub import_tool: String,
    pub import_version: String,
    pub export_tool: String,
    pub export_version: String,
    pub model: String,
    pub status: CrossCheckStatus,
}

/// A tool and the version of it that took part in a cross-check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolDetails {
    pub tool: String,
    pub version: String,
}

/// Cross-check results grouped by importer/exporter pair.
///
/// Derived from [`CrossCheckResult`] rows by [`crate::summary::group_results`];
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossCheckSummary {
    pub version: FmiVersion,
    pub variant: FmiVariant,
    pub platform: FmiPlatform,
    pub importer: ToolDetails,
    pub exporter: ToolDetails,
    pub passed: Vec<String>,
    pub failed: Vec<String>,
    pub rejected: Vec<String>,
}

pub type ToolsTable = Vec<ToolSummary>;
pub type FmuTable = Vec<FmuDetails>;
pub type CrossCheckTable = Vec<CrossCheckResult>;

/// Rows that belong to exactly one vendor.
pub trait VendorOwned {
    fn vendor_id(&self) -> &str;
}

impl VendorOwned for ToolSummary {
    fn vendor_id(&self) -> &str {
        &self.vendor.vendor_id
    }
}

impl VendorOwned for FmuDetails {
    fn vendor_id(&self) -> &str {
        &self.vendor_id
    }
}

impl VendorOwned for CrossCheckResult {
    fn vendor_id(&self) -> &str {
        &self.vendor_id
    }
}

//! Core data types for the well schematic orchestration
//!
//! - [`WellRecord`]: validated input, serialized once into the staging file
//! - [`OutputFormat`]: how the primary image is handed back to the caller
//! - [`RunResult`]: the structured outcome of one orchestration call

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

// ============================================================================
// Input
// ============================================================================

/// Well geometry class understood by the plotting tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WellType {
    #[serde(rename = "straight well")]
    Straight,
    #[serde(rename = "horizontal well")]
    Horizontal,
}

impl WellType {
    /// Wire value, as written into the staging file.
    pub const fn as_str(self) -> &'static str {
        match self {
            WellType::Straight => "straight well",
            WellType::Horizontal => "horizontal well",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "straight well" => Some(WellType::Straight),
            "horizontal well" => Some(WellType::Horizontal),
            _ => None,
        }
    }
}

impl fmt::Display for WellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One well description as received from the caller.
///
/// The three structured payloads are opaque here; their shape is the
/// plotting tool's concern. Unrecognized top-level keys are carried through
/// to the staging file untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellRecord {
    #[serde(rename = "wellName")]
    pub well_name: String,

    /// Kept as the caller's literal; `3500` is staged as `3500`, not `3500.0`.
    #[serde(rename = "totalDepth_m")]
    pub total_depth_m: Number,

    #[serde(rename = "wellType")]
    pub well_type: WellType,

    pub stratigraphy: Value,

    #[serde(rename = "drillingFluidAndPressure")]
    pub drilling_fluid_and_pressure: Value,

    #[serde(rename = "wellboreStructure")]
    pub wellbore_structure: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Presentation switch for the primary image in a success payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Absolute path plus the image bytes as base64
    #[default]
    Base64,
    /// Absolute path only
    Path,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base64" => Ok(OutputFormat::Base64),
            "path" => Ok(OutputFormat::Path),
            other => Err(format!("unknown output format '{other}' (expected base64 or path)")),
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Stable machine-readable error codes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    FileUpdateError,
    GeneratorError,
    FolderCreationError,
    FileArchiveError,
    FolderPathError,
    UnknownError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::FileUpdateError => "FILE_UPDATE_ERROR",
            ErrorCode::GeneratorError => "GENERATOR_ERROR",
            ErrorCode::FolderCreationError => "FOLDER_CREATION_ERROR",
            ErrorCode::FileArchiveError => "FILE_ARCHIVE_ERROR",
            ErrorCode::FolderPathError => "FOLDER_PATH_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Human-readable headline for a failure with this code.
    pub const fn summary(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Well data validation failed",
            ErrorCode::FileUpdateError => "Failed to update the well data file",
            ErrorCode::GeneratorError => "Well structure generator failed",
            ErrorCode::FolderCreationError => "Failed to create the archive folder",
            ErrorCode::FileArchiveError => "Failed to archive the generated files",
            ErrorCode::FolderPathError => "Failed to resolve the archive folder path",
            ErrorCode::UnknownError => "Unknown error while generating the well schematic",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the generator contract was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorFailureKind {
    MissingBinary,
    Spawn,
    Timeout,
    NonzeroExit,
    MissingOutput,
    NotSettled,
}

/// Input echo included in a success payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellSummary {
    pub well_name: String,
    pub well_type: WellType,
    pub total_depth: Number,
}

impl From<&WellRecord> for WellSummary {
    fn from(record: &WellRecord) -> Self {
        Self {
            well_name: record.well_name.clone(),
            well_type: record.well_type,
            total_depth: record.total_depth_m.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSuccess {
    pub success: bool,
    /// Fixed presentation instruction for the downstream consumer
    pub response: String,
    pub well_info: WellSummary,
    /// Archive folder name, relative to the workspace
    pub archive_folder: String,
    /// Absolute path of the primary image inside the archive
    pub image_path: String,
    /// Ready-made markdown image reference
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    pub success: bool,
    pub error: String,
    pub error_code: ErrorCode,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<GeneratorFailureKind>,
}

/// Outcome of one orchestration call. Serializes flat, discriminated by `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunResult {
    Success(RunSuccess),
    Failure(RunFailure),
}

impl RunResult {
    pub const fn is_success(&self) -> bool {
        matches!(self, RunResult::Success(_))
    }

    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            RunResult::Success(_) => None,
            RunResult::Failure(f) => Some(f.error_code),
        }
    }
}

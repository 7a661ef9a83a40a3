//! Failure taxonomy for one orchestration run

use crate::types::{ErrorCode, GeneratorFailureKind};
use std::path::PathBuf;
use thiserror::Error;

/// Every way a run can stop. Each variant maps onto one stable [`ErrorCode`].
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing required fields or malformed data: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("cannot write {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("generator not found at {}", .0.display())]
    GeneratorMissing(PathBuf),

    #[error("failed to run generator: {0}")]
    GeneratorSpawn(#[source] std::io::Error),

    #[error("generator exceeded its {secs}s budget and was killed")]
    GeneratorTimeout { secs: u64 },

    #[error("generator exited with status {}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    GeneratorFailed { code: Option<i32> },

    #[error("generator exited cleanly but {} was not produced", .0.display())]
    OutputMissing(PathBuf),

    #[error("generator outputs still changing after {waited_ms}ms")]
    OutputNotSettled { waited_ms: u64 },

    #[error("cannot create archive folder {}: {source}", path.display())]
    FolderCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot move {file} into the archive: {source}")]
    Archive {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot resolve archive folder {}: {source}", path.display())]
    FolderPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Unknown(String),
}

impl PipelineError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            PipelineError::Validation(_) => ErrorCode::ValidationError,
            PipelineError::Staging { .. } => ErrorCode::FileUpdateError,
            PipelineError::GeneratorMissing(_)
            | PipelineError::GeneratorSpawn(_)
            | PipelineError::GeneratorTimeout { .. }
            | PipelineError::GeneratorFailed { .. }
            | PipelineError::OutputMissing(_)
            | PipelineError::OutputNotSettled { .. } => ErrorCode::GeneratorError,
            PipelineError::FolderCreation { .. } => ErrorCode::FolderCreationError,
            PipelineError::Archive { .. } => ErrorCode::FileArchiveError,
            PipelineError::FolderPath { .. } => ErrorCode::FolderPathError,
            PipelineError::Unknown(_) => ErrorCode::UnknownError,
        }
    }

    /// Finer classification for generator failures; `None` for other stages.
    pub const fn generator_kind(&self) -> Option<GeneratorFailureKind> {
        match self {
            PipelineError::GeneratorMissing(_) => Some(GeneratorFailureKind::MissingBinary),
            PipelineError::GeneratorSpawn(_) => Some(GeneratorFailureKind::Spawn),
            PipelineError::GeneratorTimeout { .. } => Some(GeneratorFailureKind::Timeout),
            PipelineError::GeneratorFailed { .. } => Some(GeneratorFailureKind::NonzeroExit),
            PipelineError::OutputMissing(_) => Some(GeneratorFailureKind::MissingOutput),
            PipelineError::OutputNotSettled { .. } => Some(GeneratorFailureKind::NotSettled),
            _ => None,
        }
    }
}

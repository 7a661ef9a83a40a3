//! Well Schematic: orchestration around an external well structure plotter
//!
//! Takes a well description, stages it for an opaque plotting executable,
//! supervises the run, and archives the produced image, report and tables
//! into a per-run folder.
//!
//! ## Architecture
//!
//! - **Config**: TOML deployment config, threaded explicitly through every stage
//! - **Pipeline**: validation → staging → supervisor → settle → archive → assembler → cleanup
//! - **API**: Axum HTTP surface for generation and archive retrieval

pub mod api;
pub mod config;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::OrchestratorConfig;

// Re-export pipeline entry points
pub use pipeline::{Orchestrator, PipelineError};

// Re-export commonly used types
pub use types::{
    ErrorCode, GeneratorFailureKind, OutputFormat, RunFailure, RunResult, RunSuccess,
    WellRecord, WellSummary, WellType,
};

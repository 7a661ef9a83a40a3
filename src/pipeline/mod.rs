//! Well schematic pipeline
//!
//! One call runs the stages in order and stops at the first broken contract:
//!
//! ```text
//! validation → staging → supervisor → settle → archive → assembler → cleanup
//! ```
//!
//! Every stage receives the [`OrchestratorConfig`] explicitly; nothing reads
//! the process working directory. Runs against the same workspace share
//! fixed file names and must not overlap; callers serialize them.

pub mod archive;
pub mod assembler;
pub mod cleanup;
mod error;
pub mod settle;
pub mod staging;
pub mod supervisor;
pub mod validation;

pub use archive::{ArchiveFolder, RetrievalError};
pub use error::PipelineError;

use crate::config::OrchestratorConfig;
use crate::types::{OutputFormat, RunFailure, RunResult, RunSuccess};
use chrono::Local;
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};

/// Sequences the pipeline stages for one workspace.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run the whole pipeline and fold the outcome into a [`RunResult`].
    ///
    /// Never returns an error: every exit path is a structured outcome. The
    /// run executes on its own task, so dropping the returned future does not
    /// cancel it; the generator timeout is the only way a started run ends early.
    pub async fn generate(&self, well_data: &Value, format: OutputFormat) -> RunResult {
        let orchestrator = self.clone();
        let well_data = well_data.clone();
        let run = tokio::spawn(async move { orchestrator.execute(&well_data, format).await });
        let outcome = run
            .await
            .unwrap_or_else(|e| Err(PipelineError::Unknown(format!("run task failed: {e}"))));

        match outcome {
            Ok(success) => RunResult::Success(success),
            Err(e) => {
                warn!(error_code = %e.code(), error = %e, "Well schematic run failed");
                failure_result(&e)
            }
        }
    }

    /// Run the whole pipeline, surfacing the typed failure.
    pub async fn execute(
        &self,
        well_data: &Value,
        format: OutputFormat,
    ) -> Result<RunSuccess, PipelineError> {
        let started_at = Local::now();
        let started = Instant::now();

        let record = validation::validate_well_data(well_data)?;
        info!(
            well = %record.well_name,
            well_type = %record.well_type,
            total_depth_m = %record.total_depth_m,
            workspace = %self.config.workspace_dir().display(),
            "Generating well structure schematic"
        );

        staging::stage_well_data(&self.config, &record)?;
        supervisor::run_generator(&self.config).await?;
        settle::wait_for_stable_outputs(&self.config).await?;

        let folder = archive::archive_outputs(&self.config, &started_at)?;
        let success = assembler::assemble_success(&self.config, &record, &folder, format)?;

        cleanup::cleanup_transient_files(&self.config);

        info!(
            well = %record.well_name,
            folder = %folder.name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Well schematic run complete"
        );
        Ok(success)
    }
}

/// Caller-facing failure payload for a pipeline error.
pub fn failure_result(err: &PipelineError) -> RunResult {
    let code = err.code();
    RunResult::Failure(RunFailure {
        success: false,
        error: code.summary().to_string(),
        error_code: code,
        details: err.to_string(),
        failure_kind: err.generator_kind(),
    })
}

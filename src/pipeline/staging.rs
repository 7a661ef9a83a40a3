//! Input staging: hand the validated record to the plotting tool.
//!
//! The tool reads one fixed-name file from the workspace. A previous copy is
//! kept in a single backup slot before it is overwritten; the slot holds at
//! most one generation and is cleared again by cleanup after a successful run.

use super::PipelineError;
use crate::config::OrchestratorConfig;
use crate::types::WellRecord;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Back up any existing input file, then write `record` as indented UTF-8 JSON.
///
/// Non-ASCII text is written verbatim. No partial-write recovery is attempted.
pub fn stage_well_data(config: &OrchestratorConfig, record: &WellRecord) -> Result<(), PipelineError> {
    let input = config.input_path();
    let backup = config.backup_path();

    if input.exists() {
        backup_input(&input, &backup).map_err(|source| PipelineError::Staging {
            path: backup.clone(),
            source,
        })?;
        debug!(backup = %backup.display(), "Backed up previous well data");
    }

    let staging_err = |source| PipelineError::Staging {
        path: input.clone(),
        source,
    };

    let json = serde_json::to_string_pretty(record)
        .map_err(|e| staging_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let mut file = fs::File::create(&input).map_err(staging_err)?;
    file.write_all(json.as_bytes()).map_err(staging_err)?;
    file.write_all(b"\n").map_err(staging_err)?;
    file.sync_all().map_err(staging_err)?;

    info!(
        path = %input.display(),
        well = %record.well_name,
        bytes = json.len(),
        "Staged well data"
    );
    Ok(())
}

/// Copy `input` over `backup`, carrying permissions and modification time.
fn backup_input(input: &Path, backup: &Path) -> std::io::Result<()> {
    fs::copy(input, backup)?;
    let modified = fs::metadata(input)?.modified()?;
    fs::File::options()
        .write(true)
        .open(backup)?
        .set_modified(modified)
}

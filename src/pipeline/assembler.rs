//! Success payload assembly

use super::archive::ArchiveFolder;
use super::PipelineError;
use crate::config::OrchestratorConfig;
use crate::types::{OutputFormat, RunSuccess, WellRecord, WellSummary};
use base64::{engine::general_purpose, Engine as _};
use std::fs;
use std::path::Path;

/// Instruction returned with every success, telling the consumer how to present the image.
pub const RESPONSE_INSTRUCTION: &str = "IMPORTANT: when answering the user, insert a Markdown \
image reference at a suitable place, for example: ![well_name](image_path)";

/// Markdown image reference for an absolute image path.
pub fn markdown_reference(image_path: &Path) -> String {
    format!("Well structure schematic:\n![PNG]({})", image_path.display())
}

/// Build the success payload for an archived run.
///
/// The well summary echoes the input. The image path is the canonical
/// archive folder joined with the primary image name.
pub fn assemble_success(
    config: &OrchestratorConfig,
    record: &WellRecord,
    folder: &ArchiveFolder,
    format: OutputFormat,
) -> Result<RunSuccess, PipelineError> {
    let absolute = fs::canonicalize(&folder.path).map_err(|source| PipelineError::FolderPath {
        path: folder.path.clone(),
        source,
    })?;
    let image_path = absolute.join(&config.files.primary_image);

    let image_base64 = match format {
        OutputFormat::Path => None,
        OutputFormat::Base64 => {
            let bytes = fs::read(&image_path).map_err(|e| {
                PipelineError::Unknown(format!("cannot read {}: {e}", image_path.display()))
            })?;
            Some(general_purpose::STANDARD.encode(bytes))
        }
    };

    Ok(RunSuccess {
        success: true,
        response: RESPONSE_INSTRUCTION.to_string(),
        well_info: WellSummary::from(record),
        archive_folder: folder.name.clone(),
        markdown: markdown_reference(&image_path),
        image_path: image_path.to_string_lossy().into_owned(),
        image_base64,
    })
}

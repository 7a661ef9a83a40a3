//! Per-run archive folders and read access to past runs
//!
//! Layout: one directory per run directly under the workspace, named after
//! the run's start time (`YYYY-MM-DD_HH-MM-SS`). Names are never reused: if
//! the folder already exists a `_N` disambiguator is appended, so two runs
//! started within the same second each get their own folder.

use super::PipelineError;
use crate::config::{defaults, is_plain_file_name, OrchestratorConfig};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// An archive folder created for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveFolder {
    /// Folder name relative to the workspace
    pub name: String,
    /// Workspace-joined path (not canonicalized)
    pub path: PathBuf,
    /// Artifacts moved into the folder, in output-list order
    pub moved: Vec<String>,
}

// ============================================================================
// Creation
// ============================================================================

/// Create a fresh archive folder named after `started_at`.
///
/// Uses `create_dir`, so an existing folder is never silently shared.
pub fn create_archive_folder<Tz: TimeZone>(
    config: &OrchestratorConfig,
    started_at: &DateTime<Tz>,
) -> Result<(String, PathBuf), PipelineError>
where
    Tz::Offset: std::fmt::Display,
{
    let base = started_at.format(defaults::ARCHIVE_NAME_FORMAT).to_string();

    for attempt in 0..=defaults::ARCHIVE_MAX_SUFFIX {
        let name = if attempt == 0 {
            base.clone()
        } else {
            format!("{base}_{attempt}")
        };
        let path = config.workspace_dir().join(&name);

        match fs::create_dir(&path) {
            Ok(()) => {
                debug!(folder = %name, "Created archive folder");
                return Ok((name, path));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(PipelineError::FolderCreation { path, source }),
        }
    }

    Err(PipelineError::FolderCreation {
        path: config.workspace_dir().join(&base),
        source: io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("all {} name variants already taken", defaults::ARCHIVE_MAX_SUFFIX + 1),
        ),
    })
}

/// Move every present output artifact from the workspace into `folder`.
///
/// Absent artifacts are skipped. The first failed move aborts the archive.
pub fn move_outputs(config: &OrchestratorConfig, folder: &Path) -> Result<Vec<String>, PipelineError> {
    let mut moved = Vec::new();

    for name in &config.files.outputs {
        let source = config.workspace_dir().join(name);
        if !source.exists() {
            continue;
        }

        let target = folder.join(name);
        if target.exists() {
            return Err(PipelineError::Archive {
                file: name.clone(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", target.display()),
                ),
            });
        }

        fs::rename(&source, &target).map_err(|source| PipelineError::Archive {
            file: name.clone(),
            source,
        })?;
        moved.push(name.clone());
    }

    Ok(moved)
}

/// Create the run's folder and move the outputs into it.
pub fn archive_outputs<Tz: TimeZone>(
    config: &OrchestratorConfig,
    started_at: &DateTime<Tz>,
) -> Result<ArchiveFolder, PipelineError>
where
    Tz::Offset: std::fmt::Display,
{
    let (name, path) = create_archive_folder(config, started_at)?;
    let moved = move_outputs(config, &path)?;

    info!(folder = %name, files = moved.len(), "Archived generator outputs");
    Ok(ArchiveFolder { name, path, moved })
}

// ============================================================================
// Retrieval
// ============================================================================

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("'{0}' is not a valid archive folder name")]
    InvalidName(String),

    #[error("archive entry not found: {0}")]
    NotFound(String),

    #[error("archive I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Split an archive folder name into its timestamp and disambiguator.
pub fn parse_archive_name(name: &str) -> Option<(NaiveDateTime, u32)> {
    let stamp = name.get(..19)?;
    let when = NaiveDateTime::parse_from_str(stamp, defaults::ARCHIVE_NAME_FORMAT).ok()?;
    let suffix = match &name[19..] {
        "" => 0,
        rest => rest.strip_prefix('_')?.parse().ok()?,
    };
    Some((when, suffix))
}

/// Archive folder names in the workspace, newest first.
pub fn list_archives(config: &OrchestratorConfig) -> Result<Vec<String>, RetrievalError> {
    let mut found: Vec<(NaiveDateTime, u32, String)> = Vec::new();

    for entry in fs::read_dir(config.workspace_dir())? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some((when, suffix)) = parse_archive_name(&name) {
            found.push((when, suffix, name));
        }
    }

    found.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
    Ok(found.into_iter().map(|(_, _, name)| name).collect())
}

/// Resolve an archive folder by name, rejecting anything that is not one.
pub fn archive_dir(config: &OrchestratorConfig, name: &str) -> Result<PathBuf, RetrievalError> {
    if !is_plain_file_name(name) || parse_archive_name(name).is_none() {
        return Err(RetrievalError::InvalidName(name.to_string()));
    }
    let dir = config.workspace_dir().join(name);
    if !dir.is_dir() {
        return Err(RetrievalError::NotFound(name.to_string()));
    }
    Ok(dir)
}

/// File names stored in an archive folder, sorted.
pub fn archive_contents(config: &OrchestratorConfig, name: &str) -> Result<Vec<String>, RetrievalError> {
    let dir = archive_dir(config, name)?;
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(n) = entry.file_name().to_str() {
                files.push(n.to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Markdown report text of an archived run.
pub fn read_report(config: &OrchestratorConfig, name: &str) -> Result<String, RetrievalError> {
    let path = archive_dir(config, name)?.join(&config.files.report);
    fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RetrievalError::NotFound(format!("{name}/{}", config.files.report)),
        _ => RetrievalError::Io(e),
    })
}

/// Primary image bytes of an archived run.
pub fn read_image(config: &OrchestratorConfig, name: &str) -> Result<Vec<u8>, RetrievalError> {
    let path = archive_dir(config, name)?.join(&config.files.primary_image);
    fs::read(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            RetrievalError::NotFound(format!("{name}/{}", config.files.primary_image))
        }
        _ => RetrievalError::Io(e),
    })
}

//! End-of-run cleanup of transient staging state

use crate::config::OrchestratorConfig;
use std::fs;
use std::io;
use tracing::{debug, warn};

/// Remove the input backup slot if present.
///
/// Never fails: errors are logged and swallowed so cleanup cannot turn a
/// successful run into a failure. Safe to call repeatedly.
pub fn cleanup_transient_files(config: &OrchestratorConfig) {
    let backup = config.backup_path();
    match fs::remove_file(&backup) {
        Ok(()) => debug!(path = %backup.display(), "Removed input backup"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %backup.display(), error = %e, "Failed to remove input backup"),
    }
}

//! Output settling: wait until the generator's files stop changing.
//!
//! A process can signal exit before every handle it opened has been released.
//! Instead of sleeping a fixed interval, the present output artifacts are
//! snapshotted (size, mtime, readable) every poll interval; two identical
//! consecutive snapshots that include the primary image count as settled.
//! The wait is bounded by `settle.max_wait_ms`.

use super::PipelineError;
use crate::config::OrchestratorConfig;
use std::fs;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileState {
    name: String,
    len: u64,
    modified: Option<SystemTime>,
    readable: bool,
}

fn snapshot(config: &OrchestratorConfig) -> Vec<FileState> {
    config
        .files
        .outputs
        .iter()
        .filter_map(|name| {
            let path = config.workspace_dir().join(name);
            let meta = fs::metadata(&path).ok()?;
            Some(FileState {
                name: name.clone(),
                len: meta.len(),
                modified: meta.modified().ok(),
                readable: fs::File::open(&path).is_ok(),
            })
        })
        .collect()
}

fn is_settled(config: &OrchestratorConfig, previous: &[FileState], current: &[FileState]) -> bool {
    previous == current
        && current.iter().all(|f| f.readable)
        && current.iter().any(|f| f.name == config.files.primary_image)
}

/// Block until outputs are stable. Returns the time spent waiting.
pub async fn wait_for_stable_outputs(config: &OrchestratorConfig) -> Result<Duration, PipelineError> {
    let poll = config.settle.poll_interval();
    let max_wait = config.settle.max_wait();
    let started = Instant::now();
    let mut previous = snapshot(config);

    loop {
        tokio::time::sleep(poll).await;
        let current = snapshot(config);
        let waited = started.elapsed();

        if is_settled(config, &previous, &current) {
            debug!(
                waited_ms = waited.as_millis() as u64,
                files = current.len(),
                "Generator outputs settled"
            );
            return Ok(waited);
        }

        if waited >= max_wait {
            warn!(waited_ms = waited.as_millis() as u64, "Generator outputs did not settle");
            return Err(PipelineError::OutputNotSettled {
                waited_ms: waited.as_millis() as u64,
            });
        }

        previous = current;
    }
}

//! Generator supervision: run the plotting tool under a wall-clock budget.
//!
//! The tool is a black box. The only observable contracts are its exit
//! status and whether the primary image exists afterwards. Output lines are
//! forwarded to tracing at debug level.

use super::PipelineError;
use crate::config::{defaults, OrchestratorConfig};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Run the generator once, to completion, timeout, or failure.
///
/// Nothing is spawned when the executable is absent. A timed-out process is
/// killed and reaped before returning. No retries.
pub async fn run_generator(config: &OrchestratorConfig) -> Result<(), PipelineError> {
    let program = config.generator_path();
    if !program.is_file() {
        warn!(path = %program.display(), "Generator executable not found");
        return Err(PipelineError::GeneratorMissing(program));
    }
    // A relative program would be resolved again after the child's chdir.
    let program =
        std::fs::canonicalize(&program).map_err(|_| PipelineError::GeneratorMissing(program))?;

    let budget = config.generator.timeout();
    let started = Instant::now();

    info!(
        program = %program.display(),
        timeout_secs = config.generator.timeout_secs,
        "Starting generator"
    );

    let mut command = Command::new(&program);
    command
        .args(&config.generator.args)
        .current_dir(config.workspace_dir())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own process group, so a timeout also takes down anything the tool started.
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(PipelineError::GeneratorSpawn)?;

    if let Some(out) = child.stdout.take() {
        tokio::spawn(forward_lines(out, "stdout"));
    }
    if let Some(err) = child.stderr.take() {
        tokio::spawn(forward_lines(err, "stderr"));
    }

    let status = match tokio::time::timeout(budget, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => return Err(PipelineError::GeneratorSpawn(e)),
        Err(_elapsed) => {
            #[cfg(unix)]
            kill_process_group(&child);
            // kill() sends SIGKILL and waits for the exit, so the child is reaped here.
            let reap = tokio::time::timeout(
                Duration::from_secs(defaults::GENERATOR_REAP_SECS),
                child.kill(),
            )
            .await;
            warn!(
                timeout_secs = config.generator.timeout_secs,
                elapsed_ms = started.elapsed().as_millis() as u64,
                reaped = matches!(reap, Ok(Ok(()))),
                "Generator timed out, process killed"
            );
            return Err(PipelineError::GeneratorTimeout {
                secs: config.generator.timeout_secs,
            });
        }
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    if !status.success() {
        warn!(exit_code = ?status.code(), elapsed_ms, "Generator exited with failure status");
        return Err(PipelineError::GeneratorFailed {
            code: status.code(),
        });
    }

    let image = config.primary_image_path();
    if !image.exists() {
        warn!(path = %image.display(), "Generator succeeded but produced no image");
        return Err(PipelineError::OutputMissing(image));
    }

    info!(elapsed_ms, "Generator finished");
    Ok(())
}

/// SIGKILL every process in the generator's group.
#[cfg(unix)]
fn kill_process_group(child: &tokio::process::Child) {
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: killpg only takes integer arguments; the group was created at spawn.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        warn!(pgid, error = %std::io::Error::last_os_error(), "Failed to kill generator process group");
    }
}

async fn forward_lines<R>(stream: R, channel: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(channel, "generator: {}", line);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::types::GeneratorFailureKind;
    use std::os::unix::fs::PermissionsExt;

    /// Workspace whose generator is a `/bin/sh` script running `body`.
    fn config_with_script(dir: &std::path::Path, body: &str) -> OrchestratorConfig {
        let config = OrchestratorConfig::for_workspace(dir);
        let script = config.generator_path();
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        config
    }

    #[tokio::test]
    async fn test_missing_binary_spawns_nothing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = OrchestratorConfig::for_workspace(tmp.path());

        let err = run_generator(&config).await.unwrap_err();
        assert_eq!(err.generator_kind(), Some(GeneratorFailureKind::MissingBinary));
    }

    #[tokio::test]
    async fn test_success_requires_primary_image() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = config_with_script(tmp.path(), "echo plotting; printf png > well_structure_plot.png");

        run_generator(&config).await.unwrap();
        assert!(config.primary_image_path().exists());
    }

    #[tokio::test]
    async fn test_clean_exit_without_image_is_missing_output() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = config_with_script(tmp.path(), "exit 0");

        let err = run_generator(&config).await.unwrap_err();
        assert_eq!(err.generator_kind(), Some(GeneratorFailureKind::MissingOutput));
    }

    #[tokio::test]
    async fn test_nonzero_exit_reported_with_code() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = config_with_script(tmp.path(), "printf png > well_structure_plot.png; exit 3");

        match run_generator(&config).await {
            Err(PipelineError::GeneratorFailed { code }) => assert_eq!(code, Some(3)),
            other => panic!("expected GeneratorFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generator_runs_in_workspace_with_args() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = config_with_script(tmp.path(), "echo \"$1\" > well_structure_plot.png");
        config.generator.args = vec!["--batch".to_string()];

        run_generator(&config).await.unwrap();
        let content = std::fs::read_to_string(config.primary_image_path()).unwrap();
        assert_eq!(content.trim(), "--batch");
    }

    #[tokio::test]
    async fn test_relative_workspace_runs_generator() {
        let tmp = tempfile::Builder::new().tempdir_in(".").expect("tempdir");
        assert!(tmp.path().is_relative());
        let config = config_with_script(tmp.path(), "printf png > well_structure_plot.png");

        run_generator(&config).await.unwrap();
        assert!(config.primary_image_path().is_file());
    }

    /// Gone, or a zombie waiting for init to reap it.
    #[cfg(target_os = "linux")]
    fn process_gone(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Err(_) => true,
            Ok(stat) => stat.rsplit(") ").next().is_some_and(|rest| rest.starts_with('Z')),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_kills_whole_process_group() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = config_with_script(
            tmp.path(),
            "sleep 30 &\necho $! > helper.pid\nwait",
        );
        config.generator.timeout_secs = 1;

        let err = run_generator(&config).await.unwrap_err();
        assert_eq!(err.generator_kind(), Some(GeneratorFailureKind::Timeout));

        let pid = std::fs::read_to_string(tmp.path().join("helper.pid")).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while !process_gone(pid.trim()) && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(process_gone(pid.trim()), "helper process outlived the timeout");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_kills_process() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = config_with_script(tmp.path(), "echo $$ > generator.pid\nexec sleep 30");
        config.generator.timeout_secs = 1;

        let started = Instant::now();
        let err = run_generator(&config).await.unwrap_err();
        assert_eq!(err.generator_kind(), Some(GeneratorFailureKind::Timeout));
        assert!(started.elapsed() < Duration::from_secs(10));

        let pid = std::fs::read_to_string(tmp.path().join("generator.pid")).unwrap();
        assert!(process_gone(pid.trim()), "generator process still alive");
    }
}

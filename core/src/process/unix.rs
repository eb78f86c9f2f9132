//! Unix process execution with process-group cleanup
//!
//! Every spawned command becomes the leader of a new session (via `setsid()`),
//! so a timeout can signal the negative PID and take down the whole tree,
//! including a `curl` started by `sh -c`.

// Allow unsafe code for this module since process management requires libc::setsid() calls
#![allow(unsafe_code)]

use crate::{CheckError, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `128 + signal` when the process was killed by a signal
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

/// Spawn `cmd` as the leader of a new session with piped stdout/stderr
fn spawn(cmd: &str, args: &[&str]) -> Result<(Pid, Child)> {
    debug!("Spawning process: {} {:?}", cmd, args);

    let mut command = Command::new(cmd);
    command.args(args);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    // Safety: setsid() is async-signal-safe and appropriate for use in pre_exec
    #[deny(unsafe_op_in_unsafe_fn)]
    unsafe {
        command.pre_exec(|| {
            let result = libc::setsid();
            if result == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child = command.spawn().map_err(|e| {
        error!("Failed to spawn process '{}': {}", cmd, e);
        CheckError::ProcessError(format!("Failed to spawn '{}': {}", cmd, e))
    })?;

    let raw_pid = child
        .id()
        .ok_or_else(|| CheckError::ProcessError("Spawned child did not have a PID".to_string()))?;
    let pid = Pid::from_raw(raw_pid as i32);
    debug!("Spawned process {} in new process group", pid);

    Ok((pid, child))
}

/// Send SIGKILL to the process group led by `pid`
///
/// `ESRCH` and `EPERM` are treated as success: the group is already gone.
fn kill_group(pid: Pid) -> Result<()> {
    debug!("Sending SIGKILL to process group {}", pid);

    match killpg(pid, Signal::SIGKILL) {
        Ok(()) => Ok(()),
        Err(nix::errno::Errno::ESRCH) | Err(nix::errno::Errno::EPERM) => {
            debug!("Process group {} already exited", pid);
            Ok(())
        }
        Err(e) => {
            error!("Failed to send SIGKILL to process group {}: {}", pid, e);
            Err(CheckError::ProcessError(format!(
                "Failed to send SIGKILL to process group {}: {}",
                pid, e
            )))
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

/// Run a command to completion, capturing its output
///
/// If the command has not exited within `limit` its whole process group is
/// killed and a `ProcessError` is returned; a hung probe is never mistaken
/// for a rejected one.
pub async fn run_with_timeout(cmd: &str, args: &[&str], limit: Duration) -> Result<CommandOutput> {
    let (pid, child) = spawn(cmd, args)?;

    match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let result = CommandOutput {
                exit_code: exit_code(output.status),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };
            debug!("Process {} exited with code {}", pid, result.exit_code);
            Ok(result)
        }
        Ok(Err(e)) => Err(CheckError::ProcessError(format!(
            "Failed to collect output of '{}': {}",
            cmd, e
        ))),
        Err(_elapsed) => {
            warn!("'{}' did not finish within {:?}, killing group {}", cmd, limit, pid);
            kill_group(pid)?;
            Err(CheckError::ProcessError(format!(
                "'{}' timed out after {:?}",
                cmd, limit
            )))
        }
    }
}

/// Run a shell command line through `sh -c`
pub async fn run_shell(command_line: &str, limit: Duration) -> Result<CommandOutput> {
    run_with_timeout("sh", &["-c", command_line], limit).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_with_timeout_passes_arguments() {
        let out = run_with_timeout("echo", &["hello", "world"], Duration::from_secs(5))
            .await
            .expect("run");
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout, "hello world\n");
    }

    #[tokio::test]
    async fn test_missing_command_is_a_process_error() {
        match run_with_timeout("nonexistent_command_12345", &[], Duration::from_secs(5)).await {
            Err(CheckError::ProcessError(msg)) => assert!(msg.contains("Failed to spawn"), "{msg}"),
            other => panic!("Expected ProcessError, got: {:?}", other),
        }
    }

    #[test]
    fn test_kill_group_of_missing_process_is_ok() {
        // pid_max never reaches i32::MAX, so no such group exists
        assert!(kill_group(Pid::from_raw(i32::MAX)).is_ok());
    }

    #[tokio::test]
    async fn test_run_shell_captures_output_and_code() {
        let out = run_shell("echo out; echo err >&2; exit 3", Duration::from_secs(5))
            .await
            .expect("run");
        assert_eq!(out.exit_code, 3);
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_run_shell_success() {
        let out = run_shell("true", Duration::from_secs(5)).await.expect("run");
        assert_eq!(out.exit_code, 0);
    }

    #[tokio::test]
    async fn test_run_shell_timeout_kills_group() {
        let result = run_shell("sleep 10", Duration::from_millis(100)).await;
        match result {
            Err(CheckError::ProcessError(msg)) => assert!(msg.contains("timed out"), "{msg}"),
            other => panic!("Expected timeout ProcessError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signal_exit_code() {
        let out = run_shell("kill -9 $$", Duration::from_secs(5))
            .await
            .expect("run");
        assert_eq!(out.exit_code, 128 + 9);
    }
}

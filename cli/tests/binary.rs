//! Exercises the `authprobe` binary itself: argument parsing and exit codes

use std::process::Command;

fn authprobe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_authprobe"));
    cmd.env_remove("AUTHPROBE_LOG");
    cmd
}

#[test]
fn test_scenarios_prints_probe_commands() {
    let output = authprobe()
        .args(["scenarios", "--port", "9090"])
        .output()
        .expect("run authprobe");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("curl -v --fail '[::1]:9090/authenticate'"));
    assert!(stdout.contains("curl -v --fail -u user:password '[::1]:9090/authenticate'"));
}

#[test]
fn test_invalid_override_exits_with_usage_code() {
    let output = authprobe()
        .args(["run", "--wrong-password", "password"])
        .output()
        .expect("run authprobe");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CHECK007"), "stderr: {stderr}");
}

#[test]
fn test_unknown_scenario_is_rejected_by_parser() {
    let output = authprobe()
        .args(["probe", "--scenario", "admin"])
        .output()
        .expect("run authprobe");

    // clap reports usage errors with status 2
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown scenario"));
}

#[test]
fn test_unit_wait_failure_exits_with_check_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let systemctl = dir.path().join("systemctl");
    std::fs::write(&systemctl, "#!/bin/sh\necho inactive\nexit 3\n").expect("write");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&systemctl, std::fs::Permissions::from_mode(0o755))
            .expect("chmod");
    }

    let output = authprobe()
        .args(["wait", "--unit-timeout", "1", "--poll-interval", "100", "--systemctl"])
        .arg(&systemctl)
        .output()
        .expect("run authprobe");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("CHECK001"));
}

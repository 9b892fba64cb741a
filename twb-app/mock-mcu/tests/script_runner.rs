use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

/// Upper bound for a `--fast` run; the runner must exit on its own well before this.
const RUN_TIMEOUT: Duration = Duration::from_secs(20);

/// Run the mock MCU with `args`, `RUST_LOG` unset, and collect its output.
fn run(args: &[&str]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_mock-mcu"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let start = Instant::now();
    while child.try_wait().unwrap().is_none() {
        if start.elapsed() > RUN_TIMEOUT {
            child.kill().unwrap();
            panic!("mock-mcu did not exit within {:?}", RUN_TIMEOUT);
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    child.wait_with_output().unwrap()
}

fn temp_file(
    name: &str,
    contents: &str,
) -> PathBuf {
    let path = std::env::temp_dir().join(format!("twb-{}-{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn demo_script_exits_after_last_command() {
    let out = run(&["--fast"]);
    assert!(out.status.success(), "status: {:?}", out.status);

    // info level is on without RUST_LOG
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("drivetrain stopped"), "stdout: {stdout}");
    assert!(stdout.contains("script finished"), "stdout: {stdout}");
}

#[test]
fn script_file_runs_to_completion() {
    let script = temp_file(
        "ok.jsonl",
        "# timed drives\n{\"dc\":\"forward_for\",\"ms\":20}\n{\"dc\":\"right\",\"ms\":10}\n{\"dc\":\"stop\"}\n",
    );
    let out = run(&["--fast", "--script", script.to_str().unwrap()]);
    std::fs::remove_file(&script).ok();
    assert!(out.status.success(), "status: {:?}", out.status);
}

#[test]
fn invalid_script_line_sets_exit_status() {
    let script = temp_file("bad.jsonl", "{\"dc\":\"stop\"}\n{\"dc\":\"jump\"}\n");
    let out = run(&["--fast", "--script", script.to_str().unwrap()]);
    std::fs::remove_file(&script).ok();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn missing_config_fails() {
    let out = run(&["--fast", "--config", "/nonexistent/twb-config.json"]);
    assert_eq!(out.status.code(), Some(1));
}

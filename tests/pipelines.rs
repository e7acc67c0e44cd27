//! Integration tests for pipes, redirection and the copy built-in.

use serial_test::serial;
use smash::{Shell, ShellConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn shell() -> Shell {
    Shell::new(ShellConfig {
        shell_path: PathBuf::from("/bin/sh"),
        ..ShellConfig::default()
    })
}

fn read_trimmed(path: &Path) -> String {
    fs::read_to_string(path).unwrap().trim().to_string()
}

#[test]
#[serial]
fn test_pipe_feeds_right_side() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("count.txt");
    let mut shell = shell();

    shell.execute_line(&format!("printf abc | wc -c > {}", out.display()));

    assert_eq!(read_trimmed(&out), "3");
    assert!(shell.jobs().is_empty());
}

#[test]
#[serial]
fn test_pipeline_returns_after_slower_left_side() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("late.txt");
    let mut shell = shell();

    let started = Instant::now();
    shell.execute_line(&format!("sleep 1; printf x | cat > {}", out.display()));

    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_eq!(fs::read_to_string(&out).unwrap(), "x");
    assert!(shell.jobs().is_empty());
}

#[test]
#[serial]
fn test_pipe_stderr_variant_carries_error_stream() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("errors.txt");
    let mut shell = shell();

    shell.execute_line(&format!(
        "ls /definitely/not/a/real/path |& wc -l > {}",
        out.display()
    ));

    assert_eq!(read_trimmed(&out), "1");
}

#[test]
#[serial]
fn test_pipes_nest_to_the_right() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested.txt");
    let mut shell = shell();

    shell.execute_line(&format!(
        "printf 'b\\na\\nb\\n' | sort | uniq > {}",
        out.display()
    ));

    assert_eq!(fs::read_to_string(&out).unwrap(), "a\nb\n");
}

#[test]
#[serial]
fn test_builtin_runs_inside_pipeline_side() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pid.txt");
    let mut shell = shell();

    shell.execute_line(&format!("showpid | cat > {}", out.display()));

    assert_eq!(
        read_trimmed(&out),
        format!("smash pid is {}", std::process::id())
    );
}

#[test]
#[serial]
fn test_truncate_and_append_redirection() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("log.txt");
    fs::write(&out, "previous run\n").unwrap();
    let mut shell = shell();

    shell.execute_line(&format!("echo one > {}", out.display()));
    shell.execute_line(&format!("echo two >> {}", out.display()));

    assert_eq!(fs::read_to_string(&out).unwrap(), "one\ntwo\n");
}

#[test]
#[serial]
fn test_redirection_to_unopenable_target_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let mut shell = shell();

    shell.execute_line(&format!(
        "touch {} > {}",
        marker.display(),
        dir.path().join("missing").join("out").display()
    ));

    assert!(!marker.exists());
}

#[test]
#[serial]
fn test_cp_copies_in_child() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.txt");
    let dst = dir.path().join("dst.txt");
    fs::write(&src, "payload\n".repeat(2000)).unwrap();
    let mut shell = shell();

    shell.execute_line(&format!("cp {} {}", src.display(), dst.display()));

    assert_eq!(fs::read(&dst).unwrap(), fs::read(&src).unwrap());
    assert!(shell.jobs().is_empty());
}

#[test]
#[serial]
fn test_cp_output_can_be_redirected() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.txt");
    let dst = dir.path().join("b.txt");
    let log = dir.path().join("cp.log");
    fs::write(&src, "x").unwrap();
    let mut shell = shell();

    shell.execute_line(&format!(
        "cp {} {} > {}",
        src.display(),
        dst.display(),
        log.display()
    ));

    assert_eq!(
        read_trimmed(&log),
        format!("smash: {} was copied to {}", src.display(), dst.display())
    );
}

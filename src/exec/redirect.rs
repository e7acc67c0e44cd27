use crate::command::{RedirectMode, Redirection};
use crate::config::types::{Result, ShellError};
use crate::kernel::process::{close_fd, duplicate, flush_stdout, redirect};
use log::debug;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};

/// Open the target of `>` or `>>` for writing.
pub fn open_target(redirection: &Redirection) -> Result<std::fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).mode(0o666);
    match redirection.mode {
        RedirectMode::Truncate => options.truncate(true),
        RedirectMode::Append => options.append(true),
    };
    options
        .open(&redirection.target)
        .map_err(|e| ShellError::io("open", &e))
}

/// Standard output pointed at a file for the lifetime of the guard.
///
/// Dropping the guard puts the saved descriptor back on fd 1. A forked child
/// calls [`StdoutRedirect::persist`] instead, since its descriptors die with it.
#[derive(Debug)]
pub struct StdoutRedirect {
    saved: Option<RawFd>,
}

impl StdoutRedirect {
    /// Nothing is changed when the target cannot be opened.
    pub fn apply(redirection: &Redirection) -> Result<Self> {
        let file = open_target(redirection)?;
        flush_stdout();

        let saved = duplicate(libc::STDOUT_FILENO)?;
        if let Err(e) = redirect(file.as_raw_fd(), libc::STDOUT_FILENO) {
            let _ = close_fd(saved);
            return Err(e);
        }
        debug!(
            "stdout redirected to {} (saved as fd {})",
            redirection.target.display(),
            saved
        );
        Ok(Self { saved: Some(saved) })
    }

    /// Keep the redirection in place for the rest of the process.
    pub fn persist(mut self) {
        if let Some(saved) = self.saved.take() {
            let _ = close_fd(saved);
        }
    }
}

impl Drop for StdoutRedirect {
    fn drop(&mut self) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        flush_stdout();
        if let Err(e) = redirect(saved, libc::STDOUT_FILENO) {
            e.report();
        }
        let _ = close_fd(saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::process::{exit_child, fork_process, wait_for_exit};
    use nix::unistd::ForkResult;
    use serial_test::serial;
    use std::io::Write;
    use std::path::Path;

    fn to(path: &Path, mode: RedirectMode) -> Redirection {
        Redirection {
            target: path.to_path_buf(),
            mode,
        }
    }

    #[test]
    #[serial(stdout_fd)]
    fn test_truncate_then_append_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale contents\n").unwrap();

        // Swap fd 1 in a child so the harness's own output is never captured.
        match fork_process().unwrap() {
            ForkResult::Child => {
                let mut out = std::io::stdout();
                {
                    let _guard = StdoutRedirect::apply(&to(&path, RedirectMode::Truncate)).unwrap();
                    writeln!(out, "first").unwrap();
                }
                {
                    let _guard = StdoutRedirect::apply(&to(&path, RedirectMode::Append)).unwrap();
                    writeln!(out, "second").unwrap();
                }
                writeln!(out, "restored").unwrap();
                exit_child(0);
            }
            ForkResult::Parent { child } => {
                wait_for_exit(child).unwrap();
            }
        }

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    #[serial(stdout_fd)]
    fn test_unopenable_target_leaves_stdout_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");

        let err = StdoutRedirect::apply(&to(&path, RedirectMode::Truncate)).unwrap_err();
        assert_eq!(err.to_string(), "open failed: No such file or directory");
    }
}

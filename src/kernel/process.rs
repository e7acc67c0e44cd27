//! Process and descriptor primitives.
//!
//! Thin wrappers over fork/wait/kill and the descriptor calls the engine
//! needs. Every failure carries the name of the call that failed.

use crate::config::types::{Result, ShellError};
use log::debug;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup, dup2, fork, pipe, read, setpgid, ForkResult, Pid};
use std::io::Write;
use std::os::unix::io::RawFd;
use std::rc::Rc;

/// Result of a non-blocking status check on a tracked child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildState {
    /// Still running or stopped
    Alive,
    /// Exited or killed; the status has now been collected
    Finished,
    /// Not a child of this process (already reaped elsewhere)
    NotAChild,
}

/// How the shell signals and polls the processes it launched.
pub trait ProcessControl {
    /// Send `signum` to the whole process group led by `leader`.
    fn signal_group(&self, leader: Pid, signum: libc::c_int) -> std::result::Result<(), Errno>;

    /// Non-blocking check whether `pid` has finished.
    fn poll_child(&self, pid: Pid) -> std::result::Result<ChildState, Errno>;
}

/// [`ProcessControl`] backed by the real kill(2) and waitpid(2).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsProcesses;

impl ProcessControl for OsProcesses {
    fn signal_group(&self, leader: Pid, signum: libc::c_int) -> std::result::Result<(), Errno> {
        // Raw kill: `kill -N` accepts any number, including ones nix has no name for.
        let rc = unsafe { libc::kill(-leader.as_raw(), signum) };
        Errno::result(rc).map(drop)
    }

    fn poll_child(&self, pid: Pid) -> std::result::Result<ChildState, Errno> {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => Ok(ChildState::Finished),
            Ok(_) => Ok(ChildState::Alive),
            Err(Errno::ECHILD) => Ok(ChildState::NotAChild),
            Err(e) => Err(e),
        }
    }
}

impl<T: ProcessControl + ?Sized> ProcessControl for Rc<T> {
    fn signal_group(&self, leader: Pid, signum: libc::c_int) -> std::result::Result<(), Errno> {
        (**self).signal_group(leader, signum)
    }

    fn poll_child(&self, pid: Pid) -> std::result::Result<ChildState, Errno> {
        (**self).poll_child(pid)
    }
}

/// Flush buffered stdout so it is neither duplicated by fork nor misrouted by dup2.
pub fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

/// Fork after flushing stdout.
pub fn fork_process() -> Result<ForkResult> {
    flush_stdout();
    // SAFETY: the shell's control flow is single-threaded; children either
    // exec or finish their command and exit.
    unsafe { fork() }.map_err(|e| ShellError::os("fork", e))
}

/// Make `pid` the leader of a new process group (`0` means the caller).
pub fn new_process_group(pid: Pid) -> Result<()> {
    setpgid(pid, Pid::from_raw(0)).map_err(|e| ShellError::os("setpgrp", e))
}

/// Terminate a forked child once its command is done.
pub fn exit_child(code: i32) -> ! {
    flush_stdout();
    std::process::exit(code)
}

/// Block until `pid` terminates, retrying interrupted waits.
pub fn wait_for_exit(pid: Pid) -> Result<WaitStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(status @ WaitStatus::Exited(..)) | Ok(status @ WaitStatus::Signaled(..)) => {
                return Ok(status)
            }
            Ok(status) => debug!("pid {} reported {:?}, still waiting", pid, status),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ShellError::os("waitpid", e)),
        }
    }
}

/// Returns `(read_end, write_end)`.
pub fn create_pipe() -> Result<(RawFd, RawFd)> {
    pipe().map_err(|e| ShellError::os("pipe", e))
}

/// read(2) that hands `EINTR` back to the caller instead of retrying.
pub fn read_fd(fd: RawFd, buf: &mut [u8]) -> std::result::Result<usize, Errno> {
    read(fd, buf)
}

pub fn duplicate(fd: RawFd) -> Result<RawFd> {
    dup(fd).map_err(|e| ShellError::os("dup", e))
}

/// Make `target` refer to the same open file as `source`.
pub fn redirect(source: RawFd, target: RawFd) -> Result<()> {
    dup2(source, target)
        .map(drop)
        .map_err(|e| ShellError::os("dup2", e))
}

pub fn close_fd(fd: RawFd) -> Result<()> {
    close(fd).map_err(|e| ShellError::os("close", e))
}

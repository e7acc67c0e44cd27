/// In-memory stand-ins for the process and timer seams
/// Lets job-control logic be driven without forking or real signals
use crate::kernel::process::{ChildState, ProcessControl};
use crate::kernel::timer::IntervalTimer;
use nix::errno::Errno;
use nix::unistd::Pid;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// [`ProcessControl`] that records what it was asked to do.
///
/// Every pid is alive until marked with [`RecordingControl::finish`]. Only
/// signals that were delivered successfully are recorded.
#[derive(Debug, Default)]
pub struct RecordingControl {
    finished: RefCell<HashSet<Pid>>,
    failures: RefCell<HashMap<Pid, Errno>>,
    sent: RefCell<Vec<(Pid, libc::c_int)>>,
}

impl RecordingControl {
    /// Report `pid` as exited on its next poll.
    pub fn finish(&self, pid: Pid) {
        self.finished.borrow_mut().insert(pid);
    }

    /// Make every signal to `pid` fail with `errno`.
    pub fn fail_signals_to(&self, pid: Pid, errno: Errno) {
        self.failures.borrow_mut().insert(pid, errno);
    }

    pub fn signals_sent(&self) -> Vec<(Pid, libc::c_int)> {
        self.sent.borrow().clone()
    }
}

impl ProcessControl for RecordingControl {
    fn signal_group(&self, leader: Pid, signum: libc::c_int) -> Result<(), Errno> {
        if let Some(errno) = self.failures.borrow().get(&leader) {
            return Err(*errno);
        }
        self.sent.borrow_mut().push((leader, signum));
        Ok(())
    }

    fn poll_child(&self, pid: Pid) -> Result<ChildState, Errno> {
        if self.finished.borrow_mut().remove(&pid) {
            Ok(ChildState::Finished)
        } else {
            Ok(ChildState::Alive)
        }
    }
}

/// [`IntervalTimer`] that keeps its history: `Some(delay)` per arm, `None` per disarm.
#[derive(Debug, Default)]
pub struct ManualTimer {
    history: RefCell<Vec<Option<Duration>>>,
}

impl ManualTimer {
    pub fn history(&self) -> Vec<Option<Duration>> {
        self.history.borrow().clone()
    }

    /// Delay of the most recent arm, unless a disarm came after it.
    pub fn armed_for(&self) -> Option<Duration> {
        self.history.borrow().last().copied().flatten()
    }
}

impl IntervalTimer for ManualTimer {
    fn arm(&self, after: Duration) -> Result<(), Errno> {
        self.history.borrow_mut().push(Some(after));
        Ok(())
    }

    fn disarm(&self) -> Result<(), Errno> {
        self.history.borrow_mut().push(None);
        Ok(())
    }
}

use crate::config::types::ShellConfig;
use crate::jobs::{ForegroundSlot, JobTable};
use crate::kernel::process::{OsProcesses, ProcessControl};
use crate::kernel::timer::{IntervalTimer, RealTimer};
use crate::timeout::TimeoutScheduler;
use nix::unistd::{getpid, Pid};
use std::path::PathBuf;

/// Whether the shell keeps reading commands after a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything the shell's control flow and signal processing share.
///
/// Only the main control flow mutates this; signals reach it through the
/// pending set drained by [`Shell::dispatch_pending_signals`].
pub struct Shell {
    pub(crate) config: ShellConfig,
    pub(crate) prompt: String,
    pub(crate) jobs: JobTable,
    pub(crate) foreground: ForegroundSlot,
    pub(crate) timeouts: TimeoutScheduler,
    /// Directory before the last successful `cd`
    pub(crate) last_pwd: Option<PathBuf>,
    pub(crate) shell_pid: Pid,
    pub(crate) control: Box<dyn ProcessControl>,
}

impl Shell {
    /// Shell driving real processes and the real interval timer.
    pub fn new(config: ShellConfig) -> Self {
        Self::with_backends(config, Box::new(OsProcesses), Box::new(RealTimer))
    }

    pub fn with_backends(
        config: ShellConfig,
        control: Box<dyn ProcessControl>,
        timer: Box<dyn IntervalTimer>,
    ) -> Self {
        Self {
            prompt: config.prompt.clone(),
            config,
            jobs: JobTable::new(),
            foreground: ForegroundSlot::default(),
            timeouts: TimeoutScheduler::new(timer),
            last_pwd: None,
            shell_pid: getpid(),
            control,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Current prompt text, without the trailing `> `.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn foreground(&self) -> &ForegroundSlot {
        &self.foreground
    }

    pub fn timeouts(&self) -> &TimeoutScheduler {
        &self.timeouts
    }

    /// Record `pid` as a stopped job, inserting it when it is not tracked yet.
    pub(crate) fn record_stopped(&mut self, pid: Pid, command_line: &str) {
        match self.jobs.find_by_pid_mut(pid) {
            Some(job) => job.stop(),
            None => {
                self.jobs.add(self.control.as_ref(), command_line, pid, true);
            }
        }
    }
}

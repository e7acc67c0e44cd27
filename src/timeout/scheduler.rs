//! Pending command deadlines multiplexed onto one interval timer.
//!
//! Entries are kept sorted by remaining time. The timer is only re-armed on
//! insertion when the new entry lands at the head of the queue; otherwise the
//! armed expiry already belongs to an earlier deadline and the next expiry
//! handler re-arms for whatever is then at the head.

use crate::config::types::{Result, ShellError};
use crate::kernel::timer::IntervalTimer;
use log::debug;
use nix::unistd::Pid;
use std::time::{Duration, Instant};

/// Tolerance when deciding whether the head has expired.
pub const EXPIRY_SLACK: Duration = Duration::from_millis(10);

/// One scheduled kill-and-notify.
#[derive(Clone, Debug)]
pub struct TimeoutEntry {
    seq: u64,
    pid: Option<Pid>,
    duration: Duration,
    registered_at: Instant,
    command_line: String,
}

impl TimeoutEntry {
    /// Target process group; `None` when the command ran inside the shell.
    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.registered_at))
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.remaining(now) <= EXPIRY_SLACK
    }
}

pub struct TimeoutScheduler {
    entries: Vec<TimeoutEntry>,
    next_seq: u64,
    timer: Box<dyn IntervalTimer>,
}

impl TimeoutScheduler {
    pub fn new(timer: Box<dyn IntervalTimer>) -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
            timer,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in firing order
    pub fn iter(&self) -> impl Iterator<Item = &TimeoutEntry> {
        self.entries.iter()
    }

    pub fn head(&self) -> Option<&TimeoutEntry> {
        self.entries.first()
    }

    /// Schedule a deadline `duration` from now.
    pub fn register(&mut self, pid: Option<Pid>, duration: Duration, command_line: &str) -> Result<()> {
        self.register_at(pid, duration, command_line, Instant::now())
    }

    pub(crate) fn register_at(
        &mut self,
        pid: Option<Pid>,
        duration: Duration,
        command_line: &str,
        now: Instant,
    ) -> Result<()> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(TimeoutEntry {
            seq,
            pid,
            duration,
            registered_at: now,
            command_line: command_line.to_string(),
        });
        self.entries.sort_by_key(|entry| entry.remaining(now));

        let head = &self.entries[0];
        if head.seq == seq {
            let remaining = head.remaining(now);
            debug!("Timeout for '{}' is the new head, arming for {:?}", command_line, remaining);
            self.timer
                .arm(remaining)
                .map_err(|e| ShellError::os("setitimer", e))?;
        }
        Ok(())
    }

    /// Remove and return every entry whose deadline has passed, head first.
    pub fn pop_expired(&mut self, now: Instant) -> Vec<TimeoutEntry> {
        let due = self
            .entries
            .iter()
            .take_while(|entry| entry.is_due(now))
            .count();
        self.entries.drain(..due).collect()
    }

    /// Arm the timer for the current head, or disarm it when nothing is pending.
    pub fn rearm(&mut self, now: Instant) -> Result<()> {
        match self.entries.first() {
            Some(head) => self.timer.arm(head.remaining(now)),
            None => self.timer.disarm(),
        }
        .map_err(|e| ShellError::os("setitimer", e))
    }
}

//! Reactions to ctrl-Z, ctrl-C and timer expiry.
//!
//! These run on the main control flow after the pending set has been drained,
//! never inside an OS signal handler.

use crate::config::types::ShellError;
use crate::core::shell::Shell;
use crate::kernel::signal::{self, ShellSignal};
use log::{debug, warn};
use nix::errno::Errno;
use std::io::{self, Write};
use std::time::Instant;

impl Shell {
    /// Process every signal recorded since the last drain.
    pub fn dispatch_pending_signals(&mut self) {
        let mut out = io::stdout();
        for sig in signal::take_pending() {
            if let Err(e) = self.handle_signal(sig, &mut out) {
                warn!("Failed to report {:?}: {}", sig, e);
            }
        }
        let _ = out.flush();
    }

    pub(crate) fn handle_signal(&mut self, sig: ShellSignal, out: &mut dyn Write) -> io::Result<()> {
        match sig {
            ShellSignal::Suspend => self.on_suspend(out),
            ShellSignal::Interrupt => self.on_interrupt(out),
            ShellSignal::Timer => self.on_timer(out),
        }
    }

    fn on_suspend(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "smash: got ctrl-Z")?;
        let Some(fg) = self.foreground.current().cloned() else {
            return Ok(());
        };

        if let Err(e) = self.control.signal_group(fg.pid, libc::SIGSTOP) {
            ShellError::os("kill", e).report();
            return Ok(());
        }
        self.record_stopped(fg.pid, &fg.command_line);
        self.foreground.clear();
        writeln!(out, "smash: process {} was stopped", fg.pid)
    }

    fn on_interrupt(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "smash: got ctrl-C")?;
        let Some(fg) = self.foreground.current().cloned() else {
            return Ok(());
        };

        if let Err(e) = self.control.signal_group(fg.pid, libc::SIGKILL) {
            ShellError::os("kill", e).report();
            return Ok(());
        }
        self.jobs.remove_by_pid(fg.pid);
        self.foreground.clear();
        writeln!(out, "smash: process {} was killed", fg.pid)
    }

    fn on_timer(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "smash: got an alarm")?;
        self.jobs.purge_finished(self.control.as_ref());

        let now = Instant::now();
        for entry in self.timeouts.pop_expired(now) {
            let Some(pid) = entry.pid() else {
                writeln!(out, "smash: {} timed out!", entry.command_line())?;
                continue;
            };
            match self.control.signal_group(pid, libc::SIGKILL) {
                Ok(()) => writeln!(out, "smash: {} timed out!", entry.command_line())?,
                Err(Errno::ESRCH) => {
                    debug!("Timeout for '{}' fired after pid {} exited", entry.command_line(), pid)
                }
                Err(e) => ShellError::os("kill", e).report(),
            }
        }

        if let Err(e) = self.timeouts.rearm(now) {
            e.report();
        }
        Ok(())
    }
}

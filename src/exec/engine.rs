use crate::command::{Command, CommandLine};
use crate::config::types::{Result, ShellError};
use crate::core::shell::{Flow, Shell};
use crate::exec::copy::copy_file;
use crate::exec::redirect::StdoutRedirect;
use crate::jobs::Job;
use crate::kernel::process::{exit_child, fork_process, new_process_group, wait_for_exit};
use crate::kernel::signal;
use log::{debug, info};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execv, setpgid, ForkResult, Pid};
use std::convert::Infallible;
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::Duration;

/// Deadline requested by a `timeout` prefix, carried to the wrapped command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeoutRequest {
    pub duration: Duration,
    /// Full line including the `timeout <secs>` prefix
    pub command_line: String,
}

/// How a foreground wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Exited, killed by a signal or killed by ctrl-C
    Finished,
    /// Stopped and now recorded in the job table
    Suspended,
    /// waitpid itself failed
    Failed,
}

impl Shell {
    /// Parse and run one input line.
    pub fn execute_line(&mut self, raw: &str) -> Flow {
        self.execute(raw, None)
    }

    fn execute(&mut self, raw: &str, timeout: Option<TimeoutRequest>) -> Flow {
        let Some(line) = CommandLine::parse(raw) else {
            return Flow::Continue;
        };
        self.jobs.purge_finished(self.control.as_ref());

        if let Command::Timeout { args, inner } = &line.command {
            return match parse_timeout(args) {
                Ok(duration) => {
                    let request = TimeoutRequest {
                        duration,
                        command_line: line.raw.clone(),
                    };
                    self.execute(inner, Some(request))
                }
                Err(e) => {
                    e.report();
                    Flow::Continue
                }
            };
        }

        if line.command.needs_process() {
            if let Err(e) = self.launch(&line, timeout.as_ref()) {
                e.report();
            }
            Flow::Continue
        } else {
            self.run_in_shell(&line, timeout.as_ref())
        }
    }

    fn run_in_shell(&mut self, line: &CommandLine, timeout: Option<&TimeoutRequest>) -> Flow {
        let guard = match line.redirection.as_ref().map(StdoutRedirect::apply).transpose() {
            Ok(guard) => guard,
            Err(e) => {
                e.report();
                return Flow::Continue;
            }
        };

        let flow = match self.run_builtin(&line.command, &mut io::stdout()) {
            Ok(flow) => flow,
            Err(e) => {
                e.report();
                Flow::Continue
            }
        };
        drop(guard);

        if let Some(request) = timeout {
            if let Err(e) = self
                .timeouts
                .register(None, request.duration, &request.command_line)
            {
                e.report();
            }
        }
        flow
    }

    /// Fork a process group for the command, then track it in the
    /// background or wait for it in the foreground.
    fn launch(&mut self, line: &CommandLine, timeout: Option<&TimeoutRequest>) -> Result<()> {
        let child = match fork_process()? {
            ForkResult::Child => self.run_forked(line),
            ForkResult::Parent { child } => child,
        };
        // Either side may win the race to create the group.
        let _ = setpgid(child, child);
        debug!("Forked pid {} for '{}'", child, line.raw);

        let command_line = timeout.map_or(line.raw.as_str(), |t| t.command_line.as_str());
        if let Some(request) = timeout {
            if let Err(e) = self.timeouts.register(Some(child), request.duration, command_line) {
                e.report();
            }
        }

        if line.background {
            self.jobs
                .add(self.control.as_ref(), command_line, child, false);
        } else {
            self.wait_foreground(child, command_line);
        }
        Ok(())
    }

    fn run_forked(&mut self, line: &CommandLine) -> ! {
        signal::restore_default_handlers();
        if let Err(e) = new_process_group(Pid::from_raw(0)) {
            e.report();
            exit_child(0);
        }
        if let Some(redirection) = &line.redirection {
            match StdoutRedirect::apply(redirection) {
                Ok(guard) => guard.persist(),
                Err(e) => {
                    e.report();
                    exit_child(0);
                }
            }
        }
        self.execute_in_child(&line.command)
    }

    /// Run `command` in an already set-up child process and exit.
    pub(crate) fn execute_in_child(&mut self, command: &Command) -> ! {
        match command {
            Command::External { line } => {
                let Err(e) = exec_external(&self.config.shell_path, line);
                e.report();
            }
            Command::Copy { args } => {
                if let Err(e) = copy_file(args, self.config.copy_buffer_size, &mut io::stdout()) {
                    e.report();
                }
            }
            Command::Pipe(pipeline) => self.run_pipeline(pipeline),
            Command::Timeout { args, inner } => {
                // No deadline inside a pipeline side; the wrapped command still runs.
                match parse_timeout(args) {
                    Ok(_) => self.execute_wrapped_in_child(inner),
                    Err(e) => e.report(),
                }
            }
            builtin => {
                if let Err(e) = self.run_builtin(builtin, &mut io::stdout()) {
                    e.report();
                }
            }
        }
        exit_child(0)
    }

    fn execute_wrapped_in_child(&mut self, inner: &str) {
        let Some(line) = CommandLine::parse(inner) else {
            return;
        };
        if let Some(redirection) = &line.redirection {
            match StdoutRedirect::apply(redirection) {
                Ok(guard) => guard.persist(),
                Err(e) => return e.report(),
            }
        }
        self.execute_in_child(&line.command)
    }

    /// Block on a foreground child until it exits, is stopped, or a signal
    /// handler takes it out of the foreground slot.
    pub(crate) fn wait_foreground(&mut self, pid: Pid, command_line: &str) -> WaitOutcome {
        self.foreground.occupy(pid, command_line);
        loop {
            // A signal landing between this check and waitpid entering the
            // kernel is only seen once the child changes state.
            if signal::has_pending() {
                self.dispatch_pending_signals();
                if !self.foreground.is_held_by(pid) {
                    return self.released_outcome(pid);
                }
            }

            match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
                Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => {
                    self.foreground.clear();
                    return WaitOutcome::Finished;
                }
                Ok(WaitStatus::Stopped(..)) => {
                    self.dispatch_pending_signals();
                    if self.foreground.is_held_by(pid) {
                        info!("Foreground pid {} was stopped from outside the shell", pid);
                        self.record_stopped(pid, command_line);
                        self.foreground.clear();
                        return WaitOutcome::Suspended;
                    }
                    return self.released_outcome(pid);
                }
                Ok(status) => debug!("pid {} reported {:?}, still waiting", pid, status),
                Err(Errno::EINTR) => {
                    self.dispatch_pending_signals();
                    if !self.foreground.is_held_by(pid) {
                        return self.released_outcome(pid);
                    }
                }
                Err(e) => {
                    ShellError::os("waitpid", e).report();
                    self.foreground.clear();
                    return WaitOutcome::Failed;
                }
            }
        }
    }

    /// A handler took `pid` out of the foreground: it was either stopped into
    /// the table or killed, in which case its status is collected here.
    fn released_outcome(&self, pid: Pid) -> WaitOutcome {
        if self.jobs.find_by_pid(pid).map_or(false, Job::is_stopped) {
            return WaitOutcome::Suspended;
        }
        if let Err(e) = wait_for_exit(pid) {
            debug!("Could not collect killed pid {}: {}", pid, e);
        }
        WaitOutcome::Finished
    }
}

/// `timeout` needs a duration and a command; the duration is a positive
/// number of seconds.
fn parse_timeout(args: &[String]) -> Result<Duration> {
    let invalid = ShellError::InvalidArguments { command: "timeout" };
    if args.len() < 2 {
        return Err(invalid);
    }
    match args[0].parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(invalid),
    }
}

/// Replace the process image with `<shell> -c <line>`.
fn exec_external(shell_path: &Path, line: &str) -> Result<Infallible> {
    let to_cstring =
        |bytes: &[u8]| CString::new(bytes).map_err(|_| ShellError::os("execv", Errno::EINVAL));
    let path = to_cstring(shell_path.as_os_str().as_bytes())?;
    let argv = [path.clone(), to_cstring(&b"-c"[..])?, to_cstring(line.as_bytes())?];
    debug!("execv {:?} -c {:?}", shell_path, line);
    execv(&path, &argv).map_err(|e| ShellError::os("execv", e))
}

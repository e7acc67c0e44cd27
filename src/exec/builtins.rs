//! Built-in commands run inside the shell process.
//!
//! - `chprompt`, `showpid`, `pwd`, `cd`: shell state
//! - `jobs`, `kill`, `fg`, `bg`: job control over the [`JobTable`](crate::jobs::JobTable)
//! - `quit`: leave, optionally killing every tracked job

use crate::command::Command;
use crate::config::types::{Result, ShellError};
use crate::core::shell::{Flow, Shell};
use crate::exec::engine::WaitOutcome;
use log::debug;
use nix::unistd::Pid;
use std::env;
use std::io::Write;

impl Shell {
    /// Run a command that does not need its own process.
    pub(crate) fn run_builtin(&mut self, command: &Command, out: &mut dyn Write) -> Result<Flow> {
        match command {
            Command::ChangePrompt { args } => self.change_prompt(args),
            Command::ShowPid => writeln!(out, "smash pid is {}", self.shell_pid)?,
            Command::Pwd => {
                let cwd = env::current_dir().map_err(|e| ShellError::io("getcwd", &e))?;
                writeln!(out, "{}", cwd.display())?;
            }
            Command::ChangeDir { args } => self.change_dir(args)?,
            Command::Jobs => self.jobs.list(self.control.as_ref(), out)?,
            Command::Kill { args } => self.kill_job(args, out)?,
            Command::Foreground { args } => self.foreground_job(args, out)?,
            Command::Background { args } => self.background_job(args, out)?,
            Command::Quit { args } => {
                if args.iter().any(|arg| arg == "kill") {
                    self.jobs.kill_all(self.control.as_ref(), out)?;
                }
                return Ok(Flow::Quit);
            }
            other => debug!("{:?} is not a built-in, ignoring", other),
        }
        Ok(Flow::Continue)
    }

    fn change_prompt(&mut self, args: &[String]) {
        self.prompt = match args.first() {
            Some(prompt) => prompt.clone(),
            None => self.config.prompt.clone(),
        };
    }

    fn change_dir(&mut self, args: &[String]) -> Result<()> {
        let target = match args {
            [] => return Ok(()),
            [target] => target,
            _ => return Err(ShellError::TooManyArguments),
        };

        let destination = if target == "-" {
            self.last_pwd.clone().ok_or(ShellError::OldPwdNotSet)?
        } else {
            target.into()
        };

        let current = env::current_dir().map_err(|e| ShellError::io("getcwd", &e))?;
        env::set_current_dir(&destination).map_err(|e| ShellError::io("chdir", &e))?;
        self.last_pwd = Some(current);
        Ok(())
    }

    fn kill_job(&mut self, args: &[String], out: &mut dyn Write) -> Result<()> {
        let invalid = ShellError::InvalidArguments { command: "kill" };
        let [signal, job_id] = args else {
            return Err(invalid);
        };
        let Some(signum) = signal
            .strip_prefix('-')
            .and_then(|n| n.parse::<libc::c_int>().ok())
        else {
            return Err(invalid);
        };
        let job_id = parse_job_id(job_id, "kill")?;

        let pid = self.lookup_job("kill", job_id)?;
        self.control
            .signal_group(pid, signum)
            .map_err(|e| ShellError::os("kill", e))?;
        writeln!(out, "signal number {} was sent to pid {}", signum, pid)?;

        if let Some(job) = self.jobs.find_by_pid_mut(pid) {
            match signum {
                libc::SIGSTOP | libc::SIGTSTP => job.stop(),
                libc::SIGCONT => job.resume(),
                _ => {}
            }
        }
        Ok(())
    }

    fn foreground_job(&mut self, args: &[String], out: &mut dyn Write) -> Result<()> {
        let pid = match args {
            [] => self
                .jobs
                .last()
                .map(|job| job.pid())
                .ok_or(ShellError::EmptyJobList { command: "fg" })?,
            [job_id] => {
                let job_id = parse_job_id(job_id, "fg")?;
                self.lookup_job("fg", job_id)?
            }
            _ => return Err(ShellError::InvalidArguments { command: "fg" }),
        };
        let command_line = self.resume_job(pid, out)?;

        match self.wait_foreground(pid, &command_line) {
            WaitOutcome::Suspended => {}
            WaitOutcome::Finished | WaitOutcome::Failed => {
                self.jobs.remove_by_pid(pid);
            }
        }
        Ok(())
    }

    fn background_job(&mut self, args: &[String], out: &mut dyn Write) -> Result<()> {
        let pid = match args {
            [] => self
                .jobs
                .last_stopped()
                .map(|job| job.pid())
                .ok_or(ShellError::NoStoppedJobs)?,
            [job_id] => {
                let job_id = parse_job_id(job_id, "bg")?;
                let pid = self.lookup_job("bg", job_id)?;
                match self.jobs.find_by_pid(pid) {
                    Some(job) if !job.is_stopped() => {
                        return Err(ShellError::AlreadyRunning { job_id: job.id() })
                    }
                    _ => pid,
                }
            }
            _ => return Err(ShellError::InvalidArguments { command: "bg" }),
        };
        self.resume_job(pid, out)?;
        Ok(())
    }

    /// Print `<cmd> : <pid>`, continue the group and mark the job running.
    fn resume_job(&mut self, pid: Pid, out: &mut dyn Write) -> Result<String> {
        let command_line = self
            .jobs
            .find_by_pid(pid)
            .map(|job| job.command_line().to_string())
            .unwrap_or_default();
        writeln!(out, "{} : {}", command_line, pid)?;
        out.flush()?;

        self.control
            .signal_group(pid, libc::SIGCONT)
            .map_err(|e| ShellError::os("kill", e))?;
        if let Some(job) = self.jobs.find_by_pid_mut(pid) {
            job.resume();
        }
        Ok(command_line)
    }

    fn lookup_job(&self, command: &'static str, job_id: i64) -> Result<Pid> {
        u32::try_from(job_id)
            .ok()
            .and_then(|id| self.jobs.get(id))
            .map(|job| job.pid())
            .ok_or(ShellError::JobNotFound { command, job_id })
    }
}

fn parse_job_id(text: &str, command: &'static str) -> Result<i64> {
    text.parse()
        .map_err(|_| ShellError::InvalidArguments { command })
}

/// Core types shared across the shell: configuration and the error taxonomy
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Prompt text used when none has been configured or `chprompt` resets it.
pub const DEFAULT_PROMPT: &str = "smash";

/// Interpreter used to run external commands.
pub const DEFAULT_SHELL_PATH: &str = "/bin/bash";

/// Chunk size of the `cp` built-in copy loop.
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 4096;

/// Shell configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt text printed before each command as `<prompt>> `
    pub prompt: String,
    /// Interpreter invoked as `<shell_path> -c <command>` for external commands
    pub shell_path: PathBuf,
    /// Buffer size used by the `cp` built-in
    pub copy_buffer_size: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            shell_path: PathBuf::from(DEFAULT_SHELL_PATH),
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
        }
    }
}

/// Error types for the shell
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("{command}: invalid arguments")]
    InvalidArguments { command: &'static str },

    #[error("{command}: job-id {job_id} does not exist")]
    JobNotFound { command: &'static str, job_id: i64 },

    #[error("{command}: jobs list is empty")]
    EmptyJobList { command: &'static str },

    #[error("bg: there is no stopped jobs to resume")]
    NoStoppedJobs,

    #[error("bg: job-id {job_id} is already running in the background")]
    AlreadyRunning { job_id: u32 },

    #[error("cd: too many arguments")]
    TooManyArguments,

    #[error("cd: OLDPWD not set")]
    OldPwdNotSet,

    /// A failed OS call, rendered like `perror` would
    #[error("{call} failed: {}", .errno.desc())]
    Os { call: &'static str, errno: Errno },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    pub fn os(call: &'static str, errno: Errno) -> Self {
        ShellError::Os { call, errno }
    }

    /// Map a std I/O failure onto the OS call that produced it.
    pub fn io(call: &'static str, err: &std::io::Error) -> Self {
        let errno = err
            .raw_os_error()
            .map(Errno::from_i32)
            .unwrap_or(Errno::UnknownErrno);
        ShellError::Os { call, errno }
    }

    /// Print the error the way every user-facing failure is reported.
    pub fn report(&self) {
        eprintln!("smash error: {}", self);
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;

use crate::config::loader::ConfigOverrides;
use crate::config::types::ShellConfig;
use crate::config::validator::validate_config;
use crate::core::{Flow, Shell};
use crate::kernel::process::flush_stdout;
use crate::kernel::signal;
use crate::utils::LineReader;
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "smash: a small job-control shell", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Prompt text, printed as `<TEXT>> `
    #[arg(long, value_name = "TEXT")]
    prompt: Option<String>,
    /// Interpreter used for external commands (`<PATH> -c <line>`)
    #[arg(long = "shell", value_name = "PATH")]
    shell_path: Option<PathBuf>,
    /// Run a single command line and exit
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    command: Option<String>,
}

pub fn run() -> Result<()> {
    // Diagnostics go to stderr and stay off unless RUST_LOG asks for them
    env_logger::init();

    let cli = Cli::parse();
    let config = ShellConfig::resolve(
        cli.config.as_deref(),
        ConfigOverrides {
            prompt: cli.prompt,
            shell_path: cli.shell_path,
        },
    )?;
    let validation = validate_config(&config)?;
    for warning in validation.warnings {
        warn!("Configuration warning: {}", warning);
    }

    signal::install_handlers()?;
    let mut shell = Shell::new(config);
    info!("smash started with pid {}", std::process::id());

    if let Some(line) = cli.command {
        shell.execute_line(&line);
        shell.dispatch_pending_signals();
        return Ok(());
    }
    interactive_loop(&mut shell)
}

/// Prompt, read, execute until `quit` or end of input.
fn interactive_loop(shell: &mut Shell) -> Result<()> {
    let mut reader = LineReader::stdin();
    loop {
        shell.dispatch_pending_signals();
        print!("{}> ", shell.prompt());
        flush_stdout();

        // Same window as the foreground wait: a signal arriving between the
        // dispatch above and the read is handled after the next line.
        let line = reader
            .read_line(|| shell.dispatch_pending_signals())
            .context("failed to read command input")?;
        let Some(line) = line else {
            info!("End of input, leaving");
            return Ok(());
        };

        if shell.execute_line(&line) == Flow::Quit {
            return Ok(());
        }
    }
}

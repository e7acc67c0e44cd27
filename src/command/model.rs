//! Parsed command variants.
//!
//! Every line maps onto exactly one [`Command`]. Redirection and pipes are
//! structural: a line is split at the first `>` and then at the first `|`,
//! with no regard for quoting, so an operator inside an argument is still
//! treated as an operator.

use super::parse::{is_background, skip_tokens, strip_background, tokenize, trim};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`: create or truncate
    Truncate,
    /// `>>`: create or append
    Append,
}

/// Standard output of a command routed to a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirection {
    pub target: PathBuf,
    pub mode: RedirectMode,
}

/// Which stream of the left side feeds the pipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipeStream {
    /// `|`
    Stdout,
    /// `|&`
    Stderr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pipeline {
    pub left: Box<Command>,
    pub right: Box<Command>,
    pub stream: PipeStream,
}

/// One parsed command. Built-in arguments exclude the command name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    ChangePrompt { args: Vec<String> },
    ShowPid,
    Pwd,
    ChangeDir { args: Vec<String> },
    Jobs,
    Kill { args: Vec<String> },
    Foreground { args: Vec<String> },
    Background { args: Vec<String> },
    Quit { args: Vec<String> },
    /// `timeout <secs> <command...>`; `inner` is the raw text after the duration.
    Timeout { args: Vec<String>, inner: String },
    Copy { args: Vec<String> },
    External { line: String },
    Pipe(Pipeline),
}

impl Command {
    /// Parse command text that no longer carries a trailing `&` or a redirection.
    pub fn from_text(text: &str) -> Option<Command> {
        let text = trim(text);
        let mut tokens = tokenize(text);
        if tokens.is_empty() {
            return None;
        }

        if tokens[0] == "timeout" {
            return Some(Command::Timeout {
                args: tokens.split_off(1),
                inner: skip_tokens(text, 2).to_string(),
            });
        }

        if let Some(idx) = text.find('|') {
            let left = &text[..idx];
            let rest = &text[idx + 1..];
            let (stream, right) = match rest.strip_prefix('&') {
                Some(right) => (PipeStream::Stderr, right),
                None => (PipeStream::Stdout, rest),
            };
            return Some(Command::Pipe(Pipeline {
                left: Box::new(Self::side(left)),
                right: Box::new(Self::side(right)),
                stream,
            }));
        }

        let args = tokens.split_off(1);
        let command = match tokens[0].as_str() {
            "chprompt" => Command::ChangePrompt { args },
            "showpid" => Command::ShowPid,
            "pwd" => Command::Pwd,
            "cd" => Command::ChangeDir { args },
            "jobs" => Command::Jobs,
            "kill" => Command::Kill { args },
            "fg" => Command::Foreground { args },
            "bg" => Command::Background { args },
            "quit" => Command::Quit { args },
            "cp" => Command::Copy { args },
            _ => Command::External {
                line: text.to_string(),
            },
        };
        Some(command)
    }

    fn side(text: &str) -> Command {
        // A blank pipeline side runs as an empty external command.
        Self::from_text(text).unwrap_or(Command::External {
            line: String::new(),
        })
    }

    /// Commands realized as a new process (and process group).
    pub fn needs_process(&self) -> bool {
        matches!(
            self,
            Command::External { .. } | Command::Copy { .. } | Command::Pipe(_)
        )
    }
}

/// A full input line: the command plus its structural wrappers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    /// Text exactly as typed, used for job listings
    pub raw: String,
    pub background: bool,
    pub redirection: Option<Redirection>,
    pub command: Command,
}

impl CommandLine {
    /// Parse a line. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<CommandLine> {
        let tokens = tokenize(raw);
        let first = tokens.first()?;

        // The remainder of a timeout line is dispatched again on its own,
        // so its `&` and redirection belong to the inner command.
        if first == "timeout" {
            return Some(CommandLine {
                raw: raw.to_string(),
                background: false,
                redirection: None,
                command: Command::Timeout {
                    args: tokens[1..].to_vec(),
                    inner: skip_tokens(raw, 2).to_string(),
                },
            });
        }

        let background = is_background(raw);
        let (body, redirection) = split_redirection(strip_background(raw));
        let command = Command::from_text(body)?;

        Some(CommandLine {
            raw: raw.to_string(),
            background,
            redirection,
            command,
        })
    }
}

fn split_redirection(line: &str) -> (&str, Option<Redirection>) {
    let Some(idx) = line.find('>') else {
        return (line, None);
    };

    let rest = &line[idx + 1..];
    let (mode, target) = match rest.strip_prefix('>') {
        Some(target) => (RedirectMode::Append, target),
        None => (RedirectMode::Truncate, rest),
    };

    let redirection = Redirection {
        target: PathBuf::from(trim(target)),
        mode,
    };
    (&line[..idx], Some(redirection))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external(line: &str) -> Command {
        Command::External {
            line: line.to_string(),
        }
    }

    #[test]
    fn test_blank_line_is_none() {
        assert!(CommandLine::parse("   ").is_none());
        assert!(CommandLine::parse("&").is_none());
    }

    #[test]
    fn test_builtins_are_recognized() {
        let line = CommandLine::parse("kill -9 2").unwrap();
        assert_eq!(
            line.command,
            Command::Kill {
                args: vec!["-9".to_string(), "2".to_string()]
            }
        );
        assert!(!line.command.needs_process());

        let line = CommandLine::parse("jobs&").unwrap();
        assert_eq!(line.command, Command::Jobs);
        assert!(line.background);
    }

    #[test]
    fn test_external_strips_background_sign() {
        let line = CommandLine::parse("sleep 10 &").unwrap();
        assert!(line.background);
        assert_eq!(line.command, external("sleep 10"));
        assert_eq!(line.raw, "sleep 10 &");
        assert!(line.command.needs_process());
    }

    #[test]
    fn test_redirection_split_at_first_operator() {
        let line = CommandLine::parse("echo a > out.txt").unwrap();
        assert_eq!(line.command, external("echo a"));
        assert_eq!(
            line.redirection,
            Some(Redirection {
                target: PathBuf::from("out.txt"),
                mode: RedirectMode::Truncate,
            })
        );

        let line = CommandLine::parse("echo a >> out.txt &").unwrap();
        assert!(line.background);
        assert_eq!(line.redirection.unwrap().mode, RedirectMode::Append);
    }

    #[test]
    fn test_operator_inside_argument_is_still_structural() {
        let line = CommandLine::parse("echo 'a>b'").unwrap();
        assert_eq!(line.command, external("echo 'a"));
        assert_eq!(line.redirection.unwrap().target, PathBuf::from("b'"));
    }

    #[test]
    fn test_pipe_variants() {
        let line = CommandLine::parse("ls -l | wc -l").unwrap();
        match line.command {
            Command::Pipe(pipeline) => {
                assert_eq!(*pipeline.left, external("ls -l"));
                assert_eq!(*pipeline.right, external("wc -l"));
                assert_eq!(pipeline.stream, PipeStream::Stdout);
            }
            other => panic!("expected pipe, got {:?}", other),
        }

        let line = CommandLine::parse("make |& grep error").unwrap();
        match line.command {
            Command::Pipe(pipeline) => {
                assert_eq!(pipeline.stream, PipeStream::Stderr);
                assert_eq!(*pipeline.right, external("grep error"));
            }
            other => panic!("expected pipe, got {:?}", other),
        }
    }

    #[test]
    fn test_pipe_right_side_nests() {
        let line = CommandLine::parse("a | b | c").unwrap();
        let Command::Pipe(outer) = line.command else {
            panic!("expected pipe");
        };
        assert!(matches!(*outer.right, Command::Pipe(_)));
    }

    #[test]
    fn test_pipe_with_builtin_side_and_redirection() {
        let line = CommandLine::parse("jobs | grep sleep > list.txt").unwrap();
        assert!(line.redirection.is_some());
        let Command::Pipe(pipeline) = line.command else {
            panic!("expected pipe");
        };
        assert_eq!(*pipeline.left, Command::Jobs);
        assert_eq!(*pipeline.right, external("grep sleep"));
    }

    #[test]
    fn test_timeout_keeps_raw_inner_line() {
        let line = CommandLine::parse("timeout 3 sleep 10 > out &").unwrap();
        assert!(!line.background);
        assert!(line.redirection.is_none());
        assert_eq!(
            line.command,
            Command::Timeout {
                args: vec![
                    "3".to_string(),
                    "sleep".to_string(),
                    "10".to_string(),
                    ">".to_string(),
                    "out".to_string(),
                    "&".to_string()
                ],
                inner: "sleep 10 > out &".to_string(),
            }
        );
    }

    #[test]
    fn test_copy_needs_process() {
        let line = CommandLine::parse("cp a b").unwrap();
        assert!(line.command.needs_process());
    }
}

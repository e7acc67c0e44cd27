//! The `cp` built-in: a buffered file copy run in a forked child.

use crate::config::types::{Result, ShellError};
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Copy `args[0]` to `args[1]` through a `buffer_size` chunk buffer, then
/// print the success line to `out`.
pub fn copy_file(args: &[String], buffer_size: usize, out: &mut dyn Write) -> Result<()> {
    let [source, destination] = args else {
        return Err(ShellError::InvalidArguments { command: "cp" });
    };

    let mut input = File::open(source).map_err(|e| ShellError::io("open", &e))?;

    if same_file(Path::new(source), Path::new(destination))? {
        debug!("cp: {} and {} resolve to the same file", source, destination);
    } else {
        let mut output = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o666)
            .open(destination)
            .map_err(|e| ShellError::io("open", &e))?;
        copy_chunks(&mut input, &mut output, buffer_size.max(1))?;
    }

    writeln!(out, "smash: {} was copied to {}", source, destination)?;
    Ok(())
}

/// Both paths resolve to one file. A destination that does not exist yet is
/// never the same file.
fn same_file(source: &Path, destination: &Path) -> Result<bool> {
    let source = fs::canonicalize(source).map_err(|e| ShellError::io("realpath", &e))?;
    match fs::canonicalize(destination) {
        Ok(destination) => Ok(source == destination),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ShellError::io("realpath", &e)),
    }
}

fn copy_chunks(input: &mut dyn Read, output: &mut dyn Write, buffer_size: usize) -> Result<()> {
    let mut buf = vec![0u8; buffer_size];
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ShellError::io("read", &e)),
        };
        // write_all keeps writing until the chunk is fully flushed
        output
            .write_all(&buf[..n])
            .map_err(|e| ShellError::io("write", &e))?;
    }
}

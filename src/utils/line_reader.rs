/// Line input that lets signals through
/// std's buffered readers retry `EINTR` internally, which would hold ctrl-C
/// and ctrl-Z until the user pressed enter, so this reads the raw descriptor.
use crate::kernel::process::read_fd;
use log::debug;
use nix::errno::Errno;
use std::io;
use std::os::unix::io::RawFd;

const READ_CHUNK: usize = 1024;

pub struct LineReader {
    fd: RawFd,
    buffered: Vec<u8>,
}

impl LineReader {
    pub fn new(fd: RawFd) -> Self {
        Self {
            fd,
            buffered: Vec::new(),
        }
    }

    pub fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }

    /// Read the next line without its newline. `on_interrupt` runs every
    /// time the read is interrupted by a signal. Returns `None` at end of
    /// input; a final line without a newline is still returned.
    pub fn read_line(&mut self, mut on_interrupt: impl FnMut()) -> io::Result<Option<String>> {
        loop {
            if let Some(pos) = self.buffered.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buffered.drain(..=pos).collect();
                return Ok(Some(decode(&line[..pos])));
            }

            let mut chunk = [0u8; READ_CHUNK];
            match read_fd(self.fd, &mut chunk) {
                Ok(0) => {
                    if self.buffered.is_empty() {
                        return Ok(None);
                    }
                    let line = std::mem::take(&mut self.buffered);
                    return Ok(Some(decode(&line)));
                }
                Ok(n) => self.buffered.extend_from_slice(&chunk[..n]),
                Err(Errno::EINTR) => {
                    debug!("Input read interrupted by a signal");
                    on_interrupt();
                }
                Err(e) => return Err(io::Error::from(e)),
            }
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::process::{close_fd, create_pipe};
    use crate::kernel::signal::{self, ShellSignal};
    use serial_test::serial;
    use std::io::Write;
    use std::os::unix::io::FromRawFd;
    use std::time::Duration;

    fn reader_over(input: &[u8]) -> LineReader {
        let (read_end, write_end) = create_pipe().unwrap();
        let mut writer = unsafe { std::fs::File::from_raw_fd(write_end) };
        writer.write_all(input).unwrap();
        drop(writer);
        LineReader::new(read_end)
    }

    #[test]
    fn test_splits_lines_and_keeps_unterminated_tail() {
        let mut reader = reader_over(b"jobs\nsleep 5 &\nquit");
        let mut interrupts = 0;

        assert_eq!(reader.read_line(|| interrupts += 1).unwrap().as_deref(), Some("jobs"));
        assert_eq!(reader.read_line(|| interrupts += 1).unwrap().as_deref(), Some("sleep 5 &"));
        assert_eq!(reader.read_line(|| interrupts += 1).unwrap().as_deref(), Some("quit"));
        assert_eq!(reader.read_line(|| interrupts += 1).unwrap(), None);
        assert_eq!(interrupts, 0);
        let _ = close_fd(reader.fd);
    }

    #[test]
    #[serial(pending_signals)]
    fn test_interrupted_read_runs_callback_and_resumes() {
        signal::install_handlers().unwrap();
        let _ = signal::take_pending();
        let (read_end, write_end) = create_pipe().unwrap();
        let mut writer = Some(unsafe { std::fs::File::from_raw_fd(write_end) });

        let target = unsafe { libc::pthread_self() };
        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            unsafe { libc::pthread_kill(target, libc::SIGINT) };
        });

        let mut reader = LineReader::new(read_end);
        let mut interrupts = 0;
        let line = reader
            .read_line(|| {
                interrupts += 1;
                if let Some(mut writer) = writer.take() {
                    writer.write_all(b"fg\n").unwrap();
                }
            })
            .unwrap();
        sender.join().unwrap();

        assert_eq!(line.as_deref(), Some("fg"));
        assert_eq!(interrupts, 1);
        assert_eq!(signal::take_pending(), vec![ShellSignal::Interrupt]);
        let _ = close_fd(read_end);
    }

    #[test]
    fn test_empty_lines_are_returned() {
        let mut reader = reader_over(b"\n\npwd\n");
        assert_eq!(reader.read_line(|| {}).unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_line(|| {}).unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_line(|| {}).unwrap().as_deref(), Some("pwd"));
        assert_eq!(reader.read_line(|| {}).unwrap(), None);
        let _ = close_fd(reader.fd);
    }
}

use crate::command::{Command, PipeStream, Pipeline};
use crate::config::types::Result;
use crate::core::shell::Shell;
use crate::kernel::process::{
    close_fd, create_pipe, exit_child, fork_process, redirect, wait_for_exit,
};
use log::debug;
use nix::unistd::{ForkResult, Pid};
use std::os::unix::io::RawFd;

impl Shell {
    /// Run both sides of a pipeline as children of the calling process and
    /// wait for each of them.
    ///
    /// Called inside the already-grouped child, so the sides stay in the
    /// same process group. A failure only aborts the side it belongs to.
    pub(crate) fn run_pipeline(&mut self, pipeline: &Pipeline) {
        let (read_end, write_end) = match create_pipe() {
            Ok(ends) => ends,
            Err(e) => return e.report(),
        };

        let writer_fd = match pipeline.stream {
            PipeStream::Stdout => libc::STDOUT_FILENO,
            PipeStream::Stderr => libc::STDERR_FILENO,
        };
        let left = self.spawn_side(&pipeline.left, write_end, writer_fd, (read_end, write_end));
        let right = self.spawn_side(
            &pipeline.right,
            read_end,
            libc::STDIN_FILENO,
            (read_end, write_end),
        );

        let _ = close_fd(read_end);
        let _ = close_fd(write_end);

        for pid in [left, right].into_iter().flatten() {
            match wait_for_exit(pid) {
                Ok(status) => debug!("Pipeline side {} finished: {:?}", pid, status),
                Err(e) => e.report(),
            }
        }
    }

    /// Fork one side with `source` installed on `target`. Returns `None`
    /// when the fork failed.
    fn spawn_side(
        &mut self,
        command: &Command,
        source: RawFd,
        target: RawFd,
        ends: (RawFd, RawFd),
    ) -> Option<Pid> {
        match fork_process() {
            Ok(ForkResult::Child) => {
                if let Err(e) = connect(source, target, ends) {
                    e.report();
                    exit_child(0);
                }
                self.execute_in_child(command)
            }
            Ok(ForkResult::Parent { child }) => Some(child),
            Err(e) => {
                e.report();
                None
            }
        }
    }
}

fn connect(source: RawFd, target: RawFd, (read_end, write_end): (RawFd, RawFd)) -> Result<()> {
    redirect(source, target)?;
    close_fd(read_end)?;
    close_fd(write_end)
}

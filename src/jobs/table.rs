use crate::kernel::process::{ChildState, ProcessControl};
use log::{debug, info};
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use std::io::{self, Write};
use std::time::Instant;

use crate::config::types::ShellError;

/// One background or stopped job.
#[derive(Clone, Debug)]
pub struct Job {
    id: u32,
    pid: Pid,
    command_line: String,
    stopped: bool,
    inserted_at: Instant,
}

impl Job {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Process-group leader of the job
    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Mark the job stopped and restart its elapsed-time clock.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.inserted_at = Instant::now();
    }

    pub fn resume(&mut self) {
        self.stopped = false;
    }

    pub fn seconds_elapsed(&self) -> u64 {
        self.inserted_at.elapsed().as_secs()
    }
}

/// Background and stopped jobs, kept in ascending id order.
///
/// Ids are assigned as the highest id present plus one, and new jobs are
/// appended, so insertion order and id order always agree.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Purge finished jobs, then append a new one. Returns its id.
    pub fn add(
        &mut self,
        control: &dyn ProcessControl,
        command_line: &str,
        pid: Pid,
        stopped: bool,
    ) -> u32 {
        self.purge_finished(control);
        let id = self.jobs.last().map_or(1, |job| job.id + 1);
        self.jobs.push(Job {
            id,
            pid,
            command_line: command_line.to_string(),
            stopped,
            inserted_at: Instant::now(),
        });
        info!("Job [{}] added: pid {} stopped={}", id, pid, stopped);
        id
    }

    pub fn remove_by_pid(&mut self, pid: Pid) -> Option<Job> {
        let idx = self.jobs.iter().position(|job| job.pid == pid)?;
        Some(self.jobs.remove(idx))
    }

    pub fn get(&self, id: u32) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| job.id == id)
    }

    pub fn find_by_pid(&self, pid: Pid) -> Option<&Job> {
        self.jobs.iter().find(|job| job.pid == pid)
    }

    pub fn find_by_pid_mut(&mut self, pid: Pid) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| job.pid == pid)
    }

    /// Job with the highest id
    pub fn last(&self) -> Option<&Job> {
        self.jobs.last()
    }

    /// Most recently inserted stopped job
    pub fn last_stopped(&self) -> Option<&Job> {
        self.jobs.iter().rev().find(|job| job.stopped)
    }

    /// Drop every job whose process has exited, collecting its status.
    pub fn purge_finished(&mut self, control: &dyn ProcessControl) {
        self.jobs.retain(|job| match control.poll_child(job.pid) {
            Ok(ChildState::Finished) => {
                debug!("Job [{}] pid {} finished", job.id, job.pid);
                false
            }
            Ok(ChildState::Alive) => true,
            Ok(ChildState::NotAChild) => {
                debug!("Job [{}] pid {} is not a child of this process", job.id, job.pid);
                true
            }
            Err(e) => {
                ShellError::os("waitpid", e).report();
                true
            }
        });
    }

    /// Report and SIGKILL every job, then empty the table.
    pub fn kill_all(&mut self, control: &dyn ProcessControl, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "smash: sending SIGKILL signal to {} jobs:", self.jobs.len())?;
        for job in &self.jobs {
            writeln!(out, "{}: {}", job.pid, job.command_line)?;
        }
        for job in &self.jobs {
            if let Err(e) = control.signal_group(job.pid, Signal::SIGKILL as libc::c_int) {
                ShellError::os("kill", e).report();
            }
        }
        self.jobs.clear();
        Ok(())
    }

    /// Purge finished jobs, then print the rest as `[id] cmd : pid secs secs`.
    pub fn list(&mut self, control: &dyn ProcessControl, out: &mut dyn Write) -> io::Result<()> {
        self.purge_finished(control);
        for job in &self.jobs {
            write!(
                out,
                "[{}] {} : {} {} secs",
                job.id,
                job.command_line,
                job.pid,
                job.seconds_elapsed()
            )?;
            if job.stopped {
                write!(out, " (stopped)")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingControl;

    fn pid(raw: i32) -> Pid {
        Pid::from_raw(raw)
    }

    #[test]
    fn test_ids_follow_highest_present_id() {
        let control = RecordingControl::default();
        let mut table = JobTable::new();

        assert_eq!(table.add(&control, "sleep 1 &", pid(100), false), 1);
        assert_eq!(table.add(&control, "sleep 2 &", pid(101), false), 2);
        assert_eq!(table.add(&control, "sleep 3 &", pid(102), false), 3);

        // Removing a middle job does not disturb the next id.
        table.remove_by_pid(pid(101));
        assert_eq!(table.add(&control, "sleep 4 &", pid(103), false), 4);

        let ids: Vec<u32> = table.iter().map(Job::id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_add_purges_finished_jobs_first() {
        let control = RecordingControl::default();
        let mut table = JobTable::new();
        table.add(&control, "a &", pid(10), false);
        table.add(&control, "b &", pid(11), false);

        control.finish(pid(11));
        assert_eq!(table.add(&control, "c &", pid(12), false), 2);
        assert!(table.find_by_pid(pid(11)).is_none());
    }

    #[test]
    fn test_last_and_last_stopped() {
        let control = RecordingControl::default();
        let mut table = JobTable::new();
        assert!(table.last().is_none());
        assert!(table.last_stopped().is_none());

        table.add(&control, "a", pid(10), true);
        table.add(&control, "b", pid(11), true);
        table.add(&control, "c &", pid(12), false);

        assert_eq!(table.last().unwrap().id(), 3);
        assert_eq!(table.last_stopped().unwrap().id(), 2);
    }

    #[test]
    fn test_list_skips_exited_and_marks_stopped() {
        let control = RecordingControl::default();
        let mut table = JobTable::new();
        table.add(&control, "sleep 100 &", pid(20), false);
        table.add(&control, "true &", pid(21), false);
        table.add(&control, "vim", pid(22), true);
        control.finish(pid(21));

        let mut out = Vec::new();
        table.list(&control, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "[1] sleep 100 & : 20 0 secs\n[3] vim : 22 0 secs (stopped)\n"
        );
    }

    #[test]
    fn test_kill_all_clears_even_when_a_kill_fails() {
        let control = RecordingControl::default();
        let mut table = JobTable::new();
        table.add(&control, "sleep 100 &", pid(30), false);
        table.add(&control, "sleep 200 &", pid(31), false);
        control.fail_signals_to(pid(30), nix::errno::Errno::EPERM);

        let mut out = Vec::new();
        table.kill_all(&control, &mut out).unwrap();

        assert!(table.is_empty());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "smash: sending SIGKILL signal to 2 jobs:\n30: sleep 100 &\n31: sleep 200 &\n"
        );
        assert_eq!(control.signals_sent(), vec![(pid(31), libc::SIGKILL)]);
    }

    #[test]
    fn test_stop_resets_elapsed_clock() {
        let control = RecordingControl::default();
        let mut table = JobTable::new();
        table.add(&control, "sleep 100 &", pid(40), false);

        let job = table.find_by_pid_mut(pid(40)).unwrap();
        job.stop();
        assert!(job.is_stopped());
        assert_eq!(job.seconds_elapsed(), 0);
        job.resume();
        assert!(!job.is_stopped());
    }
}

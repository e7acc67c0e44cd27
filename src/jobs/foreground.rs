use nix::unistd::Pid;

/// The job currently holding the terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForegroundJob {
    pub pid: Pid,
    pub command_line: String,
}

/// At most one foreground job. Occupied right before the shell blocks on a
/// child and emptied on every way out of that wait.
#[derive(Debug, Default)]
pub struct ForegroundSlot {
    current: Option<ForegroundJob>,
}

impl ForegroundSlot {
    pub fn occupy(&mut self, pid: Pid, command_line: &str) {
        self.current = Some(ForegroundJob {
            pid,
            command_line: command_line.to_string(),
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&ForegroundJob> {
        self.current.as_ref()
    }

    pub fn pid(&self) -> Option<Pid> {
        self.current.as_ref().map(|job| job.pid)
    }

    /// True while `pid` still owns the slot.
    pub fn is_held_by(&self, pid: Pid) -> bool {
        self.pid() == Some(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupy_and_clear() {
        let mut slot = ForegroundSlot::default();
        assert!(slot.current().is_none());

        slot.occupy(Pid::from_raw(42), "sleep 5");
        assert!(slot.is_held_by(Pid::from_raw(42)));
        assert_eq!(slot.current().unwrap().command_line, "sleep 5");

        slot.clear();
        assert_eq!(slot.pid(), None);
    }
}

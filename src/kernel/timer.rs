//! The single OS interval timer (`ITIMER_REAL`, delivers SIGALRM).

use log::debug;
use nix::errno::Errno;
use std::time::Duration;

/// Shortest delay ever armed; a zero delay would disarm the timer instead.
pub const MIN_ARM_DELAY: Duration = Duration::from_millis(1);

/// A one-shot timer that raises the shell's timer signal when it expires.
pub trait IntervalTimer {
    /// Arm (or re-arm) the timer to fire once after `after`.
    fn arm(&self, after: Duration) -> Result<(), Errno>;

    fn disarm(&self) -> Result<(), Errno>;
}

/// [`IntervalTimer`] backed by setitimer(2).
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTimer;

impl RealTimer {
    fn set(value: Duration) -> Result<(), Errno> {
        let spec = libc::itimerval {
            it_interval: libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            it_value: libc::timeval {
                tv_sec: value.as_secs() as libc::time_t,
                tv_usec: value.subsec_micros() as libc::suseconds_t,
            },
        };
        // SAFETY: `spec` is a valid itimerval; the old value is not requested.
        let rc = unsafe { libc::setitimer(libc::ITIMER_REAL, &spec, std::ptr::null_mut()) };
        Errno::result(rc).map(drop)
    }
}

impl IntervalTimer for RealTimer {
    fn arm(&self, after: Duration) -> Result<(), Errno> {
        let after = after.max(MIN_ARM_DELAY);
        debug!("Arming interval timer for {:?}", after);
        Self::set(after)
    }

    fn disarm(&self) -> Result<(), Errno> {
        Self::set(Duration::ZERO)
    }
}

impl<T: IntervalTimer + ?Sized> IntervalTimer for std::rc::Rc<T> {
    fn arm(&self, after: Duration) -> Result<(), Errno> {
        (**self).arm(after)
    }

    fn disarm(&self) -> Result<(), Errno> {
        (**self).disarm()
    }
}

use log::debug;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
/// Async-safe signal intake for the shell
///
/// The OS handlers only record which signal arrived. The main control flow
/// drains the pending set between commands, while waiting for input and
/// whenever a blocking wait returns `EINTR`, so job table and timer state are
/// never touched from signal context.
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::types::{Result, ShellError};

/// Signals received but not yet processed, one bit per [`ShellSignal`]
static PENDING: AtomicU32 = AtomicU32::new(0);

/// The three asynchronous events the shell reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellSignal {
    /// ctrl-Z (SIGTSTP)
    Suspend,
    /// ctrl-C (SIGINT)
    Interrupt,
    /// interval timer expiry (SIGALRM)
    Timer,
}

impl ShellSignal {
    /// Drain order when several signals are pending at once.
    pub const ALL: [ShellSignal; 3] = [
        ShellSignal::Suspend,
        ShellSignal::Interrupt,
        ShellSignal::Timer,
    ];

    pub fn os_signal(self) -> Signal {
        match self {
            ShellSignal::Suspend => Signal::SIGTSTP,
            ShellSignal::Interrupt => Signal::SIGINT,
            ShellSignal::Timer => Signal::SIGALRM,
        }
    }

    fn bit(self) -> u32 {
        match self {
            ShellSignal::Suspend => 1 << 0,
            ShellSignal::Interrupt => 1 << 1,
            ShellSignal::Timer => 1 << 2,
        }
    }

    fn from_raw(signum: libc::c_int) -> Option<Self> {
        match signum {
            libc::SIGTSTP => Some(ShellSignal::Suspend),
            libc::SIGINT => Some(ShellSignal::Interrupt),
            libc::SIGALRM => Some(ShellSignal::Timer),
            _ => None,
        }
    }
}

/// Async-safe signal handler
/// Only performs atomic operations - no allocations, no locks, no I/O
extern "C" fn record_signal(signum: libc::c_int) {
    if let Some(sig) = ShellSignal::from_raw(signum) {
        PENDING.fetch_or(sig.bit(), Ordering::SeqCst);
    }
}

/// Install the shell's handlers for SIGTSTP, SIGINT and SIGALRM.
///
/// `SA_RESTART` is deliberately absent: blocking calls must return `EINTR`
/// so the main flow gets a chance to drain the pending set.
pub fn install_handlers() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(record_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );

    for sig in ShellSignal::ALL {
        // SAFETY: the handler only touches an atomic.
        unsafe { signal::sigaction(sig.os_signal(), &action) }
            .map_err(|e| ShellError::os("sigaction", e))?;
    }

    debug!("Shell signal handlers installed (SIGTSTP, SIGINT, SIGALRM)");
    Ok(())
}

/// Reset the shell's signals to their default disposition.
/// Called in every forked child before it runs its command.
pub fn restore_default_handlers() {
    let action = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    for sig in ShellSignal::ALL {
        // SAFETY: installing SIG_DFL has no handler preconditions.
        let _ = unsafe { signal::sigaction(sig.os_signal(), &action) };
    }
    PENDING.store(0, Ordering::SeqCst);
}

/// Record a signal as if the OS had delivered it.
pub fn notify(sig: ShellSignal) {
    PENDING.fetch_or(sig.bit(), Ordering::SeqCst);
}

pub fn has_pending() -> bool {
    PENDING.load(Ordering::SeqCst) != 0
}

/// Take every pending signal, clearing the set.
pub fn take_pending() -> Vec<ShellSignal> {
    let bits = PENDING.swap(0, Ordering::SeqCst);
    ShellSignal::ALL
        .into_iter()
        .filter(|sig| bits & sig.bit() != 0)
        .collect()
}

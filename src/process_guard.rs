//! Process lifecycle management for external commands
//!
//! `git clone` and `brew install` run in their own process group so that a
//! timeout or a Ctrl+C on lazyzsh stops the whole command tree (git spawns
//! `git-remote-https`, brew spawns curl) instead of leaving it running behind
//! a half-written component directory.
//!
//! - Children are spawned with [`CommandProcessGroup::in_new_process_group`]
//! - Running PIDs are tracked in a global [`ChildRegistry`]
//! - On SIGINT/SIGTERM/SIGHUP every tracked group gets SIGTERM, then SIGKILL
//! - While a child runs, [`TerminalForeground`] gives it the controlling
//!   terminal, so credential or sudo prompts can read from it

use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{getpgrp, tcgetpgrp, tcsetpgrp, Pid};
use std::collections::HashSet;
use std::io::IsTerminal;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

static CHILD_REGISTRY: OnceLock<Arc<Mutex<ChildRegistry>>> = OnceLock::new();

/// Registry tracking running child processes
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
}

impl ChildRegistry {
    /// Get or create the global child registry
    pub fn global() -> Arc<Mutex<ChildRegistry>> {
        CHILD_REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(ChildRegistry::default())))
            .clone()
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.insert(pid);
        debug!(pid, "registered child process");
    }

    pub fn unregister(&mut self, pid: u32) {
        self.pids.remove(&pid);
        debug!(pid, "unregistered child process");
    }

    pub fn count(&self) -> usize {
        self.pids.len()
    }

    /// Terminate every tracked process group and clear the registry
    pub fn terminate_all(&mut self, grace_period: Duration) {
        if self.pids.is_empty() {
            return;
        }
        info!("Terminating {} child process(es)...", self.pids.len());
        for pid in self.pids.drain() {
            terminate_group(pid, grace_period);
        }
    }
}

/// Register a PID with the global registry for the lifetime of the guard.
///
/// Dropping the guard unregisters the PID again.
pub struct RegisteredChild {
    pid: u32,
}

impl RegisteredChild {
    pub fn register(pid: u32) -> Self {
        // Lock is held briefly, panic is acceptable if poisoned
        ChildRegistry::global()
            .lock()
            .expect("ChildRegistry mutex poisoned")
            .register(pid);
        Self { pid }
    }
}

impl Drop for RegisteredChild {
    fn drop(&mut self) {
        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(self.pid);
        }
    }
}

/// Send SIGTERM to a process group, wait up to `grace_period`, then SIGKILL.
pub fn terminate_group(pgid: u32, grace_period: Duration) {
    if let Err(e) = send_signal_to_group(pgid, Signal::SIGTERM) {
        warn!("Failed to send SIGTERM to process group {}: {}", pgid, e);
        let _ = signal::kill(Pid::from_raw(pgid as i32), Signal::SIGTERM);
    }

    let start = Instant::now();
    while start.elapsed() < grace_period {
        if !is_process_alive(pgid) {
            debug!(pgid, "process group exited after SIGTERM");
            return;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    warn!("Process group {} did not terminate, sending SIGKILL", pgid);
    let _ = send_signal_to_group(pgid, Signal::SIGKILL);
}

/// Negative PID signals every process in the group
fn send_signal_to_group(pgid: u32, signal: Signal) -> Result<(), nix::Error> {
    signal::kill(Pid::from_raw(-(pgid as i32)), signal)
}

/// A process counts as alive while it exists and is not a zombie.
fn is_process_alive(pid: u32) -> bool {
    if signal::kill(Pid::from_raw(pid as i32), None).is_err() {
        return false;
    }

    // Field 3 of /proc/<pid>/stat is the state; Z and X are dead for our purposes
    if let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        let fields: Vec<&str> = stat.split_whitespace().collect();
        if fields.len() > 2 {
            return !matches!(fields[2], "Z" | "X");
        }
    }

    true
}

/// The controlling terminal's foreground group, lent to a child's group.
///
/// A child in its own process group that reads from the terminal while in the
/// background is stopped with SIGTTIN. The child claims the terminal before
/// exec ([`CommandProcessGroup::with_terminal`]), the parent repeats the claim
/// after spawn, and dropping the guard hands the terminal back.
#[derive(Debug)]
pub struct TerminalForeground {
    previous: Pid,
}

impl TerminalForeground {
    /// Guard for the current foreground group, if stdin is a terminal we own.
    ///
    /// Returns `None` when stdin is not a terminal or when lazyzsh itself runs
    /// in the background.
    pub fn current() -> Option<Self> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return None;
        }
        let previous = tcgetpgrp(&stdin).ok()?;
        if previous != getpgrp() {
            debug!("not the terminal's foreground group, leaving it alone");
            return None;
        }
        Some(Self { previous })
    }

    /// Make `pgid` the foreground group
    pub fn hand_to(&self, pgid: u32) {
        let stdin = std::io::stdin();
        match with_sigttou_ignored(|| tcsetpgrp(&stdin, Pid::from_raw(pgid as i32))) {
            Ok(()) => debug!(pgid, "terminal handed to child process group"),
            // The child may already have exited
            Err(e) => debug!(pgid, "could not hand the terminal over: {}", e),
        }
    }
}

impl Drop for TerminalForeground {
    fn drop(&mut self) {
        let stdin = std::io::stdin();
        // We are in the background now, so this needs SIGTTOU ignored
        match with_sigttou_ignored(|| tcsetpgrp(&stdin, self.previous)) {
            Ok(()) => debug!("terminal returned to process group {}", self.previous),
            Err(e) => warn!("Failed to take the terminal back: {}", e),
        }
    }
}

fn with_sigttou_ignored<T>(f: impl FnOnce() -> nix::Result<T>) -> nix::Result<T> {
    // SAFETY: SIG_IGN installs no handler code
    let previous = unsafe { signal::signal(Signal::SIGTTOU, SigHandler::SigIgn) }?;
    let result = f();
    // SAFETY: restores the disposition read above
    let _ = unsafe { signal::signal(Signal::SIGTTOU, previous) };
    result
}

/// Install SIGINT/SIGTERM/SIGHUP handlers that stop tracked children and exit.
/// Call this once at program start.
pub fn init_signal_handlers() -> Result<(), std::io::Error> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("Received signal {}, cleaning up...", sig);
            if let Ok(mut registry) = ChildRegistry::global().lock() {
                registry.terminate_all(Duration::from_secs(3));
            }
            std::process::exit(128 + sig);
        }
    });

    Ok(())
}

/// Extension trait for std::process::Command to set up process groups
pub trait CommandProcessGroup {
    /// Run the command as the leader of a new process group
    fn in_new_process_group(&mut self) -> &mut Self;

    /// Make the new group the terminal's foreground group before exec.
    /// Must be called after [`in_new_process_group`](Self::in_new_process_group).
    fn with_terminal(&mut self) -> &mut Self;
}

impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        // SAFETY: the closure only calls async-signal-safe functions between fork and exec
        unsafe {
            self.pre_exec(|| {
                nix::unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0))
                    .map_err(std::io::Error::other)?;

                set_parent_death_signal()
            });
        }
        self
    }

    fn with_terminal(&mut self) -> &mut Self {
        use std::os::fd::BorrowedFd;
        use std::os::unix::process::CommandExt;
        // SAFETY: sigaction, getpgrp and tcsetpgrp are async-signal-safe; fd 0 stays
        // open until exec
        unsafe {
            self.pre_exec(|| {
                let tty = BorrowedFd::borrow_raw(0);
                // The parent repeats this after spawn, so a failure here is not fatal
                let _ = with_sigttou_ignored(|| tcsetpgrp(tty, getpgrp()));
                Ok(())
            });
        }
        self
    }
}

/// Die with the parent so a crashed run does not leave clones going
#[cfg(target_os = "linux")]
fn set_parent_death_signal() -> std::io::Result<()> {
    // SAFETY: prctl with PR_SET_PDEATHSIG takes plain integer arguments
    if unsafe { nix::libc::prctl(nix::libc::PR_SET_PDEATHSIG, nix::libc::SIGTERM) } == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_parent_death_signal() -> std::io::Result<()> {
    Ok(())
}

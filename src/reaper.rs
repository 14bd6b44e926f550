use std::{io, thread};

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use signal_hook::consts::SIGCHLD;
use signal_hook::iterator::Signals;

/// Installs the SIGCHLD drain loop on its own thread. Call once at startup.
/// The thread owns no shell state; bookkeeping for killed jobs stays with
/// the `kill` builtin.
pub fn install() -> io::Result<()> {
    let mut signals = Signals::new([SIGCHLD])?;
    thread::Builder::new()
        .name("reaper".to_owned())
        .spawn(move || {
            for _ in signals.forever() {
                drain();
            }
        })?;
    Ok(())
}

/// Collects every already-terminated child without blocking. One SIGCHLD can
/// stand for several exits, so the loop runs until the kernel has nothing
/// left to report.
fn drain() {
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(_) => continue,
            Err(Errno::ECHILD) => break,
            Err(_) => break,
        }
    }
}

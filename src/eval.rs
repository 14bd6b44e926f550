use std::convert::Infallible;
use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use thiserror::Error;

use crate::builtin;
use crate::state::State;
use crate::types::{Command, Pipeline, Redirect, RedirectKind};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot open {target}: {source}")]
    Redirect { target: String, source: Errno },
    #[error("cannot exec: {0}")]
    Exec(Errno),
    #[error("system call failed: {0}")]
    Sys(#[from] Errno),
    #[error("argument contains an interior NUL byte")]
    BadArgv(#[from] std::ffi::NulError),
}

/// Evaluates one parsed line. Builtins run in-process; everything else is
/// forked and exec'd. Returns the foreground exit status (0 when the command
/// was dispatched to the background).
pub fn eval(state: &mut State, pipeline: &Pipeline, line: &str) -> i32 {
    if pipeline.commands.len() >= 2 {
        return match run_pipeline(&pipeline.commands) {
            Ok(status) => status,
            Err(e) => {
                eprintln!("nsh: {}", e);
                126
            }
        };
    }
    let command = &pipeline.commands[0];
    if let Some(status) = builtin::dispatch(state, &command.argv) {
        return status;
    }
    match run_single(state, command, pipeline.background, line) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("nsh: {}", e);
            126
        }
    }
}

fn run_single(
    state: &mut State,
    command: &Command,
    background: bool,
    line: &str,
) -> Result<i32, ExecError> {
    match unsafe { unistd::fork() }? {
        ForkResult::Child => exec_command(command),
        ForkResult::Parent { child } => {
            if background {
                acknowledge_background(state, child, line);
                Ok(0)
            } else {
                Ok(wait_foreground(child))
            }
        }
    }
}

fn acknowledge_background(state: &mut State, child: Pid, line: &str) {
    let text = line.trim().trim_end_matches('&').trim_end();
    match state.jobs.register(child, text) {
        Ok(slot) => println!("[{}] {}", slot, child),
        // the child keeps running, just untracked
        Err(e) => eprintln!("nsh: {}", e),
    }
}

/// Blocks until `child` terminates. The reaper can drain the child first, in
/// which case its status is gone and the command counts as completed.
fn wait_foreground(child: Pid) -> i32 {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return code,
            Ok(WaitStatus::Signaled(_, signal, _)) => return 128 + signal as i32,
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => return 0,
            Err(e) => {
                eprintln!("nsh: wait failed: {}", e);
                return 126;
            }
        }
    }
}

fn run_pipeline(commands: &[Command]) -> Result<i32, ExecError> {
    let last = commands.len() - 1;
    let mut channels: Vec<(OwnedFd, OwnedFd)> = Vec::with_capacity(last);
    for _ in 0..last {
        channels.push(pipe_pair()?);
    }

    let mut spawned: Vec<Pid> = Vec::with_capacity(commands.len());
    for (i, command) in commands.iter().enumerate() {
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Child) => exec_stage(command, &channels, i, last),
            Ok(ForkResult::Parent { child }) => spawned.push(child),
            Err(e) => {
                // already-spawned siblings keep running and are still waited for
                eprintln!("nsh: fork failed for pipeline stage {}: {}", i + 1, e);
                break;
            }
        }
    }

    // release every pipe end before waiting so end-of-stream can propagate
    drop(channels);

    let mut status = 0;
    for child in spawned {
        status = wait_foreground(child);
    }
    Ok(status)
}

fn pipe_pair() -> Result<(OwnedFd, OwnedFd), ExecError> {
    let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC)?;
    // SAFETY: pipe2 returned these descriptors and nothing else owns them
    Ok(unsafe { (OwnedFd::from_raw_fd(read), OwnedFd::from_raw_fd(write)) })
}

fn exec_stage(command: &Command, channels: &[(OwnedFd, OwnedFd)], i: usize, last: usize) -> ! {
    if let Err(e) = wire_stage(channels, i, last) {
        let _ = writeln!(io::stderr(), "nsh: cannot wire pipeline stage: {}", e);
        unsafe { libc::_exit(125) }
    }
    // the pipe ends are close-on-exec; dup2 cleared the flag on stdin/stdout
    exec_command(command)
}

fn wire_stage(channels: &[(OwnedFd, OwnedFd)], i: usize, last: usize) -> nix::Result<()> {
    if i > 0 {
        unistd::dup2(channels[i - 1].0.as_raw_fd(), libc::STDIN_FILENO)?;
    }
    if i < last {
        unistd::dup2(channels[i].1.as_raw_fd(), libc::STDOUT_FILENO)?;
    }
    Ok(())
}

/// Child-side tail of both launch paths: apply redirections, replace the
/// process image, and report any failure before `_exit`. Never returns to
/// the parent's code path.
fn exec_command(command: &Command) -> ! {
    let code = match do_exec_command(command) {
        Ok(never) => match never {},
        Err(ExecError::Redirect { target, source }) => {
            let _ = writeln!(io::stderr(), "nsh: cannot open {}: {}", target, source);
            1
        }
        Err(ExecError::Exec(Errno::ENOENT)) => {
            let _ = writeln!(io::stderr(), "nsh: command not found: {}", command.argv[0]);
            127
        }
        Err(e) => {
            let _ = writeln!(io::stderr(), "nsh: {}", e);
            126
        }
    };
    unsafe { libc::_exit(code) }
}

fn do_exec_command(command: &Command) -> Result<Infallible, ExecError> {
    apply_redirects(&command.redirects)?;
    let argv = command
        .argv
        .iter()
        .map(|&arg| CString::new(arg))
        .collect::<Result<Vec<CString>, _>>()?;
    unistd::execvp(&argv[0], &argv).map_err(ExecError::Exec)?;
    unreachable!()
}

/// Applied in recorded order, so a repeated operator overwrites the earlier
/// target.
fn apply_redirects(redirects: &[Redirect]) -> Result<(), ExecError> {
    for redirect in redirects {
        let (flags, mode, stdio_fd) = match redirect.kind {
            RedirectKind::Input => (OFlag::O_RDONLY, Mode::empty(), libc::STDIN_FILENO),
            RedirectKind::Output => (
                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
                Mode::from_bits_truncate(0o644),
                libc::STDOUT_FILENO,
            ),
        };
        let fd = fcntl::open(redirect.target, flags, mode).map_err(|e| ExecError::Redirect {
            target: redirect.target.to_owned(),
            source: e,
        })?;
        unistd::dup2(fd, stdio_fd)?;
        unistd::close(fd)?;
    }
    Ok(())
}

use std::io::{self, Write};
use std::process;

use nix::unistd;

use crate::state::State;

pub type Builtin = fn(&mut State, &[&str]) -> i32;

pub fn match_builtin(name: &str) -> Option<Builtin> {
    match name {
        "cd" => Some(builtin_cd),
        "exit" => Some(builtin_exit),
        "jobs" => Some(builtin_jobs),
        "kill" => Some(builtin_kill),
        "help" => Some(builtin_help),
        _ => None,
    }
}

/// Runs `argv` as a builtin if its name matches one. `None` means "not a
/// builtin, launch it externally".
pub fn dispatch(state: &mut State, argv: &[&str]) -> Option<i32> {
    let func = match_builtin(argv.first()?)?;
    Some(func(state, &argv[1..]))
}

fn builtin_cd(_state: &mut State, args: &[&str]) -> i32 {
    let Some(path) = args.first() else {
        eprintln!("cd: usage: cd <directory>");
        return 1;
    };
    match unistd::chdir(*path) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("cd: {}: {}", path, e);
            1
        }
    }
}

fn builtin_exit(_state: &mut State, _args: &[&str]) -> i32 {
    process::exit(0);
}

fn builtin_jobs(state: &mut State, _args: &[&str]) -> i32 {
    println!("Background jobs:");
    for (n, job) in state.jobs.list() {
        println!("[{}] {} {}", n, job.pid, job.command);
    }
    0
}

fn builtin_kill(state: &mut State, args: &[&str]) -> i32 {
    let job_number = match args.first().map(|arg| arg.parse::<usize>()) {
        Some(Ok(n)) => n,
        _ => {
            eprintln!("kill: usage: kill <job_number>");
            return 1;
        }
    };
    match state.jobs.terminate(job_number) {
        Ok(job) => {
            println!("Process {} terminated.", job.pid);
            0
        }
        Err(e) => {
            eprintln!("kill: {}", e);
            1
        }
    }
}

fn builtin_help(_state: &mut State, _args: &[&str]) -> i32 {
    let _ = io::stdout().write_all(
        b"Available built-in commands:\n\
          cd <directory>: Change the working directory.\n\
          exit: Terminate the shell.\n\
          jobs: List currently running background processes.\n\
          kill <job_number>: Terminate a background process.\n\
          help: Display this help message.\n",
    );
    0
}

use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal;
use nix::unistd::Pid;

use nsh::eval::eval;
use nsh::parser;
use nsh::reaper;
use nsh::state::State;

// This test keeps its own binary: the reaper drains every child of the
// process, so it cannot share a process with tests that wait on their own
// children.
#[test]
fn reaper_drains_every_terminated_background_child() {
    reaper::install().expect("install reaper");
    let mut state = State::new();

    for _ in 0..3 {
        let line = "true &";
        let pipeline = parser::parse(line).unwrap().unwrap();
        assert_eq!(eval(&mut state, &pipeline, line), 0);
    }
    // exited jobs stay listed; only `kill` removes entries
    assert_eq!(state.jobs.len(), 3);

    let pids: Vec<Pid> = state.jobs.list().map(|(_, job)| job.pid).collect();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        // signal 0 probes the process table: a zombie still answers, a
        // reaped child is gone (ESRCH)
        let remaining = pids
            .iter()
            .filter(|&&pid| signal::kill(pid, None).is_ok())
            .count();
        if remaining == 0 {
            break;
        }
        assert!(
            Instant::now() < deadline,
            "{} children still unreaped",
            remaining
        );
        thread::sleep(Duration::from_millis(20));
    }
}

use std::fs;

use nsh::eval::eval;
use nsh::parser;
use nsh::state::State;

fn run(state: &mut State, line: &str) -> i32 {
    let pipeline = parser::parse(line).expect("parse").expect("non-empty line");
    eval(state, &pipeline, line)
}

#[test]
fn output_then_input_redirection_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("x");
    let second = dir.path().join("y");
    let mut state = State::new();

    assert_eq!(run(&mut state, &format!("echo hi > {}", first.display())), 0);
    assert_eq!(fs::read_to_string(&first).unwrap(), "hi\n");

    assert_eq!(
        run(
            &mut state,
            &format!("cat < {} > {}", first.display(), second.display())
        ),
        0
    );
    assert_eq!(fs::read_to_string(&second).unwrap(), "hi\n");
}

#[test]
fn output_redirection_truncates_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x");
    fs::write(&path, "a much longer previous content\n").unwrap();
    let mut state = State::new();
    assert_eq!(run(&mut state, &format!("echo hi > {}", path.display())), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "hi\n");
}

#[test]
fn missing_input_file_fails_only_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let mut state = State::new();
    assert_eq!(run(&mut state, &format!("cat < {}", missing.display())), 1);

    // the shell process is still here to run the next command
    let out = dir.path().join("after");
    assert_eq!(run(&mut state, &format!("echo ok > {}", out.display())), 0);
    assert_eq!(fs::read_to_string(&out).unwrap(), "ok\n");
}

#[test]
fn unknown_program_exits_127() {
    let mut state = State::new();
    assert_eq!(run(&mut state, "definitely-not-a-real-program-xyz"), 127);
}

#[test]
fn foreground_status_is_reported_back() {
    let mut state = State::new();
    assert_eq!(run(&mut state, "true"), 0);
    assert_eq!(run(&mut state, "false"), 1);
}

#[test]
fn pipeline_feeds_stdout_to_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("count");
    let mut state = State::new();
    assert_eq!(
        run(&mut state, &format!("echo hi | wc -w | tee {}", out.display())),
        0
    );
    assert_eq!(fs::read_to_string(&out).unwrap().trim(), "1");
}

#[test]
fn failed_stage_does_not_abort_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("still-runs");
    let mut state = State::new();
    // the broken stage reports on its own; tee sees immediate end-of-stream
    let status = run(
        &mut state,
        &format!("no-such-program-abc | tee {}", out.display()),
    );
    assert_eq!(status, 0);
    assert!(out.exists());
}

#[test]
fn background_job_is_registered_and_killable() {
    let mut state = State::new();
    assert_eq!(run(&mut state, "sleep 30 &"), 0);
    assert_eq!(state.jobs.len(), 1);
    let (slot, job) = state
        .jobs
        .list()
        .next()
        .map(|(n, job)| (n, job.clone()))
        .unwrap();
    assert_eq!(slot, 1);
    assert_eq!(job.command, "sleep 30");

    let killed = state.jobs.terminate(1).expect("kill job 1");
    assert_eq!(killed.pid, job.pid);
    assert!(state.jobs.is_empty());

    // reap it so this test process does not leave a zombie behind
    let _ = nix::sys::wait::waitpid(job.pid, None);
}

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use nsh::state::State;
use nsh::{eval, parser, reaper};

const PROMPT: &str = "nsh> ";
const HISTORY_SIZE: usize = 10;

fn main() -> Result<()> {
    reaper::install()?;
    let mut rl = DefaultEditor::new()?;
    let mut state = State::new();
    let mut history: Vec<String> = Vec::new();

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let Some(line) = expand_history(&history, line) else {
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                remember(&mut history, &line);
                run_line(&mut state, &line);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("nsh: {}", e);
                break;
            }
        }
    }
    Ok(())
}

fn run_line(state: &mut State, line: &str) {
    match parser::parse(line) {
        Ok(Some(pipeline)) => {
            eval::eval(state, &pipeline, line);
        }
        Ok(None) => {}
        Err(e) => eprintln!("nsh: {}", e),
    }
}

fn remember(history: &mut Vec<String>, line: &str) {
    if history.len() == HISTORY_SIZE {
        history.remove(0);
    }
    history.push(line.to_owned());
}

/// `!n` recalls the n-th retained line, `!-k` the k-th counting back from
/// the newest. A miss reports and yields nothing to run.
fn expand_history(history: &[String], line: String) -> Option<String> {
    let Some(rest) = line.strip_prefix('!') else {
        return Some(line);
    };
    let index = if let Some(back) = rest.strip_prefix('-') {
        back.trim()
            .parse::<usize>()
            .ok()
            .and_then(|k| history.len().checked_sub(k))
    } else {
        rest.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
    };
    match index.and_then(|i| history.get(i)) {
        Some(recalled) => {
            println!("Repeating command: {}", recalled);
            Some(recalled.clone())
        }
        None => {
            println!("No such command in history.");
            None
        }
    }
}

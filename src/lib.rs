//! Core of a small interactive shell: whitespace tokenization, `|`
//! pipelines, `<`/`>` redirection, trailing-`&` background execution, a
//! bounded table of background jobs, and a SIGCHLD reaper that keeps
//! zombies from accumulating. The interactive loop in `main.rs` is a thin
//! client of [`parser`] and [`eval`].

pub mod builtin;
pub mod eval;
pub mod job;
pub mod parser;
pub mod reaper;
pub mod state;
pub mod types;

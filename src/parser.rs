use thiserror::Error;

use crate::types::{Command, Pipeline, Redirect, RedirectKind, MAX_ARGS, MAX_SEGMENTS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing file name after '{0}'")]
    MissingRedirectTarget(char),
    #[error("missing command")]
    MissingCommand,
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

/// Splits a command segment on runs of blanks. At most [`MAX_ARGS`] tokens
/// are kept; the rest are dropped.
pub fn tokenize(segment: &str) -> Vec<&str> {
    segment
        .split(is_blank)
        .filter(|tok| !tok.is_empty())
        .take(MAX_ARGS)
        .collect()
}

/// Splits a line on `|` into trimmed non-empty segments, keeping at most
/// [`MAX_SEGMENTS`] of them.
pub fn split_segments(line: &str) -> Vec<&str> {
    line.split('|')
        .map(str::trim)
        .filter(|seg| !seg.is_empty())
        .take(MAX_SEGMENTS)
        .collect()
}

fn strip_background(tokens: &mut Vec<&str>) -> bool {
    if tokens.last() == Some(&"&") {
        tokens.pop();
        true
    } else {
        false
    }
}

fn split_redirects<'a>(
    tokens: Vec<&'a str>,
) -> Result<(Vec<&'a str>, Vec<Redirect<'a>>), ParseError> {
    let mut argv = Vec::with_capacity(tokens.len());
    let mut redirects = Vec::new();
    let mut it = tokens.into_iter();
    while let Some(tok) = it.next() {
        let kind = match tok {
            "<" => RedirectKind::Input,
            ">" => RedirectKind::Output,
            _ => {
                argv.push(tok);
                continue;
            }
        };
        let operator = if kind == RedirectKind::Input { '<' } else { '>' };
        let target = it
            .next()
            .ok_or(ParseError::MissingRedirectTarget(operator))?;
        redirects.push(Redirect { kind, target });
    }
    Ok((argv, redirects))
}

/// Parses one line. `Ok(None)` means the line holds nothing to run. A line
/// with two or more pipe segments becomes a foreground pipeline; redirection
/// and background extraction only apply to the single-command form.
pub fn parse(line: &str) -> Result<Option<Pipeline<'_>>, ParseError> {
    let segments = split_segments(line);
    if segments.len() >= 2 {
        let commands = segments
            .iter()
            .map(|seg| Command {
                argv: tokenize(seg),
                redirects: Vec::new(),
            })
            .collect();
        return Ok(Some(Pipeline {
            commands,
            background: false,
        }));
    }
    let Some(segment) = segments.first() else {
        return Ok(None);
    };
    let mut tokens = tokenize(segment);
    let background = strip_background(&mut tokens);
    if tokens.is_empty() {
        return Ok(None);
    }
    let (argv, redirects) = split_redirects(tokens)?;
    if argv.is_empty() {
        return Err(ParseError::MissingCommand);
    }
    Ok(Some(Pipeline {
        commands: vec![Command { argv, redirects }],
        background,
    }))
}

/// Tokens past this count are silently dropped while tokenizing a command.
pub const MAX_ARGS: usize = 10;
/// Pipeline segments past this count are silently dropped.
pub const MAX_SEGMENTS: usize = 10;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectKind {
    Input,
    Output,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Redirect<'a> {
    pub kind: RedirectKind,
    pub target: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Command<'a> {
    pub argv: Vec<&'a str>,
    pub redirects: Vec<Redirect<'a>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Pipeline<'a> {
    pub commands: Vec<Command<'a>>,
    pub background: bool,
}

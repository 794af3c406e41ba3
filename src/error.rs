use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BracketKind {
    Curly,
    Square,
}

impl BracketKind {
    pub fn open(self) -> char {
        match self {
            BracketKind::Curly => '{',
            BracketKind::Square => '[',
        }
    }

    pub fn close(self) -> char {
        match self {
            BracketKind::Curly => '}',
            BracketKind::Square => ']',
        }
    }
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Curly => f.write_str("curly"),
            BracketKind::Square => f.write_str("square"),
        }
    }
}

/// A fatal failure: the input started a construct and then broke its grammar.
///
/// "Did not match" is never an error; it is [`Outcome::NotMatched`].
///
/// [`Outcome::NotMatched`]: crate::parser::Outcome::NotMatched
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("expected {0}")]
    Expected(String),
    #[error("unclosed quote")]
    UnclosedQuote,
    #[error("unclosed {0} bracket")]
    UnclosedBracket(BracketKind),
    #[error("invalid number \"{0}\"")]
    InvalidNumber(String),
    #[error("malformed separator: expected ',' but found '{0}'")]
    MalformedSeparator(char),
    #[error("trailing comma before closing bracket")]
    TrailingComma,
    #[error("duplicate key \"{0}\"")]
    DuplicateKey(String),
    #[error("unexpected trailing characters \"{0}\"")]
    TrailingCharacters(String),
    #[error("invalid JSON provided: {0}")]
    InvalidJson(#[source] Box<Error>),
}

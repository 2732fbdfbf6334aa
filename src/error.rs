use std::io;

use charstream::Position;

pub type Result<T> = std::result::Result<T, SyntaxError>;

/// What the parser expected when it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("Expected a non-terminal symbol")]
    ExpectedNonTerminal,
    #[error("Expected `->`")]
    ExpectedArrow,
    #[error("Expected Non-Terminal Symbol or Terminal Symbol")]
    ExpectedSymbol,
    #[error("Expected `]` or a valid character literal")]
    ExpectedCharacterLiteral,
}

/// The first unrecoverable failure of a parse, positioned where the stream
/// stood when it was raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {position}")]
pub struct SyntaxError {
    pub position: Position,
    pub kind: ErrorKind,
}

impl SyntaxError {
    pub fn new(position: Position, kind: ErrorKind) -> Self {
        SyntaxError { position, kind }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("failed to read grammar: {0}")]
    Io(#[from] io::Error),
}

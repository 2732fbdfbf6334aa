use std::fmt::{self, Display};

/// Location of the cursor within the input. All fields are zero-based, and
/// `offset` counts code points rather than bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Position at the very start of some input.
    pub fn start() -> Self {
        Self::default()
    }

    /// Move past `c`. A newline starts a new line at column 0.
    pub fn advance(&mut self, c: char) {
        self.offset += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

use std::io::{self, Read};
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::position::Position;

/// Layout characters: every control code up to and including space, and DEL.
pub fn is_whitespace(c: char) -> bool {
    (c as u32) <= 32 || c == '\u{7f}'
}

/// Characters allowed in an identifier. Digits may not start one.
pub fn is_identifier(c: char, first: bool) -> bool {
    c == '_' || c == '-' || c.is_ascii_alphabetic() || (!first && c.is_ascii_digit())
}

/// Backtrackable cursor over a sequence of code points.
///
/// Every token helper either succeeds and advances deterministically, or
/// fails and leaves the stream exactly where it was.
#[derive(Debug, Clone, Default)]
pub struct CharStream {
    input: Vec<char>,
    state: Position,
    checkpoints: Vec<Position>,
}

impl CharStream {
    pub fn new(input: &str) -> Self {
        input.chars().collect()
    }

    /// Read all of `reader` into a new stream. The input must be UTF-8.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(Self::new(&buf))
    }

    pub fn position(&self) -> Position {
        self.state
    }

    pub fn is_eof(&self) -> bool {
        self.state.offset >= self.input.len()
    }

    /// Next code point without consuming it, `None` at end of input.
    pub fn peek(&self) -> Option<char> {
        self.input.get(self.state.offset).copied()
    }

    /// Consume the next code point. Consuming at end of input returns `None`
    /// and does not move the cursor.
    pub fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.state.advance(c);
        Some(c)
    }

    /// Save the current position on top of the checkpoint stack.
    pub fn push_checkpoint(&mut self) {
        self.checkpoints.push(self.state);
    }

    /// Pop the most recent checkpoint and rewind to it. Returns false if the
    /// stack was empty.
    pub fn restore_checkpoint(&mut self) -> bool {
        match self.checkpoints.pop() {
            Some(state) => {
                if state != self.state {
                    trace!(
                        target: "bnf::stream",
                        from = self.state.offset,
                        to = state.offset,
                        "rewinding"
                    );
                }
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Pop the most recent checkpoint without moving. Returns false if the
    /// stack was empty.
    pub fn discard_checkpoint(&mut self) -> bool {
        self.checkpoints.pop().is_some()
    }

    pub fn checkpoint_depth(&self) -> usize {
        self.checkpoints.len()
    }

    /// Push a checkpoint and return a guard owning it. The guard rewinds the
    /// stream when dropped unless [`Checkpoint::commit`] is called first.
    pub fn checkpoint(&mut self) -> Checkpoint<'_> {
        self.push_checkpoint();
        let depth = self.checkpoints.len();
        Checkpoint {
            stream: self,
            depth,
            released: false,
        }
    }

    pub fn consume_whitespace(&mut self) {
        while self.peek().map_or(false, is_whitespace) {
            self.consume();
        }
    }

    /// Check whether `s` comes next. Never moves the stream.
    pub fn peek_str(&mut self, s: &str, skip_ws: bool) -> bool {
        let mut cp = self.checkpoint();
        if skip_ws {
            cp.consume_whitespace();
        }
        let matched = s.chars().all(|c| cp.consume() == Some(c));
        matched
    }

    /// Consume `s` if it comes next in full.
    pub fn consume_str(&mut self, s: &str, skip_ws: bool) -> bool {
        let mut cp = self.checkpoint();
        if skip_ws {
            cp.consume_whitespace();
        }
        if s.chars().all(|c| cp.consume() == Some(c)) {
            cp.commit();
            return true;
        }
        false
    }

    /// Check whether `c` comes next. Never moves the stream.
    pub fn peek_char(&mut self, c: char, skip_ws: bool) -> bool {
        let mut cp = self.checkpoint();
        if skip_ws {
            cp.consume_whitespace();
        }
        let next = cp.peek();
        next == Some(c)
    }

    pub fn consume_char(&mut self, c: char, skip_ws: bool) -> bool {
        let mut cp = self.checkpoint();
        if skip_ws {
            cp.consume_whitespace();
        }
        if cp.consume() == Some(c) {
            cp.commit();
            return true;
        }
        false
    }

    /// Succeeds only at end of input, keeping any whitespace skipped on the way.
    pub fn consume_eof(&mut self, skip_ws: bool) -> bool {
        let mut cp = self.checkpoint();
        if skip_ws {
            cp.consume_whitespace();
        }
        if cp.is_eof() {
            cp.commit();
            return true;
        }
        false
    }

    /// Consume one identifier: a letter, `_` or `-` followed by any number of
    /// letters, digits, `_` or `-`.
    pub fn consume_identifier(&mut self, skip_ws: bool) -> Option<String> {
        let mut cp = self.checkpoint();
        if skip_ws {
            cp.consume_whitespace();
        }

        let first = cp.peek().filter(|&c| is_identifier(c, true))?;
        cp.consume();

        let mut ident = String::new();
        ident.push(first);
        while let Some(c) = cp.peek().filter(|&c| is_identifier(c, false)) {
            cp.consume();
            ident.push(c);
        }

        cp.commit();
        Some(ident)
    }

    /// Text of a zero-based line, without its line terminator.
    pub fn line_text(&self, line: usize) -> Option<String> {
        self.input.split(|&c| c == '\n').nth(line).map(|chars| {
            let text: String = chars.iter().collect();
            text.trim_end_matches('\r').to_owned()
        })
    }
}

impl FromIterator<char> for CharStream {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        CharStream {
            input: iter.into_iter().collect(),
            state: Position::start(),
            checkpoints: Vec::new(),
        }
    }
}

impl From<&str> for CharStream {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Scoped checkpoint on a [`CharStream`].
///
/// Dereferences to the stream so an attempt is driven through the guard.
/// Dropping the guard rewinds; [`commit`](Checkpoint::commit) keeps the
/// progress made since it was created.
#[derive(Debug)]
pub struct Checkpoint<'s> {
    stream: &'s mut CharStream,
    depth: usize,
    released: bool,
}

impl Checkpoint<'_> {
    /// Keep the current position and discard the saved one.
    pub fn commit(mut self) {
        self.release(false);
    }

    /// Rewind to the saved position. Equivalent to dropping the guard.
    pub fn restore(mut self) {
        self.release(true);
    }

    fn release(&mut self, rewind: bool) {
        if self.released {
            return;
        }
        debug_assert_eq!(
            self.stream.checkpoint_depth(),
            self.depth,
            "checkpoints must be released in LIFO order"
        );
        if rewind {
            self.stream.restore_checkpoint();
        } else {
            self.stream.discard_checkpoint();
        }
        self.released = true;
    }
}

impl Deref for Checkpoint<'_> {
    type Target = CharStream;

    fn deref(&self) -> &CharStream {
        self.stream
    }
}

impl DerefMut for Checkpoint<'_> {
    fn deref_mut(&mut self) -> &mut CharStream {
        self.stream
    }
}

impl Drop for Checkpoint<'_> {
    fn drop(&mut self) {
        self.release(true);
    }
}

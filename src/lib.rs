//! Parser for a small BNF-like grammar-definition language.
//!
//! ```
//! use bnf::{Grammar, Symbol, Terminal};
//!
//! let grammar: Grammar = "Digit -> [0-9] | 'x'".parse().unwrap();
//! assert_eq!(grammar.len(), 2);
//! assert_eq!(grammar.rules()[1].name(), "Digit");
//! assert_eq!(grammar.rules()[1].symbols(), &[Symbol::Terminal(Terminal::Literal('x'))]);
//! ```

use std::fmt::{self, Display, Write};
use std::str::FromStr;

mod error;
pub mod parser;
pub mod report;

pub use charstream::{CharStream, Position};
pub use error::{Error, ErrorKind, Result, SyntaxError};
pub use parser::{parse, parse_reader, parse_stream};

/// Name of a non-terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An inclusive range of code points. `start <= end` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRange {
    pub start: char,
    pub end: char,
}

impl CharRange {
    pub fn new(start: char, end: char) -> Self {
        CharRange { start, end }
    }

    /// Inverted ranges contain nothing.
    pub fn contains(&self, c: char) -> bool {
        self.start <= c && c <= self.end
    }
}

/// One alternative inside a character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceItem {
    Literal(char),
    Range(CharRange),
}

impl ChoiceItem {
    pub fn matches(&self, c: char) -> bool {
        match self {
            ChoiceItem::Literal(l) => *l == c,
            ChoiceItem::Range(r) => r.contains(c),
        }
    }
}

impl Display for ChoiceItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChoiceItem::Literal(c) => write_escaped(f, *c, true),
            ChoiceItem::Range(r) => {
                write_escaped(f, r.start, true)?;
                f.write_char('-')?;
                write_escaped(f, r.end, true)
            }
        }
    }
}

/// A symbol matching input directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Literal(char),
    /// Ordered alternatives; consumers try them first to last.
    Choice(Vec<ChoiceItem>),
}

impl Terminal {
    pub fn matches(&self, c: char) -> bool {
        match self {
            Terminal::Literal(l) => *l == c,
            Terminal::Choice(items) => items.iter().any(|item| item.matches(c)),
        }
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Terminal::Literal(c) => {
                f.write_char('\'')?;
                write_escaped(f, *c, false)?;
                f.write_char('\'')
            }
            Terminal::Choice(items) => {
                f.write_char('[')?;
                for item in items {
                    write!(f, "{}", item)?;
                }
                f.write_char(']')
            }
        }
    }
}

/// Write `c` so that it reads back as the same literal character, either
/// inside a quoted literal or inside a character class.
fn write_escaped(f: &mut fmt::Formatter, c: char, in_class: bool) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\n"),
        '\\' => f.write_str("\\\\"),
        '\'' if !in_class => f.write_str("\\'"),
        ']' | '-' if in_class => write!(f, "\\{}", c),
        _ => f.write_char(c),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Terminal(Terminal),
    /// Reference to a rule by name. It may be declared later, or never.
    NonTerminal(Identifier),
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Terminal(term) => write!(f, "{}", term),
            Symbol::NonTerminal(iden) => write!(f, "{}", iden),
        }
    }
}

impl From<Terminal> for Symbol {
    fn from(t: Terminal) -> Self {
        Symbol::Terminal(t)
    }
}

/// One alternative of a non-terminal. `A -> x | y` produces two rules named
/// `A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: Identifier,
    symbols: Vec<Symbol>,
}

impl Rule {
    pub fn new(name: impl Into<Identifier>, symbols: Vec<Symbol>) -> Self {
        Rule {
            name: name.into(),
            symbols,
        }
    }

    /// Rule with no name yet, as it exists before its head is parsed.
    pub(crate) fn unnamed() -> Self {
        Rule {
            name: Identifier::default(),
            symbols: Vec::new(),
        }
    }

    pub(crate) fn has_name(&self) -> bool {
        !self.name.0.is_empty()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        debug_assert!(!self.has_name(), "rule name is set once");
        self.name = Identifier(name);
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut Vec<Symbol> {
        &mut self.symbols
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn identifier(&self) -> &Identifier {
        &self.name
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.name)?;
        for symbol in &self.symbols {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// Rules in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    pub rules: Vec<Rule>,
}

impl Grammar {
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All alternatives of the non-terminal `name`, in declaration order.
    pub fn rules_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.name() == name)
    }
}

impl<'a> IntoIterator for &'a Grammar {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = SyntaxError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parser::parse(s)
    }
}

//! Recursive-descent parser for grammar-definition documents.
//!
//! ```text
//! Document  := Rule+
//! Rule      := Ident "->" Alt ("|" Alt)*
//! Alt       := Symbol*
//! Symbol    := Ident | Literal | CharClass
//! Literal   := "'" LitChar* "'"
//! CharClass := "[" (LitChar | LitChar "-" LitChar)* "]"
//! ```
//!
//! There is no rule terminator. After each symbol of a body the parser looks
//! for `->`; if one follows, the symbol just read is really the head of the
//! next rule, so it is dropped from the body and the stream is rewound to
//! just before it.

use std::io::Read;

use charstream::CharStream;
use tracing::{debug, trace};

use crate::error::{Error, ErrorKind, Result, SyntaxError};
use crate::{CharRange, ChoiceItem, Grammar, Rule, Symbol, Terminal};

const ARROW: &str = "->";

/// Parse a whole document.
pub fn parse(input: &str) -> Result<Grammar> {
    parse_stream(&mut CharStream::new(input))
}

/// Read a UTF-8 document from `reader` and parse it.
pub fn parse_reader<R: Read>(reader: R) -> std::result::Result<Grammar, Error> {
    let mut stream = CharStream::from_reader(reader)?;
    Ok(parse_stream(&mut stream)?)
}

/// Parse rules from `stream` until end of input. On failure the stream is
/// left where the error was raised.
pub fn parse_stream(stream: &mut CharStream) -> Result<Grammar> {
    let mut parser = GrammarParser::default();
    parser.parse_grammar(stream)?;
    debug!(target: "bnf::parser", rules = parser.rules.len(), "parsed grammar");
    Ok(Grammar {
        rules: parser.rules,
    })
}

/// Accumulates rules as they are discovered. The last rule is the one under
/// construction.
#[derive(Debug, Default)]
struct GrammarParser {
    rules: Vec<Rule>,
}

impl GrammarParser {
    fn parse_grammar(&mut self, stream: &mut CharStream) -> Result<()> {
        while !stream.consume_eof(true) {
            self.parse_rule(stream)?;
        }
        Ok(())
    }

    fn parse_rule(&mut self, stream: &mut CharStream) -> Result<()> {
        self.rules.push(Rule::unnamed());

        if !self.parse_non_terminal(stream) {
            return Err(raise(stream, ErrorKind::ExpectedNonTerminal));
        }
        trace!(target: "bnf::parser", name = self.current().name(), "rule");

        if !parse_arrow(stream) {
            return Err(raise(stream, ErrorKind::ExpectedArrow));
        }

        loop {
            let mut cp = stream.checkpoint();

            if cp.consume_eof(true) {
                break;
            }

            if cp.consume_char('|', true) {
                let name = self.current().name().to_owned();
                let mut alt = Rule::unnamed();
                alt.set_name(name);
                self.rules.push(alt);
                cp.commit();
                continue;
            }

            if !self.parse_symbol(&mut cp)? {
                return Err(raise(&cp, ErrorKind::ExpectedSymbol));
            }

            if parse_arrow(&mut cp) {
                // The symbol was the head of the next rule.
                self.current().symbols_mut().pop();
                cp.restore();
                break;
            }

            cp.commit();
        }

        let rule = self.current();
        debug!(
            target: "bnf::parser",
            name = rule.name(),
            symbols = rule.symbols().len(),
            "rule complete"
        );
        Ok(())
    }

    /// Names the current rule if it has no name yet, otherwise appends a
    /// reference to the identifier.
    fn parse_non_terminal(&mut self, stream: &mut CharStream) -> bool {
        let ident = match stream.consume_identifier(true) {
            Some(ident) => ident,
            None => return false,
        };

        let rule = self.current();
        if rule.has_name() {
            rule.symbols_mut().push(Symbol::NonTerminal(ident.into()));
        } else {
            rule.set_name(ident);
        }
        true
    }

    fn parse_symbol(&mut self, stream: &mut CharStream) -> Result<bool> {
        if self.parse_non_terminal(stream) {
            return Ok(true);
        }
        self.parse_terminal(stream)
    }

    fn parse_terminal(&mut self, stream: &mut CharStream) -> Result<bool> {
        if stream.consume_char('[', true) {
            let mut items = Vec::new();
            while !stream.consume_char(']', false) {
                let start = expect_literal_char(stream)?;
                if !stream.peek_str("-]", false) && stream.consume_char('-', false) {
                    let end = expect_literal_char(stream)?;
                    items.push(ChoiceItem::Range(CharRange { start, end }));
                } else {
                    items.push(ChoiceItem::Literal(start));
                }
            }
            self.current()
                .symbols_mut()
                .push(Symbol::Terminal(Terminal::Choice(items)));
            return Ok(true);
        }

        if stream.consume_char('\'', true) {
            while !stream.consume_char('\'', false) {
                let c = expect_literal_char(stream)?;
                self.current()
                    .symbols_mut()
                    .push(Symbol::Terminal(Terminal::Literal(c)));
            }
            return Ok(true);
        }

        Ok(false)
    }

    fn current(&mut self) -> &mut Rule {
        if self.rules.is_empty() {
            self.rules.push(Rule::unnamed());
        }
        let last = self.rules.len() - 1;
        &mut self.rules[last]
    }
}

fn parse_arrow(stream: &mut CharStream) -> bool {
    stream.consume_str(ARROW, true)
}

/// One character of a literal or class body. Raw newlines and end of input
/// are rejected; `\n` is a newline and any other escaped character is
/// itself.
fn parse_literal_char(stream: &mut CharStream) -> Option<char> {
    let mut cp = stream.checkpoint();
    let c = match cp.consume()? {
        '\n' => return None,
        '\\' => match cp.consume()? {
            '\n' => return None,
            'n' => '\n',
            escaped => escaped,
        },
        c => c,
    };
    cp.commit();
    Some(c)
}

fn expect_literal_char(stream: &mut CharStream) -> Result<char> {
    match parse_literal_char(stream) {
        Some(c) => Ok(c),
        None => Err(raise(stream, ErrorKind::ExpectedCharacterLiteral)),
    }
}

fn raise(stream: &CharStream, kind: ErrorKind) -> SyntaxError {
    let err = SyntaxError::new(stream.position(), kind);
    debug!(target: "bnf::parser", position = %err.position, "{}", kind);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Identifier;
    use charstream::Position;
    use pretty_assertions::assert_eq;

    struct TestCase {
        input: &'static str,
        // Some holds the expected rules as (name, symbols), None expects an
        // error.
        out: Option<Vec<(&'static str, Vec<Symbol>)>>,
    }

    fn assert_test_cases(tests: Vec<TestCase>) {
        for t in tests {
            let res = parse(t.input);
            match t.out {
                Some(rules) => {
                    let expected = Grammar {
                        rules: rules
                            .into_iter()
                            .map(|(name, symbols)| Rule::new(name, symbols))
                            .collect(),
                    };
                    assert_eq!(res, Ok(expected), "input: {:?}", t.input);
                }
                None => assert!(res.is_err(), "expected error: {:?}", res),
            }
        }
    }

    fn lit(c: char) -> Symbol {
        Symbol::Terminal(Terminal::Literal(c))
    }

    fn nt(name: &str) -> Symbol {
        Symbol::NonTerminal(Identifier::from(name))
    }

    fn class(items: Vec<ChoiceItem>) -> Symbol {
        Symbol::Terminal(Terminal::Choice(items))
    }

    fn range(start: char, end: char) -> ChoiceItem {
        ChoiceItem::Range(CharRange { start, end })
    }

    fn err_at(input: &str) -> SyntaxError {
        parse(input).unwrap_err()
    }

    #[test]
    fn parse_literals() {
        let tests = vec![
            TestCase {
                input: "Foo -> 'ab'",
                out: Some(vec![("Foo", vec![lit('a'), lit('b')])]),
            },
            TestCase {
                input: "Foo -> ''",
                out: Some(vec![("Foo", vec![])]),
            },
            TestCase {
                input: "Foo -> '\\n'",
                out: Some(vec![("Foo", vec![lit('\n')])]),
            },
            TestCase {
                input: "Foo -> '\\'\\\\\\q'",
                out: Some(vec![("Foo", vec![lit('\''), lit('\\'), lit('q')])]),
            },
            TestCase {
                input: "Foo -> ' a\t'",
                out: Some(vec![("Foo", vec![lit(' '), lit('a'), lit('\t')])]),
            },
            TestCase {
                input: "Foo -> '\u{e9}\u{1f600}'",
                out: Some(vec![("Foo", vec![lit('\u{e9}'), lit('\u{1f600}')])]),
            },
            TestCase {
                input: "Foo -> 'a\nb'",
                out: None,
            },
            TestCase {
                input: "Foo -> 'a",
                out: None,
            },
        ];

        assert_test_cases(tests);
    }

    #[test]
    fn parse_classes() {
        let tests = vec![
            TestCase {
                input: "Foo -> [a-z0-9]",
                out: Some(vec![("Foo", vec![class(vec![range('a', 'z'), range('0', '9')])])]),
            },
            TestCase {
                input: "Op -> [+-]",
                out: Some(vec![(
                    "Op",
                    vec![class(vec![ChoiceItem::Literal('+'), ChoiceItem::Literal('-')])],
                )]),
            },
            TestCase {
                input: "Op -> [-a]",
                out: Some(vec![(
                    "Op",
                    vec![class(vec![ChoiceItem::Literal('-'), ChoiceItem::Literal('a')])],
                )]),
            },
            TestCase {
                input: "C -> [ \\]\\n]",
                out: Some(vec![(
                    "C",
                    vec![class(vec![
                        ChoiceItem::Literal(' '),
                        ChoiceItem::Literal(']'),
                        ChoiceItem::Literal('\n'),
                    ])],
                )]),
            },
            TestCase {
                input: "C -> [z-a]",
                out: Some(vec![("C", vec![class(vec![range('z', 'a')])])]),
            },
            TestCase {
                input: "C -> []",
                out: Some(vec![("C", vec![class(vec![])])]),
            },
            TestCase {
                input: "C -> [a-",
                out: None,
            },
            TestCase {
                input: "C -> [ab",
                out: None,
            },
        ];

        assert_test_cases(tests);
    }

    #[test]
    fn parse_rules() {
        let tests = vec![
            TestCase {
                input: "Foo -> 'a' | 'b'",
                out: Some(vec![("Foo", vec![lit('a')]), ("Foo", vec![lit('b')])]),
            },
            TestCase {
                input: "A -> B\nB -> 'x'",
                out: Some(vec![("A", vec![nt("B")]), ("B", vec![lit('x')])]),
            },
            TestCase {
                input: "A ->\nB -> C D",
                out: Some(vec![("A", vec![]), ("B", vec![nt("C"), nt("D")])]),
            },
            TestCase {
                input: "A -> | x |",
                out: Some(vec![("A", vec![]), ("A", vec![nt("x")]), ("A", vec![])]),
            },
            TestCase {
                input: "A ->B|C",
                out: Some(vec![("A", vec![nt("B")]), ("A", vec![nt("C")])]),
            },
            // `-` is an identifier character, so this reads the name `A-`.
            TestCase {
                input: "A->B",
                out: None,
            },
            TestCase {
                input: "  \n\t",
                out: Some(vec![]),
            },
            TestCase {
                input: "Foo",
                out: None,
            },
            TestCase {
                input: "'a' -> B",
                out: None,
            },
        ];

        assert_test_cases(tests);
    }

    #[test]
    fn parse_example_grammar() {
        let input = "
            Sum     -> Sum     [+-] Product | Product
            Product -> Product [*/] Factor | Factor
            Factor  -> '(' Sum ')' | Number
            Number  -> [0-9] Number | [0-9]
        ";
        let g = parse(input).unwrap();
        let names: Vec<&str> = g.rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec!["Sum", "Sum", "Product", "Product", "Factor", "Factor", "Number", "Number"]
        );
        assert_eq!(
            g.rules()[4].symbols(),
            &[lit('('), nt("Sum"), lit(')')][..]
        );
        assert_eq!(
            g.rules()[6].symbols(),
            &[class(vec![range('0', '9')]), nt("Number")][..]
        );
    }

    #[test]
    fn missing_arrow_position() {
        let err = err_at("Foo");
        assert_eq!(err.kind, ErrorKind::ExpectedArrow);
        assert_eq!(
            err.position,
            Position {
                offset: 3,
                line: 0,
                column: 3
            }
        );

        let err = err_at("\n\n  Foo 'x'");
        assert_eq!(err.kind, ErrorKind::ExpectedArrow);
        assert_eq!(
            err.position,
            Position {
                offset: 7,
                line: 2,
                column: 5
            }
        );
    }

    #[test]
    fn trailing_identifier_is_a_reference() {
        let g = parse("A -> 'a'\n  Foo  \n").unwrap();
        assert_eq!(g.rules(), &[Rule::new("A", vec![lit('a'), nt("Foo")])][..]);
    }

    #[test]
    fn missing_name() {
        let err = err_at("  'a' -> B");
        assert_eq!(err.kind, ErrorKind::ExpectedNonTerminal);
        assert_eq!(err.position, Position::start());
    }

    #[test]
    fn unterminated_class() {
        let err = err_at("Foo -> [a-");
        assert_eq!(err.kind, ErrorKind::ExpectedCharacterLiteral);
        assert_eq!(err.position.offset, 10);
        assert_eq!(
            err.message(),
            "Expected `]` or a valid character literal"
        );
    }

    #[test]
    fn newline_inside_literal() {
        let err = err_at("Foo -> 'a\nb'");
        assert_eq!(err.kind, ErrorKind::ExpectedCharacterLiteral);
        assert_eq!(err.position.offset, 9);
        assert_eq!(err.position.line, 0);

        let err = err_at("Foo -> [\\\n]");
        assert_eq!(err.kind, ErrorKind::ExpectedCharacterLiteral);
        assert_eq!(err.position.offset, 8);
    }

    #[test]
    fn no_symbol() {
        let err = err_at("Foo -> 'a' ) 'b'");
        assert_eq!(err.kind, ErrorKind::ExpectedSymbol);
        // Raised before the whitespace the failed attempt skipped.
        assert_eq!(err.position.offset, 10);
    }

    #[test]
    fn terminal_before_arrow_is_misread() {
        // Only the last emitted symbol is taken back; the next rule then
        // starts at a quoted literal.
        let err = err_at("A -> x 'ab' -> y");
        assert_eq!(err.kind, ErrorKind::ExpectedNonTerminal);
        assert_eq!(err.position.offset, 6);
    }

    #[test]
    fn stream_is_clean_after_success() {
        let mut stream = CharStream::new("A -> B\nB -> 'b'\n");
        let g = parse_stream(&mut stream).unwrap();
        assert_eq!(g.len(), 2);
        assert!(stream.is_eof());
        assert_eq!(stream.checkpoint_depth(), 0);
    }

    #[test]
    fn reader_input() {
        let g = parse_reader("A -> 'a' | B".as_bytes()).unwrap();
        assert_eq!(g.len(), 2);

        let bad: &[u8] = &[b'A', b' ', 0xfe];
        assert!(matches!(parse_reader(bad), Err(Error::Io(_))));
        assert!(matches!(
            parse_reader("A".as_bytes()),
            Err(Error::Syntax(SyntaxError {
                kind: ErrorKind::ExpectedArrow,
                ..
            }))
        ));
    }
}

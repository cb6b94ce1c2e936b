//! Parser for the bracketed formula syntax, e.g. `{{a, -b}, {b; c}, {-a}}`.
//!
//! ```text
//! formula := '{' clause (sep clause)* '}'
//! clause  := '{' literal (sep literal)* '}'
//! literal := '-'? letter
//! sep     := ',' | ';'
//! ```
//!
//! Whitespace is ignored. An empty pair of braces is accepted as the empty clause or the empty
//! formula, so that everything [`Formula`] displays can be read back.

use crate::formula::{Clause, Formula, Literal, Variable};
use std::fmt::{self, Display, Formatter};
use std::iter::Peekable;
use std::str::CharIndices;

pub fn parse(text: &str) -> Result<Formula, ParseError> {
    let mut parser = Parser::new(text);
    let formula = parser.formula()?;
    match parser.next_token()? {
        None => Ok(formula),
        token => Err(parser.error(ParseErrorKind::TrailingInput, token)),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParseErrorKind {
    MissingOpeningBrace,
    ExpectedClause,
    ExpectedLiteral,
    ExpectedVariable,
    AdjacentSeparators,
    MisplacedSeparator,
    MissingSeparator,
    IllegalCharacter,
    Unterminated,
    TrailingInput,
}

impl ParseErrorKind {
    fn message(&self) -> &'static str {
        match self {
            ParseErrorKind::MissingOpeningBrace => {
                "a formula must start with an opening brace `{`"
            }
            ParseErrorKind::ExpectedClause => {
                "expected a clause; every clause must be enclosed in braces"
            }
            ParseErrorKind::ExpectedLiteral => "expected a literal",
            ParseErrorKind::ExpectedVariable => "expected a variable name (a single letter)",
            ParseErrorKind::AdjacentSeparators => {
                "the separators `,` and `;` must not follow each other directly"
            }
            ParseErrorKind::MisplacedSeparator => "a separator must follow an element",
            ParseErrorKind::MissingSeparator => "two elements must be separated by `,` or `;`",
            ParseErrorKind::IllegalCharacter => "illegal character",
            ParseErrorKind::Unterminated => {
                "reached the end of the formula without a closing brace `}`"
            }
            ParseErrorKind::TrailingInput => "the formula was closed but input remains",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The offending character, or `None` at the end of input.
    pub found: Option<char>,
    /// Byte offset of the offending character (the input length at the end of input).
    pub position: usize,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.found {
            Some(c) => write!(
                f,
                "{}: found `{}` at position {}",
                self.kind.message(),
                c,
                self.position
            ),
            None => write!(f, "{}: found end of input", self.kind.message()),
        }
    }
}

impl std::error::Error for ParseError {}

type Token = Option<(usize, char)>;

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            len: text.len(),
        }
    }

    /// The next significant character. Characters outside the alphabet are rejected here, so the
    /// grammar rules below only ever see braces, separators, `-` and letters.
    fn next_token(&mut self) -> Result<Token, ParseError> {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                let _ = self.chars.next();
            } else {
                break;
            }
        }
        let token = self.chars.next();
        match token {
            Some((_, c)) if !is_legal(c) => {
                Err(self.error(ParseErrorKind::IllegalCharacter, token))
            }
            _ => Ok(token),
        }
    }

    fn peek_is(&mut self, expected: char) -> bool {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                let _ = self.chars.next();
            } else {
                return c == expected;
            }
        }
        false
    }

    fn error(&self, kind: ParseErrorKind, token: Token) -> ParseError {
        match token {
            Some((position, c)) => ParseError {
                kind,
                found: Some(c),
                position,
            },
            None => ParseError {
                kind: ParseErrorKind::Unterminated,
                found: None,
                position: self.len,
            },
        }
    }

    fn formula(&mut self) -> Result<Formula, ParseError> {
        match self.next_token()? {
            Some((_, '{')) => {}
            // not `Unterminated`: an empty input never opened a formula
            token => {
                return Err(ParseError {
                    kind: ParseErrorKind::MissingOpeningBrace,
                    found: token.map(|(_, c)| c),
                    position: token.map_or(self.len, |(position, _)| position),
                })
            }
        }

        let mut clauses = vec![];
        if self.peek_is('}') {
            let _ = self.next_token()?;
            return Ok(Formula::new(clauses));
        }

        let mut after_separator = false;
        loop {
            match self.next_token()? {
                Some((_, '{')) => clauses.push(self.clause()?),
                token => {
                    let expected = ParseErrorKind::ExpectedClause;
                    return Err(self.unexpected_element(token, after_separator, expected));
                }
            }
            match self.next_token()? {
                Some((_, ',')) | Some((_, ';')) => after_separator = true,
                Some((_, '}')) => return Ok(Formula::new(clauses)),
                token => return Err(self.error(ParseErrorKind::MissingSeparator, token)),
            }
        }
    }

    /// Reads the remainder of a clause whose opening brace was consumed.
    fn clause(&mut self) -> Result<Clause, ParseError> {
        let mut literals = vec![];
        if self.peek_is('}') {
            let _ = self.next_token()?;
            return Ok(Clause::new(literals));
        }

        let mut after_separator = false;
        loop {
            match self.next_token()? {
                Some((_, '-')) => {
                    let variable = self.variable()?;
                    literals.push(Literal::Negative(variable));
                }
                Some((_, c)) if c.is_alphabetic() => literals.push(Literal::Positive(Variable(c))),
                token => {
                    let expected = ParseErrorKind::ExpectedLiteral;
                    return Err(self.unexpected_element(token, after_separator, expected));
                }
            }
            match self.next_token()? {
                Some((_, ',')) | Some((_, ';')) => after_separator = true,
                Some((_, '}')) => return Ok(Clause::new(literals)),
                token => return Err(self.error(ParseErrorKind::MissingSeparator, token)),
            }
        }
    }

    fn variable(&mut self) -> Result<Variable, ParseError> {
        match self.next_token()? {
            Some((_, c)) if c.is_alphabetic() => Ok(Variable(c)),
            token => Err(self.error(ParseErrorKind::ExpectedVariable, token)),
        }
    }

    fn unexpected_element(
        &self,
        token: Token,
        after_separator: bool,
        expected: ParseErrorKind,
    ) -> ParseError {
        let kind = match token {
            Some((_, ',')) | Some((_, ';')) if after_separator => {
                ParseErrorKind::AdjacentSeparators
            }
            Some((_, ',')) | Some((_, ';')) => ParseErrorKind::MisplacedSeparator,
            _ => expected,
        };
        self.error(kind, token)
    }
}

fn is_legal(c: char) -> bool {
    matches!(c, '{' | '}' | ',' | ';' | '-') || c.is_alphabetic()
}

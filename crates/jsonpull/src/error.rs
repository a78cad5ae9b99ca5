use alloc::{boxed::Box, string::String};
use core::fmt;
use std::io;

use bstr::BString;
use thiserror::Error;

use crate::{read::Position, token::TokenKind};

/// Alias for results produced by this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Error returned by every fallible operation in this crate.
///
/// Deserialization errors carry the position of the token that triggered
/// them. A session that returned an error must be discarded.
#[derive(Error, Debug)]
#[error("{kind}{}", DisplayPosition(.position))]
pub struct Error {
    kind: Box<ErrorKind>,
    position: Option<Position>,
}

/// What went wrong.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// The input is not lexically valid JSON.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    /// The input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// A token appeared where the grammar does not allow it.
    #[error("syntax error: {0}")]
    Grammar(#[from] GrammarError),
    /// The token kind does not match what the visitor asked for.
    #[error("invalid type: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the caller asked for.
        expected: &'static str,
        /// What the input contained.
        found: TokenKind,
    },
    /// A number that does not fit the requested type.
    #[error("number {literal} out of range for {target}")]
    NumericRange {
        /// The requested Rust type.
        target: &'static str,
        /// The literal as it appeared in the input.
        literal: BString,
    },
    /// A number the requested type's parser rejects.
    #[error("malformed number {literal} for {target}")]
    MalformedNumber {
        /// The requested Rust type.
        target: &'static str,
        /// The literal as it appeared in the input.
        literal: BString,
    },
    /// Typed visitors nested deeper than the configured recursion limit.
    #[error("recursion limit of {0} exceeded")]
    RecursionLimitExceeded(usize),
    /// A value the JSON data model cannot express.
    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),
    /// A message raised by a visitor or a `Serialize` implementation.
    #[error("{0}")]
    Message(String),
    /// The underlying reader or writer failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Lexical failures detected by the scanner and the string decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A byte that cannot start any token.
    #[error("invalid character '{}'", .0.escape_ascii())]
    InvalidByte(u8),
    /// The input ended before the closing quote.
    #[error("unterminated string")]
    UnterminatedString,
    /// A raw control character inside a string literal.
    #[error("control character '{}' in string", .0.escape_ascii())]
    ControlCharacter(u8),
    /// A number literal that breaks the JSON number grammar.
    #[error("invalid number")]
    InvalidNumber,
    /// A misspelled `true`, `false` or `null`.
    #[error("invalid literal")]
    InvalidLiteral,
    /// An unknown escape such as `\x`.
    #[error("invalid escape '\\{}'", .0.escape_ascii())]
    InvalidEscape(u8),
    /// A `\u` escape that does not decode to a scalar value.
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeEscape(u32),
    /// String contents are not valid UTF-8.
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
}

/// Grammar violations detected by the structural state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// An object member did not start with a string.
    #[error("expected string key")]
    ExpectedStringKey,
    /// A key was not followed by `:`.
    #[error("expected colon")]
    ExpectedColon,
    /// Members were not separated by `,`.
    #[error("expected comma")]
    ExpectedComma,
    /// A value was required.
    #[error("expected value")]
    ExpectedValue,
    /// A sequence visitor returned before draining the array.
    #[error("expected ']'")]
    ExpectedArrayEnd,
    /// A map visitor returned before draining the object.
    #[error("expected '}}'")]
    ExpectedObjectEnd,
    /// Non-whitespace input after the complete document.
    #[error("trailing characters")]
    TrailingCharacters,
    /// Nesting deeper than the configured limit.
    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),
    /// The state machine was used after it reported an error.
    #[error("parser used after an error")]
    Poisoned,
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Malformed bytes or tokens.
    Lex,
    /// Input ended early.
    Eof,
    /// Valid tokens in an invalid order.
    Grammar,
    /// Valid JSON that does not match the requested shape or range.
    Data,
    /// Values outside the JSON data model.
    Unsupported,
    /// Reader or writer failure.
    Io,
}

impl Error {
    pub(crate) fn new(kind: impl Into<ErrorKind>) -> Self {
        Self {
            kind: Box::new(kind.into()),
            position: None,
        }
    }

    pub(crate) fn at(kind: impl Into<ErrorKind>, position: Position) -> Self {
        Self {
            kind: Box::new(kind.into()),
            position: Some(position),
        }
    }

    pub(crate) fn or_at(mut self, position: Position) -> Self {
        self.position.get_or_insert(position);
        self
    }

    /// The kind of failure.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Where in the input the failure was detected, when known.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Line of the failure, or 0 when unknown.
    #[must_use]
    pub fn line(&self) -> usize {
        self.position.map_or(0, |p| p.line)
    }

    /// Column of the failure, or 0 when unknown.
    #[must_use]
    pub fn column(&self) -> usize {
        self.position.map_or(0, |p| p.column)
    }

    /// Classifies the error for callers that only need to branch on its
    /// broad cause.
    #[must_use]
    pub fn classify(&self) -> Category {
        match *self.kind {
            ErrorKind::Lex(_) => Category::Lex,
            ErrorKind::UnexpectedEndOfInput => Category::Eof,
            ErrorKind::Grammar(_) => Category::Grammar,
            ErrorKind::TypeMismatch { .. }
            | ErrorKind::NumericRange { .. }
            | ErrorKind::MalformedNumber { .. }
            | ErrorKind::RecursionLimitExceeded(_)
            | ErrorKind::Message(_) => Category::Data,
            ErrorKind::UnsupportedType(_) => Category::Unsupported,
            ErrorKind::Io(_) => Category::Io,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::new(err)
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::new(ErrorKind::Message(alloc::string::ToString::to_string(&msg)))
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::new(ErrorKind::Message(alloc::string::ToString::to_string(&msg)))
    }
}

struct DisplayPosition<'a>(&'a Option<Position>);

impl fmt::Display for DisplayPosition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, " at line {} column {}", p.line, p.column),
            None => Ok(()),
        }
    }
}

//! Scanner: turns a byte [`Source`] into raw JSON tokens, one per call.
//!
//! What it does
//! - Skips the four JSON whitespace bytes between tokens.
//! - Classifies each token into a [`TokenKind`] from its leading byte and
//!   copies the lexeme into a scratch buffer that is reused for every token.
//! - Finds string boundaries only. Escapes are kept verbatim; decoding is the
//!   dispatcher's job.
//! - Scans numbers by the JSON number grammar, taking the longest prefix.
//!
//! What it does not do
//! - It has no notion of nesting or of which token may follow which. The
//!   structural state machine enforces the grammar.
//!
//! Invariants
//! - The cursor never rewinds.
//! - The scratch buffer holds exactly the lexeme of the last token returned.
//! - `Ok(None)` means the source is exhausted; it is never confused with an
//!   empty token.

#[cfg(test)]
mod tests;

use alloc::vec::Vec;

use crate::{
    error::{Error, ErrorKind, LexError, Result},
    literal_buffer::{ExpectedLiteralBuffer, Step},
    read::{Position, Source},
    token::{Token, TokenKind},
};

/// Lexer over a [`Source`].
#[derive(Debug)]
pub struct Scanner<S> {
    source: S,
    scratch: Vec<u8>,
    start: Position,
    scanned: usize,
}

impl<S: Source> Scanner<S> {
    /// Creates a scanner positioned at the first byte of `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            scratch: Vec::with_capacity(64),
            start: Position::default(),
            scanned: 0,
        }
    }

    /// Produces the next token, or `Ok(None)` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns a [`LexError`] for bytes that cannot start a token, malformed
    /// numbers and keywords, raw control characters in strings and
    /// unterminated strings. Returns
    /// [`ErrorKind::UnexpectedEndOfInput`] when the input stops inside a
    /// number or keyword.
    pub fn next_raw_token(&mut self) -> Result<Option<Token<'_>>> {
        Ok(self.lex()?.map(|kind| Token {
            kind,
            bytes: &self.scratch,
        }))
    }

    /// The lexeme of the last token produced.
    #[must_use]
    pub fn lexeme(&self) -> &[u8] {
        &self.scratch
    }

    /// Where the last token started.
    #[must_use]
    pub fn token_start(&self) -> Position {
        self.start
    }

    /// Where the cursor currently is.
    #[must_use]
    pub fn position(&self) -> Position {
        self.source.position()
    }

    /// Number of tokens produced so far.
    #[must_use]
    pub fn tokens_scanned(&self) -> usize {
        self.scanned
    }

    /// Returns the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }

    pub(crate) fn lex(&mut self) -> Result<Option<TokenKind>> {
        self.scratch.clear();

        let first = loop {
            match self.source.peek()? {
                Some(b' ' | b'\t' | b'\n' | b'\r') => {
                    self.source.next()?;
                }
                Some(b) => break b,
                None => {
                    self.start = self.source.position();
                    return Ok(None);
                }
            }
        };
        self.start = self.source.position();

        let kind = match first {
            b'"' => self.lex_string()?,
            b'-' | b'0'..=b'9' => self.lex_number()?,
            b't' | b'f' | b'n' => self.lex_literal(first)?,
            _ => match TokenKind::from_punctuation(first) {
                Some(kind) => {
                    self.bump()?;
                    kind
                }
                None => return Err(self.error(LexError::InvalidByte(first))),
            },
        };

        self.scanned += 1;
        Ok(Some(kind))
    }

    #[inline]
    fn bump(&mut self) -> Result<()> {
        if let Some(b) = self.source.next()? {
            self.scratch.push(b);
        }
        Ok(())
    }

    fn error(&self, kind: impl Into<ErrorKind>) -> Error {
        Error::at(kind, self.source.position())
    }

    fn lex_string(&mut self) -> Result<TokenKind> {
        self.bump()?;
        loop {
            match self.source.next()? {
                None => return Err(self.error(LexError::UnterminatedString)),
                Some(b'"') => {
                    self.scratch.push(b'"');
                    return Ok(TokenKind::String);
                }
                Some(b'\\') => {
                    self.scratch.push(b'\\');
                    match self.source.next()? {
                        None => return Err(self.error(LexError::UnterminatedString)),
                        Some(b) if b < 0x20 => {
                            return Err(self.error(LexError::ControlCharacter(b)));
                        }
                        Some(b) => self.scratch.push(b),
                    }
                }
                Some(b) if b < 0x20 => return Err(self.error(LexError::ControlCharacter(b))),
                Some(b) => self.scratch.push(b),
            }
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind> {
        if self.source.peek()? == Some(b'-') {
            self.bump()?;
        }

        match self.source.peek()? {
            Some(b'0') => self.bump()?,
            Some(b'1'..=b'9') => self.digits()?,
            other => return Err(self.number_error(other)),
        }

        if self.source.peek()? == Some(b'.') {
            self.bump()?;
            self.required_digits()?;
        }

        if let Some(b'e' | b'E') = self.source.peek()? {
            self.bump()?;
            if let Some(b'+' | b'-') = self.source.peek()? {
                self.bump()?;
            }
            self.required_digits()?;
        }

        Ok(TokenKind::Number)
    }

    fn digits(&mut self) -> Result<()> {
        while let Some(b'0'..=b'9') = self.source.peek()? {
            self.bump()?;
        }
        Ok(())
    }

    fn required_digits(&mut self) -> Result<()> {
        match self.source.peek()? {
            Some(b'0'..=b'9') => self.digits(),
            other => Err(self.number_error(other)),
        }
    }

    fn number_error(&self, found: Option<u8>) -> Error {
        match found {
            None => self.error(ErrorKind::UnexpectedEndOfInput),
            Some(_) => self.error(LexError::InvalidNumber),
        }
    }

    fn lex_literal(&mut self, first: u8) -> Result<TokenKind> {
        self.bump()?;
        let mut literal = ExpectedLiteralBuffer::new(first);
        loop {
            let Some(b) = self.source.peek()? else {
                return Err(self.error(ErrorKind::UnexpectedEndOfInput));
            };
            match literal.step(b) {
                Step::NeedMore => self.bump()?,
                Step::Done(kind) => {
                    self.bump()?;
                    return Ok(kind);
                }
                Step::Reject => return Err(self.error(LexError::InvalidLiteral)),
            }
        }
    }
}

//! The structural state machine.
//!
//! [`StructuralStateMachine`] sits between the [`Scanner`] and the value
//! layer. Every raw token goes through [`transition`], a pure function of the
//! current [`ParserState`] and the token's [`TokenKind`]; the machine applies
//! the resulting stack effect. Colons and commas are consumed inside the
//! machine, so callers only ever see openers, closers, keys and scalars.
//!
//! Nesting lives in a `Vec<Frame>`. Closing a bracket pops it and resumes in
//! the comma state of the enclosing frame, or in `End` when the stack is
//! empty. No part of the grammar uses the call stack, so depth is bounded by
//! memory unless a `max_depth` is configured.

mod transition;

use alloc::vec::Vec;
use core::cell::Cell;

pub use transition::{Frame, ParserState, Transition, transition};

use crate::{
    error::{Error, ErrorKind, GrammarError, Result},
    read::{Position, Source},
    scanner::Scanner,
    token::{Token, TokenKind},
};

/// Pull parser producing structurally validated tokens.
#[derive(Debug)]
pub struct StructuralStateMachine<S> {
    scanner: Scanner<S>,
    state: ParserState,
    stack: Vec<Frame>,
    peeked: Option<TokenKind>,
    max_depth: Option<usize>,
    poisoned: Cell<bool>,
}

impl<S: Source> StructuralStateMachine<S> {
    /// Creates a machine expecting one JSON document from `source`.
    pub fn new(source: S) -> Self {
        Self {
            scanner: Scanner::new(source),
            state: ParserState::Value,
            stack: Vec::with_capacity(16),
            peeked: None,
            max_depth: None,
            poisoned: Cell::new(false),
        }
    }

    /// Limits nesting to `max_depth` levels. `None` removes the limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the next token without consuming it.
    ///
    /// Repeated calls return the same token and scan only once.
    ///
    /// # Errors
    ///
    /// Lexical and grammar errors, and
    /// [`ErrorKind::UnexpectedEndOfInput`] when the document is incomplete.
    pub fn peek(&mut self) -> Result<Token<'_>> {
        let kind = self.peek_kind()?;
        Ok(Token {
            kind,
            bytes: self.scanner.lexeme(),
        })
    }

    /// Returns and consumes the next token.
    ///
    /// # Errors
    ///
    /// See [`StructuralStateMachine::peek`].
    pub fn next(&mut self) -> Result<Token<'_>> {
        let kind = self.next_kind()?;
        Ok(Token {
            kind,
            bytes: self.scanner.lexeme(),
        })
    }

    /// Kind of the next token, without consuming it.
    ///
    /// # Errors
    ///
    /// See [`StructuralStateMachine::peek`].
    pub fn peek_kind(&mut self) -> Result<TokenKind> {
        if let Some(kind) = self.peeked {
            return Ok(kind);
        }
        let kind = self.advance()?;
        self.peeked = Some(kind);
        Ok(kind)
    }

    /// Consumes the next token and returns its kind.
    ///
    /// # Errors
    ///
    /// See [`StructuralStateMachine::peek`].
    pub fn next_kind(&mut self) -> Result<TokenKind> {
        match self.peeked.take() {
            Some(kind) => Ok(kind),
            None => self.advance(),
        }
    }

    /// Consumes one complete value, however deeply nested.
    ///
    /// # Errors
    ///
    /// Any error met while consuming, or [`GrammarError::ExpectedValue`] if
    /// the next token closes the enclosing compound instead.
    pub fn skip_value(&mut self) -> Result<()> {
        let depth = self.stack.len();
        let kind = self.next_kind()?;
        if kind.is_close() {
            return Err(Error::at(GrammarError::ExpectedValue, self.token_start()));
        }
        while self.stack.len() > depth {
            self.next_kind()?;
        }
        Ok(())
    }

    /// Checks that the document is complete and nothing but whitespace
    /// follows it.
    ///
    /// # Errors
    ///
    /// [`GrammarError::TrailingCharacters`] if tokens remain, either unread
    /// inside the document or after it.
    pub fn finish(&mut self) -> Result<()> {
        if self.poisoned.get() {
            return Err(Error::at(GrammarError::Poisoned, self.position()));
        }
        if self.state != ParserState::End || self.peeked.is_some() {
            return Err(Error::at(
                GrammarError::TrailingCharacters,
                self.token_start(),
            ));
        }
        match self.scanner.lex()? {
            None => Ok(()),
            Some(_) => Err(Error::at(
                GrammarError::TrailingCharacters,
                self.token_start(),
            )),
        }
    }

    /// The current grammar state.
    #[must_use]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of raw tokens pulled from the scanner, structural ones included.
    #[must_use]
    pub fn tokens_scanned(&self) -> usize {
        self.scanner.tokens_scanned()
    }

    /// Lexeme of the most recently scanned token, peeked or consumed.
    #[must_use]
    pub fn lexeme(&self) -> &[u8] {
        self.scanner.lexeme()
    }

    /// Where the most recent token started.
    #[must_use]
    pub fn token_start(&self) -> Position {
        self.scanner.token_start()
    }

    /// Where the cursor currently is.
    #[must_use]
    pub fn position(&self) -> Position {
        self.scanner.position()
    }

    /// Ends the session with `err`; later calls report
    /// [`GrammarError::Poisoned`]. Used by the value layer for errors the
    /// grammar cannot see, such as type mismatches.
    pub(crate) fn fail(&self, err: Error) -> Error {
        self.poisoned.set(true);
        err
    }

    fn advance(&mut self) -> Result<TokenKind> {
        if self.poisoned.get() {
            return Err(Error::at(GrammarError::Poisoned, self.position()));
        }
        let result = self.step();
        if let Err(_err) = &result {
            #[cfg(feature = "tracing")]
            tracing::trace!(state = ?self.state, depth = self.stack.len(), error = %_err, "parse error");
            self.poisoned.set(true);
        }
        #[cfg(any(test, feature = "fuzzing"))]
        assert_eq!(
            self.stack.is_empty(),
            matches!(self.state, ParserState::Value | ParserState::End),
            "Internal error: state {:?} at depth {}",
            self.state,
            self.stack.len()
        );
        result
    }

    fn step(&mut self) -> Result<TokenKind> {
        loop {
            let Some(kind) = self.scanner.lex()? else {
                return Err(Error::at(ErrorKind::UnexpectedEndOfInput, self.position()));
            };

            let action =
                transition(self.state, kind).map_err(|err| Error::at(err, self.token_start()))?;

            match action {
                Transition::Skip(next) => self.state = next,
                Transition::Emit(next) => {
                    self.state = next;
                    return Ok(kind);
                }
                Transition::Open(frame) => {
                    if let Some(max) = self.max_depth {
                        if self.stack.len() >= max {
                            return Err(Error::at(
                                GrammarError::DepthLimitExceeded(max),
                                self.token_start(),
                            ));
                        }
                    }
                    self.stack.push(frame);
                    self.state = frame.entry_state();
                    #[cfg(feature = "tracing")]
                    tracing::trace!(?frame, depth = self.stack.len(), "open");
                    return Ok(kind);
                }
                Transition::Close(frame) => {
                    let popped = self.stack.pop();
                    debug_assert_eq!(popped, Some(frame), "closer does not match frame");
                    self.state = self
                        .stack
                        .last()
                        .map_or(ParserState::End, |parent| parent.resume_state());
                    #[cfg(feature = "tracing")]
                    tracing::trace!(?frame, depth = self.stack.len(), "close");
                    return Ok(kind);
                }
            }
        }
    }
}

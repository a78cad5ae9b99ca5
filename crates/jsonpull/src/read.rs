//! Byte sources the scanner pulls from.
//!
//! A [`Source`] hands out one byte at a time with a single byte of lookahead
//! and keeps track of where in the document the cursor sits. Two sources are
//! provided: [`SliceSource`] for data already in memory and [`IoSource`] for
//! anything implementing [`std::io::Read`].
//!
//! `IoSource` reads byte by byte through [`io::Bytes`]; wrap unbuffered
//! readers (files, sockets) in a [`std::io::BufReader`] first.

use std::io;

/// A location in the input, 1-based for `line` and `column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column within the line in bytes, starting at 1.
    pub column: usize,
    /// Byte offset from the start of the input.
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl Position {
    #[inline]
    fn advance(&mut self, byte: u8) {
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

/// A pull-based byte provider with one byte of lookahead.
pub trait Source {
    /// Returns the next byte without consuming it, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying reader.
    fn peek(&mut self) -> io::Result<Option<u8>>;

    /// Consumes and returns the next byte, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying reader.
    fn next(&mut self) -> io::Result<Option<u8>>;

    /// Position of the byte that the next call to [`Source::next`] returns.
    fn position(&self) -> Position;
}

/// A [`Source`] over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    slice: &'a [u8],
    index: usize,
    pos: Position,
}

impl<'a> SliceSource<'a> {
    /// Creates a source reading `slice` from its first byte.
    #[must_use]
    pub fn new(slice: &'a [u8]) -> Self {
        Self {
            slice,
            index: 0,
            pos: Position::default(),
        }
    }
}

impl Source for SliceSource<'_> {
    #[inline]
    fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(self.slice.get(self.index).copied())
    }

    #[inline]
    fn next(&mut self) -> io::Result<Option<u8>> {
        let byte = self.slice.get(self.index).copied();
        if let Some(b) = byte {
            self.index += 1;
            self.pos.advance(b);
        }
        Ok(byte)
    }

    fn position(&self) -> Position {
        self.pos
    }
}

/// A [`Source`] over any [`io::Read`].
#[derive(Debug)]
pub struct IoSource<R> {
    bytes: io::Bytes<R>,
    peeked: Option<u8>,
    pos: Position,
}

impl<R: io::Read> IoSource<R> {
    /// Creates a source that consumes `reader` until it reports end of file.
    pub fn new(reader: R) -> Self {
        Self {
            bytes: reader.bytes(),
            peeked: None,
            pos: Position::default(),
        }
    }
}

impl<R: io::Read> Source for IoSource<R> {
    fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.peeked.is_none() {
            self.peeked = self.bytes.next().transpose()?;
        }
        Ok(self.peeked)
    }

    fn next(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.peeked.take() {
            Some(b) => Some(b),
            None => self.bytes.next().transpose()?,
        };
        if let Some(b) = byte {
            self.pos.advance(b);
        }
        Ok(byte)
    }

    fn position(&self) -> Position {
        self.pos
    }
}

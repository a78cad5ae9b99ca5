//! Decoding of `\uXXXX` escapes, including UTF-16 surrogate pairs.
//!
//! [`UnicodeEscapeBuffer`] accumulates ASCII hexadecimal digits one at a
//! time. A complete escape yields either a finished `char` or, for a high
//! surrogate, a request for the low half that must follow immediately as a
//! second `\u` escape.
use crate::error::LexError;

/// Outcome of feeding one hexadecimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Feed {
    /// Fewer than four digits so far.
    NeedMore,
    /// A high surrogate was decoded; the next escape must be its low half.
    NeedLowSurrogate,
    /// A complete scalar value.
    Char(char),
}

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    unit: u32,
    len: u8,
    high: Option<u32>,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any partial escape and pending high surrogate.
    pub fn reset(&mut self) {
        self.unit = 0;
        self.len = 0;
        self.high = None;
    }

    /// `true` while a high surrogate waits for its low half.
    pub fn awaiting_low_surrogate(&self) -> bool {
        self.high.is_some()
    }

    /// Takes the high surrogate still waiting for its low half, if any.
    pub fn take_unpaired(&mut self) -> Option<u32> {
        self.high.take()
    }

    /// Feeds a single ASCII hexadecimal digit.
    ///
    /// Returns an error for non-hex input, for a lone low surrogate, and for a
    /// high surrogate followed by anything but a low surrogate.
    pub fn feed(&mut self, byte: u8) -> Result<Feed, LexError> {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(LexError::InvalidEscape(byte)),
        };
        self.unit = (self.unit << 4) | u32::from(digit);
        self.len += 1;
        if self.len < 4 {
            return Ok(Feed::NeedMore);
        }

        let unit = self.unit;
        self.unit = 0;
        self.len = 0;

        match (self.high.take(), unit) {
            (None, 0xD800..=0xDBFF) => {
                self.high = Some(unit);
                Ok(Feed::NeedLowSurrogate)
            }
            (None, 0xDC00..=0xDFFF) => Err(LexError::InvalidUnicodeEscape(unit)),
            (None, _) => char::from_u32(unit)
                .map(Feed::Char)
                .ok_or(LexError::InvalidUnicodeEscape(unit)),
            (Some(high), 0xDC00..=0xDFFF) => {
                let code = 0x1_0000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                char::from_u32(code)
                    .map(Feed::Char)
                    .ok_or(LexError::InvalidUnicodeEscape(code))
            }
            (Some(high), _) => Err(LexError::InvalidUnicodeEscape(high)),
        }
    }
}

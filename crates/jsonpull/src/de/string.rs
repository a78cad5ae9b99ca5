//! Decoding of string tokens.
//!
//! The scanner hands over the raw lexeme, quotes and escapes included. A
//! string without a backslash is validated and borrowed as is; anything else
//! is decoded into the caller's scratch buffer.

use alloc::string::String;

use crate::{
    error::LexError,
    escape_buffer::{Feed, UnicodeEscapeBuffer},
};

/// Decodes a string lexeme, quotes included.
pub(crate) fn decode<'a>(lexeme: &'a [u8], scratch: &'a mut String) -> Result<&'a str, LexError> {
    let inner = lexeme
        .strip_prefix(b"\"")
        .and_then(|rest| rest.strip_suffix(b"\""))
        .ok_or(LexError::UnterminatedString)?;

    if !inner.contains(&b'\\') {
        return core::str::from_utf8(inner).map_err(|_| LexError::InvalidUtf8);
    }

    scratch.clear();
    let mut unicode = UnicodeEscapeBuffer::new();
    let mut rest = inner;

    while !rest.is_empty() {
        let run = rest.iter().position(|&b| b == b'\\').unwrap_or(rest.len());
        if run > 0 {
            unpaired(&mut unicode)?;
            let text = core::str::from_utf8(&rest[..run]).map_err(|_| LexError::InvalidUtf8)?;
            scratch.push_str(text);
            rest = &rest[run..];
            continue;
        }

        let Some((&escape, tail)) = rest[1..].split_first() else {
            return Err(LexError::UnterminatedString);
        };
        rest = tail;

        let decoded = match escape {
            b'u' => {
                let Some((digits, tail)) = rest.split_first_chunk::<4>() else {
                    return Err(LexError::InvalidEscape(b'u'));
                };
                rest = tail;
                let mut feed = Feed::NeedMore;
                for &digit in digits {
                    feed = unicode.feed(digit)?;
                }
                match feed {
                    Feed::Char(c) => c,
                    Feed::NeedLowSurrogate | Feed::NeedMore => continue,
                }
            }
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            other => return Err(LexError::InvalidEscape(other)),
        };
        unpaired(&mut unicode)?;
        scratch.push(decoded);
    }

    unpaired(&mut unicode)?;
    unicode.reset();
    Ok(scratch.as_str())
}

/// Fails if a high surrogate escape was not followed by its low half.
fn unpaired(unicode: &mut UnicodeEscapeBuffer) -> Result<(), LexError> {
    match unicode.take_unpaired() {
        Some(high) => Err(LexError::InvalidUnicodeEscape(high)),
        None => Ok(()),
    }
}

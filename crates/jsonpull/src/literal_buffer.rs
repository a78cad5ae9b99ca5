use crate::token::TokenKind;

/// What happened after feeding one more byte into the literal matcher?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched *and* it was the last byte of the literal.
    Done(TokenKind),
    /// Byte did **not** match the expected one.
    Reject,
}

/// Matches the remainder of `true`, `false` or `null` after its first byte.
///
/// `None` means no literal is in flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer(Option<(&'static [u8], TokenKind)>);

impl ExpectedLiteralBuffer {
    /// Start matching after the first byte (`n`, `t`, or `f`).
    pub fn new(first: u8) -> Self {
        match first {
            b'n' => Self(Some((b"ull", TokenKind::Null))),
            b't' => Self(Some((b"rue", TokenKind::True))),
            b'f' => Self(Some((b"alse", TokenKind::False))),
            _ => Self(None),
        }
    }

    pub fn step(&mut self, byte: u8) -> Step {
        let Some((bytes, kind)) = self.0 else {
            return Step::Reject;
        };

        match bytes.split_first() {
            Some((&expected, rest)) if expected == byte => {
                if rest.is_empty() {
                    self.0 = None;
                    Step::Done(kind)
                } else {
                    self.0 = Some((rest, kind));
                    Step::NeedMore
                }
            }
            _ => Step::Reject,
        }
    }
}

use core::fmt;

use bstr::BStr;

/// Lexical class of a token, computed once by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `{`
    ObjectOpen,
    /// `}`
    ObjectClose,
    /// `[`
    ArrayOpen,
    /// `]`
    ArrayClose,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// A string literal, quotes included.
    String,
    /// A number literal.
    Number,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
}

impl TokenKind {
    /// Classifies a punctuation byte.
    #[must_use]
    pub fn from_punctuation(byte: u8) -> Option<Self> {
        Some(match byte {
            b'{' => Self::ObjectOpen,
            b'}' => Self::ObjectClose,
            b'[' => Self::ArrayOpen,
            b']' => Self::ArrayClose,
            b':' => Self::Colon,
            b',' => Self::Comma,
            _ => return None,
        })
    }

    /// `true` for tokens that form a complete value on their own.
    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::String | Self::Number | Self::True | Self::False | Self::Null
        )
    }

    /// `true` for `}` and `]`.
    #[must_use]
    pub fn is_close(self) -> bool {
        matches!(self, Self::ObjectClose | Self::ArrayClose)
    }

    /// `true` for `{` and `[`.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::ObjectOpen | Self::ArrayOpen)
    }

    pub(crate) fn describe(self) -> &'static str {
        match self {
            Self::ObjectOpen => "'{'",
            Self::ObjectClose => "'}'",
            Self::ArrayOpen => "'['",
            Self::ArrayClose => "']'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::String => "string",
            Self::Number => "number",
            Self::True | Self::False => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// One lexical unit, borrowed from the scanner's buffer.
///
/// The bytes stay valid until the next token is requested; the borrow checker
/// enforces this through the `'a` lifetime.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The token's class.
    pub kind: TokenKind,
    /// The raw lexeme. String tokens include their quotes and escapes.
    pub bytes: &'a [u8],
}

impl Token<'_> {
    /// The first byte of the lexeme.
    #[must_use]
    pub fn leading_byte(&self) -> u8 {
        self.bytes.first().copied().unwrap_or_default()
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("bytes", &BStr::new(self.bytes))
            .finish()
    }
}

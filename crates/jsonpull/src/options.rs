/// How a number token is classified when the visitor asked for "anything".
///
/// Only `deserialize_any` consults this; typed requests such as
/// `deserialize_u8` always parse the literal as the requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberInference {
    /// Classify by the literal's shape.
    ///
    /// A literal containing `.`, `e` or `E` is a float. Otherwise a leading
    /// `-` makes it a signed integer and anything else an unsigned one.
    /// Integers that overflow 64 bits fall back to a float.
    #[default]
    Lexical,
    /// Classify by sign alone.
    ///
    /// A leading `-` selects a signed integer, anything else an unsigned one,
    /// and a literal that fails to parse as that integer is retried as a
    /// float. `1.5` therefore still decodes, but only after a failed integer
    /// parse.
    SignOnly,
}

/// Default for [`DeserializerOptions::recursion_limit`].
pub const DEFAULT_RECURSION_LIMIT: usize = 128;

/// Configuration for a [`Deserializer`](crate::Deserializer).
///
/// # Default
///
/// [`NumberInference::Lexical`], no nesting limit, and a recursion limit of
/// [`DEFAULT_RECURSION_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeserializerOptions {
    /// Classification of numbers in self-describing contexts.
    ///
    /// # Default
    ///
    /// [`NumberInference::Lexical`]
    pub number_inference: NumberInference,

    /// Maximum nesting depth of arrays and objects in the document.
    ///
    /// Nesting is tracked on the heap, so the parser itself and
    /// [`Value`](crate::Value) handle any depth that fits in memory.
    ///
    /// # Default
    ///
    /// `None` (unlimited)
    pub max_depth: Option<usize>,

    /// How many arrays, objects and enum payloads a visitor may have open
    /// at once.
    ///
    /// Typed visitors, such as those derived for recursive structs, use one
    /// call-stack frame per level. Past this limit decoding fails with
    /// [`ErrorKind::RecursionLimitExceeded`](crate::ErrorKind::RecursionLimitExceeded)
    /// instead of overflowing the stack. [`Value`](crate::Value) and skipped
    /// values do not count against it.
    ///
    /// # Default
    ///
    /// `Some(DEFAULT_RECURSION_LIMIT)`
    pub recursion_limit: Option<usize>,
}

impl Default for DeserializerOptions {
    fn default() -> Self {
        Self {
            number_inference: NumberInference::default(),
            max_depth: None,
            recursion_limit: Some(DEFAULT_RECURSION_LIMIT),
        }
    }
}

use crate::{error::GrammarError, token::TokenKind};

/// Where the parser is in the JSON grammar.
///
/// `ObjectKeyOrEnd` and `ArrayValueOrEnd` are the states directly after an
/// opener, the only places where a closer may follow without a member in
/// between. After a comma the plain `ObjectKey` / `ArrayValue` states apply,
/// which reject a closer and so catch trailing commas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    /// Expecting the top-level value.
    Value,
    /// Just after `{`: a key or `}`.
    ObjectKeyOrEnd,
    /// After a comma inside an object: a key.
    ObjectKey,
    /// After a key: `:`.
    ObjectColon,
    /// After `:`: a member value.
    ObjectValue,
    /// After a member value: `,` or `}`.
    ObjectComma,
    /// Just after `[`: an element or `]`.
    ArrayValueOrEnd,
    /// After a comma inside an array: an element.
    ArrayValue,
    /// After an element: `,` or `]`.
    ArrayComma,
    /// The document is complete.
    End,
}

/// One entry of the nesting stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    /// Inside `{ ... }`.
    Object,
    /// Inside `[ ... ]`.
    Array,
}

impl Frame {
    /// State entered right after this frame's opener.
    #[must_use]
    pub fn entry_state(self) -> ParserState {
        match self {
            Frame::Object => ParserState::ObjectKeyOrEnd,
            Frame::Array => ParserState::ArrayValueOrEnd,
        }
    }

    /// State to resume in once a child value of this frame has closed.
    #[must_use]
    pub fn resume_state(self) -> ParserState {
        match self {
            Frame::Object => ParserState::ObjectComma,
            Frame::Array => ParserState::ArrayComma,
        }
    }
}

/// What the state machine must do with a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Surface the token and move to the given state.
    Emit(ParserState),
    /// Push the frame, surface the opener and enter the frame's entry state.
    Open(Frame),
    /// Pop the frame, surface the closer and resume in the parent's state.
    Close(Frame),
    /// Swallow the token and fetch another one in the given state.
    Skip(ParserState),
}

/// The grammar as a pure function of the current state and the next token.
///
/// # Errors
///
/// Returns the class of token the state required when `kind` is not allowed.
pub fn transition(state: ParserState, kind: TokenKind) -> Result<Transition, GrammarError> {
    use ParserState::*;
    use Transition::{Close, Emit, Open, Skip};

    let value_position = matches!(state, Value | ObjectValue | ArrayValueOrEnd | ArrayValue);

    match (state, kind) {
        (_, TokenKind::ObjectOpen) if value_position => Ok(Open(Frame::Object)),
        (_, TokenKind::ArrayOpen) if value_position => Ok(Open(Frame::Array)),
        (Value, k) if k.is_scalar() => Ok(Emit(End)),
        (ObjectValue, k) if k.is_scalar() => Ok(Emit(ObjectComma)),
        (ArrayValueOrEnd | ArrayValue, k) if k.is_scalar() => Ok(Emit(ArrayComma)),

        (ObjectKeyOrEnd | ObjectKey, TokenKind::String) => Ok(Emit(ObjectColon)),
        (ObjectKeyOrEnd | ObjectComma, TokenKind::ObjectClose) => Ok(Close(Frame::Object)),
        (ArrayValueOrEnd | ArrayComma, TokenKind::ArrayClose) => Ok(Close(Frame::Array)),

        (ObjectColon, TokenKind::Colon) => Ok(Skip(ObjectValue)),
        (ObjectComma, TokenKind::Comma) => Ok(Skip(ObjectKey)),
        (ArrayComma, TokenKind::Comma) => Ok(Skip(ArrayValue)),

        (ObjectKeyOrEnd | ObjectKey, _) => Err(GrammarError::ExpectedStringKey),
        (ObjectColon, _) => Err(GrammarError::ExpectedColon),
        (ObjectComma | ArrayComma, _) => Err(GrammarError::ExpectedComma),
        (Value | ObjectValue | ArrayValueOrEnd | ArrayValue, _) => {
            Err(GrammarError::ExpectedValue)
        }
        (End, _) => Err(GrammarError::TrailingCharacters),
    }
}

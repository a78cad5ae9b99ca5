//! Flat hand-off of a value's tokens to the [`Value`](crate::Value) builder.
//!
//! `Value` asks for a newtype struct under a private name. The dispatcher
//! answers with a one-entry map whose value is the value's tokens as a flat
//! sequence: scalars as themselves, brackets as `char`s. The builder keeps
//! its open containers in a `Vec`, so no call frame is spent per level.

use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};

use super::{Deserializer, number::Inferred};
use crate::{
    error::{Error, GrammarError, Result},
    read::Source,
    token::TokenKind,
    value::TOKEN,
};

/// The map `{TOKEN: [tokens...]}`.
pub(crate) struct ValueHandoff<'a, S> {
    de: &'a mut Deserializer<S>,
    key_sent: bool,
}

impl<'a, S> ValueHandoff<'a, S> {
    pub(crate) fn new(de: &'a mut Deserializer<S>) -> Self {
        Self {
            de,
            key_sent: false,
        }
    }
}

impl<'de, S: Source> de::MapAccess<'de> for ValueHandoff<'_, S> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.key_sent {
            return Ok(None);
        }
        self.key_sent = true;
        seed.deserialize(TOKEN.into_deserializer()).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(Tokens { de: &mut *self.de })
    }
}

/// The token sequence of exactly one value.
struct Tokens<'a, S> {
    de: &'a mut Deserializer<S>,
}

impl<'de, S: Source> de::Deserializer<'de> for Tokens<'_, S> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_seq(TokenSeq {
            de: self.de,
            depth: 0,
            done: false,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct TokenSeq<'a, S> {
    de: &'a mut Deserializer<S>,
    depth: usize,
    done: bool,
}

impl<'de, S: Source> de::SeqAccess<'de> for TokenSeq<'_, S> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.done {
            return Ok(None);
        }
        let kind = self.de.machine.next_kind()?;
        match kind {
            TokenKind::ObjectOpen | TokenKind::ArrayOpen => self.depth += 1,
            TokenKind::ObjectClose | TokenKind::ArrayClose => {
                self.depth = self.depth.saturating_sub(1);
            }
            _ => {}
        }
        self.done = self.depth == 0;
        seed.deserialize(Piece {
            de: &mut *self.de,
            kind,
        })
        .map(Some)
    }
}

/// One token of the sequence, already consumed from the machine.
struct Piece<'a, S> {
    de: &'a mut Deserializer<S>,
    kind: TokenKind,
}

impl<'de, S: Source> de::Deserializer<'de> for Piece<'_, S> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = match self.kind {
            TokenKind::ObjectOpen => visitor.visit_char('{'),
            TokenKind::ObjectClose => visitor.visit_char('}'),
            TokenKind::ArrayOpen => visitor.visit_char('['),
            TokenKind::ArrayClose => visitor.visit_char(']'),
            TokenKind::Null => visitor.visit_unit(),
            TokenKind::True => visitor.visit_bool(true),
            TokenKind::False => visitor.visit_bool(false),
            TokenKind::String => visitor.visit_str(self.de.decode_current()?),
            TokenKind::Number => match self.de.infer_current()? {
                Inferred::Unsigned(n) => visitor.visit_u64(n),
                Inferred::Signed(n) => visitor.visit_i64(n),
                Inferred::Float(n) => visitor.visit_f64(n),
            },
            TokenKind::Colon | TokenKind::Comma => {
                return Err(self.de.fix(Error::new(GrammarError::ExpectedValue)));
            }
        };
        value.map_err(|err| self.de.fix(err))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

//! The value dispatcher: a [`serde::Deserializer`] over the structural state
//! machine.
//!
//! Every request from a visitor turns into at most one peek and one `next`
//! on the [`StructuralStateMachine`]. Compound values are handed to the
//! visitor through the accessors in [`access`], which pull members lazily;
//! nothing is materialized unless the visitor builds it.

mod access;
mod events;
pub(crate) mod number;
pub(crate) mod string;

use alloc::string::String;
use std::io;

use serde::de::{self, DeserializeOwned, IntoDeserializer, Visitor};

use self::{
    access::{MapAccess, SeqAccess, VariantAccess},
    events::ValueHandoff,
    number::Inferred,
};
use crate::{
    error::{Error, ErrorKind, GrammarError, Result},
    machine::StructuralStateMachine,
    options::DeserializerOptions,
    read::{IoSource, SliceSource, Source},
    token::TokenKind,
    value::{TOKEN, Value},
};

/// A JSON deserializer pulling tokens from a [`Source`].
///
/// One `Deserializer` decodes one document. Call [`Deserializer::end`] after
/// the value is decoded to reject trailing input; the `from_*` functions do
/// this for you.
#[derive(Debug)]
pub struct Deserializer<S> {
    machine: StructuralStateMachine<S>,
    options: DeserializerOptions,
    scratch: String,
    /// Visitor-driven compounds that may still be opened.
    remaining_depth: Option<usize>,
}

impl<'a> Deserializer<SliceSource<'a>> {
    /// Creates a deserializer over a string.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn from_str(input: &'a str) -> Self {
        Self::from_slice(input.as_bytes())
    }

    /// Creates a deserializer over a byte slice.
    #[must_use]
    pub fn from_slice(input: &'a [u8]) -> Self {
        Self::new(SliceSource::new(input))
    }
}

impl<R: io::Read> Deserializer<IoSource<R>> {
    /// Creates a deserializer over a reader.
    ///
    /// Bytes are pulled one at a time; wrap unbuffered readers in a
    /// [`std::io::BufReader`].
    pub fn from_reader(reader: R) -> Self {
        Self::new(IoSource::new(reader))
    }
}

impl<S: Source> Deserializer<S> {
    /// Creates a deserializer over any [`Source`] with default options.
    pub fn new(source: S) -> Self {
        let options = DeserializerOptions::default();
        Self {
            machine: StructuralStateMachine::new(source),
            options,
            scratch: String::new(),
            remaining_depth: options.recursion_limit,
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(self, options: DeserializerOptions) -> Self {
        Self {
            machine: self.machine.with_max_depth(options.max_depth),
            options,
            scratch: self.scratch,
            remaining_depth: options.recursion_limit,
        }
    }

    /// Checks that the input holds nothing but whitespace after the value.
    ///
    /// # Errors
    ///
    /// [`GrammarError::TrailingCharacters`] if more tokens follow, or
    /// [`GrammarError::Poisoned`] if an earlier call failed.
    pub fn end(&mut self) -> Result<()> {
        self.machine.finish()
    }

    /// Decodes the next value as a [`Value`] tree.
    ///
    /// The tree is assembled on the heap, so any depth the machine accepts
    /// decodes without growing the call stack.
    ///
    /// # Errors
    ///
    /// Lexical and grammar errors in the value.
    pub fn parse_value(&mut self) -> Result<Value> {
        de::Deserialize::deserialize(self)
    }

    /// The underlying state machine.
    pub fn machine(&mut self) -> &mut StructuralStateMachine<S> {
        &mut self.machine
    }

    /// Positions `err` at the current token, unless it already carries a
    /// position, and ends the session.
    fn fix(&self, err: Error) -> Error {
        self.machine.fail(err.or_at(self.machine.token_start()))
    }

    fn mismatch(&self, expected: &'static str, found: TokenKind) -> Error {
        self.fix(Error::new(ErrorKind::TypeMismatch { expected, found }))
    }

    /// Opens a visitor-driven compound, failing past the recursion limit.
    fn descend(&mut self) -> Result<()> {
        if let Some(remaining) = self.remaining_depth {
            if remaining == 0 {
                let limit = self.options.recursion_limit.unwrap_or_default();
                return Err(self.fix(Error::new(ErrorKind::RecursionLimitExceeded(limit))));
            }
            self.remaining_depth = Some(remaining - 1);
        }
        Ok(())
    }

    fn ascend(&mut self) {
        if let Some(remaining) = &mut self.remaining_depth {
            *remaining += 1;
        }
    }

    /// Consumes a number token and parses it with `parse`.
    fn parse_number<T>(
        &mut self,
        expected: &'static str,
        parse: impl FnOnce(&[u8]) -> Result<T, ErrorKind>,
    ) -> Result<T> {
        let kind = self.machine.next_kind()?;
        if kind != TokenKind::Number {
            return Err(self.mismatch(expected, kind));
        }
        parse(self.machine.lexeme()).map_err(|err| self.fix(Error::new(err)))
    }

    /// Consumes a string token and decodes it.
    fn read_str(&mut self) -> Result<&str> {
        let kind = self.machine.next_kind()?;
        if kind != TokenKind::String {
            return Err(self.mismatch("a string", kind));
        }
        self.decode_current()
    }

    /// Decodes the string token just consumed.
    fn decode_current(&mut self) -> Result<&str> {
        let start = self.machine.token_start();
        string::decode(self.machine.lexeme(), &mut self.scratch)
            .map_err(|err| self.machine.fail(Error::at(err, start)))
    }

    /// Classifies the number token just consumed.
    fn infer_current(&self) -> Result<Inferred> {
        number::infer(self.machine.lexeme(), self.options.number_inference)
            .map_err(|err| self.fix(Error::new(err)))
    }

    /// Consumes a string token that holds a map key and parses it with
    /// `parse`.
    fn parse_key<T>(&mut self, parse: impl FnOnce(&[u8]) -> Result<T, ErrorKind>) -> Result<T> {
        let parsed = parse(self.read_str()?.as_bytes());
        parsed.map_err(|err| self.fix(Error::new(err)))
    }

    /// Consumes the closer the visitor should have left behind.
    fn expect_close(&mut self, close: TokenKind) -> Result<()> {
        let kind = self.machine.next_kind()?;
        if kind == close {
            return Ok(());
        }
        let err = match close {
            TokenKind::ObjectClose => GrammarError::ExpectedObjectEnd,
            _ => GrammarError::ExpectedArrayEnd,
        };
        Err(self.fix(Error::new(err)))
    }
}

macro_rules! deserialize_number {
    ($($method:ident => $visit:ident($ty:ty, $parse:ident)),* $(,)?) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            let n = self.parse_number(stringify!($ty), number::$parse::<$ty>)?;
            visitor.$visit(n).map_err(|err| self.fix(err))
        }
    )*};
}

impl<'de, S: Source> de::Deserializer<'de> for &mut Deserializer<S> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = match self.machine.peek_kind()? {
            TokenKind::ObjectOpen => return self.deserialize_map(visitor),
            TokenKind::ArrayOpen => return self.deserialize_seq(visitor),
            TokenKind::True | TokenKind::False => return self.deserialize_bool(visitor),
            TokenKind::String => return self.deserialize_str(visitor),
            TokenKind::Null => {
                self.machine.next_kind()?;
                visitor.visit_unit()
            }
            TokenKind::Number => {
                self.machine.next_kind()?;
                match self.infer_current()? {
                    Inferred::Unsigned(n) => visitor.visit_u64(n),
                    Inferred::Signed(n) => visitor.visit_i64(n),
                    Inferred::Float(n) => visitor.visit_f64(n),
                }
            }
            TokenKind::ObjectClose
            | TokenKind::ArrayClose
            | TokenKind::Colon
            | TokenKind::Comma => {
                return Err(self.fix(Error::new(GrammarError::ExpectedValue)));
            }
        };
        value.map_err(|err| self.fix(err))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = match self.machine.next_kind()? {
            TokenKind::True => true,
            TokenKind::False => false,
            other => return Err(self.mismatch("a boolean", other)),
        };
        visitor.visit_bool(value).map_err(|err| self.fix(err))
    }

    deserialize_number! {
        deserialize_i8 => visit_i8(i8, parse_int),
        deserialize_i16 => visit_i16(i16, parse_int),
        deserialize_i32 => visit_i32(i32, parse_int),
        deserialize_i64 => visit_i64(i64, parse_int),
        deserialize_i128 => visit_i128(i128, parse_int),
        deserialize_u8 => visit_u8(u8, parse_int),
        deserialize_u16 => visit_u16(u16, parse_int),
        deserialize_u32 => visit_u32(u32, parse_int),
        deserialize_u64 => visit_u64(u64, parse_int),
        deserialize_u128 => visit_u128(u128, parse_int),
        deserialize_f32 => visit_f32(f32, parse_float),
        deserialize_f64 => visit_f64(f64, parse_float),
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = {
            let s = self.read_str()?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => visitor.visit_char(c),
                _ => Err(de::Error::invalid_value(
                    de::Unexpected::Str(s),
                    &"a single character",
                )),
            }
        };
        value.map_err(|err| self.fix(err))
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = visitor.visit_str(self.read_str()?);
        value.map_err(|err| self.fix(err))
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    /// Accepts a string, handing over its UTF-8 bytes, or an array of `u8`.
    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.machine.peek_kind()? {
            TokenKind::ArrayOpen => self.deserialize_seq(visitor),
            _ => {
                let value = visitor.visit_bytes(self.read_str()?.as_bytes());
                value.map_err(|err| self.fix(err))
            }
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.machine.peek_kind()? == TokenKind::Null {
            self.machine.next_kind()?;
            visitor.visit_none().map_err(|err| self.fix(err))
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.machine.next_kind()? {
            TokenKind::Null => visitor.visit_unit().map_err(|err| self.fix(err)),
            other => Err(self.mismatch("null", other)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if name == TOKEN {
            let value = visitor.visit_map(ValueHandoff::new(&mut *self));
            return value.map_err(|err| self.fix(err));
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let kind = self.machine.next_kind()?;
        if kind != TokenKind::ArrayOpen {
            return Err(self.mismatch("an array", kind));
        }
        self.descend()?;
        let value = visitor
            .visit_seq(SeqAccess::new(&mut *self))
            .map_err(|err| self.fix(err))?;
        self.ascend();
        self.expect_close(TokenKind::ArrayClose)?;
        Ok(value)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let kind = self.machine.next_kind()?;
        if kind != TokenKind::ObjectOpen {
            return Err(self.mismatch("an object", kind));
        }
        self.descend()?;
        let value = visitor
            .visit_map(MapAccess::new(&mut *self))
            .map_err(|err| self.fix(err))?;
        self.ascend();
        self.expect_close(TokenKind::ObjectClose)?;
        Ok(value)
    }

    /// A struct is a map; the field list only feeds diagnostics.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(self, visitor), err)
    )]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_map(visitor)
    }

    /// Externally tagged: `"Variant"` or `{"Variant": payload}`.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.machine.peek_kind()? {
            TokenKind::String => {
                let value = visitor.visit_enum(self.read_str()?.into_deserializer());
                value.map_err(|err| self.fix(err))
            }
            TokenKind::ObjectOpen => {
                self.machine.next_kind()?;
                self.descend()?;
                let value = visitor
                    .visit_enum(VariantAccess::new(&mut *self))
                    .map_err(|err| self.fix(err))?;
                self.ascend();
                self.expect_close(TokenKind::ObjectClose)?;
                Ok(value)
            }
            other => {
                self.machine.next_kind()?;
                Err(self.mismatch("a string or an object", other))
            }
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.machine.skip_value()?;
        visitor.visit_unit()
    }
}

/// Deserializes a `T` from a string of JSON text.
///
/// # Errors
///
/// Any lexical, grammar or data error, or trailing input after the value.
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    from_slice_with_options(input.as_bytes(), DeserializerOptions::default())
}

/// [`from_str`] with explicit options.
///
/// # Errors
///
/// See [`from_str`].
pub fn from_str_with_options<T: DeserializeOwned>(
    input: &str,
    options: DeserializerOptions,
) -> Result<T> {
    from_slice_with_options(input.as_bytes(), options)
}

/// Deserializes a `T` from bytes of JSON text.
///
/// # Errors
///
/// See [`from_str`].
pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    from_slice_with_options(input, DeserializerOptions::default())
}

/// [`from_slice`] with explicit options.
///
/// # Errors
///
/// See [`from_str`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(len = input.len()), err)
)]
pub fn from_slice_with_options<T: DeserializeOwned>(
    input: &[u8],
    options: DeserializerOptions,
) -> Result<T> {
    let mut de = Deserializer::from_slice(input).with_options(options);
    let value = T::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Deserializes a `T` from a reader.
///
/// # Errors
///
/// See [`from_str`]; reader failures surface as [`ErrorKind::Io`].
pub fn from_reader<R: io::Read, T: DeserializeOwned>(reader: R) -> Result<T> {
    from_reader_with_options(reader, DeserializerOptions::default())
}

/// [`from_reader`] with explicit options.
///
/// # Errors
///
/// See [`from_reader`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, err)
)]
pub fn from_reader_with_options<R: io::Read, T: DeserializeOwned>(
    reader: R,
    options: DeserializerOptions,
) -> Result<T> {
    let mut de = Deserializer::from_reader(reader).with_options(options);
    let value = T::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

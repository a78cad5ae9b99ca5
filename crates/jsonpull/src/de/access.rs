//! Compound accessors: the pull protocol a visitor uses to drain an array,
//! an object or an enum payload.
//!
//! The accessors hold no state of their own. End of compound is detected by
//! peeking for the closer, which is left in the lookahead for the dispatcher
//! to consume once the visitor returns.

use serde::de::{self, DeserializeSeed, Visitor};

use super::{Deserializer, number};
use crate::{
    error::{Error, Result},
    read::Source,
    token::TokenKind,
};

/// Element access for `[ ... ]`.
pub(crate) struct SeqAccess<'a, S> {
    de: &'a mut Deserializer<S>,
}

impl<'a, S> SeqAccess<'a, S> {
    pub(crate) fn new(de: &'a mut Deserializer<S>) -> Self {
        Self { de }
    }
}

impl<'de, S: Source> de::SeqAccess<'de> for SeqAccess<'_, S> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.de.machine.peek_kind()? == TokenKind::ArrayClose {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }
}

/// Member access for `{ ... }`.
pub(crate) struct MapAccess<'a, S> {
    de: &'a mut Deserializer<S>,
}

impl<'a, S> MapAccess<'a, S> {
    pub(crate) fn new(de: &'a mut Deserializer<S>) -> Self {
        Self { de }
    }
}

impl<'de, S: Source> de::MapAccess<'de> for MapAccess<'_, S> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.de.machine.peek_kind()? == TokenKind::ObjectClose {
            return Ok(None);
        }
        seed.deserialize(MapKey { de: &mut *self.de }).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }
}

/// Access to `{"Variant": payload}` after the opening brace.
pub(crate) struct VariantAccess<'a, S> {
    de: &'a mut Deserializer<S>,
}

impl<'a, S> VariantAccess<'a, S> {
    pub(crate) fn new(de: &'a mut Deserializer<S>) -> Self {
        Self { de }
    }
}

impl<'de, S: Source> de::EnumAccess<'de> for VariantAccess<'_, S> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self)> {
        let variant = seed.deserialize(MapKey { de: &mut *self.de })?;
        Ok((variant, self))
    }
}

impl<'de, S: Source> de::VariantAccess<'de> for VariantAccess<'_, S> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        de::Deserialize::deserialize(self.de)
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(self.de, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_map(self.de, visitor)
    }
}

/// Deserializer for object keys.
///
/// Keys are always strings on the wire. Integer and boolean keys are parsed
/// out of the string so maps such as `HashMap<u32, _>` round-trip.
pub(crate) struct MapKey<'a, S> {
    de: &'a mut Deserializer<S>,
}

macro_rules! deserialize_integer_key {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            let n = self.de.parse_key(number::parse_int::<$ty>)?;
            visitor.$visit(n).map_err(|err| self.de.fix(err))
        }
    )*};
}

impl<'de, S: Source> de::Deserializer<'de> for MapKey<'_, S> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_str(self.de, visitor)
    }

    deserialize_integer_key! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = match self.de.read_str()? {
            "true" => visitor.visit_bool(true),
            "false" => visitor.visit_bool(false),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"\"true\" or \"false\"",
            )),
        };
        value.map_err(|err| self.de.fix(err))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_enum(self.de, name, variants, visitor)
    }

    serde::forward_to_deserialize_any! {
        f32 f64 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

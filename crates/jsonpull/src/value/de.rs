use alloc::{string::String, vec::Vec};
use core::fmt;

use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use super::{Array, Map, Number, Value};

/// Newtype name under which [`crate::Deserializer`] hands a value over as a
/// flat token sequence instead of nested visitor calls.
pub(crate) const TOKEN: &str = "$jsonpull::private::Value";

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(Number::PosInt(v)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(Number::Float(v)))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(String::from(v)))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let Some(first) = access.next_key::<String>()? else {
            return Ok(Value::Object(Map::new()));
        };
        if first == TOKEN {
            return access.next_value_seed(TreeSeed);
        }
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0) + 1);
        map.insert(first, access.next_value()?);
        while let Some((k, v)) = access.next_entry::<String, Value>()? {
            map.insert(k, v);
        }
        Ok(Value::Object(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_newtype_struct(TOKEN, ValueVisitor)
    }
}

/// Builds a value from the flat token sequence behind [`TOKEN`].
struct TreeSeed;

impl<'de> DeserializeSeed<'de> for TreeSeed {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

/// A container still being filled. Objects hold the key awaiting its value.
enum Partial {
    Array(Array),
    Object(Map, Option<String>),
}

impl<'de> Visitor<'de> for TreeSeed {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the tokens of one JSON value")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut open: Vec<Partial> = Vec::new();
        while let Some(piece) = seq.next_element::<Piece>()? {
            let value = match piece {
                Piece::OpenArray => {
                    open.push(Partial::Array(Array::new()));
                    continue;
                }
                Piece::OpenObject => {
                    open.push(Partial::Object(Map::new(), None));
                    continue;
                }
                Piece::Close => match open.pop() {
                    Some(Partial::Array(items)) => Value::Array(items),
                    Some(Partial::Object(map, _)) => Value::Object(map),
                    None => return Err(de::Error::custom("unbalanced closing bracket")),
                },
                Piece::Text(text) => match open.last_mut() {
                    Some(Partial::Object(_, key @ None)) => {
                        *key = Some(text);
                        continue;
                    }
                    _ => Value::String(text),
                },
                Piece::Scalar(value) => value,
            };
            match open.last_mut() {
                None => return Ok(value),
                Some(Partial::Array(items)) => items.push(value),
                Some(Partial::Object(map, key)) => {
                    let Some(key) = key.take() else {
                        return Err(de::Error::custom("object member without a key"));
                    };
                    map.insert(key, value);
                }
            }
        }
        Err(de::Error::custom("token sequence ended inside a value"))
    }
}

/// One token of the flat sequence.
enum Piece {
    OpenArray,
    OpenObject,
    Close,
    Text(String),
    Scalar(Value),
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Piece, D::Error> {
        deserializer.deserialize_any(PieceVisitor)
    }
}

struct PieceVisitor;

impl Visitor<'_> for PieceVisitor {
    type Value = Piece;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON token")
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<Piece, E> {
        match v {
            '[' => Ok(Piece::OpenArray),
            '{' => Ok(Piece::OpenObject),
            ']' | '}' => Ok(Piece::Close),
            other => Err(E::invalid_value(de::Unexpected::Char(other), &self)),
        }
    }

    fn visit_bool<E>(self, v: bool) -> Result<Piece, E> {
        Ok(Piece::Scalar(Value::Bool(v)))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Piece, E> {
        Ok(Piece::Scalar(Value::Number(Number::from(v))))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Piece, E> {
        Ok(Piece::Scalar(Value::Number(Number::PosInt(v))))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Piece, E> {
        Ok(Piece::Scalar(Value::Number(Number::Float(v))))
    }

    fn visit_str<E>(self, v: &str) -> Result<Piece, E> {
        Ok(Piece::Text(String::from(v)))
    }

    fn visit_string<E>(self, v: String) -> Result<Piece, E> {
        Ok(Piece::Text(v))
    }

    fn visit_unit<E>(self) -> Result<Piece, E> {
        Ok(Piece::Scalar(Value::Null))
    }
}

struct NumberVisitor;

impl Visitor<'_> for NumberVisitor {
    type Value = Number;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON number")
    }

    fn visit_i64<E>(self, v: i64) -> Result<Number, E> {
        Ok(Number::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Number, E> {
        Ok(Number::PosInt(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Number, E> {
        Ok(Number::Float(v))
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Number, D::Error> {
        deserializer.deserialize_any(NumberVisitor)
    }
}

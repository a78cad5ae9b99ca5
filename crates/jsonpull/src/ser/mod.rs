//! The serializer: an append-only output buffer driven by
//! [`serde::Serialize`] implementations.
//!
//! Separators are decided by looking at the last byte written. A member of a
//! compound is preceded by `,` unless the buffer still ends with that
//! compound's opening bracket, which means it is the first member.

mod escape;
mod pool;

use alloc::{string::String, vec::Vec};
use core::fmt::{Debug, Display};
use std::io::{self, Write as _};

use serde::ser::{self, Impossible, Serialize};

pub use self::pool::{BufferPool, DEFAULT_BUFFER_CAPACITY, PooledBuffer};
use self::escape::write_escaped_str;
use crate::error::{Error, ErrorKind, Result};

/// A JSON serializer writing compact text into a [`PooledBuffer`].
#[derive(Debug)]
pub struct Serializer<'p> {
    out: PooledBuffer<'p>,
}

impl Serializer<'static> {
    /// Creates a serializer with its own buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: PooledBuffer::detached(),
        }
    }
}

impl Default for Serializer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> Serializer<'p> {
    /// Creates a serializer writing into a buffer leased from `pool`.
    ///
    /// The buffer goes back to the pool when the serializer is dropped.
    #[must_use]
    pub fn with_pool(pool: &'p BufferPool) -> Self {
        Self {
            out: pool.acquire(),
        }
    }

    /// The bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Consumes the serializer and returns the output.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.out.into_vec()
    }

    fn write_display(&mut self, value: impl Display) -> Result<()> {
        write!(&mut *self.out, "{value}").map_err(Error::from)
    }

    fn write_float(&mut self, value: impl Debug, finite: bool) -> Result<()> {
        if !finite {
            return Err(Error::new(ErrorKind::UnsupportedType("non-finite float")));
        }
        // Shortest round-trip form, always with a `.` or an exponent.
        write!(&mut *self.out, "{value:?}").map_err(Error::from)
    }

    /// Writes `,` unless the buffer ends with `opener`.
    fn separator(&mut self, opener: u8) {
        if self.out.last_byte() != Some(opener) {
            self.out.push(b',');
        }
    }

    fn begin(&mut self, opener: u8, close: &'static [u8]) -> Compound<'_, 'p> {
        self.out.push(opener);
        Compound {
            ser: self,
            opener,
            close,
        }
    }

    /// `{"variant":` followed by `opener`.
    fn begin_variant(
        &mut self,
        variant: &str,
        opener: u8,
        close: &'static [u8],
    ) -> Compound<'_, 'p> {
        self.out.push(b'{');
        write_escaped_str(&mut self.out, variant);
        self.out.push(b':');
        self.begin(opener, close)
    }
}

macro_rules! serialize_integer {
    ($($method:ident($ty:ty)),* $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<()> {
            self.write_display(v)
        }
    )*};
}

impl<'a, 'p> ser::Serializer for &'a mut Serializer<'p> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a, 'p>;
    type SerializeTuple = Compound<'a, 'p>;
    type SerializeTupleStruct = Compound<'a, 'p>;
    type SerializeTupleVariant = Compound<'a, 'p>;
    type SerializeMap = Compound<'a, 'p>;
    type SerializeStruct = Compound<'a, 'p>;
    type SerializeStructVariant = Compound<'a, 'p>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        let text: &[u8] = if v { b"true" } else { b"false" };
        self.out.extend_from_slice(text);
        Ok(())
    }

    serialize_integer! {
        serialize_i8(i8), serialize_i16(i16), serialize_i32(i32), serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8), serialize_u16(u16), serialize_u32(u32), serialize_u64(u64),
        serialize_u128(u128),
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.write_float(v, v.is_finite())
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.write_float(v, v.is_finite())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.serialize_str(v.encode_utf8(&mut [0; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        write_escaped_str(&mut self.out, v);
        Ok(())
    }

    /// Bytes become an array of numbers.
    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        let mut seq = self.begin(b'[', b"]");
        for byte in v {
            ser::SerializeSeq::serialize_element(&mut seq, byte)?;
        }
        ser::SerializeSeq::end(seq)
    }

    fn serialize_none(self) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.out.extend_from_slice(b"null");
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        self.out.push(b'{');
        write_escaped_str(&mut self.out, variant);
        self.out.push(b':');
        value.serialize(&mut *self)?;
        self.out.push(b'}');
        Ok(())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound<'a, 'p>> {
        Ok(self.begin(b'[', b"]"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Compound<'a, 'p>> {
        Ok(self.begin(b'[', b"]"))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Compound<'a, 'p>> {
        Ok(self.begin(b'[', b"]"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a, 'p>> {
        Ok(self.begin_variant(variant, b'[', b"]}"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Compound<'a, 'p>> {
        Ok(self.begin(b'{', b"}"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Compound<'a, 'p>> {
        Ok(self.begin(b'{', b"}"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a, 'p>> {
        Ok(self.begin_variant(variant, b'{', b"}}"))
    }
}

/// Handle for the members of an open array or object.
#[derive(Debug)]
pub struct Compound<'a, 'p> {
    ser: &'a mut Serializer<'p>,
    opener: u8,
    close: &'static [u8],
}

impl Compound<'_, '_> {
    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.ser.separator(self.opener);
        value.serialize(&mut *self.ser)
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.ser.separator(self.opener);
        write_escaped_str(&mut self.ser.out, key);
        self.ser.out.push(b':');
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> Result<()> {
        self.ser.out.extend_from_slice(self.close);
        Ok(())
    }
}

impl ser::SerializeSeq for Compound<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeTuple for Compound<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for Compound<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for Compound<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeMap for Compound<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.ser.separator(self.opener);
        key.serialize(MapKeySerializer {
            ser: &mut *self.ser,
        })
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.ser.out.push(b':');
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeStruct for Compound<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for Compound<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Writes map keys, which JSON only allows as strings.
///
/// Integer and boolean keys are written as their quoted text.
struct MapKeySerializer<'a, 'p> {
    ser: &'a mut Serializer<'p>,
}

fn key_must_be_a_string() -> Error {
    Error::new(ErrorKind::UnsupportedType("map key that is not a string"))
}

macro_rules! serialize_quoted_key {
    ($($method:ident($ty:ty)),* $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<()> {
            self.ser.out.push(b'"');
            self.ser.write_display(v)?;
            self.ser.out.push(b'"');
            Ok(())
        }
    )*};
}

impl ser::Serializer for MapKeySerializer<'_, '_> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Impossible<(), Error>;
    type SerializeStructVariant = Impossible<(), Error>;

    serialize_quoted_key! {
        serialize_bool(bool),
        serialize_i8(i8), serialize_i16(i16), serialize_i32(i32), serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8), serialize_u16(u16), serialize_u32(u32), serialize_u64(u64),
        serialize_u128(u128),
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Err(key_must_be_a_string())
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        Err(key_must_be_a_string())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.serialize_str(v.encode_utf8(&mut [0; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        write_escaped_str(&mut self.ser.out, v);
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Err(key_must_be_a_string())
    }

    fn serialize_none(self) -> Result<()> {
        Err(key_must_be_a_string())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Err(key_must_be_a_string())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Err(key_must_be_a_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Err(key_must_be_a_string())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_a_string())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_a_string())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_a_string())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_a_string())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_a_string())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_a_string())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_a_string())
    }
}

/// Serializes `value` as compact JSON bytes.
///
/// # Errors
///
/// [`ErrorKind::UnsupportedType`] for non-finite floats and non-string map
/// keys, or any error raised by the `Serialize` implementation.
pub fn to_vec<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut ser = Serializer::new();
    value.serialize(&mut ser)?;
    Ok(ser.into_inner())
}

/// Serializes `value` as a compact JSON string.
///
/// # Errors
///
/// See [`to_vec`].
pub fn to_string<T: ?Sized + Serialize>(value: &T) -> Result<String> {
    let bytes = to_vec(value)?;
    String::from_utf8(bytes)
        .map_err(|err| Error::new(ErrorKind::Message(alloc::string::ToString::to_string(&err))))
}

/// Serializes `value` into `writer`.
///
/// The document is built in memory and written with a single `write_all`.
///
/// # Errors
///
/// See [`to_vec`]; writer failures surface as [`ErrorKind::Io`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, err)
)]
pub fn to_writer<W: io::Write, T: ?Sized + Serialize>(mut writer: W, value: &T) -> Result<()> {
    let mut ser = Serializer::new();
    value.serialize(&mut ser)?;
    writer.write_all(ser.as_bytes())?;
    Ok(())
}

/// Serializes `value` through a buffer leased from `pool` and returns an
/// exact-size copy of the output.
///
/// The leased buffer returns to the pool on success and on error.
///
/// # Errors
///
/// See [`to_vec`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, err)
)]
pub fn to_vec_pooled<T: ?Sized + Serialize>(pool: &BufferPool, value: &T) -> Result<Vec<u8>> {
    let mut ser = Serializer::with_pool(pool);
    value.serialize(&mut ser)?;
    Ok(ser.as_bytes().to_vec())
}

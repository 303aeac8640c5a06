//! Serializer for the static subset of the Solidity ABI encoding.
//!
//! Channel messages only consist of fixed-size values (ids, addresses,
//! amounts, counters), so the encoding never needs the head/tail layout that
//! dynamic types require: every value occupies one or more 32-byte slots,
//! written in declaration order. Anything that would need an offset or a
//! length prefix is rejected, which keeps the canonical message unambiguous.
//!
//! Mapping from Rust/serde to slots:
//! - unsigned integers and `bool`: right aligned (big endian, zero padded)
//! - signed integers: right aligned, sign extended (two's complement)
//! - `serialize_bytes` with at most 32 bytes: left aligned (like `bytesN`)
//! - structs, tuples and fixed-size arrays: the slots of their fields
//! - unit and unit structs: nothing
//!
//! Note that `[u8; N]` arrays are serialized by serde as tuples, i.e. one
//! slot per byte. Use a newtype with a `serialize_bytes` implementation (see
//! [Hash][super::types::Hash]) to get `bytesN` semantics.

use super::error::{Error, Result};
use serde::{
    ser::{self, Impossible, SerializeStruct, SerializeTuple, SerializeTupleStruct},
    Serialize,
};

/// Size of one ABI slot in bytes.
pub const SLOT_SIZE: usize = 32;

pub trait Writer {
    fn write(&mut self, slot: &[u8]);
}

/// Collects the encoded slots, mostly useful for tests and debugging.
impl Writer for Vec<u8> {
    fn write(&mut self, slot: &[u8]) {
        self.extend_from_slice(slot);
    }
}

pub struct Serializer<'a, W>
where
    W: Writer,
{
    writer: &'a mut W,
}

pub fn to_writer<T, W>(value: &T, writer: &mut W) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Writer,
{
    let mut serializer = Serializer { writer };
    value.serialize(&mut serializer)
}

impl<'a, W: Writer> Serializer<'a, W> {
    fn write_right_aligned(&mut self, be_bytes: &[u8], fill: u8) -> Result<()> {
        debug_assert!(be_bytes.len() <= SLOT_SIZE);
        let mut slot = [fill; SLOT_SIZE];
        slot[SLOT_SIZE - be_bytes.len()..].copy_from_slice(be_bytes);
        self.writer.write(&slot);
        Ok(())
    }

    fn write_uint(&mut self, be_bytes: &[u8]) -> Result<()> {
        self.write_right_aligned(be_bytes, 0)
    }

    fn write_int(&mut self, be_bytes: &[u8], negative: bool) -> Result<()> {
        self.write_right_aligned(be_bytes, if negative { 0xff } else { 0x00 })
    }
}

impl<'a, 'b, W> ser::Serializer for &'b mut Serializer<'a, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.write_uint(&[v as u8])
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.write_int(&v.to_be_bytes(), v < 0)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.write_int(&v.to_be_bytes(), v < 0)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.write_uint(&[v])
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.write_uint(&v.to_be_bytes())
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.write_uint(&v.to_be_bytes())
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_uint(&v.to_be_bytes())
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.write_uint(&v.to_be_bytes())
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Err(Error::TypeNotRepresentable("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        Err(Error::TypeNotRepresentable("f64"))
    }

    fn serialize_char(self, _v: char) -> Result<()> {
        Err(Error::TypeNotRepresentable("char"))
    }

    fn serialize_str(self, _v: &str) -> Result<()> {
        Err(Error::TypeNotRepresentable("string"))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        if v.len() > SLOT_SIZE {
            return Err(Error::BytesTooLong(v.len()));
        }
        let mut slot = [0u8; SLOT_SIZE];
        slot[..v.len()].copy_from_slice(v);
        self.writer.write(&slot);
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        Err(Error::TypeNotRepresentable("option"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::TypeNotRepresentable("option"))
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        Err(Error::TypeNotRepresentable("enum"))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::TypeNotRepresentable("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::TypeNotRepresentable("dynamic array"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::TypeNotRepresentable("enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::TypeNotRepresentable("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::TypeNotRepresentable("enum"))
    }
}

impl<'a, 'b, W> SerializeTuple for &'b mut Serializer<'a, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'b, W> SerializeTupleStruct for &'b mut Serializer<'a, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'b, W> SerializeStruct for &'b mut Serializer<'a, W>
where
    W: Writer,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

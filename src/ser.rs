//! Conversion of any `serde::Serialize` type into a [`Value`].
//!
//! Serde attributes take the place of struct tags: `#[serde(skip)]` drops a
//! field, `#[serde(rename = "..")]` renames it, `skip_serializing_if` omits it
//! conditionally and `#[serde(flatten)]` inlines a nested struct. Fields keep
//! their declaration order.

use crate::{
    value::{Field, FieldOpts, Map},
    Error, Value,
};
use serde::ser::{self, Serialize};
use std::borrow::Cow;

impl Value<'static> {
    /// Converts `value` through its `Serialize` implementation. A failing
    /// implementation yields an inline `<error-Serialize: ..>` string.
    pub fn serde<T: Serialize + ?Sized>(value: &T) -> Value<'static> {
        value
            .serialize(ValueSerializer)
            .unwrap_or_else(|err| Value::Str(Cow::Owned(format!("<error-Serialize: {}>", err))))
    }
}

struct ValueSerializer;

type Result<T> = std::result::Result<T, Error>;

fn tagged(variant: &'static str, value: Value<'static>) -> Value<'static> {
    let mut map = Map::new(true);
    map.insert(Value::Str(Cow::Borrowed(variant)), value);
    Value::Map(map)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value<'static>;
    type Error = Error;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = SeqSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = StructSerializer;
    type SerializeStructVariant = StructSerializer;

    fn serialize_bool(self, v: bool) -> Result<Value<'static>> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value<'static>> {
        Ok(Value::I64(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Value<'static>> {
        Ok(Value::I64(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Value<'static>> {
        Ok(Value::I64(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Value<'static>> {
        Ok(Value::I64(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value<'static>> {
        Ok(Value::I128(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value<'static>> {
        Ok(Value::U64(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Value<'static>> {
        Ok(Value::U64(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Value<'static>> {
        Ok(Value::U64(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Value<'static>> {
        Ok(Value::U64(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value<'static>> {
        Ok(Value::U128(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value<'static>> {
        Ok(Value::F32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value<'static>> {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value<'static>> {
        Ok(Value::Str(Cow::Owned(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Value<'static>> {
        Ok(Value::Str(Cow::Owned(v.to_owned())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value<'static>> {
        Ok(Value::Seq(v.iter().map(|b| Value::U64((*b).into())).collect()))
    }

    fn serialize_none(self) -> Result<Value<'static>> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value<'static>> {
        Ok(Value::Present(Box::new(value.serialize(self)?)))
    }

    fn serialize_unit(self) -> Result<Value<'static>> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value<'static>> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value<'static>> {
        Ok(Value::Str(Cow::Borrowed(variant)))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value<'static>> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value<'static>> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer> {
        Ok(SeqSerializer {
            items: Vec::with_capacity(len.unwrap_or(0)),
            variant: None,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSerializer> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqSerializer> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqSerializer> {
        Ok(SeqSerializer {
            items: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer> {
        Ok(MapSerializer {
            entries: Vec::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<StructSerializer> {
        Ok(StructSerializer {
            fields: Vec::with_capacity(len),
            variant: None,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructSerializer> {
        Ok(StructSerializer {
            fields: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }
}

struct SeqSerializer {
    items: Vec<Value<'static>>,
    variant: Option<&'static str>,
}

impl SeqSerializer {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Result<Value<'static>> {
        let seq = Value::Seq(self.items);
        Ok(match self.variant {
            Some(variant) => tagged(variant, seq),
            None => seq,
        })
    }
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = Value<'static>;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value<'static>> {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = Value<'static>;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value<'static>> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Value<'static>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value<'static>> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SeqSerializer {
    type Ok = Value<'static>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value<'static>> {
        self.finish()
    }
}

struct MapSerializer {
    entries: Vec<(Value<'static>, Value<'static>)>,
    next_key: Option<Value<'static>>,
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Value<'static>;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(key.serialize(ValueSerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::Serialize("map value serialized before its key".into()))?;
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value<'static>> {
        Ok(Value::Map(self.entries.into_iter().collect()))
    }
}

struct StructSerializer {
    fields: Vec<Field<'static>>,
    variant: Option<&'static str>,
}

impl StructSerializer {
    fn push<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        let value = value.serialize(ValueSerializer)?;
        self.fields.push(Field::new(key, value, FieldOpts::new()));
        Ok(())
    }

    fn finish(self) -> Result<Value<'static>> {
        let record = Value::Struct(self.fields);
        Ok(match self.variant {
            Some(variant) => tagged(variant, record),
            None => record,
        })
    }
}

impl ser::SerializeStruct for StructSerializer {
    type Ok = Value<'static>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.push(key, value)
    }

    fn end(self) -> Result<Value<'static>> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for StructSerializer {
    type Ok = Value<'static>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.push(key, value)
    }

    fn end(self) -> Result<Value<'static>> {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{render, Format};
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn json<T: Serialize>(value: &T) -> String {
        render(&Value::serde(value), Format::Json)
    }

    #[derive(Serialize)]
    struct Plain {
        #[serde(rename = "A")]
        a: i32,
        #[serde(rename = "b", skip_serializing_if = "String::is_empty")]
        b: String,
    }

    #[test]
    fn honors_skip_serializing_if() {
        let plain = Plain {
            a: 0,
            b: String::new(),
        };
        assert_eq!("{\"A\":0}", json(&plain));
    }

    #[derive(Serialize)]
    struct Base {
        id: u64,
        ratio: f32,
    }

    #[derive(Serialize)]
    struct Job {
        #[serde(flatten)]
        base: Base,
        name: &'static str,
        #[serde(skip)]
        #[allow(dead_code)]
        token: &'static str,
        retries: Option<u8>,
    }

    #[test]
    fn flattens_in_declaration_order() {
        let job = Job {
            base: Base { id: 9, ratio: 0.1 },
            name: "reindex",
            token: "secret",
            retries: None,
        };
        assert_eq!(
            "{\"id\":9,\"ratio\":0.1,\"name\":\"reindex\",\"retries\":null}",
            json(&job)
        );
    }

    #[derive(Serialize)]
    enum Event {
        Started,
        Moved(i32, i32),
        Renamed { from: String },
        Wrapped(u8),
    }

    #[test]
    fn tags_enum_variants_externally() {
        assert_eq!("\"Started\"", json(&Event::Started));
        assert_eq!("{\"Moved\":[1,-1]}", json(&Event::Moved(1, -1)));
        assert_eq!(
            "{\"Renamed\":{\"from\":\"a\"}}",
            json(&Event::Renamed { from: "a".into() })
        );
        assert_eq!("{\"Wrapped\":3}", json(&Event::Wrapped(3)));
    }

    #[test]
    fn quotes_non_string_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(2u8, "b");
        map.insert(1u8, "a");
        assert_eq!("{\"1\":\"a\",\"2\":\"b\"}", json(&map));
    }

    struct Broken;

    impl Serialize for Broken {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(ser::Error::custom("not today"))
        }
    }

    #[test]
    fn failing_serialize_renders_inline_error() {
        assert_eq!("\"<error-Serialize: not today>\"", json(&Broken));
    }

    #[test]
    fn keeps_wide_integers() {
        assert_eq!("340282366920938463463374607431768211455", json(&u128::MAX));
        assert_eq!("[1,2]", json(&(1u8, 2i64)));
        assert_eq!("null", json(&()));
    }
}

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::head::ItemType;
use crate::ioutil::{ByteSink, ByteSource};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use yajbe_base::{err, Error, ErrorKind, Result};

/// An owned JSON-shaped document. Floats ride in OrderedFloat so the whole
/// tree can derive Eq/Ord/Hash; objects keep insertion order because the
/// field dictionary on the wire is order-sensitive.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    F32(OrderedFloat<f32>),
    F64(OrderedFloat<f64>),
    Bytes(Vec<u8>),
    Str(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Emit this tree through the streaming encoder. Containers go out in
    /// fixed-length form since their lengths are known.
    pub fn encode<'k, W: ByteSink>(&'k self, enc: &mut Encoder<'_, 'k, W>) -> Result<()> {
        match self {
            Value::Null => enc.encode_null(),
            Value::Bool(v) => enc.encode_bool(*v),
            Value::Int(v) => enc.encode_int(*v),
            Value::F32(v) => enc.encode_float32(v.0),
            Value::F64(v) => enc.encode_float64(v.0),
            Value::Bytes(v) => enc.encode_bytes(v),
            Value::Str(v) => enc.encode_string(v),
            Value::Array(items) => {
                enc.encode_array_fixed(items.len())?;
                for item in items {
                    item.encode(enc)?;
                }
                Ok(())
            }
            Value::Object(fields) => {
                enc.encode_object_fixed(fields.len())?;
                for (key, value) in fields {
                    enc.encode_field(key.as_bytes())?;
                    value.encode(enc)?;
                }
                Ok(())
            }
        }
    }

    /// Read one complete value; fixed and streamed containers both.
    pub fn decode<R: ByteSource>(dec: &mut Decoder<'_, R>) -> Result<Value> {
        let ty = dec.next()?;
        Value::decode_of(dec, ty)
    }

    fn decode_of<R: ByteSource>(dec: &mut Decoder<'_, R>, ty: ItemType) -> Result<Value> {
        match ty {
            ItemType::Null => Ok(Value::Null),
            ItemType::True => Ok(Value::Bool(true)),
            ItemType::False => Ok(Value::Bool(false)),
            ItemType::IntSmall | ItemType::IntPositive | ItemType::IntNegative => {
                Ok(Value::Int(dec.decode_int()?))
            }
            ItemType::Float32 => Ok(Value::F32(OrderedFloat(dec.decode_float32()?))),
            ItemType::Float64 => Ok(Value::F64(OrderedFloat(dec.decode_float64()?))),
            ItemType::SmallBytes | ItemType::Bytes => {
                Ok(Value::Bytes(dec.decode_bytes()?.to_vec()))
            }
            ItemType::SmallString | ItemType::String => {
                Ok(Value::Str(dec.decode_string()?.to_owned()))
            }
            ItemType::Array => {
                let count = dec.item_length();
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(Value::decode(dec)?);
                }
                Ok(Value::Array(items))
            }
            ItemType::ArrayEof => {
                let mut items = Vec::new();
                loop {
                    let ty = dec.next()?;
                    if ty == ItemType::Eof {
                        break;
                    }
                    items.push(Value::decode_of(dec, ty)?);
                }
                Ok(Value::Array(items))
            }
            ItemType::Object => {
                let count = dec.item_length();
                let mut fields = Vec::new();
                for _ in 0..count {
                    let key = utf8_key(dec.decode_field()?)?;
                    let value = Value::decode(dec)?;
                    fields.push((key, value));
                }
                Ok(Value::Object(fields))
            }
            ItemType::ObjectEof => {
                let mut fields = Vec::new();
                loop {
                    let key = match dec.next_field()? {
                        Some(name) => utf8_key(name)?,
                        None => break,
                    };
                    let value = Value::decode(dec)?;
                    fields.push((key, value));
                }
                Ok(Value::Object(fields))
            }
            ItemType::Eof => Err(err(
                ErrorKind::InvalidToken,
                "container terminator outside a streamed container",
            )),
            ItemType::FloatVle
            | ItemType::BigDecimal
            | ItemType::EnumConfig
            | ItemType::EnumString => Err(err(
                ErrorKind::UnsupportedTag,
                "reserved tag has no value representation",
            )),
        }
    }
}

fn utf8_key(name: &[u8]) -> Result<String> {
    String::from_utf8(name.to_vec()).map_err(|e| Error::new(ErrorKind::Malformed, e))
}

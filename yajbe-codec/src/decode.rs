use crate::fields::FieldDecoder;
use crate::head::{ItemType, TOKEN_MAP};
use crate::ioutil::ByteSource;
use yajbe_base::{err, Error, ErrorKind, Result};

/// Item length reported for a streamed container: count unknown, read items
/// until the sentinel.
pub const UNKNOWN_LENGTH: u64 = 1 << 63;

/// Streaming token reader. `next()` classifies the next head byte and
/// measures the item; one matching typed read then consumes the payload.
/// The (next, typed-read) pair is atomic from the caller's viewpoint --
/// calling `next()` again with an unconsumed payload desynchronises the
/// stream.
pub struct Decoder<'a, R: ByteSource> {
    source: &'a mut R,
    fields: &'a mut FieldDecoder,
    item_head: u8,
    item_type: Option<ItemType>,
    item_length: u64,
}

impl<'a, R: ByteSource> Decoder<'a, R> {
    pub fn new(source: &'a mut R, fields: &'a mut FieldDecoder) -> Self {
        Decoder {
            source,
            fields,
            item_head: 0,
            item_type: None,
            item_length: 0,
        }
    }

    /// Kind of the item `next()` last classified.
    pub fn item_type(&self) -> Option<ItemType> {
        self.item_type
    }

    /// Measured length of the item `next()` last classified: payload bytes
    /// for strings/bytes/floats, item count for containers (or
    /// UNKNOWN_LENGTH when streamed), continuation width for ints.
    pub fn item_length(&self) -> u64 {
        self.item_length
    }

    pub fn next(&mut self) -> Result<ItemType> {
        let head = self.source.read_u8()?;
        let ty = TOKEN_MAP[head as usize]
            .ok_or_else(|| err(ErrorKind::Malformed, "unassigned head byte"))?;
        self.item_head = head;
        self.item_type = Some(ty);
        self.item_length = match ty {
            ItemType::Array | ItemType::Object => {
                let w = (head & 0b1111) as u64;
                if w <= 10 {
                    w
                } else {
                    10 + self.source.read_uint(w as usize - 10)?
                }
            }
            ItemType::ArrayEof | ItemType::ObjectEof => UNKNOWN_LENGTH,
            ItemType::SmallBytes | ItemType::SmallString => (head & 0b11_1111) as u64,
            ItemType::Bytes | ItemType::String => {
                59 + self.source.read_uint((head & 0b11_1111) as usize - 59)?
            }
            ItemType::IntPositive | ItemType::IntNegative => ((head & 0b1_1111) - 23) as u64,
            ItemType::Float32 => 4,
            ItemType::Float64 => 8,
            _ => 0,
        };
        Ok(ty)
    }

    pub fn decode_null(&mut self) -> Result<()> {
        match self.item_type {
            Some(ItemType::Null) => Ok(()),
            _ => Err(self.refuse("expected a null token")),
        }
    }

    pub fn decode_bool(&mut self) -> Result<bool> {
        match self.item_type {
            Some(ItemType::True) => Ok(true),
            Some(ItemType::False) => Ok(false),
            _ => Err(self.refuse("expected a bool token")),
        }
    }

    pub fn decode_int(&mut self) -> Result<i64> {
        match self.item_type {
            Some(ItemType::IntSmall) => {
                let signed = (self.item_head & 0b0110_0000) == 0b0110_0000;
                let w = (self.item_head & 0b1_1111) as i64;
                Ok(if signed { -w } else { 1 + w })
            }
            Some(ItemType::IntPositive) => {
                let v = self.source.read_uint(self.item_length as usize)?;
                Ok(v.wrapping_add(25) as i64)
            }
            Some(ItemType::IntNegative) => {
                let v = self.source.read_uint(self.item_length as usize)?;
                Ok((v.wrapping_add(24) as i64).wrapping_neg())
            }
            _ => Err(self.refuse("expected an int token")),
        }
    }

    pub fn decode_float32(&mut self) -> Result<f32> {
        match self.item_type {
            Some(ItemType::Float32) => Ok(f32::from_bits(self.source.read_uint(4)? as u32)),
            _ => Err(self.refuse("expected a float32 token")),
        }
    }

    pub fn decode_float64(&mut self) -> Result<f64> {
        match self.item_type {
            Some(ItemType::Float64) => Ok(f64::from_bits(self.source.read_uint(8)?)),
            _ => Err(self.refuse("expected a float64 token")),
        }
    }

    /// Borrowed view of a bytes payload.
    pub fn decode_bytes(&mut self) -> Result<&[u8]> {
        match self.item_type {
            Some(ItemType::SmallBytes) | Some(ItemType::Bytes) => {
                self.source.read_slice(self.item_length as usize)
            }
            _ => Err(self.refuse("expected a bytes token")),
        }
    }

    /// Borrowed view of a string payload, checked for UTF-8.
    pub fn decode_string(&mut self) -> Result<&str> {
        match self.item_type {
            Some(ItemType::SmallString) | Some(ItemType::String) => {
                let bytes = self.source.read_slice(self.item_length as usize)?;
                std::str::from_utf8(bytes).map_err(|e| Error::new(ErrorKind::Malformed, e))
            }
            _ => Err(self.refuse("expected a string token")),
        }
    }

    /// Copying read of a bytes or string payload into a caller buffer;
    /// returns the payload length.
    pub fn decode_bytes_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.item_type {
            Some(ItemType::SmallBytes)
            | Some(ItemType::Bytes)
            | Some(ItemType::SmallString)
            | Some(ItemType::String) => {
                let len = self.item_length as usize;
                if buf.len() < len {
                    return Err(err(
                        ErrorKind::InvalidToken,
                        "destination shorter than the payload",
                    ));
                }
                self.source.read_bytes(&mut buf[..len])?;
                Ok(len)
            }
            _ => Err(self.refuse("expected a bytes or string token")),
        }
    }

    /// Decode the next object key. Valid wherever a field-name token is due:
    /// after a fixed-length object head, or between pairs of a streamed one.
    pub fn decode_field(&mut self) -> Result<&[u8]> {
        self.fields.decode_field(self.source)
    }

    /// Inside a streamed object: the next field name, or None at the
    /// container terminator.
    pub fn next_field(&mut self) -> Result<Option<&[u8]>> {
        let head = self.source.read_u8()?;
        if TOKEN_MAP[head as usize] == Some(ItemType::Eof) {
            self.item_head = head;
            self.item_type = Some(ItemType::Eof);
            self.item_length = 0;
            return Ok(None);
        }
        Ok(Some(self.fields.decode_with_head(self.source, head)?))
    }

    fn refuse(&self, wanted: &'static str) -> Error {
        match self.item_type {
            Some(ty) if ty.is_reserved() => err(
                ErrorKind::UnsupportedTag,
                "reserved tag has no readable payload",
            ),
            _ => err(ErrorKind::InvalidToken, wanted),
        }
    }
}

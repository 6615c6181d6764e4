use crate::fields::FieldEncoder;
use crate::ioutil::{uint_bytes_width, ByteSink};
use yajbe_base::{err, ErrorKind, Result};

/// Streaming token emitter. Holds exclusive borrows of the sink it writes
/// and the field dictionary it shares with every object in the stream; the
/// emitted bytes are a pure function of the call sequence and that state.
pub struct Encoder<'a, 'k, W: ByteSink> {
    sink: &'a mut W,
    fields: &'a mut FieldEncoder<'k>,
}

// Shared head-plus-length emission. Lengths up to `inline_max` ride in the
// head byte; larger ones put `inline_max + width` in the head and the excess
// in a 1..4 byte little-endian continuation. Four bytes is the ceiling for
// every user: strings/bytes run out of 6-bit head space at 59 + 4, and a
// container head of 10 + 5 would collide with the 0x0f streamed marker.
fn encode_length(sink: &mut impl ByteSink, head: u8, inline_max: u64, length: u64) -> Result<()> {
    if length <= inline_max {
        return sink.write_u8(head | length as u8);
    }
    let delta = length - inline_max;
    let bytes = uint_bytes_width(delta);
    if bytes > 4 {
        return Err(err(
            ErrorKind::Malformed,
            "length beyond the four-byte continuation",
        ));
    }
    sink.write_u8(head | (inline_max as usize + bytes) as u8)?;
    sink.write_uint(delta, bytes)
}

impl<'a, 'k, W: ByteSink> Encoder<'a, 'k, W> {
    pub fn new(sink: &'a mut W, fields: &'a mut FieldEncoder<'k>) -> Self {
        Encoder { sink, fields }
    }

    pub fn encode_null(&mut self) -> Result<()> {
        self.sink.write_u8(0)
    }

    pub fn encode_true(&mut self) -> Result<()> {
        self.sink.write_u8(0b11)
    }

    pub fn encode_false(&mut self) -> Result<()> {
        self.sink.write_u8(0b10)
    }

    pub fn encode_bool(&mut self, value: bool) -> Result<()> {
        self.sink.write_u8(if value { 0b11 } else { 0b10 })
    }

    /// Zero goes out on the negative side (head 0x60); the positive side
    /// starts at one. Wire fact, shared with every implementation.
    pub fn encode_int(&mut self, value: i64) -> Result<()> {
        if value > 0 {
            self.encode_positive_int(value as u64)
        } else {
            self.encode_negative_int(value.unsigned_abs())
        }
    }

    fn encode_positive_int(&mut self, value: u64) -> Result<()> {
        if value <= 24 {
            return self.sink.write_u8(0b0100_0000 | (value - 1) as u8);
        }
        let value = value - 25;
        let bytes = uint_bytes_width(value);
        self.sink.write_u8(0b0100_0000 | (23 + bytes) as u8)?;
        self.sink.write_uint(value, bytes)
    }

    fn encode_negative_int(&mut self, magnitude: u64) -> Result<()> {
        if magnitude <= 23 {
            return self.sink.write_u8(0b0110_0000 | magnitude as u8);
        }
        let magnitude = magnitude - 24;
        let bytes = uint_bytes_width(magnitude);
        self.sink.write_u8(0b0110_0000 | (23 + bytes) as u8)?;
        self.sink.write_uint(magnitude, bytes)
    }

    pub fn encode_float32(&mut self, value: f32) -> Result<()> {
        self.sink.write_u8(0b101)?;
        self.sink.write_bytes(&value.to_le_bytes())
    }

    pub fn encode_float64(&mut self, value: f64) -> Result<()> {
        self.sink.write_u8(0b110)?;
        self.sink.write_bytes(&value.to_le_bytes())
    }

    pub fn encode_string(&mut self, value: &str) -> Result<()> {
        encode_length(self.sink, 0b1100_0000, 59, value.len() as u64)?;
        self.sink.write_bytes(value.as_bytes())
    }

    pub fn encode_bytes(&mut self, value: &[u8]) -> Result<()> {
        encode_length(self.sink, 0b1000_0000, 59, value.len() as u64)?;
        self.sink.write_bytes(value)
    }

    pub fn encode_array_fixed(&mut self, count: usize) -> Result<()> {
        encode_length(self.sink, 0b0010_0000, 10, count as u64)
    }

    pub fn encode_array_start(&mut self) -> Result<()> {
        self.sink.write_u8(0b0010_1111)
    }

    pub fn encode_array_end(&mut self) -> Result<()> {
        self.sink.write_u8(1)
    }

    pub fn encode_object_fixed(&mut self, count: usize) -> Result<()> {
        encode_length(self.sink, 0b0011_0000, 10, count as u64)
    }

    pub fn encode_object_start(&mut self) -> Result<()> {
        self.sink.write_u8(0b0011_1111)
    }

    pub fn encode_object_end(&mut self) -> Result<()> {
        self.sink.write_u8(1)
    }

    /// Emit an object key. The key bytes must stay borrowed for the life of
    /// the field dictionary; the dictionary keeps them for index references.
    pub fn encode_field(&mut self, key: &'k [u8]) -> Result<()> {
        self.fields.encode_field(self.sink, key)
    }
}

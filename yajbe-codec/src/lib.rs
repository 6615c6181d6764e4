// YAJBE is a token stream. Every token starts with a head byte that carries
// the kind and, for most kinds, a small inline length or width:
//
// - 00000000 null, 00000010 false, 00000011 true, 00000001 end-of-container
// - 00000100..00000111 floats (vle-reserved, f32, f64, bigdecimal-reserved)
// - 00001000..00001010 enum tags (reserved)
// - 00100xxx array, 00110xxx object -- low nibble is an item count up to 10,
//   11..14 select a 1..4 byte count continuation, 15 marks a streamed
//   container that runs until the 0x01 sentinel
// - 010xxxxx positive int, 011xxxxx negative int -- low 5 bits hold small
//   values inline (1..24 and -0..-23), 24..31 select a 1..8 byte little-endian
//   continuation biased by 25 (positive) or 24 (negative)
// - 10xxxxxx bytes, 11xxxxxx string -- low 6 bits hold lengths up to 59
//   inline, 60..63 select a 1..4 byte length continuation biased by 59
//
// Object keys are not value tokens. They come from a separate field-name
// token space keyed on the top 3 bits (100 full name, 101 dictionary index,
// 110 prefix delta, 111 prefix+suffix delta) and lean on two pieces of
// shared state the encoder and decoder thread in lockstep: a first-seen
// dictionary of every name emitted so far, and the previous key for delta
// compression. See fields.rs.
//
// Multibyte integers on the value side are little-endian. The two-byte tier
// of a field-name length is big-endian. Both are wire facts carried from the
// other implementations of the format; neither is negotiable.

mod decode;
mod encode;
mod fields;
mod head;
mod ioutil;
mod value;


pub use decode::{Decoder, UNKNOWN_LENGTH};
pub use encode::Encoder;
pub use fields::{FieldDecoder, FieldEncoder};
pub use head::ItemType;
pub use ioutil::{ByteSink, ByteSource, MemReader, MemWriter};
pub use value::Value;

pub use yajbe_base::{Error, ErrorKind, Result};

// Small illustrative pieces shared by the demo executable: a sample
// document touching one field per primitive kind, and the len:hex rendering
// the other implementations of the format print in their demos.

use std::fmt::Write as _;

use yajbe_base::Result;
use yajbe_codec::{ByteSink, Encoder};

/// Encode the sample document: a fixed-length-1 array wrapping a streamed
/// object. The field names are deliberately prefix-heavy so the delta forms
/// show up in the dump.
pub fn encode_demo_document<W: ByteSink>(enc: &mut Encoder<'_, 'static, W>) -> Result<()> {
    enc.encode_array_fixed(1)?;
    enc.encode_object_start()?;
    enc.encode_field(b"field_null")?;
    enc.encode_null()?;
    enc.encode_field(b"bool_true")?;
    enc.encode_true()?;
    enc.encode_field(b"bool_false")?;
    enc.encode_false()?;
    enc.encode_field(b"field_int_0")?;
    enc.encode_int(3)?;
    enc.encode_field(b"field_int_1")?;
    enc.encode_int(1234)?;
    enc.encode_field(b"field_int_2")?;
    enc.encode_int(-543210)?;
    enc.encode_field(b"field_sm_str")?;
    enc.encode_string("foo")?;
    enc.encode_object_end()
}

/// Render a byte run as `len:0x...`.
pub fn hex_dump(buf: &[u8]) -> String {
    let mut out = String::with_capacity(buf.len() * 2 + 8);
    let _ = write!(out, "{}:0x", buf.len());
    for b in buf {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

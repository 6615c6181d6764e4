use crate::{Decoder, Encoder, FieldDecoder, FieldEncoder, ItemType, MemReader, MemWriter};
use test_log::test;
use yajbe_base::{ErrorKind, Result};

fn encode_string(value: &str, buf: &mut [u8]) -> Result<usize> {
    let mut fields = FieldEncoder::with_capacity(1);
    let mut w = MemWriter::new(buf);
    let mut enc = Encoder::new(&mut w, &mut fields);
    enc.encode_string(value)?;
    Ok(w.position())
}

#[test]
fn test_string_inline_lengths() -> Result<()> {
    let mut buf = [0u8; 80];

    let len = encode_string("", &mut buf)?;
    assert_eq!(&buf[..len], &[0xc0]);

    let len = encode_string("foo", &mut buf)?;
    assert_eq!(&buf[..len], &[0xc3, b'f', b'o', b'o']);

    // 59 is the last inline length; 60 takes a one-byte continuation.
    let s59 = "a".repeat(59);
    let len = encode_string(&s59, &mut buf)?;
    assert_eq!(buf[0], 0xfb);
    assert_eq!(len, 60);

    let s60 = "a".repeat(60);
    let len = encode_string(&s60, &mut buf)?;
    assert_eq!(&buf[..2], &[0xfc, 0x01]);
    assert_eq!(len, 62);
    Ok(())
}

#[test]
fn test_string_continuation_tiers() -> Result<()> {
    // 59 + 255 is the last one-byte tier; one more moves to two bytes.
    for (n, head) in [(314_usize, &[0xfc_u8, 0xff][..]), (315, &[0xfd, 0x00, 0x01])] {
        let s = "x".repeat(n);
        let mut buf = vec![0u8; n + 8];
        let len = encode_string(&s, &mut buf)?;
        assert_eq!(&buf[..head.len()], head, "length {}", n);

        let mut dfields = FieldDecoder::with_capacity(1, 1);
        let mut r = MemReader::new(&buf[..len]);
        let mut dec = Decoder::new(&mut r, &mut dfields);
        assert_eq!(dec.next()?, ItemType::String);
        assert_eq!(dec.item_length(), n as u64);
        assert_eq!(dec.decode_string()?, s);
    }
    Ok(())
}

#[test]
fn test_string_round_trip() -> Result<()> {
    for s in ["", "a", "hello", "héllo wörld", "\u{1f600}", "tab\tnl\n"] {
        let mut buf = [0u8; 80];
        let len = encode_string(s, &mut buf)?;

        let mut dfields = FieldDecoder::with_capacity(1, 1);
        let mut r = MemReader::new(&buf[..len]);
        let mut dec = Decoder::new(&mut r, &mut dfields);
        dec.next()?;
        assert_eq!(dec.decode_string()?, s);
    }
    Ok(())
}

#[test]
fn test_bytes_wire() -> Result<()> {
    let mut fields = FieldEncoder::with_capacity(1);
    let mut buf = [0u8; 80];
    let mut w = MemWriter::new(&mut buf);
    let mut enc = Encoder::new(&mut w, &mut fields);
    enc.encode_bytes(&[])?;
    enc.encode_bytes(&[0x01, 0x02, 0x03])?;
    assert_eq!(w.written(), &[0x80, 0x83, 0x01, 0x02, 0x03]);

    let mut dfields = FieldDecoder::with_capacity(1, 1);
    let mut r = MemReader::new(w.written());
    let mut dec = Decoder::new(&mut r, &mut dfields);
    assert_eq!(dec.next()?, ItemType::SmallBytes);
    assert_eq!(dec.decode_bytes()?, &[]);
    assert_eq!(dec.next()?, ItemType::SmallBytes);
    assert_eq!(dec.decode_bytes()?, &[0x01, 0x02, 0x03]);
    Ok(())
}

#[test]
fn test_bytes_continuation() -> Result<()> {
    let payload: Vec<u8> = (0..=255).cycle().take(400).map(|b: u16| b as u8).collect();
    let mut fields = FieldEncoder::with_capacity(1);
    let mut buf = vec![0u8; 512];
    let mut w = MemWriter::new(&mut buf);
    let mut enc = Encoder::new(&mut w, &mut fields);
    enc.encode_bytes(&payload)?;
    // 400 - 59 = 341 = 0x155, two-byte little-endian continuation.
    assert_eq!(&w.written()[..3], &[0xbd, 0x55, 0x01]);

    let mut dfields = FieldDecoder::with_capacity(1, 1);
    let mut r = MemReader::new(w.written());
    let mut dec = Decoder::new(&mut r, &mut dfields);
    assert_eq!(dec.next()?, ItemType::Bytes);
    assert_eq!(dec.item_length(), 400);
    assert_eq!(dec.decode_bytes()?, payload.as_slice());
    Ok(())
}

#[test]
fn test_decode_bytes_into() -> Result<()> {
    let mut buf = [0u8; 16];
    let len = encode_string("foo", &mut buf)?;

    let mut dfields = FieldDecoder::with_capacity(1, 1);
    let mut r = MemReader::new(&buf[..len]);
    let mut dec = Decoder::new(&mut r, &mut dfields);
    dec.next()?;
    let mut out = [0u8; 8];
    assert_eq!(dec.decode_bytes_into(&mut out)?, 3);
    assert_eq!(&out[..3], b"foo");

    // Destination too small is refused before any byte moves.
    let mut r = MemReader::new(&buf[..len]);
    let mut dec = Decoder::new(&mut r, &mut dfields);
    dec.next()?;
    let mut out = [0u8; 2];
    let err = dec.decode_bytes_into(&mut out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidToken);
    Ok(())
}

#[test]
fn test_string_invalid_utf8() {
    let bytes = [0xc1, 0xff];
    let mut dfields = FieldDecoder::with_capacity(1, 1);
    let mut r = MemReader::new(&bytes);
    let mut dec = Decoder::new(&mut r, &mut dfields);
    dec.next().unwrap();
    let err = dec.decode_string().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[test]
fn test_string_truncated_payload() {
    // Head promises 5 bytes, source carries 2.
    let bytes = [0xc5, b'a', b'b'];
    let mut dfields = FieldDecoder::with_capacity(1, 1);
    let mut r = MemReader::new(&bytes);
    let mut dec = Decoder::new(&mut r, &mut dfields);
    dec.next().unwrap();
    let err = dec.decode_string().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfSpace);
}

use crate::{Decoder, Encoder, FieldDecoder, FieldEncoder, ItemType, MemReader, MemWriter};
use test_log::test;
use yajbe_base::{ErrorKind, Result};

#[test]
fn test_bool_wire() -> Result<()> {
    let mut fields = FieldEncoder::with_capacity(1);
    let mut buf = [0u8; 8];
    let mut w = MemWriter::new(&mut buf);
    let mut enc = Encoder::new(&mut w, &mut fields);
    enc.encode_true()?;
    enc.encode_false()?;
    enc.encode_bool(true)?;
    enc.encode_bool(false)?;
    enc.encode_null()?;
    assert_eq!(w.written(), &[0x03, 0x02, 0x03, 0x02, 0x00]);

    let mut dfields = FieldDecoder::with_capacity(1, 1);
    let mut r = MemReader::new(w.written());
    let mut dec = Decoder::new(&mut r, &mut dfields);
    assert_eq!(dec.next()?, ItemType::True);
    assert!(dec.decode_bool()?);
    assert_eq!(dec.next()?, ItemType::False);
    assert!(!dec.decode_bool()?);
    assert_eq!(dec.next()?, ItemType::True);
    assert_eq!(dec.next()?, ItemType::False);
    assert_eq!(dec.next()?, ItemType::Null);
    dec.decode_null()?;
    Ok(())
}

#[test]
fn test_bool_type_confusion() {
    let bytes = [0x00];
    let mut dfields = FieldDecoder::with_capacity(1, 1);
    let mut r = MemReader::new(&bytes);
    let mut dec = Decoder::new(&mut r, &mut dfields);
    dec.next().unwrap();
    let err = dec.decode_bool().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidToken);

    // Nothing classified yet is also a refusal, not a panic.
    let bytes = [0x03];
    let mut r = MemReader::new(&bytes);
    let mut dec = Decoder::new(&mut r, &mut dfields);
    let err = dec.decode_bool().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidToken);
}

#[test]
fn test_unassigned_heads() {
    for head in 0x0b..=0x1f_u8 {
        let bytes = [head];
        let mut dfields = FieldDecoder::with_capacity(1, 1);
        let mut r = MemReader::new(&bytes);
        let mut dec = Decoder::new(&mut r, &mut dfields);
        let err = dec.next().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed, "head {:#04x}", head);
    }
}

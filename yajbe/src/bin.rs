use yajbe::{encode_demo_document, hex_dump};
use yajbe_base::Result;
use yajbe_codec::{
    Decoder, Encoder, FieldDecoder, FieldEncoder, ItemType, MemReader, MemWriter, Value,
};

fn main() -> Result<()> {
    let mut buf = [0u8; 1024];
    let mut writer = MemWriter::new(&mut buf);
    let mut fields = FieldEncoder::with_capacity(16);
    let mut enc = Encoder::new(&mut writer, &mut fields);
    encode_demo_document(&mut enc)?;

    let encoded = writer.written();
    println!("{}", hex_dump(encoded));

    // Walk the token stream the way a pull-parser would.
    let mut reader = MemReader::new(encoded);
    let mut names = FieldDecoder::with_capacity(16, 256);
    let mut dec = Decoder::new(&mut reader, &mut names);

    let ty = dec.next()?;
    println!("{:?} [{}]", ty, dec.item_length());
    let ty = dec.next()?;
    println!("{:?} {{streamed}}", ty);
    loop {
        let name = match dec.next_field()? {
            Some(name) => String::from_utf8_lossy(name).into_owned(),
            None => break,
        };
        match dec.next()? {
            ItemType::Null => println!("  {} = null", name),
            ItemType::True | ItemType::False => println!("  {} = {}", name, dec.decode_bool()?),
            ItemType::IntSmall | ItemType::IntPositive | ItemType::IntNegative => {
                println!("  {} = {}", name, dec.decode_int()?)
            }
            ItemType::SmallString | ItemType::String => {
                println!("  {} = {:?}", name, dec.decode_string()?)
            }
            other => println!("  {} = {:?}", name, other),
        }
    }

    // And again as one owned tree.
    let mut reader = MemReader::new(encoded);
    let mut names = FieldDecoder::with_capacity(16, 256);
    let mut dec = Decoder::new(&mut reader, &mut names);
    println!("{:#?}", Value::decode(&mut dec)?);

    Ok(())
}

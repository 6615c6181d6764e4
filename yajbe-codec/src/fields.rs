use crate::ioutil::{ByteSink, ByteSource};
use memchr::memmem;
use yajbe_base::{err, ErrorKind, Result};

// Field names live in their own token space, separate from value tokens.
// The top 3 bits of the head pick the form:
//
//   100----- full name        (name bytes follow)
//   101----- dictionary index (no name bytes; refers to a prior name)
//   110----- prefix delta     (1 byte shared-prefix count, then the tail)
//   111----- prefix+suffix    (1 byte prefix, 1 byte suffix, then the middle)
//
// The low 5 bits start a length (or index): 0..29 inline, 30 adds one byte
// biased by 29, 31 adds a big-endian byte pair biased by 284. The two-byte
// tier tops out at 65819.
//
// Both sides grow a dictionary of names in first-seen order and remember the
// previous name; the delta forms compress against that previous name, and
// the index form refers into the dictionary. The two dictionaries stay in
// lockstep because every non-indexed form appends on both sides.

// FNV-1a over the name bytes, except the multiplier reuses the offset basis
// rather than the FNV prime. The hash never reaches the wire; this exact
// variant is kept so that index assignment stays in step with the other
// implementations of the format.
fn field_hash(key: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c9dc5;
    for &b in key {
        hash ^= b as u32;
        hash = hash.wrapping_mul(0x811c9dc5);
    }
    hash
}

fn write_length(sink: &mut impl ByteSink, head: u8, length: usize) -> Result<()> {
    if length < 30 {
        sink.write_u8(head | length as u8)
    } else if length <= 284 {
        sink.write_u8(head | 30)?;
        sink.write_u8((length - 29) as u8)
    } else if length <= 65819 {
        sink.write_u8(head | 31)?;
        sink.write_u8(((length - 284) >> 8) as u8)?;
        sink.write_u8(((length - 284) & 0xff) as u8)
    } else {
        Err(err(
            ErrorKind::Malformed,
            "field length or index beyond the two-byte tier",
        ))
    }
}

fn read_length(source: &mut impl ByteSource, head: u8) -> Result<usize> {
    let length = (head & 0b0001_1111) as usize;
    if length < 30 {
        return Ok(length);
    }
    if length == 30 {
        return Ok(29 + source.read_u8()? as usize);
    }
    // Two-byte tier; big-endian, unlike every value-side continuation.
    let b0 = source.read_u8()? as usize;
    let b1 = source.read_u8()? as usize;
    Ok(284 + 256 * b0 + b1)
}

fn common_prefix(last: &[u8], key: &[u8]) -> usize {
    let len = last.len().min(key.len());
    let mut i = 0;
    while i < len && last[i] == key[i] {
        i += 1;
    }
    i
}

// Scans the true ends of both names; the bound keeps the shared suffix from
// reaching back into the shared prefix.
fn common_suffix(last: &[u8], key: &[u8], prefix: usize) -> usize {
    let len = last.len().min(key.len() - prefix);
    let mut i = 1;
    while i <= len {
        if last[last.len() - i] != key[key.len() - i] {
            return i - 1;
        }
        i += 1;
    }
    len
}

// FieldEncoder

#[derive(Clone, Copy, Default)]
struct EncoderEntry<'k> {
    name: Option<&'k [u8]>,
    hash: u32,
    index: u32,
}

/// Encoder-side name dictionary: a fixed-capacity open-addressed table with
/// linear probing and no deletion. The first `count` distinct names hold
/// indices 0..count; a full table is an out-of-space error, never a resize.
/// Name bytes are borrowed from the caller for the life of the stream.
pub struct FieldEncoder<'k> {
    entries: Box<[EncoderEntry<'k>]>,
    count: usize,
    last_key: Option<&'k [u8]>,
}

impl<'k> FieldEncoder<'k> {
    /// `capacity` is rounded up to a power of two; the probe mask needs one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.next_power_of_two();
        FieldEncoder {
            entries: vec![EncoderEntry::default(); capacity].into_boxed_slice(),
            count: 0,
            last_key: None,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, hash: u32, key: &[u8]) -> Option<u32> {
        let mask = self.entries.len() - 1;
        let mut hindex = hash as usize & mask;
        for _ in 0..self.entries.len() {
            let entry = &self.entries[hindex];
            match entry.name {
                None => return None,
                Some(name) if entry.hash == hash && name == key => return Some(entry.index),
                _ => {}
            }
            hindex = (hindex + 1) & mask;
        }
        None
    }

    fn add(&mut self, hash: u32, key: &'k [u8]) -> Result<u32> {
        if self.count == self.entries.len() {
            return Err(err(ErrorKind::OutOfSpace, "field name table full"));
        }
        let mask = self.entries.len() - 1;
        let mut hindex = hash as usize & mask;
        loop {
            let entry = &self.entries[hindex];
            match entry.name {
                None => break,
                Some(name) if entry.hash == hash && name == key => return Ok(entry.index),
                _ => hindex = (hindex + 1) & mask,
            }
        }
        let index = self.count as u32;
        self.count += 1;
        self.entries[hindex] = EncoderEntry {
            name: Some(key),
            hash,
            index,
        };
        Ok(index)
    }

    /// Emit one field-name token for `key`, choosing among the four forms,
    /// and register the name for future index references.
    pub fn encode_field(&mut self, sink: &mut impl ByteSink, key: &'k [u8]) -> Result<()> {
        let hash = field_hash(key);
        if let Some(index) = self.get(hash, key) {
            self.last_key = Some(key);
            return write_length(sink, 0b1010_0000, index as usize);
        }

        match self.last_key {
            // Delta forms only pay off against a key of some length; short
            // previous keys always take the full form.
            Some(last) if last.len() > 4 => {
                let prefix = common_prefix(last, key).min(0xff);
                let suffix = common_suffix(last, key, prefix).min(0xff);
                if suffix > 2 {
                    write_length(sink, 0b1110_0000, key.len() - prefix - suffix)?;
                    sink.write_u8(prefix as u8)?;
                    sink.write_u8(suffix as u8)?;
                    sink.write_bytes(&key[prefix..key.len() - suffix])?;
                } else if prefix > 2 {
                    write_length(sink, 0b1100_0000, key.len() - prefix)?;
                    sink.write_u8(prefix as u8)?;
                    sink.write_bytes(&key[prefix..])?;
                } else {
                    write_full_name(sink, key)?;
                }
            }
            _ => write_full_name(sink, key)?,
        }

        self.add(hash, key)?;
        self.last_key = Some(key);
        Ok(())
    }
}

fn write_full_name(sink: &mut impl ByteSink, key: &[u8]) -> Result<()> {
    write_length(sink, 0b1000_0000, key.len())?;
    sink.write_bytes(key)
}

// FieldDecoder

#[derive(Clone, Copy, Default)]
struct DecoderEntry {
    off: usize,
    len: usize,
}

/// Decoder-side name dictionary: entries in decode order (index = position)
/// over a fixed append-only arena holding the reconstructed name bytes.
/// Entries address the arena by offset, so index references and delta bases
/// stay valid as the arena fills.
pub struct FieldDecoder {
    entries: Box<[DecoderEntry]>,
    count: usize,
    arena: Box<[u8]>,
    arena_off: usize,
    last_field: Option<DecoderEntry>,
}

impl FieldDecoder {
    pub fn with_capacity(max_fields: usize, arena_size: usize) -> Self {
        FieldDecoder {
            entries: vec![DecoderEntry::default(); max_fields].into_boxed_slice(),
            count: 0,
            arena: vec![0u8; arena_size].into_boxed_slice(),
            arena_off: 0,
            last_field: None,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Decode one field-name token, head byte included.
    pub fn decode_field(&mut self, source: &mut impl ByteSource) -> Result<&[u8]> {
        let head = source.read_u8()?;
        self.decode_with_head(source, head)
    }

    pub(crate) fn decode_with_head(
        &mut self,
        source: &mut impl ByteSource,
        head: u8,
    ) -> Result<&[u8]> {
        let entry = match head >> 5 {
            0b100 => self.read_full_name(source, head)?,
            0b101 => self.read_indexed(source, head)?,
            0b110 => self.read_prefix_delta(source, head)?,
            0b111 => self.read_prefix_suffix_delta(source, head)?,
            _ => return Err(err(ErrorKind::Malformed, "unexpected field name head")),
        };
        self.last_field = Some(entry);
        Ok(&self.arena[entry.off..entry.off + entry.len])
    }

    fn read_full_name(&mut self, source: &mut impl ByteSource, head: u8) -> Result<DecoderEntry> {
        let length = read_length(source, head)?;
        let off = self.reserve(length)?;
        source.read_bytes(&mut self.arena[off..off + length])?;
        self.append(off, length)
    }

    fn read_indexed(&mut self, source: &mut impl ByteSource, head: u8) -> Result<DecoderEntry> {
        let index = read_length(source, head)?;
        if index >= self.count {
            return Err(err(ErrorKind::Malformed, "field index out of range"));
        }
        // Refers to the existing entry's bytes; nothing is appended.
        Ok(self.entries[index])
    }

    fn read_prefix_delta(&mut self, source: &mut impl ByteSource, head: u8) -> Result<DecoderEntry> {
        let length = read_length(source, head)?;
        let prefix = source.read_u8()? as usize;
        let last = self.delta_base(prefix, 0)?;
        let off = self.reserve(prefix + length)?;
        self.arena.copy_within(last.off..last.off + prefix, off);
        source.read_bytes(&mut self.arena[off + prefix..off + prefix + length])?;
        self.append(off, prefix + length)
    }

    fn read_prefix_suffix_delta(
        &mut self,
        source: &mut impl ByteSource,
        head: u8,
    ) -> Result<DecoderEntry> {
        let length = read_length(source, head)?;
        let mut delta = [0u8; 2];
        source.read_bytes(&mut delta)?;
        let (prefix, suffix) = (delta[0] as usize, delta[1] as usize);
        let last = self.delta_base(prefix, suffix)?;
        let total = prefix + length + suffix;
        let off = self.reserve(total)?;
        self.arena.copy_within(last.off..last.off + prefix, off);
        source.read_bytes(&mut self.arena[off + prefix..off + prefix + length])?;
        self.arena.copy_within(
            last.off + last.len - suffix..last.off + last.len,
            off + prefix + length,
        );
        self.append(off, total)
    }

    fn delta_base(&self, prefix: usize, suffix: usize) -> Result<DecoderEntry> {
        let last = self
            .last_field
            .ok_or_else(|| err(ErrorKind::Malformed, "field delta with no previous field"))?;
        if prefix > last.len || suffix > last.len {
            return Err(err(
                ErrorKind::Malformed,
                "field delta reaches outside the previous field",
            ));
        }
        Ok(last)
    }

    fn reserve(&mut self, len: usize) -> Result<usize> {
        if self.count == self.entries.len() {
            return Err(err(ErrorKind::OutOfSpace, "field name table full"));
        }
        if self.arena.len() - self.arena_off < len {
            return Err(err(ErrorKind::OutOfSpace, "field name arena full"));
        }
        Ok(self.arena_off)
    }

    // A name whose bytes already occur in the arena gets pointed at the
    // existing occurrence rather than retained twice. The search is
    // quadratic as the arena fills, so it is probably worth a limit or a
    // different structure for big dictionaries.
    fn append(&mut self, off: usize, len: usize) -> Result<DecoderEntry> {
        let (seen, staged) = self.arena.split_at(off);
        let entry = match memmem::find(seen, &staged[..len]) {
            Some(pos) => DecoderEntry { off: pos, len },
            None => {
                self.arena_off = off + len;
                DecoderEntry { off, len }
            }
        };
        self.entries[self.count] = entry;
        self.count += 1;
        Ok(entry)
    }
}

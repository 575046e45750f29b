use pocol_types::{bytes, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Object file header. All fields are little-endian on the wire.
///
/// The header occupies the first [`Header::LEN`] bytes of the object and is
/// loaded into VM memory together with the code section, so a well-formed
/// entry point is always `>= Header::LEN`.
pub struct Header {
    /// Magic constant, `'p' 'o' 'c' 'o'` as a little-endian u32.
    pub magic: u32,
    /// Object format version.
    pub version: u32,
    /// Byte offset into loaded memory of the first instruction.
    pub entry_point: Word,
    /// Number of code bytes following the header.
    pub code_size: Word,
}

impl Header {
    /// `'p' 'o' 'c' 'o'`, readable with `cat` because of the byte order.
    pub const MAGIC: u32 = 0x6f63_6f70;

    /// Current object format version.
    pub const VERSION: u32 = 1;

    /// Serialized size of the header, in bytes.
    pub const LEN: usize = 24;

    /// Create a header for the current magic and version.
    pub const fn new(entry_point: Word, code_size: Word) -> Self {
        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
            entry_point,
            code_size,
        }
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];

        let (magic, rest) = buf.split_at_mut(4);
        let (version, rest) = rest.split_at_mut(4);
        let (entry, code) = rest.split_at_mut(bytes::WORD_SIZE);

        bytes::store_u32(magic.try_into().expect("4 bytes"), self.magic);
        bytes::store_u32(version.try_into().expect("4 bytes"), self.version);
        bytes::store_number(entry.try_into().expect("word"), self.entry_point);
        bytes::store_number(code.try_into().expect("word"), self.code_size);

        buf
    }

    /// Deserialize a header from the start of `buf`.
    ///
    /// Returns `None` when fewer than [`Header::LEN`] bytes are available.
    /// Magic and version are restored as-is; validating them is the
    /// loader's call.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }

        Some(Self {
            magic: bytes::restore_u32(bytes::from_slice(buf)?),
            version: bytes::restore_u32(bytes::from_slice(&buf[4..])?),
            entry_point: bytes::restore_number_at(buf, 8)?,
            code_size: bytes::restore_number_at(buf, 16)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A complete object: header plus code section.
pub struct Object {
    /// The object header.
    pub header: Header,
    /// Encoded instruction stream.
    pub code: Vec<u8>,
}

impl Object {
    /// Serialize the whole object, header first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Header::LEN + self.code.len());

        buf.extend_from_slice(&self.header.to_bytes());
        buf.extend_from_slice(&self.code);

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = Header::new(24, 512);
        let restored = Header::from_bytes(&header.to_bytes()).expect("full buffer");

        assert_eq!(header, restored);
    }

    #[test]
    fn header_layout() {
        let buf = Header::new(24, 6).to_bytes();

        assert_eq!(&buf[..4], b"poco");
        assert_eq!(&buf[4..8], &[1, 0, 0, 0]);
        assert_eq!(&buf[8..16], &[24, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&buf[16..24], &[6, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn truncated_header_is_rejected() {
        let buf = Header::new(24, 0).to_bytes();

        assert!(Header::from_bytes(&buf[..Header::LEN - 1]).is_none());
        assert!(Header::from_bytes(&[]).is_none());
    }
}

//! Little-endian byte codec for the object format and instruction streams.

use crate::Word;

/// Memory size of a [`Word`]
pub const WORD_SIZE: usize = core::mem::size_of::<Word>();

/// Store a number into this buffer, little-endian.
pub fn store_number<T>(buf: &mut [u8; WORD_SIZE], number: T)
where
    T: Into<Word>,
{
    buf.copy_from_slice(&number.into().to_le_bytes());
}

/// Restore a number from a word-sized buffer, little-endian.
pub fn restore_number(buf: [u8; WORD_SIZE]) -> Word {
    Word::from_le_bytes(buf)
}

/// Store a 32-bit number into this buffer, little-endian.
pub fn store_u32(buf: &mut [u8; 4], number: u32) {
    buf.copy_from_slice(&number.to_le_bytes());
}

/// Restore a 32-bit number from this buffer, little-endian.
pub fn restore_u32(buf: [u8; 4]) -> u32 {
    u32::from_le_bytes(buf)
}

/// Read the initial bytes of a buffer as a fixed-size array.
///
/// Returns `None` if the buffer is smaller than `N`.
pub fn from_slice<const N: usize>(buf: &[u8]) -> Option<[u8; N]> {
    buf.get(..N)?.try_into().ok()
}

/// Read a word at `offset`, returning the remainder check implicitly.
///
/// Returns `None` if `offset + WORD_SIZE` crosses the end of the buffer.
pub fn restore_number_at(buf: &[u8], offset: usize) -> Option<Word> {
    let bytes = from_slice(buf.get(offset..)?)?;

    Some(restore_number(bytes))
}

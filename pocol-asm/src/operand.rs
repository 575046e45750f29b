use pocol_types::bytes::WORD_SIZE;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[repr(u8)]
/// Kind tag of one operand slot in an encoded instruction.
///
/// The kinds of an instruction's two slots are packed into the descriptor
/// byte, one nibble each.
pub enum OperandKind {
    /// The slot is unused and occupies no bytes.
    #[default]
    None = 0x00,
    /// A register index, one byte, low 3 bits significant.
    Reg = 0x01,
    /// A 64-bit little-endian immediate, eight bytes.
    Imm = 0x02,
}

impl OperandKind {
    /// Encoded size of an operand of this kind, in bytes.
    pub const fn size(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Reg => 1,
            Self::Imm => WORD_SIZE,
        }
    }
}

impl From<u8> for OperandKind {
    /// Converts a descriptor nibble into an `OperandKind`.
    ///
    /// Unassigned nibble values map to `None` so that every descriptor byte
    /// is well-defined, like the register index mask.
    fn from(b: u8) -> Self {
        match b {
            0x01 => Self::Reg,
            0x02 => Self::Imm,
            _ => Self::None,
        }
    }
}

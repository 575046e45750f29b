use crate::opcode::Opcode;
use crate::operand::OperandKind;
use crate::pack::{pack, unpack};
use crate::panic_reason::PanicReason;

use pocol_types::{bytes, Word};

use core::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
/// One decoded operand slot.
pub enum Operand {
    /// Unused slot.
    #[default]
    None,
    /// Register index as it appears on the wire. Only the low 3 bits are
    /// significant to the interpreter.
    Reg(u8),
    /// 64-bit immediate.
    Imm(Word),
}

impl Operand {
    /// The descriptor kind of this operand.
    pub const fn kind(&self) -> OperandKind {
        match self {
            Self::None => OperandKind::None,
            Self::Reg(_) => OperandKind::Reg,
            Self::Imm(_) => OperandKind::Imm,
        }
    }

    /// Encoded size in bytes.
    pub const fn size(&self) -> usize {
        self.kind().size()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Reg(r) => write!(f, "r{r}"),
            Self::Imm(w) => write!(f, "{w}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A decoded instruction: opcode plus its two operand slots.
///
/// This is the value form the assembler emits from and the disassembler
/// restores to; the interpreter dispatches directly on the byte stream.
pub struct Instruction {
    op: Opcode,
    operands: [Operand; 2],
}

impl Instruction {
    /// Create an instruction from an opcode and its operand slots.
    pub const fn new(op: Opcode, operands: [Operand; 2]) -> Self {
        Self { op, operands }
    }

    /// `halt`
    pub const fn halt() -> Self {
        Self::new(Opcode::HALT, [Operand::None, Operand::None])
    }

    /// `push <op>`
    pub const fn push(op: Operand) -> Self {
        Self::new(Opcode::PUSH, [op, Operand::None])
    }

    /// `pop <reg>`
    pub const fn pop(r: u8) -> Self {
        Self::new(Opcode::POP, [Operand::Reg(r), Operand::None])
    }

    /// `add <reg>, <op>`
    pub const fn add(r: u8, src: Operand) -> Self {
        Self::new(Opcode::ADD, [Operand::Reg(r), src])
    }

    /// `jmp <op>`
    pub const fn jmp(target: Operand) -> Self {
        Self::new(Opcode::JMP, [target, Operand::None])
    }

    /// `print <op>`
    pub const fn print(op: Operand) -> Self {
        Self::new(Opcode::PRINT, [op, Operand::None])
    }

    /// Opcode
    pub const fn op(&self) -> Opcode {
        self.op
    }

    /// Operand slots
    pub const fn operands(&self) -> &[Operand; 2] {
        &self.operands
    }

    /// The descriptor byte announcing the operand kinds.
    pub const fn descriptor(&self) -> u8 {
        pack(self.operands[0].kind(), self.operands[1].kind())
    }

    /// Number of bytes this instruction occupies on the wire.
    pub const fn encoded_len(&self) -> usize {
        2 + self.operands[0].size() + self.operands[1].size()
    }

    /// Append the encoded form to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.op as u8);
        buf.push(self.descriptor());

        for operand in &self.operands {
            match operand {
                Operand::None => (),
                Operand::Reg(r) => buf.push(*r),
                Operand::Imm(w) => buf.extend_from_slice(&w.to_le_bytes()),
            }
        }
    }

    /// Decode one instruction from the start of `buf`.
    ///
    /// Returns the instruction and the number of bytes consumed. Only the
    /// slots the opcode declares are read, in descriptor order.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), PanicReason> {
        let op = buf
            .first()
            .copied()
            .ok_or(PanicReason::IllegalMemoryAccess)
            .and_then(Opcode::try_from)?;

        let desc = *buf.get(1).ok_or(PanicReason::IllegalMemoryAccess)?;
        let (op1, op2) = unpack(desc);
        let kinds = [op1, op2];

        let mut operands = [Operand::None; 2];
        let mut offset = 2;

        for slot in 0..op.operand_count() {
            operands[slot] = match kinds[slot] {
                OperandKind::None => Operand::None,
                OperandKind::Reg => {
                    let r = *buf.get(offset).ok_or(PanicReason::IllegalMemoryAccess)?;
                    offset += 1;

                    Operand::Reg(r)
                }
                OperandKind::Imm => {
                    let w = bytes::restore_number_at(buf, offset).ok_or(PanicReason::IllegalMemoryAccess)?;
                    offset += bytes::WORD_SIZE;

                    Operand::Imm(w)
                }
            };
        }

        Ok((Self::new(op, operands), offset))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.mnemonic())?;

        let mut sep = " ";
        for operand in self.operands.iter().take(self.op.operand_count()) {
            if *operand == Operand::None {
                continue;
            }

            write!(f, "{sep}{operand}")?;
            sep = ", ";
        }

        Ok(())
    }
}

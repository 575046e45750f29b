use crate::panic_reason::PanicReason;

use core::fmt;

use strum::IntoEnumIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[repr(u8)]
/// Instruction representation for the interpreter.
///
/// Every instruction is encoded as one opcode byte, one operand descriptor
/// byte, and the operand bytes the descriptor announces. The numeric
/// identities below are part of the object format and must stay stable for
/// a given format version.
pub enum Opcode {
    /// Stops the execution.
    ///
    /// | Operation | `halted = true` |
    /// | Syntax    | `halt`          |
    HALT = 0x00,

    /// Pushes a value onto the stack.
    ///
    /// | Operation | `stack[sp] = op1; sp += 1` |
    /// | Syntax    | `push r1` or `push 10`     |
    ///
    /// #### Panics
    /// - the stack is full.
    PUSH = 0x01,

    /// Pops the top of the stack into a register.
    ///
    /// | Operation | `sp -= 1; reg = stack[sp]` |
    /// | Syntax    | `pop r0`                   |
    ///
    /// #### Panics
    /// - the stack is empty.
    POP = 0x02,

    /// Adds a value into a destination register.
    ///
    /// | Operation | `dest += src` (wrapping)     |
    /// | Syntax    | `add r0, r1` or `add r0, 10` |
    ADD = 0x03,

    /// Jumps to an absolute address.
    ///
    /// | Operation | `pc = op1`           |
    /// | Syntax    | `jmp label`          |
    ///
    /// The target is not checked at dispatch time; an out-of-range address
    /// fails on the next fetch.
    JMP = 0x04,

    /// Prints a value to standard output as unsigned decimal, without a
    /// trailing newline. Debug facility.
    ///
    /// | Syntax | `print r0` or `print 10` |
    PRINT = 0x05,
}

impl Opcode {
    /// Textual name of the instruction.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::HALT => "halt",
            Self::PUSH => "push",
            Self::POP => "pop",
            Self::ADD => "add",
            Self::JMP => "jmp",
            Self::PRINT => "print",
        }
    }

    /// Number of operand slots the instruction declares.
    pub const fn operand_count(&self) -> usize {
        match self {
            Self::HALT => 0,
            Self::PUSH | Self::POP | Self::JMP | Self::PRINT => 1,
            Self::ADD => 2,
        }
    }

    /// Map a mnemonic back to its opcode. Mnemonics are case-sensitive
    /// lowercase.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::iter().find(|op| op.mnemonic() == name)
    }
}

impl TryFrom<u8> for Opcode {
    type Error = PanicReason;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        use Opcode::*;

        match b {
            0x00 => Ok(HALT),
            0x01 => Ok(PUSH),
            0x02 => Ok(POP),
            0x03 => Ok(ADD),
            0x04 => Ok(JMP),
            0x05 => Ok(PRINT),
            _ => Err(PanicReason::IllegalInstruction),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

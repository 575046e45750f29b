//! Runtime interpreter error implementation

use crate::consts::MEMORY_SIZE;

use pocol_asm::{Header, PanicReason};
use pocol_types::Word;

use core::fmt;
use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Describes an instruction panic: the reason, the failing opcode byte, and
/// the address the instruction was fetched from.
pub struct InstructionResult {
    reason: PanicReason,
    op: u8,
    pc: Word,
}

impl InstructionResult {
    /// Represent an error result with the panic context.
    pub const fn error(reason: PanicReason, op: u8, pc: Word) -> Self {
        Self { reason, op, pc }
    }

    /// Underlying panic reason.
    pub const fn reason(&self) -> &PanicReason {
        &self.reason
    }

    /// The opcode byte of the failing instruction.
    pub const fn op(&self) -> u8 {
        self.op
    }

    /// Address the failing instruction was fetched from.
    pub const fn pc(&self) -> Word {
        self.pc
    }
}

impl fmt::Display for InstructionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}: {} (addr: {})", self.op, self.reason, self.pc)
    }
}

/// Interpreter runtime error variants.
#[derive(Debug, Error)]
pub enum InterpreterError {
    /// The instruction execution resulted in a well-formed panic.
    #[error("{0}")]
    PanicInstruction(InstructionResult),
    /// I/O and OS related errors.
    #[error("unrecoverable error: {0}")]
    Io(#[from] io::Error),
}

impl InterpreterError {
    /// Describe the error as recoverable or halt, with the panic context.
    pub fn from_runtime(error: RuntimeError, op: u8, pc: Word) -> Self {
        match error {
            RuntimeError::Recoverable(reason) => {
                Self::PanicInstruction(InstructionResult::error(reason, op, pc))
            }
            RuntimeError::Halt(e) => Self::Io(e),
        }
    }

    /// Return the panic reason that caused this error, if applicable.
    pub const fn panic_reason(&self) -> Option<PanicReason> {
        match self {
            Self::PanicInstruction(result) => Some(*result.reason()),
            _ => None,
        }
    }

    /// Numeric error code, doubling as the interpreter's exit status.
    pub fn code(&self) -> u8 {
        match self.panic_reason() {
            Some(reason) => reason.code(),
            None => 1,
        }
    }
}

impl From<InstructionResult> for InterpreterError {
    fn from(r: InstructionResult) -> Self {
        Self::PanicInstruction(r)
    }
}

#[derive(Debug, Error)]
/// Runtime error description that should either be reported with its panic
/// context or halt the execution.
pub enum RuntimeError {
    /// Specified error with well-formed fallback strategy.
    #[error(transparent)]
    Recoverable(#[from] PanicReason),
    /// Unspecified error that should halt the execution.
    #[error(transparent)]
    Halt(#[from] io::Error),
}

impl RuntimeError {
    /// Flag whether the error is recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }

    /// Flag whether the error must halt the execution.
    pub const fn must_halt(&self) -> bool {
        matches!(self, Self::Halt(_))
    }
}

/// Object loading error variants.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The object could not be opened or read.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The path does not point at a regular file.
    #[error("not a regular file")]
    NotRegularFile,
    /// The object file is empty.
    #[error("empty file")]
    EmptyFile,
    /// The object does not fit the VM memory.
    #[error("size exceeds limit: {size}/{} bytes", MEMORY_SIZE)]
    Oversized {
        /// Size of the rejected object, in bytes.
        size: u64,
    },
    /// The object is shorter than a header.
    #[error("unsupported file format")]
    TruncatedHeader,
    /// The magic constant does not match.
    #[error("wrong magic number `0x{found:08X}`")]
    BadMagic {
        /// The magic value found in the object.
        found: u32,
    },
    /// The format version is not supported.
    #[error("program version not supported (expected {}, got {found})", Header::VERSION)]
    UnsupportedVersion {
        /// The version found in the object.
        found: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_report_format() {
        let result = InstructionResult::error(PanicReason::StackUnderflow, 0x02, 24);

        assert_eq!("0x02: stack underflow (addr: 24)", result.to_string());
    }

    #[test]
    fn error_codes_follow_the_reason() {
        let err = InterpreterError::from_runtime(PanicReason::StackOverflow.into(), 0x01, 24);

        assert_eq!(3, err.code());
        assert_eq!(Some(PanicReason::StackOverflow), err.panic_reason());
    }
}

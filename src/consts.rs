//! VM parameters

/* REGISTERS */

/// Number of general-purpose registers.
pub const VM_REGISTER_COUNT: usize = 8;

/// Mask applied to every register byte read from the instruction stream.
/// The field occupies the low three bits, so all 256 byte values are
/// well-defined.
pub const REG_MASK: u8 = 0x07;

/* MEMORY */

/// Size of the VM linear memory, in bytes.
pub const MEMORY_SIZE: usize = 640 * 1000;

/// Depth of the VM stack, in word slots.
pub const STACK_SIZE: usize = 1024;

/// Unbounded step budget for [`crate::interpreter::Interpreter::run`].
pub const NO_LIMIT: i64 = -1;

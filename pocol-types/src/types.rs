/// Register value or memory word of the VM.
pub type Word = u64;

/// Index of a general-purpose register.
pub type RegisterId = usize;

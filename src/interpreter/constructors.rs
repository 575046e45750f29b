//! Exposed constructors API for the [`Interpreter`]

use super::Interpreter;
use crate::consts::*;

use std::io;

impl<W> Interpreter<W> {
    /// Create a VM whose `print` instruction writes into `output`.
    ///
    /// The VM starts empty: zeroed memory and registers, empty stack,
    /// `pc` at zero, not halted. Load an object before running.
    pub fn with_output(output: W) -> Self {
        Self {
            memory: vec![0; MEMORY_SIZE],
            stack: Vec::with_capacity(STACK_SIZE),
            registers: [0; VM_REGISTER_COUNT],
            pc: 0,
            halted: false,
            output,
        }
    }
}

impl<W> Default for Interpreter<W>
where
    W: Default,
{
    fn default() -> Self {
        Self::with_output(W::default())
    }
}

impl Interpreter<io::Stdout> {
    /// Create a VM printing to the standard output.
    pub fn stdout() -> Self {
        Self::with_output(io::stdout())
    }
}

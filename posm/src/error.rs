//! Assembler error types.

use core::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One reported problem, with the source coordinates it was detected at.
pub struct Diagnostic {
    /// 1-based source line, or 0 for file-level diagnostics.
    pub line: u32,
    /// 1-based source column.
    pub col: u32,
    /// Terse description of the problem.
    pub message: String,
}

impl Diagnostic {
    /// A diagnostic anchored at a source position.
    pub fn new(line: u32, col: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            col,
            message: message.into(),
        }
    }

    /// A diagnostic with no source position, e.g. a missing `_start`.
    pub fn global(message: impl Into<String>) -> Self {
        Self::new(0, 0, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}: error: {}", self.line, self.col, self.message)
        } else {
            write!(f, "error: {}", self.message)
        }
    }
}

/// Assembler failure variants.
#[derive(Debug, Error)]
pub enum AsmError {
    /// The source did not assemble; no output was produced.
    #[error("compilation failed ({} total errors)", .diagnostics.len())]
    Failed {
        /// Everything reported, pass 1 first, each pass in source order.
        diagnostics: Vec<Diagnostic>,
    },
    /// I/O and OS related errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

use super::Interpreter;
use crate::consts::*;
use crate::error::LoadError;

use pocol_asm::Header;

use std::fs;
use std::path::Path;

use tracing::debug;

impl<W> Interpreter<W> {
    /// Load an object image into the VM.
    ///
    /// The whole image, header included, lands at memory offset zero; the
    /// remainder of the memory is zeroed. Registers and the stack are
    /// reset, `pc` starts at the header's entry point.
    pub fn load_bytes(&mut self, object: &[u8]) -> Result<(), LoadError> {
        if object.is_empty() {
            return Err(LoadError::EmptyFile);
        }

        if object.len() > MEMORY_SIZE {
            return Err(LoadError::Oversized {
                size: object.len() as u64,
            });
        }

        let header = Header::from_bytes(object).ok_or(LoadError::TruncatedHeader)?;

        if header.magic != Header::MAGIC {
            return Err(LoadError::BadMagic { found: header.magic });
        }

        if header.version != Header::VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: header.version,
            });
        }

        self.memory[..object.len()].copy_from_slice(object);
        self.memory[object.len()..].fill(0);

        self.registers = [0; VM_REGISTER_COUNT];
        self.stack.clear();
        self.pc = header.entry_point;
        self.halted = false;

        debug!(
            size = object.len(),
            entry_point = header.entry_point,
            "object loaded"
        );

        Ok(())
    }

    /// Load an object file into the VM.
    ///
    /// The path must name a regular, non-empty file no larger than the VM
    /// memory.
    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let meta = fs::metadata(path)?;

        if !meta.is_file() {
            return Err(LoadError::NotRegularFile);
        }

        if meta.len() == 0 {
            return Err(LoadError::EmptyFile);
        }

        if meta.len() > MEMORY_SIZE as u64 {
            return Err(LoadError::Oversized { size: meta.len() });
        }

        let object = fs::read(path)?;

        self.load_bytes(&object)
    }
}

use super::{register_id, Interpreter};

use pocol_asm::{OperandKind, PanicReason};
use pocol_types::{bytes, Word};

impl<W> Interpreter<W> {
    /// Read the byte at `pc` and advance past it.
    pub(crate) fn fetch8(&mut self) -> Result<u8, PanicReason> {
        let byte = *self
            .memory
            .get(self.pc as usize)
            .ok_or(PanicReason::IllegalMemoryAccess)?;

        self.pc += 1;

        Ok(byte)
    }

    /// Read the little-endian word at `pc` and advance past it.
    pub(crate) fn fetch64(&mut self) -> Result<Word, PanicReason> {
        let value = bytes::restore_number_at(&self.memory, self.pc as usize)
            .ok_or(PanicReason::IllegalMemoryAccess)?;

        self.pc += bytes::WORD_SIZE as Word;

        Ok(value)
    }

    /// Fetch the value of one operand slot by its descriptor kind.
    ///
    /// A `reg` operand reads the register the next byte indexes; an `imm`
    /// operand reads the next word; `none` yields zero without consuming
    /// bytes.
    pub(crate) fn fetch_operand(&mut self, kind: OperandKind) -> Result<Word, PanicReason> {
        match kind {
            OperandKind::Reg => {
                let byte = self.fetch8()?;

                Ok(self.registers[register_id(byte)])
            }
            OperandKind::Imm => self.fetch64(),
            OperandKind::None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn fetch_past_memory_end_fails() {
        let mut vm = Interpreter::<Vec<u8>>::default();

        vm.pc = MEMORY_SIZE as Word;
        assert_eq!(Err(PanicReason::IllegalMemoryAccess), vm.fetch8());

        // a word fetch must fit entirely
        vm.pc = (MEMORY_SIZE - 7) as Word;
        assert_eq!(Err(PanicReason::IllegalMemoryAccess), vm.fetch64());

        vm.pc = (MEMORY_SIZE - 8) as Word;
        assert_eq!(Ok(0), vm.fetch64());
        assert_eq!(MEMORY_SIZE as Word, vm.pc);
    }

    #[test]
    fn register_bytes_are_masked_to_three_bits() {
        let mut vm = Interpreter::<Vec<u8>>::default();

        vm.registers[7] = 42;
        vm.memory[0] = 0xff;

        assert_eq!(Ok(42), vm.fetch_operand(OperandKind::Reg));
    }

    #[test]
    fn none_operand_reads_nothing() {
        let mut vm = Interpreter::<Vec<u8>>::default();

        assert_eq!(Ok(0), vm.fetch_operand(OperandKind::None));
        assert_eq!(0, vm.pc);
    }
}

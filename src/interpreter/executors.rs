use super::{register_id, Interpreter};
use crate::consts::*;
use crate::error::{InterpreterError, RuntimeError};
use crate::state::{ExecuteState, ProgramState};

use pocol_asm::{unpack, Opcode, PanicReason};

use std::io::Write;

use tracing::trace;

impl<W> Interpreter<W>
where
    W: Write,
{
    /// Fetch, decode, and dispatch one instruction.
    ///
    /// On error the returned variant carries the failing opcode byte and
    /// the address the instruction was fetched from.
    pub fn step(&mut self) -> Result<ExecuteState, InterpreterError> {
        let pc = self.pc;
        let op = self.memory.get(pc as usize).copied().unwrap_or(0);

        trace!(pc, op, "dispatch");

        self._step()
            .map_err(|e| InterpreterError::from_runtime(e, op, pc))
    }

    fn _step(&mut self) -> Result<ExecuteState, RuntimeError> {
        let op = self.fetch8()?;
        let desc = self.fetch8()?;
        let (op1, op2) = unpack(desc);

        let state = match Opcode::try_from(op)? {
            Opcode::HALT => {
                self.halted = true;

                ExecuteState::Halted
            }

            Opcode::PUSH => {
                if self.stack.len() == STACK_SIZE {
                    return Err(PanicReason::StackOverflow.into());
                }

                let value = self.fetch_operand(op1)?;
                self.stack.push(value);

                ExecuteState::Proceed
            }

            Opcode::POP => {
                if self.stack.is_empty() {
                    return Err(PanicReason::StackUnderflow.into());
                }

                // the operand byte is always decoded as a register,
                // whatever the descriptor claims; the assembler rejects
                // anything else up front
                let byte = self.fetch8()?;
                if let Some(value) = self.stack.pop() {
                    self.registers[register_id(byte)] = value;
                }

                ExecuteState::Proceed
            }

            Opcode::ADD => {
                let dest = register_id(self.fetch8()?);
                let src = self.fetch_operand(op2)?;

                self.registers[dest] = self.registers[dest].wrapping_add(src);

                ExecuteState::Proceed
            }

            Opcode::JMP => {
                // no bounds check here; an out-of-range target fails on
                // the next fetch
                self.pc = self.fetch_operand(op1)?;

                ExecuteState::Proceed
            }

            Opcode::PRINT => {
                let value = self.fetch_operand(op1)?;

                write!(self.output, "{value}").map_err(RuntimeError::Halt)?;

                ExecuteState::Proceed
            }
        };

        Ok(state)
    }

    /// Run until `halt`, an error, or an exhausted step budget.
    ///
    /// A negative `limit` means no bound; a bound of N dispatches at most N
    /// instructions, so zero is the structured way to stop before any work.
    pub fn run(&mut self, mut limit: i64) -> Result<ProgramState, InterpreterError> {
        while limit != 0 && !self.halted {
            self.step()?;

            if limit > 0 {
                limit -= 1;
            }
        }

        Ok(if self.halted {
            ProgramState::Halted
        } else {
            ProgramState::Suspended
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    use pocol_asm::{Header, Instruction, Object, Operand};
    use pocol_types::Word;

    fn load(instructions: &[Instruction]) -> Interpreter<Vec<u8>> {
        let mut code = Vec::new();
        for instruction in instructions {
            instruction.encode(&mut code);
        }

        let object = Object {
            header: Header::new(Header::LEN as Word, code.len() as Word),
            code,
        };

        let mut vm = Interpreter::default();
        vm.load_bytes(&object.to_bytes()).expect("well-formed object");

        vm
    }

    #[test]
    fn push_advances_sp_and_pc_by_encoded_len() {
        let mut vm = load(&[Instruction::push(Operand::Imm(10))]);

        let pc = vm.pc();
        assert_eq!(Ok(ExecuteState::Proceed), vm.step().map_err(|e| e.to_string()));
        assert_eq!(pc + 10, vm.pc());
        assert_eq!(vm.stack().to_vec(), vec![10]);
    }

    #[test]
    fn pop_moves_the_stack_top_into_a_register() {
        let mut vm = load(&[
            Instruction::push(Operand::Imm(7)),
            Instruction::pop(3),
            Instruction::halt(),
        ]);

        vm.run(NO_LIMIT).expect("program should halt");

        assert_eq!(7, vm.registers()[3]);
        assert_eq!(0, vm.sp());
        assert!(vm.is_halted());
    }

    #[test]
    fn add_wraps_on_overflow() {
        let mut vm = load(&[
            Instruction::push(Operand::Imm(Word::MAX)),
            Instruction::pop(0),
            Instruction::add(0, Operand::Imm(2)),
            Instruction::halt(),
        ]);

        vm.run(NO_LIMIT).expect("program should halt");

        assert_eq!(1, vm.registers()[0]);
    }

    #[test]
    fn push_into_full_stack_leaves_state_unmodified() {
        let mut vm = load(&[Instruction::push(Operand::Imm(1))]);

        for _ in 0..STACK_SIZE {
            vm.stack.push(0xbeef);
        }

        let err = vm.step().expect_err("stack is full");

        assert_eq!(Some(PanicReason::StackOverflow), err.panic_reason());
        assert_eq!(STACK_SIZE, vm.sp());
        assert!(vm.stack().iter().all(|s| *s == 0xbeef));
    }

    #[test]
    fn pop_from_empty_stack_leaves_state_unmodified() {
        let mut vm = load(&[Instruction::pop(0), Instruction::halt()]);

        let err = vm.step().expect_err("stack is empty");

        assert_eq!(Some(PanicReason::StackUnderflow), err.panic_reason());
        assert_eq!(0, vm.sp());
        assert_eq!(&[0; VM_REGISTER_COUNT], vm.registers());
    }

    #[test]
    fn unknown_opcode_reports_byte_and_address() {
        let object = Object {
            header: Header::new(Header::LEN as Word, 2),
            code: vec![0xab, 0x00],
        };

        let mut vm = Interpreter::<Vec<u8>>::default();
        vm.load_bytes(&object.to_bytes()).expect("well-formed object");

        let err = vm.step().expect_err("opcode is unknown");

        assert_eq!(Some(PanicReason::IllegalInstruction), err.panic_reason());
        assert_eq!(
            "0xAB: unrecognized opcode (addr: 24)",
            err.to_string()
        );
    }

    #[test]
    fn jump_out_of_memory_fails_on_next_fetch() {
        let mut vm = load(&[Instruction::jmp(Operand::Imm(MEMORY_SIZE as Word))]);

        assert!(vm.step().is_ok());

        let err = vm.step().expect_err("pc is out of memory");
        assert_eq!(Some(PanicReason::IllegalMemoryAccess), err.panic_reason());
    }

    #[test]
    fn step_budget_bounds_the_run() {
        let mut vm = load(&[
            Instruction::push(Operand::Imm(1)),
            Instruction::push(Operand::Imm(2)),
            Instruction::push(Operand::Imm(3)),
            Instruction::halt(),
        ]);

        assert_eq!(
            ProgramState::Suspended,
            vm.run(2).expect("within budget")
        );
        assert_eq!(2, vm.sp());

        // a zero budget performs no work at all
        let pc = vm.pc();
        assert_eq!(ProgramState::Suspended, vm.run(0).expect("no work"));
        assert_eq!(pc, vm.pc());

        // resuming finishes the program
        assert_eq!(ProgramState::Halted, vm.run(NO_LIMIT).expect("halts"));
        assert_eq!(3, vm.sp());
    }

    #[test]
    fn halted_vm_dispatches_nothing_further() {
        let mut vm = load(&[Instruction::halt(), Instruction::push(Operand::Imm(1))]);

        vm.run(NO_LIMIT).expect("halts immediately");

        let pc = vm.pc();
        vm.run(NO_LIMIT).expect("still halted");

        assert_eq!(pc, vm.pc());
        assert_eq!(0, vm.sp());
    }

    #[test]
    fn print_writes_unsigned_decimal_without_newline() {
        let mut vm = load(&[
            Instruction::push(Operand::Imm(-1i64 as Word)),
            Instruction::pop(0),
            Instruction::print(Operand::Reg(0)),
            Instruction::halt(),
        ]);

        vm.run(NO_LIMIT).expect("program should halt");

        assert_eq!(u64::MAX.to_string().as_bytes(), vm.output().as_slice());
    }

    #[test]
    fn oversized_objects_are_rejected() {
        let mut vm = Interpreter::<Vec<u8>>::default();

        let object = vec![0; MEMORY_SIZE + 1];
        assert!(matches!(
            vm.load_bytes(&object),
            Err(LoadError::Oversized { .. })
        ));
    }
}

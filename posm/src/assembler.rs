//! Two-pass parser and object emission.

use crate::error::{AsmError, Diagnostic};
use crate::symbol::{Symbol, SymbolKind, SymbolTable};
use crate::token::{Token, TokenKind};

use pocol_asm::{Header, Instruction, Object, Opcode, Operand, OperandKind};
use pocol_types::Word;

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Collect label addresses; emit nothing.
    Collect,
    /// Emit code; resolve identifiers through the symbol table.
    Emit,
}

/// Assembler context for one source buffer.
///
/// Holds the lexer cursor, the running virtual program counter, the symbol
/// table, and every diagnostic reported so far. One context assembles one
/// source; both passes run over the same buffer.
pub struct Assembler<'a> {
    pub(crate) src: &'a [u8],
    pub(crate) cursor: usize,
    pub(crate) line: u32,
    pub(crate) col: u32,
    /// Non-zero while scanning ahead; suppresses diagnostics.
    pub(crate) peeking: u32,
    pass: Pass,
    /// Byte offset the next instruction will land at in the loaded object.
    vpc: Word,
    code: Vec<u8>,
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Assembler<'a> {
    /// Create a context over a source buffer.
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            cursor: 0,
            line: 1,
            col: 1,
            peeking: 0,
            pass: Pass::Emit,
            vpc: Header::LEN as Word,
            code: Vec::new(),
            symbols: SymbolTable::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Everything reported so far, in source order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Run both passes and produce the object.
    pub fn assemble(mut self) -> Result<Object, AsmError> {
        self.run_pass(Pass::Collect);
        self.run_pass(Pass::Emit);

        let entry_point = match self.symbols.find(SymbolKind::Label, "_start") {
            Some(symbol) => symbol.addr,
            None => {
                self.diagnostics
                    .push(Diagnostic::global("undefined reference to `_start`"));
                0
            }
        };

        if !self.diagnostics.is_empty() {
            return Err(AsmError::Failed {
                diagnostics: self.diagnostics,
            });
        }

        debug!(
            code_size = self.code.len(),
            entry_point, "assembled object"
        );

        Ok(Object {
            header: Header::new(entry_point, self.code.len() as Word),
            code: self.code,
        })
    }

    fn run_pass(&mut self, pass: Pass) {
        self.pass = pass;
        self.cursor = 0;
        self.line = 1;
        self.col = 1;
        self.vpc = Header::LEN as Word;

        let mut token = self.next_token();
        while token.kind != TokenKind::Eof {
            match token.kind {
                TokenKind::LabelDef => self.label(token),
                TokenKind::Ident => self.statement(token),
                // stray operand or recovered garbage
                _ => (),
            }

            token = self.next_token();
        }

        match pass {
            Pass::Collect => debug!(symbols = self.symbols.len(), "pass 1 complete"),
            Pass::Emit => debug!(bytes = self.code.len(), "pass 2 complete"),
        }
    }

    /// A label definition marks the current `vpc`. Only pass 1 records it;
    /// pass 2 has nothing to emit.
    fn label(&mut self, token: Token) {
        if self.pass != Pass::Collect {
            return;
        }

        let name = token.text(self.src);
        let symbol = Symbol {
            name: name.into(),
            kind: SymbolKind::Label,
            addr: self.vpc,
            defined: true,
        };

        if self.symbols.push(symbol).is_err() {
            self.error_at(token, format!("duplicate label `{name}`"));
        }
    }

    /// An identifier in statement position is a mnemonic, or an error once
    /// pass 2 can be sure it is not a label defined later.
    fn statement(&mut self, token: Token) {
        let name = token.text(self.src);

        match Opcode::from_mnemonic(name) {
            Some(op) => self.instruction(op, token),
            None if self.pass == Pass::Emit => {
                self.error_at(token, format!("unknown `{name}` instruction in program"));
            }
            None => (),
        }
    }

    /// Classify the operand slots, advance `vpc` by the exact encoded size,
    /// and on pass 2 emit opcode, descriptor, and operands.
    fn instruction(&mut self, op: Opcode, at: Token) {
        let count = op.operand_count();

        let mut kinds = [OperandKind::None; 2];
        for (i, kind) in kinds.iter_mut().enumerate().take(count) {
            *kind = match self.peek(i).kind {
                TokenKind::Register => OperandKind::Reg,
                TokenKind::Int | TokenKind::Ident => OperandKind::Imm,
                _ => OperandKind::None,
            };
        }

        // an immediate popped into nowhere is meaningless; the descriptor
        // machinery would happily encode it
        if op == Opcode::POP && kinds[0] == OperandKind::Imm {
            if self.pass == Pass::Emit {
                self.error_at(at, "pop requires a register operand");
            } else {
                self.skip_line();
            }
            return;
        }

        self.vpc += (2 + kinds[0].size() + kinds[1].size()) as Word;

        let mut operands = [Operand::None; 2];
        for (i, kind) in kinds.iter().enumerate().take(count) {
            if *kind == OperandKind::None {
                if self.pass == Pass::Emit {
                    self.error_at(at, format!("missing operand for `{}`", op.mnemonic()));
                }
                return;
            }

            let operand = self.next_token();

            operands[i] = match operand.kind {
                TokenKind::Register => Operand::Reg(operand.value as u8),
                TokenKind::Int => Operand::Imm(operand.value as Word),
                TokenKind::Ident => {
                    let addr = if self.pass == Pass::Collect {
                        0
                    } else {
                        let name = operand.text(self.src);
                        match self.symbols.find(SymbolKind::Label, name) {
                            Some(symbol) => symbol.addr,
                            None => {
                                self.error_at(operand, format!("identifier `{name}` not defined"));
                                return;
                            }
                        }
                    };

                    Operand::Imm(addr)
                }
                // classification came from peeking this same token
                _ => unreachable!("operand kind was classified from this token"),
            };
        }

        if self.pass == Pass::Emit {
            Instruction::new(op, operands).encode(&mut self.code);
        }
    }

    /// Record a diagnostic at a token and recover: one line, one error.
    fn error_at(&mut self, token: Token, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(token.line, token.col, message));
        self.skip_line();
    }

    /// Record a lexical diagnostic and recover.
    ///
    /// The source is scanned several times (two passes plus lookahead), so
    /// lexical offenses are recorded only on the emission pass and never
    /// while peeking; the line skip still happens every time to keep the
    /// token stream identical across scans.
    pub(crate) fn lex_error(&mut self, line: u32, col: u32, message: impl Into<String>) {
        if self.peeking == 0 && self.pass == Pass::Emit {
            self.diagnostics.push(Diagnostic::new(line, col, message));
        }

        self.skip_line();
    }
}

/// Assemble a source buffer into an object.
pub fn assemble(src: &[u8]) -> Result<Object, AsmError> {
    Assembler::new(src).assemble()
}

/// Assemble `input` and write the object to `output` atomically.
///
/// The object is written to a temporary file in the output directory and
/// renamed into place on success, so a failed assembly never leaves a
/// partial object behind. On Unix the output is marked executable, as a
/// convenience for tooling that invokes it directly.
pub fn assemble_file(input: &Path, output: &Path) -> Result<(), AsmError> {
    let src = fs::read(input)?;
    let object = assemble(&src)?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&object.to_bytes())?;

    let file = tmp.persist(output).map_err(|e| e.error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        file.set_permissions(fs::Permissions::from_mode(0o777))?;
    }

    #[cfg(not(unix))]
    drop(file);

    debug!(output = %output.display(), "object written");

    Ok(())
}

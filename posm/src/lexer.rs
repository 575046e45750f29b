//! Lexer half of the assembler: cursor movement and token recognition.
//!
//! The cursor only ever moves forward, except across [`Assembler::peek`],
//! which saves and restores it exactly.

use crate::assembler::Assembler;
use crate::token::{Token, TokenKind};

impl<'a> Assembler<'a> {
    fn at(&self) -> Option<u8> {
        self.src.get(self.cursor).copied()
    }

    /// Move the cursor one character forward, tracking line and column.
    pub(crate) fn bump(&mut self) {
        match self.at() {
            None => (),
            Some(b'\n') => {
                self.line += 1;
                self.col = 1;
                self.cursor += 1;
            }
            Some(_) => {
                self.col += 1;
                self.cursor += 1;
            }
        }
    }

    /// Consume through the end of the current line, stopping at the newline.
    pub(crate) fn skip_line(&mut self) {
        while matches!(self.at(), Some(b) if b != b'\n') {
            self.bump();
        }
    }

    /// Take the next token from the cursor.
    pub(crate) fn next_token(&mut self) -> Token {
        loop {
            match self.at() {
                Some(b) if b.is_ascii_whitespace() || b == b',' => self.bump(),
                // comment runs until the next newline
                Some(b';') => self.skip_line(),
                _ => break,
            }
        }

        let (start, line, col) = (self.cursor, self.line, self.col);
        let token = |kind, len, value| Token {
            kind,
            start,
            len,
            value,
            line,
            col,
        };

        let first = match self.at() {
            Some(b) => b,
            None => return token(TokenKind::Eof, 0, 0),
        };

        // digit, or '-' immediately followed by a digit
        let digit_next = matches!(self.src.get(self.cursor + 1), Some(d) if d.is_ascii_digit());
        if first.is_ascii_digit() || (first == b'-' && digit_next) {
            self.bump();
            while matches!(self.at(), Some(d) if d.is_ascii_digit()) {
                self.bump();
            }

            let len = self.cursor - start;
            let text = core::str::from_utf8(&self.src[start..self.cursor]).unwrap_or_default();
            let value = match text.parse::<i64>() {
                Ok(value) => value,
                Err(_) => {
                    self.lex_error(line, col, "integer out of range");

                    // saturate; the diagnostic already fails the assembly
                    if first == b'-' {
                        i64::MIN
                    } else {
                        i64::MAX
                    }
                }
            };

            return token(TokenKind::Int, len, value);
        }

        if first.is_ascii_alphabetic() || first == b'_' {
            while matches!(self.at(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
                self.bump();
            }

            let len = self.cursor - start;

            // an identifier glued to ':' defines a label
            if self.at() == Some(b':') {
                self.bump();
                return token(TokenKind::LabelDef, len, 0);
            }

            let run = &self.src[start..self.cursor];
            if first == b'r' && len > 1 && run[1..].iter().all(u8::is_ascii_digit) {
                let index = core::str::from_utf8(&run[1..])
                    .unwrap_or_default()
                    .parse::<i64>()
                    .unwrap_or(i64::MAX);

                return token(TokenKind::Register, len, index);
            }

            return token(TokenKind::Ident, len, 0);
        }

        self.lex_error(
            line,
            col,
            format!("illegal character `{}` in program", char::from(first)),
        );
        self.bump();

        token(TokenKind::Illegal, 1, 0)
    }

    /// The token produced after advancing `n` positions, without moving the
    /// cursor.
    pub(crate) fn peek(&mut self, n: usize) -> Token {
        let saved = (self.cursor, self.line, self.col);

        self.peeking += 1;
        let mut token = self.next_token();
        for _ in 0..n {
            token = self.next_token();
        }
        self.peeking -= 1;

        (self.cursor, self.line, self.col) = saved;

        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &[u8]) -> Vec<Token> {
        let mut asm = Assembler::new(src);
        let mut out = vec![];

        loop {
            let token = asm.next_token();
            let done = token.kind == TokenKind::Eof;
            out.push(token);
            if done {
                break;
            }
        }

        out
    }

    fn kinds(src: &[u8]) -> Vec<TokenKind> {
        tokens(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn recognizes_every_token_kind() {
        use TokenKind::*;

        assert_eq!(
            vec![LabelDef, Ident, Int, Register, Int, Eof],
            kinds(b"_start: push 10, r3 -42")
        );
    }

    #[test]
    fn comments_and_commas_are_separators() {
        use TokenKind::*;

        let src = b"add r0, r1 ; dest gets the sum\nhalt";

        assert_eq!(vec![Ident, Register, Register, Ident, Eof], kinds(src));
    }

    #[test]
    fn tokens_carry_spans_and_coordinates() {
        let src = b"loop:\n  jmp loop";
        let toks = tokens(src);

        // "loop" definition, first line
        assert_eq!((TokenKind::LabelDef, 0, 4, 1, 1), {
            let t = toks[0];
            (t.kind, t.start, t.len, t.line, t.col)
        });
        assert_eq!("loop", toks[0].text(src));

        // "jmp" on line 2, after two columns of indentation
        assert_eq!((2, 3), (toks[1].line, toks[1].col));
        assert_eq!("jmp", toks[1].text(src));

        // the reference back to "loop"
        assert_eq!(TokenKind::Ident, toks[2].kind);
        assert_eq!("loop", toks[2].text(src));
    }

    #[test]
    fn integer_values_are_signed_64_bit() {
        let toks = tokens(b"9223372036854775807 -9223372036854775808 0");

        assert_eq!(i64::MAX, toks[0].value);
        assert_eq!(i64::MIN, toks[1].value);
        assert_eq!(0, toks[2].value);
    }

    #[test]
    fn integer_overflow_saturates_and_reports() {
        let mut asm = Assembler::new(b"99999999999999999999");
        let token = asm.next_token();

        assert_eq!(TokenKind::Int, token.kind);
        assert_eq!(i64::MAX, token.value);
        assert_eq!(1, asm.diagnostics().len());
        assert_eq!("integer out of range", asm.diagnostics()[0].message);
    }

    #[test]
    fn register_requires_digit_suffix() {
        use TokenKind::*;

        let toks = tokens(b"r0 r7 r12 ret r1x r");

        assert_eq!(
            vec![Register, Register, Register, Ident, Ident, Ident, Eof],
            toks.iter().map(|t| t.kind).collect::<Vec<_>>()
        );
        assert_eq!(0, toks[0].value);
        assert_eq!(7, toks[1].value);
        assert_eq!(12, toks[2].value);
    }

    #[test]
    fn lone_minus_is_illegal() {
        use TokenKind::*;

        assert_eq!(vec![Illegal, Eof], kinds(b"- 5"));
    }

    #[test]
    fn peek_restores_the_cursor_exactly() {
        let mut asm = Assembler::new(b"push 10\npop r0");

        let ahead = asm.peek(1);
        assert_eq!(TokenKind::Int, ahead.kind);
        assert_eq!(10, ahead.value);

        // the real scan starts from the beginning
        let first = asm.next_token();
        assert_eq!(TokenKind::Ident, first.kind);
        assert_eq!("push", first.text(b"push 10\npop r0"));
        assert_eq!((1, 1), (first.line, first.col));
    }

    #[test]
    fn peek_far_ahead_crosses_lines() {
        let mut asm = Assembler::new(b"push 10\npop r0");

        assert_eq!(TokenKind::Register, asm.peek(3).kind);
        assert_eq!(TokenKind::Eof, asm.peek(4).kind);
    }
}

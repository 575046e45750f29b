#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Lexical unit of the assembler.
pub enum TokenKind {
    /// End of input.
    Eof,
    /// A character no rule matched.
    Illegal,
    /// Signed decimal integer literal.
    Int,
    /// Identifier immediately followed by `:`.
    LabelDef,
    /// Alphanumeric/underscore run starting with a letter or underscore.
    Ident,
    /// `r` followed by a decimal register index.
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A token with its source span and the coordinates of its first character.
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token start in the source.
    pub start: usize,
    /// Span length in bytes. Label definitions exclude the trailing `:`.
    pub len: usize,
    /// Parsed value for `Int` and `Register` tokens.
    pub value: i64,
    pub line: u32,
    pub col: u32,
}

impl Token {
    /// The source text the token spans.
    ///
    /// Token spans only ever cover ASCII runs, so the conversion cannot
    /// fail for tokens the lexer produced.
    pub fn text<'a>(&self, src: &'a [u8]) -> &'a str {
        core::str::from_utf8(&src[self.start..self.start + self.len]).unwrap_or_default()
    }
}

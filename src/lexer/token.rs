use super::token_kind::TokenKind;

/// One lexical token: a kind, its literal text, and its position.
///
/// Tokens are transient — produced on demand by the [`Lexer`](super::Lexer)
/// and consumed immediately by the parser; they are never retained past
/// one parse (spec.md §3 "Lifecycles").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub byte_offset: usize,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, byte_offset: usize, line: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            byte_offset,
            line,
        }
    }

    pub fn is_space(&self) -> bool {
        self.kind == TokenKind::Space
    }
}

use std::collections::HashSet;

use crate::error::Error;
use crate::lexer::{column_of, Lexer, Token, TokenKind};
use crate::parse::tree::Tree;

/// Recursive-descent parser state: the eagerly-lexed token stream plus
/// a read cursor, the parser-maintained variable scope set, and the
/// loop-nesting counter used to reject `break`/`continue` outside a
/// `for` body (spec.md §4.2).
///
/// Because the whole token stream is lexed up front (rather than
/// pulled lazily token-by-token as the teacher's parser does), "three
/// tokens of lookahead" and `backup(1|2|3)` collapse to plain index
/// arithmetic over `tokens` — no ring buffer is needed, unlike the
/// teacher's `current_token` single-slot lookahead cache, which this
/// engine's harder 3-token case (disambiguating `$x foo` from
/// `$x := foo`) would otherwise outgrow.
pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) parse_name: String,
    pub(crate) source_text: &'a str,
    pub(crate) known_funcs: &'a dyn Fn(&str) -> bool,
    vars: Vec<String>,
    loop_depth: usize,
    defines: Vec<Tree>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        source_text: &'a str,
        parse_name: impl Into<String>,
        left_delim: &str,
        right_delim: &str,
        known_funcs: &'a dyn Fn(&str) -> bool,
    ) -> Self {
        let tokens = Lexer::with_delims(source_text, left_delim, right_delim).lex();
        Self {
            tokens,
            pos: 0,
            parse_name: parse_name.into(),
            source_text,
            known_funcs,
            vars: vec!["$".to_string()],
            loop_depth: 0,
            defines: Vec::new(),
        }
    }

    // -- token stream -----------------------------------------------------

    fn at(&self, idx: usize) -> Token {
        let idx = idx.min(self.tokens.len() - 1);
        self.tokens[idx].clone()
    }

    pub(crate) fn peek(&self) -> Token {
        self.at(self.pos)
    }

    pub(crate) fn peek2(&self) -> Token {
        self.at(self.pos + 1)
    }

    pub(crate) fn peek3(&self) -> Token {
        self.at(self.pos + 2)
    }

    pub(crate) fn next(&mut self) -> Token {
        let t = self.at(self.pos);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    pub(crate) fn backup(&mut self) {
        self.backup_n(1);
    }

    pub(crate) fn backup_n(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n);
    }

    /// Snapshot the raw read cursor so speculative lookahead (e.g.
    /// disambiguating `$x foo` from `$x := foo`) can be undone exactly,
    /// including any `SPACE` tokens consumed along the way.
    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    pub(crate) fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    /// Consume and discard tokens until (and including) the next
    /// non-space token, returning it.
    pub(crate) fn next_non_space(&mut self) -> Token {
        loop {
            let t = self.next();
            if t.kind != TokenKind::Space {
                return t;
            }
        }
    }

    /// Peek at the next non-space token without consuming anything.
    pub(crate) fn peek_non_space(&mut self) -> Token {
        let t = self.next_non_space();
        self.backup();
        t
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, Error> {
        let t = self.next_non_space();
        if t.kind == kind {
            Ok(t)
        } else {
            Err(self.unexpected(&t, context))
        }
    }

    // -- errors -------------------------------------------------------------

    pub(crate) fn error_at(&self, token: &Token, message: impl Into<String>) -> Error {
        Error::parse(
            self.parse_name.clone(),
            token.line,
            column_of(self.source_text, token.byte_offset),
            message,
        )
    }

    pub(crate) fn error_at_pos(&self, pos: super::node::Pos, message: impl Into<String>) -> Error {
        Error::parse(
            self.parse_name.clone(),
            pos.line,
            column_of(self.source_text, pos.byte_offset),
            message,
        )
    }

    pub(crate) fn unexpected(&self, token: &Token, context: &str) -> Error {
        if token.kind == TokenKind::Error {
            self.error_at(token, token.text.clone())
        } else {
            self.error_at(token, format!("unexpected {:?} {:?} in {context}", token.kind, token.text))
        }
    }

    // -- variable scope -----------------------------------------------------

    pub(crate) fn vars_mark(&self) -> usize {
        self.vars.len()
    }

    pub(crate) fn vars_truncate(&mut self, mark: usize) {
        self.vars.truncate(mark);
    }

    pub(crate) fn declare_var(&mut self, name: &str) {
        self.vars.push(name.to_string());
    }

    pub(crate) fn var_in_scope(&self, name: &str) -> bool {
        self.vars.iter().any(|v| v == name)
    }

    /// `{{define}}` opens a fresh variable scope (just `$`, rebound to
    /// whatever data the definition is invoked with) rather than inheriting
    /// the enclosing template's in-scope variables. Returns the replaced
    /// scope so the caller can restore it once the nested body is parsed.
    pub(crate) fn enter_define_scope(&mut self) -> Vec<String> {
        std::mem::replace(&mut self.vars, vec!["$".to_string()])
    }

    pub(crate) fn exit_define_scope(&mut self, saved: Vec<String>) {
        self.vars = saved;
    }

    // -- loop nesting --------------------------------------------------------

    pub(crate) fn enter_loop(&mut self) {
        self.loop_depth += 1;
    }

    pub(crate) fn exit_loop(&mut self) {
        self.loop_depth -= 1;
    }

    pub(crate) fn in_loop(&self) -> bool {
        self.loop_depth > 0
    }

    pub(crate) fn is_known_func(&self, name: &str) -> bool {
        (self.known_funcs)(name)
    }

    // -- nested `{{define}}` accumulation ------------------------------------

    /// Record a tree discovered while parsing a `{{define "X"}}...{{end}}`
    /// block anywhere in the token stream. Collected independently of the
    /// enclosing sequence, the way the teacher's document parser hoists
    /// fragment definitions to the top level of the parsed document rather
    /// than nesting them under whatever selection set contained them.
    pub(crate) fn push_define(&mut self, tree: Tree) {
        self.defines.push(tree);
    }

    pub(crate) fn take_defines(&mut self) -> Vec<Tree> {
        std::mem::take(&mut self.defines)
    }
}

/// Reject duplicate or unknown leading-declaration scenarios by
/// validating that a freshly-parsed name set contains no repeats
/// (used by `pipeline.rs`'s `$a, $b := ...` parsing).
pub(crate) fn no_duplicates(names: &[String]) -> bool {
    let set: HashSet<&str> = names.iter().map(|s| s.as_str()).collect();
    set.len() == names.len()
}

mod cursor;
mod token;
mod token_kind;

use cursor::Cursor;

pub use token::Token;
pub use token_kind::TokenKind;

const DEFAULT_LEFT_DELIM: &str = "{{";
const DEFAULT_RIGHT_DELIM: &str = "}}";

/// Streams a template source string into a flat [`Token`] vector,
/// delimiter-aware, tracking byte position and line as it goes.
///
/// Structured like the teacher's `Lexer`/`Cursor` split (`lexer::mod` drives
/// the state machine, `lexer::cursor` is the low-level char stepper) but
/// works over delimiter strings rather than fixed GraphQL punctuation, and
/// reports lexical trouble as an in-stream `TokenKind::Error` token (spec.md
/// §4.1) rather than a side channel of errors — the parser is the one place
/// that turns that into an `Error::Lexical`.
pub struct Lexer<'a> {
    input: &'a str,
    left_delim: &'a str,
    right_delim: &'a str,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_delims(input, DEFAULT_LEFT_DELIM, DEFAULT_RIGHT_DELIM)
    }

    pub fn with_delims(input: &'a str, left_delim: &'a str, right_delim: &'a str) -> Self {
        Self {
            input,
            left_delim,
            right_delim,
            tokens: Vec::new(),
        }
    }

    /// Run the lexer to completion, returning the flat token stream.
    /// Stops emitting (but does not panic) as soon as an unrecognised
    /// sequence produces a `TokenKind::Error` token.
    pub fn lex(mut self) -> Vec<Token> {
        let mut cursor = Cursor::new(self.input, 0, 1);
        'outer: loop {
            if cursor.at_eof() {
                self.tokens.push(Token::new(TokenKind::Eof, "", cursor.pos(), cursor.line()));
                break;
            }

            match find(cursor.rest(), self.left_delim) {
                None => {
                    let text = cursor.rest();
                    if !text.is_empty() {
                        self.tokens
                            .push(Token::new(TokenKind::Text, text, cursor.pos(), cursor.line()));
                    }
                    while cursor.bump().is_some() {}
                    self.tokens.push(Token::new(TokenKind::Eof, "", cursor.pos(), cursor.line()));
                    break;
                }
                Some(offset) => {
                    if offset > 0 {
                        let text = &cursor.rest()[..offset];
                        let text_pos = cursor.pos();
                        let text_line = cursor.line();
                        cursor.skip(text);
                        self.tokens
                            .push(Token::new(TokenKind::Text, text, text_pos, text_line));
                    }

                    // Comments: {{/* ... */}} — consumed with zero tokens,
                    // including both delimiters (spec.md §4.1).
                    let after_left = &cursor.rest()[self.left_delim.len()..];
                    if after_left.starts_with("/*") {
                        let comment_start_pos = cursor.pos();
                        let comment_start_line = cursor.line();
                        cursor.skip(self.left_delim);
                        cursor.skip("/*");
                        match find(cursor.rest(), "*/") {
                            Some(end) => {
                                let close = format!("*/{}", self.right_delim);
                                if cursor.rest()[end..].starts_with(&close) {
                                    let to_skip = &cursor.rest()[..end];
                                    cursor.skip(to_skip);
                                    cursor.skip(&close);
                                    continue 'outer;
                                } else {
                                    self.tokens.push(Token::new(
                                        TokenKind::Error,
                                        "unterminated comment",
                                        comment_start_pos,
                                        comment_start_line,
                                    ));
                                    break;
                                }
                            }
                            None => {
                                self.tokens.push(Token::new(
                                    TokenKind::Error,
                                    "unterminated comment",
                                    comment_start_pos,
                                    comment_start_line,
                                ));
                                break;
                            }
                        }
                    }

                    let delim_pos = cursor.pos();
                    let delim_line = cursor.line();
                    cursor.skip(self.left_delim);
                    self.tokens.push(Token::new(
                        TokenKind::LeftDelim,
                        self.left_delim,
                        delim_pos,
                        delim_line,
                    ));

                    if !self.lex_inside_action(&mut cursor) {
                        break;
                    }
                }
            }
        }
        self.tokens
    }

    /// Lex one `{{ ... }}` action body, returning `false` if lexing
    /// should halt (error emitted, or unclosed action at EOF).
    fn lex_inside_action(&mut self, cursor: &mut Cursor<'a>) -> bool {
        loop {
            if cursor.starts_with(self.right_delim) {
                let pos = cursor.pos();
                let line = cursor.line();
                cursor.skip(self.right_delim);
                self.tokens
                    .push(Token::new(TokenKind::RightDelim, self.right_delim, pos, line));
                return true;
            }

            match cursor.peek() {
                None => {
                    self.tokens.push(Token::new(
                        TokenKind::Error,
                        "unclosed action",
                        cursor.pos(),
                        cursor.line(),
                    ));
                    return false;
                }
                Some(c) if c == ' ' || c == '\t' || c == '\n' || c == '\r' => {
                    let pos = cursor.pos();
                    let line = cursor.line();
                    let mut text = String::new();
                    while matches!(cursor.peek(), Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
                        text.push(cursor.bump().unwrap());
                    }
                    self.tokens.push(Token::new(TokenKind::Space, text, pos, line));
                }
                Some('|') => self.emit_punct(cursor, TokenKind::Pipe, "|"),
                Some('(') => self.emit_punct(cursor, TokenKind::LeftParen, "("),
                Some(')') => self.emit_punct(cursor, TokenKind::RightParen, ")"),
                Some(':') => {
                    let pos = cursor.pos();
                    let line = cursor.line();
                    cursor.bump();
                    if cursor.peek() == Some('=') {
                        cursor.bump();
                        self.tokens.push(Token::new(TokenKind::Declare, ":=", pos, line));
                    } else {
                        self.tokens.push(Token::new(
                            TokenKind::Error,
                            "expected ':=' after ':'",
                            pos,
                            line,
                        ));
                        return false;
                    }
                }
                Some('=') => self.emit_punct(cursor, TokenKind::Assign, "="),
                Some('"') => {
                    if !self.lex_string(cursor) {
                        return false;
                    }
                }
                Some('`') => {
                    if !self.lex_raw_string(cursor) {
                        return false;
                    }
                }
                Some('\'') => {
                    if !self.lex_char_constant(cursor) {
                        return false;
                    }
                }
                Some('$') => self.lex_variable(cursor),
                Some('.') => {
                    if cursor.peek2().map(is_ident_start).unwrap_or(false) {
                        self.lex_field(cursor);
                    } else if cursor.peek2().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                        self.lex_number(cursor);
                    } else {
                        let pos = cursor.pos();
                        let line = cursor.line();
                        cursor.bump();
                        self.tokens.push(Token::new(TokenKind::Dot, ".", pos, line));
                    }
                }
                Some(c) if c.is_ascii_digit() || ((c == '+' || c == '-') && cursor.peek2().map(|n| n.is_ascii_digit()).unwrap_or(false)) => {
                    self.lex_number(cursor);
                }
                Some(c) if is_ident_start(c) => self.lex_identifier(cursor),
                Some(c) => {
                    let pos = cursor.pos();
                    let line = cursor.line();
                    cursor.bump();
                    self.tokens.push(Token::new(
                        TokenKind::Error,
                        format!("unrecognized character: {c:?}"),
                        pos,
                        line,
                    ));
                    return false;
                }
            }
        }
    }

    fn emit_punct(&mut self, cursor: &mut Cursor<'a>, kind: TokenKind, text: &str) {
        let pos = cursor.pos();
        let line = cursor.line();
        cursor.bump();
        self.tokens.push(Token::new(kind, text, pos, line));
    }

    fn lex_identifier(&mut self, cursor: &mut Cursor<'a>) {
        let pos = cursor.pos();
        let line = cursor.line();
        let mut text = String::new();
        while let Some(c) = cursor.peek() {
            if is_ident_char(c) {
                text.push(c);
                cursor.bump();
            } else {
                break;
            }
        }
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        self.tokens.push(Token::new(kind, text, pos, line));
    }

    fn lex_field(&mut self, cursor: &mut Cursor<'a>) {
        let pos = cursor.pos();
        let line = cursor.line();
        let mut text = String::new();
        loop {
            if cursor.peek() == Some('.') && cursor.peek2().map(is_ident_start).unwrap_or(false) {
                text.push(cursor.bump().unwrap());
                while let Some(c) = cursor.peek() {
                    if is_ident_char(c) {
                        text.push(c);
                        cursor.bump();
                    } else {
                        break;
                    }
                }
            } else {
                break;
            }
        }
        self.tokens.push(Token::new(TokenKind::Field, text, pos, line));
    }

    fn lex_variable(&mut self, cursor: &mut Cursor<'a>) {
        let pos = cursor.pos();
        let line = cursor.line();
        let mut text = String::new();
        text.push(cursor.bump().unwrap()); // '$'
        if cursor.peek().map(is_ident_start).unwrap_or(false) {
            while let Some(c) = cursor.peek() {
                if is_ident_char(c) {
                    text.push(c);
                    cursor.bump();
                } else {
                    break;
                }
            }
            loop {
                if cursor.peek() == Some('.') && cursor.peek2().map(is_ident_start).unwrap_or(false) {
                    text.push(cursor.bump().unwrap());
                    while let Some(c) = cursor.peek() {
                        if is_ident_char(c) {
                            text.push(c);
                            cursor.bump();
                        } else {
                            break;
                        }
                    }
                } else {
                    break;
                }
            }
        }
        // A bare `$` (no identifier chars follow) denotes the root datum.
        self.tokens.push(Token::new(TokenKind::Variable, text, pos, line));
    }

    fn lex_number(&mut self, cursor: &mut Cursor<'a>) {
        let pos = cursor.pos();
        let line = cursor.line();
        let mut text = String::new();
        if cursor.peek() == Some('+') || cursor.peek() == Some('-') {
            text.push(cursor.bump().unwrap());
        }
        let is_hex = cursor.peek() == Some('0')
            && matches!(cursor.peek2(), Some('x') | Some('X'));
        if is_hex {
            text.push(cursor.bump().unwrap());
            text.push(cursor.bump().unwrap());
            while let Some(c) = cursor.peek() {
                if c.is_ascii_hexdigit() {
                    text.push(c);
                    cursor.bump();
                } else {
                    break;
                }
            }
        } else {
            while let Some(c) = cursor.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    cursor.bump();
                } else {
                    break;
                }
            }
            if cursor.peek() == Some('.') && cursor.peek2().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                text.push(cursor.bump().unwrap());
                while let Some(c) = cursor.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        cursor.bump();
                    } else {
                        break;
                    }
                }
            }
            if matches!(cursor.peek(), Some('e') | Some('E')) {
                let mut lookahead = cursor.clone();
                lookahead.bump();
                if matches!(lookahead.peek(), Some('+') | Some('-')) {
                    lookahead.bump();
                }
                if lookahead.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                    text.push(cursor.bump().unwrap());
                    if matches!(cursor.peek(), Some('+') | Some('-')) {
                        text.push(cursor.bump().unwrap());
                    }
                    while let Some(c) = cursor.peek() {
                        if c.is_ascii_digit() {
                            text.push(c);
                            cursor.bump();
                        } else {
                            break;
                        }
                    }
                }
            }
        }
        self.tokens.push(Token::new(TokenKind::Number, text, pos, line));
    }

    fn lex_string(&mut self, cursor: &mut Cursor<'a>) -> bool {
        let pos = cursor.pos();
        let line = cursor.line();
        let mut text = String::new();
        text.push(cursor.bump().unwrap()); // opening quote
        loop {
            match cursor.bump() {
                None => {
                    self.tokens.push(Token::new(
                        TokenKind::Error,
                        "unterminated string",
                        pos,
                        line,
                    ));
                    return false;
                }
                Some('"') => {
                    text.push('"');
                    break;
                }
                Some('\\') => {
                    text.push('\\');
                    match cursor.bump() {
                        Some(c) => text.push(c),
                        None => {
                            self.tokens.push(Token::new(
                                TokenKind::Error,
                                "unterminated string",
                                pos,
                                line,
                            ));
                            return false;
                        }
                    }
                }
                Some(c) => text.push(c),
            }
        }
        self.tokens.push(Token::new(TokenKind::String, text, pos, line));
        true
    }

    fn lex_raw_string(&mut self, cursor: &mut Cursor<'a>) -> bool {
        let pos = cursor.pos();
        let line = cursor.line();
        let mut text = String::new();
        text.push(cursor.bump().unwrap()); // opening backtick
        loop {
            match cursor.bump() {
                None => {
                    self.tokens.push(Token::new(
                        TokenKind::Error,
                        "unterminated raw string",
                        pos,
                        line,
                    ));
                    return false;
                }
                Some('`') => {
                    text.push('`');
                    break;
                }
                Some('\r') => {} // carriage returns are stripped
                Some(c) => text.push(c),
            }
        }
        self.tokens.push(Token::new(TokenKind::RawString, text, pos, line));
        true
    }

    fn lex_char_constant(&mut self, cursor: &mut Cursor<'a>) -> bool {
        let pos = cursor.pos();
        let line = cursor.line();
        let mut text = String::new();
        text.push(cursor.bump().unwrap()); // opening quote
        match cursor.bump() {
            Some('\\') => {
                text.push('\\');
                match cursor.bump() {
                    Some(c) => text.push(c),
                    None => {
                        self.tokens.push(Token::new(
                            TokenKind::Error,
                            "unterminated character constant",
                            pos,
                            line,
                        ));
                        return false;
                    }
                }
            }
            Some(c) => text.push(c),
            None => {
                self.tokens.push(Token::new(
                    TokenKind::Error,
                    "unterminated character constant",
                    pos,
                    line,
                ));
                return false;
            }
        }
        match cursor.bump() {
            Some('\'') => text.push('\''),
            _ => {
                self.tokens.push(Token::new(
                    TokenKind::Error,
                    "unterminated character constant",
                    pos,
                    line,
                ));
                return false;
            }
        }
        self.tokens.push(Token::new(TokenKind::CharConstant, text, pos, line));
        true
    }
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn find(haystack: &str, needle: &str) -> Option<usize> {
    haystack.find(needle)
}

/// 1-based column of `byte_offset` within `source`, counting from the
/// start of its line. Used to turn a node's byte offset into the
/// `line:column` pair error messages report (spec.md §4.2).
pub(crate) fn column_of(source: &str, byte_offset: usize) -> u32 {
    let offset = byte_offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    (source[line_start..offset].chars().count() + 1) as u32
}

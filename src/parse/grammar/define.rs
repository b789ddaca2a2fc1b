use crate::error::Error;
use crate::lexer::TokenKind;
use crate::parse::grammar::body::{parse_sequence, Terminator};
use crate::parse::parser::Parser;
use crate::parse::tree::Tree;
use crate::parse::unescape::unescape;

/// `define := "define" STRING RIGHT_DELIM body "end"`
///
/// Caller has already peeked (not consumed) the `define` keyword.
pub(crate) fn parse_define(p: &mut Parser) -> Result<Tree, Error> {
    p.next_non_space();
    let name_tok = p.next_non_space();
    let name = match name_tok.kind {
        TokenKind::String => {
            unescape(&name_tok.text[1..name_tok.text.len() - 1]).map_err(|msg| p.error_at(&name_tok, msg))?
        }
        TokenKind::RawString => name_tok.text[1..name_tok.text.len() - 1].to_string(),
        _ => return Err(p.unexpected(&name_tok, "define")),
    };
    p.expect(TokenKind::RightDelim, "define")?;

    let saved_scope = p.enter_define_scope();
    let result = parse_sequence(p);
    p.exit_define_scope(saved_scope);
    let (root, terminator) = result?;

    match terminator {
        Terminator::End => {}
        Terminator::Else => return Err(p.error_at(&name_tok, "unexpected else in define")),
        Terminator::Eof => return Err(p.error_at(&name_tok, format!("unclosed define {name:?}"))),
    }

    Ok(Tree::new(name, p.parse_name.clone(), root, p.source_text.to_string()))
}

use crate::error::Error;
use crate::lexer::TokenKind;
use crate::parse::grammar::pipeline::parse_pipeline;
use crate::parse::node::{Node, Pos, TemplateNode};
use crate::parse::parser::Parser;
use crate::parse::unescape::unescape;

/// `template := "template" STRING pipeline? RIGHT_DELIM`
///
/// Self-closing: no `body`/`end`, since invocation defers to whatever
/// tree was registered under `invoked_name`.
pub(crate) fn parse_template_call(p: &mut Parser) -> Result<Node, Error> {
    let start = p.next_non_space();
    let pos = Pos::new(start.byte_offset, start.line);

    let name_tok = p.next_non_space();
    let invoked_name = match name_tok.kind {
        TokenKind::String => {
            unescape(&name_tok.text[1..name_tok.text.len() - 1]).map_err(|msg| p.error_at(&name_tok, msg))?
        }
        TokenKind::RawString => name_tok.text[1..name_tok.text.len() - 1].to_string(),
        _ => return Err(p.unexpected(&name_tok, "template")),
    };

    let next = p.peek_non_space();
    let pipe = if next.kind == TokenKind::RightDelim {
        None
    } else {
        Some(parse_pipeline(p, "template")?)
    };
    p.expect(TokenKind::RightDelim, "template")?;

    Ok(Node::Template(TemplateNode {
        pos,
        invoked_name,
        pipe,
    }))
}

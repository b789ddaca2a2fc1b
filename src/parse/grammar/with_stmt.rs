use crate::error::Error;
use crate::lexer::TokenKind;
use crate::parse::grammar::body::{parse_sequence, Terminator};
use crate::parse::grammar::pipeline::parse_pipeline;
use crate::parse::node::{Node, Pos, WithNode};
use crate::parse::parser::Parser;

/// `with := "with" pipeline RIGHT_DELIM body ( "else" RIGHT_DELIM body )? "end"`
pub(crate) fn parse_with(p: &mut Parser) -> Result<Node, Error> {
    let start = p.next_non_space();
    let pos = Pos::new(start.byte_offset, start.line);
    let pipe = parse_pipeline(p, "with")?;
    p.expect(TokenKind::RightDelim, "with")?;

    let mark = p.vars_mark();
    let (body, terminator) = parse_sequence(p)?;
    p.vars_truncate(mark);

    match terminator {
        Terminator::End => Ok(Node::With(WithNode {
            pos,
            pipe,
            body,
            else_body: None,
        })),
        Terminator::Eof => Err(p.error_at_pos(pos, "unclosed with")),
        Terminator::Else => {
            p.expect(TokenKind::RightDelim, "else")?;
            let mark = p.vars_mark();
            let (else_body, terminator) = parse_sequence(p)?;
            p.vars_truncate(mark);
            match terminator {
                Terminator::End => Ok(Node::With(WithNode {
                    pos,
                    pipe,
                    body,
                    else_body: Some(else_body),
                })),
                Terminator::Else => Err(p.error_at_pos(pos, "with has more than one else clause")),
                Terminator::Eof => Err(p.error_at_pos(pos, "unclosed with")),
            }
        }
    }
}

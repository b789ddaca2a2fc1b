use crate::error::Error;
use crate::lexer::TokenKind;
use crate::parse::grammar::body::{parse_sequence, Terminator};
use crate::parse::grammar::pipeline::parse_pipeline;
use crate::parse::node::{IfNode, Node, Pos, SequenceNode};
use crate::parse::parser::Parser;

/// `if := "if" pipeline RIGHT_DELIM body ( "else" ( if | RIGHT_DELIM body ) )? "end"`
///
/// An `else if` chain is parsed as a nested [`parse_if`] call, which
/// consumes its own closing `{{end}}` — mirroring the source grammar's
/// habit of letting the innermost `end` close the whole chain, so the
/// outer `if` never needs a second one.
pub(crate) fn parse_if(p: &mut Parser) -> Result<Node, Error> {
    let start = p.next_non_space();
    let pos = Pos::new(start.byte_offset, start.line);
    let pipe = parse_pipeline(p, "if")?;
    p.expect(TokenKind::RightDelim, "if")?;

    let mark = p.vars_mark();
    let (body, terminator) = parse_sequence(p)?;
    p.vars_truncate(mark);

    match terminator {
        Terminator::End => Ok(Node::If(IfNode {
            pos,
            pipe,
            body,
            else_body: None,
        })),
        Terminator::Eof => Err(p.error_at_pos(pos, "unclosed if")),
        Terminator::Else => {
            let next = p.peek_non_space();
            if next.kind == TokenKind::If {
                let chained = parse_if(p)?;
                let else_pos = chained.pos();
                Ok(Node::If(IfNode {
                    pos,
                    pipe,
                    body,
                    else_body: Some(SequenceNode {
                        pos: else_pos,
                        children: vec![chained],
                    }),
                }))
            } else {
                p.expect(TokenKind::RightDelim, "else")?;
                let mark = p.vars_mark();
                let (else_body, terminator) = parse_sequence(p)?;
                p.vars_truncate(mark);
                match terminator {
                    Terminator::End => Ok(Node::If(IfNode {
                        pos,
                        pipe,
                        body,
                        else_body: Some(else_body),
                    })),
                    Terminator::Else => Err(p.error_at_pos(pos, "if has more than one else clause")),
                    Terminator::Eof => Err(p.error_at_pos(pos, "unclosed if")),
                }
            }
        }
    }
}

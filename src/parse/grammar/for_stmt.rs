use crate::error::Error;
use crate::lexer::TokenKind;
use crate::parse::grammar::body::{parse_sequence, Terminator};
use crate::parse::grammar::pipeline::parse_pipeline;
use crate::parse::node::{ForNode, Node, Pos};
use crate::parse::parser::Parser;

/// `for := "for" pipeline RIGHT_DELIM body ( "else" RIGHT_DELIM body )? "end"`
///
/// `break`/`continue` are only legal inside `body`, tracked via the
/// parser's loop-depth counter (spec.md §4.2) — the `else` clause, run
/// only when the range is empty, is outside the loop.
pub(crate) fn parse_for(p: &mut Parser) -> Result<Node, Error> {
    let start = p.next_non_space();
    let pos = Pos::new(start.byte_offset, start.line);
    let pipe = parse_pipeline(p, "for")?;
    p.expect(TokenKind::RightDelim, "for")?;

    let mark = p.vars_mark();
    p.enter_loop();
    let result = parse_sequence(p);
    p.exit_loop();
    p.vars_truncate(mark);
    let (body, terminator) = result?;

    match terminator {
        Terminator::End => Ok(Node::For(ForNode {
            pos,
            pipe,
            body,
            else_body: None,
        })),
        Terminator::Eof => Err(p.error_at_pos(pos, "unclosed for")),
        Terminator::Else => {
            p.expect(TokenKind::RightDelim, "else")?;
            let mark = p.vars_mark();
            let (else_body, terminator) = parse_sequence(p)?;
            p.vars_truncate(mark);
            match terminator {
                Terminator::End => Ok(Node::For(ForNode {
                    pos,
                    pipe,
                    body,
                    else_body: Some(else_body),
                })),
                Terminator::Else => Err(p.error_at_pos(pos, "for has more than one else clause")),
                Terminator::Eof => Err(p.error_at_pos(pos, "unclosed for")),
            }
        }
    }
}

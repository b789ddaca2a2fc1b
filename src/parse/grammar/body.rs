use crate::error::Error;
use crate::lexer::TokenKind;
use crate::parse::grammar::{define, for_stmt, if_stmt, pipeline, template_call, with_stmt};
use crate::parse::node::{ActionNode, Node, Pos, SequenceNode, TextNode};
use crate::parse::parser::Parser;

/// What ended a `body` production: the matching `{{end}}`, a sibling
/// `{{else}}`, or running off the end of the token stream (only valid
/// at the outermost level of a template).
pub(crate) enum Terminator {
    End,
    Else,
    Eof,
}

/// `body := ( text | action )*`, stopping at a matching `{{end}}` or
/// `{{else}}` (consumed) or at end-of-input. Shared by the top-level
/// template parse and every `if`/`for`/`with`/`define` body.
///
/// `{{define "X"}}...{{end}}` blocks are transparent here: parsing one
/// yields no node in the *current* sequence and instead appends a
/// freestanding tree to the parser's side `defines` accumulator,
/// mirroring how the teacher's `parser::grammar::document` module
/// treats top-level definitions as siblings collected into the
/// surrounding document rather than as selection-set children.
pub(crate) fn parse_sequence(p: &mut Parser) -> Result<(SequenceNode, Terminator), Error> {
    let start = p.peek();
    let seq_pos = Pos::new(start.byte_offset, start.line);
    let mut children = Vec::new();

    loop {
        let t = p.peek();
        match t.kind {
            TokenKind::Eof => return Ok((SequenceNode { pos: seq_pos, children }, Terminator::Eof)),
            TokenKind::Error => return Err(p.unexpected(&t, "template")),
            TokenKind::Text => {
                p.next();
                children.push(Node::Text(TextNode {
                    pos: Pos::new(t.byte_offset, t.line),
                    text: t.text,
                }));
            }
            TokenKind::LeftDelim => {
                p.next();
                let kw = p.peek_non_space();
                match kw.kind {
                    TokenKind::Define => {
                        let tree = define::parse_define(p)?;
                        p.push_define(tree);
                    }
                    TokenKind::If => children.push(if_stmt::parse_if(p)?),
                    TokenKind::For => children.push(for_stmt::parse_for(p)?),
                    TokenKind::With => children.push(with_stmt::parse_with(p)?),
                    TokenKind::Template => children.push(template_call::parse_template_call(p)?),
                    TokenKind::Break => {
                        p.next_non_space();
                        if !p.in_loop() {
                            return Err(p.error_at(&kw, "break outside a for loop"));
                        }
                        p.expect(TokenKind::RightDelim, "break")?;
                        children.push(Node::Break(Pos::new(kw.byte_offset, kw.line)));
                    }
                    TokenKind::Continue => {
                        p.next_non_space();
                        if !p.in_loop() {
                            return Err(p.error_at(&kw, "continue outside a for loop"));
                        }
                        p.expect(TokenKind::RightDelim, "continue")?;
                        children.push(Node::Continue(Pos::new(kw.byte_offset, kw.line)));
                    }
                    TokenKind::End => {
                        p.next_non_space();
                        p.expect(TokenKind::RightDelim, "end")?;
                        return Ok((SequenceNode { pos: seq_pos, children }, Terminator::End));
                    }
                    TokenKind::Else => {
                        p.next_non_space();
                        return Ok((SequenceNode { pos: seq_pos, children }, Terminator::Else));
                    }
                    _ => {
                        let pipe = pipeline::parse_pipeline(p, "action")?;
                        p.expect(TokenKind::RightDelim, "action")?;
                        children.push(Node::Action(ActionNode { pos: pipe.pos, pipe }));
                    }
                }
            }
            _ => return Err(p.unexpected(&t, "template")),
        }
    }
}

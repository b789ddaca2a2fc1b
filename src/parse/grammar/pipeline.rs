use crate::error::Error;
use crate::lexer::TokenKind;
use crate::parse::node::{
    BoolNode, ChainNode, CommandNode, FieldNode, IdentifierNode, Node, NumberNode, Pos, PipeNode,
    StringNode, VariableNode,
};
use crate::parse::numeric;
use crate::parse::parser::Parser;
use crate::parse::unescape::unescape;

/// `pipeline := [ variable ( "," variable )* ( ":=" | "=" ) ] command ( "|" command )*`
///
/// The BNF's comma-separated multi-variable declaration never actually
/// arises under this engine's token kinds — spec.md §3's closed
/// `TokenKind` set has no comma token — so only a single leading
/// variable is supported; see DESIGN.md.
pub(crate) fn parse_pipeline(p: &mut Parser, context: &str) -> Result<PipeNode, Error> {
    let start = p.peek_non_space();
    let pos = Pos::new(start.byte_offset, start.line);

    let mut decl = Vec::new();
    let mut is_declaration = false;

    let mark = p.mark();
    let tok1 = p.next_non_space();
    if tok1.kind == TokenKind::Variable {
        let tok2 = p.peek_non_space();
        if tok2.kind == TokenKind::Declare || tok2.kind == TokenKind::Assign {
            p.next_non_space();
            is_declaration = tok2.kind == TokenKind::Declare;
            let var = variable_node(&tok1);
            if !is_declaration && !p.var_in_scope(var.head()) {
                return Err(p.error_at(&tok1, format!("undefined variable {:?}", var.head())));
            }
            decl.push(var);
        } else {
            p.reset(mark);
        }
    } else {
        p.reset(mark);
    }

    let mut cmds = Vec::new();
    loop {
        let cmd = parse_command(p, context)?;
        if !cmds.is_empty() {
            if let Some(first) = cmd.args.first() {
                if is_pure_literal(first) {
                    return Err(p.error_at_pos(
                        first.pos(),
                        "non-executable command: pipeline stage cannot start with a literal",
                    ));
                }
            }
        }
        cmds.push(cmd);
        let t = p.peek_non_space();
        if t.kind == TokenKind::Pipe {
            p.next_non_space();
            continue;
        }
        break;
    }

    if is_declaration {
        for v in &decl {
            p.declare_var(v.head());
        }
    }

    Ok(PipeNode {
        pos,
        decl,
        is_declaration,
        cmds,
    })
}

fn parse_command(p: &mut Parser, context: &str) -> Result<CommandNode, Error> {
    let start = p.peek_non_space();
    let pos = Pos::new(start.byte_offset, start.line);
    let mut args = vec![parse_operand(p, context)?];

    loop {
        let t = p.peek();
        if t.kind != TokenKind::Space {
            break;
        }
        let mark = p.mark();
        p.next();
        let after = p.peek();
        if is_operand_start(after.kind) {
            args.push(parse_operand(p, context)?);
        } else {
            p.reset(mark);
            break;
        }
    }

    Ok(CommandNode { pos, args })
}

fn parse_operand(p: &mut Parser, context: &str) -> Result<Node, Error> {
    let mut node = parse_term(p, context)?;
    loop {
        let t = p.peek();
        if t.kind == TokenKind::Field {
            p.next();
            let idents = field_idents(&t.text);
            let pos = node.pos();
            node = Node::Chain(ChainNode {
                pos,
                node: Box::new(node),
                idents,
            });
        } else {
            break;
        }
    }
    Ok(node)
}

fn parse_term(p: &mut Parser, context: &str) -> Result<Node, Error> {
    let t = p.next_non_space();
    let pos = Pos::new(t.byte_offset, t.line);
    match t.kind {
        TokenKind::Bool => Ok(Node::Bool(BoolNode {
            pos,
            value: t.text == "true",
        })),
        TokenKind::Null => Ok(Node::Null(pos)),
        TokenKind::Dot => Ok(Node::Dot(pos)),
        TokenKind::Number => {
            let (int_value, float_value) =
                numeric::decode(&t.text).map_err(|msg| p.error_at(&t, msg))?;
            Ok(Node::Number(NumberNode {
                pos,
                text: t.text,
                int_value,
                float_value,
            }))
        }
        TokenKind::CharConstant => {
            let inner = &t.text[1..t.text.len() - 1];
            let decoded = unescape(inner).map_err(|msg| p.error_at(&t, msg))?;
            let code = decoded.chars().next().ok_or_else(|| {
                p.error_at(&t, "empty character constant")
            })? as i64;
            Ok(Node::Number(NumberNode {
                pos,
                text: t.text.clone(),
                int_value: Some(code),
                float_value: None,
            }))
        }
        TokenKind::String => {
            let inner = &t.text[1..t.text.len() - 1];
            let value = unescape(inner).map_err(|msg| p.error_at(&t, msg))?;
            Ok(Node::String(StringNode {
                pos,
                quoted: t.text.clone(),
                value,
            }))
        }
        TokenKind::RawString => {
            let value = t.text[1..t.text.len() - 1].to_string();
            Ok(Node::String(StringNode {
                pos,
                quoted: t.text.clone(),
                value,
            }))
        }
        TokenKind::Field => Ok(Node::Field(FieldNode {
            pos,
            idents: field_idents(&t.text),
        })),
        TokenKind::Variable => {
            let var = variable_node(&t);
            if !p.var_in_scope(var.head()) {
                return Err(p.error_at(&t, format!("undefined variable {:?}", var.head())));
            }
            Ok(Node::Variable(var))
        }
        TokenKind::Identifier => {
            if !p.is_known_func(&t.text) {
                return Err(p.error_at(&t, format!("function {:?} not defined", t.text)));
            }
            Ok(Node::Identifier(IdentifierNode { pos, name: t.text }))
        }
        TokenKind::LeftParen => {
            let inner = parse_pipeline(p, "parenthesized pipeline")?;
            p.expect(TokenKind::RightParen, "parenthesized pipeline")?;
            Ok(Node::Pipe(inner))
        }
        _ => Err(p.unexpected(&t, context)),
    }
}

fn is_operand_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Bool
            | TokenKind::Null
            | TokenKind::Dot
            | TokenKind::Number
            | TokenKind::CharConstant
            | TokenKind::String
            | TokenKind::RawString
            | TokenKind::Field
            | TokenKind::Variable
            | TokenKind::Identifier
            | TokenKind::LeftParen
    )
}

fn is_pure_literal(node: &Node) -> bool {
    matches!(
        node,
        Node::Bool(_) | Node::Dot(_) | Node::Null(_) | Node::Number(_) | Node::String(_)
    )
}

fn variable_node(token: &crate::lexer::Token) -> VariableNode {
    let pos = Pos::new(token.byte_offset, token.line);
    if token.text == "$" {
        return VariableNode {
            pos,
            idents: vec!["$".to_string()],
        };
    }
    let idents: Vec<String> = token.text[1..].split('.').map(|s| s.to_string()).collect();
    VariableNode { pos, idents }
}

fn field_idents(text: &str) -> Vec<String> {
    text[1..].split('.').map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funcs_always_known(_: &str) -> bool {
        true
    }

    #[test]
    fn parses_simple_field_pipeline() {
        let known: &dyn Fn(&str) -> bool = &funcs_always_known;
        let mut p = Parser::new(".x", "t", "{{", "}}", known);
        let pipe = parse_pipeline(&mut p, "action").unwrap();
        assert_eq!(pipe.cmds.len(), 1);
        assert!(matches!(pipe.cmds[0].args[0], Node::Field(_)));
    }

    #[test]
    fn parses_declaration() {
        let known: &dyn Fn(&str) -> bool = &funcs_always_known;
        let mut p = Parser::new("$x := .y", "t", "{{", "}}", known);
        let pipe = parse_pipeline(&mut p, "action").unwrap();
        assert!(pipe.is_declaration);
        assert_eq!(pipe.decl[0].head(), "x");
    }

    #[test]
    fn rejects_non_first_literal_command() {
        let known: &dyn Fn(&str) -> bool = &funcs_always_known;
        let mut p = Parser::new(".x | 5", "t", "{{", "}}", known);
        assert!(parse_pipeline(&mut p, "action").is_err());
    }

    #[test]
    fn rejects_undefined_function() {
        fn none_known(_: &str) -> bool {
            false
        }
        let known: &dyn Fn(&str) -> bool = &none_known;
        let mut p = Parser::new("foo", "t", "{{", "}}", known);
        assert!(parse_pipeline(&mut p, "action").is_err());
    }

    #[test]
    fn rejects_undefined_variable() {
        let known: &dyn Fn(&str) -> bool = &funcs_always_known;
        let mut p = Parser::new("$y", "t", "{{", "}}", known);
        assert!(parse_pipeline(&mut p, "action").is_err());
    }
}

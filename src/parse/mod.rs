//! Tokens in, [`Tree`]s out: recursive-descent parsing of a template
//! source string into an owned AST, grounded on the teacher's
//! `parser` module but trading its lossless rowan `SyntaxTree` for a
//! plain owned `Node` enum (see `node.rs`'s doc comment, and
//! DESIGN.md, for why).

mod grammar;
pub(crate) mod node;
mod numeric;
mod parser;
mod tree;
mod unescape;

pub use node::Node;
pub use tree::Tree;

use crate::error::Error;
use crate::parse::grammar::body::{parse_sequence, Terminator};
use crate::parse::parser::Parser;

/// Parse one template source into its own [`Tree`] named `name`, plus
/// one additional [`Tree`] for every nested `{{define}}` block found
/// along the way (spec.md §3's "a parse can yield more than one
/// tree"). `known_funcs` is consulted while parsing so an unknown
/// identifier used as a command is rejected at parse time rather than
/// at execution.
pub(crate) fn parse(
    source_text: &str,
    name: &str,
    parse_name: &str,
    left_delim: &str,
    right_delim: &str,
    known_funcs: &dyn Fn(&str) -> bool,
) -> Result<Vec<Tree>, Error> {
    let mut p = Parser::new(source_text, parse_name, left_delim, right_delim, known_funcs);
    let (root, terminator) = parse_sequence(&mut p)?;

    match terminator {
        Terminator::Eof => {}
        Terminator::End => return Err(p.error_at(&p.peek(), "unexpected {{end}}")),
        Terminator::Else => return Err(p.error_at(&p.peek(), "unexpected {{else}}")),
    }

    let mut trees = p.take_defines();
    trees.insert(0, tree::Tree::new(name.to_string(), parse_name.to_string(), root, source_text.to_string()));
    Ok(trees)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_known(_: &str) -> bool {
        true
    }

    #[test]
    fn parses_plain_text_tree() {
        let known: &dyn Fn(&str) -> bool = &all_known;
        let trees = parse("hello", "t", "t", "{{", "}}", known).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].name, "t");
    }

    #[test]
    fn collects_nested_define_as_separate_tree() {
        let known: &dyn Fn(&str) -> bool = &all_known;
        let src = r#"before{{define "frag"}}inner{{end}}after"#;
        let trees = parse(src, "t", "t", "{{", "}}", known).unwrap();
        assert_eq!(trees.len(), 2);
        assert!(trees.iter().any(|t| t.name == "frag"));
        assert!(trees.iter().any(|t| t.name == "t"));
    }

    #[test]
    fn rejects_dangling_end() {
        let known: &dyn Fn(&str) -> bool = &all_known;
        assert!(parse("{{end}}", "t", "t", "{{", "}}", known).is_err());
    }

    #[test]
    fn rejects_unclosed_if() {
        let known: &dyn Fn(&str) -> bool = &all_known;
        assert!(parse("{{if true}}x", "t", "t", "{{", "}}", known).is_err());
    }

    #[test]
    fn parses_if_else_chain() {
        let known: &dyn Fn(&str) -> bool = &all_known;
        let src = "{{if false}}a{{else if true}}b{{else}}c{{end}}";
        let trees = parse(src, "t", "t", "{{", "}}", known).unwrap();
        assert_eq!(trees.len(), 1);
    }

    #[test]
    fn parses_for_with_break() {
        let known: &dyn Fn(&str) -> bool = &all_known;
        let src = "{{for .items}}{{if .done}}{{break}}{{end}}{{.}}{{end}}";
        let trees = parse(src, "t", "t", "{{", "}}", known).unwrap();
        assert_eq!(trees.len(), 1);
    }

    #[test]
    fn rejects_break_outside_loop() {
        let known: &dyn Fn(&str) -> bool = &all_known;
        assert!(parse("{{break}}", "t", "t", "{{", "}}", known).is_err());
    }

    #[test]
    fn parses_template_call_with_pipe() {
        let known: &dyn Fn(&str) -> bool = &all_known;
        let src = r#"{{template "other" .}}"#;
        let trees = parse(src, "t", "t", "{{", "}}", known).unwrap();
        assert_eq!(trees.len(), 1);
    }
}

use indexmap::IndexMap;

use crate::error::Error;
use crate::funcs::FuncMap;
use crate::limit::DepthTracker;
use crate::parse::node::{CommandNode, Node, PipeNode, SequenceNode};
use crate::parse::Tree;
use crate::sink::Sink;
use crate::value::{Kind, Value, ValueAdapter};

/// Loop-control signal a body walk can return, propagated up through
/// `Sequence`/`If`/`With` until a `For` absorbs it (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    None,
    Break,
    Continue,
}

/// Resources shared across the whole `execute` call: the sibling
/// trees and merged function table (read-only), the template-call
/// depth counter, and the output sink (both mutated as execution
/// proceeds).
struct Ctx<'a, 's> {
    trees: &'a IndexMap<String, Tree>,
    funcs: &'a FuncMap,
    depth: DepthTracker,
    sink: &'s mut dyn Sink,
}

/// The part of executor state local to one template invocation: which
/// tree is executing, the current datum (`.`), and the variable
/// stack. A `{{template}}` call gets a fresh `Scope`; an
/// `if`/`for`/`with` body shares the caller's `vars` (truncated back
/// on exit) and optionally a rebound `dot`.
struct Scope<'a> {
    tree: &'a Tree,
    dot: Value,
    vars: Vec<(String, Value)>,
}

impl<'a> Scope<'a> {
    fn root(tree: &'a Tree, dot: Value) -> Self {
        Self {
            tree,
            vars: vec![("$".to_string(), dot.clone())],
            dot,
        }
    }

    fn mark(&self) -> usize {
        self.vars.len()
    }

    fn truncate(&mut self, mark: usize) {
        self.vars.truncate(mark);
    }

    fn declare(&mut self, name: &str, value: Value) {
        self.vars.push((name.to_string(), value));
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), String> {
        for (n, v) in self.vars.iter_mut().rev() {
            if n == name {
                *v = value;
                return Ok(());
            }
        }
        Err(format!("undefined variable {name:?}"))
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

fn exec_error(tree: &Tree, node: &Node, message: impl Into<String>) -> Error {
    let pos = node.pos();
    Error::exec(
        tree.parse_name.clone(),
        pos.line,
        tree.column_of(pos.byte_offset),
        tree.name.clone(),
        Error::clip_context(&node.to_string()),
        message,
    )
}

/// Walks a parsed [`Tree`] against a data value, writing rendered
/// output to a [`Sink`]. Grounded on spec.md §4.5; see DESIGN.md for
/// how its responsibilities map onto this module.
pub struct Executor<'a> {
    trees: &'a IndexMap<String, Tree>,
    funcs: &'a FuncMap,
}

impl<'a> Executor<'a> {
    pub fn new(trees: &'a IndexMap<String, Tree>, funcs: &'a FuncMap) -> Self {
        Self { trees, funcs }
    }

    /// Render template `name` against `dot` into `sink`.
    pub fn execute(&self, sink: &mut dyn Sink, name: &str, dot: Value) -> Result<(), Error> {
        let tree = self
            .trees
            .get(name)
            .ok_or_else(|| Error::internal(format!("no such template {name:?}")))?;
        let mut ctx = Ctx {
            trees: self.trees,
            funcs: self.funcs,
            depth: DepthTracker::default(),
            sink,
        };
        let mut scope = Scope::root(tree, dot);
        walk_sequence(&tree.root, &mut scope, &mut ctx)?;
        Ok(())
    }
}

fn walk_sequence(seq: &SequenceNode, scope: &mut Scope<'_>, ctx: &mut Ctx<'_, '_>) -> Result<Signal, Error> {
    for child in &seq.children {
        let signal = walk_node(child, scope, ctx)?;
        if signal != Signal::None {
            return Ok(signal);
        }
    }
    Ok(Signal::None)
}

fn walk_node(node: &Node, scope: &mut Scope<'_>, ctx: &mut Ctx<'_, '_>) -> Result<Signal, Error> {
    match node {
        Node::Text(t) => {
            ctx.sink.write_chunk(t.text.as_bytes())?;
            Ok(Signal::None)
        }
        Node::Action(a) => {
            let result = eval_pipe(&a.pipe, scope, ctx)?;
            if !a.pipe.is_declaration {
                ctx.sink.write_chunk(result.render().as_bytes())?;
            }
            Ok(Signal::None)
        }
        Node::Sequence(s) => walk_sequence(s, scope, ctx),
        Node::If(n) => {
            let cond = eval_pipe(&n.pipe, scope, ctx)?;
            let mark = scope.mark();
            let result = if cond.truthy() {
                walk_sequence(&n.body, scope, ctx)
            } else if let Some(else_body) = &n.else_body {
                walk_sequence(else_body, scope, ctx)
            } else {
                Ok(Signal::None)
            };
            scope.truncate(mark);
            result
        }
        Node::With(n) => {
            let value = eval_pipe(&n.pipe, scope, ctx)?;
            let mark = scope.mark();
            let result = if value.truthy() {
                let saved_dot = std::mem::replace(&mut scope.dot, value);
                let r = walk_sequence(&n.body, scope, ctx);
                scope.dot = saved_dot;
                r
            } else if let Some(else_body) = &n.else_body {
                walk_sequence(else_body, scope, ctx)
            } else {
                Ok(Signal::None)
            };
            scope.truncate(mark);
            result
        }
        Node::For(n) => walk_for(n, node, scope, ctx),
        Node::Break(_) => Ok(Signal::Break),
        Node::Continue(_) => Ok(Signal::Continue),
        Node::Template(n) => {
            ctx.depth.enter();
            if ctx.depth.limited() {
                ctx.depth.exit();
                return Err(exec_error(scope.tree, node, "exceeded maximum template depth"));
            }
            let invoked = ctx
                .trees
                .get(&n.invoked_name)
                .ok_or_else(|| exec_error(scope.tree, node, format!("template {:?} not defined", n.invoked_name)))?;
            let invoked_dot = match &n.pipe {
                Some(pipe) => eval_pipe(pipe, scope, ctx)?,
                None => scope.dot.clone(),
            };
            let mut sub_scope = Scope::root(invoked, invoked_dot);
            let result = walk_sequence(&invoked.root, &mut sub_scope, ctx);
            ctx.depth.exit();
            result?;
            Ok(Signal::None)
        }
        Node::End(_) | Node::Else(_) => Err(exec_error(scope.tree, node, "internal error: parse-only node reached executor")),
        _ => Err(exec_error(scope.tree, node, "internal error: value node in statement position")),
    }
}

fn walk_for(n: &crate::parse::node::ForNode, node: &Node, scope: &mut Scope<'_>, ctx: &mut Ctx<'_, '_>) -> Result<Signal, Error> {
    let value = eval_pipe(&n.pipe, scope, ctx)?;

    let items = if value.is_null() { Some(Vec::new()) } else { value.iterate() };
    let items = match items {
        Some(items) => items,
        None => return Err(exec_error(scope.tree, node, "range over non-iterable value")),
    };

    if items.is_empty() {
        return match &n.else_body {
            Some(else_body) => walk_sequence(else_body, scope, ctx),
            None => Ok(Signal::None),
        };
    }

    let single_decl = (n.pipe.is_declaration && n.pipe.decl.len() == 1).then(|| n.pipe.decl[0].head().to_string());

    for item in items {
        let mark = scope.mark();
        if let Some(name) = &single_decl {
            scope.declare(name, item.clone());
        }
        let saved_dot = std::mem::replace(&mut scope.dot, item);
        let signal = walk_sequence(&n.body, scope, ctx);
        scope.dot = saved_dot;
        scope.truncate(mark);
        match signal? {
            Signal::Break => break,
            Signal::Continue | Signal::None => {}
        }
    }
    Ok(Signal::None)
}

fn eval_pipe(pipe: &PipeNode, scope: &mut Scope<'_>, ctx: &mut Ctx<'_, '_>) -> Result<Value, Error> {
    let mut result = None;
    for cmd in &pipe.cmds {
        result = Some(eval_command(cmd, result.as_ref(), scope, ctx)?);
    }
    let result = result.ok_or_else(|| Error::internal("empty pipeline"))?;

    if !pipe.decl.is_empty() {
        let name = pipe.decl[0].head();
        if pipe.is_declaration {
            scope.declare(name, result.clone());
        } else {
            scope
                .assign(name, result.clone())
                .map_err(|msg| exec_error(scope.tree, &Node::Pipe(pipe.clone()), msg))?;
        }
    }
    Ok(result)
}

fn eval_command(cmd: &CommandNode, final_value: Option<&Value>, scope: &mut Scope<'_>, ctx: &mut Ctx<'_, '_>) -> Result<Value, Error> {
    let head = &cmd.args[0];

    if let Node::Identifier(id) = head {
        if id.name == "and" || id.name == "or" {
            return eval_short_circuit(&id.name, cmd, final_value, scope, ctx, head);
        }

        let mut call_args = Vec::with_capacity(cmd.args.len() + 1);
        for arg in &cmd.args[1..] {
            call_args.push(eval_value(arg, scope, ctx)?);
        }
        if let Some(fv) = final_value {
            call_args.push(fv.clone());
        }
        return call_function(ctx, scope.tree, &id.name, &call_args, head);
    }

    if matches!(head, Node::Null(_)) {
        return Err(exec_error(scope.tree, head, "null is not a command"));
    }

    let value = eval_value(head, scope, ctx)?;

    if cmd.args.len() > 1 || final_value.is_some() {
        return Err(exec_error(scope.tree, head, "can't give argument to non-function"));
    }

    Ok(value)
}

/// `and`/`or` get a dedicated evaluation path rather than routing
/// through [`call_function`] like every other identifier command: the
/// generic path evaluates every operand up front, which would defeat
/// the short-circuit contract spec.md §4.4 requires (a later operand
/// that would itself error, e.g. a deep missing-field chain or a
/// depth-exceeding template call, must never be reached once the
/// result is already decided). Operands are evaluated one at a time,
/// stopping as soon as the short-circuit condition is met; only the
/// final operand is evaluated unconditionally, matching "the first
/// falsy/truthy argument, else the last".
fn eval_short_circuit(
    name: &str,
    cmd: &CommandNode,
    final_value: Option<&Value>,
    scope: &mut Scope<'_>,
    ctx: &mut Ctx<'_, '_>,
    head: &Node,
) -> Result<Value, Error> {
    let stop_on_truthy = name == "or";
    let arg_nodes = &cmd.args[1..];
    let total = arg_nodes.len() + final_value.is_some() as usize;
    if total < 2 {
        let arity = crate::funcs::Arity::Variadic { min: 2 };
        return Err(exec_error(
            scope.tree,
            head,
            format!("wrong number of args for {name:?}: got {total}, want {arity}"),
        ));
    }

    let mut last = None;
    for (i, arg) in arg_nodes.iter().enumerate() {
        let value = eval_value(arg, scope, ctx)?;
        let is_overall_last = final_value.is_none() && i == arg_nodes.len() - 1;
        if !is_overall_last && value.truthy() == stop_on_truthy {
            return Ok(value);
        }
        last = Some(value);
    }
    if let Some(fv) = final_value {
        last = Some(fv.clone());
    }
    Ok(last.expect("total >= 2 guarantees at least one operand was evaluated"))
}

fn call_function(ctx: &Ctx<'_, '_>, tree: &Tree, name: &str, args: &[Value], node: &Node) -> Result<Value, Error> {
    let descriptor = ctx.funcs.resolve(name, args.len()).map_err(|msg| exec_error(tree, node, msg))?;
    descriptor.call(args).map_err(|msg| exec_error(tree, node, msg))
}

/// Evaluate a node that appears in value position: a pipeline
/// operand, a chain's inner term, or a command's non-callable
/// trailing argument.
fn eval_value(node: &Node, scope: &mut Scope<'_>, ctx: &mut Ctx<'_, '_>) -> Result<Value, Error> {
    match node {
        Node::Dot(_) => Ok(scope.dot.clone()),
        Node::Null(_) => Ok(Value::Null),
        Node::Bool(b) => Ok(Value::Bool(b.value)),
        Node::Number(n) => Ok(number_value(n)),
        Node::String(s) => Ok(Value::String(s.value.clone())),
        Node::Field(f) => resolve_chain(scope.dot.clone(), &f.idents, node, scope.tree),
        Node::Variable(v) => {
            let base = scope
                .lookup(v.head())
                .cloned()
                .ok_or_else(|| exec_error(scope.tree, node, format!("undefined variable {:?}", v.head())))?;
            if v.idents.len() > 1 {
                resolve_chain(base, &v.idents[1..], node, scope.tree)
            } else {
                Ok(base)
            }
        }
        Node::Chain(c) => {
            let base = eval_value(&c.node, scope, ctx)?;
            resolve_chain(base, &c.idents, node, scope.tree)
        }
        Node::Pipe(p) => eval_pipe(p, scope, ctx),
        Node::Identifier(id) => call_function(ctx, scope.tree, &id.name, &[], node),
        _ => Err(exec_error(scope.tree, node, "internal error: statement node in value position")),
    }
}

fn number_value(n: &crate::parse::node::NumberNode) -> Value {
    if n.prefers_float() {
        n.float_value
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .or_else(|| n.int_value.map(Value::from))
            .unwrap_or(Value::Null)
    } else {
        n.int_value
            .map(Value::from)
            .or_else(|| n.float_value.and_then(serde_json::Number::from_f64).map(Value::Number))
            .unwrap_or(Value::Null)
    }
}

/// Field-chain resolution (spec.md §4.5) restricted to the steps that
/// apply under a `serde_json::Value` adapter: array `.length`
/// shorthand and mapping key lookup. Steps 3-5 (host readable
/// property / method / public field) have no counterpart for JSON
/// values, which carry nothing beyond their keys.
fn resolve_chain(mut receiver: Value, idents: &[String], node: &Node, tree: &Tree) -> Result<Value, Error> {
    for name in idents {
        receiver = resolve_step(receiver, name, node, tree)?;
    }
    Ok(receiver)
}

fn resolve_step(receiver: Value, name: &str, node: &Node, tree: &Tree) -> Result<Value, Error> {
    if receiver.is_null() {
        return Err(exec_error(tree, node, format!("nil pointer evaluating null.{name}")));
    }
    if let Some(len) = receiver.array_length(name) {
        return Ok(Value::from(len as i64));
    }
    // A mapping with no such key yields null, matching the map-indexing
    // semantics spec.md §1 invokes by name: a missing map key is nil,
    // not an error. Only a non-mapping receiver with no such step is a
    // genuine "not a field" error.
    if receiver.classify() == Kind::Mapping {
        return Ok(receiver.get_key(name).unwrap_or(Value::Null));
    }
    Err(exec_error(tree, node, format!("{name} is not a field of {}", receiver.render())))
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_json::json;

    use super::*;
    use crate::builtins::BUILTINS;
    use crate::parse;

    fn trees_of(src: &str) -> IndexMap<String, Tree> {
        let known: &dyn Fn(&str) -> bool = &|_| true;
        let parsed = parse::parse(src, "t", "t", "{{", "}}", known).unwrap();
        parsed.into_iter().map(|t| (t.name.clone(), t)).collect()
    }

    fn render(src: &str, dot: Value) -> Result<String, Error> {
        let trees = trees_of(src);
        let mut out = String::new();
        Executor::new(&trees, &BUILTINS).execute(&mut out, "t", dot)?;
        Ok(out)
    }

    #[test]
    fn renders_plain_text() {
        assert_eq!(render("hello, world", Value::Null).unwrap(), "hello, world");
    }

    #[test]
    fn renders_dot_and_field_access() {
        let dot = json!({"name": "Ada"});
        assert_eq!(render("hi {{.name}}", dot).unwrap(), "hi Ada");
    }

    #[test]
    fn if_else_picks_the_truthy_branch() {
        assert_eq!(render("{{if .ok}}yes{{else}}no{{end}}", json!({"ok": true})).unwrap(), "yes");
        assert_eq!(render("{{if .ok}}yes{{else}}no{{end}}", json!({"ok": false})).unwrap(), "no");
    }

    #[test]
    fn else_if_chain_falls_through_to_final_branch() {
        let src = "{{if .a}}A{{else if .b}}B{{else}}C{{end}}";
        assert_eq!(render(src, json!({"a": false, "b": true})).unwrap(), "B");
        assert_eq!(render(src, json!({"a": false, "b": false})).unwrap(), "C");
    }

    #[test]
    fn for_loop_iterates_and_rebinds_dot() {
        let src = "{{for .items}}({{.}}){{end}}";
        assert_eq!(render(src, json!({"items": [1, 2, 3]})).unwrap(), "(1)(2)(3)");
    }

    #[test]
    fn for_loop_break_stops_iteration() {
        let src = "{{for .items}}{{if eq . 2}}{{break}}{{end}}{{.}}{{end}}";
        assert_eq!(render(src, json!({"items": [1, 2, 3]})).unwrap(), "1");
    }

    #[test]
    fn for_loop_continue_skips_one_iteration() {
        let src = "{{for .items}}{{if eq . 2}}{{continue}}{{end}}{{.}}{{end}}";
        assert_eq!(render(src, json!({"items": [1, 2, 3]})).unwrap(), "13");
    }

    #[test]
    fn for_loop_else_runs_on_empty_collection() {
        let src = "{{for .items}}x{{else}}empty{{end}}";
        assert_eq!(render(src, json!({"items": []})).unwrap(), "empty");
    }

    #[test]
    fn with_rebinds_dot_inside_body_only() {
        let src = "{{with .user}}{{.name}}{{end}}|{{.name}}";
        let dot = json!({"name": "outer", "user": {"name": "inner"}});
        assert_eq!(render(src, dot).unwrap(), "inner|outer");
    }

    #[test]
    fn variable_declaration_does_not_leak_past_end() {
        let src = "{{if true}}{{$x := 1}}{{end}}{{$x}}";
        assert!(render(src, Value::Null).is_err());
    }

    #[test]
    fn variable_assignment_updates_outer_declaration() {
        let src = "{{$x := 1}}{{if true}}{{$x = 2}}{{end}}{{$x}}";
        assert_eq!(render(src, Value::Null).unwrap(), "2");
    }

    #[test]
    fn template_call_invokes_a_sibling_definition() {
        let src = r#"{{define "greet"}}hi {{.}}{{end}}before-{{template "greet" .name}}"#;
        assert_eq!(render(src, json!({"name": "Ada"})).unwrap(), "before-hi Ada");
    }

    #[test]
    fn template_call_depth_limit_is_enforced() {
        let src = r#"{{define "loop"}}{{template "loop" .}}{{end}}{{template "loop" .}}"#;
        let err = render(src, Value::Null).unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn array_length_shorthand_resolves_through_chain() {
        let dot = json!({"items": [1, 2, 3]});
        assert_eq!(render("{{.items.length}}", dot).unwrap(), "3");
    }

    #[test]
    fn missing_key_on_mapping_resolves_to_null() {
        assert_eq!(render("{{.missing}}", json!({})).unwrap(), "");
        assert_eq!(
            render(r#"{{.missing | default "fallback"}}"#, json!({})).unwrap(),
            "fallback"
        );
    }

    #[test]
    fn field_step_on_a_non_mapping_receiver_is_an_error() {
        let err = render("{{.n.x}}", json!({"n": 5})).unwrap_err();
        assert!(err.to_string().contains("is not a field"));
    }

    #[test]
    fn nil_pointer_chain_access_is_an_error() {
        let err = render("{{.a.b}}", json!({"a": null})).unwrap_err();
        assert!(err.to_string().contains("nil pointer"));
    }

    #[test]
    fn pipeline_folds_each_stage_into_the_next() {
        let dot = json!({"n": 2});
        assert_eq!(render("{{.n | add 1 | mul 10}}", dot).unwrap(), "30");
    }

    #[test]
    fn number_literal_prefers_int_view_without_decimal_point() {
        assert_eq!(render("{{3}}", Value::Null).unwrap(), "3");
        assert_eq!(render("{{3.5}}", Value::Null).unwrap(), "3.5");
    }

    #[test]
    fn and_short_circuits_past_an_operand_that_would_error() {
        // .n.x errors for a non-mapping receiver; it must never be
        // evaluated once `and` has already settled on a falsy operand.
        let dot = json!({"n": 5});
        assert_eq!(render("{{and false .n.x}}", dot).unwrap(), "false");
    }

    #[test]
    fn or_short_circuits_past_an_operand_that_would_error() {
        let dot = json!({"n": 5});
        assert_eq!(render("{{or true .n.x}}", dot).unwrap(), "true");
    }

    #[test]
    fn and_or_still_evaluate_the_final_operand_unconditionally() {
        assert_eq!(render("{{and true false}}", Value::Null).unwrap(), "false");
        assert_eq!(render("{{or false true}}", Value::Null).unwrap(), "true");
        let err = render("{{and true .n.x}}", json!({"n": 5})).unwrap_err();
        assert!(err.to_string().contains("is not a field"));
    }

    #[test]
    fn and_or_reject_fewer_than_two_arguments() {
        let err = render("{{and true}}", Value::Null).unwrap_err();
        assert!(err.to_string().contains("wrong number of args"));
    }
}

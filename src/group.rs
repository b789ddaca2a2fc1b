//! The shared mutable state a family of mutually-invoking templates
//! sits on top of: every tree reachable by `{{template "name"}}`, plus
//! the user-registered function overloads layered on top of the
//! built-in table. `Template` handles clone-share one `Arc<Group>`.

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::builtins::BUILTINS;
use crate::funcs::FuncMap;
use crate::parse::Tree;

/// Trees-by-name plus the user function registry, guarded by a
/// read/write lock: parsing and executing both only need read access
/// to the function table, `add_functions` is the sole writer. Grounded
/// in the pack's `parking_lot`-guarded shared-registry idiom (the
/// teacher's own GraphQL parser has no such shared mutable state, so
/// this is imported wholesale from elsewhere in the retrieval pack;
/// see DESIGN.md).
pub(crate) struct Group {
    trees: RwLock<IndexMap<String, Tree>>,
    user_funcs: RwLock<FuncMap>,
}

impl Group {
    pub(crate) fn new() -> Self {
        Self {
            trees: RwLock::new(IndexMap::new()),
            user_funcs: RwLock::new(FuncMap::new()),
        }
    }

    /// Install `tree` under its own name, applying spec.md §3's
    /// non-empty-wins rule: a later empty `{{define}}` body never
    /// replaces a prior non-empty tree of the same name.
    pub(crate) fn insert(&self, tree: Tree) {
        let mut trees = self.trees.write();
        if tree.is_empty() {
            if trees.contains_key(&tree.name) {
                return;
            }
        }
        trees.insert(tree.name.clone(), tree);
    }

    pub(crate) fn is_known_func(&self, name: &str) -> bool {
        BUILTINS.contains(name) || self.user_funcs.read().contains(name)
    }

    pub(crate) fn add_functions(&self, funcs: FuncMap) {
        self.user_funcs.write().merge(&funcs);
    }

    /// A merged, point-in-time function table: the user-registered
    /// overloads first, built-ins merged in after, so that
    /// `FuncMap::resolve`'s first-arity-match search prefers a
    /// user-registered function over a built-in of the same name and
    /// arity, per spec.md §4.3. Cloned out rather than held across a
    /// call so the executor never runs while holding the group's lock.
    pub(crate) fn func_table(&self) -> FuncMap {
        let mut merged = self.user_funcs.read().clone();
        merged.merge(&BUILTINS);
        merged
    }

    pub(crate) fn get(&self, name: &str) -> Option<Tree> {
        self.trees.read().get(name).cloned()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.trees.read().contains_key(name)
    }

    pub(crate) fn snapshot(&self) -> IndexMap<String, Tree> {
        self.trees.read().clone()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.trees.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::node::SequenceNode;

    fn tree(name: &str, children: Vec<crate::parse::Node>) -> Tree {
        Tree::new(
            name.to_string(),
            "t".to_string(),
            SequenceNode {
                pos: crate::parse::node::Pos::new(0, 1),
                children,
            },
            String::new(),
        )
    }

    fn text(s: &str) -> crate::parse::Node {
        crate::parse::Node::Text(crate::parse::node::TextNode {
            pos: crate::parse::node::Pos::new(0, 1),
            text: s.to_string(),
        })
    }

    #[test]
    fn later_empty_definition_does_not_replace_non_empty_one() {
        let group = Group::new();
        group.insert(tree("x", vec![text("hello")]));
        group.insert(tree("x", vec![]));
        assert_eq!(group.get("x").unwrap().root.children.len(), 1);
    }

    #[test]
    fn a_non_empty_definition_replaces_a_prior_empty_one() {
        let group = Group::new();
        group.insert(tree("x", vec![]));
        group.insert(tree("x", vec![text("hello")]));
        assert_eq!(group.get("x").unwrap().root.children.len(), 1);
    }

    #[test]
    fn add_functions_is_visible_through_func_table() {
        let group = Group::new();
        let mut extra = FuncMap::new();
        extra.register(crate::funcs::FuncDescriptor::new(
            "shout",
            crate::funcs::Arity::Fixed(1),
            |args| Ok(args[0].clone()),
        ));
        group.add_functions(extra);
        assert!(group.is_known_func("shout"));
        assert!(group.func_table().contains("shout"));
    }

    #[test]
    fn user_registered_function_shadows_a_builtin_of_the_same_name_and_arity() {
        use serde_json::json;

        let group = Group::new();
        let mut extra = FuncMap::new();
        extra.register(crate::funcs::FuncDescriptor::new(
            "not",
            crate::funcs::Arity::Fixed(1),
            |_args| Ok(json!("overridden")),
        ));
        group.add_functions(extra);
        let table = group.func_table();
        let descriptor = table.resolve("not", 1).unwrap();
        assert_eq!(descriptor.call(&[json!(true)]).unwrap(), json!("overridden"));
    }
}

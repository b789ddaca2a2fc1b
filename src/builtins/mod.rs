//! The fixed built-in function library (spec.md §4.4): arithmetic,
//! comparison, logic, formatting, indexing, sequence generation,
//! defaulting, URL encoding. One submodule per family, the way the
//! teacher groups related grammar productions into their own files.

mod arith;
mod compare;
mod default;
mod encode;
mod format;
mod logic;
mod seq;

use once_cell::sync::Lazy;

use crate::funcs::{Arity, FuncDescriptor, FuncMap};

/// The built-in table, initialised once and immutable thereafter
/// (spec.md §9: "the built-in function table is initialised once;
/// treat as a process-wide immutable after initialisation").
pub(crate) static BUILTINS: Lazy<FuncMap> = Lazy::new(build_table);

fn build_table() -> FuncMap {
    let mut map = FuncMap::new();

    map.register(FuncDescriptor::new("add", Arity::Fixed(2), arith::add));
    map.register(FuncDescriptor::new("sub", Arity::Fixed(2), arith::sub));
    map.register(FuncDescriptor::new("mul", Arity::Fixed(2), arith::mul));
    map.register(FuncDescriptor::new("div", Arity::Fixed(2), arith::div));
    map.register(FuncDescriptor::new("mod", Arity::Fixed(2), arith::modulo));

    map.register(FuncDescriptor::new("eq", Arity::Variadic { min: 2 }, compare::eq));
    map.register(FuncDescriptor::new("ne", Arity::Fixed(2), compare::ne));
    map.register(FuncDescriptor::new("lt", Arity::Fixed(2), compare::lt));
    map.register(FuncDescriptor::new("le", Arity::Fixed(2), compare::le));
    map.register(FuncDescriptor::new("gt", Arity::Fixed(2), compare::gt));
    map.register(FuncDescriptor::new("ge", Arity::Fixed(2), compare::ge));

    map.register(FuncDescriptor::new("not", Arity::Fixed(1), logic::not));
    map.register(FuncDescriptor::new("and", Arity::Variadic { min: 2 }, logic::and));
    map.register(FuncDescriptor::new("or", Arity::Variadic { min: 2 }, logic::or));

    map.register(FuncDescriptor::new("print", Arity::Variadic { min: 0 }, format::print));
    map.register(FuncDescriptor::new("println", Arity::Variadic { min: 0 }, format::println_));
    map.register(FuncDescriptor::new("printf", Arity::Variadic { min: 1 }, format::printf));

    map.register(FuncDescriptor::new("range", Arity::Fixed(1), seq::range_1));
    map.register(FuncDescriptor::new("range", Arity::Fixed(2), seq::range_2));
    map.register(FuncDescriptor::new("range", Arity::Fixed(3), seq::range_3));
    map.register(FuncDescriptor::new("index", Arity::Variadic { min: 2 }, seq::index));

    map.register(FuncDescriptor::new("urlencode", Arity::Fixed(1), encode::urlencode));
    map.register(FuncDescriptor::new("default", Arity::Fixed(2), default::default));

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_resolves_every_documented_builtin() {
        let names = [
            "add", "sub", "mul", "div", "mod", "eq", "ne", "lt", "le", "gt", "ge", "not", "and", "or", "print",
            "println", "printf", "range", "index", "urlencode", "default",
        ];
        for name in names {
            assert!(BUILTINS.contains(name), "missing builtin {name}");
        }
    }

    #[test]
    fn range_has_three_overloads() {
        assert!(BUILTINS.resolve("range", 1).is_ok());
        assert!(BUILTINS.resolve("range", 2).is_ok());
        assert!(BUILTINS.resolve("range", 3).is_ok());
        assert!(BUILTINS.resolve("range", 4).is_err());
    }

    #[test]
    fn add_is_callable_through_the_table() {
        let d = BUILTINS.resolve("add", 2).unwrap();
        assert_eq!(d.call(&[json!(2), json!(3)]).unwrap(), json!(5));
    }
}

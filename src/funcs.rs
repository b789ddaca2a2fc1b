use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// How many arguments a function descriptor accepts. Built-ins and
/// user functions alike declare one of these, letting the executor
/// reject a call with the wrong argument count before ever invoking
/// the callable (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments.
    Fixed(usize),
    /// At least `min` arguments, any number more — `print`/`println`/`printf`.
    Variadic { min: usize },
}

impl Arity {
    pub fn accepts(&self, argc: usize) -> bool {
        match *self {
            Arity::Fixed(n) => argc == n,
            Arity::Variadic { min } => argc >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arity::Fixed(n) => write!(f, "{n} argument{}", if n == 1 { "" } else { "s" }),
            Arity::Variadic { min } => write!(f, "at least {min} argument{}", if min == 1 { "" } else { "s" }),
        }
    }
}

type Callable = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// One entry in a function's overload set: a name, the shape of
/// argument list it accepts, and the callable itself.
#[derive(Clone)]
pub struct FuncDescriptor {
    name: String,
    arity: Arity,
    callable: Arc<Callable>,
}

impl FuncDescriptor {
    pub fn new(
        name: impl Into<String>,
        arity: Arity,
        callable: impl Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            callable: Arc::new(callable),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.callable)(args)
    }
}

impl fmt::Debug for FuncDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncDescriptor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A name-to-overload-set function registry (spec.md §4.3). Functions
/// are resolved by name then by the first descriptor whose [`Arity`]
/// accepts the call site's argument count — there is no type-based
/// overload resolution, only arity-based.
#[derive(Debug, Clone, Default)]
pub struct FuncMap {
    overloads: IndexMap<String, Vec<FuncDescriptor>>,
}

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor to its name's overload set, preserving
    /// insertion order so an earlier registration wins ties.
    pub fn register(&mut self, descriptor: FuncDescriptor) {
        self.overloads
            .entry(descriptor.name().to_string())
            .or_default()
            .push(descriptor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.overloads.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.overloads.keys().map(|s| s.as_str())
    }

    /// Find the overload of `name` whose arity accepts `argc`
    /// arguments. Errors distinguish "no such function" from "wrong
    /// number of arguments" so the caller can produce a precise
    /// message.
    pub fn resolve(&self, name: &str, argc: usize) -> Result<&FuncDescriptor, String> {
        let overloads = self
            .overloads
            .get(name)
            .ok_or_else(|| format!("function {name:?} not defined"))?;
        overloads
            .iter()
            .find(|d| d.arity().accepts(argc))
            .ok_or_else(|| {
                let wants: Vec<String> = overloads.iter().map(|d| d.arity().to_string()).collect();
                format!("wrong number of args for {name:?}: got {argc}, want {}", wants.join(" or "))
            })
    }

    pub fn merge(&mut self, other: &FuncMap) {
        for (name, descriptors) in &other.overloads {
            for d in descriptors {
                self.overloads.entry(name.clone()).or_default().push(d.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_arity() {
        let mut map = FuncMap::new();
        map.register(FuncDescriptor::new("double", Arity::Fixed(1), |args| {
            Ok(args[0].clone())
        }));
        assert!(map.resolve("double", 1).is_ok());
        assert!(map.resolve("double", 2).is_err());
        assert!(map.resolve("missing", 1).is_err());
    }

    #[test]
    fn variadic_accepts_minimum_and_more() {
        let arity = Arity::Variadic { min: 1 };
        assert!(!arity.accepts(0));
        assert!(arity.accepts(1));
        assert!(arity.accepts(5));
    }

    #[test]
    fn merge_adds_overloads_without_clobbering() {
        let mut base = FuncMap::new();
        base.register(FuncDescriptor::new("f", Arity::Fixed(1), |args| Ok(args[0].clone())));
        let mut extra = FuncMap::new();
        extra.register(FuncDescriptor::new("f", Arity::Fixed(2), |_| Ok(Value::Null)));
        base.merge(&extra);
        assert!(base.resolve("f", 1).is_ok());
        assert!(base.resolve("f", 2).is_ok());
    }
}

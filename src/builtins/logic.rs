use crate::value::{Value, ValueAdapter};

/// `not(v)`: logical negation using the truthiness rule.
pub(crate) fn not(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Bool(!args[0].truthy()))
}

/// `and(a, b…)`: the first falsy argument, else the last.
///
/// The executor special-cases `and`/`or` as command heads (src/exec.rs)
/// to get true short-circuit evaluation, so this descriptor only runs
/// on an already-evaluated slice when reached some other way (a bare
/// reference with too few operands to short-circuit, caught by arity
/// checking before it gets here). It stays registered in `BUILTINS` so
/// `and`/`or` still resolve as known functions at parse time.
pub(crate) fn and(args: &[Value]) -> Result<Value, String> {
    for a in &args[..args.len() - 1] {
        if !a.truthy() {
            return Ok(a.clone());
        }
    }
    Ok(args[args.len() - 1].clone())
}

/// `or(a, b…)`: the first truthy argument, else the last.
pub(crate) fn or(args: &[Value]) -> Result<Value, String> {
    for a in &args[..args.len() - 1] {
        if a.truthy() {
            return Ok(a.clone());
        }
    }
    Ok(args[args.len() - 1].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_negates_truthiness() {
        assert_eq!(not(&[json!(0)]).unwrap(), json!(true));
        assert_eq!(not(&[json!(1)]).unwrap(), json!(false));
    }

    #[test]
    fn and_returns_first_falsy_else_last() {
        assert_eq!(and(&[json!(1), json!(0), json!(2)]).unwrap(), json!(0));
        assert_eq!(and(&[json!(1), json!(2)]).unwrap(), json!(2));
    }

    #[test]
    fn or_returns_first_truthy_else_last() {
        assert_eq!(or(&[json!(0), json!(2), json!(3)]).unwrap(), json!(2));
        assert_eq!(or(&[json!(0), json!(false)]).unwrap(), json!(false));
    }
}

use crate::value::Value;

/// `add`/`sub`/`mul`/`div`/`mod(a, b)`: numeric dispatch on the widest
/// common numeric kind. Integer arithmetic is tried first and widens
/// to floating-point on overflow — the "integer, wide integer,
/// floating" ladder spec.md §4.4 describes, collapsed to `i64`/`f64`
/// since `serde_json::Number` itself only distinguishes those two.
pub(crate) fn add(args: &[Value]) -> Result<Value, String> {
    let (a, b) = (&args[0], &args[1]);
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Ok(Value::String(format!("{x}{y}")));
    }
    numeric_op(a, b, |x, y| x + y, i64::checked_add)
}

pub(crate) fn sub(args: &[Value]) -> Result<Value, String> {
    numeric_op(&args[0], &args[1], |x, y| x - y, i64::checked_sub)
}

pub(crate) fn mul(args: &[Value]) -> Result<Value, String> {
    numeric_op(&args[0], &args[1], |x, y| x * y, i64::checked_mul)
}

pub(crate) fn div(args: &[Value]) -> Result<Value, String> {
    let (a, b) = (&args[0], &args[1]);
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if y == 0 {
            return Err("division by zero".to_string());
        }
        return Ok(Value::from(x / y));
    }
    let x = as_f64(a)?;
    let y = as_f64(b)?;
    if y == 0.0 {
        return Err("division by zero".to_string());
    }
    Ok(number(x / y))
}

pub(crate) fn modulo(args: &[Value]) -> Result<Value, String> {
    let (a, b) = (&args[0], &args[1]);
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if y == 0 {
            return Err("division by zero".to_string());
        }
        return Ok(Value::from(x % y));
    }
    let x = as_f64(a)?;
    let y = as_f64(b)?;
    if y == 0.0 {
        return Err("division by zero".to_string());
    }
    Ok(number(x % y))
}

fn numeric_op(
    a: &Value,
    b: &Value,
    f_op: impl Fn(f64, f64) -> f64,
    i_op: impl Fn(i64, i64) -> Option<i64>,
) -> Result<Value, String> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(r) = i_op(x, y) {
            return Ok(Value::from(r));
        }
    }
    let x = as_f64(a)?;
    let y = as_f64(b)?;
    Ok(number(f_op(x, y)))
}

fn as_f64(v: &Value) -> Result<f64, String> {
    v.as_f64().ok_or_else(|| format!("not a number: {v}"))
}

fn number(f: f64) -> Value {
    serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adds_integers() {
        assert_eq!(add(&[json!(2), json!(3)]).unwrap(), json!(5));
    }

    #[test]
    fn add_concatenates_strings() {
        assert_eq!(add(&[json!("a"), json!("b")]).unwrap(), json!("ab"));
    }

    #[test]
    fn div_by_zero_errors() {
        assert!(div(&[json!(1), json!(0)]).is_err());
    }

    #[test]
    fn modulo_integers() {
        assert_eq!(modulo(&[json!(7), json!(3)]).unwrap(), json!(1));
    }

    #[test]
    fn float_division() {
        assert_eq!(div(&[json!(1.0), json!(4.0)]).unwrap(), json!(0.25));
    }
}

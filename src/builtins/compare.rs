use crate::value::Value;

/// `eq(a, b1, …, bn)`: true if `a` equals any `bi`. Character
/// constants are already numeric by execution time (the parser folds
/// `'x'` into a `Number` node), so equality is plain structural
/// `Value` equality — no separate character kind to special-case.
pub(crate) fn eq(args: &[Value]) -> Result<Value, String> {
    let a = &args[0];
    Ok(Value::Bool(args[1..].iter().any(|b| a == b)))
}

pub(crate) fn ne(args: &[Value]) -> Result<Value, String> {
    let result = eq(args)?;
    Ok(Value::Bool(!result.as_bool().unwrap_or(false)))
}

pub(crate) fn lt(args: &[Value]) -> Result<Value, String> {
    numeric_cmp(args, |o| o == std::cmp::Ordering::Less)
}

pub(crate) fn le(args: &[Value]) -> Result<Value, String> {
    numeric_cmp(args, |o| o != std::cmp::Ordering::Greater)
}

pub(crate) fn gt(args: &[Value]) -> Result<Value, String> {
    numeric_cmp(args, |o| o == std::cmp::Ordering::Greater)
}

pub(crate) fn ge(args: &[Value]) -> Result<Value, String> {
    numeric_cmp(args, |o| o != std::cmp::Ordering::Less)
}

fn numeric_cmp(args: &[Value], accept: impl Fn(std::cmp::Ordering) -> bool) -> Result<Value, String> {
    let a = args[0]
        .as_f64()
        .ok_or_else(|| format!("not comparable: {}", args[0]))?;
    let b = args[1]
        .as_f64()
        .ok_or_else(|| format!("not comparable: {}", args[1]))?;
    let ordering = a.partial_cmp(&b).ok_or_else(|| "not comparable: NaN".to_string())?;
    Ok(Value::Bool(accept(ordering)))
}

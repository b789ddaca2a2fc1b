use crate::value::{Value, ValueAdapter};

fn build_range(start: i64, stop: i64, step: i64) -> Result<Value, String> {
    if step == 0 {
        return Err("range: step cannot be zero".to_string());
    }
    let mut out = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < stop {
            out.push(Value::from(i));
            i += step;
        }
    } else {
        while i > stop {
            out.push(Value::from(i));
            i += step;
        }
    }
    Ok(Value::Array(out))
}

/// `range(stop)`: `0..stop`, step `+1` if `stop > 0` else `-1` (so the
/// sequence can't progress, which yields empty rather than looping).
pub(crate) fn range_1(args: &[Value]) -> Result<Value, String> {
    let stop = args[0].as_i64().ok_or("range: stop must be an integer")?;
    let step = if 0 < stop { 1 } else { -1 };
    build_range(0, stop, step)
}

/// `range(start, stop)`: step defaults to `+1` when `start < stop`,
/// `-1` otherwise.
pub(crate) fn range_2(args: &[Value]) -> Result<Value, String> {
    let start = args[0].as_i64().ok_or("range: start must be an integer")?;
    let stop = args[1].as_i64().ok_or("range: stop must be an integer")?;
    let step = if start < stop { 1 } else { -1 };
    build_range(start, stop, step)
}

/// `range(start, stop, step)`: step `0` is an error.
pub(crate) fn range_3(args: &[Value]) -> Result<Value, String> {
    let start = args[0].as_i64().ok_or("range: start must be an integer")?;
    let stop = args[1].as_i64().ok_or("range: stop must be an integer")?;
    let step = args[2].as_i64().ok_or("range: step must be an integer")?;
    build_range(start, stop, step)
}

/// `index(container, k1, k2, …)`: successive lookup — array-like
/// containers by integer, mapping-like containers by key.
pub(crate) fn index(args: &[Value]) -> Result<Value, String> {
    let mut cur = args[0].clone();
    for k in &args[1..] {
        cur = match &cur {
            Value::Array(_) => {
                let i = k.as_i64().ok_or("index: array index must be an integer")?;
                cur.index_by(i).ok_or_else(|| format!("index out of range: {i}"))?
            }
            Value::Object(_) => {
                let key = k.as_str().map(str::to_string).unwrap_or_else(|| k.render());
                cur.get_key(&key).ok_or_else(|| format!("no such key: {key:?}"))?
            }
            other => return Err(format!("cannot index into {other}")),
        };
    }
    Ok(cur)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn range_one_arg_counts_up() {
        assert_eq!(range_1(&[json!(3)]).unwrap(), json!([0, 1, 2]));
    }

    #[test]
    fn range_descending_without_explicit_step() {
        assert_eq!(range_2(&[json!(3), json!(0)]).unwrap(), json!([3, 2, 1]));
    }

    #[test]
    fn range_zero_step_errors() {
        assert!(range_3(&[json!(0), json!(5), json!(0)]).is_err());
    }

    #[test]
    fn range_non_progressing_is_empty() {
        assert_eq!(range_3(&[json!(0), json!(5), json!(-1)]).unwrap(), json!([]));
    }

    #[test]
    fn index_walks_nested_containers() {
        let data = json!({"a": [10, 20, {"b": 30}]});
        assert_eq!(index(&[data.clone(), json!("a"), json!(2), json!("b")]).unwrap(), json!(30));
    }

    #[test]
    fn index_out_of_range_errors() {
        assert!(index(&[json!([1, 2]), json!(5)]).is_err());
    }
}

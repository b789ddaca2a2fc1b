use crate::value::{Value, ValueAdapter};

/// `default(fallback, v)`: `v` if truthy, else the textual rendering
/// of `fallback`. In pipeline form (`{{ .x | default "…" }}`) the
/// pipeline fold supplies `v` as the appended final argument, so this
/// always sees exactly the two positional arguments.
///
/// Per spec.md §9's redesign note: the source's two-overload
/// `defaultValue` effectively always rendered whichever argument came
/// last; this implements the specified semantics instead.
pub(crate) fn default(args: &[Value]) -> Result<Value, String> {
    let (fallback, v) = (&args[0], &args[1]);
    if v.truthy() {
        Ok(v.clone())
    } else {
        Ok(Value::String(fallback.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_value_when_truthy() {
        assert_eq!(default(&[json!("fallback"), json!("present")]).unwrap(), json!("present"));
    }

    #[test]
    fn returns_rendered_fallback_when_falsy() {
        assert_eq!(default(&[json!("fallback"), Value::Null]).unwrap(), json!("fallback"));
        assert_eq!(default(&[json!(42), json!("")]).unwrap(), json!("42"));
    }
}

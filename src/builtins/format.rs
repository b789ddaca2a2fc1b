use crate::value::{Value, ValueAdapter};

/// `print(args…)`: concatenate textual renderings; a single space is
/// inserted between adjacent arguments only when the left-hand one is
/// *not* textual.
pub(crate) fn print(args: &[Value]) -> Result<Value, String> {
    let mut out = String::new();
    for (i, a) in args.iter().enumerate() {
        if i > 0 && !matches!(args[i - 1], Value::String(_)) {
            out.push(' ');
        }
        out.push_str(&a.render());
    }
    Ok(Value::String(out))
}

/// `println(args…)`: every argument followed by a space, then a
/// trailing newline.
pub(crate) fn println_(args: &[Value]) -> Result<Value, String> {
    let mut out = String::new();
    for a in args {
        out.push_str(&a.render());
        out.push(' ');
    }
    out.push('\n');
    Ok(Value::String(out))
}

/// `printf(format, args…)`: a pragmatic subset of C-style formatting —
/// `%v` (default rendering), `%s`, `%d`, `%f` (optional `.N`
/// precision), `%t`, `%q` (Rust-debug quoted), `%x`/`%X` (hex), `%%`.
/// Unsupported verbs and argument/verb count mismatches are errors.
pub(crate) fn printf(args: &[Value]) -> Result<Value, String> {
    let format = args[0].as_str().ok_or("printf: format must be a string")?;
    let rest = &args[1..];
    let mut out = String::new();
    let mut arg_idx = 0;
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let mut precision: Option<usize> = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek() {
                if d.is_ascii_digit() {
                    digits.push(*d);
                    chars.next();
                } else {
                    break;
                }
            }
            precision = digits.parse().ok();
        }
        let verb = chars.next().ok_or("printf: dangling %")?;
        let arg = rest.get(arg_idx).ok_or("printf: not enough arguments")?;
        arg_idx += 1;
        match verb {
            'v' => out.push_str(&arg.render()),
            's' => out.push_str(arg.as_str().ok_or("printf: %s wants a string")?),
            'd' => {
                let n = arg.as_i64().ok_or("printf: %d wants an integer")?;
                out.push_str(&n.to_string());
            }
            'f' => {
                let f = arg.as_f64().ok_or("printf: %f wants a number")?;
                out.push_str(&format!("{:.*}", precision.unwrap_or(6), f));
            }
            't' => {
                let b = arg.as_bool().ok_or("printf: %t wants a boolean")?;
                out.push_str(if b { "true" } else { "false" });
            }
            'q' => out.push_str(&format!("{:?}", arg.render())),
            'x' => {
                let n = arg.as_i64().ok_or("printf: %x wants an integer")?;
                out.push_str(&format!("{n:x}"));
            }
            'X' => {
                let n = arg.as_i64().ok_or("printf: %X wants an integer")?;
                out.push_str(&format!("{n:X}"));
            }
            other => return Err(format!("printf: unsupported verb %{other}")),
        }
    }

    Ok(Value::String(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn print_adds_space_between_non_strings() {
        assert_eq!(print(&[json!(1), json!(2)]).unwrap(), json!("1 2"));
    }

    #[test]
    fn print_omits_space_after_string() {
        assert_eq!(print(&[json!("a"), json!("b")]).unwrap(), json!("ab"));
    }

    #[test]
    fn println_appends_newline() {
        assert_eq!(println_(&[json!("x")]).unwrap(), json!("x \n"));
    }

    #[test]
    fn printf_formats_common_verbs() {
        assert_eq!(
            printf(&[json!("%s is %d"), json!("n"), json!(5)]).unwrap(),
            json!("n is 5")
        );
        assert_eq!(printf(&[json!("%.2f"), json!(1.5)]).unwrap(), json!("1.50"));
    }

    #[test]
    fn printf_rejects_too_few_args() {
        assert!(printf(&[json!("%s %s"), json!("only")]).is_err());
    }
}

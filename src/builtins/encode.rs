use crate::value::{Value, ValueAdapter};

/// `urlencode(v)`: percent-encode the textual rendering of `v` as
/// UTF-8, leaving the unreserved set (`A-Za-z0-9-_.~`) untouched.
pub(crate) fn urlencode(args: &[Value]) -> Result<Value, String> {
    let text = args[0].render();
    let mut out = String::with_capacity(text.len());
    for byte in text.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(*byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    Ok(Value::String(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(
            urlencode(&[json!("test+user@carepay.com")]).unwrap(),
            json!("test%2Buser%40carepay.com")
        );
    }

    #[test]
    fn leaves_unreserved_characters_alone() {
        assert_eq!(urlencode(&[json!("abc-123_.~")]).unwrap(), json!("abc-123_.~"));
    }
}

use serde_json::Value as Json;

/// The dynamically typed data value the executor walks against.
/// Concretely `serde_json::Value`; the adapter layer below is what
/// the executor actually programs against; swapping to a different
/// host representation means writing a new [`ValueAdapter`] impl, not
/// touching `exec.rs`.
pub type Value = Json;

/// The handful of shapes the executor needs to distinguish when
/// deciding truthiness, field resolution, and iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Number,
    Text,
    Array,
    Mapping,
}

/// The reflective surface the executor needs over a host data value:
/// is-null, classify, iterate, get-property, call-method, get-field
/// (spec.md §6, §9). `serde_json::Value` is the only implementation
/// this crate ships; a host embedding richer native objects would add
/// its own.
pub trait ValueAdapter: Clone {
    fn is_null(&self) -> bool;
    fn classify(&self) -> Kind;

    /// spec.md §4.5: null is false; bools keep their value; textual,
    /// mapping, array/sequence values are true iff non-empty; numeric
    /// values are true iff strictly positive; other objects are true.
    fn truthy(&self) -> bool;

    fn as_bool(&self) -> Option<bool>;
    fn as_i64(&self) -> Option<i64>;
    fn as_f64(&self) -> Option<f64>;
    fn as_str(&self) -> Option<&str>;

    /// Element count for arrays, key count for mappings, char count
    /// for text. `None` for scalars.
    fn length(&self) -> Option<usize>;

    /// Key-ordered iteration sequence: elements for an array, values
    /// for a mapping (in the adapter's own iteration order).
    fn iterate(&self) -> Option<Vec<Self>>
    where
        Self: Sized;

    /// Field-chain resolution step 2: does this mapping contain `key`?
    fn get_key(&self, key: &str) -> Option<Self>
    where
        Self: Sized;

    /// Field-chain resolution step 1: array length shorthand.
    fn array_length(&self, name: &str) -> Option<usize> {
        if name == "length" {
            self.length()
        } else {
            None
        }
    }

    /// Textual rendering used by `print`-family built-ins, `+` string
    /// concatenation, and `default`'s fallback rendering.
    fn render(&self) -> String;

    /// Numeric index lookup used by the `index` built-in on
    /// array-like containers.
    fn index_by(&self, i: i64) -> Option<Self>
    where
        Self: Sized;
}

impl ValueAdapter for Json {
    fn is_null(&self) -> bool {
        self.is_null()
    }

    fn classify(&self) -> Kind {
        match self {
            Json::Null => Kind::Null,
            Json::Bool(_) => Kind::Bool,
            Json::Number(_) => Kind::Number,
            Json::String(_) => Kind::Text,
            Json::Array(_) => Kind::Array,
            Json::Object(_) => Kind::Mapping,
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Json::Null => false,
            Json::Bool(b) => *b,
            Json::Number(n) => n.as_f64().map(|f| f > 0.0).unwrap_or(false),
            Json::String(s) => !s.is_empty(),
            Json::Array(a) => !a.is_empty(),
            Json::Object(m) => !m.is_empty(),
        }
    }

    fn as_bool(&self) -> Option<bool> {
        self.as_bool()
    }

    fn as_i64(&self) -> Option<i64> {
        self.as_i64()
    }

    fn as_f64(&self) -> Option<f64> {
        self.as_f64()
    }

    fn as_str(&self) -> Option<&str> {
        self.as_str()
    }

    fn length(&self) -> Option<usize> {
        match self {
            Json::Array(a) => Some(a.len()),
            Json::Object(m) => Some(m.len()),
            Json::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    fn iterate(&self) -> Option<Vec<Self>> {
        match self {
            Json::Array(a) => Some(a.clone()),
            Json::Object(m) => Some(m.values().cloned().collect()),
            _ => None,
        }
    }

    fn get_key(&self, key: &str) -> Option<Self> {
        self.as_object().and_then(|m| m.get(key)).cloned()
    }

    fn render(&self) -> String {
        match self {
            Json::Null => String::new(),
            Json::Bool(b) => b.to_string(),
            Json::Number(n) => n.to_string(),
            Json::String(s) => s.clone(),
            Json::Array(_) | Json::Object(_) => self.to_string(),
        }
    }

    fn index_by(&self, i: i64) -> Option<Self> {
        let arr = self.as_array()?;
        let idx = usize::try_from(i).ok()?;
        arr.get(idx).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_matches_spec_rule() {
        assert!(!Json::Null.truthy());
        assert!(!json!(false).truthy());
        assert!(!json!("").truthy());
        assert!(json!("x").truthy());
        assert!(!json!(0).truthy());
        assert!(json!(1).truthy());
        assert!(!json!(-1).truthy());
        assert!(!json!([]).truthy());
        assert!(json!([1]).truthy());
        assert!(!json!({}).truthy());
    }

    #[test]
    fn array_length_shorthand() {
        let v = json!([1, 2, 3]);
        assert_eq!(v.array_length("length"), Some(3));
        assert_eq!(v.array_length("other"), None);
    }

    #[test]
    fn render_strips_string_quoting() {
        assert_eq!(json!("hi").render(), "hi");
        assert_eq!(json!(5).render(), "5");
        assert_eq!(Json::Null.render(), "");
    }
}

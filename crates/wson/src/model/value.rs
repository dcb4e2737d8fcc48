//! Owned value tree.

use crate::codec::pull::parse_number;
use crate::model::text::Text;

/// A decoded or encodable WSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Float64(f64),
    String(Text),
    /// Decimal integer text.
    BigInt(Text),
    /// Decimal fraction text.
    BigDecimal(Text),
    Array(Vec<Value>),
    /// Pairs in wire order. Duplicate keys are kept.
    Map(Vec<(Text, Value)>),
}

impl Value {
    /// Creates a String value.
    pub fn string(s: &str) -> Self {
        Value::String(Text::from(s))
    }

    /// Creates a Map value from `(key, value)` pairs.
    pub fn map<'k>(pairs: impl IntoIterator<Item = (&'k str, Value)>) -> Self {
        Value::Map(pairs.into_iter().map(|(k, v)| (Text::from(k), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Value::String(t) | Value::BigInt(t) | Value::BigDecimal(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Text, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Looks up a map value by key. The last duplicate wins.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the numeric view of this value.
    ///
    /// Text values are parsed on request; containers and Null have none.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Int32(i) => Some(*i as f64),
            Value::Float64(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(t) | Value::BigInt(t) | Value::BigDecimal(t) => {
                parse_number(&t.to_string_lossy())
            }
            Value::Null | Value::Array(_) | Value::Map(_) => None,
        }
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Map(_))
}

// === Drop ===

/// Tears nested containers down on a work stack, so dropping a tree of any
/// depth does not grow the native stack.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = match self {
            Value::Array(items) if items.iter().any(is_container) => std::mem::take(items),
            Value::Map(pairs) if pairs.iter().any(|(_, v)| is_container(v)) => {
                pairs.drain(..).map(|(_, v)| v).collect()
            }
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::Array(items) => pending.append(items),
                Value::Map(pairs) => pending.extend(pairs.drain(..).map(|(_, v)| v)),
                _ => {}
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_last_duplicate_wins() {
        let map = Value::Map(vec![
            (Text::from("a"), Value::Int32(1)),
            (Text::from("a"), Value::Int32(2)),
        ]);
        assert_eq!(map.get("a"), Some(&Value::Int32(2)));
        assert_eq!(map.get("b"), None);
        assert_eq!(Value::Null.get("a"), None);
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(Value::Int32(7).to_number(), Some(7.0));
        assert_eq!(Value::BigInt(Text::from("9007199254740993")).to_number(), Some(9007199254740992.0));
        assert_eq!(Value::BigDecimal(Text::from("0.25")).to_number(), Some(0.25));
        assert_eq!(Value::string("x").to_number(), None);
        assert_eq!(Value::Array(vec![]).to_number(), None);
    }

    #[test]
    fn test_drop_deep_nesting() {
        let mut value = Value::Null;
        for i in 0..300_000 {
            value = if i % 2 == 0 {
                Value::Array(vec![Value::Int32(i), value])
            } else {
                Value::Map(vec![(Text::from("k"), value), (Text::from("n"), Value::Null)])
            };
        }
        drop(value);
    }
}

//! Host Bridge implementations over the owned [`Value`] tree.

use std::borrow::Cow;
use std::marker::PhantomData;

use crate::cache::IdentifierCache;
use crate::codec::{decode, decode_with_cache, encode, encode_with_options, EncodeOptions};
use crate::host::{BigNumberKind, DecodeHost, EncodeHost, Kind};
use crate::model::text::{Text, TextView};
use crate::model::value::Value;

/// Builds [`Value`] trees while decoding.
///
/// Map keys are kept verbatim, including numeric ones, so duplicates and key
/// order survive a round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder;

impl DecodeHost for TreeBuilder {
    type Value = Value;
    type Identifier = Text;

    fn null(&mut self) -> Value {
        Value::Null
    }

    fn boolean(&mut self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn int32(&mut self, value: i32) -> Value {
        Value::Int32(value)
    }

    fn float64(&mut self, value: f64) -> Value {
        Value::Float64(value)
    }

    fn string(&mut self, text: TextView<'_>) -> Value {
        Value::String(text.to_text())
    }

    fn big_number(&mut self, kind: BigNumberKind, text: TextView<'_>) -> Value {
        match kind {
            BigNumberKind::Integer => Value::BigInt(text.to_text()),
            BigNumberKind::Decimal => Value::BigDecimal(text.to_text()),
        }
    }

    fn new_array(&mut self, hint: u32) -> Value {
        Value::Array(Vec::with_capacity(hint as usize))
    }

    fn new_object(&mut self) -> Value {
        Value::Map(Vec::new())
    }

    fn set_indexed(&mut self, container: &mut Value, index: u32, value: Value) {
        match container {
            Value::Array(items) => {
                let index = index as usize;
                if index < items.len() {
                    items[index] = value;
                } else {
                    items.resize(index, Value::Null);
                    items.push(value);
                }
            }
            Value::Map(pairs) => pairs.push((Text::from(index.to_string()), value)),
            _ => {}
        }
    }

    fn set_named(&mut self, container: &mut Value, name: &Text, value: Value) {
        if let Value::Map(pairs) = container {
            pairs.push((name.clone(), value));
        }
    }

    fn set_property(&mut self, container: &mut Value, _key: TextView<'_>, name: &Text, value: Value) {
        self.set_named(container, name, value);
    }

    fn intern(&mut self, key: TextView<'_>) -> Text {
        key.to_text()
    }
}

/// Walks a borrowed [`Value`] tree while encoding.
///
/// Container identity is the node's address. `Int32` values use the Int32
/// form and `Float64` values the Float64 form, whatever their magnitude.
/// Map keys are the pairs themselves, so duplicate keys stay distinct and
/// property lookup is constant time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeWalker<'a> {
    _tree: PhantomData<&'a Value>,
}

impl TreeWalker<'_> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> EncodeHost for TreeWalker<'a> {
    type Value = &'a Value;
    type Key = &'a (Text, Value);
    type Identity = usize;

    fn classify(&self, value: &&'a Value) -> Kind {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int32(_) | Value::Float64(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::BigInt(_) => Kind::BigInt,
            Value::BigDecimal(_) => Kind::BigDecimal,
            Value::Array(_) => Kind::ArrayLike,
            Value::Map(_) => Kind::ObjectLike,
        }
    }

    fn bool_of(&self, value: &&'a Value) -> bool {
        matches!(value, Value::Bool(true))
    }

    fn number_of(&self, value: &&'a Value) -> f64 {
        value.to_number().unwrap_or(f64::NAN)
    }

    fn int32_of(&self, value: &&'a Value) -> Option<i32> {
        match value {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    fn code_units_of<'v>(&self, value: &'v &'a Value) -> Cow<'v, [u16]> {
        match value.as_text() {
            Some(text) => Cow::Borrowed(text.units()),
            None => Cow::Borrowed(&[]),
        }
    }

    fn length_of(&self, array: &&'a Value) -> u32 {
        array.as_array().map_or(0, |items| items.len() as u32)
    }

    fn element_at(&self, array: &&'a Value, index: u32) -> &'a Value {
        const NULL: &Value = &Value::Null;
        match *array {
            Value::Array(items) => items.get(index as usize).unwrap_or(NULL),
            _ => NULL,
        }
    }

    fn own_enumerable_string_keys(&self, object: &&'a Value) -> Vec<&'a (Text, Value)> {
        match *object {
            Value::Map(pairs) => pairs.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn key_units<'k>(&self, key: &'k &'a (Text, Value)) -> Cow<'k, [u16]> {
        Cow::Borrowed(key.0.units())
    }

    fn get_own(&self, _object: &&'a Value, key: &&'a (Text, Value)) -> Option<&'a Value> {
        let (_, value) = *key;
        Some(value)
    }

    fn identity(&self, container: &&'a Value) -> usize {
        *container as *const Value as usize
    }
}

/// Encodes a [`Value`] tree.
pub fn to_bytes(value: &Value) -> Vec<u8> {
    encode(&value, &mut TreeWalker::new())
}

/// Encodes a [`Value`] tree with the given options.
pub fn to_bytes_with_options(value: &Value, options: EncodeOptions) -> Vec<u8> {
    encode_with_options(&value, &mut TreeWalker::new(), options)
}

/// Decodes a [`Value`] tree.
pub fn from_bytes(input: &[u8]) -> Value {
    decode(input, &mut TreeBuilder)
}

/// Decodes a [`Value`] tree, interning keys through a process-scoped cache.
pub fn from_bytes_with_cache(input: &[u8], cache: &mut IdentifierCache<Text>) -> Value {
    decode_with_cache(input, &mut TreeBuilder, cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_keys_stay_named() {
        let value = Value::map([("007", Value::Int32(1)), ("7", Value::Int32(2))]);
        let decoded = from_bytes(&to_bytes(&value));
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_duplicate_keys_survive() {
        let value = Value::Map(vec![
            (Text::from("k"), Value::Int32(1)),
            (Text::from("k"), Value::Int32(2)),
        ]);
        let decoded = from_bytes(&to_bytes(&value));
        assert_eq!(decoded, value);
        assert_eq!(decoded.get("k"), Some(&Value::Int32(2)));
    }

    #[test]
    fn test_float_with_integral_value_stays_float() {
        let bytes = to_bytes(&Value::Float64(3.0));
        assert_eq!(bytes[0], b'd');
        assert_eq!(from_bytes(&bytes), Value::Float64(3.0));
    }

    #[test]
    fn test_big_numbers_keep_their_tags() {
        let value = Value::Array(vec![
            Value::BigInt(Text::from("123456789012345678901234567890")),
            Value::BigDecimal(Text::from("1.000000000000000000001")),
        ]);
        let bytes = to_bytes(&value);
        assert_eq!(bytes[2], b'g');
        assert_eq!(from_bytes(&bytes), value);
    }

    #[test]
    fn test_wide_map_encodes_in_linear_time() {
        let width = 200_000;
        let value = Value::Map(
            (0..width)
                .map(|i| (Text::from(format!("k{i}")), Value::Int32(i)))
                .collect(),
        );
        let start = std::time::Instant::now();
        let bytes = to_bytes(&value);
        assert!(start.elapsed() < std::time::Duration::from_secs(10));

        let walker = TreeWalker::new();
        let keys = walker.own_enumerable_string_keys(&&value);
        assert_eq!(keys.len(), width as usize);
        assert_eq!(walker.get_own(&&value, &keys[7]), Some(&Value::Int32(7)));
        assert_eq!(from_bytes(&bytes), value);
    }

    #[test]
    fn test_set_indexed_pads_with_null() {
        let mut array = Value::Array(vec![]);
        TreeBuilder.set_indexed(&mut array, 2, Value::Bool(true));
        assert_eq!(
            array,
            Value::Array(vec![Value::Null, Value::Null, Value::Bool(true)])
        );
    }
}

//! Host Bridge: the capability interface between the codec and a runtime.
//!
//! The codec never inspects host values directly. The decoder builds values
//! through [`DecodeHost`]; the encoder walks them through [`EncodeHost`].
//! [`crate::model`] provides both for the crate's own [`crate::Value`] tree.

use std::borrow::Cow;
use std::hash::Hash;

use crate::model::text::{parse_array_index, TextView};

/// Which decimal-text number tag a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BigNumberKind {
    Integer,
    Decimal,
}

/// Decode-side capabilities: value construction and key interning.
pub trait DecodeHost {
    /// A host value handle.
    type Value;
    /// An interned property name.
    type Identifier: Clone;

    fn null(&mut self) -> Self::Value;

    fn boolean(&mut self, value: bool) -> Self::Value;

    fn int32(&mut self, value: i32) -> Self::Value;

    fn float64(&mut self, value: f64) -> Self::Value;

    fn string(&mut self, text: TextView<'_>) -> Self::Value;

    /// BigInt and BigDecimal payloads. Kept as text unless the host decides
    /// otherwise.
    fn big_number(&mut self, kind: BigNumberKind, text: TextView<'_>) -> Self::Value {
        let _ = kind;
        self.string(text)
    }

    /// Creates an empty array. `hint` is the declared element count, already
    /// capped by the number of unread bytes.
    fn new_array(&mut self, hint: u32) -> Self::Value;

    fn new_object(&mut self) -> Self::Value;

    fn set_indexed(&mut self, container: &mut Self::Value, index: u32, value: Self::Value);

    fn set_named(&mut self, container: &mut Self::Value, name: &Self::Identifier, value: Self::Value);

    /// Stores one decoded map pair.
    ///
    /// Keys that are canonical array indices become indexed properties; all
    /// others become named properties.
    fn set_property(
        &mut self,
        container: &mut Self::Value,
        key: TextView<'_>,
        name: &Self::Identifier,
        value: Self::Value,
    ) {
        match parse_array_index(key.units()) {
            Some(index) => self.set_indexed(container, index, value),
            None => self.set_named(container, name, value),
        }
    }

    /// Turns key bytes into a reusable identifier.
    fn intern(&mut self, key: TextView<'_>) -> Self::Identifier;
}

/// Classification of a host value for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Encodes as Null; excluded from maps.
    Undefined,
    Null,
    Bool,
    Number,
    String,
    /// Decimal integer text.
    BigInt,
    /// Decimal fraction text.
    BigDecimal,
    ArrayLike,
    /// Enumerable, non-callable object.
    ObjectLike,
    /// Encodes as Null; excluded from maps.
    Callable,
}

impl Kind {
    /// Whether a property with a value of this kind is left out of a map.
    pub fn is_excluded_from_map(self) -> bool {
        matches!(self, Kind::Undefined | Kind::Callable)
    }
}

/// Context handed to [`EncodeHost::wire_representation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKey<'k> {
    /// Position in an array-like parent.
    Index(u32),
    /// Property name in an object-like parent. Empty for the root value.
    Name(&'k [u16]),
}

/// Encode-side capabilities: classification and property access.
pub trait EncodeHost {
    /// A host value handle.
    type Value: Clone;
    /// A property key as enumerated by the host.
    type Key;
    /// Reference identity of a container.
    type Identity: Copy + Eq + Hash;

    fn classify(&self, value: &Self::Value) -> Kind;

    fn bool_of(&self, value: &Self::Value) -> bool;

    fn number_of(&self, value: &Self::Value) -> f64;

    /// Returns the number as an `i32` when it should use the Int32 form.
    ///
    /// Defaults to integral values in range, excluding `-0`.
    fn int32_of(&self, value: &Self::Value) -> Option<i32> {
        let number = self.number_of(value);
        let int = number as i32;
        let exact = int as f64 == number && !(number == 0.0 && number.is_sign_negative());
        exact.then_some(int)
    }

    /// UTF-16 code units of a String, BigInt or BigDecimal value.
    fn code_units_of<'v>(&self, value: &'v Self::Value) -> Cow<'v, [u16]>;

    fn length_of(&self, array: &Self::Value) -> u32;

    fn element_at(&self, array: &Self::Value, index: u32) -> Self::Value;

    /// Own, enumerable, string-keyed properties in their natural order.
    fn own_enumerable_string_keys(&self, object: &Self::Value) -> Vec<Self::Key>;

    fn key_units<'k>(&self, key: &'k Self::Key) -> Cow<'k, [u16]>;

    /// Returns `None` when the property no longer exists.
    fn get_own(&self, object: &Self::Value, key: &Self::Key) -> Option<Self::Value>;

    /// Offers a replacement to encode in place of `value`.
    fn wire_representation(&mut self, value: &Self::Value, key: HookKey<'_>) -> Option<Self::Value> {
        let _ = (value, key);
        None
    }

    fn identity(&self, container: &Self::Value) -> Self::Identity;
}

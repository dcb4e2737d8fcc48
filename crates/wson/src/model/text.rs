//! UTF-16 text as it travels on the wire.
//!
//! The managed runtime stores strings as UTF-16 code units, which may contain
//! lone surrogates. [`TextView`] borrows the raw little-endian payload from
//! the input; [`Text`] owns the code units.

use std::fmt;

/// Borrowed UTF-16LE payload bytes.
///
/// An odd trailing byte is ignored when viewing units.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextView<'a> {
    bytes: &'a [u8],
}

impl<'a> TextView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Raw payload bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Number of code units.
    pub fn len(&self) -> usize {
        self.bytes.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Code unit at `index`.
    #[inline]
    pub fn unit(&self, index: usize) -> Option<u16> {
        let at = index * 2;
        match self.bytes.get(at..at + 2) {
            Some(&[lo, hi]) => Some(u16::from_le_bytes([lo, hi])),
            _ => None,
        }
    }

    pub fn units(self) -> impl Iterator<Item = u16> + 'a {
        self.bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }

    pub fn to_text(&self) -> Text {
        Text(self.units().collect())
    }

    /// Decodes to a Rust string, replacing lone surrogates.
    pub fn to_string_lossy(&self) -> String {
        char::decode_utf16(self.units())
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl fmt::Debug for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

/// Owned UTF-16 code units.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Text(Vec<u16>);

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_units(units: Vec<u16>) -> Self {
        Self(units)
    }

    pub fn units(&self) -> &[u16] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes to a Rust string, replacing lone surrogates.
    pub fn to_string_lossy(&self) -> String {
        char::decode_utf16(self.0.iter().copied())
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self(s.encode_utf16().collect())
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<TextView<'_>> for Text {
    fn from(view: TextView<'_>) -> Self {
        view.to_text()
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.0.iter().copied().eq(other.encode_utf16())
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Returns the array index a property key denotes, if any.
///
/// A key is an index when it is `0` or a decimal number without a leading
/// zero whose value is below `u32::MAX`.
pub fn parse_array_index(units: impl IntoIterator<Item = u16>) -> Option<u32> {
    let mut iter = units.into_iter();
    let first = iter.next()?;
    let digit = |u: u16| (b'0' as u16..=b'9' as u16).contains(&u).then(|| (u - b'0' as u16) as u64);
    let mut value = digit(first)?;
    if value == 0 {
        return iter.next().is_none().then_some(0);
    }
    for unit in iter {
        value = value * 10 + digit(unit)?;
        if value >= u32::MAX as u64 {
            return None;
        }
    }
    Some(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_view_units() {
        let bytes = utf16le("ab\u{1F600}");
        let view = TextView::new(&bytes);
        assert_eq!(view.len(), 4);
        assert_eq!(view.unit(0), Some(b'a' as u16));
        assert_eq!(view.unit(4), None);
        assert_eq!(view.to_string_lossy(), "ab\u{1F600}");
        assert_eq!(view.to_text(), "ab\u{1F600}");
    }

    #[test]
    fn test_odd_trailing_byte_ignored() {
        let bytes = [b'a', 0, b'b'];
        let view = TextView::new(&bytes);
        assert_eq!(view.len(), 1);
        assert_eq!(view.to_string_lossy(), "a");
    }

    #[test]
    fn test_lone_surrogate_preserved_in_text() {
        let text = Text::from_units(vec![0xD800, b'x' as u16]);
        assert_eq!(text.len(), 2);
        assert_eq!(text.to_string_lossy(), "\u{FFFD}x");
    }

    #[test]
    fn test_parse_array_index() {
        let idx = |s: &str| parse_array_index(s.encode_utf16());
        assert_eq!(idx("0"), Some(0));
        assert_eq!(idx("42"), Some(42));
        assert_eq!(idx("4294967294"), Some(4_294_967_294));
        assert_eq!(idx("4294967295"), None);
        assert_eq!(idx("007"), None);
        assert_eq!(idx("00"), None);
        assert_eq!(idx(""), None);
        assert_eq!(idx("-1"), None);
        assert_eq!(idx("1a"), None);
        assert_eq!(idx("99999999999999999999"), None);
    }
}

//! Tag bytes of the WSON wire format.
//!
//! Every value starts with exactly one tag byte. Booleans carry their value in
//! the tag; all other kinds are followed by a payload.

/// A known tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Null = b'0',
    True = b't',
    False = b'f',
    /// 4-byte big-endian two's complement.
    Int = b'i',
    /// 8-byte big-endian IEEE-754.
    Double = b'd',
    /// 8-byte big-endian two's complement. Never written by the encoder.
    Long = b'l',
    /// 4-byte big-endian IEEE-754. Never written by the encoder.
    Float = b'F',
    /// Varuint byte length, then UTF-16LE code units.
    String = b's',
    /// Decimal text, same shape as `String`.
    BigInt = b'g',
    /// Decimal text, same shape as `String`.
    BigDecimal = b'e',
    /// Varuint count, then that many values.
    Array = b'[',
    /// Varuint count, then (key, value) pairs.
    Map = b'{',
}

impl Tag {
    /// Creates a Tag from its wire representation.
    pub fn from_u8(v: u8) -> Option<Tag> {
        match v {
            b'0' => Some(Tag::Null),
            b't' => Some(Tag::True),
            b'f' => Some(Tag::False),
            b'i' => Some(Tag::Int),
            b'd' => Some(Tag::Double),
            b'l' => Some(Tag::Long),
            b'F' => Some(Tag::Float),
            b's' => Some(Tag::String),
            b'g' => Some(Tag::BigInt),
            b'e' => Some(Tag::BigDecimal),
            b'[' => Some(Tag::Array),
            b'{' => Some(Tag::Map),
            _ => None,
        }
    }

    /// Returns the wire byte.
    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// String, BigInt and BigDecimal share the text payload shape.
    pub fn is_text(self) -> bool {
        matches!(self, Tag::String | Tag::BigInt | Tag::BigDecimal)
    }

    pub fn is_number(self) -> bool {
        matches!(self, Tag::Int | Tag::Double | Tag::Long | Tag::Float)
    }

    pub fn is_bool(self) -> bool {
        matches!(self, Tag::True | Tag::False)
    }

    pub fn is_container(self) -> bool {
        matches!(self, Tag::Array | Tag::Map)
    }

    /// Size of the fixed-width payload, if the tag has one.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Tag::Null | Tag::True | Tag::False => Some(0),
            Tag::Int | Tag::Float => Some(4),
            Tag::Double | Tag::Long => Some(8),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bytes_roundtrip() {
        let all = [
            Tag::Null,
            Tag::True,
            Tag::False,
            Tag::Int,
            Tag::Double,
            Tag::Long,
            Tag::Float,
            Tag::String,
            Tag::BigInt,
            Tag::BigDecimal,
            Tag::Array,
            Tag::Map,
        ];
        for tag in all {
            assert_eq!(Tag::from_u8(tag.byte()), Some(tag));
        }
    }

    #[test]
    fn test_unknown_tags() {
        for b in [0u8, b'b', b'x', 0xFF] {
            assert_eq!(Tag::from_u8(b), None, "byte {b:#04x}");
        }
    }

    #[test]
    fn test_tag_classes() {
        assert!(Tag::BigDecimal.is_text());
        assert!(Tag::Long.is_number());
        assert!(Tag::False.is_bool());
        assert!(!Tag::Null.is_bool());
        assert!(Tag::Map.is_container());
        assert!(!Tag::String.is_container());
        assert!(!Tag::String.is_number());
        assert_eq!(Tag::Map.fixed_width(), None);
        assert_eq!(Tag::Float.fixed_width(), Some(4));
    }
}

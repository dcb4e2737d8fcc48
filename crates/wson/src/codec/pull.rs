//! Pull parser for reading WSON without building a value tree.
//!
//! Unlike [`crate::codec::decode`], the parser is strict: it reports
//! truncation, unknown tags and malformed payloads as [`DecodeError`]s. It is
//! meant for native consumers that walk a payload once, converting scalars to
//! the representation they need.

use crate::codec::cursor::Reader;
use crate::codec::tag::Tag;
use crate::error::DecodeError;
use crate::limits::MAX_DEPTH;
use crate::model::text::TextView;

/// Sequential reader over one WSON buffer.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    reader: Reader<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(data),
        }
    }

    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn has_next(&self) -> bool {
        self.reader.has_next()
    }

    /// Reads the next tag byte. An exhausted buffer reads as Null.
    pub fn next_tag(&mut self) -> u8 {
        self.reader.next_tag().unwrap_or(Tag::Null.byte())
    }

    /// Un-reads the tag just returned by [`Parser::next_tag`].
    pub fn back_tag(&mut self) {
        self.reader.back_one_tag();
    }

    /// Reads the element count of an array or the pair count of a map.
    pub fn next_size(&mut self) -> Result<u32, DecodeError> {
        self.reader.next_var_uint("container size")
    }

    /// Reads a map key as UTF-8, replacing lone surrogates.
    pub fn next_map_key(&mut self) -> Result<String, DecodeError> {
        let bytes = self.reader.next_len_prefixed("map key")?;
        Ok(TextView::new(bytes).to_string_lossy())
    }

    /// Reads a scalar as a string. Numbers and booleans are formatted.
    pub fn next_string(&mut self, tag: u8) -> Result<String, DecodeError> {
        match Tag::from_u8(tag) {
            Some(t) if t.is_text() => {
                let bytes = self.reader.next_len_prefixed("string")?;
                Ok(TextView::new(bytes).to_string_lossy())
            }
            Some(Tag::Int) => Ok(self.reader.next_i32("int")?.to_string()),
            Some(Tag::Long) => Ok(self.reader.next_i64("long")?.to_string()),
            Some(Tag::Double) => Ok(self.reader.next_f64("double")?.to_string()),
            Some(Tag::Float) => Ok(self.reader.next_f32("float")?.to_string()),
            Some(Tag::True) => Ok("true".to_string()),
            Some(Tag::False) => Ok("false".to_string()),
            Some(Tag::Null) => Ok("null".to_string()),
            _ => Err(DecodeError::UnexpectedTag {
                tag,
                expected: "string",
            }),
        }
    }

    /// Reads a scalar as a number, parsing text payloads.
    pub fn next_number(&mut self, tag: u8) -> Result<f64, DecodeError> {
        match Tag::from_u8(tag) {
            Some(Tag::Int) => Ok(self.reader.next_i32("int")? as f64),
            Some(Tag::Long) => Ok(self.reader.next_i64("long")? as f64),
            Some(Tag::Double) => self.reader.next_f64("double"),
            Some(Tag::Float) => Ok(self.reader.next_f32("float")? as f64),
            Some(Tag::True) => Ok(1.0),
            Some(Tag::False) => Ok(0.0),
            Some(t) if t.is_text() => {
                let text = self.next_string(tag)?;
                parse_number(&text).ok_or(DecodeError::InvalidNumber { text })
            }
            _ => Err(DecodeError::UnexpectedTag {
                tag,
                expected: "number",
            }),
        }
    }

    /// Reads a scalar as a boolean. Numbers are true when non-zero.
    pub fn next_bool(&mut self, tag: u8) -> Result<bool, DecodeError> {
        match Tag::from_u8(tag) {
            Some(t) if t.is_bool() => Ok(t == Tag::True),
            Some(Tag::Null) => Ok(false),
            Some(t) if t.is_number() => Ok(self.next_number(tag)? != 0.0),
            Some(t) if t.is_text() => Ok(self.next_string(tag)? == "true"),
            _ => Err(DecodeError::UnexpectedTag {
                tag,
                expected: "bool",
            }),
        }
    }

    /// Skips the payload of a value whose tag was just read.
    pub fn skip_value(&mut self, tag: u8) -> Result<(), DecodeError> {
        skip_tagged(&mut self.reader, tag, MAX_DEPTH)
    }
}

/// Parses decimal text as a number.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Skips one value, including nested containers, without recursion.
///
/// Text payloads must have an even byte length and containers may nest at
/// most `max_depth` levels.
pub(crate) fn skip_tagged(reader: &mut Reader<'_>, tag: u8, max_depth: usize) -> Result<(), DecodeError> {
    // Remaining children of each open container; maps count key+value pairs.
    let mut open: Vec<(u32, bool)> = Vec::new();
    let mut tag = tag;
    loop {
        let offset = reader.position().saturating_sub(1);
        let kind = Tag::from_u8(tag).ok_or(DecodeError::UnknownTag { tag, offset })?;
        match kind {
            t if t.is_container() => {
                let count = reader.next_var_uint("container size")?;
                if open.len() >= max_depth {
                    return Err(DecodeError::DepthExceeded { max: max_depth });
                }
                open.push((count, t == Tag::Map));
            }
            t if t.is_text() => skip_text(reader, "string")?,
            t => {
                let width = t.fixed_width().unwrap_or(0);
                reader.next_bytes(width, "scalar")?;
            }
        }

        loop {
            match open.last_mut() {
                None => return Ok(()),
                Some((0, _)) => {
                    open.pop();
                }
                Some((remaining, is_map)) => {
                    *remaining -= 1;
                    if *is_map {
                        skip_text(reader, "map key")?;
                    }
                    break;
                }
            }
        }
        tag = reader.next_tag()?;
    }
}

fn skip_text(reader: &mut Reader<'_>, context: &'static str) -> Result<(), DecodeError> {
    let bytes = reader.next_len_prefixed(context)?;
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddTextLength {
            context,
            len: bytes.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::cursor::Writer;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_read_map_fields() {
        let mut w = Writer::new();
        w.push_tag(Tag::Map);
        w.push_var_uint(2);
        w.push_text(&units("n"));
        w.push_tag(Tag::Int);
        w.push_i32(-5);
        w.push_text(&units("s"));
        w.push_tag(Tag::String);
        w.push_text(&units("hi"));
        let bytes = w.into_bytes();

        let mut p = Parser::new(&bytes);
        assert_eq!(p.next_tag(), Tag::Map.byte());
        assert_eq!(p.next_size().unwrap(), 2);
        assert_eq!(p.next_map_key().unwrap(), "n");
        let tag = p.next_tag();
        assert_eq!(p.next_number(tag).unwrap(), -5.0);
        assert_eq!(p.next_map_key().unwrap(), "s");
        let tag = p.next_tag();
        assert_eq!(p.next_string(tag).unwrap(), "hi");
        assert!(!p.has_next());
        assert_eq!(p.next_tag(), Tag::Null.byte());
    }

    #[test]
    fn test_numeric_view_of_text() {
        let mut w = Writer::new();
        w.push_tag(Tag::BigDecimal);
        w.push_text(&units("12.50"));
        w.push_tag(Tag::BigInt);
        w.push_text(&units("not a number"));
        let bytes = w.into_bytes();

        let mut p = Parser::new(&bytes);
        let tag = p.next_tag();
        assert_eq!(p.next_number(tag).unwrap(), 12.5);
        let tag = p.next_tag();
        assert!(matches!(
            p.next_number(tag),
            Err(DecodeError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_string_view_of_numbers() {
        let mut w = Writer::new();
        w.push_tag(Tag::Int);
        w.push_i32(42);
        w.push_tag(Tag::Double);
        w.push_f64(0.5);
        w.push_tag(Tag::True);
        let bytes = w.into_bytes();

        let mut p = Parser::new(&bytes);
        let tag = p.next_tag();
        assert_eq!(p.next_string(tag).unwrap(), "42");
        let tag = p.next_tag();
        assert_eq!(p.next_string(tag).unwrap(), "0.5");
        let tag = p.next_tag();
        assert!(p.next_bool(tag).unwrap());
    }

    #[test]
    fn test_bool_view() {
        let bytes = [b'f', b'0', b'i', 0, 0, 0, 2, b'['];
        let mut p = Parser::new(&bytes);
        let tag = p.next_tag();
        assert!(!p.next_bool(tag).unwrap());
        let tag = p.next_tag();
        assert!(!p.next_bool(tag).unwrap());
        let tag = p.next_tag();
        assert!(p.next_bool(tag).unwrap());
        let tag = p.next_tag();
        assert!(matches!(
            p.next_bool(tag),
            Err(DecodeError::UnexpectedTag { expected: "bool", .. })
        ));
    }

    #[test]
    fn test_back_tag_rereads() {
        let bytes = [b't'];
        let mut p = Parser::new(&bytes);
        assert_eq!(p.next_tag(), b't');
        p.back_tag();
        assert_eq!(p.position(), 0);
        assert_eq!(p.next_tag(), b't');
    }

    #[test]
    fn test_skip_nested_value() {
        let mut w = Writer::new();
        w.push_tag(Tag::Array);
        w.push_var_uint(2);
        w.push_tag(Tag::Map);
        w.push_var_uint(1);
        w.push_text(&units("k"));
        w.push_tag(Tag::Array);
        w.push_var_uint(0);
        w.push_tag(Tag::Double);
        w.push_f64(1.0);
        w.push_tag(Tag::Int);
        w.push_i32(9);
        let bytes = w.into_bytes();

        let mut p = Parser::new(&bytes);
        let tag = p.next_tag();
        p.skip_value(tag).unwrap();
        let tag = p.next_tag();
        assert_eq!(p.next_number(tag).unwrap(), 9.0);
    }

    #[test]
    fn test_skip_rejects_unknown_tag_and_containers_as_scalars() {
        let bytes = [b'[', 1, b'x'];
        let mut p = Parser::new(&bytes);
        let tag = p.next_tag();
        assert!(matches!(
            p.skip_value(tag),
            Err(DecodeError::UnknownTag { tag: b'x', offset: 2 })
        ));

        let mut p = Parser::new(&[b'[', 0]);
        let tag = p.next_tag();
        assert!(matches!(
            p.next_number(tag),
            Err(DecodeError::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-1e3"), Some(-1000.0));
        assert_eq!(parse_number("12345678901234567890"), Some(12345678901234567890.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }
}

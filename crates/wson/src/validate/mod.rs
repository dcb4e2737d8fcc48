//! Strict structural validation of WSON buffers.
//!
//! [`crate::decode`] accepts anything and degrades malformed input to Null or
//! partial containers. Consumers that must reject such input check it here
//! first.

use crate::codec::cursor::Reader;
use crate::codec::pull::skip_tagged;
use crate::error::DecodeError;
use crate::limits::MAX_DEPTH;

/// Checks that `input` holds exactly one well-formed value.
///
/// Rejects unknown tags, truncated payloads or containers, odd-length text,
/// nesting beyond [`MAX_DEPTH`], and trailing bytes.
pub fn validate(input: &[u8]) -> Result<(), DecodeError> {
    validate_with_depth(input, MAX_DEPTH)
}

/// Like [`validate`] with a custom nesting limit.
pub fn validate_with_depth(input: &[u8], max_depth: usize) -> Result<(), DecodeError> {
    let mut reader = Reader::new(input);
    let tag = reader.next_tag()?;
    skip_tagged(&mut reader, tag, max_depth)?;
    if reader.has_next() {
        return Err(DecodeError::TrailingBytes {
            remaining: reader.remaining_len(),
        });
    }
    Ok(())
}

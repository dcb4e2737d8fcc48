//! WSON: a compact binary wire format for JSON-like value trees.
//!
//! WSON moves structured data between a native layer and a managed runtime
//! without going through text. Values are null, booleans, 32-bit integers,
//! doubles, UTF-16 strings, decimal big-number text, arrays, and ordered maps.
//!
//! # Quick Start
//!
//! ```rust
//! use wson::{from_bytes, to_bytes, Value};
//!
//! let value = Value::map([
//!     ("a", Value::Int32(1)),
//!     ("b", Value::Array(vec![Value::Bool(true), Value::Null, Value::string("x")])),
//! ]);
//!
//! let bytes = to_bytes(&value);
//! assert_eq!(bytes[0], b'{');
//!
//! let decoded = from_bytes(&bytes);
//! assert_eq!(decoded, value);
//! ```
//!
//! # Modules
//!
//! - [`codec`]: Byte cursors, tags, encoder, decoder and pull parser
//! - [`host`]: The Host Bridge traits the codec works through
//! - [`cache`]: Identifier interning cache for map keys
//! - [`model`]: Owned value tree and its Host Bridge implementations
//! - [`validate`]: Strict structural validation
//! - [`error`]: Error types
//! - [`limits`]: Depth and cache limits
//!
//! # Host values
//!
//! The encoder and decoder never touch runtime values directly. A runtime
//! binding implements [`DecodeHost`] to build its values and interns map keys,
//! and [`EncodeHost`] to classify and enumerate them. [`TreeBuilder`] and
//! [`TreeWalker`] implement both for the crate's own [`Value`].
//!
//! # Malformed input
//!
//! Decoding never fails. Unknown tags decode as Null and truncated
//! containers keep what was read. Encoding never fails either: cycles,
//! over-deep nesting and unserializable values become Null. Use
//! [`validate()`] to reject malformed buffers up front.
//!
//! # Wire Format
//!
//! One tag byte per value, then its payload:
//! - `0` null, `t` / `f` booleans
//! - `i` 4-byte big-endian int, `d` 8-byte big-endian double
//! - `s` string, `g` big integer, `e` big decimal: varuint byte length, UTF-16LE
//! - `[` array: varuint count, values
//! - `{` map: varuint count, (varuint key byte length, key, value) pairs

pub mod cache;
pub mod codec;
pub mod error;
pub mod host;
pub mod limits;
pub mod model;
pub mod validate;

// Re-export commonly used types at crate root
pub use cache::{CacheRegistry, CacheStats, ContextToken, IdentifierCache};
pub use codec::{
    decode, decode_in_context, decode_with_cache, encode, encode_with_options, EncodeOptions,
    Parser, Tag,
};
pub use error::{CacheError, DecodeError};
pub use host::{BigNumberKind, DecodeHost, EncodeHost, HookKey, Kind};
pub use model::{
    from_bytes, from_bytes_with_cache, to_bytes, to_bytes_with_options, Text, TextView,
    TreeBuilder, TreeWalker, Value,
};
pub use validate::{validate, validate_with_depth};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

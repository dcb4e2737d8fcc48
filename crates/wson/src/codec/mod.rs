//! Binary encoding/decoding for WSON.

pub mod cursor;
pub mod decode;
pub mod encode;
pub mod pull;
pub mod tag;

pub use cursor::{Reader, Writer};
pub use decode::{decode, decode_in_context, decode_with_cache};
pub use encode::{encode, encode_with_options, EncodeOptions};
pub use pull::{parse_number, Parser};
pub use tag::Tag;

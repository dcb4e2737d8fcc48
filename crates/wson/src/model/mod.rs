//! Data model types for WSON.
//!
//! - Text: UTF-16 code units, borrowed from the wire or owned
//! - Values: the owned value tree
//! - Hosts: Host Bridge implementations that build and walk value trees

pub mod host;
pub mod text;
pub mod value;

pub use host::{from_bytes, from_bytes_with_cache, to_bytes, to_bytes_with_options, TreeBuilder, TreeWalker};
pub use text::{parse_array_index, Text, TextView};
pub use value::Value;

//! Error types for WSON decoding and cache lifecycle.
//!
//! The decode and encode data paths never fail: they degrade to Null or to a
//! partial container. These errors surface from the byte cursor, the strict
//! validator, the pull parser, and misuse of the identifier cache lifecycle.

use thiserror::Error;

use crate::cache::ContextToken;

/// Error while reading WSON bytes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varuint exceeds maximum length (5 bytes) while reading {context}")]
    VarUintTooLong { context: &'static str },

    #[error("unknown tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("{context} has odd byte length {len}; text payloads are 2 bytes per unit")]
    OddTextLength { context: &'static str, len: usize },

    #[error("{remaining} trailing bytes after the root value")]
    TrailingBytes { remaining: usize },

    #[error("nesting depth exceeds maximum {max}")]
    DepthExceeded { max: usize },

    #[error("text {text:?} is not a number")]
    InvalidNumber { text: String },

    #[error("tag {tag:#04x} cannot be read as {expected}")]
    UnexpectedTag { tag: u8, expected: &'static str },
}

/// Misuse of the process-scoped identifier cache lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("identifier cache for context {0} is already initialized")]
    AlreadyInitialized(ContextToken),

    #[error("no identifier cache is initialized for context {0}")]
    NotInitialized(ContextToken),
}

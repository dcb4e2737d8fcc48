//! WSON encoding.
//!
//! Encoding never fails. Values the wire cannot carry (undefined, callables)
//! become Null, and so does any container that is already open further up the
//! walk (a cycle) or that would exceed [`EncodeOptions::max_depth`]. Siblings
//! of a cut-off value are still encoded.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::codec::cursor::Writer;
use crate::codec::tag::Tag;
use crate::host::{EncodeHost, HookKey, Kind};
use crate::limits::MAX_DEPTH;

/// Options for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Number of containers that may be open when another one is entered.
    /// A container met deeper than this encodes as Null.
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

impl EncodeOptions {
    /// Creates default encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the depth ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Encodes a host value with default options.
pub fn encode<H: EncodeHost>(value: &H::Value, host: &mut H) -> Vec<u8> {
    encode_with_options(value, host, EncodeOptions::default())
}

/// Encodes a host value with the given options.
pub fn encode_with_options<H: EncodeHost>(
    value: &H::Value,
    host: &mut H,
    options: EncodeOptions,
) -> Vec<u8> {
    let mut encoder = Encoder {
        host,
        writer: Writer::with_capacity(256),
        stack: Vec::new(),
        open: FxHashSet::default(),
        options,
    };
    encoder.run(value);
    encoder.writer.into_bytes()
}

/// An open container whose children are still being written.
enum Frame<H: EncodeHost> {
    Array {
        identity: H::Identity,
        array: H::Value,
        len: u32,
        next: u32,
    },
    Map {
        identity: H::Identity,
        entries: std::vec::IntoIter<(H::Key, H::Value)>,
    },
}

impl<H: EncodeHost> Frame<H> {
    fn identity(&self) -> H::Identity {
        match self {
            Frame::Array { identity, .. } | Frame::Map { identity, .. } => *identity,
        }
    }
}

struct Encoder<'h, H: EncodeHost> {
    host: &'h mut H,
    writer: Writer,
    stack: Vec<Frame<H>>,
    /// Identities on `stack`, for constant-time cycle checks.
    open: FxHashSet<H::Identity>,
    options: EncodeOptions,
}

impl<H: EncodeHost> Encoder<'_, H> {
    fn run(&mut self, root: &H::Value) {
        let root = self
            .host
            .wire_representation(root, HookKey::Name(&[]))
            .unwrap_or_else(|| root.clone());
        self.push_value(root);

        while let Some(frame) = self.stack.last_mut() {
            let child = match frame {
                Frame::Array {
                    array, len, next, ..
                } => {
                    if *next < *len {
                        let index = *next;
                        *next += 1;
                        let element = self.host.element_at(array, index);
                        Some(
                            self.host
                                .wire_representation(&element, HookKey::Index(index))
                                .unwrap_or(element),
                        )
                    } else {
                        None
                    }
                }
                Frame::Map { entries, .. } => entries.next().map(|(key, value)| {
                    let units = self.host.key_units(&key);
                    self.writer.push_text(&units);
                    self.host
                        .wire_representation(&value, HookKey::Name(&units))
                        .unwrap_or(value)
                }),
            };
            match child {
                Some(value) => self.push_value(value),
                None => {
                    if let Some(frame) = self.stack.pop() {
                        self.open.remove(&frame.identity());
                    }
                }
            }
        }
    }

    /// Writes a scalar, or writes a container header and opens its frame.
    fn push_value(&mut self, value: H::Value) {
        let host = &*self.host;
        let writer = &mut self.writer;
        match host.classify(&value) {
            Kind::Undefined | Kind::Null => writer.push_tag(Tag::Null),
            Kind::Callable => {
                trace!("callable value encoded as null");
                writer.push_tag(Tag::Null);
            }
            Kind::Bool => writer.push_tag(if host.bool_of(&value) {
                Tag::True
            } else {
                Tag::False
            }),
            Kind::Number => match host.int32_of(&value) {
                Some(int) => {
                    writer.push_tag(Tag::Int);
                    writer.push_i32(int);
                }
                None => {
                    writer.push_tag(Tag::Double);
                    writer.push_f64(host.number_of(&value));
                }
            },
            Kind::String => {
                writer.push_tag(Tag::String);
                writer.push_text(&host.code_units_of(&value));
            }
            Kind::BigInt => {
                writer.push_tag(Tag::BigInt);
                writer.push_text(&host.code_units_of(&value));
            }
            Kind::BigDecimal => {
                writer.push_tag(Tag::BigDecimal);
                writer.push_text(&host.code_units_of(&value));
            }
            Kind::ArrayLike => {
                let Some(identity) = self.enter(&value) else {
                    return;
                };
                let len = self.host.length_of(&value);
                self.writer.push_tag(Tag::Array);
                self.writer.push_var_uint(len);
                self.stack.push(Frame::Array {
                    identity,
                    array: value,
                    len,
                    next: 0,
                });
            }
            Kind::ObjectLike => {
                let Some(identity) = self.enter(&value) else {
                    return;
                };
                let entries = self.stage_properties(&value);
                self.writer.push_tag(Tag::Map);
                self.writer.push_var_uint(entries.len() as u32);
                self.stack.push(Frame::Map {
                    identity,
                    entries: entries.into_iter(),
                });
            }
        }
    }

    /// Applies the cycle and depth guard. Writes Null and returns `None` when
    /// the container must not be descended into.
    fn enter(&mut self, container: &H::Value) -> Option<H::Identity> {
        let identity = self.host.identity(container);
        if self.open.contains(&identity) {
            debug!(depth = self.stack.len(), "cyclic reference encoded as null");
        } else if self.stack.len() > self.options.max_depth {
            debug!(max_depth = self.options.max_depth, "depth ceiling reached, encoded as null");
        } else {
            self.open.insert(identity);
            return Some(identity);
        }
        self.writer.push_tag(Tag::Null);
        None
    }

    /// Collects the properties that will be written, in enumeration order.
    ///
    /// Missing, undefined and callable values are left out so the map count
    /// matches the pairs written.
    fn stage_properties(&self, object: &H::Value) -> Vec<(H::Key, H::Value)> {
        let keys = self.host.own_enumerable_string_keys(object);
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            match self.host.get_own(object, &key) {
                Some(value) if !self.host.classify(&value).is_excluded_from_map() => {
                    entries.push((key, value));
                }
                _ => {}
            }
        }
        entries
    }
}

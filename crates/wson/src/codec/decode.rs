//! WSON decoding.
//!
//! The decoder is permissive. An unknown tag decodes as Null, a container
//! whose declared count runs past the end of the input keeps the elements read
//! so far, and a value cut off mid-payload is dropped. Decoding never fails;
//! use [`crate::validate`] when strictness is needed.
//!
//! Containers are tracked on an explicit frame stack, so nesting depth is
//! limited by the input length rather than by the native call stack.

use tracing::{debug, trace};

use crate::cache::{CacheRegistry, ContextToken, IdentifierCache, Interner};
use crate::codec::cursor::Reader;
use crate::codec::tag::Tag;
use crate::error::DecodeError;
use crate::host::{BigNumberKind, DecodeHost};
use crate::model::text::TextView;

/// Decodes one value using only a call-scoped key cache.
pub fn decode<H: DecodeHost>(input: &[u8], host: &mut H) -> H::Value {
    Decoder::new(input, host, None).run()
}

/// Decodes one value, interning map keys through a process-scoped cache.
pub fn decode_with_cache<H: DecodeHost>(
    input: &[u8],
    host: &mut H,
    cache: &mut IdentifierCache<H::Identifier>,
) -> H::Value {
    Decoder::new(input, host, Some(cache)).run()
}

/// Decodes one value with the cache of the given context.
///
/// A context without an initialized cache falls back to call-scoped caching.
pub fn decode_in_context<H: DecodeHost>(
    input: &[u8],
    host: &mut H,
    registry: &mut CacheRegistry<H::Identifier>,
    token: ContextToken,
) -> H::Value {
    let cache = registry.get_mut(token);
    if cache.is_none() {
        debug!(context = %token, "no identifier cache for context, using call cache only");
    }
    Decoder::new(input, host, cache).run()
}

/// An open container awaiting its elements.
enum Frame<'a, V, I> {
    Array {
        container: V,
        count: u32,
        done: u32,
    },
    Map {
        container: V,
        count: u32,
        done: u32,
        pending: Option<(TextView<'a>, I)>,
    },
}

impl<'a, V, I> Frame<'a, V, I> {
    fn is_complete(&self) -> bool {
        match self {
            Frame::Array { count, done, .. } | Frame::Map { count, done, .. } => done >= count,
        }
    }

    fn into_container(self) -> V {
        match self {
            Frame::Array { container, .. } | Frame::Map { container, .. } => container,
        }
    }
}

enum Step<V> {
    /// A complete value.
    Done(V),
    /// A container frame was pushed.
    Opened,
    /// The input ended mid-value.
    Truncated,
}

struct Decoder<'a, 'h, 'c, H: DecodeHost> {
    reader: Reader<'a>,
    host: &'h mut H,
    interner: Interner<'c, H::Identifier>,
    stack: Vec<Frame<'a, H::Value, H::Identifier>>,
}

impl<'a, 'h, 'c, H: DecodeHost> Decoder<'a, 'h, 'c, H> {
    fn new(
        input: &'a [u8],
        host: &'h mut H,
        cache: Option<&'c mut IdentifierCache<H::Identifier>>,
    ) -> Self {
        Self {
            reader: Reader::new(input),
            host,
            interner: Interner::new(cache),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> H::Value {
        let mut step = self.begin_value();
        loop {
            match step {
                Step::Done(value) => match self.stack.last_mut() {
                    None => return value,
                    Some(frame) => attach(self.host, frame, value),
                },
                Step::Opened => {}
                Step::Truncated => {
                    self.reader.exhaust();
                    if self.stack.is_empty() {
                        return self.host.null();
                    }
                }
            }
            step = self.advance();
        }
    }

    /// Reads the next child of the top frame, or closes the frame.
    fn advance(&mut self) -> Step<H::Value> {
        let Some(frame) = self.stack.last_mut() else {
            return Step::Truncated;
        };
        if frame.is_complete() || !self.reader.has_next() {
            if !frame.is_complete() {
                trace!(offset = self.reader.position(), "input ended before container count");
            }
            return match self.stack.pop() {
                Some(frame) => Step::Done(frame.into_container()),
                None => Step::Truncated,
            };
        }
        if let Frame::Map { pending, .. } = frame {
            match self.reader.next_len_prefixed("map key") {
                Ok(bytes) => {
                    let key = TextView::new(bytes);
                    let name = self.interner.intern(self.host, key);
                    *pending = Some((key, name));
                }
                Err(e) => {
                    trace!(%e, "map key truncated");
                    return Step::Truncated;
                }
            }
        }
        self.begin_value()
    }

    fn begin_value(&mut self) -> Step<H::Value> {
        let offset = self.reader.position();
        let byte = match self.reader.next_tag() {
            Ok(byte) => byte,
            Err(_) => return Step::Truncated,
        };
        let Some(tag) = Tag::from_u8(byte) else {
            debug!(tag = byte, offset, "unknown tag, decoding as null");
            return Step::Done(self.host.null());
        };
        match self.read_tagged(tag) {
            Ok(step) => step,
            Err(e) => {
                trace!(%e, offset, "value truncated");
                Step::Truncated
            }
        }
    }

    fn read_tagged(&mut self, tag: Tag) -> Result<Step<H::Value>, DecodeError> {
        let reader = &mut self.reader;
        let host = &mut *self.host;
        let value = match tag {
            Tag::Null => host.null(),
            Tag::True => host.boolean(true),
            Tag::False => host.boolean(false),
            Tag::Int => host.int32(reader.next_i32("int")?),
            Tag::Double => host.float64(reader.next_f64("double")?),
            Tag::Float => host.float64(reader.next_f32("float")? as f64),
            Tag::Long => {
                let long = reader.next_i64("long")?;
                match i32::try_from(long) {
                    Ok(int) => host.int32(int),
                    Err(_) => host.float64(long as f64),
                }
            }
            Tag::String => host.string(TextView::new(reader.next_len_prefixed("string")?)),
            Tag::BigInt => {
                let text = TextView::new(reader.next_len_prefixed("big int")?);
                host.big_number(BigNumberKind::Integer, text)
            }
            Tag::BigDecimal => {
                let text = TextView::new(reader.next_len_prefixed("big decimal")?);
                host.big_number(BigNumberKind::Decimal, text)
            }
            Tag::Array => {
                let count = reader.next_var_uint("array count")?;
                let container = host.new_array(count.min(reader.remaining_len() as u32));
                self.stack.push(Frame::Array {
                    container,
                    count,
                    done: 0,
                });
                return Ok(Step::Opened);
            }
            Tag::Map => {
                let count = reader.next_var_uint("map count")?;
                let container = host.new_object();
                self.stack.push(Frame::Map {
                    container,
                    count,
                    done: 0,
                    pending: None,
                });
                return Ok(Step::Opened);
            }
        };
        Ok(Step::Done(value))
    }
}

/// Stores a finished child in its parent frame.
fn attach<H: DecodeHost>(
    host: &mut H,
    frame: &mut Frame<'_, H::Value, H::Identifier>,
    value: H::Value,
) {
    match frame {
        Frame::Array {
            container, done, ..
        } => {
            host.set_indexed(container, *done, value);
            *done += 1;
        }
        Frame::Map {
            container,
            done,
            pending,
            ..
        } => {
            if let Some((key, name)) = pending.take() {
                host.set_property(container, key, &name, value);
            }
            *done += 1;
        }
    }
}

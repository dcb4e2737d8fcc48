//! Identifier interning cache for decoded map keys.
//!
//! Tabular payloads repeat the same keys in every row. Interning a key through
//! the host is the expensive part of decoding a map, so keys are cached in two
//! direct-mapped tiers:
//!
//! - a process-scoped [`IdentifierCache`], owned by one execution context and
//!   reused across decode calls;
//! - a call-scoped [`CallCache`], discarded when the decode call returns.
//!
//! Slots never chain. Every hit re-checks hash, length and bytes, so a
//! collision or a stale slot only costs a fresh intern.

mod registry;

pub use registry::{CacheRegistry, ContextToken};

use tracing::trace;

use crate::host::DecodeHost;
use crate::limits::{
    CALL_CACHE_SLOTS, CALL_CACHE_SLOTS_STANDALONE, MAX_CACHED_KEY_BYTES, MAX_CACHED_KEY_UNITS,
    PROCESS_CACHE_SLOTS,
};
use crate::model::text::TextView;

const DJB2_SEED: u32 = 5381;

#[inline]
fn djb2_step(hash: u32, unit: u16) -> u32 {
    (hash << 5).wrapping_add(hash).wrapping_add(unit as u32)
}

/// djb2 over every code unit.
pub fn full_hash(key: TextView<'_>) -> u32 {
    key.units().fold(DJB2_SEED, djb2_step)
}

/// djb2 over the first and last code unit only.
pub fn sampled_hash(key: TextView<'_>) -> u32 {
    let len = key.len();
    let mut hash = djb2_step(DJB2_SEED, key.unit(0).unwrap_or(0));
    if len > 1 {
        hash = djb2_step(hash, key.unit(len - 1).unwrap_or(0));
    }
    hash
}

/// Whether a key may be cached at all. Long keys and keys starting outside
/// printable ASCII are interned directly.
#[inline]
fn is_cacheable(key: TextView<'_>) -> bool {
    let len = key.len();
    match key.unit(0) {
        Some(first) => len <= MAX_CACHED_KEY_UNITS && (1..127).contains(&first),
        None => false,
    }
}

struct Entry<I> {
    bytes: [u8; MAX_CACHED_KEY_BYTES],
    len: u8,
    hash: u32,
    identifier: I,
}

impl<I> Entry<I> {
    fn new(hash: u32, key: &[u8], identifier: I) -> Self {
        let mut bytes = [0u8; MAX_CACHED_KEY_BYTES];
        bytes[..key.len()].copy_from_slice(key);
        Self {
            bytes,
            len: key.len() as u8,
            hash,
            identifier,
        }
    }

    #[inline]
    fn matches(&self, hash: u32, key: &[u8]) -> bool {
        self.hash == hash && self.len as usize == key.len() && &self.bytes[..key.len()] == key
    }
}

/// Power-of-two table of optional entries.
struct Slots<I> {
    slots: Box<[Option<Entry<I>>]>,
}

impl<I> Slots<I> {
    fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    #[inline]
    fn index(&self, hash: u32) -> usize {
        hash as usize & (self.slots.len() - 1)
    }

    fn lookup(&self, hash: u32, key: &[u8]) -> Option<&I> {
        match &self.slots[self.index(hash)] {
            Some(entry) if entry.matches(hash, key) => Some(&entry.identifier),
            _ => None,
        }
    }

    fn is_vacant(&self, hash: u32) -> bool {
        self.slots[self.index(hash)].is_none()
    }

    fn store(&mut self, hash: u32, key: &[u8], identifier: I) {
        let index = self.index(hash);
        self.slots[index] = Some(Entry::new(hash, key, identifier));
    }

    fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

/// Hit and miss counts of a process-scoped cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Process-scoped identifier cache bound to one execution context.
///
/// A slot is claimed by the first key that lands in it and kept until the
/// cache is cleared or destroyed. Keys that collide with an occupied slot fall
/// back to the call-scoped tier.
pub struct IdentifierCache<I> {
    slots: Slots<I>,
    stats: CacheStats,
}

impl<I: Clone> IdentifierCache<I> {
    pub fn new() -> Self {
        Self {
            slots: Slots::new(PROCESS_CACHE_SLOTS),
            stats: CacheStats::default(),
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.slots.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drops every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.stats = CacheStats::default();
    }
}

impl<I: Clone> Default for IdentifierCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Call-scoped identifier cache. Allocated on the first cacheable key.
pub struct CallCache<I> {
    capacity: usize,
    slots: Option<Slots<I>>,
}

impl<I> CallCache<I> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: None,
        }
    }

    fn slots(&mut self) -> &mut Slots<I> {
        let capacity = self.capacity;
        self.slots.get_or_insert_with(|| Slots::new(capacity))
    }
}

/// Per-call key interning over both cache tiers.
pub(crate) struct Interner<'c, I> {
    process: Option<&'c mut IdentifierCache<I>>,
    local: CallCache<I>,
}

impl<'c, I: Clone> Interner<'c, I> {
    pub(crate) fn new(process: Option<&'c mut IdentifierCache<I>>) -> Self {
        let capacity = if process.is_some() {
            CALL_CACHE_SLOTS
        } else {
            CALL_CACHE_SLOTS_STANDALONE
        };
        Self {
            process,
            local: CallCache::new(capacity),
        }
    }

    /// Returns the identifier for `key`, interning through the host on a miss.
    pub(crate) fn intern<H>(&mut self, host: &mut H, key: TextView<'_>) -> I
    where
        H: DecodeHost<Identifier = I>,
    {
        if !is_cacheable(key) {
            return host.intern(key);
        }
        let bytes = &key.as_bytes()[..key.len() * 2];

        let Some(process) = self.process.as_deref_mut() else {
            let hash = sampled_hash(key);
            let local = self.local.slots();
            if let Some(identifier) = local.lookup(hash, bytes) {
                return identifier.clone();
            }
            let identifier = host.intern(key);
            local.store(hash, bytes, identifier.clone());
            return identifier;
        };

        let hash = full_hash(key);
        if let Some(identifier) = process.slots.lookup(hash, bytes) {
            process.stats.hits += 1;
            return identifier.clone();
        }
        process.stats.misses += 1;

        let local = self.local.slots();
        if let Some(identifier) = local.lookup(hash, bytes) {
            return identifier.clone();
        }

        let identifier = host.intern(key);
        if process.slots.is_vacant(hash) {
            process.slots.store(hash, bytes, identifier.clone());
        } else {
            trace!(hash, "process cache slot taken, using call cache");
            local.store(hash, bytes, identifier.clone());
        }
        identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::text::Text;

    /// Host that only interns, counting calls.
    #[derive(Default)]
    struct CountingHost {
        interned: usize,
    }

    impl DecodeHost for CountingHost {
        type Value = ();
        type Identifier = Text;

        fn null(&mut self) {}
        fn boolean(&mut self, _: bool) {}
        fn int32(&mut self, _: i32) {}
        fn float64(&mut self, _: f64) {}
        fn string(&mut self, _: TextView<'_>) {}
        fn new_array(&mut self, _: u32) {}
        fn new_object(&mut self) {}
        fn set_indexed(&mut self, _: &mut (), _: u32, _: ()) {}
        fn set_named(&mut self, _: &mut (), _: &Text, _: ()) {}

        fn intern(&mut self, key: TextView<'_>) -> Text {
            self.interned += 1;
            key.to_text()
        }
    }

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_hashes() {
        let key = utf16le("ab");
        let view = TextView::new(&key);
        let expected = djb2_step(djb2_step(DJB2_SEED, b'a' as u16), b'b' as u16);
        assert_eq!(full_hash(view), expected);
        assert_eq!(sampled_hash(view), expected);

        let long = utf16le("axb");
        let long_view = TextView::new(&long);
        assert_eq!(sampled_hash(long_view), expected);
        assert_ne!(full_hash(long_view), expected);
    }

    #[test]
    fn test_cacheable_keys() {
        let ok = utf16le("name");
        assert!(is_cacheable(TextView::new(&ok)));
        assert!(!is_cacheable(TextView::new(&[])));
        let unicode = utf16le("\u{e9}t\u{e9}");
        assert!(!is_cacheable(TextView::new(&unicode)));
        let long = utf16le(&"k".repeat(MAX_CACHED_KEY_UNITS + 1));
        assert!(!is_cacheable(TextView::new(&long)));
        let max = utf16le(&"k".repeat(MAX_CACHED_KEY_UNITS));
        assert!(is_cacheable(TextView::new(&max)));
    }

    #[test]
    fn test_call_cache_hits_repeated_keys() {
        let mut host = CountingHost::default();
        let mut interner = Interner::<Text>::new(None);
        let key = utf16le("id");
        for _ in 0..10 {
            assert_eq!(interner.intern(&mut host, TextView::new(&key)), "id");
        }
        assert_eq!(host.interned, 1);
    }

    #[test]
    fn test_sampled_hash_collision_is_reverified() {
        // Same first and last unit, so same slot in the call cache.
        let mut host = CountingHost::default();
        let mut interner = Interner::<Text>::new(None);
        let a = utf16le("axb");
        let b = utf16le("ayb");
        assert_eq!(interner.intern(&mut host, TextView::new(&a)), "axb");
        assert_eq!(interner.intern(&mut host, TextView::new(&b)), "ayb");
        assert_eq!(interner.intern(&mut host, TextView::new(&a)), "axb");
        assert_eq!(host.interned, 3);
    }

    #[test]
    fn test_process_cache_survives_calls() {
        let mut host = CountingHost::default();
        let mut cache = IdentifierCache::<Text>::new();
        let key = utf16le("title");
        for _ in 0..3 {
            let mut interner = Interner::new(Some(&mut cache));
            assert_eq!(interner.intern(&mut host, TextView::new(&key)), "title");
        }
        assert_eq!(host.interned, 1);
        assert_eq!(cache.stats(), CacheStats { hits: 2, misses: 1 });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_process_slot_collision_falls_back_to_call_cache() {
        let mut host = CountingHost::default();
        let mut cache = IdentifierCache::<Text>::new();
        // Find two keys sharing a process slot.
        let first = utf16le("k0");
        let slot = full_hash(TextView::new(&first)) as usize & (PROCESS_CACHE_SLOTS - 1);
        let second = (1..100_000)
            .map(|i| utf16le(&format!("k{i}")))
            .find(|k| full_hash(TextView::new(k)) as usize & (PROCESS_CACHE_SLOTS - 1) == slot)
            .unwrap();

        let mut interner = Interner::new(Some(&mut cache));
        interner.intern(&mut host, TextView::new(&first));
        interner.intern(&mut host, TextView::new(&second));
        interner.intern(&mut host, TextView::new(&second));
        assert_eq!(host.interned, 2);
        drop(interner);

        // The first key kept the process slot; the second lived in the call cache.
        assert_eq!(cache.len(), 1);
        let mut interner = Interner::new(Some(&mut cache));
        interner.intern(&mut host, TextView::new(&first));
        assert_eq!(host.interned, 2);
        interner.intern(&mut host, TextView::new(&second));
        assert_eq!(host.interned, 3);
    }

    #[test]
    fn test_uncacheable_keys_always_intern() {
        let mut host = CountingHost::default();
        let mut cache = IdentifierCache::<Text>::new();
        let mut interner = Interner::new(Some(&mut cache));
        let key = utf16le("\u{4e2d}\u{6587}");
        interner.intern(&mut host, TextView::new(&key));
        interner.intern(&mut host, TextView::new(&key));
        interner.intern(&mut host, TextView::new(&[]));
        assert_eq!(host.interned, 3);
        drop(interner);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut host = CountingHost::default();
        let mut cache = IdentifierCache::<Text>::new();
        let key = utf16le("a");
        Interner::new(Some(&mut cache)).intern(&mut host, TextView::new(&key));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), PROCESS_CACHE_SLOTS);
    }
}

//! Wire and traversal limits.

/// Maximum number of open containers on the encoder stack before the next
/// container is replaced by Null.
pub const MAX_DEPTH: usize = 40_000;

/// Maximum bytes in a varuint (enough for a `u32`).
pub const MAX_VARUINT_BYTES: usize = 5;

/// Slot count of the process-scoped identifier cache. Must be a power of two.
pub const PROCESS_CACHE_SLOTS: usize = 4 * 1024;

/// Slot count of the call-scoped cache when a process-scoped cache is in play.
/// Must be a power of two.
pub const CALL_CACHE_SLOTS: usize = 64;

/// Slot count of the call-scoped cache when it is the only tier.
pub const CALL_CACHE_SLOTS_STANDALONE: usize = CALL_CACHE_SLOTS * 2;

/// Longest key, in code units, eligible for caching.
pub const MAX_CACHED_KEY_UNITS: usize = 32;

/// Largest byte length of a cacheable key.
pub const MAX_CACHED_KEY_BYTES: usize = MAX_CACHED_KEY_UNITS * 2;

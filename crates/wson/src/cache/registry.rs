//! Process-scoped caches keyed by execution context.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::debug;
use uuid::Uuid;

use crate::cache::IdentifierCache;
use crate::error::CacheError;

/// Identifies one execution context of the host runtime.
///
/// Identifiers interned in one context are meaningless in another, so each
/// context owns its own cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextToken(Uuid);

impl ContextToken {
    /// Creates a fresh random token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContextToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Owns the process-scoped identifier cache of each initialized context.
///
/// The registry is not synchronized. Contexts decoding on different threads
/// need their own registry or an external lock.
pub struct CacheRegistry<I> {
    caches: FxHashMap<ContextToken, IdentifierCache<I>>,
}

impl<I: Clone> CacheRegistry<I> {
    pub fn new() -> Self {
        Self {
            caches: FxHashMap::default(),
        }
    }

    /// Creates the cache for `token`. Must be called once per context.
    pub fn init(&mut self, token: ContextToken) -> Result<(), CacheError> {
        if self.caches.contains_key(&token) {
            return Err(CacheError::AlreadyInitialized(token));
        }
        self.caches.insert(token, IdentifierCache::new());
        debug!(context = %token, "identifier cache initialized");
        Ok(())
    }

    /// Releases the cache for `token` at context teardown.
    pub fn destroy(&mut self, token: ContextToken) -> Result<(), CacheError> {
        let cache = self
            .caches
            .remove(&token)
            .ok_or(CacheError::NotInitialized(token))?;
        debug!(context = %token, entries = cache.len(), stats = ?cache.stats(), "identifier cache destroyed");
        Ok(())
    }

    pub fn is_initialized(&self, token: ContextToken) -> bool {
        self.caches.contains_key(&token)
    }

    pub fn get(&self, token: ContextToken) -> Option<&IdentifierCache<I>> {
        self.caches.get(&token)
    }

    pub fn get_mut(&mut self, token: ContextToken) -> Option<&mut IdentifierCache<I>> {
        self.caches.get_mut(&token)
    }

    /// Number of initialized contexts.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

impl<I: Clone> Default for CacheRegistry<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_and_destroy() {
        let mut registry = CacheRegistry::<u32>::new();
        let token = ContextToken::new();
        assert!(!registry.is_initialized(token));

        registry.init(token).unwrap();
        assert!(registry.is_initialized(token));
        assert!(registry.get_mut(token).is_some());

        registry.destroy(token).unwrap();
        assert!(registry.is_empty());
        assert!(registry.get(token).is_none());
    }

    #[test]
    fn test_double_init_rejected() {
        let mut registry = CacheRegistry::<u32>::new();
        let token = ContextToken::new();
        registry.init(token).unwrap();
        assert_eq!(registry.init(token), Err(CacheError::AlreadyInitialized(token)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_destroy_unknown_rejected() {
        let mut registry = CacheRegistry::<u32>::new();
        let token = ContextToken::new();
        assert_eq!(registry.destroy(token), Err(CacheError::NotInitialized(token)));
    }

    #[test]
    fn test_token_wraps_uuid() {
        let uuid = Uuid::new_v4();
        let token = ContextToken::from_uuid(uuid);
        assert_eq!(token.as_uuid(), &uuid);
        assert_eq!(token.to_string(), uuid.to_string());
        assert_ne!(ContextToken::new().as_uuid(), &uuid);
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut registry = CacheRegistry::<u32>::new();
        let a = ContextToken::new();
        let b = ContextToken::new();
        assert_ne!(a, b);
        registry.init(a).unwrap();
        registry.init(b).unwrap();
        registry.destroy(a).unwrap();
        assert!(registry.is_initialized(b));
    }
}

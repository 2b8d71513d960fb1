//! Token reuse across passes. Tokenizing is pure, so streams are cached
//! per source identity (xxh3 of the text) and shared by reference.

use crate::{tokenize, Token};
use std::collections::HashMap;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_128;

/// Cache of token streams keyed by source content hash.
///
/// Intended to live for one pipeline invocation: passes that tokenize the
/// same unmodified module source get the stream back without re-scanning.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: HashMap<u128, Arc<Vec<Token>>>,
}

impl TokenCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens for `source`, scanning on first sight only.
    pub fn tokens(&mut self, source: &str) -> Arc<Vec<Token>> {
        let key = xxh3_128(source.as_bytes());
        if let Some(cached) = self.entries.get(&key) {
            return Arc::clone(cached);
        }
        let tokens = Arc::new(tokenize(source));
        self.entries.insert(key, Arc::clone(&tokens));
        tokens
    }

    /// Number of distinct sources scanned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been scanned yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_source_is_scanned_once() {
        let mut cache = TokenCache::new();
        let first = cache.tokens("let a = 1;");
        let second = cache.tokens("let a = 1;");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_sources_get_distinct_streams() {
        let mut cache = TokenCache::new();
        cache.tokens("let a = 1;");
        cache.tokens("let b = 2;");
        assert_eq!(cache.len(), 2);
    }
}

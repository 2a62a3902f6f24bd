//! Per-owner naming state
//!
//! Several documents may share one sink (merge mode). Each `(prefix, directory)`
//! pair owns its own counter and dedup tables so that documents never collide
//! on file names nor deduplicate against each other.

use std::collections::HashMap;

/// Identity of an asset owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    pub prefix: String,
    pub directory: String,
}

impl ScopeKey {
    pub fn new(prefix: &str, directory: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            directory: directory.trim_end_matches('/').to_string(),
        }
    }
}

/// Counter and dedup tables of one owner.
#[derive(Debug, Default)]
pub struct AssetOwnerScope {
    next_index: usize,
    by_url: HashMap<String, String>,
    by_hash: HashMap<String, String>,
}

impl AssetOwnerScope {
    /// Claim the next file number (1-based).
    pub fn reserve_index(&mut self) -> usize {
        self.next_index += 1;
        self.next_index
    }

    pub fn path_for_url(&self, canonical_url: &str) -> Option<&str> {
        self.by_url.get(canonical_url).map(String::as_str)
    }

    pub fn path_for_hash(&self, hash: &str) -> Option<&str> {
        self.by_hash.get(hash).map(String::as_str)
    }

    pub fn remember_url(&mut self, canonical_url: String, path: String) {
        self.by_url.insert(canonical_url, path);
    }

    pub fn remember_hash(&mut self, hash: String, path: String) {
        self.by_hash.insert(hash, path);
    }

    /// Undo a URL reservation whose fetch failed, so a later attempt refetches.
    pub fn forget_url(&mut self, canonical_url: &str) {
        self.by_url.remove(canonical_url);
    }
}

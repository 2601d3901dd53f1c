//! Cache keys derived from query signatures.
//!
//! A `CacheKey` can only be built from a [`QuerySignature`], so every cache
//! lookup is keyed by the complete (criteria, query, sort, page) tuple.

use sha2::{Digest, Sha256};
use shopfront_core::QuerySignature;
use std::fmt;

/// SHA-256 digest (hex) of a signature's canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_signature(signature: &QuerySignature<'_>) -> Self {
        Self::from_canonical(&signature.canonical())
    }

    fn from_canonical(canonical: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

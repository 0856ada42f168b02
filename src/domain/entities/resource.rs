//! Resource identifiers.

/// Identifies a remote image resource, conceptually its URL.
///
/// Two keys that compare equal request the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Creates a new `ResourceKey` from any string-like input.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the URL this key refers to.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a stable, filesystem-safe identifier derived from the URL.
    ///
    /// The first 16 bytes of the SHA-256 digest, hex encoded.
    #[must_use]
    pub fn cache_id(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_id_length() {
        let key = ResourceKey::new("https://example.com/image.png");
        assert_eq!(key.cache_id().len(), 32);
        assert!(key.cache_id().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_cache_id_consistency() {
        let a = ResourceKey::new("img://a");
        let b = ResourceKey::from("img://a");
        assert_eq!(a, b);
        assert_eq!(a.cache_id(), b.cache_id());
    }

    #[test]
    fn test_distinct_urls_distinct_ids() {
        let a = ResourceKey::new("img://a");
        let b = ResourceKey::new("img://b");
        assert_ne!(a.cache_id(), b.cache_id());
    }
}

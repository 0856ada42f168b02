//! Cached response payloads and their metadata.

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Response metadata kept alongside a cached payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// HTTP status code of the response.
    pub status: u16,
    /// Content type (e.g., "image/png").
    #[serde(default)]
    pub content_type: Option<String>,
    /// Entity tag, if the server sent one.
    #[serde(default)]
    pub etag: Option<String>,
    /// When the payload was retrieved.
    pub fetched_at: DateTime<Utc>,
    /// Freshness lifetime in seconds from `Cache-Control: max-age`.
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl ResponseMetadata {
    /// Creates metadata for a successful response fetched now.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            etag: None,
            fetched_at: Utc::now(),
            max_age: None,
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the entity tag.
    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the freshness lifetime.
    #[must_use]
    pub const fn with_max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Sets the retrieval time.
    #[must_use]
    pub const fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Returns when this response stops being fresh, if ever.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let max_age = i64::try_from(self.max_age?).unwrap_or(i64::MAX);
        let lifetime = TimeDelta::try_seconds(max_age).unwrap_or(TimeDelta::MAX);
        Some(
            self.fetched_at
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }
}

/// Bytes and metadata produced by a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// Raw payload.
    pub bytes: Bytes,
    /// Response metadata.
    pub metadata: ResponseMetadata,
}

impl FetchedResponse {
    /// Creates a new fetched response.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, metadata: ResponseMetadata) -> Self {
        Self {
            bytes: bytes.into(),
            metadata,
        }
    }
}

/// Immutable cached payload for a resource.
///
/// Entries are replaced wholesale on store, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    bytes: Bytes,
    metadata: ResponseMetadata,
}

impl CachedEntry {
    /// Creates a new cached entry.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, metadata: ResponseMetadata) -> Self {
        Self {
            bytes: bytes.into(),
            metadata,
        }
    }

    /// Returns the cached payload.
    #[must_use]
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns the response metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns true if the entry may still be served at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.metadata.expires_at().is_none_or(|expiry| now < expiry)
    }
}

impl From<FetchedResponse> for CachedEntry {
    fn from(response: FetchedResponse) -> Self {
        Self::new(response.bytes, response.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_max_age_is_always_fresh() {
        let entry = CachedEntry::new(&b"data"[..], ResponseMetadata::new(200));
        let far_future = Utc::now() + TimeDelta::days(3650);
        assert!(entry.is_fresh(far_future));
    }

    #[test]
    fn test_entry_expires_after_max_age() {
        let fetched_at = Utc::now() - TimeDelta::seconds(120);
        let metadata = ResponseMetadata::new(200)
            .with_fetched_at(fetched_at)
            .with_max_age(60);
        let entry = CachedEntry::new(&b"data"[..], metadata);

        assert!(!entry.is_fresh(Utc::now()));
        assert!(entry.is_fresh(fetched_at + TimeDelta::seconds(30)));
    }

    #[test]
    fn test_huge_max_age_does_not_overflow() {
        let metadata = ResponseMetadata::new(200).with_max_age(u64::MAX);
        let entry = CachedEntry::new(&b"data"[..], metadata);
        assert!(entry.is_fresh(Utc::now()));
    }

    #[test]
    fn test_metadata_roundtrips_through_json() {
        let metadata = ResponseMetadata::new(200)
            .with_content_type("image/png")
            .with_etag("\"abc\"")
            .with_max_age(300);
        let json = serde_json::to_string(&metadata).unwrap();
        let parsed: ResponseMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn test_from_fetched_response() {
        let response = FetchedResponse::new(&b"payload"[..], ResponseMetadata::new(200));
        let entry = CachedEntry::from(response);
        assert_eq!(entry.bytes().as_ref(), b"payload");
        assert_eq!(entry.len(), 7);
    }
}

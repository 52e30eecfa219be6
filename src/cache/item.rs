//! Cache Item Module
//!
//! Defines the persisted record for a single cache entry and the lookup result
//! handed back to callers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// == Cache Item ==
/// A single cached entry as it is stored and persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheItem {
    /// Identifier, unique within a store
    pub key: String,
    /// Opaque payload
    pub value: String,
    /// Absolute expiry instant, None = never expires
    #[serde(default, with = "expiry")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheItem {
    // == Constructor ==
    /// Creates an item that never expires.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expires_at: None,
        }
    }

    /// Sets an absolute expiry instant.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Sets the expiry relative to now. Negative durations give an item
    /// that is already expired.
    pub fn expires_in(self, ttl: Duration) -> Self {
        self.expires_at(Utc::now() + ttl)
    }

    // == Is Expired ==
    /// Checks if the item has expired at `now`.
    ///
    /// An item is expired only when its expiry lies strictly before `now`;
    /// items without an expiry never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at < now)
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::zero())` if the item has expired
    /// - `Some(remaining)` if the item has an expiry that hasn't passed
    /// - `None` if the item never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|at| {
            let remaining = at - Utc::now();
            if remaining > Duration::zero() {
                remaining
            } else {
                Duration::zero()
            }
        })
    }
}

// == Lookup ==
/// Result of reading a key: a copy of the item plus whether it was found.
///
/// A miss carries a zero-value item. The hit indicator is computed by the
/// store on every read and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookup {
    item: CacheItem,
    hit: bool,
}

impl Lookup {
    pub(crate) fn hit(item: CacheItem) -> Self {
        Self { item, hit: true }
    }

    pub(crate) fn miss() -> Self {
        Self::default()
    }

    /// True when the key was present and unexpired.
    pub fn is_hit(&self) -> bool {
        self.hit
    }

    /// The found item, or a zero-value item on a miss.
    pub fn item(&self) -> &CacheItem {
        &self.item
    }

    /// Shortcut for `item().value`.
    pub fn value(&self) -> &str {
        &self.item.value
    }

    /// Converts into `Some(item)` on a hit and `None` on a miss.
    pub fn into_item(self) -> Option<CacheItem> {
        self.hit.then_some(self.item)
    }
}

/// Serde adapter for `Option<DateTime<Utc>>` expiries.
///
/// "Never expires" is written as the zero instant `0001-01-01T00:00:00Z`.
/// Decoding accepts that sentinel or `null` for "never expires".
mod expiry {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    fn zero_instant() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let at = value.unwrap_or_else(zero_instant);
        serializer.serialize_str(&at.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<DateTime<Utc>>::deserialize(deserializer)?;
        Ok(raw.filter(|at| *at != zero_instant()))
    }
}

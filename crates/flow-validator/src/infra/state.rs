//! In-process [`StateStore`] backed by a moka cache with per-entry expiry.

use {
    crate::domain::state::{Error, Key, StateStore},
    moka::{Expiry, future::Cache},
    serde_json::Value,
    std::time::{Duration, Instant},
};

/// Default lifetime of a recorded fact.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone, Debug)]
struct Entry {
    value: Value,
    ttl: Duration,
}

/// Every write restarts the entry's lifetime with the TTL it was written with.
struct WrittenTtl;

impl Expiry<Key, Entry> for WrittenTtl {
    fn expire_after_create(&self, _: &Key, entry: &Entry, _: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _: &Key,
        entry: &Entry,
        _: Instant,
        _: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

pub struct Memory {
    cache: Cache<Key, Entry>,
    default_ttl: Duration,
}

impl Memory {
    const MAX_ENTRIES: u64 = 100_000;

    pub fn new(default_ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(Self::MAX_ENTRIES)
                .expire_after(WrittenTtl)
                .build(),
            default_ttl,
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait::async_trait]
impl StateStore for Memory {
    async fn get(&self, key: &Key) -> Result<Option<Value>, Error> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: Key, value: Value, ttl: Option<Duration>) -> Result<(), Error> {
        let entry = Entry {
            value,
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        self.cache.insert(key, entry).await;
        Ok(())
    }
}

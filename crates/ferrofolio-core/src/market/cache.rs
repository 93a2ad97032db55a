//! Time-boxed reuse of the last market snapshot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::MarketSnapshot;

/// How a fetch interacts with the [`SnapshotCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve the cached snapshot while it is fresh, otherwise fetch and store. (Default)
    #[default]
    Use,
    /// Always fetch and replace the cached snapshot.
    Refresh,
    /// Always fetch; neither read nor write the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        matches!(self, Self::Use | Self::Refresh)
    }
}

#[derive(Debug)]
struct CacheInner {
    snapshot: Option<MarketSnapshot>,
    last_fetched_at: Option<Instant>,
    ttl: Duration,
}

impl CacheInner {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.last_fetched_at {
            Some(fetched_at) => now.duration_since(fetched_at) < self.ttl,
            None => false,
        }
    }
}

/// Holds at most one snapshot and the instant it was fetched.
///
/// Clones share the same slot. A TTL of zero disables the cache entirely.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                snapshot: None,
                last_fetched_at: None,
                ttl,
            })),
        }
    }

    pub fn from_secs(ttl_secs: u64) -> Self {
        Self::new(Duration::from_secs(ttl_secs))
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// The cached snapshot, if one was stored less than `ttl` ago.
    pub async fn get(&self) -> Option<MarketSnapshot> {
        let inner = self.inner.read().await;
        if inner.is_fresh(Instant::now()) {
            inner.snapshot.clone()
        } else {
            None
        }
    }

    /// Store `snapshot` as fetched now. No-op when the cache is disabled.
    pub async fn put(&self, snapshot: MarketSnapshot) {
        let mut inner = self.inner.write().await;
        if inner.ttl.is_zero() {
            return;
        }
        inner.snapshot = Some(snapshot);
        inner.last_fetched_at = Some(Instant::now());
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.snapshot = None;
        inner.last_fetched_at = None;
    }

    pub async fn last_fetched_at(&self) -> Option<Instant> {
        self.inner.read().await.last_fetched_at
    }

    pub async fn ttl(&self) -> Duration {
        self.inner.read().await.ttl
    }

    pub async fn is_disabled(&self) -> bool {
        self.inner.read().await.ttl.is_zero()
    }
}

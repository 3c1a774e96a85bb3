//! Freshness Cache
//!
//! Time-to-live memo in front of the CPMI data source. Each call kind has
//! its own slot and TTL, and entries are keyed by base URL so switching API
//! targets never serves another host's data. Expired entries are pruned
//! whenever a slot stores a fresh one.
//!
//! Failed fetches are memoised too: a struggling API sees at most one
//! request per TTL window per call kind.

use cpmi_client::{normalize_base_url, IndexSource};
use cpmi_core::{CpmiResult, CurrentSnapshot, HistorySnapshot};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// The three memoised upstream calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Current,
    History,
    Health,
}

/// Time-to-live per call kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub current: Duration,
    pub history: Duration,
    pub health: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            current: Duration::from_secs(30),
            history: Duration::from_secs(60),
            health: Duration::from_secs(10),
        }
    }
}

impl CacheTtls {
    pub fn for_kind(&self, kind: CallKind) -> Duration {
        match kind {
            CallKind::Current => self.current,
            CallKind::History => self.history,
            CallKind::Health => self.health,
        }
    }
}

/// A memoised outcome with staleness tracking
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// Reusable iff `now - fetched_at < ttl`
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < self.ttl
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }
}

/// One call kind's entries, keyed by normalised base URL.
///
/// The mutex is held across the fetch so concurrent readers of a stale
/// slot wait for one fetch instead of issuing their own.
struct MemoSlot<T> {
    kind: CallKind,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    live_fetches: AtomicU64,
}

impl<T: Clone> MemoSlot<T> {
    fn new(kind: CallKind, ttl: Duration) -> Self {
        Self {
            kind,
            ttl,
            entries: Mutex::new(HashMap::new()),
            live_fetches: AtomicU64::new(0),
        }
    }

    async fn get_or_fetch<F, Fut>(&self, base_url: &str, fetch: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let key = normalize_base_url(base_url).to_string();
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get(&key) {
            if entry.is_fresh_at(Instant::now()) {
                debug!("Cache hit: {:?} for {}", self.kind, key);
                return entry.value.clone();
            }
        }

        debug!("Cache miss: {:?} for {}, fetching", self.kind, key);
        self.live_fetches.fetch_add(1, Ordering::Relaxed);
        let value = fetch().await;
        let now = Instant::now();

        // Every store drops expired entries, whatever their URL
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh_at(now));
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!("Pruned {} stale {:?} entries", pruned, self.kind);
        }

        entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                fetched_at: now,
                ttl: self.ttl,
            },
        );

        value
    }

    async fn clear(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let cleared = entries.len();
        entries.clear();
        cleared
    }

    async fn stats(&self) -> SlotStats {
        let entries = self.entries.lock().await;
        let now = Instant::now();

        SlotStats {
            kind: self.kind,
            ttl_secs: self.ttl.as_secs(),
            entries: entries.len(),
            fresh: entries.values().filter(|e| e.is_fresh_at(now)).count(),
            live_fetches: self.live_fetches.load(Ordering::Relaxed),
        }
    }
}

/// TTL cache wrapping an [`IndexSource`]
pub struct FreshnessCache {
    source: Arc<dyn IndexSource>,
    current: MemoSlot<CpmiResult<CurrentSnapshot>>,
    history: MemoSlot<CpmiResult<HistorySnapshot>>,
    health: MemoSlot<bool>,
}

impl FreshnessCache {
    pub fn new(source: Arc<dyn IndexSource>, ttls: CacheTtls) -> Self {
        info!(
            "Freshness cache TTLs: current={}s history={}s health={}s",
            ttls.current.as_secs(),
            ttls.history.as_secs(),
            ttls.health.as_secs()
        );

        Self {
            source,
            current: MemoSlot::new(CallKind::Current, ttls.current),
            history: MemoSlot::new(CallKind::History, ttls.history),
            health: MemoSlot::new(CallKind::Health, ttls.health),
        }
    }

    /// Current index, from cache if fresh
    pub async fn current(&self, base_url: &str) -> CpmiResult<CurrentSnapshot> {
        let source = &self.source;
        self.current
            .get_or_fetch(base_url, || source.fetch_current(base_url))
            .await
    }

    /// Index history, from cache if fresh
    pub async fn history(&self, base_url: &str) -> CpmiResult<HistorySnapshot> {
        let source = &self.source;
        self.history
            .get_or_fetch(base_url, || source.fetch_history(base_url))
            .await
    }

    /// Health check result, from cache if fresh
    pub async fn health(&self, base_url: &str) -> bool {
        let source = &self.source;
        self.health
            .get_or_fetch(base_url, || source.check_health(base_url))
            .await
    }

    /// Drop every entry of every kind, forcing the next access to fetch
    pub async fn invalidate_all(&self) {
        let cleared = self.current.clear().await + self.history.clear().await + self.health.clear().await;
        info!("Freshness cache invalidated ({} entries dropped)", cleared);
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            current: self.current.stats().await,
            history: self.history.stats().await,
            health: self.health.stats().await,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub current: SlotStats,
    pub history: SlotStats,
    pub health: SlotStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotStats {
    pub kind: CallKind,
    pub ttl_secs: u64,
    pub entries: usize,
    pub fresh: usize,
    /// Fetches that went to the source since start-up
    pub live_fetches: u64,
}

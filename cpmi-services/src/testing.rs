//! Scripted data source shared by the unit tests of this crate

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cpmi_client::IndexSource;
use cpmi_core::{
    CategoryBreakdown, CategoryReading, CpmiError, CpmiResult, CurrentSnapshot, HistoryPoint,
    HistorySnapshot, HistoryStatistics, IndexReading,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scenario-one payload: index 104.3 with a single bitcoin category
pub fn sample_current() -> CurrentSnapshot {
    let mut categories = CategoryBreakdown::new();
    categories.insert(
        "bitcoin-markets".to_string(),
        CategoryReading {
            index: Some(110.0),
            weight: 0.4,
            interpretation: Some("Bullish".to_string()),
            deviation: Some(10.0),
        },
    );

    CurrentSnapshot {
        index: IndexReading {
            value: 104.3,
            interpretation: "Bullish".to_string(),
            last_update: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        },
        categories,
    }
}

pub fn sample_history(points: usize) -> HistorySnapshot {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    HistorySnapshot {
        history: (0..points)
            .map(|i| HistoryPoint {
                timestamp: start + chrono::Duration::minutes(i as i64 * 5),
                index: 100.0 + i as f64,
            })
            .collect(),
        statistics: HistoryStatistics {
            min: 100.0,
            max: 100.0 + points.saturating_sub(1) as f64,
            average: 100.0,
            volatility: 0.5,
            data_points: points as u64,
        },
    }
}

/// Source whose answers can be swapped between calls, counting every call
pub struct ScriptedSource {
    current: Mutex<CpmiResult<CurrentSnapshot>>,
    history: Mutex<CpmiResult<HistorySnapshot>>,
    healthy: Mutex<bool>,
    latency: Duration,
    current_calls: AtomicUsize,
    history_calls: AtomicUsize,
    health_calls: AtomicUsize,
    seen_base_urls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(
        current: CpmiResult<CurrentSnapshot>,
        history: CpmiResult<HistorySnapshot>,
        healthy: bool,
    ) -> Self {
        Self {
            current: Mutex::new(current),
            history: Mutex::new(history),
            healthy: Mutex::new(healthy),
            latency: Duration::ZERO,
            current_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            health_calls: AtomicUsize::new(0),
            seen_base_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn healthy() -> Self {
        Self::new(Ok(sample_current()), Ok(sample_history(3)), true)
    }

    pub fn failing(error: CpmiError) -> Self {
        Self::new(Err(error.clone()), Err(error), false)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_current(&self, current: CpmiResult<CurrentSnapshot>) {
        *self.current.lock() = current;
    }

    pub fn set_history(&self, history: CpmiResult<HistorySnapshot>) {
        *self.history.lock() = history;
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    /// Base URLs of current-index calls, in call order
    pub fn seen_base_urls(&self) -> Vec<String> {
        self.seen_base_urls.lock().clone()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl IndexSource for ScriptedSource {
    async fn fetch_current(&self, base_url: &str) -> CpmiResult<CurrentSnapshot> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_base_urls.lock().push(base_url.to_string());
        self.delay().await;
        self.current.lock().clone()
    }

    async fn fetch_history(&self, _base_url: &str) -> CpmiResult<HistorySnapshot> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.history.lock().clone()
    }

    async fn check_health(&self, _base_url: &str) -> bool {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        *self.healthy.lock()
    }
}

//! Refresh Scheduler
//!
//! Drives the fetch → render cycle. A single background task owns every
//! cycle: the auto-refresh interval is a `tokio` timer and manual refreshes
//! or settings edits arrive as commands over a channel, so the dashboard
//! keeps answering requests while it waits for the next tick.
//!
//! State machine per cycle:
//!
//! ```text
//! Idle -> Fetching -> Rendered     -> WaitingForInterval       (auto-refresh on)
//!                  |                -> WaitingForManualTrigger  (auto-refresh off)
//!                  \-> ErrorDisplay -> WaitingForManualTrigger
//! ```
//!
//! Interval ticks only start a cycle from WaitingForInterval, so after an
//! error the dashboard stays put until the user refreshes or edits settings.
//!
//! A manual refresh invalidates the cache before fetching. Interval refreshes
//! do not; they rely on the TTLs having run out, so a history entry younger
//! than its TTL is still served from cache.

use chrono::{DateTime, Utc};
use cpmi_core::{CpmiError, CpmiResult};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::freshness_cache::FreshnessCache;
use crate::render::{render_dashboard, DashboardView, Diagnostic};
use crate::settings::{DashboardSettings, SettingsUpdate};

/// Pending commands beyond this are rejected rather than queued
const COMMAND_BUFFER: usize = 16;

/// Where the scheduler currently is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Fetching,
    Rendered,
    ErrorDisplay,
    WaitingForInterval,
    WaitingForManualTrigger,
}

/// How the last completed cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    Rendered,
    ErrorDisplay,
}

impl From<CycleOutcome> for SchedulerState {
    fn from(outcome: CycleOutcome) -> Self {
        match outcome {
            CycleOutcome::Rendered => SchedulerState::Rendered,
            CycleOutcome::ErrorDisplay => SchedulerState::ErrorDisplay,
        }
    }
}

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    Startup,
    Manual,
    Interval,
    SettingsChanged,
}

/// Main panel of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardContent {
    /// No cycle has completed yet
    Loading,
    Ready { view: DashboardView },
    Unavailable { diagnostic: Diagnostic },
}

/// Published result of the most recent cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub state: SchedulerState,
    pub outcome: Option<CycleOutcome>,
    pub settings: DashboardSettings,
    pub content: DashboardContent,
    /// User-visible error notices from the current-index call
    pub notices: Vec<String>,
    /// `None` until the first health check
    pub api_healthy: Option<bool>,
    /// Completed cycles; bumped once the health check settles
    pub cycle: u64,
    pub last_trigger: Option<RefreshTrigger>,
    pub rendered_at: Option<DateTime<Utc>>,
    pub refresh_interval_secs: u64,
}

impl DashboardSnapshot {
    fn initial(settings: DashboardSettings, refresh_interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            outcome: None,
            settings,
            content: DashboardContent::Loading,
            notices: Vec::new(),
            api_healthy: None,
            cycle: 0,
            last_trigger: None,
            rendered_at: None,
            refresh_interval_secs: refresh_interval.as_secs(),
        }
    }

    pub fn view(&self) -> Option<&DashboardView> {
        match &self.content {
            DashboardContent::Ready { view } => Some(view),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match &self.content {
            DashboardContent::Unavailable { diagnostic } => Some(diagnostic),
            _ => None,
        }
    }
}

/// Configuration for the RefreshScheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between auto-refresh cycles
    pub refresh_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
        }
    }
}

/// Errors returned through a [`SchedulerHandle`]
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Refresh scheduler is not running")]
    Stopped,

    #[error("Refresh scheduler is busy, try again")]
    Busy,

    #[error(transparent)]
    Settings(#[from] CpmiError),
}

enum SchedulerCommand {
    Refresh {
        reply: oneshot::Sender<DashboardSnapshot>,
    },
    UpdateSettings {
        update: SettingsUpdate,
        reply: oneshot::Sender<CpmiResult<DashboardSnapshot>>,
    },
}

/// Owns the session settings and publishes a snapshot after every cycle
pub struct RefreshScheduler {
    cache: Arc<FreshnessCache>,
    settings: RwLock<DashboardSettings>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
    refresh_interval: Duration,
    /// Serialises cycles so only one writer publishes at a time
    cycle_lock: Mutex<()>,
    cycles: AtomicU64,
}

impl RefreshScheduler {
    pub fn new(
        cache: Arc<FreshnessCache>,
        settings: DashboardSettings,
        config: SchedulerConfig,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(DashboardSnapshot::initial(
            settings.clone(),
            config.refresh_interval,
        ));

        Self {
            cache,
            settings: RwLock::new(settings),
            snapshot_tx,
            refresh_interval: config.refresh_interval,
            cycle_lock: Mutex::new(()),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> DashboardSettings {
        self.settings.read().clone()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Watch published snapshots
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn cache(&self) -> &Arc<FreshnessCache> {
        &self.cache
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Run one full cycle and publish its snapshot
    pub async fn run_cycle(&self, trigger: RefreshTrigger) -> DashboardSnapshot {
        let _guard = self.cycle_lock.lock().await;

        if trigger == RefreshTrigger::Manual {
            self.cache.invalidate_all().await;
        }

        let settings = self.settings.read().clone();
        self.snapshot_tx.send_modify(|s| s.state = SchedulerState::Fetching);
        debug!("Refresh cycle ({:?}) against {}", trigger, settings.base_url);

        let base_url = settings.base_url.as_str();
        let current = self.cache.current(base_url).await;

        let (outcome, content, notices) = match current {
            Ok(current) => {
                let history = match self.cache.history(base_url).await {
                    Ok(history) => Some(history),
                    Err(e) => {
                        warn!("History unavailable, omitting trend section: {}", e);
                        None
                    }
                };

                let view = render_dashboard(&current, history.as_ref());
                (CycleOutcome::Rendered, DashboardContent::Ready { view }, Vec::new())
            }
            Err(e) => {
                warn!("Unable to fetch CPMI data from {}: {}", base_url, e);
                (
                    CycleOutcome::ErrorDisplay,
                    DashboardContent::Unavailable {
                        diagnostic: Diagnostic::from_error(&e),
                    },
                    vec![e.to_string()],
                )
            }
        };

        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;

        // ErrorDisplay ends the cycle: only a manual refresh or a settings
        // change leaves it
        let state = match outcome {
            CycleOutcome::Rendered if settings.auto_refresh => SchedulerState::WaitingForInterval,
            _ => SchedulerState::WaitingForManualTrigger,
        };

        let mut snapshot = DashboardSnapshot {
            state: outcome.into(),
            outcome: Some(outcome),
            settings,
            content,
            notices,
            api_healthy: self.snapshot_tx.borrow().api_healthy,
            cycle,
            last_trigger: Some(trigger),
            rendered_at: Some(Utc::now()),
            refresh_interval_secs: self.refresh_interval.as_secs(),
        };
        self.snapshot_tx.send_replace(DashboardSnapshot {
            cycle: cycle - 1,
            ..snapshot.clone()
        });

        // Checked after the content is published so a dead API shows its
        // diagnostic without also waiting out the health timeout
        snapshot.api_healthy = Some(self.cache.health(&snapshot.settings.base_url).await);
        snapshot.state = state;

        info!(
            "Refresh cycle {} ({:?}) finished: {:?}, now {:?}",
            cycle, trigger, outcome, state
        );

        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }

    fn apply_settings(&self, update: &SettingsUpdate) -> CpmiResult<bool> {
        let mut settings = self.settings.write();
        let changed = settings.apply(update)?;
        if changed {
            info!(
                "Dashboard settings updated: base_url={}, auto_refresh={}",
                settings.base_url, settings.auto_refresh
            );
        }
        Ok(changed)
    }

    /// Spawn the scheduler task. It runs the startup cycle, then services
    /// timer ticks and commands until every handle is dropped.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);

        let scheduler = Arc::clone(&self);
        tokio::spawn(async move {
            scheduler.run(commands_rx).await;
        });

        SchedulerHandle {
            scheduler: self,
            commands: commands_tx,
        }
    }

    async fn run(self: Arc<Self>, mut commands: mpsc::Receiver<SchedulerCommand>) {
        info!(
            "Refresh scheduler started with {}s interval",
            self.refresh_interval.as_secs()
        );

        self.run_cycle(RefreshTrigger::Startup).await;

        let mut ticker = interval_at(Instant::now() + self.refresh_interval, self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let waiting = self.snapshot_tx.borrow().state == SchedulerState::WaitingForInterval;
                    if waiting {
                        self.run_cycle(RefreshTrigger::Interval).await;
                    }
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        info!("Refresh scheduler stopped");
                        break;
                    };

                    match command {
                        SchedulerCommand::Refresh { reply } => {
                            let snapshot = self.run_cycle(RefreshTrigger::Manual).await;
                            ticker.reset();
                            let _ = reply.send(snapshot);
                        }
                        SchedulerCommand::UpdateSettings { update, reply } => {
                            let result = match self.apply_settings(&update) {
                                Ok(true) => {
                                    let snapshot =
                                        self.run_cycle(RefreshTrigger::SettingsChanged).await;
                                    ticker.reset();
                                    Ok(snapshot)
                                }
                                Ok(false) => Ok(self.snapshot()),
                                Err(e) => Err(e),
                            };
                            let _ = reply.send(result);
                        }
                    }
                }
            }
        }
    }
}

/// Cloneable handle used by the HTTP layer to talk to the scheduler task
#[derive(Clone)]
pub struct SchedulerHandle {
    scheduler: Arc<RefreshScheduler>,
    commands: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    /// Manual refresh: invalidate the cache and wait for the new snapshot
    pub async fn refresh(&self) -> Result<DashboardSnapshot, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.send(SchedulerCommand::Refresh { reply })?;
        rx.await.map_err(|_| SchedulerError::Stopped)
    }

    /// Change the base URL and/or the auto-refresh toggle. A change triggers
    /// a cycle; an identical update returns the current snapshot.
    pub async fn update_settings(
        &self,
        update: SettingsUpdate,
    ) -> Result<DashboardSnapshot, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.send(SchedulerCommand::UpdateSettings { update, reply })?;
        Ok(rx.await.map_err(|_| SchedulerError::Stopped)??)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.scheduler.snapshot()
    }

    pub fn settings(&self) -> DashboardSettings {
        self.scheduler.settings()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.scheduler.subscribe()
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        &self.scheduler
    }

    fn send(&self, command: SchedulerCommand) -> Result<(), SchedulerError> {
        self.commands.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SchedulerError::Busy,
            mpsc::error::TrySendError::Closed(_) => SchedulerError::Stopped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness_cache::CacheTtls;
    use crate::render::TrendStatus;
    use crate::testing::{sample_current, sample_history, ScriptedSource};
    use cpmi_core::Sentiment;

    const BASE: &str = "http://35.203.43.14:3000";

    fn scheduler_with(source: &Arc<ScriptedSource>, auto_refresh: bool) -> Arc<RefreshScheduler> {
        let cache = Arc::new(FreshnessCache::new(source.clone(), CacheTtls::default()));
        let settings = DashboardSettings::new(BASE, auto_refresh).unwrap();
        Arc::new(RefreshScheduler::new(cache, settings, SchedulerConfig::default()))
    }

    async fn wait_for_cycle(handle: &SchedulerHandle, cycle: u64) -> DashboardSnapshot {
        let mut rx = handle.subscribe();
        let snapshot = rx.wait_for(|s| s.cycle >= cycle).await.unwrap().clone();
        snapshot
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_snapshot_is_idle() {
        let source = Arc::new(ScriptedSource::healthy());
        let scheduler = scheduler_with(&source, true);

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.state, SchedulerState::Idle);
        assert_eq!(snapshot.content, DashboardContent::Loading);
        assert_eq!(snapshot.cycle, 0);
        assert_eq!(source.current_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_cycle_renders_headline() {
        let source = Arc::new(ScriptedSource::healthy());
        let scheduler = scheduler_with(&source, true);

        let snapshot = scheduler.run_cycle(RefreshTrigger::Startup).await;

        assert_eq!(snapshot.outcome, Some(CycleOutcome::Rendered));
        assert_eq!(snapshot.state, SchedulerState::WaitingForInterval);
        assert!(snapshot.notices.is_empty());
        assert_eq!(snapshot.api_healthy, Some(true));

        let view = snapshot.view().expect("rendered view");
        assert_eq!(view.headline.value_display, "104.30");
        assert_eq!(view.headline.delta_display, "+4.30");
        assert_eq!(view.headline.sentiment, Sentiment::Bullish);
        assert_eq!(view.categories.len(), 1);
        assert_eq!(view.categories[0].label, "Bitcoin Markets");
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_failure_shows_diagnostic() {
        let source = Arc::new(ScriptedSource::failing(CpmiError::api_status(500)));
        let scheduler = scheduler_with(&source, true);

        let snapshot = scheduler.run_cycle(RefreshTrigger::Startup).await;

        assert_eq!(snapshot.outcome, Some(CycleOutcome::ErrorDisplay));
        assert!(snapshot.view().is_none());
        let diagnostic = snapshot.diagnostic().expect("diagnostic panel");
        assert_eq!(diagnostic.message, "API Error: 500");
        assert_eq!(snapshot.notices, vec!["API Error: 500".to_string()]);
        assert_eq!(snapshot.state, SchedulerState::WaitingForManualTrigger);
        assert_eq!(source.history_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_history_point_is_collecting() {
        let source = Arc::new(ScriptedSource::new(
            Ok(sample_current()),
            Ok(sample_history(1)),
            true,
        ));
        let scheduler = scheduler_with(&source, true);

        let snapshot = scheduler.run_cycle(RefreshTrigger::Startup).await;
        let history = snapshot
            .view()
            .and_then(|v| v.history.clone())
            .expect("history section");

        assert_eq!(history.status, TrendStatus::Collecting);
        assert!(history.line.is_none());
        assert_eq!(history.statistics.data_points, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_failure_degrades_gracefully() {
        let source = Arc::new(ScriptedSource::new(
            Ok(sample_current()),
            Err(CpmiError::connection("connection refused")),
            true,
        ));
        let scheduler = scheduler_with(&source, true);

        let snapshot = scheduler.run_cycle(RefreshTrigger::Startup).await;

        assert_eq!(snapshot.outcome, Some(CycleOutcome::Rendered));
        assert!(snapshot.notices.is_empty());
        assert!(snapshot.view().unwrap().history.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_bypasses_ttl() {
        let source = Arc::new(ScriptedSource::healthy());
        let scheduler = scheduler_with(&source, true);

        scheduler.run_cycle(RefreshTrigger::Startup).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        scheduler.run_cycle(RefreshTrigger::Manual).await;

        assert_eq!(source.current_calls(), 2);
        assert_eq!(source.history_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_refresh_uses_cache_within_ttl() {
        let source = Arc::new(ScriptedSource::healthy());
        let scheduler = scheduler_with(&source, true);

        scheduler.run_cycle(RefreshTrigger::Startup).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        let snapshot = scheduler.run_cycle(RefreshTrigger::Interval).await;

        assert_eq!(source.current_calls(), 1);
        assert_eq!(snapshot.cycle, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_ticks_and_reuses_history() {
        let source = Arc::new(ScriptedSource::healthy());
        let handle = scheduler_with(&source, true).start();

        wait_for_cycle(&handle, 1).await;
        assert_eq!(source.current_calls(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        let snapshot = wait_for_cycle(&handle, 2).await;

        assert_eq!(snapshot.last_trigger, Some(RefreshTrigger::Interval));
        assert_eq!(source.current_calls(), 2);
        // 60s history TTL has not run out after one 30s interval
        assert_eq!(source.history_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_disabled_waits_for_manual_trigger() {
        let source = Arc::new(ScriptedSource::healthy());
        let handle = scheduler_with(&source, false).start();

        let snapshot = wait_for_cycle(&handle, 1).await;
        assert_eq!(snapshot.state, SchedulerState::WaitingForManualTrigger);

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(handle.snapshot().cycle, 1);
        assert_eq!(source.current_calls(), 1);

        let snapshot = handle.refresh().await.unwrap();
        assert_eq!(snapshot.cycle, 2);
        assert_eq!(snapshot.last_trigger, Some(RefreshTrigger::Manual));
        assert_eq!(source.current_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_cycle_stops_auto_refresh() {
        let source = Arc::new(ScriptedSource::failing(CpmiError::connection("timed out")));
        let handle = scheduler_with(&source, true).start();

        let snapshot = wait_for_cycle(&handle, 1).await;
        assert_eq!(snapshot.outcome, Some(CycleOutcome::ErrorDisplay));
        assert_eq!(snapshot.state, SchedulerState::WaitingForManualTrigger);

        source.set_current(Ok(sample_current()));
        tokio::time::sleep(Duration::from_secs(95)).await;

        assert_eq!(handle.snapshot().cycle, 1);
        assert_eq!(source.current_calls(), 1);

        // A manual refresh leaves ErrorDisplay and re-arms the interval
        let snapshot = handle.refresh().await.unwrap();
        assert_eq!(snapshot.outcome, Some(CycleOutcome::Rendered));
        assert_eq!(snapshot.state, SchedulerState::WaitingForInterval);

        tokio::time::sleep(Duration::from_secs(31)).await;
        let snapshot = wait_for_cycle(&handle, 3).await;
        assert_eq!(snapshot.last_trigger, Some(RefreshTrigger::Interval));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_display_is_published_before_health_check() {
        let source = Arc::new(
            ScriptedSource::failing(CpmiError::connection("timed out"))
                .with_latency(Duration::from_secs(5)),
        );
        let scheduler = scheduler_with(&source, true);
        let mut rx = scheduler.subscribe();

        let cycle = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run_cycle(RefreshTrigger::Startup).await })
        };

        let started = Instant::now();
        let published = rx
            .wait_for(|s| s.outcome == Some(CycleOutcome::ErrorDisplay))
            .await
            .unwrap()
            .clone();
        assert!(published.diagnostic().is_some());
        assert_eq!(published.state, SchedulerState::ErrorDisplay);
        assert_eq!(published.cycle, 0);
        assert_eq!(published.api_healthy, None);
        assert_eq!(started.elapsed(), Duration::from_secs(5));

        let snapshot = cycle.await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(snapshot.cycle, 1);
        assert_eq!(snapshot.api_healthy, Some(false));
        assert_eq!(snapshot.state, SchedulerState::WaitingForManualTrigger);
        assert_eq!(source.health_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_through_handle_recovers() {
        let source = Arc::new(ScriptedSource::failing(CpmiError::api_status(502)));
        let handle = scheduler_with(&source, true).start();
        wait_for_cycle(&handle, 1).await;

        source.set_current(Ok(sample_current()));
        source.set_history(Ok(sample_history(4)));
        let snapshot = handle.refresh().await.unwrap();

        assert_eq!(snapshot.outcome, Some(CycleOutcome::Rendered));
        let history = snapshot.view().unwrap().history.clone().unwrap();
        assert_eq!(history.status, TrendStatus::Trending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_base_url_change_fetches_new_target() {
        let source = Arc::new(ScriptedSource::healthy());
        let handle = scheduler_with(&source, true).start();
        wait_for_cycle(&handle, 1).await;

        let snapshot = handle
            .update_settings(SettingsUpdate {
                base_url: Some("http://10.0.0.5:3001/".to_string()),
                auto_refresh: None,
            })
            .await
            .unwrap();

        assert_eq!(snapshot.settings.base_url, "http://10.0.0.5:3001");
        assert_eq!(snapshot.last_trigger, Some(RefreshTrigger::SettingsChanged));
        assert_eq!(
            source.seen_base_urls(),
            vec![BASE.to_string(), "http://10.0.0.5:3001".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_settings_are_rejected() {
        let source = Arc::new(ScriptedSource::healthy());
        let handle = scheduler_with(&source, true).start();
        wait_for_cycle(&handle, 1).await;

        let result = handle
            .update_settings(SettingsUpdate {
                base_url: Some("not a url".to_string()),
                auto_refresh: None,
            })
            .await;

        assert!(matches!(result, Err(SchedulerError::Settings(CpmiError::Config(_)))));
        assert_eq!(handle.settings().base_url, BASE);
        assert_eq!(handle.snapshot().cycle, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggling_auto_refresh_changes_waiting_state() {
        let source = Arc::new(ScriptedSource::healthy());
        let handle = scheduler_with(&source, true).start();
        wait_for_cycle(&handle, 1).await;

        let snapshot = handle
            .update_settings(SettingsUpdate {
                base_url: None,
                auto_refresh: Some(false),
            })
            .await
            .unwrap();

        assert_eq!(snapshot.state, SchedulerState::WaitingForManualTrigger);
        assert!(!snapshot.settings.auto_refresh);
        // Settings cycles do not invalidate the cache
        assert_eq!(source.current_calls(), 1);
    }
}

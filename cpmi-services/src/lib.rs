//! Service layer for the CPMI dashboard
//!
//! Sits between the HTTP client and the web surface: a TTL cache in front
//! of the upstream API, the pure render pipeline that turns snapshots into
//! view models, the live session settings and the refresh scheduler that
//! ties them together.

pub mod freshness_cache;
pub mod render;
pub mod scheduler;
pub mod settings;

#[cfg(test)]
mod testing;

pub use freshness_cache::{CacheEntry, CacheStats, CacheTtls, CallKind, FreshnessCache, SlotStats};
pub use render::{
    render_dashboard, Bar, BarSeries, CategoryRow, DashboardView, Diagnostic, Gauge, Headline,
    HistorySection, LinePoint, LineSeries, StatisticsCard, TrendStatus, GUIDANCE_HINT,
    GUIDANCE_STEPS,
};
pub use scheduler::{
    CycleOutcome, DashboardContent, DashboardSnapshot, RefreshScheduler, RefreshTrigger,
    SchedulerConfig, SchedulerError, SchedulerHandle, SchedulerState,
};
pub use settings::{validate_base_url, DashboardSettings, SettingsUpdate};

//! Render pipeline
//!
//! Turns fetched snapshots into display structures: headline metric,
//! category table, bar series, gauges and the history trend. Stateless;
//! payloads are already typed by the client, so nothing here can fail.

use chrono::{DateTime, Utc};
use cpmi_core::{
    describe_category, display_label, CpmiError, CurrentSnapshot, HistorySnapshot, Sentiment,
    NEUTRAL_INDEX,
};
use serde::Serialize;
use tracing::warn;

/// Lower bound of the gauge axis unless a value falls below it
const GAUGE_MIN: f64 = 0.0;

/// Upper bound of the gauge axis unless a value exceeds it
const GAUGE_MAX: f64 = 200.0;

/// Colour stops of the category bar scale: bearish, neutral, bullish
const SCALE_STOPS: [(u8, u8, u8); 3] = [(0xff, 0x44, 0x44), (0xff, 0xbb, 0x33), (0x00, 0xc8, 0x51)];

/// Remediation steps shown when the current index cannot be fetched
pub const GUIDANCE_STEPS: &[&str] = &[
    "**API URL** is correct in the sidebar",
    "**VM is running** and accessible",
    "**API server** is running on the VM",
    "**Firewall** allows connections on port 3001",
];

pub const GUIDANCE_HINT: &str =
    "API should be running on your VM with: `PORT=3001 node src/api-server.js`";

/// Everything the page shows after a successful cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub headline: Headline,
    pub categories: Vec<CategoryRow>,
    pub category_bars: BarSeries,
    pub gauges: Vec<Gauge>,
    /// `None` when the history call failed; the trend section is omitted
    pub history: Option<HistorySection>,
    pub data_quality_warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub value: f64,
    /// `104.30`
    pub value_display: String,
    pub delta: f64,
    /// `+4.30`
    pub delta_display: String,
    pub sentiment: Sentiment,
    pub glyph: &'static str,
    pub interpretation: String,
    pub last_update: DateTime<Utc>,
    /// `HH:MM:SS`
    pub last_update_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub key: String,
    pub label: String,
    pub index: f64,
    pub index_display: String,
    pub weight: f64,
    /// `40.0%`
    pub weight_display: String,
    pub interpretation: String,
    pub deviation: Option<f64>,
    pub deviation_display: String,
    pub sentiment: Sentiment,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarSeries {
    pub title: &'static str,
    /// Dashed reference line
    pub reference: f64,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gauge {
    pub label: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub sentiment: Sentiment,
    pub glyph: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    /// Enough points for a trend line
    Trending,
    /// Fewer than two points so far
    Collecting,
}

impl TrendStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            TrendStatus::Trending => "Trending",
            TrendStatus::Collecting => "Collecting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySection {
    pub status: TrendStatus,
    /// Only present with at least two points
    pub line: Option<LineSeries>,
    pub statistics: StatisticsCard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub title: &'static str,
    pub reference: f64,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePoint {
    pub timestamp: DateTime<Utc>,
    pub index: f64,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsCard {
    pub min: String,
    pub max: String,
    pub average: String,
    pub volatility: String,
    pub data_points: u64,
}

/// Diagnostic panel that replaces the headline and charts when the
/// current-index call fails
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub error_kind: &'static str,
    pub message: String,
    pub guidance: &'static [&'static str],
    pub hint: &'static str,
}

impl Diagnostic {
    pub fn from_error(error: &CpmiError) -> Self {
        Self {
            error_kind: error.kind(),
            message: error.to_string(),
            guidance: GUIDANCE_STEPS,
            hint: GUIDANCE_HINT,
        }
    }
}

/// Build the dashboard view from the latest current snapshot and, if the
/// history call succeeded, the history snapshot
pub fn render_dashboard(
    current: &CurrentSnapshot,
    history: Option<&HistorySnapshot>,
) -> DashboardView {
    let mut warnings = Vec::new();

    let headline = render_headline(current, &mut warnings);
    let categories = render_category_rows(current, &mut warnings);
    let category_bars = render_category_bars(&categories);
    let gauges = categories.iter().map(render_gauge).collect();
    let history = history.map(render_history);

    for warning in &warnings {
        warn!("Data quality: {}", warning);
    }

    DashboardView {
        headline,
        categories,
        category_bars,
        gauges,
        history,
        data_quality_warnings: warnings,
    }
}

fn render_headline(current: &CurrentSnapshot, warnings: &mut Vec<String>) -> Headline {
    let value = current.index.value;
    if !Sentiment::is_trustworthy(value) {
        warnings.push(format!("index value {} is not a finite number", value));
    }

    let sentiment = Sentiment::classify(value);
    let delta = value - NEUTRAL_INDEX;

    Headline {
        value,
        value_display: format!("{:.2}", value),
        delta,
        delta_display: format!("{:+.2}", delta),
        sentiment,
        glyph: sentiment.glyph(),
        interpretation: current.index.interpretation.clone(),
        last_update: current.index.last_update,
        last_update_display: current.index.last_update.format("%H:%M:%S").to_string(),
    }
}

fn render_category_rows(current: &CurrentSnapshot, warnings: &mut Vec<String>) -> Vec<CategoryRow> {
    current
        .rendered_categories()
        .map(|(key, reading, index)| {
            if !Sentiment::is_trustworthy(index) {
                warnings.push(format!("category {} index {} is not a finite number", key, index));
            }

            CategoryRow {
                key: key.to_string(),
                label: display_label(key),
                index,
                index_display: format!("{:.2}", index),
                weight: reading.weight,
                weight_display: format!("{:.1}%", reading.weight * 100.0),
                interpretation: reading.interpretation.clone().unwrap_or_default(),
                deviation: reading.deviation,
                deviation_display: reading
                    .deviation
                    .map(|d| format!("{:.2}", d))
                    .unwrap_or_else(|| "-".to_string()),
                sentiment: Sentiment::classify(index),
                description: describe_category(key),
            }
        })
        .collect()
}

fn render_category_bars(rows: &[CategoryRow]) -> BarSeries {
    let finite = rows.iter().map(|r| r.index).filter(|v| v.is_finite());
    let lo = finite.clone().fold(f64::INFINITY, f64::min);
    let hi = finite.fold(f64::NEG_INFINITY, f64::max);

    BarSeries {
        title: "Category Indices",
        reference: NEUTRAL_INDEX,
        bars: rows
            .iter()
            .map(|row| Bar {
                label: row.label.clone(),
                value: row.index,
                color: scale_color(row.index, lo, hi),
            })
            .collect(),
    }
}

fn render_gauge(row: &CategoryRow) -> Gauge {
    let (min, max) = if row.index.is_finite() {
        (GAUGE_MIN.min(row.index.floor()), GAUGE_MAX.max(row.index.ceil()))
    } else {
        (GAUGE_MIN, GAUGE_MAX)
    };

    Gauge {
        label: row.label.clone(),
        value: row.index,
        min,
        max,
        sentiment: row.sentiment,
        glyph: row.sentiment.glyph(),
    }
}

fn render_history(history: &HistorySnapshot) -> HistorySection {
    let stats = &history.statistics;
    let statistics = StatisticsCard {
        min: format!("{:.2}", stats.min),
        max: format!("{:.2}", stats.max),
        average: format!("{:.2}", stats.average),
        volatility: format!("{:.2}", stats.volatility),
        data_points: stats.data_points,
    };

    if !history.has_trend() {
        return HistorySection {
            status: TrendStatus::Collecting,
            line: None,
            statistics,
        };
    }

    let points = history
        .history
        .iter()
        .map(|p| LinePoint {
            timestamp: p.timestamp,
            index: p.index,
            sentiment: Sentiment::classify(p.index),
        })
        .collect();

    HistorySection {
        status: TrendStatus::Trending,
        line: Some(LineSeries {
            title: "CPMI Historical Trend",
            reference: NEUTRAL_INDEX,
            points,
        }),
        statistics,
    }
}

/// Map `value` onto the red → amber → green scale spanning `[lo, hi]`
fn scale_color(value: f64, lo: f64, hi: f64) -> String {
    let t = if !value.is_finite() || !(hi > lo) {
        0.5
    } else {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    };

    let (from, to, local) = if t <= 0.5 {
        (SCALE_STOPS[0], SCALE_STOPS[1], t * 2.0)
    } else {
        (SCALE_STOPS[1], SCALE_STOPS[2], (t - 0.5) * 2.0)
    };

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * local).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        lerp(from.0, to.0),
        lerp(from.1, to.1),
        lerp(from.2, to.2)
    )
}

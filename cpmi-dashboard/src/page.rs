//! Server-rendered HTML page
//!
//! Builds the dashboard page from a published snapshot. Charts are inline
//! SVG so the page works without any client-side scripting; auto-refresh
//! is a `<meta http-equiv="refresh">` tag.

use cpmi_services::{
    BarSeries, CycleOutcome, DashboardContent, DashboardSnapshot, DashboardView, Diagnostic, HistorySection,
    LineSeries, TrendStatus,
};
use std::fmt::Write;

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 300.0;
const CHART_PAD: f64 = 40.0;

/// Line colour of the history trend
const TREND_COLOR: &str = "#667eea";

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f5f6fa; color: #262730; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 280px; padding: 1.5rem; background: #f0f2f6; box-sizing: border-box; }
.sidebar input[type=text] { width: 100%; padding: .4rem; box-sizing: border-box; }
.sidebar form { margin-bottom: 1rem; }
.main { flex: 1; padding: 1.5rem 2rem; }
.main-header { text-align: center; padding: 2rem 0; background: linear-gradient(90deg, #667eea 0%, #764ba2 100%); color: white; border-radius: 10px; margin-bottom: 2rem; }
.metrics { display: flex; gap: 1rem; margin-bottom: 2rem; }
.metric-card { flex: 1; background: white; padding: 1rem; border-radius: 10px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); border-left: 4px solid #667eea; }
.metric-card .value { font-size: 1.8rem; margin: .3rem 0; }
.bullish { color: #00C851; }
.bearish { color: #ff4444; }
.neutral { color: #ffbb33; }
.notice { padding: .8rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.notice.error { background: #ffe6e6; color: #a00; }
.notice.warning { background: #fff4e0; color: #8a5a00; }
.notice.info { background: #e6f0ff; color: #0a3a8a; }
.row { display: flex; gap: 1.5rem; align-items: flex-start; }
table { border-collapse: collapse; background: white; }
th, td { padding: .4rem .7rem; border-bottom: 1px solid #e6e6e6; text-align: left; }
.gauges { display: flex; flex-wrap: wrap; gap: 1rem; margin: 1rem 0 2rem; }
.gauge { background: white; padding: .8rem; border-radius: 8px; min-width: 180px; }
.gauge meter { width: 100%; }
.status-dot { display: inline-block; width: .7rem; height: .7rem; border-radius: 50%; margin-right: .4rem; }
footer { text-align: center; color: #666; border-top: 1px solid #ddd; margin-top: 2rem; padding-top: 1rem; }
"#;

/// Render the full dashboard page. `settings_error` is shown above the
/// content when a settings form submission was rejected.
pub fn render_page(snapshot: &DashboardSnapshot, settings_error: Option<&str>) -> String {
    let mut html = String::with_capacity(16 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>CPMI - Crypto Prediction Market Index</title>\n");
    // An error page stays put until the user refreshes or edits settings
    let errored = snapshot.outcome == Some(CycleOutcome::ErrorDisplay);
    if snapshot.settings.auto_refresh && !errored {
        let _ = writeln!(
            html,
            "<meta http-equiv=\"refresh\" content=\"{}\">",
            snapshot.refresh_interval_secs.max(1)
        );
    }
    let _ = writeln!(html, "<style>{}</style>\n</head>\n<body>", STYLE);

    html.push_str("<div class=\"layout\">\n");
    render_sidebar(&mut html, snapshot);

    html.push_str("<div class=\"main\">\n");
    html.push_str(
        "<div class=\"main-header\"><h1>📈 Crypto Prediction Market Index (CPMI)</h1>\
         <p>Real-time sentiment analysis from Polymarket crypto prediction markets</p></div>\n",
    );

    if let Some(error) = settings_error {
        let _ = writeln!(html, "<div class=\"notice error\">{}</div>", escape(error));
    }
    for notice in &snapshot.notices {
        let _ = writeln!(html, "<div class=\"notice error\">{}</div>", escape(notice));
    }

    match &snapshot.content {
        DashboardContent::Loading => {
            html.push_str("<div class=\"notice info\">Loading CPMI data...</div>\n");
        }
        DashboardContent::Ready { view } => render_view(&mut html, view),
        DashboardContent::Unavailable { diagnostic } => render_diagnostic(&mut html, diagnostic),
    }

    html.push_str(
        "<footer><p>CPMI - Crypto Prediction Market Index | Real-time Polymarket Data</p></footer>\n",
    );
    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

fn render_sidebar(html: &mut String, snapshot: &DashboardSnapshot) {
    let settings = &snapshot.settings;

    html.push_str("<div class=\"sidebar\">\n<h3>Settings</h3>\n");
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/settings\">\
         <label for=\"base_url\">API URL</label>\
         <input type=\"text\" id=\"base_url\" name=\"base_url\" value=\"{}\" \
         title=\"Enter your VM IP address where the API is running\">\
         <p><label><input type=\"checkbox\" name=\"auto_refresh\" value=\"on\"{}> \
         Auto-refresh ({}s)</label></p>\
         <button type=\"submit\">Apply</button></form>\n",
        escape(&settings.base_url),
        if settings.auto_refresh { " checked" } else { "" },
        snapshot.refresh_interval_secs
    );
    html.push_str(
        "<form method=\"post\" action=\"/refresh\"><button type=\"submit\">🔄 Refresh Data</button></form>\n",
    );

    let (dot, label) = match snapshot.api_healthy {
        Some(true) => ("#00C851", "API reachable"),
        Some(false) => ("#ff4444", "API unreachable"),
        None => ("#999999", "API status unknown"),
    };
    let _ = writeln!(
        html,
        "<p><span class=\"status-dot\" style=\"background: {}\"></span>{}</p>",
        dot, label
    );

    let _ = write!(html, "<p>Refresh cycle: {}</p>", snapshot.cycle);
    if let Some(rendered_at) = snapshot.rendered_at {
        let _ = write!(html, "<p>Rendered at {} UTC</p>", rendered_at.format("%H:%M:%S"));
    }
    html.push_str("</div>\n");
}

fn render_view(html: &mut String, view: &DashboardView) {
    let headline = &view.headline;
    let class = headline.sentiment.css_class();

    html.push_str("<div class=\"metrics\">\n");
    let _ = write!(
        html,
        "<div class=\"metric-card\"><h3>CPMI Index</h3><p class=\"value\">{}</p><p class=\"{}\">{}</p></div>\n",
        headline.value_display,
        class,
        headline.delta_display
    );
    let _ = write!(
        html,
        "<div class=\"metric-card\"><h3>Sentiment</h3><p class=\"value {}\">{} {}</p></div>\n",
        class,
        headline.glyph,
        escape(&headline.interpretation)
    );
    let _ = write!(
        html,
        "<div class=\"metric-card\"><h3>Last Update</h3><p class=\"value\">{}</p></div>\n",
        headline.last_update_display
    );
    html.push_str("</div>\n");

    for warning in &view.data_quality_warnings {
        let _ = writeln!(
            html,
            "<div class=\"notice warning\">Data quality: {}</div>",
            escape(warning)
        );
    }

    html.push_str("<h2>📊 Category Breakdown</h2>\n<div class=\"row\">\n<div>\n");
    render_bar_chart(html, &view.category_bars);
    html.push_str("</div>\n<div>\n<table>\n<thead><tr><th>Category</th><th>Index</th><th>Weight</th><th>Interpretation</th><th>Deviation</th></tr></thead>\n<tbody>\n");
    for row in &view.categories {
        let _ = writeln!(
            html,
            "<tr title=\"{}\"><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(row.description),
            escape(&row.label),
            row.sentiment.css_class(),
            row.index_display,
            row.weight_display,
            escape(&row.interpretation),
            row.deviation_display
        );
    }
    html.push_str("</tbody>\n</table>\n</div>\n</div>\n");

    if !view.gauges.is_empty() {
        html.push_str("<div class=\"gauges\">\n");
        for gauge in &view.gauges {
            let _ = writeln!(
                html,
                "<div class=\"gauge\"><div>{} {}</div>\
                 <meter min=\"{}\" max=\"{}\" low=\"99.99\" high=\"100.01\" optimum=\"{}\" value=\"{}\"></meter>\
                 <div class=\"{}\">{:.2}</div></div>",
                gauge.glyph,
                escape(&gauge.label),
                gauge.min,
                gauge.max,
                gauge.max,
                finite_or(gauge.value, 100.0),
                gauge.sentiment.css_class(),
                gauge.value
            );
        }
        html.push_str("</div>\n");
    }

    if let Some(history) = &view.history {
        render_history(html, history);
    }
}

fn render_history(html: &mut String, history: &HistorySection) {
    html.push_str("<h2>📈 Historical Trend</h2>\n");

    match (&history.line, history.status) {
        (Some(line), TrendStatus::Trending) => render_line_chart(html, line),
        _ => {
            let _ = writeln!(
                html,
                "<div class=\"notice info\">{}: {} data point(s) so far, a trend line needs at least two</div>",
                history.status.display_name(),
                history.statistics.data_points
            );
        }
    }

    let stats = &history.statistics;
    html.push_str("<div class=\"metrics\">\n");
    for (label, value) in [
        ("Min", &stats.min),
        ("Max", &stats.max),
        ("Average", &stats.average),
        ("Volatility", &stats.volatility),
    ] {
        let _ = writeln!(
            html,
            "<div class=\"metric-card\"><h3>{}</h3><p class=\"value\">{}</p></div>",
            label, value
        );
    }
    html.push_str("</div>\n");
}

fn render_diagnostic(html: &mut String, diagnostic: &Diagnostic) {
    html.push_str("<div class=\"notice error\">❌ Unable to fetch CPMI data. Please check:</div>\n<ol>\n");
    for step in diagnostic.guidance {
        let _ = writeln!(html, "<li>{}</li>", inline_markdown(step));
    }
    html.push_str("</ol>\n");
    let _ = writeln!(
        html,
        "<div class=\"notice info\">💡 {}</div>",
        inline_markdown(diagnostic.hint)
    );
}

fn render_bar_chart(html: &mut String, series: &BarSeries) {
    let top = series
        .bars
        .iter()
        .map(|b| b.value)
        .filter(|v| v.is_finite())
        .fold(series.reference, f64::max)
        * 1.1;
    let plot_w = CHART_WIDTH - 2.0 * CHART_PAD;
    let plot_h = CHART_HEIGHT - 2.0 * CHART_PAD;
    let y = |v: f64| CHART_PAD + plot_h - (v.clamp(0.0, top) / top) * plot_h;

    open_svg(html, series.title);

    let slot = plot_w / series.bars.len().max(1) as f64;
    for (i, bar) in series.bars.iter().enumerate() {
        let value = finite_or(bar.value, 0.0);
        let x = CHART_PAD + slot * i as f64 + slot * 0.15;
        let top_y = y(value);
        let _ = writeln!(
            html,
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"><title>{}: {:.2}</title></rect>\
             <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"middle\">{}</text>",
            x,
            top_y,
            slot * 0.7,
            CHART_PAD + plot_h - top_y,
            bar.color,
            escape(&bar.label),
            bar.value,
            x + slot * 0.35,
            CHART_HEIGHT - CHART_PAD + 14.0,
            escape(&bar.label)
        );
    }

    reference_line(html, y(series.reference), series.reference);
    html.push_str("</svg>\n");
}

fn render_line_chart(html: &mut String, series: &LineSeries) {
    let values: Vec<f64> = series
        .points
        .iter()
        .map(|p| p.index)
        .filter(|v| v.is_finite())
        .collect();
    let lo = values.iter().copied().fold(series.reference, f64::min);
    let hi = values.iter().copied().fold(series.reference, f64::max);
    let margin = ((hi - lo) * 0.1).max(1.0);
    let (lo, hi) = (lo - margin, hi + margin);

    let plot_w = CHART_WIDTH - 2.0 * CHART_PAD;
    let plot_h = CHART_HEIGHT - 2.0 * CHART_PAD;
    let y = |v: f64| CHART_PAD + plot_h - ((v - lo) / (hi - lo)) * plot_h;

    let first = series.points.first().map(|p| p.timestamp);
    let last = series.points.last().map(|p| p.timestamp);
    let span = match (first, last) {
        (Some(first), Some(last)) => (last - first).num_milliseconds() as f64,
        _ => 0.0,
    };
    let count = series.points.len();
    let x = |i: usize, offset_ms: f64| {
        let fraction = if span > 0.0 {
            offset_ms / span
        } else if count > 1 {
            i as f64 / (count - 1) as f64
        } else {
            0.5
        };
        CHART_PAD + fraction * plot_w
    };

    open_svg(html, series.title);

    let mut polyline = String::new();
    let mut markers = String::new();
    for (i, point) in series.points.iter().enumerate() {
        if !point.index.is_finite() {
            continue;
        }
        let offset = first
            .map(|f| (point.timestamp - f).num_milliseconds() as f64)
            .unwrap_or(0.0);
        let (px, py) = (x(i, offset), y(point.index));
        let _ = write!(polyline, "{:.1},{:.1} ", px, py);
        let _ = write!(
            markers,
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{}\"><title>{}: {:.2}</title></circle>",
            px,
            py,
            point.sentiment.color(),
            point.timestamp.format("%Y-%m-%d %H:%M"),
            point.index
        );
    }

    reference_line(html, y(series.reference), series.reference);
    let _ = writeln!(
        html,
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"3\"/>{}",
        polyline.trim_end(),
        TREND_COLOR,
        markers
    );
    let _ = writeln!(
        html,
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{:.2}</text><text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{:.2}</text>",
        4.0,
        CHART_PAD + 4.0,
        hi,
        4.0,
        CHART_HEIGHT - CHART_PAD,
        lo
    );
    html.push_str("</svg>\n");
}

fn open_svg(html: &mut String, title: &str) {
    let _ = writeln!(
        html,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\">\
         <rect width=\"{w}\" height=\"{h}\" fill=\"white\"/>\
         <text x=\"{cx}\" y=\"20\" text-anchor=\"middle\" font-size=\"14\">{title}</text>",
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        cx = CHART_WIDTH / 2.0,
        title = escape(title)
    );
}

fn reference_line(html: &mut String, y: f64, reference: f64) {
    let _ = writeln!(
        html,
        "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"gray\" stroke-dasharray=\"6 4\"/>\
         <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" fill=\"gray\" text-anchor=\"end\">Neutral ({})</text>",
        CHART_PAD,
        CHART_WIDTH - CHART_PAD,
        CHART_WIDTH - CHART_PAD,
        y - 4.0,
        reference,
        y = y
    );
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape, then render `**bold**` and `` `code` `` spans
fn inline_markdown(raw: &str) -> String {
    let bolded: String = escape(raw)
        .split("**")
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                format!("<strong>{}</strong>", part)
            } else {
                part.to_string()
            }
        })
        .collect();

    bolded
        .split('`')
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                format!("<code>{}</code>", part)
            } else {
                part.to_string()
            }
        })
        .collect()
}

//! Server-side HTML rendering of the dashboard view

use std::time::Duration;

use crate::view::{
    format_time_of_day, format_timestamp, DashboardView, DeviceCard, TemperatureChart,
    TemperaturePoint,
};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 320.0;
const CHART_MARGIN: f64 = 48.0;

/// Render the full dashboard page. It reloads itself every `refresh`.
pub fn render_page(view: &DashboardView, refresh: Duration) -> String {
    let body = match view {
        DashboardView::Loading => {
            r#"<p style="text-align: center; color: #6c757d;">Loading device data...</p>"#
                .to_string()
        }
        DashboardView::Error { message } => format!(
            r#"<div style="color: #dc3545; text-align: center; margin-top: 2rem;">{}</div>"#,
            escape_html(message)
        ),
        DashboardView::Loaded {
            cards,
            chart,
            stale_error,
        } => {
            let banner = stale_error
                .as_deref()
                .map(|message| {
                    format!(
                        r#"<div style="color: #856404; background-color: #fff3cd; padding: 0.75rem; border-radius: 0.25rem;">{} Showing last known data.</div>"#,
                        escape_html(message)
                    )
                })
                .unwrap_or_default();
            format!(
                "{}{}{}",
                banner,
                render_device_grid(cards),
                render_temperature_section(chart)
            )
        }
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta http-equiv="refresh" content="{refresh_secs}">
    <title>IoT Device Dashboard</title>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 1080px; margin: 0 auto; padding: 1rem; background-color: #f8f9fa;">
    <header>
        <h1>IoT Device Dashboard</h1>
    </header>
    <main>{body}</main>
</body>
</html>"#,
        refresh_secs = refresh.as_secs().max(1),
        body = body,
    )
}

/// Device overview grid, one card per device
pub fn render_device_grid(cards: &[DeviceCard]) -> String {
    let cards_html: String = cards.iter().map(render_card).collect();
    format!(
        r#"<section style="background: #fff; border-radius: 0.5rem; padding: 1.5rem; margin-bottom: 2rem;">
        <h2>Device Overview</h2>
        <div style="display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 1.5rem;">{}</div>
    </section>"#,
        cards_html
    )
}

fn render_card(card: &DeviceCard) -> String {
    let fields: String = card
        .fields
        .iter()
        .map(|f| {
            format!(
                r#"<p style="margin: 0.25rem 0;"><span style="font-weight: 600;">{}:</span> {}</p>"#,
                f.label,
                escape_html(&f.value)
            )
        })
        .collect();

    format!(
        r#"<div class="device-card" data-device-id="{id}" style="background-color: #f1f3f5; border-radius: 0.5rem; padding: 1rem;">
            <h3 style="margin: 0 0 0.5rem 0;">{title}</h3>
            <p style="font-size: 0.85em; color: #6c757d;">ID: {id}</p>
            <div>{fields}</div>
            <p style="font-size: 0.75em; color: #adb5bd; margin-top: 0.75rem;">Last Updated: {updated}</p>
        </div>"#,
        id = escape_html(&card.device_id),
        title = escape_html(&card.title),
        fields = fields,
        updated = escape_html(&card.last_updated),
    )
}

/// Temperature section: a line chart, or the placeholder when there are no points
pub fn render_temperature_section(chart: &TemperatureChart) -> String {
    let content = match chart {
        TemperatureChart::Points { points } => render_line_chart(points),
        TemperatureChart::Placeholder { message } => format!(
            r#"<p style="text-align: center; color: #6c757d;">{}</p>"#,
            message
        ),
    };
    format!(
        r#"<section style="background: #fff; border-radius: 0.5rem; padding: 1.5rem;">
        <h2>Temperature Over Time</h2>
        {}
    </section>"#,
        content
    )
}

/// Linear mapping of `[min, max]` onto `[lo, hi]`; a degenerate domain maps to the middle
fn scale(value: f64, min: f64, max: f64, lo: f64, hi: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        (lo + hi) / 2.0
    } else {
        lo + (value - min) / (max - min) * (hi - lo)
    }
}

/// SVG line chart of timestamp vs temperature, points joined in the given order
pub fn render_line_chart(points: &[TemperaturePoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let (t_min, t_max) = points.iter().fold((i64::MAX, i64::MIN), |(lo, hi), p| {
        (lo.min(p.timestamp), hi.max(p.timestamp))
    });
    let (y_min, y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.temperature), hi.max(p.temperature))
        });
    let (y_min, y_max) = (y_min.floor() - 1.0, y_max.ceil() + 1.0);

    let left = CHART_MARGIN;
    let right = CHART_WIDTH - CHART_MARGIN / 2.0;
    let top = CHART_MARGIN / 2.0;
    let bottom = CHART_HEIGHT - CHART_MARGIN;

    let coords: Vec<(f64, f64)> = points
        .iter()
        .map(|p| {
            (
                scale(p.timestamp as f64, t_min as f64, t_max as f64, left, right),
                scale(p.temperature, y_min, y_max, bottom, top),
            )
        })
        .collect();

    let open = format!(
        r##"<svg class="temperature-chart" viewBox="0 0 {w} {h}" width="100%" role="img" aria-label="Temperature over time">"##,
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );

    // grid and axes
    let grid: String = (0..=4)
        .map(|i| {
            let y = top + (bottom - top) * f64::from(i) / 4.0;
            let value = y_max - (y_max - y_min) * f64::from(i) / 4.0;
            format!(
                r##"<line x1="{left}" y1="{y:.1}" x2="{right}" y2="{y:.1}" stroke="#dee2e6" stroke-dasharray="3 3"/><text x="{tx}" y="{ty:.1}" font-size="11" text-anchor="end" fill="#4a5568">{value:.1}</text>"##,
                tx = left - 6.0,
                ty = y + 4.0,
            )
        })
        .collect();
    let axes = format!(
        r##"<line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="#4a5568"/><line x1="{left}" y1="{top}" x2="{left}" y2="{bottom}" stroke="#4a5568"/>"##
    );
    let time_labels = format!(
        r##"<text x="{left}" y="{y}" font-size="11" fill="#4a5568">{start}</text><text x="{right}" y="{y}" font-size="11" text-anchor="end" fill="#4a5568">{end}</text>"##,
        y = bottom + 18.0,
        start = format_time_of_day(t_min),
        end = format_time_of_day(t_max),
    );
    let y_label = format!(
        r##"<text transform="translate(14 {mid}) rotate(-90)" font-size="12" text-anchor="middle" fill="#4a5568">Temperature (°C)</text>"##,
        mid = (top + bottom) / 2.0
    );

    // series
    let polyline: Vec<String> = coords
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect();
    let line = format!(
        r##"<polyline fill="none" stroke="#8884d8" stroke-width="2" points="{}"/>"##,
        polyline.join(" ")
    );
    let markers: String = points
        .iter()
        .zip(&coords)
        .map(|(point, (x, y))| {
            format!(
                r##"<circle class="temperature-point" cx="{x:.1}" cy="{y:.1}" r="4" fill="#8884d8"><title>{when}: {temp}°C</title></circle>"##,
                when = format_timestamp(point.timestamp),
                temp = point.temperature,
            )
        })
        .collect();

    format!("{open}{grid}{axes}{time_labels}{y_label}{line}{markers}</svg>")
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

//! Dashboard view model derived from the shared state
//!
//! Everything here is a pure function of the readings so the HTML page and
//! the JSON API present the same thing.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::reading::{DeviceReading, DeviceType};
use crate::state::{DashboardState, Phase};

/// Placeholder for a field the device did not report
pub const NOT_AVAILABLE: &str = "N/A";

/// Shown instead of the chart when no thermostat reported a temperature
pub const NO_TEMPERATURE_DATA: &str = "No temperature data available";

/// One labelled value on a device card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardField {
    pub label: &'static str,
    pub value: String,
}

impl CardField {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

/// Summary card for one device, keyed by `device_id`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceCard {
    pub device_id: String,
    pub device_type: String,
    pub title: String,
    pub fields: Vec<CardField>,
    pub timestamp: i64,
    pub last_updated: String,
}

/// A point on the temperature chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperaturePoint {
    pub timestamp: i64,
    pub temperature: f64,
}

/// Temperature chart contents
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperatureChart {
    Points { points: Vec<TemperaturePoint> },
    Placeholder { message: &'static str },
}

impl TemperatureChart {
    pub fn from_readings(readings: &[DeviceReading]) -> Self {
        let points = temperature_series(readings);
        if points.is_empty() {
            TemperatureChart::Placeholder {
                message: NO_TEMPERATURE_DATA,
            }
        } else {
            TemperatureChart::Points { points }
        }
    }

    pub fn points(&self) -> &[TemperaturePoint] {
        match self {
            TemperatureChart::Points { points } => points,
            TemperatureChart::Placeholder { .. } => &[],
        }
    }
}

/// What the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DashboardView {
    Loading,
    Error {
        message: String,
    },
    Loaded {
        cards: Vec<DeviceCard>,
        chart: TemperatureChart,
        /// Set when the cards are last-good data kept through a failed poll
        stale_error: Option<String>,
    },
}

impl DashboardView {
    /// Derive the view from the current state.
    ///
    /// A failed poll hides the device grid unless `retain_on_error` is set and
    /// a previous poll succeeded.
    pub fn from_state(state: &DashboardState, retain_on_error: bool) -> Self {
        match state.phase() {
            Phase::Loading => DashboardView::Loading,
            Phase::Error => {
                let message = state.error.clone().unwrap_or_default();
                if retain_on_error && state.last_success_epoch_ms.is_some() {
                    DashboardView::loaded(&state.readings, Some(message))
                } else {
                    DashboardView::Error { message }
                }
            }
            Phase::Loaded => DashboardView::loaded(&state.readings, None),
        }
    }

    fn loaded(readings: &[DeviceReading], stale_error: Option<String>) -> Self {
        DashboardView::Loaded {
            cards: device_cards(readings),
            chart: TemperatureChart::from_readings(readings),
            stale_error,
        }
    }

    pub fn cards(&self) -> &[DeviceCard] {
        match self {
            DashboardView::Loaded { cards, .. } => cards,
            _ => &[],
        }
    }
}

/// One card per reading, in received order
pub fn device_cards(readings: &[DeviceReading]) -> Vec<DeviceCard> {
    readings.iter().map(device_card).collect()
}

pub fn device_card(reading: &DeviceReading) -> DeviceCard {
    DeviceCard {
        device_id: reading.device_id.clone(),
        device_type: reading.device_type.to_string(),
        title: display_title(reading.device_type.as_str()),
        fields: card_fields(reading),
        timestamp: reading.timestamp,
        last_updated: format_timestamp(reading.timestamp),
    }
}

fn card_fields(reading: &DeviceReading) -> Vec<CardField> {
    let attrs = reading.attributes();
    match reading.device_type {
        DeviceType::Light => vec![
            CardField::new("Status", status_or_na(attrs.status.as_deref())),
            CardField::new("Brightness", with_unit(attrs.brightness, "%")),
        ],
        DeviceType::Thermostat => vec![
            CardField::new("Temperature", with_unit(attrs.temperature, "°C")),
            CardField::new("Humidity", with_unit(attrs.humidity, "%")),
            CardField::new("Set Point", with_unit(attrs.set_point, "°C")),
        ],
        DeviceType::SecurityCamera => vec![
            CardField::new("Status", status_or_na(attrs.status.as_deref())),
            CardField::new(
                "Motion Detected",
                match attrs.motion_detected {
                    Some(true) => "Yes".to_string(),
                    Some(false) => "No".to_string(),
                    None => NOT_AVAILABLE.to_string(),
                },
            ),
        ],
        DeviceType::Other(_) => Vec::new(),
    }
}

fn status_or_na(status: Option<&str>) -> String {
    match status {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{}{}", v, unit),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Thermostat readings with a temperature, in received order
pub fn temperature_series(readings: &[DeviceReading]) -> Vec<TemperaturePoint> {
    readings
        .iter()
        .filter(|r| r.device_type == DeviceType::Thermostat)
        .filter_map(|r| {
            r.attributes().temperature.map(|temperature| TemperaturePoint {
                timestamp: r.timestamp,
                temperature,
            })
        })
        .collect()
}

/// Device type tag as a heading: first underscore becomes a space, words capitalized
pub fn display_title(tag: &str) -> String {
    tag.replacen('_', " ", 1)
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Epoch milliseconds as local date and time
pub fn format_timestamp(epoch_ms: i64) -> String {
    format_timestamp_in(epoch_ms, &Local)
}

pub fn format_timestamp_in<Tz>(epoch_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(utc) => utc
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "Invalid Date".to_string(),
    }
}

/// Epoch milliseconds as local time of day, for chart ticks
pub fn format_time_of_day(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(utc) => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "Invalid Date".to_string(),
    }
}

//! Device reading types and the decoding boundary for backend payloads

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of device that produced a reading
///
/// Tags the dashboard has no special handling for are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceType {
    Thermostat,
    Light,
    SecurityCamera,
    Other(String),
}

impl DeviceType {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceType::Thermostat => "thermostat",
            DeviceType::Light => "light",
            DeviceType::SecurityCamera => "security_camera",
            DeviceType::Other(tag) => tag,
        }
    }
}

impl From<String> for DeviceType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "thermostat" => DeviceType::Thermostat,
            "light" => DeviceType::Light,
            "security_camera" => DeviceType::SecurityCamera,
            _ => DeviceType::Other(tag),
        }
    }
}

impl From<DeviceType> for String {
    fn from(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute bag reported by a device. Which fields are present depends on
/// the device type and is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_point: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_detected: Option<bool>,
}

/// Envelope around the attribute bag, as stored by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: DeviceAttributes,
}

/// One timestamped telemetry snapshot from a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub device_id: String,
    pub device_type: DeviceType,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: ReadingPayload,
}

/// An explicit `null` decodes the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DeviceReading {
    pub fn attributes(&self) -> &DeviceAttributes {
        &self.data.data
    }
}

/// Decode a backend response body into readings.
///
/// A `null` body is an empty collection. Readings must carry unique device ids.
pub fn decode_readings(body: &str) -> crate::Result<Vec<DeviceReading>> {
    let readings: Option<Vec<DeviceReading>> = serde_json::from_str(body)?;
    let readings = readings.unwrap_or_default();

    let mut seen = HashSet::with_capacity(readings.len());
    for reading in &readings {
        if !seen.insert(reading.device_id.as_str()) {
            return Err(crate::DashboardError::Schema(format!(
                "duplicate device_id '{}'",
                reading.device_id
            )));
        }
    }

    Ok(readings)
}

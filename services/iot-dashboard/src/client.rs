//! Client for the device telemetry backend

use std::sync::Arc;

use async_trait::async_trait;

use crate::io::HttpClient;
use crate::reading::{decode_readings, DeviceReading};

/// Time range requested when the caller does not pass one (the last hour)
pub const DEFAULT_TIME_RANGE_SECONDS: u64 = 3600;

/// Path of the telemetry endpoint under the base URL
pub const DEVICE_DATA_PATH: &str = "/iot-data";

/// Source of device readings, polled by the dashboard
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait DeviceDataSource: Send + Sync {
    /// Fetch the latest reading of every device within the time range
    async fn fetch_device_data(
        &self,
        time_range_seconds: Option<u64>,
    ) -> crate::Result<Vec<DeviceReading>>;
}

/// HTTP client for `GET <base_url>/iot-data?timeRange=<seconds>`
pub struct DataClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DataClient {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("Created DataClient for {}", base_url);
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the telemetry endpoint for the given time range
    pub fn device_data_url(&self, time_range_seconds: u64) -> String {
        format!(
            "{}{}?timeRange={}",
            self.base_url, DEVICE_DATA_PATH, time_range_seconds
        )
    }

    async fn request(&self, url: &str) -> crate::Result<Vec<DeviceReading>> {
        let response = self.http.get(url).await?;
        if !response.is_success() {
            return Err(crate::DashboardError::Fetch {
                url: url.to_string(),
                status: response.status,
            });
        }
        decode_readings(&response.body)
    }
}

#[async_trait]
impl DeviceDataSource for DataClient {
    async fn fetch_device_data(
        &self,
        time_range_seconds: Option<u64>,
    ) -> crate::Result<Vec<DeviceReading>> {
        let time_range_seconds = time_range_seconds
            .filter(|&secs| secs != 0)
            .unwrap_or(DEFAULT_TIME_RANGE_SECONDS);
        let url = self.device_data_url(time_range_seconds);

        match self.request(&url).await {
            Ok(readings) => {
                tracing::debug!("Fetched {} readings from {}", readings.len(), url);
                Ok(readings)
            }
            Err(e) => {
                tracing::error!("Error fetching device data: {}", e);
                Err(e)
            }
        }
    }
}

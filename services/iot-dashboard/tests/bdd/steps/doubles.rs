//! Test doubles shared by the step definitions

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use iot_dashboard::client::DeviceDataSource;
use iot_dashboard::io::{HttpClient, HttpResponse};
use iot_dashboard::reading::DeviceReading;
use iot_dashboard::DashboardError;

/// An HTTP client that records request URLs and returns a canned response
#[derive(Debug, Default)]
pub struct CannedHttpClient {
    pub requests: RwLock<Vec<String>>,
    /// `None` answers 200 with an empty list; `Err` simulates a transport failure
    pub response: RwLock<Option<Result<HttpResponse, String>>>,
}

impl CannedHttpClient {
    pub fn responding(response: Result<HttpResponse, String>) -> Arc<Self> {
        Arc::new(Self {
            requests: RwLock::new(Vec::new()),
            response: RwLock::new(Some(response)),
        })
    }
}

#[async_trait::async_trait]
impl HttpClient for CannedHttpClient {
    async fn get(&self, url: &str) -> iot_dashboard::Result<HttpResponse> {
        self.requests.write().await.push(url.to_string());
        match self.response.read().await.clone() {
            Some(Ok(response)) => Ok(response),
            Some(Err(msg)) => Err(DashboardError::Http(msg)),
            None => Ok(HttpResponse {
                status: 200,
                body: "[]".to_string(),
            }),
        }
    }
}

/// A data source that counts calls and always succeeds or always fails
#[derive(Debug)]
pub struct CountingSource {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingSource {
    pub fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DeviceDataSource for CountingSource {
    async fn fetch_device_data(
        &self,
        _time_range_seconds: Option<u64>,
    ) -> iot_dashboard::Result<Vec<DeviceReading>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(DashboardError::Http("connection refused".to_string()))
        } else {
            Ok(Vec::new())
        }
    }
}

//! IoT Dashboard - read-only device telemetry monitor
//!
//! Polls a device data backend on a fixed interval and serves a dashboard
//! with a per-device summary grid and a thermostat temperature chart.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod poller;
pub mod reading;
pub mod render;
pub mod state;
pub mod view;

pub use config::{load_config, Config};
pub use error::{DashboardError, Result};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::client::{DataClient, DeviceDataSource};
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::poller::Poller;
use crate::state::StateHandle;

/// Builder for the dashboard service.
///
/// The HTTP client, data source and cancellation token can be replaced for tests.
pub struct DashboardBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    source: Option<Arc<dyn DeviceDataSource>>,
    cancel: Option<CancellationToken>,
}

impl DashboardBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            source: None,
            cancel: None,
        }
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_data_source(mut self, source: Arc<dyn DeviceDataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub async fn build(self) -> Result<Dashboard> {
        self.config.validate()?;

        let source = match self.source {
            Some(source) => source,
            None => {
                let http = match self.http {
                    Some(http) => http,
                    None => Arc::new(ReqwestHttpClient::with_timeout(
                        self.config.api.request_timeout,
                    )?),
                };
                Arc::new(DataClient::new(&self.config.api.base_url, http))
            }
        };

        let listener = if self.config.server.enabled {
            let addr = SocketAddr::from(([0, 0, 0, 0], self.config.server.port));
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                DashboardError::Server(format!(
                    "Failed to bind dashboard to port {}: {}",
                    self.config.server.port, e
                ))
            })?;
            tracing::info!("Dashboard listening on http://{}", listener.local_addr()?);
            Some(listener)
        } else {
            None
        };

        Ok(Dashboard {
            config: self.config,
            source,
            state: state::new_state_handle(),
            listener,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// A built dashboard service, ready to start
pub struct Dashboard {
    config: Config,
    source: Arc<dyn DeviceDataSource>,
    state: StateHandle,
    listener: Option<tokio::net::TcpListener>,
    cancel: CancellationToken,
}

impl Dashboard {
    pub fn state(&self) -> StateHandle {
        Arc::clone(&self.state)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Address the dashboard server is bound to, if enabled
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Poll and serve until the cancellation token is triggered
    pub async fn start(self) -> Result<()> {
        let poller = Poller::new(
            Arc::clone(&self.source),
            Arc::clone(&self.state),
            self.config.polling.interval,
            Some(self.config.api.time_range_seconds),
        );
        let polling = poller.spawn(&self.cancel);

        tracing::info!(
            "Dashboard started, polling {}",
            self.config.api.base_url
        );

        let result = if let Some(listener) = self.listener {
            let router = dashboard::build_router(
                Arc::clone(&self.state),
                self.config.view.retain_on_error,
                self.config.polling.interval,
            );
            let cancel = self.cancel.clone();
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { cancel.cancelled().await })
                .await
                .map_err(|e| DashboardError::Server(format!("Dashboard server failed: {}", e)))
        } else {
            self.cancel.cancelled().await;
            Ok(())
        };

        polling.shutdown().await;
        tracing::info!("Dashboard stopped");
        result
    }
}

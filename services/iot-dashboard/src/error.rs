//! Error types for the IoT dashboard service

/// Errors that can occur in the IoT dashboard service
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Fetch failed with status {status}: {url}")]
    Fetch { url: String, status: u16 },

    #[error("Failed to decode device data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid device data: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

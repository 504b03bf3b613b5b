//! API client for the mixing engine's control API.

mod control;

use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure: engine unreachable, connection reset, timeout
    #[error("Network error: {0}")]
    Network(String),
    /// Engine answered with a non-success status
    #[error("HTTP {0} error: {1}")]
    Http(u16, String),
    /// Reply body not in the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Short name of the failure class, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "transport failure",
            ApiError::Http(..) => "remote rejection",
            ApiError::Decode(_) => "malformed reply",
        }
    }
}

/// Client for the engine's control API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    device: u8,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client for the given base URL and device.
    pub fn new(base_url: impl Into<String>, device: u8) -> Self {
        Self::with_client(base_url, device, reqwest::Client::new())
    }

    /// Create a new API client whose requests fail after `timeout` (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_timeout(
        base_url: impl Into<String>,
        device: u8,
        timeout: std::time::Duration,
    ) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_client(base_url, device, client))
    }

    fn with_client(base_url: impl Into<String>, device: u8, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            device,
            client,
        }
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Device id used as the first path segment.
    pub fn device(&self) -> u8 {
        self.device
    }
}

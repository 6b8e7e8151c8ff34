//! Glow HTTP Client
//!
//! A typed client for the Glow analysis backend, plus the poller that tracks
//! a submitted analysis job until the server finishes it.
//!
//! # Example
//!
//! ```no_run
//! use glow_client::{AnalysisClient, ClientConfig, PollOptions, StaticToken};
//! use glow_core::dto::analysis::CreateAnalysisRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AnalysisClient::new(
//!         ClientConfig::new("http://localhost:3000"),
//!         StaticToken::new("firebase-id-token"),
//!     );
//!
//!     let created = client
//!         .create_analysis(CreateAnalysisRequest::new("aGVsbG8="))
//!         .await?;
//!
//!     let analysis = client
//!         .poller()
//!         .poll_until_complete(&created.analysis_id, PollOptions::default())
//!         .await?;
//!
//!     println!("Seasonal type: {:?}", analysis.seasonal_type());
//!     Ok(())
//! }
//! ```

mod analyses;
pub mod auth;
pub mod config;
pub mod error;
pub mod poller;

// Re-export commonly used types
pub use auth::{AuthTokenProvider, EnvToken, StaticToken};
pub use config::{ClientConfig, RequestTimeouts};
pub use error::{ClientError, Result};
pub use poller::{
    AnalysisApi, BackoffPolicy, JobStatusPoller, PollError, PollOptions, PollSession, PollState,
};
pub use tokio_util::sync::CancellationToken;

use glow_core::dto::analysis::ApiErrorBody;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// HTTP client for the analysis API
///
/// Every call asks the [`AuthTokenProvider`] for a bearer token first and
/// fails with [`ClientError::AuthRequired`] without touching the network if
/// there is none.
#[derive(Clone)]
pub struct AnalysisClient {
    /// Base URL of the backend (e.g., "http://localhost:3000")
    base_url: String,
    config: ClientConfig,
    /// HTTP client instance
    client: Client,
    auth: Arc<dyn AuthTokenProvider>,
}

impl AnalysisClient {
    /// Create a new analysis client
    ///
    /// # Example
    /// ```
    /// use glow_client::{AnalysisClient, ClientConfig, StaticToken};
    ///
    /// let client = AnalysisClient::new(ClientConfig::default(), StaticToken::none());
    /// assert_eq!(client.base_url(), "http://localhost:3000");
    /// ```
    pub fn new(config: ClientConfig, auth: impl AuthTokenProvider + 'static) -> Self {
        Self::with_client(config, Arc::new(auth), Client::new())
    }

    /// Create a new analysis client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc. Per-endpoint
    /// timeouts from the config are still applied to each request.
    pub fn with_client(
        config: ClientConfig,
        auth: Arc<dyn AuthTokenProvider>,
        client: Client,
    ) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
            client,
            auth,
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Poller that tracks jobs through this client
    pub fn poller(&self) -> JobStatusPoller {
        JobStatusPoller::new(Arc::new(self.clone()))
    }

    /// Reads the bearer token, failing locally when there is none
    fn bearer_token(&self) -> Result<String> {
        self.auth.bearer_token().ok_or(ClientError::AuthRequired)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success statuses become [`ClientError::ApiError`] carrying the
    /// `message` field of the error body when the server sent one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::error_for_status(response).await?;

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no meaningful body (e.g., DELETE)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        Self::error_for_status(response).await.map(|_| ())
    }

    async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str::<ApiErrorBody>(&text).ok())
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty());

        Err(ClientError::api_error(status.as_u16(), message))
    }
}

impl fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisClient")
            .field("base_url", &self.base_url)
            .field("timeouts", &self.config.timeouts)
            .finish_non_exhaustive()
    }
}

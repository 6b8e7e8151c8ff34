//! Configuration module
//!
//! Handles CLI configuration: backend connection and credentials.

use glow_client::{AnalysisClient, ClientConfig, StaticToken};

/// CLI configuration
#[derive(Clone)]
pub struct Config {
    /// Backend connection settings
    pub client: ClientConfig,
    /// Bearer token of the signed-in user
    pub token: Option<String>,
}

impl Config {
    /// Builds an API client from this configuration
    pub fn api_client(&self) -> AnalysisClient {
        AnalysisClient::new(self.client.clone(), StaticToken::from(self.token.clone()))
    }
}

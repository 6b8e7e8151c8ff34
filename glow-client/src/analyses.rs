//! Analysis API endpoints

use glow_core::domain::analysis::Analysis;
use glow_core::dto::analysis::{
    AnalysisStatusResponse, CreateAnalysisRequest, CreateAnalysisResponse, GetAnalysisResponse,
    UserAnalysesResponse,
};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::debug;

use crate::AnalysisClient;
use crate::error::{ClientError, Result};

impl AnalysisClient {
    // =============================================================================
    // Job Submission
    // =============================================================================

    /// Submit photos for analysis
    ///
    /// The face photo is trimmed of surrounding whitespace before sending and
    /// must not be empty after that.
    ///
    /// # Returns
    /// The new job id and its initial status (`pending` or `processing`)
    pub async fn create_analysis(
        &self,
        req: CreateAnalysisRequest,
    ) -> Result<CreateAnalysisResponse> {
        let token = self.bearer_token()?;
        let req = normalize_create_request(req)?;

        let url = format!("{}/api/analysis/create", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .timeout(self.config.timeouts.create)
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Job Tracking
    // =============================================================================

    /// Check the current status of an analysis job
    ///
    /// The status of a running job changes between otherwise identical
    /// requests, so every call carries a fresh `_t` query parameter and
    /// `no-cache` headers.
    pub async fn check_analysis_status(&self, analysis_id: &str) -> Result<AnalysisStatusResponse> {
        let token = self.bearer_token()?;
        let url = self.analysis_url(analysis_id, "/status")?;
        let cache_buster = chrono::Utc::now().timestamp_millis().to_string();

        debug!(analysis_id, "Checking analysis status");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .query(&[("_t", cache_buster.as_str())])
            .timeout(self.config.timeouts.status)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Fetch the full stored result of an analysis
    ///
    /// Only meaningful once the job's status is `completed`.
    pub async fn get_analysis(&self, analysis_id: &str) -> Result<Analysis> {
        let token = self.bearer_token()?;
        let url = self.analysis_url(analysis_id, "")?;

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .timeout(self.config.timeouts.get)
            .send()
            .await?;

        let body: GetAnalysisResponse = self.handle_response(response).await?;
        Ok(body.analysis)
    }

    /// Delete a stored analysis
    pub async fn delete_analysis(&self, analysis_id: &str) -> Result<()> {
        let token = self.bearer_token()?;
        let url = self.analysis_url(analysis_id, "")?;

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&token)
            .timeout(self.config.timeouts.delete)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // History
    // =============================================================================

    /// List every analysis of the signed-in user
    pub async fn list_user_analyses(&self) -> Result<UserAnalysesResponse> {
        let token = self.bearer_token()?;
        let url = format!("{}/api/analysis/user/all", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .timeout(self.config.timeouts.list)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Builds `/api/analysis/{id}{suffix}`, rejecting ids that would escape
    /// their path segment
    fn analysis_url(&self, analysis_id: &str, suffix: &str) -> Result<String> {
        validate_analysis_id(analysis_id)?;
        Ok(format!(
            "{}/api/analysis/{}{}",
            self.base_url, analysis_id, suffix
        ))
    }
}

pub(crate) fn validate_analysis_id(analysis_id: &str) -> Result<()> {
    if analysis_id.trim().is_empty() {
        return Err(ClientError::Validation(
            "analysis id cannot be empty".to_string(),
        ));
    }

    if analysis_id
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
    {
        return Err(ClientError::Validation(format!(
            "analysis id contains invalid characters: {:?}",
            analysis_id
        )));
    }

    Ok(())
}

fn normalize_create_request(mut req: CreateAnalysisRequest) -> Result<CreateAnalysisRequest> {
    let face = req.face_photo_base64.trim();
    if face.is_empty() {
        return Err(ClientError::Validation(
            "face photo is required as a non-empty base64 string".to_string(),
        ));
    }

    req.face_photo_base64 = face.to_string();
    Ok(req)
}

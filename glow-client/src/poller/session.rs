//! Job status poller
//!
//! One [`PollSession`] per tracked job. The loop issues one status check at a
//! time, sleeps between checks, and ends in exactly one terminal state.

use async_trait::async_trait;
use glow_core::domain::analysis::{Analysis, AnalysisStatus};
use glow_core::dto::analysis::{AnalysisStatusResponse, CreateAnalysisRequest};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::BackoffPolicy;
use super::error::{DEFAULT_FAILURE_MESSAGE, PollError};
use crate::AnalysisClient;
use crate::analyses::validate_analysis_id;
use crate::error::Result;

/// The two calls the poller needs from the backend
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Current status of a job, bypassing any intermediate cache
    async fn check_status(&self, analysis_id: &str) -> Result<AnalysisStatusResponse>;

    /// Full result of a completed job
    async fn get_analysis(&self, analysis_id: &str) -> Result<Analysis>;
}

#[async_trait]
impl AnalysisApi for AnalysisClient {
    async fn check_status(&self, analysis_id: &str) -> Result<AnalysisStatusResponse> {
        self.check_analysis_status(analysis_id).await
    }

    async fn get_analysis(&self, analysis_id: &str) -> Result<Analysis> {
        AnalysisClient::get_analysis(self, analysis_id).await
    }
}

/// Observer invoked with the status seen by every successful check
pub type ProgressCallback = Box<dyn FnMut(AnalysisStatus) + Send>;

/// Tuning and hooks for one poll session
pub struct PollOptions {
    /// Status checks allowed before giving up
    pub max_attempts: u32,
    /// Delay between checks while no errors occur; also the backoff unit
    pub base_interval: Duration,
    /// Ceiling for backoff after consecutive failures
    pub max_backoff: Duration,
    pub on_progress: Option<ProgressCallback>,
    pub cancellation: Option<CancellationToken>,
}

impl PollOptions {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
    pub const DEFAULT_BASE_INTERVAL: Duration = Duration::from_secs(5);

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_interval(mut self, base_interval: Duration) -> Self {
        self.base_interval = base_interval;
        self
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    pub fn on_progress(mut self, callback: impl FnMut(AnalysisStatus) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Backoff policy derived from the interval settings
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.base_interval).with_max(self.max_backoff)
    }

    fn validate(&self) -> std::result::Result<(), PollError> {
        if self.max_attempts == 0 {
            return Err(PollError::InvalidRequest(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.base_interval.is_zero() {
            return Err(PollError::InvalidRequest(
                "base_interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_interval: Self::DEFAULT_BASE_INTERVAL,
            max_backoff: BackoffPolicy::DEFAULT_MAX,
            on_progress: None,
            cancellation: None,
        }
    }
}

impl fmt::Debug for PollOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollOptions")
            .field("max_attempts", &self.max_attempts)
            .field("base_interval", &self.base_interval)
            .field("max_backoff", &self.max_backoff)
            .field("on_progress", &self.on_progress.is_some())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

/// Session state machine
///
/// `Idle -> Polling -> {Completed, Failed, TimedOut, Cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Idle | Self::Polling)
    }
}

/// Client-side bookkeeping for one tracked job
#[derive(Debug, Clone)]
pub struct PollSession {
    job_id: String,
    attempt_count: u32,
    consecutive_errors: u32,
    state: PollState,
}

impl PollSession {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            attempt_count: 0,
            consecutive_errors: 0,
            state: PollState::Idle,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Status checks issued so far, successful or not
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    fn has_attempts_left(&self, max_attempts: u32) -> bool {
        self.attempt_count < max_attempts
    }

    fn begin_attempt(&mut self) {
        self.attempt_count += 1;
        self.state = PollState::Polling;
    }

    fn record_success(&mut self) {
        self.consecutive_errors = 0;
    }

    /// Returns the new streak length
    fn record_failure(&mut self) -> u32 {
        self.consecutive_errors += 1;
        self.consecutive_errors
    }

    fn finish(&mut self, state: PollState) {
        debug_assert!(state.is_terminal());
        debug_assert!(!self.state.is_terminal(), "session already finished");
        self.state = state;
    }

    fn cancel(&mut self) -> PollError {
        self.finish(PollState::Cancelled);
        PollError::Cancelled
    }
}

/// Tracks analysis jobs until they complete
#[derive(Clone)]
pub struct JobStatusPoller {
    api: Arc<dyn AnalysisApi>,
}

impl JobStatusPoller {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self { api }
    }

    /// Polls `analysis_id` until it completes, then fetches its result
    ///
    /// # Errors
    /// - [`PollError::JobFailed`] when the server reports `failed`
    /// - [`PollError::PermanentRequest`] / [`PollError::AuthRequired`] on
    ///   errors retrying cannot fix; no further checks are made
    /// - [`PollError::AttemptsExhausted`] when `max_attempts` checks pass
    ///   without a terminal status
    /// - [`PollError::Cancelled`] once the cancellation token is observed
    /// - [`PollError::ResultFetch`] when the job completed but the result
    ///   fetch failed transiently
    pub async fn poll_until_complete(
        &self,
        analysis_id: &str,
        options: PollOptions,
    ) -> std::result::Result<Analysis, PollError> {
        let mut session = PollSession::new(analysis_id);
        let outcome = self.drive(&mut session, options).await;

        match &outcome {
            Ok(_) => info!(
                analysis_id,
                attempts = session.attempt_count(),
                "Analysis completed"
            ),
            Err(PollError::Cancelled) => debug!(
                analysis_id,
                attempts = session.attempt_count(),
                "Polling cancelled"
            ),
            Err(e) => info!(
                analysis_id,
                attempts = session.attempt_count(),
                "Polling ended without result: {}",
                e
            ),
        }

        outcome
    }

    async fn drive(
        &self,
        session: &mut PollSession,
        mut options: PollOptions,
    ) -> std::result::Result<Analysis, PollError> {
        options.validate()?;
        validate_analysis_id(session.job_id())
            .map_err(|e| PollError::InvalidRequest(e.to_string()))?;

        let cancel = options.cancellation.clone();
        let is_cancelled = || cancel.as_ref().is_some_and(CancellationToken::is_cancelled);
        let backoff = options.backoff();
        let job_id = session.job_id().to_string();

        while session.has_attempts_left(options.max_attempts) {
            if is_cancelled() {
                return Err(session.cancel());
            }

            session.begin_attempt();
            let result = self.api.check_status(&job_id).await;

            // An in-flight check may finish after cancellation; drop its result.
            if is_cancelled() {
                return Err(session.cancel());
            }

            let delay = match result {
                Ok(response) => {
                    session.record_success();
                    debug!(
                        analysis_id = %job_id,
                        attempt = session.attempt_count(),
                        status = %response.status,
                        "Status check succeeded"
                    );

                    if let Some(callback) = options.on_progress.as_mut() {
                        callback(response.status);
                    }

                    match response.status {
                        AnalysisStatus::Completed => {
                            return self.fetch_result(session, &is_cancelled).await;
                        }
                        AnalysisStatus::Failed => {
                            session.finish(PollState::Failed);
                            let message = response
                                .error
                                .filter(|m| !m.is_empty())
                                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                            return Err(PollError::JobFailed { message });
                        }
                        AnalysisStatus::Pending | AnalysisStatus::Processing => {
                            options.base_interval
                        }
                    }
                }
                Err(err) => {
                    let consecutive = session.record_failure();
                    warn!(
                        analysis_id = %job_id,
                        attempt = session.attempt_count(),
                        consecutive_errors = consecutive,
                        status_code = ?err.status(),
                        "Status check failed: {}",
                        err
                    );

                    if let Ok(permanent) = PollError::from_permanent(err) {
                        session.finish(PollState::Failed);
                        return Err(permanent);
                    }

                    backoff.delay_for(consecutive)
                }
            };

            if !session.has_attempts_left(options.max_attempts) {
                break;
            }

            debug!(analysis_id = %job_id, ?delay, "Waiting before next status check");
            if sleep_or_cancel(delay, cancel.as_ref()).await {
                return Err(session.cancel());
            }
        }

        session.finish(PollState::TimedOut);
        Err(PollError::AttemptsExhausted {
            attempts: session.attempt_count(),
        })
    }

    async fn fetch_result(
        &self,
        session: &mut PollSession,
        is_cancelled: &impl Fn() -> bool,
    ) -> std::result::Result<Analysis, PollError> {
        let result = self.api.get_analysis(session.job_id()).await;

        if is_cancelled() {
            return Err(session.cancel());
        }

        match result {
            Ok(analysis) => {
                session.finish(PollState::Completed);
                Ok(analysis)
            }
            Err(err) => {
                session.finish(PollState::Failed);
                Err(PollError::from_permanent(err).unwrap_or_else(PollError::ResultFetch))
            }
        }
    }
}

impl fmt::Debug for JobStatusPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobStatusPoller").finish_non_exhaustive()
    }
}

impl AnalysisClient {
    /// Submits photos and polls the new job to completion
    ///
    /// Submission failures map onto the same [`PollError`] signals; a
    /// transient submission failure surfaces as [`PollError::Submit`].
    pub async fn submit_and_wait(
        &self,
        req: CreateAnalysisRequest,
        options: PollOptions,
    ) -> std::result::Result<Analysis, PollError> {
        let created = self
            .create_analysis(req)
            .await
            .map_err(|err| PollError::from_permanent(err).unwrap_or_else(PollError::Submit))?;

        info!(
            analysis_id = %created.analysis_id,
            status = %created.status,
            estimated_time = %created.estimated_time,
            "Analysis submitted"
        );

        self.poller()
            .poll_until_complete(&created.analysis_id, options)
            .await
    }
}

/// Sleeps for `duration`; returns true if cancellation cut the sleep short
async fn sleep_or_cancel(duration: Duration, cancel: Option<&CancellationToken>) -> bool {
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => true,
                _ = tokio::time::sleep(duration) => false,
            }
        }
        None => {
            tokio::time::sleep(duration).await;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[derive(Clone)]
    enum Step {
        Status(AnalysisStatus),
        JobFailed(Option<&'static str>),
        Http(u16),
        Network,
    }

    fn network_error() -> ClientError {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        ClientError::RequestFailed(err)
    }

    fn completed_analysis(id: &str) -> Analysis {
        serde_json::from_value(json!({
            "_id": id,
            "user": "user-1",
            "photos": null,
            "status": "completed",
            "createdAt": "2025-03-01T08:00:00Z",
            "larsonAnalysis": { "seasonalType": { "primary": "Deep Winter" } }
        }))
        .unwrap()
    }

    /// Scripted backend: replays `script`, then repeats `fallback` forever
    struct FakeApi {
        script: Mutex<VecDeque<Step>>,
        fallback: Step,
        status_calls: Mutex<Vec<Instant>>,
        get_calls: AtomicUsize,
        get_error: Option<u16>,
        cancel_on_status_call: Option<(usize, CancellationToken)>,
    }

    impl FakeApi {
        fn new(script: Vec<Step>, fallback: Step) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                status_calls: Mutex::new(Vec::new()),
                get_calls: AtomicUsize::new(0),
                get_error: None,
                cancel_on_status_call: None,
            }
        }

        fn status_call_count(&self) -> usize {
            self.status_calls.lock().unwrap().len()
        }

        fn get_call_count(&self) -> usize {
            self.get_calls.load(Ordering::SeqCst)
        }

        /// Delays observed between consecutive status checks
        fn gaps(&self) -> Vec<Duration> {
            let calls = self.status_calls.lock().unwrap();
            calls.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl AnalysisApi for FakeApi {
        async fn check_status(&self, _analysis_id: &str) -> Result<AnalysisStatusResponse> {
            let call = {
                let mut calls = self.status_calls.lock().unwrap();
                calls.push(Instant::now());
                calls.len()
            };

            if let Some((at, token)) = &self.cancel_on_status_call {
                if *at == call {
                    token.cancel();
                }
            }

            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());

            match step {
                Step::Status(status) => Ok(AnalysisStatusResponse {
                    status,
                    error: None,
                }),
                Step::JobFailed(error) => Ok(AnalysisStatusResponse {
                    status: AnalysisStatus::Failed,
                    error: error.map(str::to_string),
                }),
                Step::Http(code) => Err(ClientError::api_error(
                    code,
                    Some(format!("server said {}", code)),
                )),
                Step::Network => Err(network_error()),
            }
        }

        async fn get_analysis(&self, analysis_id: &str) -> Result<Analysis> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            match self.get_error {
                Some(code) => Err(ClientError::api_error(code, None)),
                None => Ok(completed_analysis(analysis_id)),
            }
        }
    }

    fn options(max_attempts: u32, base_ms: u64) -> PollOptions {
        PollOptions::default()
            .with_max_attempts(max_attempts)
            .with_base_interval(Duration::from_millis(base_ms))
    }

    async fn run(
        api: &Arc<FakeApi>,
        opts: PollOptions,
    ) -> (std::result::Result<Analysis, PollError>, PollSession) {
        let poller = JobStatusPoller::new(api.clone());
        let mut session = PollSession::new("job-1");
        let result = poller.drive(&mut session, opts).await;
        (result, session)
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_processing_exhausts_attempts() {
        let api = Arc::new(FakeApi::new(
            vec![],
            Step::Status(AnalysisStatus::Processing),
        ));

        let (result, session) = run(&api, options(3, 100)).await;

        assert!(matches!(
            result,
            Err(PollError::AttemptsExhausted { attempts: 3 })
        ));
        assert_eq!(api.status_call_count(), 3);
        assert_eq!(api.get_call_count(), 0);
        assert_eq!(session.state(), PollState::TimedOut);
        assert_eq!(
            api.gaps(),
            vec![Duration::from_millis(100), Duration::from_millis(100)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_after_processing() {
        let api = Arc::new(FakeApi::new(
            vec![
                Step::Status(AnalysisStatus::Processing),
                Step::Status(AnalysisStatus::Processing),
            ],
            Step::Status(AnalysisStatus::Completed),
        ));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let opts = options(10, 100).on_progress(move |status| sink.lock().unwrap().push(status));
        let (result, session) = run(&api, opts).await;

        assert_eq!(result.unwrap(), completed_analysis("job-1"));
        assert_eq!(api.status_call_count(), 3);
        assert_eq!(api.get_call_count(), 1);
        assert_eq!(session.state(), PollState::Completed);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                AnalysisStatus::Processing,
                AnalysisStatus::Processing,
                AnalysisStatus::Completed
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_aborts_immediately() {
        let api = Arc::new(FakeApi::new(
            vec![Step::Http(401)],
            Step::Status(AnalysisStatus::Completed),
        ));

        let (result, session) = run(&api, options(60, 100)).await;

        match result {
            Err(PollError::PermanentRequest { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("server said 401"));
            }
            other => panic!("expected PermanentRequest, got {:?}", other),
        }
        assert_eq!(api.status_call_count(), 1);
        assert_eq!(session.state(), PollState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_back_off_exponentially() {
        let api = Arc::new(FakeApi::new(
            vec![Step::Network, Step::Network],
            Step::Status(AnalysisStatus::Completed),
        ));

        let (result, session) = run(&api, options(10, 100)).await;

        assert!(result.is_ok());
        assert_eq!(
            api.gaps(),
            vec![Duration::from_millis(200), Duration::from_millis(400)]
        );
        assert_eq!(api.get_call_count(), 1);
        assert_eq!(session.consecutive_errors(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_error_streak() {
        let api = Arc::new(FakeApi::new(
            vec![
                Step::Http(503),
                Step::Http(500),
                Step::Status(AnalysisStatus::Pending),
                Step::Network,
            ],
            Step::Status(AnalysisStatus::Completed),
        ));

        let (result, _) = run(&api, options(10, 100)).await;

        assert!(result.is_ok());
        // 2 errors: 200, 400; success: 100; fresh streak of 1: 200
        assert_eq!(
            api.gaps(),
            vec![
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(100),
                Duration::from_millis(200),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_capped() {
        let api = Arc::new(FakeApi::new(vec![], Step::Http(502)));

        let opts = options(5, 1_000).with_max_backoff(Duration::from_secs(3));
        let (result, session) = run(&api, opts).await;

        assert!(matches!(
            result,
            Err(PollError::AttemptsExhausted { attempts: 5 })
        ));
        assert_eq!(session.consecutive_errors(), 5);
        assert_eq!(
            api.gaps(),
            vec![
                Duration::from_secs(2),
                Duration::from_secs(3),
                Duration::from_secs(3),
                Duration::from_secs(3),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_failed_carries_server_message() {
        let api = Arc::new(FakeApi::new(
            vec![Step::Status(AnalysisStatus::Pending)],
            Step::JobFailed(Some("No face detected in photo")),
        ));

        let (result, session) = run(&api, options(10, 100)).await;

        match result {
            Err(PollError::JobFailed { message }) => {
                assert_eq!(message, "No face detected in photo")
            }
            other => panic!("expected JobFailed, got {:?}", other),
        }
        assert_eq!(api.status_call_count(), 2);
        assert_eq!(api.get_call_count(), 0);
        assert_eq!(session.state(), PollState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_failed_default_message() {
        for error in [None, Some("")] {
            let api = Arc::new(FakeApi::new(vec![], Step::JobFailed(error)));
            let (result, _) = run(&api, options(10, 100)).await;
            match result {
                Err(PollError::JobFailed { message }) => {
                    assert_eq!(message, DEFAULT_FAILURE_MESSAGE)
                }
                other => panic!("expected JobFailed, got {:?}", other),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_failed_keeps_whitespace_message() {
        let api = Arc::new(FakeApi::new(vec![], Step::JobFailed(Some("   "))));
        let (result, _) = run(&api, options(10, 100)).await;
        match result {
            Err(PollError::JobFailed { message }) => assert_eq!(message, "   "),
            other => panic!("expected JobFailed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_makes_no_calls() {
        let api = Arc::new(FakeApi::new(
            vec![],
            Step::Status(AnalysisStatus::Completed),
        ));
        let token = CancellationToken::new();
        token.cancel();

        let (result, session) = run(&api, options(10, 100).with_cancellation(token)).await;

        assert!(matches!(result, Err(PollError::Cancelled)));
        assert_eq!(api.status_call_count(), 0);
        assert_eq!(session.attempt_count(), 0);
        assert_eq!(session.state(), PollState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep_skips_next_call() {
        let api = Arc::new(FakeApi::new(
            vec![],
            Step::Status(AnalysisStatus::Processing),
        ));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let (result, _) = run(&api, options(10, 1_000).with_cancellation(token)).await;

        assert!(matches!(result, Err(PollError::Cancelled)));
        assert_eq!(api.status_call_count(), 1);
        assert!(start.elapsed() < Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_call_discards_result() {
        let token = CancellationToken::new();
        let mut fake = FakeApi::new(
            vec![Step::Status(AnalysisStatus::Processing)],
            Step::Status(AnalysisStatus::Completed),
        );
        fake.cancel_on_status_call = Some((2, token.clone()));
        let api = Arc::new(fake);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        let opts = options(10, 100)
            .with_cancellation(token)
            .on_progress(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let (result, _) = run(&api, opts).await;

        assert!(matches!(result, Err(PollError::Cancelled)));
        assert_eq!(api.status_call_count(), 2);
        assert_eq!(api.get_call_count(), 0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_fetch_errors() {
        let mut fake = FakeApi::new(vec![], Step::Status(AnalysisStatus::Completed));
        fake.get_error = Some(404);
        let api = Arc::new(fake);
        let (result, _) = run(&api, options(10, 100)).await;
        assert!(matches!(
            result,
            Err(PollError::PermanentRequest { status: 404, .. })
        ));

        let mut fake = FakeApi::new(vec![], Step::Status(AnalysisStatus::Completed));
        fake.get_error = Some(503);
        let api = Arc::new(fake);
        let (result, session) = run(&api, options(10, 100)).await;
        assert!(matches!(result, Err(PollError::ResultFetch(_))));
        assert_eq!(api.get_call_count(), 1);
        assert_eq!(api.status_call_count(), 1);
        assert_eq!(session.state(), PollState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_arguments_make_no_calls() {
        let api = Arc::new(FakeApi::new(
            vec![],
            Step::Status(AnalysisStatus::Completed),
        ));

        let (result, _) = run(&api, options(0, 100)).await;
        assert!(matches!(result, Err(PollError::InvalidRequest(_))));

        let poller = JobStatusPoller::new(api.clone());
        let result = poller.poll_until_complete("", options(5, 100)).await;
        assert!(matches!(result, Err(PollError::InvalidRequest(_))));

        assert_eq!(api.status_call_count(), 0);
    }

    #[test]
    fn test_session_bookkeeping() {
        let mut session = PollSession::new("job-9");
        assert_eq!(session.state(), PollState::Idle);
        assert!(!session.state().is_terminal());

        session.begin_attempt();
        assert_eq!(session.record_failure(), 1);
        session.begin_attempt();
        assert_eq!(session.record_failure(), 2);
        session.begin_attempt();
        session.record_success();

        assert_eq!(session.attempt_count(), 3);
        assert_eq!(session.consecutive_errors(), 0);
        assert_eq!(session.state(), PollState::Polling);
        assert!(session.has_attempts_left(4));
        assert!(!session.has_attempts_left(3));

        assert!(session.cancel().is_cancelled());
        assert!(session.state().is_terminal());
    }

    #[test]
    fn test_default_options() {
        let opts = PollOptions::default();
        assert_eq!(opts.max_attempts, 60);
        assert_eq!(opts.base_interval, Duration::from_millis(5000));
        assert_eq!(opts.backoff().delay_for(1), Duration::from_secs(10));
        assert_eq!(opts.backoff().delay_for(10), Duration::from_secs(60));
    }
}

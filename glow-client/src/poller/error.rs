//! Poll outcome errors

use thiserror::Error;

use crate::error::ClientError;

/// Default message when the server marks a job failed without a reason
pub(crate) const DEFAULT_FAILURE_MESSAGE: &str = "Analysis failed";

/// Ways a poll session can end other than with a result
///
/// Each variant is a distinct signal so callers can react differently:
/// offer a retry, show the server's message, or exit silently on
/// cancellation.
#[derive(Debug, Error)]
pub enum PollError {
    /// Server reported `failed` for the job
    #[error("{message}")]
    JobFailed { message: String },

    /// Status or result request rejected with a 4xx; retrying cannot help
    #[error(
        "Request rejected (status {status}): {}",
        .message.as_deref().unwrap_or("please try again later")
    )]
    PermanentRequest { status: u16, message: Option<String> },

    /// No bearer token available locally
    #[error("Authorization required")]
    AuthRequired,

    /// Job still not terminal after the attempt budget was spent
    ///
    /// The job may still complete server-side.
    #[error("Timed out after {attempts} status checks, try again later")]
    AttemptsExhausted { attempts: u32 },

    /// Caller cancelled the session
    #[error("Polling cancelled")]
    Cancelled,

    /// Submission failed transiently; no job was tracked
    #[error("Failed to submit analysis: {0}")]
    Submit(#[source] ClientError),

    /// Job completed but its result could not be fetched
    ///
    /// Not retried by the poller; fetching the result again is safe.
    #[error("Failed to fetch completed analysis: {0}")]
    ResultFetch(#[source] ClientError),

    /// Arguments rejected before any request was sent
    #[error("Invalid poll request: {0}")]
    InvalidRequest(String),
}

impl PollError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Maps a client error that must not be retried, or returns it back
    pub(crate) fn from_permanent(err: ClientError) -> Result<Self, ClientError> {
        match err {
            ClientError::AuthRequired => Ok(Self::AuthRequired),
            ClientError::Validation(msg) | ClientError::InvalidConfig(msg) => {
                Ok(Self::InvalidRequest(msg))
            }
            err if err.is_client_error() => Ok(Self::PermanentRequest {
                status: err.status().unwrap_or_default(),
                message: err.server_message().map(str::to_string),
            }),
            err => Err(err),
        }
    }
}

//! Analysis job polling
//!
//! Tracks one submitted analysis job until the server reports a terminal
//! status. Transient failures are retried with capped exponential backoff,
//! client errors abort immediately, and callers can cancel cooperatively.

mod backoff;
mod error;
mod session;

pub use backoff::BackoffPolicy;
pub use error::PollError;
pub use session::{
    AnalysisApi, JobStatusPoller, PollOptions, PollSession, PollState, ProgressCallback,
};

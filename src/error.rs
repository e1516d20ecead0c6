use polars::error::PolarsError;
use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a [`PvLiveError`].
///
/// The client distinguishes caller mistakes (rejected before any network
/// activity), failures to communicate with the service within the retry
/// budget, and connection-level failures that bypass the retry loop
/// entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Communication,
    Transport,
}

#[derive(Debug, Error)]
pub enum PvLiveError {
    #[error("pes_id must be an integer between 0 and 327 (inclusive), got {0}")]
    InvalidPesId(u32),

    /// Connection-level failure (DNS, connect, body read). Not retried.
    #[error("transport failure for {url}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("PV_Live API request to {url} failed after {attempts} attempts (last status {last_status})")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_status: StatusCode,
    },

    #[error("PV_Live API response from {url} is not valid JSON")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected PV_Live API response shape: {0}")]
    UnexpectedResponse(String),

    #[error("failed to build dataframe")]
    DataFrame(#[from] PolarsError),
}

impl PvLiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PvLiveError::InvalidPesId(_) => ErrorKind::InvalidArgument,
            PvLiveError::Network { .. } => ErrorKind::Transport,
            PvLiveError::RetriesExhausted { .. }
            | PvLiveError::InvalidJson { .. }
            | PvLiveError::UnexpectedResponse(_)
            | PvLiveError::DataFrame(_) => ErrorKind::Communication,
        }
    }
}

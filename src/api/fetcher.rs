use crate::api::backoff::BackoffPolicy;
use crate::error::PvLiveError;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::thread;

/// Outcome of one transport-level GET: a successful status with its body,
/// or a server-signaled HTTP error status.
pub(crate) enum GetOutcome {
    Body(String),
    HttpError(StatusCode),
}

/// Minimal blocking HTTP seam. Production uses reqwest; tests script it.
///
/// Transport-level failures (DNS, connect, body read) are returned as
/// errors and are never retried; HTTP error statuses come back as
/// [`GetOutcome::HttpError`] and are.
pub(crate) trait Transport {
    fn get(&self, url: &str) -> Result<GetOutcome, PvLiveError>;
}

pub(crate) struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<GetOutcome, PvLiveError> {
        let response = self.client.get(url).send().map_err(|e| PvLiveError::Network {
            url: url.to_owned(),
            source: Box::new(e),
        })?;
        let status = response.status();
        if status.is_success() {
            let body = response.text().map_err(|e| PvLiveError::Network {
                url: url.to_owned(),
                source: Box::new(e),
            })?;
            Ok(GetOutcome::Body(body))
        } else {
            Ok(GetOutcome::HttpError(status))
        }
    }
}

/// GET `url` and decode its JSON body, retrying HTTP error statuses up to
/// `retries` extra times with backoff sleeps in between.
pub(crate) fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    backoff: &dyn BackoffPolicy,
    retries: u32,
    url: &str,
) -> Result<T, PvLiveError> {
    let mut attempt: u32 = 0;
    loop {
        debug!("GET {url} (attempt {}/{})", attempt + 1, retries + 1);
        match transport.get(url)? {
            GetOutcome::Body(body) => {
                return serde_json::from_str(&body).map_err(|source| PvLiveError::InvalidJson {
                    url: url.to_owned(),
                    source,
                });
            }
            GetOutcome::HttpError(status) => {
                attempt += 1;
                if attempt > retries {
                    return Err(PvLiveError::RetriesExhausted {
                        url: url.to_owned(),
                        attempts: attempt,
                        last_status: status,
                    });
                }
                let delay = backoff.delay(attempt - 1);
                warn!("GET {url} returned {status}, retrying in {delay:?}");
                thread::sleep(delay);
            }
        }
    }
}

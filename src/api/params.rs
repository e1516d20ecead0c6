use crate::types::pes_id::PesId;
use chrono::{DateTime, Utc};

/// Timestamp serialization the API expects: ISO-8601 UTC with a `Z` suffix.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Query parameters for one request, compiled before URL assembly.
///
/// Only present parameters are emitted; there is no client-side defaulting
/// of absent ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct QueryParams {
    extra_fields: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl QueryParams {
    /// A lone `start` becomes a point query: `end` falls back to `start`.
    /// An empty `extra_fields` string is treated as absent.
    pub(crate) fn compile(
        extra_fields: Option<&str>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            extra_fields: extra_fields
                .filter(|fields| !fields.is_empty())
                .map(str::to_owned),
            start,
            end: end.or(start),
        }
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(fields) = &self.extra_fields {
            pairs.push(("extra_fields", fields.clone()));
        }
        if let Some(start) = self.start {
            pairs.push(("start", start.format(TIMESTAMP_FORMAT).to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("end", end.format(TIMESTAMP_FORMAT).to_string()));
        }
        pairs
    }
}

/// Assemble the canonical URL for a region and parameter set: the region id
/// is a path segment, everything else goes in the query string.
pub(crate) fn build_url(base_url: &str, pes_id: PesId, params: &QueryParams) -> String {
    let mut url = format!("{}/{}", base_url.trim_end_matches('/'), pes_id);
    let pairs = params.pairs();
    if !pairs.is_empty() {
        let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        url.push('?');
        url.push_str(&query.join("&"));
    }
    url
}

use chrono::{DateTime, Duration, Utc};
use std::cmp::min;

/// One half-hour interval, the service's native resolution.
pub(crate) fn interval() -> Duration {
    Duration::minutes(30)
}

/// Split a query window into consecutive sub-windows no longer than
/// `max_range` each.
///
/// Consecutive chunks are separated by exactly one interval so the row at
/// the seam is not fetched twice: each chunk covers
/// `[request_start, min(end, request_start + max_range)]` and the next
/// chunk starts one interval after that. A degenerate window with
/// `start >= end` produces no chunks.
pub(crate) fn chunk_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_range: Duration,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut chunks = Vec::new();
    let mut request_start = start;
    while request_start < end {
        let request_end = min(end, request_start + max_range);
        chunks.push((request_start, request_end));
        request_start = request_start + max_range + interval();
    }
    chunks
}

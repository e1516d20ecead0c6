//! Main entry point for the PV_Live client. `PvLive` turns the five query
//! shapes (latest, at, between, day peak, day energy) into HTTP GETs
//! against the Sheffield Solar API, with retry, window chunking and typed
//! row decoding handled internally.

use crate::api::backoff::{BackoffPolicy, ExponentialBackoff};
use crate::api::chunk::{chunk_window, interval};
use crate::api::fetcher::{fetch_json, HttpTransport, Transport};
use crate::api::params::{build_url, QueryParams};
use crate::api::response::ApiPage;
use crate::error::PvLiveError;
use crate::types::generation::{GenerationRow, GenerationSeries};
use crate::types::pes_id::PesId;
use crate::utils::nearest_half_hour;
use bon::bon;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use log::debug;

/// Immutable client configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the PES endpoint, without the region path segment.
    pub base_url: String,
    /// Extra attempts after a first failed one. HTTP error statuses are
    /// retried with exponential backoff; transport failures are not.
    pub retries: u32,
    /// Per-request window limit for national (PES 0) queries.
    pub national_max_range: Duration,
    /// Per-request window limit for regional queries.
    pub regional_max_range: Duration,
    /// Delay before the first retry; doubles on each subsequent one.
    pub initial_backoff: std::time::Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api0.solar.sheffield.ac.uk/pvlive/v2/pes".to_owned(),
            retries: 3,
            national_max_range: Duration::days(365),
            regional_max_range: Duration::days(30),
            initial_backoff: std::time::Duration::from_secs(1),
        }
    }
}

/// Client for the PV_Live web API.
///
/// All operations are synchronous and issue requests strictly
/// sequentially; retry backoff blocks the calling thread.
///
/// # Examples
///
/// ```no_run
/// use pvlive::{PesId, PvLive};
///
/// # fn run() -> Result<(), pvlive::PvLiveError> {
/// let client = PvLive::new();
/// let latest = client.latest().pes_id(PesId::new(23)?).call()?;
/// println!("{latest:?}");
/// # Ok(())
/// # }
/// ```
pub struct PvLive {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    backoff: Box<dyn BackoffPolicy>,
}

impl PvLive {
    /// Client with the default endpoint and retry policy.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let backoff = ExponentialBackoff::new(config.initial_backoff);
        Self {
            config,
            transport: Box::new(HttpTransport::new()),
            backoff: Box::new(backoff),
        }
    }

    /// Replace the retry delay strategy, e.g. with [`crate::NoBackoff`].
    pub fn with_backoff(mut self, backoff: impl BackoffPolicy + 'static) -> Self {
        self.backoff = Box::new(backoff);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
        backoff: impl BackoffPolicy + 'static,
    ) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            backoff: Box::new(backoff),
        }
    }

    fn query(&self, pes_id: PesId, params: &QueryParams) -> Result<GenerationSeries, PvLiveError> {
        let url = build_url(&self.config.base_url, pes_id, params);
        let page: ApiPage = fetch_json(
            self.transport.as_ref(),
            self.backoff.as_ref(),
            self.config.retries,
            &url,
        )?;
        page.into_series()
    }

    fn max_range(&self, pes_id: PesId) -> Duration {
        if pes_id.is_national() {
            self.config.national_max_range
        } else {
            self.config.regional_max_range
        }
    }

    /// The 48 interval-end labels of one day: 00:30 through 00:00 next day.
    fn day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let midnight = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
        let start = midnight + interval();
        let end = start + Duration::days(1) - interval();
        (start, end)
    }
}

impl Default for PvLive {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl PvLive {
    /// Latest published estimate for a region.
    ///
    /// Returns `None` when the service has no data for the region.
    #[builder]
    pub fn latest(
        &self,
        pes_id: Option<PesId>,
        extra_fields: Option<&str>,
    ) -> Result<Option<GenerationRow>, PvLiveError> {
        let pes_id = pes_id.unwrap_or_default();
        let params = QueryParams::compile(extra_fields, None, None);
        let series = self.query(pes_id, &params)?;
        Ok(series.into_iter().next())
    }

    /// Estimate at a given instant.
    ///
    /// The timestamp snaps up to the end of the half hour it falls in,
    /// matching the service's end-of-interval labeling.
    #[builder]
    pub fn at(
        &self,
        datetime: DateTime<Utc>,
        pes_id: Option<PesId>,
        extra_fields: Option<&str>,
    ) -> Result<Option<GenerationRow>, PvLiveError> {
        let pes_id = pes_id.unwrap_or_default();
        let datetime = nearest_half_hour(datetime);
        let params = QueryParams::compile(extra_fields, Some(datetime), None);
        let series = self.query(pes_id, &params)?;
        Ok(series.into_iter().next())
    }

    /// Estimates over a window, inclusive of both (normalized) bounds.
    ///
    /// Windows longer than the per-request limit (365 days national, 30
    /// days regional) are fetched in consecutive chunks and concatenated in
    /// chronological order.
    #[builder]
    pub fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        pes_id: Option<PesId>,
        extra_fields: Option<&str>,
    ) -> Result<GenerationSeries, PvLiveError> {
        let pes_id = pes_id.unwrap_or_default();
        let start = nearest_half_hour(start);
        let end = nearest_half_hour(end);
        let chunks = chunk_window(start, end, self.max_range(pes_id));
        debug!("between query for pes {pes_id} spans {} chunk(s)", chunks.len());

        let mut out = GenerationSeries::default();
        for (chunk_start, chunk_end) in chunks {
            let params = QueryParams::compile(extra_fields, Some(chunk_start), Some(chunk_end));
            let series = self.query(pes_id, &params)?;
            out.columns = series.columns;
            out.rows.extend(series.rows);
        }
        Ok(out)
    }

    /// Row with the day's maximum estimate.
    ///
    /// Rows without an estimate never win; ties go to the earliest row. A
    /// day with no estimates at all (or no rows) returns `None`.
    #[builder]
    pub fn day_peak(
        &self,
        date: NaiveDate,
        pes_id: Option<PesId>,
        extra_fields: Option<&str>,
    ) -> Result<Option<GenerationRow>, PvLiveError> {
        let pes_id = pes_id.unwrap_or_default();
        let (start, end) = Self::day_window(date);
        let params = QueryParams::compile(extra_fields, Some(start), Some(end));
        let series = self.query(pes_id, &params)?;

        let mut peak: Option<(usize, f64)> = None;
        for (i, row) in series.rows.iter().enumerate() {
            if let Some(generation) = row.generation_mw {
                match peak {
                    Some((_, max)) if generation <= max => {}
                    _ => peak = Some((i, generation)),
                }
            }
        }
        let mut rows = series.rows;
        Ok(peak.map(|(i, _)| rows.swap_remove(i)))
    }

    /// Cumulative generation for a day, in MWh.
    ///
    /// Half-hourly MW readings are summed and halved; intervals without an
    /// estimate count as zero. A day with no rows at all returns `None`.
    #[builder]
    pub fn day_energy(
        &self,
        date: NaiveDate,
        pes_id: Option<PesId>,
    ) -> Result<Option<f64>, PvLiveError> {
        let pes_id = pes_id.unwrap_or_default();
        let (start, end) = Self::day_window(date);
        let params = QueryParams::compile(None, Some(start), Some(end));
        let series = self.query(pes_id, &params)?;
        if series.is_empty() {
            return Ok(None);
        }
        let total: f64 = series.iter().filter_map(|r| r.generation_mw).sum();
        Ok(Some(total * 0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::backoff::NoBackoff;
    use crate::api::fetcher::testing::{FakeTransport, Step};
    use chrono::TimeZone;

    const BASE: &str = "https://api0.solar.sheffield.ac.uk/pvlive/v2/pes";
    const META: &str = r#"["pes_id", "datetime_gmt", "generation_mw"]"#;

    fn client(steps: Vec<Step>) -> (PvLive, FakeTransport) {
        let transport = FakeTransport::new(steps);
        let client = PvLive::with_transport(ClientConfig::default(), transport.clone(), NoBackoff);
        (client, transport)
    }

    fn body(rows: &str) -> Step {
        Step::Body(format!(r#"{{"data": {rows}, "meta": {META}}}"#))
    }

    #[test]
    fn latest_returns_newest_row() {
        let (client, transport) = client(vec![body(
            r#"[[0, "2018-06-03T12:00:00Z", 2500.0], [0, "2018-06-03T11:30:00Z", 2400.0]]"#,
        )]);
        let row = client.latest().call().unwrap().unwrap();
        assert_eq!(row.generation_mw, Some(2500.0));
        assert_eq!(transport.requests(), vec![format!("{BASE}/0")]);
    }

    #[test]
    fn latest_with_no_data_is_none() {
        let (client, _) = client(vec![body("[]")]);
        assert_eq!(client.latest().call().unwrap(), None);
    }

    #[test]
    fn latest_passes_region_and_extra_fields() {
        let (client, transport) = client(vec![body("[]")]);
        let region = PesId::new(23).unwrap();
        let _ = client
            .latest()
            .pes_id(region)
            .extra_fields("ucl_mw")
            .call()
            .unwrap();
        assert_eq!(
            transport.requests(),
            vec![format!("{BASE}/23?extra_fields=ucl_mw")]
        );
    }

    #[test]
    fn at_normalizes_to_interval_end() {
        let (client, transport) = client(vec![body(r#"[[0, "2018-06-03T13:00:00Z", 3000.0]]"#)]);
        let dt = Utc.with_ymd_and_hms(2018, 6, 3, 12, 35, 0).unwrap();
        let row = client.at().datetime(dt).call().unwrap().unwrap();
        assert_eq!(row.generation_mw, Some(3000.0));
        assert_eq!(
            transport.requests(),
            vec![format!(
                "{BASE}/0?start=2018-06-03T13:00:00Z&end=2018-06-03T13:00:00Z"
            )]
        );
    }

    #[test]
    fn at_with_empty_data_is_none() {
        let (client, _) = client(vec![body("[]")]);
        let dt = Utc.with_ymd_and_hms(2018, 6, 3, 12, 0, 0).unwrap();
        assert_eq!(client.at().datetime(dt).call().unwrap(), None);
    }

    #[test]
    fn between_chunks_long_national_windows() {
        let (client, transport) = client(vec![
            body(r#"[[0, "2018-06-01T00:00:00Z", 1.0]]"#),
            body(r#"[[0, "2019-01-02T00:00:00Z", 2.0]]"#),
        ]);
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(400);
        let series = client.between().start(start).end(end).call().unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(
            transport.requests(),
            vec![
                format!("{BASE}/0?start=2018-01-01T00:00:00Z&end=2019-01-01T00:00:00Z"),
                format!("{BASE}/0?start=2019-01-01T00:30:00Z&end=2019-02-05T00:00:00Z"),
            ]
        );
    }

    #[test]
    fn between_uses_regional_limit_for_regions() {
        let (client, transport) = client(vec![body("[]"), body("[]")]);
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(40);
        let series = client
            .between()
            .start(start)
            .end(end)
            .pes_id(PesId::new(10).unwrap())
            .call()
            .unwrap();
        assert!(series.is_empty());
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn between_normalizes_both_bounds() {
        let (client, transport) = client(vec![body("[]")]);
        let start = Utc.with_ymd_and_hms(2018, 6, 3, 12, 20, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2018, 6, 3, 14, 0, 0).unwrap();
        let _ = client.between().start(start).end(end).call().unwrap();
        assert_eq!(
            transport.requests(),
            vec![format!(
                "{BASE}/0?start=2018-06-03T12:30:00Z&end=2018-06-03T14:00:00Z"
            )]
        );
    }

    #[test]
    fn day_peak_picks_first_maximum() {
        let (client, transport) = client(vec![body(
            r#"[[0, "2018-06-03T00:30:00Z", 2.0],
                [0, "2018-06-03T01:00:00Z", 5.0],
                [0, "2018-06-03T01:30:00Z", null],
                [0, "2018-06-03T02:00:00Z", 5.0]]"#,
        )]);
        let day = NaiveDate::from_ymd_opt(2018, 6, 3).unwrap();
        let row = client.day_peak().date(day).call().unwrap().unwrap();
        assert_eq!(row.generation_mw, Some(5.0));
        assert_eq!(
            row.datetime_gmt,
            Utc.with_ymd_and_hms(2018, 6, 3, 1, 0, 0).unwrap()
        );
        // The whole day is queried: 00:30 through 00:00 next day.
        assert_eq!(
            transport.requests(),
            vec![format!(
                "{BASE}/0?start=2018-06-03T00:30:00Z&end=2018-06-04T00:00:00Z"
            )]
        );
    }

    #[test]
    fn day_peak_with_only_null_rows_is_none() {
        let (client, _) = client(vec![body(
            r#"[[0, "2018-06-03T00:30:00Z", null],
                [0, "2018-06-03T01:00:00Z", null]]"#,
        )]);
        let day = NaiveDate::from_ymd_opt(2018, 6, 3).unwrap();
        assert_eq!(client.day_peak().date(day).call().unwrap(), None);
    }

    #[test]
    fn day_peak_with_no_rows_is_none() {
        let (client, _) = client(vec![body("[]")]);
        let day = NaiveDate::from_ymd_opt(2018, 6, 3).unwrap();
        assert_eq!(client.day_peak().date(day).call().unwrap(), None);
    }

    #[test]
    fn day_energy_sums_half_hours() {
        let (client, _) = client(vec![body(
            r#"[[0, "2018-06-03T00:30:00Z", 2.0],
                [0, "2018-06-03T01:00:00Z", null],
                [0, "2018-06-03T01:30:00Z", 4.0]]"#,
        )]);
        let day = NaiveDate::from_ymd_opt(2018, 6, 3).unwrap();
        let energy = client.day_energy().date(day).call().unwrap();
        assert_eq!(energy, Some(3.0));
    }

    #[test]
    fn day_energy_with_no_rows_is_none() {
        let (client, _) = client(vec![body("[]")]);
        let day = NaiveDate::from_ymd_opt(2018, 6, 3).unwrap();
        assert_eq!(client.day_energy().date(day).call().unwrap(), None);
    }

    #[test]
    fn custom_base_url_is_respected() {
        let transport = FakeTransport::new(vec![body("[]")]);
        let config = ClientConfig {
            base_url: "http://localhost:8080/pes".to_owned(),
            ..ClientConfig::default()
        };
        let client = PvLive::with_transport(config, transport.clone(), NoBackoff);
        let _ = client.latest().call().unwrap();
        assert_eq!(transport.requests(), vec!["http://localhost:8080/pes/0"]);
    }
}

use crate::error::PvLiveError;
use crate::types::generation::{GenerationRow, GenerationSeries, BASELINE_COLUMNS};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Raw shape of one PV_Live response page: row arrays plus the column-name
/// manifest describing their field order.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiPage {
    pub(crate) data: Vec<Vec<Value>>,
    pub(crate) meta: Vec<String>,
}

impl ApiPage {
    /// Convert the page into typed rows, preserving row and field order.
    pub(crate) fn into_series(self) -> Result<GenerationSeries, PvLiveError> {
        if self.meta.len() < BASELINE_COLUMNS.len() {
            return Err(PvLiveError::UnexpectedResponse(format!(
                "meta lists {} columns, expected at least {}",
                self.meta.len(),
                BASELINE_COLUMNS.len()
            )));
        }
        let mut rows = Vec::with_capacity(self.data.len());
        for raw in self.data {
            rows.push(row_from_values(&self.meta, raw)?);
        }
        Ok(GenerationSeries {
            columns: self.meta,
            rows,
        })
    }
}

fn row_from_values(meta: &[String], raw: Vec<Value>) -> Result<GenerationRow, PvLiveError> {
    if raw.len() != meta.len() {
        return Err(PvLiveError::UnexpectedResponse(format!(
            "row has {} fields, meta lists {}",
            raw.len(),
            meta.len()
        )));
    }
    let mut values = raw.into_iter();

    let pes_id = match values.next() {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                PvLiveError::UnexpectedResponse(format!("pes_id out of range: {n}"))
            })?,
        other => {
            return Err(PvLiveError::UnexpectedResponse(format!(
                "pes_id is not an integer: {other:?}"
            )))
        }
    };

    let datetime_gmt = match values.next() {
        Some(Value::String(s)) => parse_timestamp(&s)?,
        other => {
            return Err(PvLiveError::UnexpectedResponse(format!(
                "datetime_gmt is not a string: {other:?}"
            )))
        }
    };

    let generation_mw = match values.next() {
        Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(n.as_f64().ok_or_else(|| {
            PvLiveError::UnexpectedResponse(format!("generation_mw is not representable: {n}"))
        })?),
        other => {
            return Err(PvLiveError::UnexpectedResponse(format!(
                "generation_mw is not a number: {other:?}"
            )))
        }
    };

    let extra = meta[BASELINE_COLUMNS.len()..]
        .iter()
        .cloned()
        .zip(values)
        .collect();

    Ok(GenerationRow {
        pes_id,
        datetime_gmt,
        generation_mw,
        extra,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, PvLiveError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PvLiveError::UnexpectedResponse(format!("bad timestamp '{s}': {e}")))
}

//! Typed rows and row sequences produced from PV_Live responses, with
//! conversion into polars dataframes for tabular consumers.

use crate::error::PvLiveError;
use chrono::{DateTime, NaiveDateTime, Utc};
use polars::prelude::{Column, DataFrame};
use serde_json::Value;

/// Column names every response carries, in row order, ahead of any
/// requested extra fields.
pub const BASELINE_COLUMNS: [&str; 3] = ["pes_id", "datetime_gmt", "generation_mw"];

/// One half-hourly PV_Live observation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRow {
    pub pes_id: u32,
    /// End of the half-hour interval this estimate covers.
    pub datetime_gmt: DateTime<Utc>,
    /// Estimated generation in MW; `None` when the service has no estimate
    /// for the interval.
    pub generation_mw: Option<f64>,
    /// Requested extra fields, named, in the order they were requested.
    pub extra: Vec<(String, Value)>,
}

impl GenerationRow {
    /// Column names for this row: the baseline three plus extras.
    pub fn column_names(&self) -> Vec<String> {
        BASELINE_COLUMNS
            .iter()
            .map(|s| (*s).to_owned())
            .chain(self.extra.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    /// Render the row as a single-row dataframe.
    pub fn to_data_frame(&self) -> Result<DataFrame, PvLiveError> {
        build_frame(&self.column_names(), std::slice::from_ref(self))
    }
}

/// An ordered sequence of observations plus the column manifest describing
/// row field order. Rows from chunked queries are concatenated in
/// chronological chunk order; no further sorting is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationSeries {
    pub columns: Vec<String>,
    pub rows: Vec<GenerationRow>,
}

impl GenerationSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GenerationRow> {
        self.rows.iter()
    }

    /// Render the series as a dataframe, columns named by the manifest.
    pub fn to_data_frame(&self) -> Result<DataFrame, PvLiveError> {
        build_frame(&self.columns, &self.rows)
    }
}

impl IntoIterator for GenerationSeries {
    type Item = GenerationRow;
    type IntoIter = std::vec::IntoIter<GenerationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

fn build_frame(columns: &[String], rows: &[GenerationRow]) -> Result<DataFrame, PvLiveError> {
    // An empty series from a query that issued no requests has no manifest;
    // fall back to the baseline column names.
    let baseline: Vec<String>;
    let names: &[String] = if columns.len() >= BASELINE_COLUMNS.len() {
        columns
    } else {
        baseline = BASELINE_COLUMNS.iter().map(|s| (*s).to_owned()).collect();
        baseline.as_slice()
    };

    let mut out: Vec<Column> = Vec::with_capacity(names.len());
    out.push(Column::new(
        names[0].as_str().into(),
        rows.iter().map(|r| i64::from(r.pes_id)).collect::<Vec<i64>>(),
    ));
    out.push(Column::new(
        names[1].as_str().into(),
        rows.iter()
            .map(|r| r.datetime_gmt.naive_utc())
            .collect::<Vec<NaiveDateTime>>(),
    ));
    out.push(Column::new(
        names[2].as_str().into(),
        rows.iter()
            .map(|r| r.generation_mw)
            .collect::<Vec<Option<f64>>>(),
    ));
    for (i, name) in names.iter().enumerate().skip(BASELINE_COLUMNS.len()) {
        let values: Vec<&Value> = rows
            .iter()
            .map(|r| {
                r.extra
                    .get(i - BASELINE_COLUMNS.len())
                    .map(|(_, v)| v)
                    .unwrap_or(&Value::Null)
            })
            .collect();
        out.push(json_column(name, &values));
    }
    DataFrame::new(out).map_err(PvLiveError::from)
}

/// Extra-field values are whatever the server sent. All-numeric columns
/// become Float64, anything else falls back to strings.
fn json_column(name: &str, values: &[&Value]) -> Column {
    let numeric = values.iter().all(|v| v.is_null() || v.is_number());
    if numeric {
        Column::new(
            name.into(),
            values.iter().map(|v| v.as_f64()).collect::<Vec<Option<f64>>>(),
        )
    } else {
        Column::new(
            name.into(),
            values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect::<Vec<Option<String>>>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn row(minute: u32, gen: Option<f64>, extra: Vec<(String, Value)>) -> GenerationRow {
        GenerationRow {
            pes_id: 0,
            datetime_gmt: Utc.with_ymd_and_hms(2018, 6, 3, 12, minute, 0).unwrap(),
            generation_mw: gen,
            extra,
        }
    }

    #[test]
    fn series_to_data_frame_has_manifest_columns() {
        let series = GenerationSeries {
            columns: vec![
                "pes_id".to_owned(),
                "datetime_gmt".to_owned(),
                "generation_mw".to_owned(),
                "ucl_mw".to_owned(),
            ],
            rows: vec![
                row(0, Some(2500.0), vec![("ucl_mw".to_owned(), json!(2600.0))]),
                row(30, None, vec![("ucl_mw".to_owned(), json!(null))]),
            ],
        };
        let df = series.to_data_frame().unwrap();
        assert_eq!(df.shape(), (2, 4));
        assert_eq!(
            df.get_column_names(),
            ["pes_id", "datetime_gmt", "generation_mw", "ucl_mw"]
        );
    }

    #[test]
    fn empty_series_falls_back_to_baseline_columns() {
        let df = GenerationSeries::default().to_data_frame().unwrap();
        assert_eq!(df.shape(), (0, 3));
        assert_eq!(
            df.get_column_names(),
            ["pes_id", "datetime_gmt", "generation_mw"]
        );
    }

    #[test]
    fn single_row_to_data_frame() {
        let r = row(0, Some(1234.5), vec![("site_count".to_owned(), json!(900))]);
        let df = r.to_data_frame().unwrap();
        assert_eq!(df.shape(), (1, 4));
        assert_eq!(
            df.get_column_names(),
            ["pes_id", "datetime_gmt", "generation_mw", "site_count"]
        );
    }

    #[test]
    fn non_numeric_extra_becomes_string_column() {
        let series = GenerationSeries {
            columns: vec![
                "pes_id".to_owned(),
                "datetime_gmt".to_owned(),
                "generation_mw".to_owned(),
                "note".to_owned(),
            ],
            rows: vec![row(0, Some(1.0), vec![("note".to_owned(), json!("ok"))])],
        };
        let df = series.to_data_frame().unwrap();
        assert_eq!(df.shape(), (1, 4));
    }
}

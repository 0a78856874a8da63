//! Metric records and warehouse row decoding
//!
//! A [`MetricRecord`] is one sparse observation: a calendar day, the key
//! that identifies the observation within its series, and an optional
//! value. Warehouse rows are looser than that. Dates arrive as plain
//! strings or wrapped as `{"value": "..."}`, sometimes with a time of day,
//! and values arrive as numbers, numeric strings, `"NaN"` or `null`.
//!
//! Decoding normalizes all of this in one place:
//!
//! - the date keeps its **day portion only**, so `2025-03-02` and
//!   `2025-03-02T17:45:00Z` land on the same day
//! - a value that is not a finite number becomes `None`
//! - a row whose date cannot be read is dropped and counted

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub date: NaiveDate,
    /// Identifies the record within its series (feedback id, task id, day)
    pub key: String,
    pub value: Option<f64>,
    /// Category label computed upstream, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Secondary grouping dimension (task title, cohort)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
}

impl MetricRecord {
    pub fn new(date: NaiveDate, key: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            date,
            key: key.into(),
            value,
            category: None,
            dimension: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = Some(dimension.into());
        self
    }
}

/// Date as the warehouse serializes it
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Text(String),
    Wrapped { value: String },
}

impl RawDate {
    fn as_str(&self) -> &str {
        match self {
            RawDate::Text(s) => s,
            RawDate::Wrapped { value } => value,
        }
    }
}

/// One warehouse row, before normalization
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "created_at", alias = "timestamp")]
    pub date: RawDate,
    #[serde(default, alias = "id", alias = "subject_id")]
    pub key: Option<Value>,
    #[serde(default, alias = "score", alias = "sentiment_score")]
    pub value: Option<Value>,
    #[serde(default, alias = "sentiment_category")]
    pub category: Option<String>,
    #[serde(default, alias = "task_title")]
    pub dimension: Option<String>,
}

impl RawRecord {
    /// Normalize into a [`MetricRecord`]. Fails only on an unreadable date.
    /// A row without a key is keyed by its ISO day.
    pub fn into_record(self) -> Result<MetricRecord> {
        let date = parse_day(self.date.as_str())?;
        let key = match self.key {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => date.format(DAY_FORMAT).to_string(),
            Some(other) => other.to_string(),
        };
        Ok(MetricRecord {
            date,
            key,
            value: self.value.as_ref().and_then(parse_value),
            category: self.category.filter(|c| !c.trim().is_empty()),
            dimension: self.dimension.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Parse the day portion of a date or timestamp string.
///
/// Everything from the first `T` or space onward is ignored, so no timezone
/// conversion can move a record onto a neighbouring day.
pub fn parse_day(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let day = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, DAY_FORMAT).map_err(|_| Error::InvalidDate(text.to_string()))
}

/// Interpret a JSON value as a finite number
pub fn parse_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Records decoded from one source, plus how many rows were unusable
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub records: Vec<MetricRecord>,
    pub malformed: usize,
}

/// Decode rows one by one, dropping the ones that cannot become records
pub fn decode_rows(rows: Vec<Value>) -> Decoded {
    let mut decoded = Decoded::default();
    for (i, row) in rows.into_iter().enumerate() {
        let record = serde_json::from_value::<RawRecord>(row)
            .map_err(Error::from)
            .and_then(RawRecord::into_record);
        match record {
            Ok(r) => decoded.records.push(r),
            Err(e) => {
                tracing::debug!(row = i, error = %e, "dropping malformed row");
                decoded.malformed += 1;
            }
        }
    }
    decoded
}

/// Read a JSON array of rows
pub fn read_records<R: Read>(reader: R) -> Result<Decoded> {
    let rows: Vec<Value> = serde_json::from_reader(reader)?;
    Ok(decode_rows(rows))
}

pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Decoded> {
    let file = std::fs::File::open(path.as_ref())?;
    read_records(std::io::BufReader::new(file))
}

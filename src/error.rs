//! Crate error type
//!
//! The pure core (classification, densification, aggregation, selection)
//! never fails. Errors only arise at the edges: decoding input files,
//! loading configuration, and parsing names typed on the command line.

use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("unknown scale '{0}' (expected grade, sentiment or none)")]
    UnknownScale(String),

    #[error("unknown view '{0}'")]
    UnknownView(String),

    #[error("unknown gap policy '{0}' (expected null or zero)")]
    UnknownGapPolicy(String),

    #[error("invalid config {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("a {days}-day window ending {end} falls outside the supported calendar")]
    WindowOutOfRange { end: NaiveDate, days: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

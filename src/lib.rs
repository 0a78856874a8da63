//! Pulsegrid - Calendar-aligned metrics for dashboard charts
//!
//! Pulsegrid turns the sparse, date-keyed rows a metrics warehouse returns
//! into what a chart actually draws: one point per calendar day, a category
//! and color per point, and per-category count matrices for stacked bars.
//!
//! # Overview
//!
//! A warehouse only returns days *that had data*. Plotting that directly
//! silently compresses time: a week of silence disappears between two
//! adjacent points. Pulsegrid enumerates every day of the requested window
//! and marks the missing ones explicitly, so gaps stay visible and a zero
//! is never confused with "nothing recorded".
//!
//! # Pipeline
//!
//! 1. **Decode** ([`record`]): JSON rows with loose field names become
//!    [`MetricRecord`]s. Rows without a usable date are dropped and counted.
//!
//! 2. **Densify** ([`densify`]): records are placed on a gapless day
//!    sequence under a [`GapPolicy`] (null gap for scores, zero fill for
//!    counts).
//!
//! 3. **Classify** ([`classify`]): every populated day gets a tier on a
//!    fixed scale and the tier's color.
//!
//! 4. **Aggregate** ([`aggregate`]): records are counted into a
//!    dimension x category matrix for stacked and grouped bars.
//!
//! 5. **Select** ([`selection`], [`dismissal`]): one coordinator holds the
//!    cross-view highlight and hover, and outside clicks clear it.
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use pulsegrid::{Densifier, GapPolicy, MetricRecord, Scale};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
//! let records = vec![MetricRecord::new(day(2), "fb-1", Some(0.8))];
//!
//! let series = Densifier::new(day(1), day(3))
//!     .with_gap_policy(GapPolicy::NullGap)
//!     .with_scale(Some(Scale::Sentiment))
//!     .densify(&records);
//!
//! assert_eq!(series.len(), 3);
//! assert_eq!(series.values, vec![None, Some(0.8), None]);
//! assert_eq!(series.key_at(1), Some("fb-1"));
//! ```
//!
//! # Scales
//!
//! | Scale | Tiers | Missing value (default) |
//! |-------|-------|-------------------------|
//! | Letter grade | A+, A, A-, B+, B, B-, C+, C, F, Document Access Error | F |
//! | Sentiment | Very Positive, Positive, Neutral, Negative, Very Negative | No Data |
//!
//! # Modules
//!
//! - [`classify`]: score to tier to color
//! - [`densify`]: sparse records to gapless day series
//! - [`aggregate`]: category count matrices
//! - [`selection`]: cross-view highlight and hover state
//! - [`dismissal`]: outside-click clearing
//! - [`record`]: input decoding
//! - [`config`]: JSON dashboard configuration
//! - [`report`]: Output formatters (HTML, JSON)

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod densify;
pub mod dismissal;
pub mod error;
pub mod record;
pub mod report;
pub mod selection;

pub use aggregate::{aggregate, aggregate_by_day, aggregate_by_dimension, CategoryMatrix};
pub use classify::{
    classify_score, classify_to_color, Category, Classifier, Color, GradeBoundaries, GradeTier,
    NullPolicy, Scale, SentimentTier,
};
pub use config::DashboardConfig;
pub use densify::{densify, DenseSeries, Densifier, GapPolicy};
pub use dismissal::{Bounds, DismissalPolicy, ElementPath, ElementRegion, LiveRegion, Point};
pub use error::{Error, Result};
pub use record::MetricRecord;
pub use report::Report;
pub use selection::{SelectionCoordinator, SelectionState, Style, StyleConfig, ViewType};

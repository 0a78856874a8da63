//! Report generation for dashboard data
//!
//! A [`Report`] bundles densified series and category matrices for one
//! window, together with the selection state they should be drawn under.
//!
//! - **HTML**: self-contained page, one table per series with classified
//!   colors and highlight/hover styling, one table per matrix
//! - **JSON**: machine-readable, for feeding a chart frontend
//!
//! # Usage
//!
//! ```ignore
//! use pulsegrid::report;
//!
//! // Automatically picks format based on extension
//! report::generate("dashboard.html", &report)?;  // HTML
//! report::generate("dashboard.json", &report)?;  // JSON
//! ```

pub mod html;
pub mod json;

use crate::aggregate::CategoryMatrix;
use crate::classify::{Category, Classifier, Scale};
use crate::densify::DenseSeries;
use crate::error::Result;
use crate::selection::{SelectionCoordinator, ViewType};
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, report: &Report) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, report)?,
        _ => json::write(&mut file, report)?,
    }
    tracing::debug!(path = %path.display(), "report written");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A densified series plus what it needs to be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub view: ViewType,
    pub scale: Option<Scale>,
    #[serde(flatten)]
    pub series: DenseSeries,
    /// Category per day; `None` on gapped days and for unscaled series
    pub categories: Vec<Option<Category>>,
}

impl NamedSeries {
    pub fn new(
        name: impl Into<String>,
        view: ViewType,
        scale: Option<Scale>,
        series: DenseSeries,
        classifier: &Classifier,
    ) -> Self {
        let categories = series
            .values
            .iter()
            .zip(&series.keys)
            .map(|(value, key)| match (scale, key) {
                (Some(scale), Some(_)) => Some(classifier.classify(*value, scale)),
                _ => None,
            })
            .collect();
        Self {
            name: name.into(),
            view,
            scale,
            series,
            categories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedMatrix {
    pub name: String,
    #[serde(flatten)]
    pub matrix: CategoryMatrix,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub generated: DateTime<Local>,
    pub window: Window,
    pub series: Vec<NamedSeries>,
    pub matrices: Vec<NamedMatrix>,
    pub selection: SelectionCoordinator,
}

impl Report {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            generated: Local::now(),
            window: Window { start, end },
            series: vec![],
            matrices: vec![],
            selection: SelectionCoordinator::default(),
        }
    }

    pub fn with_series(mut self, series: NamedSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_matrix(mut self, name: impl Into<String>, matrix: CategoryMatrix) -> Self {
        self.matrices.push(NamedMatrix {
            name: name.into(),
            matrix,
        });
        self
    }

    pub fn with_selection(mut self, selection: SelectionCoordinator) -> Self {
        self.selection = selection;
        self
    }

    pub fn summary(&self) -> Summary {
        Summary::from_series(&self.series)
    }
}

/// Summary statistics across every series in a report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub series: usize,
    pub days: usize,
    pub populated: usize,
    pub gaps: usize,
    /// Populated days per category label
    pub tiers: BTreeMap<String, usize>,
}

impl Summary {
    pub fn from_series(series: &[NamedSeries]) -> Self {
        let mut summary = Self::default();
        summary.series = series.len();

        for s in series {
            let populated = s.series.populated();
            summary.days += s.series.len();
            summary.populated += populated;
            summary.gaps += s.series.len() - populated;

            for category in s.categories.iter().flatten() {
                *summary.tiers.entry(category.label().to_string()).or_insert(0) += 1;
            }
        }

        summary
    }
}

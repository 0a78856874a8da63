//! Category aggregation
//!
//! Stacked and grouped bar charts need a rectangular count matrix: one row
//! per value of a secondary dimension (task title, day), one column per
//! tier of a scale. [`aggregate`] builds it from sparse records.
//!
//! Rows are data-driven: only dimension values that occur in the records
//! get a row, sorted ascending. A caller that needs every calendar day as a
//! row densifies first. Every row starts with every category at zero, so
//! the matrix never has holes.
//!
//! Records that cannot be placed (no dimension, or no classification) are
//! dropped. They are malformed rows, not zero observations, so they do not
//! show up in any count.

use crate::classify::{Category, Classifier, Scale};
use crate::record::MetricRecord;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMatrix {
    pub row_labels: Vec<String>,
    pub categories: Vec<Category>,
    /// `counts[row][category]`
    pub counts: Vec<Vec<u32>>,
}

impl CategoryMatrix {
    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }

    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
    }

    pub fn count(&self, row_label: &str, category: Category) -> u32 {
        let row = self.row_index(row_label);
        let col = self.categories.iter().position(|c| *c == category);
        match (row, col) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    pub fn row_total(&self, row: usize) -> u32 {
        self.counts.get(row).map(|r| r.iter().sum()).unwrap_or(0)
    }

    pub fn column_totals(&self) -> Vec<u32> {
        let mut totals = vec![0; self.categories.len()];
        for row in &self.counts {
            for (total, n) in totals.iter_mut().zip(row) {
                *total += n;
            }
        }
        totals
    }

    /// Percentage of the row falling in each category. All zeros for an
    /// empty row.
    pub fn row_shares(&self, row: usize) -> Vec<f64> {
        let total = self.row_total(row);
        let Some(counts) = self.counts.get(row) else {
            return vec![0.0; self.categories.len()];
        };
        counts
            .iter()
            .map(|&n| {
                if total == 0 {
                    0.0
                } else {
                    n as f64 / total as f64 * 100.0
                }
            })
            .collect()
    }

    /// Weighted average grade of a row, using each band's representative
    /// value (C=70 .. A+=97). Access errors carry no weight. `None` when the
    /// row has no graded records.
    pub fn weighted_grade_score(&self, row: usize) -> Option<f64> {
        let counts = self.counts.get(row)?;
        let mut weighted = 0.0;
        let mut graded = 0u32;
        for (category, &n) in self.categories.iter().zip(counts) {
            if let Category::Grade(tier) = category {
                if let Some(value) = tier.representative_value() {
                    weighted += f64::from(value) * f64::from(n);
                    graded += n;
                }
            }
        }
        (graded > 0).then(|| weighted / f64::from(graded))
    }
}

/// Group `records` by `dimension` and `classify` into a zero-filled matrix
/// over the fixed `categories`.
pub fn aggregate<R, D, C>(
    records: &[R],
    dimension: D,
    classify: C,
    categories: &[Category],
) -> CategoryMatrix
where
    D: Fn(&R) -> Option<String>,
    C: Fn(&R) -> Option<Category>,
{
    let mut rows: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(label) = dimension(record) else {
            dropped += 1;
            continue;
        };
        let Some(col) =
            classify(record).and_then(|cat| categories.iter().position(|c| *c == cat))
        else {
            dropped += 1;
            continue;
        };
        let row = rows
            .entry(label)
            .or_insert_with(|| vec![0; categories.len()]);
        row[col] += 1;
    }

    if dropped > 0 {
        tracing::debug!(dropped, "records without a dimension or category");
    }

    let (row_labels, counts): (Vec<String>, Vec<Vec<u32>>) = rows.into_iter().unzip();
    CategoryMatrix {
        row_labels,
        categories: categories.to_vec(),
        counts,
    }
}

/// Category of a record on `scale`: its upstream label if it has one,
/// otherwise its value. Missing values and `No Data` are unclassifiable.
pub fn classify_record(
    record: &MetricRecord,
    scale: Scale,
    classifier: &Classifier,
) -> Option<Category> {
    let category = match &record.category {
        Some(label) => classifier.classify_label(label, scale)?,
        None => classifier.classify(Some(record.value?), scale),
    };
    (!category.is_no_data()).then_some(category)
}

/// Rows are `record.dimension` (task title, cohort)
pub fn aggregate_by_dimension(
    records: &[MetricRecord],
    scale: Scale,
    classifier: &Classifier,
) -> CategoryMatrix {
    aggregate(
        records,
        |r| r.dimension.clone(),
        |r| classify_record(r, scale, classifier),
        &scale.categories(),
    )
}

/// Rows are ISO days. Only days with records get a row.
pub fn aggregate_by_day(
    records: &[MetricRecord],
    scale: Scale,
    classifier: &Classifier,
) -> CategoryMatrix {
    aggregate(
        records,
        |r| Some(r.date.format("%Y-%m-%d").to_string()),
        |r| classify_record(r, scale, classifier),
        &scale.categories(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{GradeTier, SentimentTier};
    use chrono::NaiveDate;

    fn grade(label: &str) -> Category {
        Category::Grade(GradeTier::from_label(label).unwrap())
    }

    struct Row {
        dim: Option<&'static str>,
        category: Option<&'static str>,
    }

    fn row(dim: &'static str, category: &'static str) -> Row {
        Row {
            dim: Some(dim),
            category: Some(category),
        }
    }

    fn abcf() -> Vec<Category> {
        vec![grade("A"), grade("B"), grade("C"), grade("F")]
    }

    fn matrix(rows: &[Row]) -> CategoryMatrix {
        aggregate(
            rows,
            |r| r.dim.map(String::from),
            |r| r.category.and_then(GradeTier::from_label).map(Category::Grade),
            &abcf(),
        )
    }

    // ==========================================================================
    // MATRIX SHAPE TESTS
    // ==========================================================================

    #[test]
    fn test_two_tasks_scenario() {
        let m = matrix(&[row("Task A", "A"), row("Task A", "B"), row("Task B", "A")]);

        assert_eq!(m.row_labels, vec!["Task A", "Task B"]);
        assert_eq!(m.counts[0], vec![1, 1, 0, 0]);
        assert_eq!(m.counts[1], vec![1, 0, 0, 0]);
        assert_eq!(m.count("Task A", grade("B")), 1);
        assert_eq!(m.count("Task B", grade("C")), 0);
    }

    #[test]
    fn test_rows_sorted_lexically() {
        let m = matrix(&[row("b", "A"), row("C", "A"), row("a", "A")]);
        assert_eq!(m.row_labels, vec!["C", "a", "b"]);
    }

    #[test]
    fn test_every_row_has_every_category() {
        let m = matrix(&[row("x", "A"), row("y", "C")]);
        assert!(m.counts.iter().all(|r| r.len() == m.categories.len()));
    }

    #[test]
    fn test_empty_input_empty_matrix() {
        let m = matrix(&[]);
        assert!(m.is_empty());
        assert_eq!(m.categories.len(), 4);
        assert_eq!(m.column_totals(), vec![0, 0, 0, 0]);
    }

    // ==========================================================================
    // DROP TESTS
    // ==========================================================================
    //
    // Unplaceable records vanish: no row is created for them and no count
    // includes them.
    // ==========================================================================

    #[test]
    fn test_unclassifiable_records_dropped() {
        let m = matrix(&[
            row("Task A", "A"),
            Row {
                dim: None,
                category: Some("A"),
            },
            Row {
                dim: Some("Task A"),
                category: None,
            },
            row("Task A", "Z"),
            row("Task B", "A+"),
        ]);
        // "A+" is a real tier but not one of this matrix's columns
        assert_eq!(m.row_labels, vec!["Task A"]);
        assert_eq!(m.row_total(0), 1);
    }

    #[test]
    fn test_missing_value_not_counted_as_worst() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let records = vec![
            MetricRecord::new(day, "a", Some(0.95)).with_dimension("Task A"),
            MetricRecord::new(day, "b", None).with_dimension("Task A"),
        ];
        let m = aggregate_by_dimension(&records, Scale::LetterGrade, &Classifier::default());
        assert_eq!(m.row_total(0), 1);
        assert_eq!(m.count("Task A", Category::Grade(GradeTier::F)), 0);
    }

    // ==========================================================================
    // RECORD HELPERS
    // ==========================================================================

    #[test]
    fn test_upstream_f_label_is_counted() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let records = vec![
            MetricRecord::new(day, "a", None).with_category("A").with_dimension("Task A"),
            MetricRecord::new(day, "b", None).with_category("F").with_dimension("Task A"),
        ];
        let m = aggregate_by_dimension(&records, Scale::LetterGrade, &Classifier::default());
        assert_eq!(m.row_total(0), 2);
        assert_eq!(m.count("Task A", Category::Grade(GradeTier::F)), 1);
    }

    #[test]
    fn test_upstream_label_preferred_over_value() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let r = MetricRecord::new(day, "fb-1", Some(0.9)).with_category("Negative");
        assert_eq!(
            classify_record(&r, Scale::Sentiment, &Classifier::default()),
            Some(Category::Sentiment(SentimentTier::Negative))
        );
    }

    #[test]
    fn test_aggregate_by_day_rows_are_iso_days() {
        let d1 = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let records = vec![
            MetricRecord::new(d1, "a", Some(0.7)),
            MetricRecord::new(d2, "b", Some(-0.7)),
            MetricRecord::new(d1, "c", Some(0.0)),
        ];
        let m = aggregate_by_day(&records, Scale::Sentiment, &Classifier::default());
        assert_eq!(m.row_labels, vec!["2025-03-01", "2025-03-02"]);
        assert_eq!(m.count("2025-03-02", Category::Sentiment(SentimentTier::VeryPositive)), 1);
        assert_eq!(m.count("2025-03-02", Category::Sentiment(SentimentTier::Neutral)), 1);
        assert_eq!(m.row_total(1), 2);
    }

    // ==========================================================================
    // DERIVED FIGURES
    // ==========================================================================

    #[test]
    fn test_row_shares() {
        let m = matrix(&[row("t", "A"), row("t", "A"), row("t", "B"), row("t", "C")]);
        assert_eq!(m.row_shares(0), vec![50.0, 25.0, 25.0, 0.0]);
        assert_eq!(m.row_shares(9), vec![0.0; 4]);
    }

    #[test]
    fn test_weighted_grade_score_ignores_unscored_tiers() {
        let m = matrix(&[row("t", "A"), row("t", "C"), row("t", "F")]);
        // (93 + 70) / 2
        assert_eq!(m.weighted_grade_score(0), Some(81.5));

        let only_failed = matrix(&[row("t", "F")]);
        assert_eq!(only_failed.weighted_grade_score(0), None);
    }
}

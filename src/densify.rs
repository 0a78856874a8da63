//! Calendar densification
//!
//! Charts want one point per calendar day. Warehouse queries return one row
//! per day *that had data*. [`Densifier`] bridges the two: it enumerates
//! every day of an inclusive window, looks each day up in an index of the
//! records, and emits four parallel arrays.
//!
//! ```text
//! records:  2025-03-02 = 0.8 (key "2025-03-02")
//! window:   2025-03-01 ..= 2025-03-03, NullGap
//!
//! labels:   [03-01, 03-02, 03-03]
//! values:   [None,  0.8,   None ]
//! keys:     [None,  "2025-03-02", None]
//! colors:   [no-data, Very Positive, no-data]
//! ```
//!
//! # Gap policies
//!
//! - `NullGap`: score-like metrics. A missing day is a real gap and must not
//!   read as a zero score.
//! - `ZeroFill`: count-like metrics (prompts sent). No row means none
//!   happened.
//!
//! Either way a gapped day carries no key and gets the `No Data` color, so
//! a filled zero never looks like an observed zero.
//!
//! # Duplicates
//!
//! If two records fall on the same day the later one wins. Collisions are
//! counted on the [`DayIndex`] and logged, the output is unaffected.

use crate::classify::{classify_to_color, palette, Classifier, Color, Scale};
use crate::error::Error;
use crate::record::MetricRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    #[default]
    NullGap,
    ZeroFill,
}

impl FromStr for GapPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "null" | "null_gap" | "gap" => Ok(GapPolicy::NullGap),
            "zero" | "zero_fill" => Ok(GapPolicy::ZeroFill),
            _ => Err(Error::UnknownGapPolicy(s.to_string())),
        }
    }
}

/// A gapless, calendar-aligned series. All four arrays have one entry per
/// day of the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenseSeries {
    pub labels: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
    /// Source record key per day, `None` on gapped days
    pub keys: Vec<Option<String>>,
    pub colors: Vec<Color>,
}

impl DenseSeries {
    pub fn empty() -> Self {
        Self {
            labels: vec![],
            values: vec![],
            keys: vec![],
            colors: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.keys.get(index).and_then(|k| k.as_deref())
    }

    /// Position of the day carrying `key`. This is how a highlight set in
    /// one view finds its point in another.
    pub fn index_of_key(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.as_deref() == Some(key))
    }

    pub fn populated(&self) -> usize {
        self.keys.iter().filter(|k| k.is_some()).count()
    }
}

/// Records indexed by calendar day, restricted to a window
#[derive(Debug)]
pub struct DayIndex<'a> {
    by_day: HashMap<NaiveDate, &'a MetricRecord>,
    collisions: usize,
    out_of_window: usize,
}

impl<'a> DayIndex<'a> {
    pub fn build(records: &'a [MetricRecord], start: NaiveDate, end: NaiveDate) -> Self {
        let mut index = DayIndex {
            by_day: HashMap::with_capacity(records.len()),
            collisions: 0,
            out_of_window: 0,
        };

        for record in records {
            if record.date < start || record.date > end {
                index.out_of_window += 1;
                continue;
            }
            if index.by_day.insert(record.date, record).is_some() {
                index.collisions += 1;
            }
        }

        if index.collisions > 0 {
            tracing::warn!(
                collisions = index.collisions,
                "multiple records on the same day, keeping the last of each"
            );
        }
        if index.out_of_window > 0 {
            tracing::debug!(skipped = index.out_of_window, "records outside the window");
        }

        index
    }

    pub fn get(&self, day: NaiveDate) -> Option<&'a MetricRecord> {
        self.by_day.get(&day).copied()
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    /// Records overwritten by a later record on the same day
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn out_of_window(&self) -> usize {
        self.out_of_window
    }
}

/// Every day from `start` to `end` inclusive. Empty when `start > end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        days.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

/// Builds [`DenseSeries`] for one window
#[derive(Debug, Clone)]
pub struct Densifier {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub gap_policy: GapPolicy,
    /// Scale used to color populated days; `None` for count series
    pub scale: Option<Scale>,
    pub classifier: Classifier,
}

impl Densifier {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            gap_policy: GapPolicy::default(),
            scale: None,
            classifier: Classifier::default(),
        }
    }

    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    pub fn with_scale(mut self, scale: Option<Scale>) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn densify(&self, records: &[MetricRecord]) -> DenseSeries {
        let days = days_between(self.start, self.end);
        if days.is_empty() {
            return DenseSeries::empty();
        }

        let index = DayIndex::build(records, self.start, self.end);

        let mut series = DenseSeries {
            labels: Vec::with_capacity(days.len()),
            values: Vec::with_capacity(days.len()),
            keys: Vec::with_capacity(days.len()),
            colors: Vec::with_capacity(days.len()),
        };

        for day in days {
            let (value, key) = match index.get(day) {
                Some(record) => (record.value, Some(record.key.clone())),
                None => match self.gap_policy {
                    GapPolicy::ZeroFill => (Some(0.0), None),
                    GapPolicy::NullGap => (None, None),
                },
            };
            let color = self.color_for(value, key.is_some());

            series.labels.push(day);
            series.values.push(value);
            series.keys.push(key);
            series.colors.push(color);
        }

        series
    }

    fn color_for(&self, value: Option<f64>, populated: bool) -> Color {
        if !populated {
            return palette::NO_DATA;
        }
        match (self.scale, value) {
            (Some(scale), _) => classify_to_color(self.classifier.classify(value, scale)),
            (None, Some(_)) => palette::SERIES,
            (None, None) => palette::NO_DATA,
        }
    }
}

/// Densify with the default classifier
pub fn densify(
    records: &[MetricRecord],
    start: NaiveDate,
    end: NaiveDate,
    gap_policy: GapPolicy,
    scale: Option<Scale>,
) -> DenseSeries {
    Densifier::new(start, end)
        .with_gap_policy(gap_policy)
        .with_scale(scale)
        .densify(records)
}

/// Collapse event rows into one count record per day, keyed by ISO day.
/// Feed the result to a `ZeroFill` densifier.
pub fn count_by_day(records: &[MetricRecord]) -> Vec<MetricRecord> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.date).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(day, n)| MetricRecord::new(day, day.format("%Y-%m-%d").to_string(), Some(n as f64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_score, SentimentTier};
    use crate::classify::Category;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rec(date: &str, key: &str, value: Option<f64>) -> MetricRecord {
        MetricRecord::new(day(date), key, value)
    }

    // ==========================================================================
    // SHAPE TESTS
    // ==========================================================================
    //
    // The four arrays always have one entry per day in the window, whatever
    // the records look like.
    // ==========================================================================

    #[test]
    fn test_single_record_in_three_day_window() {
        let records = vec![rec("2025-03-02", "2025-03-02", Some(0.8))];
        let s = densify(&records, day("2025-03-01"), day("2025-03-03"), GapPolicy::NullGap, None);

        assert_eq!(s.labels, vec![day("2025-03-01"), day("2025-03-02"), day("2025-03-03")]);
        assert_eq!(s.values, vec![None, Some(0.8), None]);
        assert_eq!(s.keys, vec![None, Some("2025-03-02".to_string()), None]);
        assert_eq!(s.colors.len(), 3);
    }

    #[test]
    fn test_empty_records_still_full_length() {
        let s = densify(&[], day("2025-01-01"), day("2025-01-31"), GapPolicy::NullGap, None);
        assert_eq!(s.len(), 31);
        assert!(s.values.iter().all(|v| v.is_none()));
        assert!(s.colors.iter().all(|c| *c == palette::NO_DATA));
    }

    #[test]
    fn test_reversed_window_is_empty_not_error() {
        let records = vec![rec("2025-03-02", "a", Some(1.0))];
        let s = densify(&records, day("2025-03-05"), day("2025-03-01"), GapPolicy::ZeroFill, None);
        assert!(s.is_empty());
        assert!(s.values.is_empty() && s.keys.is_empty() && s.colors.is_empty());
    }

    #[test]
    fn test_single_day_window() {
        let records = vec![rec("2025-03-02", "a", Some(1.0))];
        let s = densify(&records, day("2025-03-02"), day("2025-03-02"), GapPolicy::NullGap, None);
        assert_eq!(s.len(), 1);
        assert_eq!(s.values[0], Some(1.0));
    }

    #[test]
    fn test_window_across_leap_day() {
        let s = densify(&[], day("2024-02-27"), day("2024-03-02"), GapPolicy::NullGap, None);
        assert_eq!(s.len(), 5);
        assert_eq!(s.labels[2], day("2024-02-29"));
    }

    // ==========================================================================
    // GAP POLICY TESTS
    // ==========================================================================

    #[test]
    fn test_zero_fill_counts() {
        let records = vec![rec("2025-03-02", "2025-03-02", Some(4.0))];
        let s = densify(&records, day("2025-03-01"), day("2025-03-03"), GapPolicy::ZeroFill, None);
        assert_eq!(s.values, vec![Some(0.0), Some(4.0), Some(0.0)]);
        // Filled zeros carry no key
        assert_eq!(s.keys[0], None);
    }

    #[test]
    fn test_filled_zero_colored_as_no_data() {
        let records = vec![rec("2025-03-02", "k", Some(0.0))];
        let s = densify(
            &records,
            day("2025-03-01"),
            day("2025-03-02"),
            GapPolicy::ZeroFill,
            Some(Scale::Sentiment),
        );
        assert_eq!(s.colors[0], palette::NO_DATA);
        assert_eq!(s.colors[1], classify_to_color(Category::Sentiment(SentimentTier::Neutral)));
    }

    #[test]
    fn test_scored_colors_follow_classifier() {
        let records = vec![rec("2025-03-01", "a", Some(0.95)), rec("2025-03-02", "b", Some(0.0))];
        let s = densify(
            &records,
            day("2025-03-01"),
            day("2025-03-02"),
            GapPolicy::NullGap,
            Some(Scale::LetterGrade),
        );
        assert_eq!(s.colors[0], classify_to_color(classify_score(Some(0.95), Scale::LetterGrade)));
        assert_eq!(s.colors[1], classify_to_color(classify_score(Some(0.0), Scale::LetterGrade)));
    }

    // ==========================================================================
    // WINDOW AND DUPLICATE TESTS
    // ==========================================================================

    #[test]
    fn test_out_of_window_records_never_appear() {
        let records = vec![
            rec("2025-02-28", "before", Some(1.0)),
            rec("2025-03-02", "inside", Some(2.0)),
            rec("2025-03-04", "after", Some(3.0)),
        ];
        let s = densify(&records, day("2025-03-01"), day("2025-03-03"), GapPolicy::NullGap, None);
        assert_eq!(s.populated(), 1);
        assert_eq!(s.index_of_key("inside"), Some(1));
        assert_eq!(s.index_of_key("before"), None);
        assert_eq!(s.index_of_key("after"), None);

        let index = DayIndex::build(&records, day("2025-03-01"), day("2025-03-03"));
        assert_eq!(index.out_of_window(), 2);
    }

    #[test]
    fn test_same_day_duplicates_last_write_wins() {
        let records = vec![
            rec("2025-03-02", "first", Some(0.1)),
            rec("2025-03-02", "second", Some(0.9)),
        ];
        let s = densify(&records, day("2025-03-02"), day("2025-03-02"), GapPolicy::NullGap, None);
        assert_eq!(s.values, vec![Some(0.9)]);
        assert_eq!(s.key_at(0), Some("second"));

        let index = DayIndex::build(&records, day("2025-03-02"), day("2025-03-02"));
        assert_eq!(index.collisions(), 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_densify_is_idempotent() {
        let records = vec![rec("2025-03-01", "a", Some(0.3)), rec("2025-03-03", "b", None)];
        let d =
            Densifier::new(day("2025-03-01"), day("2025-03-04")).with_scale(Some(Scale::Sentiment));
        assert_eq!(d.densify(&records), d.densify(&records));
    }

    #[test]
    fn test_populated_day_with_missing_value_keeps_key() {
        let records = vec![rec("2025-03-01", "a", None)];
        let s = densify(&records, day("2025-03-01"), day("2025-03-01"), GapPolicy::ZeroFill, None);
        assert_eq!(s.values, vec![None]);
        assert_eq!(s.key_at(0), Some("a"));
    }

    // ==========================================================================
    // HELPERS
    // ==========================================================================

    #[test]
    fn test_count_by_day() {
        let events = vec![
            rec("2025-03-02", "p1", None),
            rec("2025-03-01", "p2", None),
            rec("2025-03-02", "p3", None),
        ];
        let counts = count_by_day(&events);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].key, "2025-03-01");
        assert_eq!(counts[0].value, Some(1.0));
        assert_eq!(counts[1].value, Some(2.0));
    }

    #[test]
    fn test_gap_policy_names() {
        assert_eq!("zero".parse::<GapPolicy>().unwrap(), GapPolicy::ZeroFill);
        assert_eq!("NULL".parse::<GapPolicy>().unwrap(), GapPolicy::NullGap);
        assert!(matches!("fill".parse::<GapPolicy>(), Err(Error::UnknownGapPolicy(_))));
    }
}

//! Sentiment scale
//!
//! Sentiment scores run from -1.0 to 1.0 and fall into five tiers that are
//! symmetric around a neutral band:
//!
//! ```text
//! Tier           | Range
//! ---------------|------------------
//! Very Positive  | score >= 0.6
//! Positive       | 0.2 <= score < 0.6
//! Neutral        | -0.2 < score < 0.2
//! Negative       | -0.6 <= score <= -0.2
//! Very Negative  | score < -0.6
//! ```
//!
//! Note that -0.2 itself is negative: neutral's lower bound is exclusive.

use super::NullPolicy;
use serde::{Deserialize, Serialize};

pub const VERY_POSITIVE_MIN: f64 = 0.6;
pub const POSITIVE_MIN: f64 = 0.2;
/// Exclusive
pub const NEUTRAL_FLOOR: f64 = -0.2;
pub const NEGATIVE_MIN: f64 = -0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentTier {
    #[serde(rename = "Very Positive")]
    VeryPositive,
    #[serde(rename = "Positive")]
    Positive,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Negative")]
    Negative,
    #[serde(rename = "Very Negative")]
    VeryNegative,
    #[serde(rename = "No Data")]
    NoData,
}

impl SentimentTier {
    /// The five scored tiers, most positive first
    pub const TIERS: [SentimentTier; 5] = [
        SentimentTier::VeryPositive,
        SentimentTier::Positive,
        SentimentTier::Neutral,
        SentimentTier::Negative,
        SentimentTier::VeryNegative,
    ];

    pub const ALL: [SentimentTier; 6] = [
        SentimentTier::VeryPositive,
        SentimentTier::Positive,
        SentimentTier::Neutral,
        SentimentTier::Negative,
        SentimentTier::VeryNegative,
        SentimentTier::NoData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SentimentTier::VeryPositive => "Very Positive",
            SentimentTier::Positive => "Positive",
            SentimentTier::Neutral => "Neutral",
            SentimentTier::Negative => "Negative",
            SentimentTier::VeryNegative => "Very Negative",
            SentimentTier::NoData => "No Data",
        }
    }

    /// Parse a label as the warehouse writes it ("Very Positive"), also
    /// accepting snake_case ("very_positive")
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().replace('_', " ");
        Self::ALL
            .iter()
            .copied()
            .find(|tier| tier.label().eq_ignore_ascii_case(&normalized))
    }
}

impl std::fmt::Display for SentimentTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a score on the sentiment scale
pub fn classify(value: Option<f64>, nulls: NullPolicy) -> SentimentTier {
    let Some(score) = value.filter(|v| v.is_finite()) else {
        return match nulls {
            NullPolicy::NullAsUnknown => SentimentTier::NoData,
            NullPolicy::NullAsWorst => SentimentTier::VeryNegative,
        };
    };

    if score >= VERY_POSITIVE_MIN {
        SentimentTier::VeryPositive
    } else if score >= POSITIVE_MIN {
        SentimentTier::Positive
    } else if score > NEUTRAL_FLOOR {
        SentimentTier::Neutral
    } else if score >= NEGATIVE_MIN {
        SentimentTier::Negative
    } else {
        SentimentTier::VeryNegative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // BOUNDARY TESTS
    // ==========================================================================

    #[test]
    fn test_boundaries() {
        let p = NullPolicy::NullAsUnknown;
        assert_eq!(classify(Some(1.0), p), SentimentTier::VeryPositive);
        assert_eq!(classify(Some(0.6), p), SentimentTier::VeryPositive);
        assert_eq!(classify(Some(0.59), p), SentimentTier::Positive);
        assert_eq!(classify(Some(0.2), p), SentimentTier::Positive);
        assert_eq!(classify(Some(0.19), p), SentimentTier::Neutral);
        assert_eq!(classify(Some(0.0), p), SentimentTier::Neutral);
        assert_eq!(classify(Some(-0.19), p), SentimentTier::Neutral);
        assert_eq!(classify(Some(-0.2), p), SentimentTier::Negative);
        assert_eq!(classify(Some(-0.6), p), SentimentTier::Negative);
        assert_eq!(classify(Some(-0.61), p), SentimentTier::VeryNegative);
        assert_eq!(classify(Some(-1.0), p), SentimentTier::VeryNegative);
    }

    #[test]
    fn test_minus_quarter_is_negative() {
        // -0.25 is below the exclusive neutral floor of -0.2
        assert_eq!(classify(Some(-0.25), NullPolicy::NullAsUnknown), SentimentTier::Negative);
    }

    #[test]
    fn test_zero_is_neutral_not_a_sentinel() {
        // Unlike grades, 0.0 is a perfectly ordinary sentiment score
        assert_eq!(classify(Some(0.0), NullPolicy::NullAsWorst), SentimentTier::Neutral);
    }

    // ==========================================================================
    // NULL POLICY TESTS
    // ==========================================================================

    #[test]
    fn test_null_defaults_to_no_data() {
        assert_eq!(classify(None, NullPolicy::NullAsUnknown), SentimentTier::NoData);
        assert_eq!(classify(Some(f64::NAN), NullPolicy::NullAsUnknown), SentimentTier::NoData);
    }

    #[test]
    fn test_null_as_worst_is_very_negative() {
        assert_eq!(classify(None, NullPolicy::NullAsWorst), SentimentTier::VeryNegative);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(SentimentTier::from_label("Very Positive"), Some(SentimentTier::VeryPositive));
        assert_eq!(SentimentTier::from_label("very_negative"), Some(SentimentTier::VeryNegative));
        assert_eq!(SentimentTier::from_label("NEUTRAL"), Some(SentimentTier::Neutral));
        assert_eq!(SentimentTier::from_label("meh"), None);
    }
}

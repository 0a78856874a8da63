//! Score classification
//!
//! Maps numeric scores onto closed, ordered tier scales and maps tiers onto
//! display colors. Two scales exist:
//!
//! - [`Scale::LetterGrade`]: task and video scores, see [`grade`]
//! - [`Scale::Sentiment`]: prompt and peer-feedback sentiment, see [`sentiment`]
//!
//! Both functions are total. Every finite number lands in exactly one tier of
//! the requested scale, and every tier has exactly one color.
//!
//! # Missing values
//!
//! The two scales historically disagree on what a missing score means, so
//! each scale carries an explicit [`NullPolicy`]:
//!
//! | Scale        | Default policy  | Missing score becomes |
//! |--------------|-----------------|-----------------------|
//! | LetterGrade  | `NullAsWorst`   | `F`                   |
//! | Sentiment    | `NullAsUnknown` | `No Data`             |
//!
//! # Example
//!
//! ```
//! use pulsegrid::classify::{classify_score, classify_to_color, Category, GradeTier, Scale};
//!
//! let tier = classify_score(Some(0.0), Scale::LetterGrade);
//! assert_eq!(tier, Category::Grade(GradeTier::AccessError));
//! println!("{} -> {}", tier, classify_to_color(tier));
//! ```

pub mod grade;
pub mod palette;
pub mod sentiment;

pub use grade::{GradeBoundaries, GradeTier};
pub use palette::Color;
pub use sentiment::SentimentTier;

use crate::error::Error;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Video demos are rated 0..5 on each axis
pub const VIDEO_RATING_MAX: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    LetterGrade,
    Sentiment,
}

impl Scale {
    /// Tiers a category matrix reports for this scale, in display order.
    /// `No Data` is not a countable category and is left out.
    pub fn categories(self) -> Vec<Category> {
        match self {
            Scale::LetterGrade => GradeTier::BANDS
                .iter()
                .chain([GradeTier::F, GradeTier::AccessError].iter())
                .map(|t| Category::Grade(*t))
                .collect(),
            Scale::Sentiment => SentimentTier::TIERS
                .iter()
                .map(|t| Category::Sentiment(*t))
                .collect(),
        }
    }

    pub fn no_data(self) -> Category {
        match self {
            Scale::LetterGrade => Category::Grade(GradeTier::NoData),
            Scale::Sentiment => Category::Sentiment(SentimentTier::NoData),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::LetterGrade => "grade",
            Scale::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "grade" | "lettergrade" => Ok(Scale::LetterGrade),
            "sentiment" => Ok(Scale::Sentiment),
            _ => Err(Error::UnknownScale(s.to_string())),
        }
    }
}

/// How a missing or non-numeric score is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Missing scores fall into the scale's worst tier
    NullAsWorst,
    /// Missing scores get the scale's `No Data` tier
    NullAsUnknown,
}

/// One tier of one scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Grade(GradeTier),
    Sentiment(SentimentTier),
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Grade(t) => t.label(),
            Category::Sentiment(t) => t.label(),
        }
    }

    pub fn scale(self) -> Scale {
        match self {
            Category::Grade(_) => Scale::LetterGrade,
            Category::Sentiment(_) => Scale::Sentiment,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(
            self,
            Category::Grade(GradeTier::NoData) | Category::Sentiment(SentimentTier::NoData)
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Classification settings: the grade boundary table and the null policy
/// of each scale
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    pub grade_boundaries: GradeBoundaries,
    pub grade_nulls: NullPolicy,
    pub sentiment_nulls: NullPolicy,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            grade_boundaries: GradeBoundaries::default(),
            grade_nulls: NullPolicy::NullAsWorst,
            sentiment_nulls: NullPolicy::NullAsUnknown,
        }
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grade_boundaries(mut self, boundaries: GradeBoundaries) -> Self {
        self.grade_boundaries = boundaries;
        self
    }

    pub fn with_null_policy(mut self, scale: Scale, policy: NullPolicy) -> Self {
        match scale {
            Scale::LetterGrade => self.grade_nulls = policy,
            Scale::Sentiment => self.sentiment_nulls = policy,
        }
        self
    }

    pub fn null_policy(&self, scale: Scale) -> NullPolicy {
        match scale {
            Scale::LetterGrade => self.grade_nulls,
            Scale::Sentiment => self.sentiment_nulls,
        }
    }

    pub fn classify(&self, value: Option<f64>, scale: Scale) -> Category {
        match scale {
            Scale::LetterGrade => Category::Grade(grade::classify(
                value,
                &self.grade_boundaries,
                self.grade_nulls,
            )),
            Scale::Sentiment => {
                Category::Sentiment(sentiment::classify(value, self.sentiment_nulls))
            }
        }
    }

    /// Interpret a category label that the warehouse already computed
    pub fn classify_label(&self, label: &str, scale: Scale) -> Option<Category> {
        match scale {
            Scale::LetterGrade => GradeTier::from_label(label).map(Category::Grade),
            Scale::Sentiment => SentimentTier::from_label(label).map(Category::Sentiment),
        }
    }

    /// Grade a video demo from its three 0..5 ratings.
    ///
    /// The average rating is expressed as a fraction of the boundary table's
    /// `scale_max` before banding, so the same ratings grade the same under
    /// every preset. Returns `None` ("N/A") when any rating is missing.
    pub fn video_grade(
        &self,
        technical: Option<f64>,
        business: Option<f64>,
        professional: Option<f64>,
    ) -> Option<GradeTier> {
        let ratings = [technical?, business?, professional?];
        if ratings.iter().any(|r| !r.is_finite()) {
            return None;
        }
        let average = ratings.iter().sum::<f64>() / ratings.len() as f64;
        let scaled = average / VIDEO_RATING_MAX * self.grade_boundaries.scale_max;
        Some(grade::classify(Some(scaled), &self.grade_boundaries, self.grade_nulls))
    }
}

/// Classify with the default [`Classifier`]
pub fn classify_score(value: Option<f64>, scale: Scale) -> Category {
    Classifier::default().classify(value, scale)
}

pub fn classify_to_color(category: Category) -> Color {
    palette::color_for(category)
}

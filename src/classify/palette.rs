//! Display colors for classification tiers
//!
//! Every tier of every scale maps to exactly one color. The mapping is a
//! `match` over closed enums, so there is no fallback color to fall into.
//!
//! ```text
//! Grade tier   | Color    |  Sentiment tier | Color
//! -------------|----------|-----------------|---------
//! A+           | #1e4d28  |  Very Positive  | #1e4d28
//! A            | #38761d  |  Positive       | #38761d
//! A-           | #4a9625  |  Neutral        | #808080
//! B+           | #bf9002  |  Negative       | #b45f06
//! B            | #d4a419  |  Very Negative  | #990000
//! B-           | #e6b800  |                 |
//! C+           | #b45f06  |                 |
//! C            | #cc6900  |                 |
//! Access Error | #990000  |                 |
//! No Data      | #4a5568  |  No Data        | #4a5568
//! ```

use super::{Category, GradeTier, SentimentTier};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A CSS color string (`#rrggbb` or `rgba(...)`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(Cow<'static, str>);

impl Color {
    pub const fn from_static(css: &'static str) -> Self {
        Color(Cow::Borrowed(css))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Color {
    fn from(css: String) -> Self {
        Color(Cow::Owned(css))
    }
}

impl From<&'static str> for Color {
    fn from(css: &'static str) -> Self {
        Color::from_static(css)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gaps and unknown values
pub const NO_DATA: Color = Color::from_static("#4a5568");

/// Populated points of a series that has no classification scale (counts)
pub const SERIES: Color = Color::from_static("#4b42d9");

pub const BORDER_DEFAULT: Color = Color::from_static("#282f3b");
pub const BORDER_HOVERED: Color = Color::from_static("#bf9002");
pub const BORDER_HIGHLIGHTED: Color = Color::from_static("#ffffff");

pub fn grade_color(tier: GradeTier) -> Color {
    let css = match tier {
        GradeTier::APlus => "#1e4d28",
        GradeTier::A => "#38761d",
        GradeTier::AMinus => "#4a9625",
        GradeTier::BPlus => "#bf9002",
        GradeTier::B => "#d4a419",
        GradeTier::BMinus => "#e6b800",
        GradeTier::CPlus => "#b45f06",
        GradeTier::C => "#cc6900",
        GradeTier::F => "#d32f2f",
        GradeTier::AccessError => "#990000",
        GradeTier::NoData => return NO_DATA,
    };
    Color::from_static(css)
}

pub fn sentiment_color(tier: SentimentTier) -> Color {
    let css = match tier {
        SentimentTier::VeryPositive => "#1e4d28",
        SentimentTier::Positive => "#38761d",
        SentimentTier::Neutral => "#808080",
        SentimentTier::Negative => "#b45f06",
        SentimentTier::VeryNegative => "#990000",
        SentimentTier::NoData => return NO_DATA,
    };
    Color::from_static(css)
}

pub fn color_for(category: Category) -> Color {
    match category {
        Category::Grade(tier) => grade_color(tier),
        Category::Sentiment(tier) => sentiment_color(tier),
    }
}

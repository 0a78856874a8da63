//! Letter-grade scale
//!
//! Task and video scores are bucketed into eight ordered tiers, `A+` down
//! to `C`. Any real submission earns at least a `C`. Two values sit outside
//! the numeric bands:
//!
//! - A score of exactly `0` is not a grade. The grader writes `0` when it
//!   could not open the submission, so it classifies to the
//!   `Document Access Error` sentinel, ahead of any numeric band.
//! - A missing score follows the scale's [`NullPolicy`]. Legacy views fail
//!   it (`F`, below every band); a view that wants to tell "no data" from
//!   "worst score" can ask for `No Data` instead.
//!
//! # Boundary tables
//!
//! Several boundary tables are in use across the dashboard, so the table is
//! configuration rather than a constant:
//!
//! ```text
//! Preset        | Scale | A+   A    A-   B+   B    B-   C+
//! --------------|-------|-----------------------------------
//! unit          | 0..1  | 0.90 0.80 0.75 0.70 0.60 0.55 0.50
//! cohort        | 0..100| 93   85   80   70   60   50   40
//! distribution  | 0..100| 93   90   87   83   80   77   73
//! ```
//!
//! Anything below the `C+` threshold is a `C`.

use super::NullPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GradeTier {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    /// No score at all, failed under `NullAsWorst`
    #[serde(rename = "F")]
    F,
    #[serde(rename = "Document Access Error")]
    AccessError,
    #[serde(rename = "No Data")]
    NoData,
}

impl GradeTier {
    /// The eight numeric bands, best first
    pub const BANDS: [GradeTier; 8] = [
        GradeTier::APlus,
        GradeTier::A,
        GradeTier::AMinus,
        GradeTier::BPlus,
        GradeTier::B,
        GradeTier::BMinus,
        GradeTier::CPlus,
        GradeTier::C,
    ];

    pub const ALL: [GradeTier; 11] = [
        GradeTier::APlus,
        GradeTier::A,
        GradeTier::AMinus,
        GradeTier::BPlus,
        GradeTier::B,
        GradeTier::BMinus,
        GradeTier::CPlus,
        GradeTier::C,
        GradeTier::F,
        GradeTier::AccessError,
        GradeTier::NoData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GradeTier::APlus => "A+",
            GradeTier::A => "A",
            GradeTier::AMinus => "A-",
            GradeTier::BPlus => "B+",
            GradeTier::B => "B",
            GradeTier::BMinus => "B-",
            GradeTier::CPlus => "C+",
            GradeTier::C => "C",
            GradeTier::F => "F",
            GradeTier::AccessError => "Document Access Error",
            GradeTier::NoData => "No Data",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|tier| tier.label().eq_ignore_ascii_case(label))
    }

    /// Weight of the tier when averaging a grade distribution (0..100).
    /// Only the eight bands carry a value; `F` has no score behind it.
    pub fn representative_value(self) -> Option<u32> {
        match self {
            GradeTier::APlus => Some(97),
            GradeTier::A => Some(93),
            GradeTier::AMinus => Some(90),
            GradeTier::BPlus => Some(87),
            GradeTier::B => Some(83),
            GradeTier::BMinus => Some(80),
            GradeTier::CPlus => Some(75),
            GradeTier::C => Some(70),
            GradeTier::F | GradeTier::AccessError | GradeTier::NoData => None,
        }
    }
}

impl std::fmt::Display for GradeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower bounds (inclusive) for `A+ A A- B+ B B- C+`, on a scale whose
/// best score is `scale_max`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBoundaries {
    pub scale_max: f64,
    pub thresholds: [f64; 7],
}

impl GradeBoundaries {
    pub const fn unit() -> Self {
        Self {
            scale_max: 1.0,
            thresholds: [0.9, 0.8, 0.75, 0.7, 0.6, 0.55, 0.5],
        }
    }

    pub const fn cohort() -> Self {
        Self {
            scale_max: 100.0,
            thresholds: [93.0, 85.0, 80.0, 70.0, 60.0, 50.0, 40.0],
        }
    }

    pub const fn distribution() -> Self {
        Self {
            scale_max: 100.0,
            thresholds: [93.0, 90.0, 87.0, 83.0, 80.0, 77.0, 73.0],
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "unit" => Some(Self::unit()),
            "cohort" => Some(Self::cohort()),
            "distribution" => Some(Self::distribution()),
            _ => None,
        }
    }

    /// Thresholds must be finite, strictly descending and within the scale
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.scale_max.is_finite() || self.scale_max <= 0.0 {
            return Err(format!("scale_max must be positive, got {}", self.scale_max));
        }
        if self.thresholds.iter().any(|t| !t.is_finite()) {
            return Err("thresholds must be finite".to_string());
        }
        if self.thresholds.windows(2).any(|w| w[0] <= w[1]) {
            return Err(format!("thresholds must be strictly descending: {:?}", self.thresholds));
        }
        if self.thresholds[0] > self.scale_max {
            return Err(format!(
                "top threshold {} exceeds scale_max {}",
                self.thresholds[0], self.scale_max
            ));
        }
        Ok(())
    }

    /// Band for a numeric score (no sentinel handling)
    pub fn band_for(&self, score: f64) -> GradeTier {
        self.thresholds
            .iter()
            .zip(GradeTier::BANDS.iter())
            .find(|(threshold, _)| score >= **threshold)
            .map(|(_, tier)| *tier)
            .unwrap_or(GradeTier::C)
    }
}

impl Default for GradeBoundaries {
    fn default() -> Self {
        Self::unit()
    }
}

/// Classify a score on the letter-grade scale
pub fn classify(value: Option<f64>, boundaries: &GradeBoundaries, nulls: NullPolicy) -> GradeTier {
    match value.filter(|v| v.is_finite()) {
        None => match nulls {
            NullPolicy::NullAsWorst => GradeTier::F,
            NullPolicy::NullAsUnknown => GradeTier::NoData,
        },
        Some(v) if v == 0.0 => GradeTier::AccessError,
        Some(v) => boundaries.band_for(v),
    }
}

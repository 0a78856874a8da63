//! Dashboard configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below. Command-line flags override whatever the file says.
//!
//! ```json
//! {
//!   "grade": { "boundaries": "cohort", "null_policy": "null_as_unknown" },
//!   "sentiment": { "null_policy": "null_as_unknown" },
//!   "style": { "highlight_radius": 12.0 },
//!   "default_window_days": 14
//! }
//! ```
//!
//! `grade.boundaries` takes a preset name (`unit`, `cohort`,
//! `distribution`) or an explicit table:
//! `{"scale_max": 100.0, "thresholds": [95, 90, 85, 80, 75, 70, 65]}`.

use crate::classify::{Classifier, GradeBoundaries, NullPolicy};
use crate::error::{Error, Result};
use crate::selection::StyleConfig;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub grade: GradeConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeConfig {
    #[serde(default, deserialize_with = "deserialize_boundaries")]
    pub boundaries: GradeBoundaries,
    #[serde(default = "default_grade_nulls")]
    pub null_policy: NullPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_sentiment_nulls")]
    pub null_policy: NullPolicy,
}

/// Longest default window a config may ask for, about ten years
pub const MAX_WINDOW_DAYS: u32 = 3660;

fn default_window_days() -> u32 { 30 }
fn default_grade_nulls() -> NullPolicy { NullPolicy::NullAsWorst }
fn default_sentiment_nulls() -> NullPolicy { NullPolicy::NullAsUnknown }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            grade: GradeConfig::default(),
            sentiment: SentimentConfig::default(),
            style: StyleConfig::default(),
            default_window_days: default_window_days(),
        }
    }
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            boundaries: GradeBoundaries::default(),
            null_policy: default_grade_nulls(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            null_policy: default_sentiment_nulls(),
        }
    }
}

fn deserialize_boundaries<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<GradeBoundaries, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Setting {
        Preset(String),
        Table(GradeBoundaries),
    }

    match Setting::deserialize(deserializer)? {
        Setting::Preset(name) => GradeBoundaries::preset(&name)
            .ok_or_else(|| D::Error::custom(format!("unknown grade boundary preset '{}'", name))),
        Setting::Table(table) => Ok(table),
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate().map_err(|reason| Error::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.grade.boundaries.validate()?;
        if self.default_window_days == 0 {
            return Err("default_window_days must be at least 1".to_string());
        }
        if self.default_window_days > MAX_WINDOW_DAYS {
            return Err(format!(
                "default_window_days must be at most {}, got {}",
                MAX_WINDOW_DAYS, self.default_window_days
            ));
        }
        Ok(())
    }

    pub fn classifier(&self) -> Classifier {
        Classifier {
            grade_boundaries: self.grade.boundaries.clone(),
            grade_nulls: self.grade.null_policy,
            sentiment_nulls: self.sentiment.null_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    // ==========================================================================
    // DEFAULTS
    // ==========================================================================

    #[test]
    fn test_empty_object_is_all_defaults() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.default_window_days, 30);
        assert_eq!(config.classifier(), Classifier::default());
    }

    #[test]
    fn test_partial_style_keeps_other_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"style": {"highlight_radius": 12.0}}"#).unwrap();
        assert_eq!(config.style.highlight_radius, 12.0);
        assert_eq!(config.style.radius, StyleConfig::default().radius);
    }

    // ==========================================================================
    // GRADE BOUNDARIES
    // ==========================================================================

    #[test]
    fn test_boundary_preset_by_name() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"grade": {"boundaries": "cohort"}}"#).unwrap();
        assert_eq!(config.grade.boundaries, GradeBoundaries::cohort());
        assert_eq!(config.grade.null_policy, NullPolicy::NullAsWorst);
    }

    #[test]
    fn test_boundary_explicit_table() {
        let json = r#"{"grade": {"boundaries": {"scale_max": 100.0, "thresholds": [95, 90, 85, 80, 75, 70, 65]}}}"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.grade.boundaries.thresholds[0], 95.0);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let result = serde_json::from_str::<DashboardConfig>(r#"{"grade": {"boundaries": "curve"}}"#);
        assert!(result.is_err());
    }

    // ==========================================================================
    // LOADING
    // ==========================================================================

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"{"sentiment": {"null_policy": "null_as_worst"}, "default_window_days": 7}"#,
        );
        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.default_window_days, 7);
        assert_eq!(config.classifier().sentiment_nulls, NullPolicy::NullAsWorst);
    }

    #[test]
    fn test_load_rejects_invalid_table() {
        let file = write_config(
            r#"{"grade": {"boundaries": {"scale_max": 1.0, "thresholds": [0.5, 0.6, 0.7, 0.8, 0.85, 0.9, 0.95]}}}"#,
        );
        let err = DashboardConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_rejects_zero_window() {
        let file = write_config(r#"{"default_window_days": 0}"#);
        assert!(DashboardConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_oversized_window() {
        let file = write_config(r#"{"default_window_days": 4000000000}"#);
        let err = DashboardConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(err.to_string().contains("3660"));

        let at_cap = DashboardConfig {
            default_window_days: MAX_WINDOW_DAYS,
            ..Default::default()
        };
        assert!(at_cap.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = DashboardConfig::load("/no/such/pulsegrid.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

//! Advisory thresholds and model constants.
//!
//! Every breakpoint that decides between "no warning", `warning` and
//! `danger` lives here, together with the few physical constants the
//! power and deflection models assume. A policy file only needs the keys
//! it wants to change.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read policy: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid policy: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Aggressiveness outside this band triggers an advisory
    pub aggressiveness_min: f64,
    pub aggressiveness_max: f64,

    /// User DOC as a multiple of tool diameter
    pub doc_warning_ratio: f64,
    pub doc_danger_ratio: f64,

    /// User WOC as a multiple of tool diameter
    pub woc_warning_ratio: f64,
    pub woc_danger_ratio: f64,

    /// Stickout L/D
    pub stickout_warning_ratio: f64,
    pub stickout_danger_ratio: f64,

    pub max_practical_flutes: u32,

    /// Chip load below `low × range_min` is rubbing, above `high × range_max` is overload
    pub chipload_low_factor: f64,
    pub chipload_high_factor: f64,

    /// Cutting force per mm of tool diameter
    pub force_warning_n_per_mm: f64,
    pub force_danger_n_per_mm: f64,

    /// Tool tip deflection on a machine with rigidity 1.0
    pub deflection_warning_mm: f64,
    pub deflection_danger_mm: f64,

    pub holder_compliance_mm_per_n: f64,
    pub mechanical_efficiency: f64,

    pub amplification_min: f64,
    pub amplification_max: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            aggressiveness_min: 0.1,
            aggressiveness_max: 3.0,
            // 1x D DOC is silent, danger from 2x D (WOC danger is at 1x D)
            doc_warning_ratio: 1.0,
            doc_danger_ratio: 2.0,
            woc_warning_ratio: 0.75,
            woc_danger_ratio: 1.0,
            stickout_warning_ratio: 6.0,
            stickout_danger_ratio: 10.0,
            max_practical_flutes: 10,
            chipload_low_factor: 0.5,
            chipload_high_factor: 1.5,
            force_warning_n_per_mm: 300.0,
            force_danger_n_per_mm: 500.0,
            deflection_warning_mm: 0.02,
            deflection_danger_mm: 0.05,
            holder_compliance_mm_per_n: 0.002,
            mechanical_efficiency: 0.85,
            amplification_min: 0.1,
            amplification_max: 50.0,
        }
    }
}

impl Policy {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let policy: Policy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pairs = [
            ("aggressiveness", self.aggressiveness_min, self.aggressiveness_max),
            ("doc ratio", self.doc_warning_ratio, self.doc_danger_ratio),
            ("woc ratio", self.woc_warning_ratio, self.woc_danger_ratio),
            ("stickout ratio", self.stickout_warning_ratio, self.stickout_danger_ratio),
            ("force", self.force_warning_n_per_mm, self.force_danger_n_per_mm),
            ("deflection", self.deflection_warning_mm, self.deflection_danger_mm),
            ("amplification", self.amplification_min, self.amplification_max),
        ];
        for (name, lo, hi) in pairs {
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi) {
                return Err(ConfigError::Invalid(format!(
                    "{} bounds {} / {} must be positive and ordered",
                    name, lo, hi
                )));
            }
        }
        if !(self.mechanical_efficiency > 0.0 && self.mechanical_efficiency <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "mechanical_efficiency {} must be in (0, 1]",
                self.mechanical_efficiency
            )));
        }
        if !(self.holder_compliance_mm_per_n >= 0.0) {
            return Err(ConfigError::Invalid(
                "holder_compliance_mm_per_n must not be negative".to_string(),
            ));
        }
        if self.chipload_low_factor <= 0.0 || self.chipload_high_factor < 1.0 {
            return Err(ConfigError::Invalid(
                "chipload band factors must be > 0 and >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_validate() {
        Policy::default().validate().unwrap();
    }

    #[test]
    fn test_partial_file_overrides_only_listed_keys() {
        let policy = Policy::from_json_str(r#"{ "stickout_warning_ratio": 4.0 }"#).unwrap();
        assert_eq!(policy.stickout_warning_ratio, 4.0);
        assert_eq!(policy.stickout_danger_ratio, 10.0);
        assert_eq!(policy.holder_compliance_mm_per_n, 0.002);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let err = Policy::from_json_str(r#"{ "deflection_warning_mm": 0.1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_efficiency() {
        let err = Policy::from_json_str(r#"{ "mechanical_efficiency": 1.5 }"#).unwrap_err();
        assert!(err.to_string().contains("mechanical_efficiency"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{ "max_practical_flutes": 8 }"#).unwrap();
        let policy = Policy::from_file(&path).unwrap();
        assert_eq!(policy.max_practical_flutes, 8);
    }
}

//! Cutting speed and spindle RPM

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use super::{CalcError, Severity, Warning, WarningKind};
use crate::reference::{Material, Spindle};

/// Operation being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CutType {
    Slot,
    Profile,
    Adaptive,
    Facing,
    Drilling,
    Boring,
}

impl CutType {
    /// Multiplier on the material's mid-range cutting speed
    pub fn speed_factor(self) -> f64 {
        match self {
            CutType::Slot => 0.8,
            CutType::Profile => 1.0,
            CutType::Adaptive => 1.2,
            CutType::Facing => 0.9,
            CutType::Drilling => 0.7,
            CutType::Boring => 0.8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CutType::Slot => "slot",
            CutType::Profile => "profile",
            CutType::Adaptive => "adaptive",
            CutType::Facing => "facing",
            CutType::Drilling => "drilling",
            CutType::Boring => "boring",
        }
    }
}

impl FromStr for CutType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slot" | "slotting" => Ok(CutType::Slot),
            "profile" | "contour" => Ok(CutType::Profile),
            "adaptive" | "hsm" | "trochoidal" => Ok(CutType::Adaptive),
            "facing" | "face" => Ok(CutType::Facing),
            "drilling" | "drill" => Ok(CutType::Drilling),
            "boring" | "bore" => Ok(CutType::Boring),
            _ => Err(CalcError::UnknownCutType(s.to_string())),
        }
    }
}

impl TryFrom<String> for CutType {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CutType> for String {
    fn from(value: CutType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedResult {
    pub vc_target_m_min: f64,
    pub rpm_theoretical: f64,
    pub rpm_actual: f64,
    /// Surface speed actually achieved at `rpm_actual`
    pub vc_actual_m_min: f64,
    pub warnings: Vec<Warning>,
}

pub fn rpm_for_speed(vc_m_min: f64, diameter_mm: f64) -> f64 {
    (vc_m_min * 1000.0) / (PI * diameter_mm)
}

pub fn speed_for_rpm(rpm: f64, diameter_mm: f64) -> f64 {
    PI * diameter_mm * rpm / 1000.0
}

pub fn compute_speed(
    material: &Material,
    spindle: &Spindle,
    cut_type: CutType,
    diameter_mm: f64,
    aggressiveness: f64,
) -> Result<SpeedResult, CalcError> {
    if !(diameter_mm.is_finite() && diameter_mm > 0.0) {
        return Err(CalcError::InvalidGeometry(format!(
            "diameter {} must be positive",
            diameter_mm
        )));
    }
    if !(aggressiveness.is_finite() && aggressiveness > 0.0) {
        return Err(CalcError::InvalidAggressiveness(aggressiveness));
    }

    let [vc_min, vc_max] = material.vc_range_m_min;
    let vc_target_m_min = (vc_min + vc_max) / 2.0 * cut_type.speed_factor() * aggressiveness;
    let rpm_theoretical = rpm_for_speed(vc_target_m_min, diameter_mm);

    let mut warnings = Vec::new();
    let rpm_actual = if rpm_theoretical > spindle.rpm_max {
        warnings.push(Warning::new(
            WarningKind::RpmLimited,
            Severity::Warning,
            format!(
                "RPM {:.0} exceeds spindle maximum {:.0}; running at maximum",
                rpm_theoretical, spindle.rpm_max
            ),
        ));
        spindle.rpm_max
    } else if rpm_theoretical < spindle.rpm_min {
        warnings.push(Warning::new(
            WarningKind::RpmLimited,
            Severity::Warning,
            format!(
                "RPM {:.0} is below spindle minimum {:.0}; running at minimum",
                rpm_theoretical, spindle.rpm_min
            ),
        ));
        spindle.rpm_min
    } else {
        rpm_theoretical
    };

    Ok(SpeedResult {
        vc_target_m_min,
        rpm_theoretical,
        rpm_actual,
        vc_actual_m_min: speed_for_rpm(rpm_actual, diameter_mm),
        warnings,
    })
}

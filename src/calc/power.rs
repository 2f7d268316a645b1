//! Spindle power available vs. power the cut needs

use serde::Serialize;

use super::table::Table;
use super::{CalcError, Severity, Warning, WarningKind};
use crate::config::Policy;
use crate::reference::{Material, Spindle, ToolType};
use crate::units::kw_to_w;

/// Power multiplier by tool type, relative to a flat end mill
pub fn tool_power_factor(tool_type: ToolType) -> f64 {
    match tool_type {
        ToolType::EndmillFlat => 1.0,
        ToolType::Drill => 1.3,
        ToolType::Vbit => 0.9,
        ToolType::Facemill => 1.1,
        ToolType::Boring => 1.0,
        ToolType::Slitting => 1.2,
    }
}

/// Spindle power at `rpm` in watts, interpolated along the power curve and
/// held flat beyond its ends. Zero for a spindle without a curve.
pub fn available_power_w(spindle: &Spindle, rpm: f64) -> f64 {
    power_at_w(&spindle.power_table(), rpm)
}

/// Same as [`available_power_w`] against a prebuilt kW-by-RPM table, for
/// callers sampling many speeds. Zero for an empty table or non-finite RPM.
pub fn power_at_w(curve: &Table<f64>, rpm: f64) -> f64 {
    curve.lookup(rpm).map(kw_to_w).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerResult {
    pub available_w: f64,
    /// Power at the spindle for the requested cut, efficiency included
    pub required_w: f64,
    pub power_limited: bool,
    /// `available / required` when limited, otherwise exactly 1.0
    pub scaling_factor: f64,
    pub warnings: Vec<Warning>,
}

pub fn compute_power(
    spindle: &Spindle,
    material: &Material,
    tool_type: ToolType,
    rpm: f64,
    mrr_mm3_min: f64,
    policy: &Policy,
) -> Result<PowerResult, CalcError> {
    if !(rpm.is_finite() && rpm > 0.0) {
        return Err(CalcError::InvalidRpm(rpm));
    }

    let available_w = available_power_w(spindle, rpm);
    if available_w <= 0.0 {
        return Err(CalcError::NoSpindlePower {
            spindle: spindle.id.clone(),
            rpm,
        });
    }

    // J/mm³ × mm³/min = J/min
    let cutting_w = mrr_mm3_min * material.specific_cutting_energy_j_mm3 / 60.0;
    let required_w = cutting_w * tool_power_factor(tool_type) / policy.mechanical_efficiency;

    let mut warnings = Vec::new();
    let (power_limited, scaling_factor) = if required_w > available_w {
        let factor = available_w / required_w;
        warnings.push(Warning::new(
            WarningKind::PowerLimited,
            Severity::Warning,
            format!(
                "Cut needs {:.0} W but spindle delivers {:.0} W at {:.0} RPM; feed scaled to {:.0}%",
                required_w,
                available_w,
                rpm,
                factor * 100.0
            ),
        ));
        (true, factor)
    } else {
        (false, 1.0)
    };

    Ok(PowerResult {
        available_w,
        required_w,
        power_limited,
        scaling_factor,
        warnings,
    })
}

/// Scale feed and MRR by the power limit. Identity when not limited.
pub fn apply_power_limiting(feed_mm_min: f64, mrr_mm3_min: f64, power: &PowerResult) -> (f64, f64) {
    if !power.power_limited {
        return (feed_mm_min, mrr_mm3_min);
    }
    (
        feed_mm_min * power.scaling_factor,
        mrr_mm3_min * power.scaling_factor,
    )
}

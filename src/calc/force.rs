//! Tangential cutting force

use serde::Serialize;

use super::{Severity, Warning, WarningKind};
use crate::config::Policy;
use crate::reference::{Material, ToolType};

pub fn tool_force_multiplier(tool_type: ToolType) -> f64 {
    match tool_type {
        ToolType::EndmillFlat => 1.0,
        ToolType::Drill => 1.5,
        ToolType::Vbit => 0.8,
        ToolType::Facemill => 0.6,
        ToolType::Boring => 1.2,
        ToolType::Slitting => 1.3,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForceResult {
    pub chip_area_mm2: f64,
    pub base_force_n: f64,
    pub total_force_n: f64,
    pub warnings: Vec<Warning>,
}

pub fn compute_force(
    material: &Material,
    tool_type: ToolType,
    diameter_mm: f64,
    ae_mm: f64,
    fz_mm: f64,
    policy: &Policy,
) -> ForceResult {
    let chip_area_mm2 = ae_mm * fz_mm;
    // kN/mm² × mm² → kN → N
    let base_force_n = material.force_coeff_kn_mm2 * chip_area_mm2 * 1000.0;
    let total_force_n = base_force_n * tool_force_multiplier(tool_type);

    let mut warnings = Vec::new();
    let per_mm = total_force_n / diameter_mm;
    if per_mm > policy.force_danger_n_per_mm {
        warnings.push(Warning::new(
            WarningKind::HighForce,
            Severity::Danger,
            format!(
                "Cutting force {:.0} N ({:.0} N/mm of diameter) risks tool breakage",
                total_force_n, per_mm
            ),
        ));
    } else if per_mm > policy.force_warning_n_per_mm {
        warnings.push(Warning::new(
            WarningKind::HighForce,
            Severity::Warning,
            format!(
                "Cutting force {:.0} N ({:.0} N/mm of diameter) is high",
                total_force_n, per_mm
            ),
        ));
    }

    ForceResult {
        chip_area_mm2,
        base_force_n,
        total_force_n,
        warnings,
    }
}

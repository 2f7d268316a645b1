//! Tool tip deflection
//!
//! Static deflection is the sum of three compliances in series:
//!
//! - cantilever bending `F·L³ / (3·E·I)` with `I = π·d⁴/64`
//! - shear `1.2·F·L / (G·A)` with `A = π·d²/4`, `G = E/2.6`
//! - the holder interface, a flat mm/N constant
//!
//! The static total is then multiplied by a dynamic amplification factor
//! that depends on how close the tooth-passing frequency sits to the
//! tool's first bending mode.

use serde::Serialize;
use std::f64::consts::PI;

use super::{CalcError, Severity, Warning, WarningKind};
use crate::reference::ToolMaterial;
use crate::units::gpa_to_n_per_mm2;

/// Young's modulus in GPa
pub fn youngs_modulus_gpa(material: &ToolMaterial) -> f64 {
    match material {
        ToolMaterial::Carbide => 600.0,
        ToolMaterial::Hss => 210.0,
        _ => 400.0,
    }
}

/// Density in kg/m³ for the mass estimate
pub fn density_kg_m3(material: &ToolMaterial) -> f64 {
    match material {
        ToolMaterial::Carbide => 14_500.0,
        ToolMaterial::Hss | ToolMaterial::Cobalt => 8_100.0,
        ToolMaterial::Ceramic => 3_900.0,
        ToolMaterial::Diamond => 3_500.0,
        ToolMaterial::Other(_) => 10_000.0,
    }
}

/// Which diameter the section properties use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SectionBasis {
    /// Solid cylinder at the cutting diameter
    #[default]
    Nominal,
    /// Solid cylinder at the fluted core diameter
    Core,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeflectionInput {
    pub force_n: f64,
    pub stickout_mm: f64,
    pub diameter_mm: f64,
    pub core_diameter_mm: f64,
    pub flutes: u32,
    pub rpm: f64,
    pub tool_material: ToolMaterial,
    pub holder_compliance_mm_per_n: f64,
    pub section: SectionBasis,
    /// Clamp applied to the dynamic amplification factor
    pub amplification_bounds: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeflectionResult {
    pub bending_mm: f64,
    pub shear_mm: f64,
    pub holder_mm: f64,
    pub static_mm: f64,
    pub natural_frequency_hz: f64,
    pub operating_frequency_hz: f64,
    pub frequency_ratio: f64,
    pub amplification: f64,
    pub total_mm: f64,
}

/// Amplification `G(r)` for operating/natural frequency ratio `r`, clamped
/// to `bounds`.
pub fn dynamic_amplification(ratio: f64, bounds: (f64, f64)) -> f64 {
    let g = if ratio < 0.7 {
        1.0 + 0.1 * ratio
    } else if ratio <= 1.3 {
        3.0 + 2.0 * (PI * ratio).sin()
    } else {
        1.0 / (ratio * ratio)
    };
    g.clamp(bounds.0, bounds.1)
}

pub fn compute_deflection(input: &DeflectionInput) -> Result<DeflectionResult, CalcError> {
    let d_nominal = input.diameter_mm;
    let length = input.stickout_mm;
    if !(d_nominal.is_finite() && d_nominal > 0.0) {
        return Err(CalcError::InvalidGeometry(format!(
            "diameter {} must be positive",
            d_nominal
        )));
    }
    if !(length.is_finite() && length > 0.0) {
        return Err(CalcError::InvalidGeometry(format!(
            "stickout {} must be positive",
            length
        )));
    }
    if !(input.force_n.is_finite() && input.force_n >= 0.0) {
        return Err(CalcError::InvalidForce(input.force_n));
    }

    let d = match input.section {
        SectionBasis::Nominal => d_nominal,
        SectionBasis::Core if input.core_diameter_mm > 0.0 => input.core_diameter_mm,
        SectionBasis::Core => {
            return Err(CalcError::InvalidGeometry(format!(
                "core diameter {} must be positive",
                input.core_diameter_mm
            )))
        }
    };

    let e = gpa_to_n_per_mm2(youngs_modulus_gpa(&input.tool_material));
    let g = e / 2.6;
    let inertia = PI * d.powi(4) / 64.0;
    let area = PI * d * d / 4.0;
    let force = input.force_n;

    let bending_mm = force * length.powi(3) / (3.0 * e * inertia);
    let shear_mm = 1.2 * force * length / (g * area);
    let holder_mm = force * input.holder_compliance_mm_per_n;
    let static_mm = bending_mm + shear_mm + holder_mm;

    // Stiffness in N/m and mass of a solid cylinder at the cutting diameter
    let stiffness_n_m = 3.0 * e * inertia / length.powi(3) * 1000.0;
    let volume_m3 = PI * (d_nominal / 1000.0).powi(2) / 4.0 * (length / 1000.0);
    let mass_kg = volume_m3 * density_kg_m3(&input.tool_material);
    let natural_frequency_hz = (stiffness_n_m / mass_kg).sqrt() / (2.0 * PI);

    let operating_frequency_hz = input.rpm / 60.0 * input.flutes as f64;
    let frequency_ratio = operating_frequency_hz / natural_frequency_hz;
    let amplification = dynamic_amplification(frequency_ratio, input.amplification_bounds);

    Ok(DeflectionResult {
        bending_mm,
        shear_mm,
        holder_mm,
        static_mm,
        natural_frequency_hz,
        operating_frequency_hz,
        frequency_ratio,
        amplification,
        total_mm: static_mm * amplification,
    })
}

/// Warning for a total deflection, if any. Thresholds are in mm.
pub fn assess_deflection(total_mm: f64, warning_mm: f64, danger_mm: f64) -> Option<Warning> {
    if total_mm > danger_mm {
        Some(Warning::new(
            WarningKind::DeflectionDanger,
            Severity::Danger,
            format!(
                "Tool deflection {:.3} mm exceeds {:.3} mm; expect chatter, poor finish or breakage",
                total_mm, danger_mm
            ),
        ))
    } else if total_mm > warning_mm {
        Some(Warning::new(
            WarningKind::DeflectionWarning,
            Severity::Warning,
            format!(
                "Tool deflection {:.3} mm exceeds {:.3} mm; reduce stickout or engagement",
                total_mm, warning_mm
            ),
        ))
    } else {
        None
    }
}

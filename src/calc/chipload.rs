//! Chip load and feed rate
//!
//! Base chip load comes from the material table at the tool diameter,
//! scaled by aggressiveness, tool type and coating. Narrow radial cuts get
//! a chip-thinning bump. The resulting feed is capped at the machine's axis
//! limit and the chip load is re-derived from whatever feed survives.

use serde::Serialize;

use super::{CalcError, Severity, Warning, WarningKind};
use crate::config::Policy;
use crate::reference::{ChipThinning, Coating, Machine, Material, Tool, ToolType};

/// Chip load multiplier by tool type
pub fn tool_type_factor(tool_type: ToolType) -> f64 {
    match tool_type {
        ToolType::EndmillFlat => 1.0,
        ToolType::Drill => 1.2,
        ToolType::Vbit => 0.6,
        ToolType::Facemill => 1.1,
        ToolType::Boring => 0.8,
        ToolType::Slitting => 0.7,
    }
}

/// Chip load multiplier by coating
pub fn coating_factor(coating: &Coating) -> f64 {
    match coating {
        Coating::None | Coating::Other(_) => 1.0,
        Coating::TiN => 1.05,
        Coating::TiCN | Coating::Dlc => 1.1,
        Coating::TiAlN | Coating::AlTiN | Coating::AlCrN => 1.2,
        Coating::Diamond => 1.15,
    }
}

/// Recommended `[min, max]` chip load for a diameter, in mm/tooth.
pub fn chipload_range(material: &Material, diameter_mm: f64) -> Result<[f64; 2], CalcError> {
    if !(diameter_mm.is_finite() && diameter_mm > 0.0) {
        return Err(CalcError::InvalidGeometry(format!(
            "diameter {} must be positive",
            diameter_mm
        )));
    }
    material
        .fz_mm_per_tooth_by_diameter
        .table()
        .lookup(diameter_mm)
        .ok_or_else(|| CalcError::NoChiploadData(material.id.clone()))
}

/// Chip-thinning multiplier for a radial width of cut. 1.0 when the cut is
/// wide enough, otherwise `sqrt(D / woc)` capped at the material limit.
pub fn chip_thinning_factor(thinning: &ChipThinning, diameter_mm: f64, woc_mm: f64) -> f64 {
    if woc_mm >= thinning.enable_below_fraction * diameter_mm {
        return 1.0;
    }
    (diameter_mm / woc_mm)
        .sqrt()
        .max(1.0)
        .min(thinning.limit_factor)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiploadRequest {
    pub diameter_mm: f64,
    pub flutes: u32,
    pub rpm: f64,
    /// Radial width the user asked for, before engagement clamping
    pub width_of_cut_mm: f64,
    pub aggressiveness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiploadResult {
    pub range_mm: [f64; 2],
    pub fz_base_mm: f64,
    pub thinning_factor: f64,
    pub fz_adjusted_mm: f64,
    pub feed_theoretical_mm_min: f64,
    pub feed_actual_mm_min: f64,
    pub warnings: Vec<Warning>,
}

pub fn compute_chipload(
    material: &Material,
    machine: &Machine,
    tool: &Tool,
    req: &ChiploadRequest,
    policy: &Policy,
) -> Result<ChiploadResult, CalcError> {
    if !(req.diameter_mm.is_finite() && req.diameter_mm > 0.0) || req.flutes == 0 {
        return Err(CalcError::InvalidGeometry(format!(
            "diameter {} / flutes {} must be positive",
            req.diameter_mm, req.flutes
        )));
    }
    if !(req.rpm.is_finite() && req.rpm > 0.0) {
        return Err(CalcError::InvalidRpm(req.rpm));
    }
    if !(req.width_of_cut_mm.is_finite() && req.width_of_cut_mm > 0.0) {
        return Err(CalcError::InvalidWidth(req.width_of_cut_mm));
    }
    if !(req.aggressiveness.is_finite() && req.aggressiveness > 0.0) {
        return Err(CalcError::InvalidAggressiveness(req.aggressiveness));
    }

    let range_mm = chipload_range(material, req.diameter_mm)?;
    let [fz_min, fz_max] = range_mm;

    let fz_base_mm = (fz_min + fz_max) / 2.0
        * req.aggressiveness
        * machine.aggressiveness.feed
        * tool_type_factor(tool.tool_type)
        * coating_factor(&tool.coating);

    let thinning_factor =
        chip_thinning_factor(&material.chip_thinning, req.diameter_mm, req.width_of_cut_mm);
    let mut fz_adjusted_mm = fz_base_mm * thinning_factor;

    let teeth_per_min = req.rpm * req.flutes as f64;
    let feed_theoretical_mm_min = teeth_per_min * fz_adjusted_mm;

    let mut warnings = Vec::new();
    let feed_actual_mm_min = if feed_theoretical_mm_min > machine.axis_max_feed_mm_min {
        warnings.push(Warning::new(
            WarningKind::FeedLimited,
            Severity::Warning,
            format!(
                "Feed {:.0} mm/min exceeds machine limit {:.0} mm/min; chip load reduced",
                feed_theoretical_mm_min, machine.axis_max_feed_mm_min
            ),
        ));
        fz_adjusted_mm = machine.axis_max_feed_mm_min / teeth_per_min;
        machine.axis_max_feed_mm_min
    } else {
        feed_theoretical_mm_min
    };

    if fz_adjusted_mm < policy.chipload_low_factor * fz_min {
        warnings.push(Warning::new(
            WarningKind::ChiploadDanger,
            Severity::Danger,
            format!(
                "Chip load {:.4} mm is far below the recommended {:.4}-{:.4} mm; tool will rub",
                fz_adjusted_mm, fz_min, fz_max
            ),
        ));
    } else if fz_adjusted_mm > policy.chipload_high_factor * fz_max {
        warnings.push(Warning::new(
            WarningKind::ChiploadWarning,
            Severity::Warning,
            format!(
                "Chip load {:.4} mm is well above the recommended {:.4}-{:.4} mm",
                fz_adjusted_mm, fz_min, fz_max
            ),
        ));
    }

    Ok(ChiploadResult {
        range_mm,
        fz_base_mm,
        thinning_factor,
        fz_adjusted_mm,
        feed_theoretical_mm_min,
        feed_actual_mm_min,
        warnings,
    })
}

//! Effective tool geometry after user overrides.

use serde::Serialize;

use super::CalcError;
use crate::reference::{core_ratio, Tool, ToolType};
use crate::units::deg_to_rad;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveGeometry {
    pub diameter_mm: f64,
    pub flutes: u32,
    pub stickout_mm: f64,
    pub core_diameter_mm: f64,
}

/// Resolve the diameter, flute count and stickout the rest of the pipeline
/// uses. Overrides always win. V-bits with a known tip angle cut at a
/// diameter that grows with `depth_mm`, capped at the nominal diameter.
pub fn resolve_geometry(
    tool: &Tool,
    override_flutes: Option<u32>,
    override_stickout_mm: Option<f64>,
    depth_mm: Option<f64>,
) -> Result<EffectiveGeometry, CalcError> {
    let flutes = override_flutes.unwrap_or(tool.flutes);
    let stickout_mm = override_stickout_mm.unwrap_or(tool.stickout_mm);

    let diameter_mm = match (tool.tool_type, tool.tip_angle_deg, depth_mm) {
        (ToolType::Vbit, Some(angle), Some(depth)) if depth > 0.0 => {
            vbit_diameter_at_depth(tool, angle, depth)
        }
        _ => tool.diameter_mm,
    };

    if !(diameter_mm.is_finite() && diameter_mm > 0.0) {
        return Err(CalcError::InvalidGeometry(format!(
            "effective diameter {} must be positive",
            diameter_mm
        )));
    }
    if flutes == 0 {
        return Err(CalcError::InvalidGeometry(
            "flute count must be at least 1".to_string(),
        ));
    }
    if !(stickout_mm.is_finite() && stickout_mm > 0.0) {
        return Err(CalcError::InvalidGeometry(format!(
            "stickout {} must be positive",
            stickout_mm
        )));
    }

    let core_diameter_mm = match (tool.core_diameter_mm, override_flutes) {
        (Some(core), None) => core.min(diameter_mm),
        _ => diameter_mm * core_ratio(flutes),
    };

    Ok(EffectiveGeometry {
        diameter_mm,
        flutes,
        stickout_mm,
        core_diameter_mm,
    })
}

fn vbit_diameter_at_depth(tool: &Tool, included_angle_deg: f64, depth_mm: f64) -> f64 {
    let tip = tool.tip_diameter_mm.unwrap_or(0.0);
    let half_angle = deg_to_rad(included_angle_deg) / 2.0;
    (tip + 2.0 * depth_mm * half_angle.tan()).min(tool.diameter_mm)
}

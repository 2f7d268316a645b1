//! Axial/radial engagement and material removal rate

use serde::Serialize;
use std::f64::consts::PI;

use super::{Severity, Warning, WarningKind};
use crate::reference::{Machine, Material, Tool, ToolType};

/// Depth of cut before clamping: the user's value, else the tool default
/// scaled by the machine's axial aggressiveness.
pub fn requested_doc(tool: &Tool, machine: &Machine, user_doc_mm: Option<f64>) -> f64 {
    user_doc_mm.unwrap_or(tool.default_doc_mm * machine.aggressiveness.axial)
}

/// Width of cut before clamping: the user's value, else the tool default
/// scaled by the machine's radial aggressiveness. Drills default to their
/// full diameter.
pub fn requested_woc(
    tool: &Tool,
    machine: &Machine,
    diameter_mm: f64,
    user_woc_mm: Option<f64>,
) -> f64 {
    match (user_woc_mm, tool.tool_type) {
        (Some(woc), _) => woc,
        (None, ToolType::Drill) => diameter_mm,
        (None, _) => tool.default_woc_mm * machine.aggressiveness.radial,
    }
}

/// Deepest axial engagement the material allows for a tool of nominal
/// diameter `diameter_mm`.
pub fn depth_limit(material: &Material, diameter_mm: f64) -> f64 {
    material.max_engagement_fraction * diameter_mm
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementResult {
    pub max_doc_mm: f64,
    pub max_woc_mm: f64,
    pub ap_mm: f64,
    pub ae_mm: f64,
    pub warnings: Vec<Warning>,
}

/// Clamp requested DOC and WOC to the material's engagement limit. DOC is
/// limited against the tool's nominal diameter, WOC against the diameter
/// actually cutting (smaller for a V-bit at shallow depth).
pub fn resolve_engagement(
    material: &Material,
    nominal_diameter_mm: f64,
    effective_diameter_mm: f64,
    doc_mm: f64,
    woc_mm: f64,
) -> EngagementResult {
    let max_doc_mm = depth_limit(material, nominal_diameter_mm);
    let max_woc_mm = material.max_engagement_fraction * effective_diameter_mm;
    let mut warnings = Vec::new();

    let ap_mm = if doc_mm > max_doc_mm {
        warnings.push(Warning::new(
            WarningKind::DocLimited,
            Severity::Warning,
            format!(
                "Depth of cut {:.2} mm limited to {:.2} mm ({:.0}% of diameter) for {}",
                doc_mm,
                max_doc_mm,
                material.max_engagement_fraction * 100.0,
                material.id
            ),
        ));
        max_doc_mm
    } else {
        doc_mm
    };

    let ae_mm = if woc_mm > max_woc_mm {
        warnings.push(Warning::new(
            WarningKind::WocLimited,
            Severity::Warning,
            format!(
                "Width of cut {:.2} mm limited to {:.2} mm ({:.0}% of diameter) for {}",
                woc_mm,
                max_woc_mm,
                material.max_engagement_fraction * 100.0,
                material.id
            ),
        ));
        max_woc_mm
    } else {
        woc_mm
    };

    EngagementResult {
        max_doc_mm,
        max_woc_mm,
        ap_mm,
        ae_mm,
        warnings,
    }
}

/// Material removal rate in mm³/min. Drills remove a full circle per unit
/// of feed; everything else removes `ae × ap` per unit of feed.
pub fn material_removal_rate(
    tool_type: ToolType,
    diameter_mm: f64,
    ap_mm: f64,
    ae_mm: f64,
    feed_mm_min: f64,
) -> f64 {
    match tool_type {
        ToolType::Drill => PI * diameter_mm * diameter_mm / 4.0 * feed_mm_min,
        _ => ae_mm * ap_mm * feed_mm_min,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::testing::{endmill, machine, steel};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_within_limits_untouched() {
        let result = resolve_engagement(&steel(), 6.0, 6.0, 3.0, 1.0);
        assert_eq!(result.ap_mm, 3.0);
        assert_eq!(result.ae_mm, 1.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_clamped_to_engagement_fraction() {
        // steel fixture allows 0.75 x D
        let result = resolve_engagement(&steel(), 6.0, 6.0, 12.0, 6.0);
        assert_eq!(result.max_doc_mm, 4.5);
        assert_eq!(result.max_woc_mm, 4.5);
        assert_eq!(result.ap_mm, 4.5);
        assert_eq!(result.ae_mm, 4.5);
        let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::DocLimited, WarningKind::WocLimited]);
    }

    #[test]
    fn test_requested_defaults_scale_with_machine() {
        let tool = endmill();
        let mut router = machine();
        router.aggressiveness.axial = 0.5;
        router.aggressiveness.radial = 0.8;
        assert_eq!(requested_doc(&tool, &router, None), 3.0);
        assert_eq!(requested_doc(&tool, &router, Some(2.0)), 2.0);
        assert!((requested_woc(&tool, &router, 6.0, None) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_narrow_cutting_diameter_limits_width_only() {
        // V-bit cutting 2 mm wide on a 12 mm body
        let result = resolve_engagement(&steel(), 12.0, 2.0, 1.0, 2.0);
        assert_eq!(result.ap_mm, 1.0);
        assert_eq!(result.ae_mm, 1.5);
        let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::WocLimited]);
    }

    #[test]
    fn test_drill_defaults_to_full_diameter() {
        let drill = Tool {
            tool_type: ToolType::Drill,
            ..endmill()
        };
        assert_eq!(requested_woc(&drill, &machine(), 6.0, None), 6.0);
    }

    #[test]
    fn test_drill_width_override_is_kept() {
        let drill = Tool {
            tool_type: ToolType::Drill,
            ..endmill()
        };
        assert_eq!(requested_woc(&drill, &machine(), 6.0, Some(1.0)), 1.0);
    }

    #[test]
    fn test_mrr() {
        assert_eq!(
            material_removal_rate(ToolType::EndmillFlat, 6.0, 3.0, 1.0, 1000.0),
            3000.0
        );
        let drill = material_removal_rate(ToolType::Drill, 8.0, 0.0, 0.0, 100.0);
        assert!((drill - PI * 16.0 * 100.0).abs() < 1e-9);
    }
}

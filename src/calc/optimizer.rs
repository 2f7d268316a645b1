//! Grid search over diameter × stickout for a target deflection.
//!
//! Plain enumeration: every grid cell is evaluated with the deflection
//! model and the cells closest to the target are returned, best first.

use serde::Serialize;

use super::deflection::{compute_deflection, DeflectionInput, SectionBasis};
use super::CalcError;
use crate::config::Policy;
use crate::reference::{core_ratio, Tool, ToolMaterial};

pub const DIAMETER_STEPS: usize = 15;
pub const STICKOUT_STEPS: usize = 20;
/// Relative error under which a candidate counts as on target
pub const TOLERANCE: f64 = 0.10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizerRequest {
    pub target_deflection_mm: f64,
    pub force_n: f64,
    pub rpm: f64,
    pub flutes: u32,
    pub tool_material: ToolMaterial,
    pub diameter_range_mm: (f64, f64),
    pub stickout_range_mm: (f64, f64),
    pub top_k: usize,
    pub holder_compliance_mm_per_n: f64,
    pub amplification_bounds: (f64, f64),
}

impl OptimizerRequest {
    /// Carbide tool, 3-25 mm diameters, 10-100 mm stickouts, top 5.
    pub fn new(target_deflection_mm: f64, force_n: f64, rpm: f64, flutes: u32) -> Self {
        let policy = Policy::default();
        Self {
            target_deflection_mm,
            force_n,
            rpm,
            flutes,
            tool_material: ToolMaterial::Carbide,
            diameter_range_mm: (3.0, 25.0),
            stickout_range_mm: (10.0, 100.0),
            top_k: 5,
            holder_compliance_mm_per_n: policy.holder_compliance_mm_per_n,
            amplification_bounds: (policy.amplification_min, policy.amplification_max),
        }
    }

    pub fn with_policy(mut self, policy: &Policy) -> Self {
        self.holder_compliance_mm_per_n = policy.holder_compliance_mm_per_n;
        self.amplification_bounds = (policy.amplification_min, policy.amplification_max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub diameter_mm: f64,
    pub stickout_mm: f64,
    pub deflection_mm: f64,
    /// `|deflection - target|`
    pub error_mm: f64,
    pub relative_error: f64,
    pub within_tolerance: bool,
}

fn grid(range: (f64, f64), steps: usize) -> impl Iterator<Item = f64> {
    let (lo, hi) = range;
    let span = hi - lo;
    (0..steps).map(move |i| lo + span * i as f64 / (steps - 1) as f64)
}

fn check_range(name: &str, range: (f64, f64)) -> Result<(), CalcError> {
    let (lo, hi) = range;
    if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi) {
        return Err(CalcError::InvalidGeometry(format!(
            "{} range {}..{} must be positive and ordered",
            name, lo, hi
        )));
    }
    Ok(())
}

pub fn optimize_for_deflection(req: &OptimizerRequest) -> Result<Vec<Candidate>, CalcError> {
    let target = req.target_deflection_mm;
    if !(target.is_finite() && target > 0.0) {
        return Err(CalcError::InvalidTarget(target));
    }
    check_range("diameter", req.diameter_range_mm)?;
    check_range("stickout", req.stickout_range_mm)?;

    let mut candidates = Vec::with_capacity(DIAMETER_STEPS * STICKOUT_STEPS);
    for diameter_mm in grid(req.diameter_range_mm, DIAMETER_STEPS) {
        for stickout_mm in grid(req.stickout_range_mm, STICKOUT_STEPS) {
            let result = compute_deflection(&DeflectionInput {
                force_n: req.force_n,
                stickout_mm,
                diameter_mm,
                core_diameter_mm: diameter_mm * core_ratio(req.flutes),
                flutes: req.flutes,
                rpm: req.rpm,
                tool_material: req.tool_material.clone(),
                holder_compliance_mm_per_n: req.holder_compliance_mm_per_n,
                section: SectionBasis::Nominal,
                amplification_bounds: req.amplification_bounds,
            })?;
            let error_mm = (result.total_mm - target).abs();
            let relative_error = error_mm / target;
            candidates.push(Candidate {
                diameter_mm,
                stickout_mm,
                deflection_mm: result.total_mm,
                error_mm,
                relative_error,
                within_tolerance: relative_error <= TOLERANCE,
            });
        }
    }

    candidates.sort_by(|a, b| a.error_mm.total_cmp(&b.error_mm));
    candidates.truncate(req.top_k);
    tracing::debug!(
        target_mm = target,
        best_error_mm = candidates.first().map(|c| c.error_mm),
        "deflection grid search complete"
    );
    Ok(candidates)
}

/// Search ±50% diameter and ±30% stickout around an existing tool.
pub fn optimize_tool_configuration(
    tool: &Tool,
    target_deflection_mm: f64,
    force_n: f64,
    rpm: f64,
    top_k: usize,
    policy: &Policy,
) -> Result<Vec<Candidate>, CalcError> {
    let req = OptimizerRequest {
        tool_material: tool.material.clone(),
        diameter_range_mm: (tool.diameter_mm * 0.5, tool.diameter_mm * 1.5),
        stickout_range_mm: (tool.stickout_mm * 0.7, tool.stickout_mm * 1.3),
        top_k,
        ..OptimizerRequest::new(target_deflection_mm, force_n, rpm, tool.flutes)
    }
    .with_policy(policy);
    optimize_for_deflection(&req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::testing::endmill;

    #[test]
    fn test_returns_top_k_sorted() {
        // Aim exactly at the first grid cell so the best error is zero
        let target = compute_deflection(&DeflectionInput {
            force_n: 200.0,
            stickout_mm: 10.0,
            diameter_mm: 3.0,
            core_diameter_mm: 3.0 * core_ratio(3),
            flutes: 3,
            rpm: 0.0,
            tool_material: ToolMaterial::Carbide,
            holder_compliance_mm_per_n: 0.0,
            section: SectionBasis::Nominal,
            amplification_bounds: (0.1, 50.0),
        })
        .unwrap()
        .total_mm;

        let req = OptimizerRequest {
            holder_compliance_mm_per_n: 0.0,
            ..OptimizerRequest::new(target, 200.0, 0.0, 3)
        };
        let best = optimize_for_deflection(&req).unwrap();
        assert_eq!(best.len(), 5);
        for pair in best.windows(2) {
            assert!(pair[0].error_mm <= pair[1].error_mm);
        }
        assert!(best[0].error_mm < 1e-12);
        assert!(best[0].within_tolerance);
        for c in &best {
            assert!(c.diameter_mm >= 3.0 && c.diameter_mm <= 25.0 + 1e-9);
            assert!(c.stickout_mm >= 10.0 && c.stickout_mm <= 100.0 + 1e-9);
            assert!((c.relative_error - c.error_mm / target).abs() < 1e-12);
        }
    }

    #[test]
    fn test_grid_covers_range_ends() {
        let points: Vec<f64> = grid((3.0, 25.0), DIAMETER_STEPS).collect();
        assert_eq!(points.len(), 15);
        assert_eq!(points[0], 3.0);
        assert!((points[14] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_k_larger_than_grid() {
        let req = OptimizerRequest {
            top_k: 1000,
            ..OptimizerRequest::new(0.05, 100.0, 8000.0, 2)
        };
        let all = optimize_for_deflection(&req).unwrap();
        assert_eq!(all.len(), DIAMETER_STEPS * STICKOUT_STEPS);
    }

    #[test]
    fn test_deterministic() {
        let req = OptimizerRequest::new(0.3, 150.0, 12000.0, 3);
        assert_eq!(
            optimize_for_deflection(&req).unwrap(),
            optimize_for_deflection(&req).unwrap()
        );
    }

    #[test]
    fn test_tool_centered_search_bounds() {
        let tool = endmill();
        let best =
            optimize_tool_configuration(&tool, 0.5, 200.0, 10000.0, 3, &Policy::default()).unwrap();
        assert_eq!(best.len(), 3);
        for c in &best {
            assert!(c.diameter_mm >= 3.0 - 1e-9 && c.diameter_mm <= 9.0 + 1e-9);
            assert!(c.stickout_mm >= 14.0 - 1e-9 && c.stickout_mm <= 26.0 + 1e-9);
        }
    }

    #[test]
    fn test_rejects_bad_target() {
        let req = OptimizerRequest::new(0.0, 100.0, 1000.0, 2);
        assert_eq!(optimize_for_deflection(&req), Err(CalcError::InvalidTarget(0.0)));
    }
}

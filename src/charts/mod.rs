//! Derived chart series and a caller-owned memo cache for them.
//!
//! Series are pure functions of their inputs. `ChartCache` keys each
//! entry by the series kind plus the JSON form of its input, so two
//! identical requests share an entry. Entries are never invalidated; call
//! [`ChartCache::clear`] after the reference data changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::calc::deflection::{compute_deflection, DeflectionInput};
use crate::calc::power::power_at_w;
use crate::calc::CalcError;
use crate::reference::Spindle;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to build cache key: {0}")]
    Key(#[from] serde_json::Error),

    #[error(transparent)]
    Calc(#[from] CalcError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

/// Available power in watts at `steps` evenly spaced speeds from
/// `rpm_min` to `rpm_max` inclusive.
pub fn power_curve_series(spindle: &Spindle, steps: usize) -> Vec<SeriesPoint> {
    let (lo, hi) = (spindle.rpm_min, spindle.rpm_max);
    let curve = spindle.power_table();
    let point = |rpm: f64| SeriesPoint {
        x: rpm,
        y: power_at_w(&curve, rpm),
    };
    match steps {
        0 => Vec::new(),
        1 => vec![point(lo)],
        n => (0..n)
            .map(|i| point(lo + (hi - lo) * i as f64 / (n - 1) as f64))
            .collect(),
    }
}

/// Total deflection for each stickout, everything else held at `base`.
pub fn deflection_vs_stickout_series(
    base: &DeflectionInput,
    stickouts_mm: &[f64],
) -> Result<Vec<SeriesPoint>, CalcError> {
    stickouts_mm
        .iter()
        .map(|&stickout_mm| {
            let result = compute_deflection(&DeflectionInput {
                stickout_mm,
                ..base.clone()
            })?;
            Ok(SeriesPoint {
                x: stickout_mm,
                y: result.total_mm,
            })
        })
        .collect()
}

#[derive(Serialize)]
struct PowerCurveKey<'a> {
    spindle: &'a Spindle,
    steps: usize,
}

#[derive(Serialize)]
struct DeflectionKey<'a> {
    input: &'a DeflectionInput,
    stickouts_mm: &'a [f64],
}

#[derive(Debug, Default)]
pub struct ChartCache {
    entries: HashMap<String, Vec<SeriesPoint>>,
    /// Once this many entries exist, new series are computed but not stored
    capacity: Option<usize>,
}

impl ChartCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    /// Return the series cached under `kind` + `input`, computing and
    /// storing it on a miss.
    pub fn get_or_insert_with<K, F, E>(
        &mut self,
        kind: &str,
        input: &K,
        compute: F,
    ) -> Result<Vec<SeriesPoint>, ChartError>
    where
        K: Serialize + ?Sized,
        F: FnOnce() -> Result<Vec<SeriesPoint>, E>,
        ChartError: From<E>,
    {
        let key = format!("{}:{}", kind, serde_json::to_string(input)?);
        if let Some(series) = self.entries.get(&key) {
            tracing::trace!(kind, "chart cache hit");
            return Ok(series.clone());
        }

        let series = compute()?;
        let full = self.capacity.is_some_and(|cap| self.entries.len() >= cap);
        if !full {
            self.entries.insert(key, series.clone());
        }
        tracing::trace!(kind, stored = !full, "chart cache miss");
        Ok(series)
    }

    pub fn power_curve(
        &mut self,
        spindle: &Spindle,
        steps: usize,
    ) -> Result<Vec<SeriesPoint>, ChartError> {
        self.get_or_insert_with(
            "power_curve",
            &PowerCurveKey { spindle, steps },
            || Ok::<_, ChartError>(power_curve_series(spindle, steps)),
        )
    }

    pub fn deflection_vs_stickout(
        &mut self,
        input: &DeflectionInput,
        stickouts_mm: &[f64],
    ) -> Result<Vec<SeriesPoint>, ChartError> {
        self.get_or_insert_with(
            "deflection_vs_stickout",
            &DeflectionKey {
                input,
                stickouts_mm,
            },
            || deflection_vs_stickout_series(input, stickouts_mm),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::deflection::SectionBasis;
    use crate::calc::testing::router_spindle;
    use crate::reference::ToolMaterial;
    use pretty_assertions::assert_eq;

    fn deflection_input() -> DeflectionInput {
        DeflectionInput {
            force_n: 150.0,
            stickout_mm: 20.0,
            diameter_mm: 6.0,
            core_diameter_mm: 3.6,
            flutes: 3,
            rpm: 0.0,
            tool_material: ToolMaterial::Carbide,
            holder_compliance_mm_per_n: 0.0,
            section: SectionBasis::Nominal,
            amplification_bounds: (0.1, 50.0),
        }
    }

    #[test]
    fn test_power_curve_spans_speed_range() {
        let series = power_curve_series(&router_spindle(), 4);
        let rpms: Vec<f64> = series.iter().map(|p| p.x).collect();
        assert_eq!(rpms, vec![6000.0, 12000.0, 18000.0, 24000.0]);
        let watts: Vec<f64> = series.iter().map(|p| p.y.round()).collect();
        assert_eq!(watts, vec![800.0, 1600.0, 2200.0, 2200.0]);
    }

    #[test]
    fn test_power_curve_degenerate_steps() {
        assert!(power_curve_series(&router_spindle(), 0).is_empty());
        let single = power_curve_series(&router_spindle(), 1);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].x, 6000.0);
        assert!((single[0].y - 800.0).abs() < 1e-6);
    }

    #[test]
    fn test_deflection_series_rises_with_stickout() {
        let series =
            deflection_vs_stickout_series(&deflection_input(), &[10.0, 20.0, 40.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series[0].y < series[1].y && series[1].y < series[2].y);
    }

    #[test]
    fn test_deflection_series_propagates_errors() {
        let err = deflection_vs_stickout_series(&deflection_input(), &[10.0, -5.0]).unwrap_err();
        assert!(matches!(err, CalcError::InvalidGeometry(_)));
    }

    #[test]
    fn test_cache_reuses_identical_requests() {
        let mut cache = ChartCache::new();
        let spindle = router_spindle();
        let first = cache.power_curve(&spindle, 10).unwrap();
        let second = cache.power_curve(&spindle, 10).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        cache.power_curve(&spindle, 20).unwrap();
        cache
            .deflection_vs_stickout(&deflection_input(), &[10.0, 20.0])
            .unwrap();
        assert_eq!(cache.len(), 3);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_hit_skips_compute() {
        let mut cache = ChartCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            cache
                .get_or_insert_with("custom", &42, || {
                    calls += 1;
                    Ok::<_, ChartError>(vec![SeriesPoint { x: 1.0, y: 2.0 }])
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_full_cache_still_computes() {
        let mut cache = ChartCache::with_capacity_limit(1);
        let spindle = router_spindle();
        cache.power_curve(&spindle, 5).unwrap();
        let uncached = cache.power_curve(&spindle, 7).unwrap();
        assert_eq!(uncached.len(), 7);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_series_is_not_cached() {
        let mut cache = ChartCache::new();
        let err = cache
            .deflection_vs_stickout(&deflection_input(), &[0.0])
            .unwrap_err();
        assert!(matches!(err, ChartError::Calc(CalcError::InvalidGeometry(_))));
        assert!(cache.is_empty());
    }
}

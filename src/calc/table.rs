//! Sorted key/value tables with clamped linear interpolation.
//!
//! Shared by the chipload-by-diameter lookup and the spindle power curve:
//! below the first key the first value is used, above the last key the last
//! value, exact keys return their stored value untouched, and anything in
//! between is interpolated from the two bracketing entries.

/// Values that can be blended between two table entries.
pub trait Lerp: Copy {
    fn lerp(self, other: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for [f64; 2] {
    fn lerp(self, other: Self, t: f64) -> Self {
        [self[0].lerp(other[0], t), self[1].lerp(other[1], t)]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table<V> {
    points: Vec<(f64, V)>,
}

impl<V: Lerp> Table<V> {
    /// Build a table, sorting entries by key. Later duplicates of a key win.
    pub fn new(points: impl IntoIterator<Item = (f64, V)>) -> Self {
        let mut points: Vec<(f64, V)> = points.into_iter().collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|later, earlier| {
            if later.0 == earlier.0 {
                earlier.1 = later.1;
                true
            } else {
                false
            }
        });
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[(f64, V)] {
        &self.points
    }

    pub fn keys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(k, _)| *k)
    }

    /// Resolve `key` against the table. `None` when the table is empty or
    /// `key` is not finite.
    pub fn lookup(&self, key: f64) -> Option<V> {
        if !key.is_finite() {
            return None;
        }
        let (first, last) = (self.points.first()?, self.points.last()?);
        if key <= first.0 {
            return Some(first.1);
        }
        if key >= last.0 {
            return Some(last.1);
        }

        // finite and first.0 < key < last.0, so 0 < idx < len
        let idx = self.points.partition_point(|(k, _)| *k < key);
        let (hi_key, hi_val) = self.points[idx];
        if hi_key == key {
            return Some(hi_val);
        }
        let (lo_key, lo_val) = self.points[idx - 1];
        let t = (key - lo_key) / (hi_key - lo_key);
        Some(lo_val.lerp(hi_val, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chiploads() -> Table<[f64; 2]> {
        Table::new([
            (6.0, [0.04, 0.08]),
            (3.0, [0.02, 0.04]),
            (12.0, [0.08, 0.14]),
        ])
    }

    #[test]
    fn test_sorted_on_construction() {
        let keys: Vec<f64> = chiploads().keys().collect();
        assert_eq!(keys, vec![3.0, 6.0, 12.0]);
    }

    #[test]
    fn test_exact_key_has_no_drift() {
        let table = chiploads();
        assert_eq!(table.lookup(6.0), Some([0.04, 0.08]));
        assert_eq!(table.lookup(3.0), Some([0.02, 0.04]));
        assert_eq!(table.lookup(12.0), Some([0.08, 0.14]));
    }

    #[test]
    fn test_clamps_outside_domain() {
        let table = chiploads();
        assert_eq!(table.lookup(0.5), Some([0.02, 0.04]));
        assert_eq!(table.lookup(40.0), Some([0.08, 0.14]));
    }

    #[test]
    fn test_interpolates_between_keys() {
        let table = chiploads();
        let [lo, hi] = table.lookup(9.0).unwrap();
        assert!((lo - 0.06).abs() < 1e-12);
        assert!((hi - 0.11).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_key_has_no_value() {
        let table = chiploads();
        assert_eq!(table.lookup(f64::NAN), None);
        assert_eq!(table.lookup(f64::INFINITY), None);
        assert_eq!(table.lookup(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_scalar_table() {
        let curve = Table::new([(6000.0, 0.8), (12000.0, 1.8), (24000.0, 2.2)]);
        assert!((curve.lookup(9000.0).unwrap() - 1.3).abs() < 1e-12);
        assert_eq!(curve.lookup(100.0), Some(0.8));
    }

    #[test]
    fn test_empty_table() {
        let table: Table<f64> = Table::new(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.lookup(1.0), None);
    }

    #[test]
    fn test_duplicate_keys_keep_last() {
        let table = Table::new([(1.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(1.0), Some(2.0));
    }
}

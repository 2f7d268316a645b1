//! Unit conversions used at the edges of the pipeline.
//!
//! Everything inside the calculation runs in millimetres, minutes, newtons
//! and watts. Conversions go through `uom` so the factors are never typed
//! by hand.

use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length, Power, Pressure};
use uom::si::length::{foot, inch, meter, millimeter};
use uom::si::power::{kilowatt, watt};
use uom::si::pressure::{gigapascal, megapascal};

/// Cutting speed in m/min to surface feet per minute.
pub fn m_min_to_sfm(vc_m_min: f64) -> f64 {
    Length::new::<meter>(vc_m_min).get::<foot>()
}

/// Feed in mm/min to inches per minute.
pub fn mm_min_to_ipm(feed_mm_min: f64) -> f64 {
    Length::new::<millimeter>(feed_mm_min).get::<inch>()
}

pub fn kw_to_w(kw: f64) -> f64 {
    Power::new::<kilowatt>(kw).get::<watt>()
}

/// Young's modulus in GPa to N/mm² (MPa), the unit the beam formulas expect.
pub fn gpa_to_n_per_mm2(gpa: f64) -> f64 {
    Pressure::new::<gigapascal>(gpa).get::<megapascal>()
}

pub fn deg_to_rad(deg: f64) -> f64 {
    Angle::new::<degree>(deg).get::<radian>()
}

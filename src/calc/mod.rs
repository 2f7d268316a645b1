//! Cutting parameter pipeline
//!
//! A request runs through a fixed sequence of pure stages:
//!
//! 1. input validation and reference lookup
//! 2. effective geometry (overrides, V-bit depth)
//! 3. cutting speed → RPM, clamped to the spindle
//! 4. chip load → feed, clamped to the machine
//! 5. engagement clamp → material removal rate
//! 6. available vs. required spindle power, feed scaled when short
//! 7. cutting force
//! 8. static + dynamic tool deflection
//!
//! Each stage reports the warnings it raised; the assembler concatenates
//! them in stage order and rounds the numbers for display.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod chipload;
pub mod deflection;
pub mod engagement;
pub mod force;
pub mod geometry;
pub mod optimizer;
pub mod power;
pub mod speed;
pub mod table;

pub use speed::CutType;

use crate::config::Policy;
use crate::reference::{ReferenceData, ToolType};
use crate::units::m_min_to_sfm;
use crate::validator::{ValidationError, Validator};

use chipload::ChiploadRequest;
use deflection::{DeflectionInput, SectionBasis};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid spindle speed: {0} RPM (must be positive)")]
    InvalidRpm(f64),

    #[error("invalid width of cut: {0} mm (must be positive)")]
    InvalidWidth(f64),

    #[error("invalid aggressiveness: {0} (must be positive)")]
    InvalidAggressiveness(f64),

    #[error("invalid cutting force: {0} N")]
    InvalidForce(f64),

    #[error("invalid target deflection: {0} mm (must be positive)")]
    InvalidTarget(f64),

    #[error("material '{0}' has no chip load data")]
    NoChiploadData(String),

    #[error("spindle '{spindle}' has no power available at {rpm} RPM")]
    NoSpindlePower { spindle: String, rpm: f64 },

    #[error("unknown tool type '{0}'")]
    UnknownToolType(String),

    #[error("unknown cut type '{0}'")]
    UnknownCutType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Danger => write!(f, "DANGER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    AggressivenessRange,
    DocOverride,
    WocOverride,
    StickoutRatio,
    FluteCount,
    RpmLimited,
    FeedLimited,
    ChiploadDanger,
    ChiploadWarning,
    DocLimited,
    WocLimited,
    PowerLimited,
    HighForce,
    DeflectionDanger,
    DeflectionWarning,
}

/// Advisory attached to a result. Never blocks the calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
    pub severity: Severity,
}

impl Warning {
    pub fn new(kind: WarningKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity,
        }
    }
}

fn default_aggressiveness() -> f64 {
    1.0
}

/// One calculation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(alias = "materialId")]
    pub material_id: String,
    #[serde(alias = "machineId")]
    pub machine_id: String,
    #[serde(alias = "spindleId")]
    pub spindle_id: String,
    #[serde(alias = "toolId")]
    pub tool_id: String,
    #[serde(alias = "cutType")]
    pub cut_type: CutType,
    #[serde(default = "default_aggressiveness")]
    pub aggressiveness: f64,
    #[serde(default)]
    pub user_doc_mm: Option<f64>,
    #[serde(default)]
    pub user_woc_mm: Option<f64>,
    #[serde(default)]
    pub override_flutes: Option<u32>,
    #[serde(default)]
    pub override_stickout_mm: Option<f64>,
}

impl Inputs {
    pub fn new(
        material_id: impl Into<String>,
        machine_id: impl Into<String>,
        spindle_id: impl Into<String>,
        tool_id: impl Into<String>,
        cut_type: CutType,
    ) -> Self {
        Self {
            material_id: material_id.into(),
            machine_id: machine_id.into(),
            spindle_id: spindle_id.into(),
            tool_id: tool_id.into(),
            cut_type,
            aggressiveness: 1.0,
            user_doc_mm: None,
            user_woc_mm: None,
            override_flutes: None,
            override_stickout_mm: None,
        }
    }
}

/// Final rounded result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutput {
    pub rpm: u32,
    pub feed_mm_min: u32,
    pub fz_mm: f64,
    pub ae_mm: f64,
    pub ap_mm: f64,
    pub mrr_mm3_min: f64,
    #[serde(rename = "power_W")]
    pub power_w: f64,
    #[serde(rename = "power_available_W")]
    pub power_available_w: f64,
    #[serde(rename = "force_N")]
    pub force_n: f64,
    pub deflection_mm: f64,
    pub vc_m_min: u32,
    pub sfm: u32,
    #[serde(rename = "toolType")]
    pub tool_type: ToolType,
    #[serde(rename = "effectiveDiameter")]
    pub effective_diameter: f64,
    #[serde(rename = "effectiveFlutes")]
    pub effective_flutes: u32,
    #[serde(rename = "powerLimited")]
    pub power_limited: bool,
    pub user_doc_override: bool,
    pub warnings: Vec<Warning>,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn round_int(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Run the full pipeline for one request.
pub fn calculate<R: ReferenceData>(
    data: &R,
    inputs: &Inputs,
    policy: &Policy,
) -> Result<CalculationOutput, CalcError> {
    let validated = Validator::new(policy).validate(data, inputs)?;
    let (material, machine, spindle, tool) = (
        validated.material,
        validated.machine,
        validated.spindle,
        validated.tool,
    );
    let mut warnings = validated.warnings;

    let requested_doc = engagement::requested_doc(tool, machine, inputs.user_doc_mm);
    // V-bit diameter follows the depth that will actually be cut
    let cut_depth = requested_doc.min(engagement::depth_limit(material, tool.diameter_mm));
    let geom = geometry::resolve_geometry(
        tool,
        inputs.override_flutes,
        inputs.override_stickout_mm,
        Some(cut_depth),
    )?;
    tracing::debug!(
        stage = "geometry",
        diameter_mm = geom.diameter_mm,
        flutes = geom.flutes,
        stickout_mm = geom.stickout_mm
    );

    let speed = speed::compute_speed(
        material,
        spindle,
        inputs.cut_type,
        geom.diameter_mm,
        inputs.aggressiveness,
    )?;
    tracing::debug!(
        stage = "speed",
        vc_target = speed.vc_target_m_min,
        rpm = speed.rpm_actual
    );
    warnings.extend(speed.warnings.iter().cloned());

    let requested_woc =
        engagement::requested_woc(tool, machine, geom.diameter_mm, inputs.user_woc_mm);
    let chip = chipload::compute_chipload(
        material,
        machine,
        tool,
        &ChiploadRequest {
            diameter_mm: geom.diameter_mm,
            flutes: geom.flutes,
            rpm: speed.rpm_actual,
            width_of_cut_mm: requested_woc,
            aggressiveness: inputs.aggressiveness,
        },
        policy,
    )?;
    tracing::debug!(
        stage = "chipload",
        fz = chip.fz_adjusted_mm,
        feed = chip.feed_actual_mm_min
    );
    warnings.extend(chip.warnings.iter().cloned());

    let engaged = engagement::resolve_engagement(
        material,
        tool.diameter_mm,
        geom.diameter_mm,
        requested_doc,
        requested_woc,
    );
    let mrr = engagement::material_removal_rate(
        tool.tool_type,
        geom.diameter_mm,
        engaged.ap_mm,
        engaged.ae_mm,
        chip.feed_actual_mm_min,
    );
    tracing::debug!(
        stage = "engagement",
        ap = engaged.ap_mm,
        ae = engaged.ae_mm,
        mrr
    );
    warnings.extend(engaged.warnings.iter().cloned());

    let power = power::compute_power(
        spindle,
        material,
        tool.tool_type,
        speed.rpm_actual,
        mrr,
        policy,
    )?;
    let (feed_mm_min, mrr_mm3_min) =
        power::apply_power_limiting(chip.feed_actual_mm_min, mrr, &power);
    let fz_mm = if power.power_limited {
        feed_mm_min / (speed.rpm_actual * geom.flutes as f64)
    } else {
        chip.fz_adjusted_mm
    };
    tracing::debug!(
        stage = "power",
        available_w = power.available_w,
        required_w = power.required_w,
        scale = power.scaling_factor
    );
    warnings.extend(power.warnings.iter().cloned());

    let force = force::compute_force(
        material,
        tool.tool_type,
        geom.diameter_mm,
        engaged.ae_mm,
        fz_mm,
        policy,
    );
    tracing::debug!(stage = "force", force_n = force.total_force_n);
    warnings.extend(force.warnings.iter().cloned());

    let deflection = deflection::compute_deflection(&DeflectionInput {
        force_n: force.total_force_n,
        stickout_mm: geom.stickout_mm,
        diameter_mm: geom.diameter_mm,
        core_diameter_mm: geom.core_diameter_mm,
        flutes: geom.flutes,
        rpm: speed.rpm_actual,
        tool_material: tool.material.clone(),
        holder_compliance_mm_per_n: policy.holder_compliance_mm_per_n,
        section: SectionBasis::Nominal,
        amplification_bounds: (policy.amplification_min, policy.amplification_max),
    })?;
    tracing::debug!(
        stage = "deflection",
        static_mm = deflection.static_mm,
        amplification = deflection.amplification,
        total_mm = deflection.total_mm
    );
    if let Some(w) = deflection::assess_deflection(
        deflection.total_mm,
        policy.deflection_warning_mm * machine.rigidity_factor,
        policy.deflection_danger_mm * machine.rigidity_factor,
    ) {
        warnings.push(w);
    }

    let output = CalculationOutput {
        rpm: round_int(speed.rpm_actual),
        feed_mm_min: round_int(feed_mm_min),
        fz_mm: round_to(fz_mm, 4),
        ae_mm: round_to(engaged.ae_mm, 2),
        ap_mm: round_to(engaged.ap_mm, 2),
        mrr_mm3_min: mrr_mm3_min.round(),
        power_w: (power.required_w * power.scaling_factor).round(),
        power_available_w: power.available_w.round(),
        force_n: round_to(force.total_force_n, 1),
        deflection_mm: round_to(deflection.total_mm, 3),
        vc_m_min: round_int(speed.vc_actual_m_min),
        sfm: round_int(m_min_to_sfm(speed.vc_actual_m_min)),
        tool_type: tool.tool_type,
        effective_diameter: round_to(geom.diameter_mm, 2),
        effective_flutes: geom.flutes,
        power_limited: power.power_limited,
        user_doc_override: inputs.user_doc_mm.is_some(),
        warnings,
    };

    tracing::info!(
        material = %material.id,
        tool = %tool.id,
        rpm = output.rpm,
        feed = output.feed_mm_min,
        warnings = output.warnings.len(),
        "calculation complete"
    );
    Ok(output)
}

//! Reference data - materials, machines, spindles and tools
//!
//! Records are looked up by string ID through the [`ReferenceData`] trait.
//! [`Library`] is the JSON-backed implementation; anything else that can
//! hand out immutable records by ID works just as well.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::calc::table::Table;
use crate::calc::CalcError;

mod defaults;

pub use defaults::default_library;

/// Lookup contract the pipeline depends on.
pub trait ReferenceData {
    fn find_material(&self, id: &str) -> Option<&Material>;
    fn find_machine(&self, id: &str) -> Option<&Machine>;
    fn find_spindle(&self, id: &str) -> Option<&Spindle>;
    fn find_tool(&self, id: &str) -> Option<&Tool>;
}

/// Cutting tool classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ToolType {
    EndmillFlat,
    Drill,
    Vbit,
    Facemill,
    Boring,
    Slitting,
}

impl ToolType {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolType::EndmillFlat => "endmill_flat",
            ToolType::Drill => "drill",
            ToolType::Vbit => "vbit",
            ToolType::Facemill => "facemill",
            ToolType::Boring => "boring",
            ToolType::Slitting => "slitting",
        }
    }
}

impl FromStr for ToolType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "endmill_flat" | "endmill" | "end_mill" | "flat_endmill" => Ok(ToolType::EndmillFlat),
            "drill" => Ok(ToolType::Drill),
            "vbit" | "v_bit" | "v-bit" => Ok(ToolType::Vbit),
            "facemill" | "face_mill" => Ok(ToolType::Facemill),
            "boring" | "boring_bar" => Ok(ToolType::Boring),
            "slitting" | "slitting_saw" => Ok(ToolType::Slitting),
            _ => Err(CalcError::UnknownToolType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ToolType {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToolType> for String {
    fn from(value: ToolType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool substrate. Unrecognised names are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ToolMaterial {
    #[default]
    Carbide,
    Hss,
    Cobalt,
    Ceramic,
    Diamond,
    Other(String),
}

impl From<String> for ToolMaterial {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "carbide" => ToolMaterial::Carbide,
            "hss" => ToolMaterial::Hss,
            "cobalt" | "hss_co" => ToolMaterial::Cobalt,
            "ceramic" => ToolMaterial::Ceramic,
            "diamond" | "pcd" => ToolMaterial::Diamond,
            _ => ToolMaterial::Other(value),
        }
    }
}

impl From<ToolMaterial> for String {
    fn from(value: ToolMaterial) -> Self {
        match value {
            ToolMaterial::Carbide => "carbide".to_string(),
            ToolMaterial::Hss => "hss".to_string(),
            ToolMaterial::Cobalt => "cobalt".to_string(),
            ToolMaterial::Ceramic => "ceramic".to_string(),
            ToolMaterial::Diamond => "diamond".to_string(),
            ToolMaterial::Other(name) => name,
        }
    }
}

/// Tool coating. Unrecognised coatings are kept as `Other` and get no bonus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Coating {
    #[default]
    None,
    TiN,
    TiCN,
    TiAlN,
    AlTiN,
    AlCrN,
    Dlc,
    Diamond,
    Other(String),
}

impl From<String> for Coating {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "uncoated" => Coating::None,
            "tin" => Coating::TiN,
            "ticn" => Coating::TiCN,
            "tialn" => Coating::TiAlN,
            "altin" => Coating::AlTiN,
            "alcrn" => Coating::AlCrN,
            "dlc" => Coating::Dlc,
            "diamond" | "cvd" => Coating::Diamond,
            _ => Coating::Other(value),
        }
    }
}

impl From<Coating> for String {
    fn from(value: Coating) -> Self {
        match value {
            Coating::None => "none".to_string(),
            Coating::TiN => "TiN".to_string(),
            Coating::TiCN => "TiCN".to_string(),
            Coating::TiAlN => "TiAlN".to_string(),
            Coating::AlTiN => "AlTiN".to_string(),
            Coating::AlCrN => "AlCrN".to_string(),
            Coating::Dlc => "DLC".to_string(),
            Coating::Diamond => "diamond".to_string(),
            Coating::Other(name) => name,
        }
    }
}

/// Chip load envelope keyed by tool diameter (mm).
///
/// Serialized as a map of diameter string to `[min, max]`, e.g.
/// `{"6": [0.04, 0.08]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, [f64; 2]>",
    into = "BTreeMap<String, [f64; 2]>"
)]
pub struct ChiploadTable(Table<[f64; 2]>);

impl ChiploadTable {
    pub fn new(entries: impl IntoIterator<Item = (f64, [f64; 2])>) -> Self {
        Self(Table::new(entries))
    }

    pub fn table(&self) -> &Table<[f64; 2]> {
        &self.0
    }
}

impl TryFrom<BTreeMap<String, [f64; 2]>> for ChiploadTable {
    type Error = String;

    fn try_from(map: BTreeMap<String, [f64; 2]>) -> Result<Self, Self::Error> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, range) in map {
            let diameter: f64 = key
                .trim()
                .parse()
                .map_err(|_| format!("chipload table key '{}' is not a diameter", key))?;
            entries.push((diameter, range));
        }
        Ok(Self::new(entries))
    }
}

impl From<ChiploadTable> for BTreeMap<String, [f64; 2]> {
    fn from(value: ChiploadTable) -> Self {
        value
            .0
            .points()
            .iter()
            .map(|(d, range)| (d.to_string(), *range))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChipThinning {
    /// Thinning applies when WOC < this fraction of the diameter
    pub enable_below_fraction: f64,
    /// Upper bound on the thinning multiplier
    pub limit_factor: f64,
}

/// Workpiece material cutting data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: String,
    /// Target cutting speed envelope, m/min
    pub vc_range_m_min: [f64; 2],
    pub fz_mm_per_tooth_by_diameter: ChiploadTable,
    pub force_coeff_kn_mm2: f64,
    pub specific_cutting_energy_j_mm3: f64,
    pub chip_thinning: ChipThinning,
    /// Fraction of tool diameter beyond which DOC/WOC get clamped
    pub max_engagement_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineAggressiveness {
    #[serde(default = "unity")]
    pub axial: f64,
    #[serde(default = "unity")]
    pub radial: f64,
    #[serde(default = "unity")]
    pub feed: f64,
}

impl Default for MachineAggressiveness {
    fn default() -> Self {
        Self {
            axial: 1.0,
            radial: 1.0,
            feed: 1.0,
        }
    }
}

fn unity() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Hard feed ceiling of the slowest cutting axis
    pub axis_max_feed_mm_min: f64,
    /// 1.0 for a rigid VMC, lower for routers; scales deflection thresholds
    #[serde(default = "unity")]
    pub rigidity_factor: f64,
    #[serde(default)]
    pub aggressiveness: MachineAggressiveness,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerPoint {
    pub rpm: f64,
    pub power_kw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spindle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub rated_power_kw: f64,
    pub rpm_min: f64,
    pub rpm_max: f64,
    pub base_rpm: f64,
    /// Control points, RPM strictly increasing
    pub power_curve: Vec<PowerPoint>,
}

impl Spindle {
    /// Power curve as an interpolation table (kW by RPM).
    pub fn power_table(&self) -> Table<f64> {
        Table::new(self.power_curve.iter().map(|p| (p.rpm, p.power_kw)))
    }
}

/// Tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub diameter_mm: f64,
    pub flutes: u32,
    #[serde(default)]
    pub coating: Coating,
    pub stickout_mm: f64,
    #[serde(default)]
    pub material: ToolMaterial,
    pub default_doc_mm: f64,
    pub default_woc_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_diameter_mm: Option<f64>,
    /// Included angle for V-bits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_angle_deg: Option<f64>,
    /// Flat at the tip of a V-bit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_diameter_mm: Option<f64>,
}

/// Core diameter as a fraction of cutting diameter, by flute count.
pub fn core_ratio(flutes: u32) -> f64 {
    match flutes {
        0 | 1 => 0.50,
        2 => 0.55,
        3 => 0.60,
        4 => 0.65,
        5 => 0.70,
        _ => 0.75,
    }
}

impl Tool {
    pub fn core_diameter_mm(&self) -> f64 {
        self.core_diameter_mm
            .unwrap_or_else(|| self.diameter_mm * core_ratio(self.flutes))
    }
}

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("failed to read library: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse library: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} '{id}': {message}")]
    Shape {
        kind: &'static str,
        id: String,
        message: String,
    },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
}

impl LibraryError {
    fn shape(kind: &'static str, id: &str, message: impl Into<String>) -> Self {
        LibraryError::Shape {
            kind,
            id: id.to_string(),
            message: message.into(),
        }
    }
}

/// Reference library - materials, machines, spindles and tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub machines: Vec<Machine>,
    #[serde(default)]
    pub spindles: Vec<Spindle>,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl Library {
    /// Load and shape-check a library from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LibraryError> {
        let library: Library = serde_json::from_str(json)?;
        library.validate()?;
        Ok(library)
    }

    pub fn to_json_pretty(&self) -> Result<String, LibraryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Shape checks the pipeline relies on
    pub fn validate(&self) -> Result<(), LibraryError> {
        check_unique("material", self.materials.iter().map(|m| m.id.as_str()))?;
        check_unique("machine", self.machines.iter().map(|m| m.id.as_str()))?;
        check_unique("spindle", self.spindles.iter().map(|s| s.id.as_str()))?;
        check_unique("tool", self.tools.iter().map(|t| t.id.as_str()))?;

        for m in &self.materials {
            let [lo, hi] = m.vc_range_m_min;
            if !(lo > 0.0 && lo <= hi) {
                return Err(LibraryError::shape(
                    "material",
                    &m.id,
                    format!("vc_range_m_min [{}, {}] must be positive and ordered", lo, hi),
                ));
            }
            if m.fz_mm_per_tooth_by_diameter.table().is_empty() {
                return Err(LibraryError::shape("material", &m.id, "chipload table is empty"));
            }
            for (d, [fz_lo, fz_hi]) in m.fz_mm_per_tooth_by_diameter.table().points() {
                if !(*d > 0.0 && *fz_lo > 0.0 && fz_lo <= fz_hi) {
                    return Err(LibraryError::shape(
                        "material",
                        &m.id,
                        format!("chipload entry {} => [{}, {}] is invalid", d, fz_lo, fz_hi),
                    ));
                }
            }
            if !(m.max_engagement_fraction > 0.0 && m.max_engagement_fraction <= 1.0) {
                return Err(LibraryError::shape(
                    "material",
                    &m.id,
                    "max_engagement_fraction must be in (0, 1]",
                ));
            }
            if m.chip_thinning.limit_factor < 1.0 || m.chip_thinning.enable_below_fraction <= 0.0 {
                return Err(LibraryError::shape(
                    "material",
                    &m.id,
                    "chip_thinning needs limit_factor >= 1 and a positive fraction",
                ));
            }
            if m.force_coeff_kn_mm2 <= 0.0 || m.specific_cutting_energy_j_mm3 <= 0.0 {
                return Err(LibraryError::shape(
                    "material",
                    &m.id,
                    "force and energy coefficients must be positive",
                ));
            }
        }

        for m in &self.machines {
            if m.axis_max_feed_mm_min <= 0.0 || m.rigidity_factor <= 0.0 {
                return Err(LibraryError::shape(
                    "machine",
                    &m.id,
                    "axis feed and rigidity must be positive",
                ));
            }
        }

        for s in &self.spindles {
            if !(s.rpm_min > 0.0 && s.rpm_min <= s.rpm_max) {
                return Err(LibraryError::shape(
                    "spindle",
                    &s.id,
                    format!("rpm range {}..{} is invalid", s.rpm_min, s.rpm_max),
                ));
            }
            if s.power_curve.is_empty() {
                return Err(LibraryError::shape("spindle", &s.id, "power curve is empty"));
            }
            if s.power_curve.windows(2).any(|w| w[1].rpm <= w[0].rpm) {
                return Err(LibraryError::shape(
                    "spindle",
                    &s.id,
                    "power curve RPM must be strictly increasing",
                ));
            }
            if s.power_curve.iter().any(|p| p.power_kw <= 0.0) {
                return Err(LibraryError::shape(
                    "spindle",
                    &s.id,
                    "power curve values must be positive",
                ));
            }
        }

        for t in &self.tools {
            if t.diameter_mm <= 0.0 || t.flutes == 0 || t.stickout_mm <= 0.0 {
                return Err(LibraryError::shape(
                    "tool",
                    &t.id,
                    "diameter, flutes and stickout must be positive",
                ));
            }
            if t.default_doc_mm <= 0.0 || t.default_woc_mm <= 0.0 {
                return Err(LibraryError::shape(
                    "tool",
                    &t.id,
                    "default DOC and WOC must be positive",
                ));
            }
        }

        Ok(())
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), LibraryError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(LibraryError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

impl ReferenceData for Library {
    fn find_material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    fn find_machine(&self, id: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    fn find_spindle(&self, id: &str) -> Option<&Spindle> {
        self.spindles.iter().find(|s| s.id == id)
    }

    fn find_tool(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }
}

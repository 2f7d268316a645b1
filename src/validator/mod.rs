use thiserror::Error;

use crate::calc::{Inputs, Severity, Warning, WarningKind};
use crate::config::Policy;
use crate::reference::{Machine, Material, ReferenceData, Spindle, Tool};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("material '{0}' not found")]
    MaterialNotFound(String),

    #[error("machine '{0}' not found")]
    MachineNotFound(String),

    #[error("spindle '{0}' not found")]
    SpindleNotFound(String),

    #[error("tool '{0}' not found")]
    ToolNotFound(String),

    #[error("{field} is not a finite number: {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

/// Request whose references all resolved, plus any advisories raised
/// while checking it.
#[derive(Debug, Clone)]
pub struct ValidatedRequest<'a> {
    pub material: &'a Material,
    pub machine: &'a Machine,
    pub spindle: &'a Spindle,
    pub tool: &'a Tool,
    pub warnings: Vec<Warning>,
}

pub struct Validator<'p> {
    policy: &'p Policy,
}

impl<'p> Validator<'p> {
    pub fn new(policy: &'p Policy) -> Self {
        Self { policy }
    }

    pub fn validate<'a, R: ReferenceData>(
        &self,
        data: &'a R,
        inputs: &Inputs,
    ) -> Result<ValidatedRequest<'a>, ValidationError> {
        check_numbers(inputs)?;

        let material = data
            .find_material(&inputs.material_id)
            .ok_or_else(|| ValidationError::MaterialNotFound(inputs.material_id.clone()))?;
        let machine = data
            .find_machine(&inputs.machine_id)
            .ok_or_else(|| ValidationError::MachineNotFound(inputs.machine_id.clone()))?;
        let spindle = data
            .find_spindle(&inputs.spindle_id)
            .ok_or_else(|| ValidationError::SpindleNotFound(inputs.spindle_id.clone()))?;
        let tool = data
            .find_tool(&inputs.tool_id)
            .ok_or_else(|| ValidationError::ToolNotFound(inputs.tool_id.clone()))?;

        let warnings = self.advisories(inputs, tool);

        Ok(ValidatedRequest {
            material,
            machine,
            spindle,
            tool,
            warnings,
        })
    }

    /// Risky-but-legal overrides
    fn advisories(&self, inputs: &Inputs, tool: &Tool) -> Vec<Warning> {
        let p = self.policy;
        let mut warnings = Vec::new();
        let d = tool.diameter_mm;

        let a = inputs.aggressiveness;
        if a < p.aggressiveness_min || a > p.aggressiveness_max {
            warnings.push(Warning::new(
                WarningKind::AggressivenessRange,
                Severity::Warning,
                format!(
                    "Aggressiveness {:.2} is outside the usual {:.1}-{:.1} range",
                    a, p.aggressiveness_min, p.aggressiveness_max
                ),
            ));
        }

        if let Some(doc) = inputs.user_doc_mm {
            if let Some(w) = ratio_warning(
                WarningKind::DocOverride,
                "Depth of cut",
                doc,
                d,
                p.doc_warning_ratio,
                p.doc_danger_ratio,
            ) {
                warnings.push(w);
            }
        }

        if let Some(woc) = inputs.user_woc_mm {
            if let Some(w) = ratio_warning(
                WarningKind::WocOverride,
                "Width of cut",
                woc,
                d,
                p.woc_warning_ratio,
                p.woc_danger_ratio,
            ) {
                warnings.push(w);
            }
        }

        if let Some(stickout) = inputs.override_stickout_mm {
            let ld = stickout / d;
            if ld >= p.stickout_danger_ratio {
                warnings.push(Warning::new(
                    WarningKind::StickoutRatio,
                    Severity::Danger,
                    format!(
                        "Stickout {:.1} mm is {:.1}x the diameter; expect severe deflection and chatter",
                        stickout, ld
                    ),
                ));
            } else if ld >= p.stickout_warning_ratio {
                warnings.push(Warning::new(
                    WarningKind::StickoutRatio,
                    Severity::Warning,
                    format!(
                        "Stickout {:.1} mm is {:.1}x the diameter; reduce engagement",
                        stickout, ld
                    ),
                ));
            }
        }

        if let Some(flutes) = inputs.override_flutes {
            if flutes > p.max_practical_flutes {
                warnings.push(Warning::new(
                    WarningKind::FluteCount,
                    Severity::Warning,
                    format!(
                        "{} flutes is more than the practical maximum of {}",
                        flutes, p.max_practical_flutes
                    ),
                ));
            }
        }

        warnings
    }
}

/// `value / diameter` against warning (strictly above) and danger (at or
/// above) ratios.
fn ratio_warning(
    kind: WarningKind,
    label: &str,
    value: f64,
    diameter: f64,
    warning_ratio: f64,
    danger_ratio: f64,
) -> Option<Warning> {
    let ratio = value / diameter;
    if ratio >= danger_ratio {
        Some(Warning::new(
            kind,
            Severity::Danger,
            format!(
                "{} {:.2} mm is {:.2}x the {:.2} mm tool diameter",
                label, value, ratio, diameter
            ),
        ))
    } else if ratio > warning_ratio {
        Some(Warning::new(
            kind,
            Severity::Warning,
            format!(
                "{} {:.2} mm is large for a {:.2} mm tool ({:.2}x)",
                label, value, diameter, ratio
            ),
        ))
    } else {
        None
    }
}

fn check_numbers(inputs: &Inputs) -> Result<(), ValidationError> {
    if !inputs.aggressiveness.is_finite() {
        return Err(ValidationError::NonFinite {
            field: "aggressiveness",
            value: inputs.aggressiveness,
        });
    }

    let optional = [
        ("user_doc_mm", inputs.user_doc_mm),
        ("user_woc_mm", inputs.user_woc_mm),
        ("override_stickout_mm", inputs.override_stickout_mm),
    ];
    for (field, value) in optional {
        if let Some(value) = value {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field, value });
            }
            if value <= 0.0 {
                return Err(ValidationError::NotPositive { field, value });
            }
        }
    }

    if inputs.override_flutes == Some(0) {
        return Err(ValidationError::NotPositive {
            field: "override_flutes",
            value: 0.0,
        });
    }

    Ok(())
}

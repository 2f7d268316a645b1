//! End-to-end pipeline tests against the built-in library

use pretty_assertions::assert_eq;
use swarf_feeds::calc::chipload::{
    chip_thinning_factor, chipload_range, compute_chipload, ChiploadRequest,
};
use swarf_feeds::calc::deflection::{
    assess_deflection, compute_deflection, DeflectionInput, SectionBasis,
};
use swarf_feeds::calc::speed::compute_speed;
use swarf_feeds::charts::{deflection_vs_stickout_series, ChartCache};
use swarf_feeds::reference::{
    ChipThinning, ChiploadTable, Coating, Machine, MachineAggressiveness, Material, Tool,
    ToolMaterial, ToolType,
};
use swarf_feeds::{
    calculate, default_library, CalcError, CalculationOutput, CutType, Inputs, Library, Policy,
    ReferenceData, ValidationError, WarningKind,
};

const CUTS: [CutType; 6] = [
    CutType::Slot,
    CutType::Profile,
    CutType::Adaptive,
    CutType::Facing,
    CutType::Drilling,
    CutType::Boring,
];

fn run(lib: &Library, material: &str, tool: &str, cut: CutType) -> CalculationOutput {
    let req = Inputs::new(material, "vmc_small", "vmc_24k", tool, cut);
    calculate(lib, &req, &Policy::default()).unwrap()
}

fn count(out: &CalculationOutput, kind: WarningKind) -> usize {
    out.warnings.iter().filter(|w| w.kind == kind).count()
}

// ============================================================================
// Invariants over every library combination
// ============================================================================

#[test]
fn test_limits_hold_for_every_combination() {
    let lib = default_library();
    let policy = Policy::default();

    for material in &lib.materials {
        for machine in &lib.machines {
            for spindle in &lib.spindles {
                for tool in &lib.tools {
                    for cut in CUTS {
                        let req =
                            Inputs::new(&material.id, &machine.id, &spindle.id, &tool.id, cut);
                        let out = calculate(&lib, &req, &policy).unwrap_or_else(|e| {
                            panic!(
                                "{} {} {} {} {}: {}",
                                material.id, machine.id, spindle.id, tool.id, cut, e
                            )
                        });

                        let rpm = out.rpm as f64;
                        assert!(rpm >= spindle.rpm_min && rpm <= spindle.rpm_max);
                        assert!(out.feed_mm_min as f64 <= machine.axis_max_feed_mm_min);

                        let frac = material.max_engagement_fraction;
                        let max_width = frac * out.effective_diameter;
                        let max_depth = frac * tool.diameter_mm;
                        assert!(out.ae_mm <= max_width + 0.011, "ae {}", out.ae_mm);
                        assert!(out.ap_mm <= max_depth + 0.011, "ap {}", out.ap_mm);

                        assert!(out.power_w <= out.power_available_w + 1.0);
                        assert_eq!(out.power_limited, count(&out, WarningKind::PowerLimited) == 1);
                        assert!(out.fz_mm > 0.0);
                        assert!(out.deflection_mm >= 0.0);
                    }
                }
            }
        }
    }
}

#[test]
fn test_results_are_deterministic() {
    let lib = default_library();
    let req = Inputs::new("steel_1018", "hobby_router", "router_2_2kw", "em_12_4fl", CutType::Slot);
    let a = calculate(&lib, &req, &Policy::default()).unwrap();
    let b = calculate(&lib, &req, &Policy::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_chipload_range_exact_at_tabulated_diameters() {
    let lib = default_library();
    let aluminum = lib.find_material("aluminum_6061").unwrap();
    assert_eq!(chipload_range(aluminum, 6.0).unwrap(), [0.04, 0.08]);
    assert_eq!(chipload_range(aluminum, 12.0).unwrap(), [0.08, 0.14]);
    // clamped past the table ends
    assert_eq!(chipload_range(aluminum, 0.5).unwrap(), [0.005, 0.015]);
    assert_eq!(chipload_range(aluminum, 50.0).unwrap(), [0.10, 0.18]);
}

#[test]
fn test_chip_thinning_monotonic_and_capped() {
    let thinning = ChipThinning {
        enable_below_fraction: 0.5,
        limit_factor: 2.0,
    };
    let mut previous = 0.0;
    for woc in [6.0, 3.0, 2.0, 1.0, 0.5, 0.2, 0.05, 0.01] {
        let factor = chip_thinning_factor(&thinning, 6.0, woc);
        assert!(factor >= previous, "factor dropped at woc {}", woc);
        assert!(factor <= 2.0);
        previous = factor;
    }
    assert_eq!(previous, 2.0);
}

#[test]
fn test_deflection_rises_with_stickout() {
    let base = DeflectionInput {
        force_n: 120.0,
        stickout_mm: 10.0,
        diameter_mm: 8.0,
        core_diameter_mm: 8.0 * 0.55,
        flutes: 2,
        rpm: 0.0,
        tool_material: ToolMaterial::Hss,
        holder_compliance_mm_per_n: 0.002,
        section: SectionBasis::Nominal,
        amplification_bounds: (0.1, 50.0),
    };
    let series = deflection_vs_stickout_series(&base, &[10.0, 20.0, 30.0, 60.0, 90.0]).unwrap();
    for pair in series.windows(2) {
        assert!(pair[1].y > pair[0].y);
    }
}

// ============================================================================
// Worked scenarios
// ============================================================================

#[test]
fn test_quarter_inch_profile_in_aluminum() {
    let out = run(&default_library(), "aluminum_6061", "em_635_3fl", CutType::Profile);
    assert_eq!(out.rpm, 15038);
    assert_eq!(out.vc_m_min, 300);
    assert_eq!(count(&out, WarningKind::RpmLimited), 0);
}

#[test]
fn test_cut_type_scales_surface_speed() {
    let lib = default_library();
    assert_eq!(run(&lib, "aluminum_6061", "em_635_3fl", CutType::Slot).vc_m_min, 240);
    assert_eq!(run(&lib, "aluminum_6061", "em_635_3fl", CutType::Adaptive).vc_m_min, 360);
}

#[test]
fn test_small_tool_clamped_to_spindle_max() {
    let mut lib = default_library();
    lib.tools.push(Tool {
        id: "em_1_2fl".to_string(),
        name: "1mm 2-Flute".to_string(),
        tool_type: ToolType::EndmillFlat,
        diameter_mm: 1.0,
        flutes: 2,
        coating: Coating::None,
        stickout_mm: 4.0,
        material: ToolMaterial::Carbide,
        default_doc_mm: 0.5,
        default_woc_mm: 0.25,
        core_diameter_mm: None,
        tip_angle_deg: None,
        tip_diameter_mm: None,
    });
    let spindle = lib.find_spindle("vmc_24k").unwrap();
    let material = lib.find_material("aluminum_6061").unwrap();

    let speed = compute_speed(material, spindle, CutType::Adaptive, 1.0, 2.0).unwrap();
    assert_eq!(speed.vc_target_m_min, 720.0);
    assert!((speed.rpm_theoretical - 229_183.0).abs() < 1.0);
    assert_eq!(speed.rpm_actual, 24_000.0);
    assert!((speed.vc_actual_m_min - 75.398).abs() < 1e-3);
    assert_eq!(speed.warnings.len(), 1);

    let req = Inputs {
        aggressiveness: 2.0,
        ..Inputs::new("aluminum_6061", "vmc_small", "vmc_24k", "em_1_2fl", CutType::Adaptive)
    };
    let out = calculate(&lib, &req, &Policy::default()).unwrap();
    assert_eq!(out.rpm, 24_000);
    assert_eq!(out.vc_m_min, 75);
    assert_eq!(count(&out, WarningKind::RpmLimited), 1);
}

#[test]
fn test_drill_width_override_respected() {
    let lib = default_library();
    let base = Inputs::new("steel_1018", "vmc_small", "vmc_24k", "dr_8_hss", CutType::Drilling);

    let default_width = calculate(&lib, &base, &Policy::default()).unwrap();
    assert_eq!(default_width.ae_mm, 6.0);
    assert_eq!(count(&default_width, WarningKind::WocLimited), 1);

    let narrow = Inputs {
        user_woc_mm: Some(1.0),
        ..base
    };
    let out = calculate(&lib, &narrow, &Policy::default()).unwrap();
    assert_eq!(out.ae_mm, 1.0);
    assert_eq!(count(&out, WarningKind::WocLimited), 0);
    assert!(out.force_n < default_width.force_n);
}

#[test]
fn test_coated_tool_feed_limited() {
    let lib = default_library();
    let material = Material {
        fz_mm_per_tooth_by_diameter: ChiploadTable::new([(6.0, [0.08, 0.12])]),
        ..lib.find_material("aluminum_6061").unwrap().clone()
    };
    let machine = Machine {
        id: "slow".to_string(),
        name: String::new(),
        axis_max_feed_mm_min: 2000.0,
        rigidity_factor: 1.0,
        aggressiveness: MachineAggressiveness::default(),
    };
    let tool = lib.find_tool("em_6_3fl_altin").unwrap();

    let chip = compute_chipload(
        &material,
        &machine,
        tool,
        &ChiploadRequest {
            diameter_mm: 6.0,
            flutes: 3,
            rpm: 8000.0,
            width_of_cut_mm: 6.0,
            aggressiveness: 1.0,
        },
        &Policy::default(),
    )
    .unwrap();

    assert!((chip.fz_base_mm - 0.12).abs() < 1e-12);
    assert_eq!(chip.feed_actual_mm_min, 2000.0);
    assert!((chip.fz_adjusted_mm - 0.0833).abs() < 1e-4);
    let feed_limited: Vec<_> = chip
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::FeedLimited)
        .collect();
    assert_eq!(feed_limited.len(), 1);
}

#[test]
fn test_loaded_6mm_endmill_deflects_past_threshold() {
    let policy = Policy::default();
    let result = compute_deflection(&DeflectionInput {
        force_n: 300.0,
        stickout_mm: 20.0,
        diameter_mm: 6.0,
        core_diameter_mm: 3.6,
        flutes: 3,
        rpm: 10_000.0,
        tool_material: ToolMaterial::Carbide,
        holder_compliance_mm_per_n: policy.holder_compliance_mm_per_n,
        section: SectionBasis::Nominal,
        amplification_bounds: (policy.amplification_min, policy.amplification_max),
    })
    .unwrap();

    assert!(result.total_mm > 0.02 && result.total_mm < 2.0);
    let warning = assess_deflection(
        result.total_mm,
        policy.deflection_warning_mm,
        policy.deflection_danger_mm,
    )
    .unwrap();
    assert!(matches!(
        warning.kind,
        WarningKind::DeflectionWarning | WarningKind::DeflectionDanger
    ));
}

// ============================================================================
// Errors, configuration and caching
// ============================================================================

#[test]
fn test_unknown_references_fail_outright() {
    let lib = default_library();
    let req = Inputs::new("aluminum_6061", "vmc_small", "vmc_24k", "missing", CutType::Slot);
    assert_eq!(
        calculate(&lib, &req, &Policy::default()).unwrap_err(),
        CalcError::Validation(ValidationError::ToolNotFound("missing".to_string()))
    );
}

#[test]
fn test_policy_file_changes_advisories() {
    let lib = default_library();
    let req = Inputs {
        override_stickout_mm: Some(30.0),
        ..Inputs::new("aluminum_6061", "vmc_small", "vmc_24k", "em_635_3fl", CutType::Profile)
    };

    let relaxed = calculate(&lib, &req, &Policy::default()).unwrap();
    assert_eq!(count(&relaxed, WarningKind::StickoutRatio), 0);

    let strict = Policy::from_json_str(r#"{ "stickout_warning_ratio": 4.0 }"#).unwrap();
    let out = calculate(&lib, &req, &strict).unwrap();
    assert_eq!(count(&out, WarningKind::StickoutRatio), 1);
}

#[test]
fn test_library_json_round_trip_through_file() {
    let lib = default_library();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    std::fs::write(&path, lib.to_json_pretty().unwrap()).unwrap();

    let loaded = Library::from_file(&path).unwrap();
    assert_eq!(loaded, lib);
}

#[test]
fn test_chart_cache_serves_repeat_requests() {
    let lib = default_library();
    let spindle = lib.find_spindle("router_2_2kw").unwrap();
    let mut cache = ChartCache::new();

    let first = cache.power_curve(spindle, 25).unwrap();
    let second = cache.power_curve(spindle, 25).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
    assert!(first.iter().all(|p| p.y > 0.0));
}

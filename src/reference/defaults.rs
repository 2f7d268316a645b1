//! Built-in starter library with common shop materials, two machine classes
//! and a handful of metric tools.

use super::Library;

const DEFAULT_LIBRARY_JSON: &str = r#"{
    "materials": [
        {
            "id": "aluminum_6061",
            "name": "Aluminum 6061-T6",
            "category": "aluminum",
            "vc_range_m_min": [200.0, 400.0],
            "fz_mm_per_tooth_by_diameter": {
                "1": [0.005, 0.015],
                "3": [0.02, 0.04],
                "6": [0.04, 0.08],
                "10": [0.06, 0.12],
                "12": [0.08, 0.14],
                "20": [0.10, 0.18]
            },
            "force_coeff_kn_mm2": 0.7,
            "specific_cutting_energy_j_mm3": 0.7,
            "chip_thinning": { "enable_below_fraction": 0.5, "limit_factor": 2.0 },
            "max_engagement_fraction": 1.0
        },
        {
            "id": "steel_1018",
            "name": "Mild Steel 1018",
            "category": "steel",
            "vc_range_m_min": [80.0, 150.0],
            "fz_mm_per_tooth_by_diameter": {
                "3": [0.015, 0.03],
                "6": [0.03, 0.06],
                "10": [0.05, 0.09],
                "12": [0.06, 0.10],
                "20": [0.08, 0.14]
            },
            "force_coeff_kn_mm2": 2.0,
            "specific_cutting_energy_j_mm3": 2.2,
            "chip_thinning": { "enable_below_fraction": 0.5, "limit_factor": 1.8 },
            "max_engagement_fraction": 0.75
        },
        {
            "id": "stainless_304",
            "name": "Stainless 304",
            "category": "stainless",
            "vc_range_m_min": [60.0, 120.0],
            "fz_mm_per_tooth_by_diameter": {
                "3": [0.01, 0.025],
                "6": [0.025, 0.05],
                "10": [0.04, 0.07],
                "12": [0.05, 0.08]
            },
            "force_coeff_kn_mm2": 2.5,
            "specific_cutting_energy_j_mm3": 2.8,
            "chip_thinning": { "enable_below_fraction": 0.5, "limit_factor": 1.6 },
            "max_engagement_fraction": 0.5
        }
    ],
    "machines": [
        {
            "id": "hobby_router",
            "name": "Gantry Router",
            "axis_max_feed_mm_min": 5000.0,
            "rigidity_factor": 0.6,
            "aggressiveness": { "axial": 0.8, "radial": 0.8, "feed": 0.9 }
        },
        {
            "id": "vmc_small",
            "name": "Small VMC",
            "axis_max_feed_mm_min": 12000.0,
            "rigidity_factor": 1.0,
            "aggressiveness": { "axial": 1.0, "radial": 1.0, "feed": 1.0 }
        }
    ],
    "spindles": [
        {
            "id": "router_2_2kw",
            "name": "2.2 kW Air-Cooled Router Spindle",
            "rated_power_kw": 2.2,
            "rpm_min": 6000.0,
            "rpm_max": 24000.0,
            "base_rpm": 18000.0,
            "power_curve": [
                { "rpm": 6000.0, "power_kw": 0.8 },
                { "rpm": 12000.0, "power_kw": 1.6 },
                { "rpm": 18000.0, "power_kw": 2.2 },
                { "rpm": 24000.0, "power_kw": 2.2 }
            ]
        },
        {
            "id": "vmc_24k",
            "name": "24k Motor Spindle",
            "rated_power_kw": 5.5,
            "rpm_min": 100.0,
            "rpm_max": 24000.0,
            "base_rpm": 3000.0,
            "power_curve": [
                { "rpm": 100.0, "power_kw": 0.4 },
                { "rpm": 3000.0, "power_kw": 5.5 },
                { "rpm": 24000.0, "power_kw": 5.5 }
            ]
        }
    ],
    "tools": [
        {
            "id": "em_635_3fl",
            "name": "1/4\" 3-Flute End Mill",
            "type": "endmill_flat",
            "diameter_mm": 6.35,
            "flutes": 3,
            "coating": "none",
            "stickout_mm": 20.0,
            "material": "carbide",
            "default_doc_mm": 6.0,
            "default_woc_mm": 1.5
        },
        {
            "id": "em_6_3fl_altin",
            "name": "6mm 3-Flute End Mill AlTiN",
            "type": "endmill_flat",
            "diameter_mm": 6.0,
            "flutes": 3,
            "coating": "AlTiN",
            "stickout_mm": 20.0,
            "material": "carbide",
            "default_doc_mm": 6.0,
            "default_woc_mm": 1.5
        },
        {
            "id": "em_3_2fl",
            "name": "3mm 2-Flute End Mill",
            "type": "endmill_flat",
            "diameter_mm": 3.0,
            "flutes": 2,
            "coating": "none",
            "stickout_mm": 12.0,
            "material": "carbide",
            "default_doc_mm": 3.0,
            "default_woc_mm": 0.75
        },
        {
            "id": "em_12_4fl",
            "name": "12mm 4-Flute End Mill TiAlN",
            "type": "endmill_flat",
            "diameter_mm": 12.0,
            "flutes": 4,
            "coating": "TiAlN",
            "stickout_mm": 40.0,
            "material": "carbide",
            "default_doc_mm": 12.0,
            "default_woc_mm": 3.0
        },
        {
            "id": "dr_8_hss",
            "name": "8mm HSS Jobber Drill",
            "type": "drill",
            "diameter_mm": 8.0,
            "flutes": 2,
            "coating": "TiN",
            "stickout_mm": 50.0,
            "material": "hss",
            "default_doc_mm": 8.0,
            "default_woc_mm": 8.0
        },
        {
            "id": "vbit_60",
            "name": "60deg V-Bit",
            "type": "vbit",
            "diameter_mm": 12.7,
            "flutes": 2,
            "coating": "none",
            "stickout_mm": 20.0,
            "material": "carbide",
            "default_doc_mm": 1.0,
            "default_woc_mm": 1.0,
            "tip_angle_deg": 60.0,
            "tip_diameter_mm": 0.2
        },
        {
            "id": "fm_50_5fl",
            "name": "50mm Face Mill",
            "type": "facemill",
            "diameter_mm": 50.0,
            "flutes": 5,
            "coating": "TiAlN",
            "stickout_mm": 40.0,
            "material": "carbide",
            "default_doc_mm": 1.5,
            "default_woc_mm": 35.0
        }
    ]
}"#;

/// Default library shipped with the binary
pub fn default_library() -> Library {
    serde_json::from_str(DEFAULT_LIBRARY_JSON).expect("built-in library is valid JSON")
}

//! Plain-text rendering for terminal output

use miette::{IntoDiagnostic, Result};

use super::ListKind;
use swarf_feeds::calc::optimizer::Candidate;
use swarf_feeds::units::mm_min_to_ipm;
use swarf_feeds::{CalculationOutput, Inputs, Library};

pub fn print_calculation(inputs: &Inputs, out: &CalculationOutput) {
    println!(
        "{} / {} / {} ({})",
        inputs.material_id, inputs.tool_id, inputs.cut_type, out.tool_type
    );
    println!(
        "  Tool        {:.2} mm, {} flutes",
        out.effective_diameter, out.effective_flutes
    );
    println!("  Speed       {} RPM ({} m/min, {} SFM)", out.rpm, out.vc_m_min, out.sfm);
    println!(
        "  Feed        {} mm/min ({:.1} IPM), {:.4} mm/tooth",
        out.feed_mm_min,
        mm_min_to_ipm(out.feed_mm_min as f64),
        out.fz_mm
    );
    let doc_note = if out.user_doc_override { " (user)" } else { "" };
    println!(
        "  Engagement  DOC {:.2} mm{}, WOC {:.2} mm",
        out.ap_mm, doc_note, out.ae_mm
    );
    println!("  MRR         {} mm³/min", out.mrr_mm3_min);
    let limited = if out.power_limited { " (limited)" } else { "" };
    println!(
        "  Power       {} / {} W{}",
        out.power_w, out.power_available_w, limited
    );
    println!("  Force       {:.1} N", out.force_n);
    println!("  Deflection  {:.3} mm", out.deflection_mm);

    if !out.warnings.is_empty() {
        println!();
        for w in &out.warnings {
            println!("  [{}] {}", w.severity, w.message);
        }
    }
}

pub fn print_candidates(target_mm: f64, candidates: &[Candidate]) {
    println!("Target deflection {:.3} mm", target_mm);
    println!(
        "  {:>8}  {:>10}  {:>12}  {:>7}",
        "D (mm)", "L (mm)", "defl (mm)", "error"
    );
    for c in candidates {
        let mark = if c.within_tolerance { "ok" } else { "" };
        println!(
            "  {:>8.2}  {:>10.1}  {:>12.4}  {:>6.1}%  {}",
            c.diameter_mm,
            c.stickout_mm,
            c.deflection_mm,
            c.relative_error * 100.0,
            mark
        );
    }
}

pub fn print_list(library: &Library, kind: ListKind, json: bool) -> Result<()> {
    if json {
        let text = match kind {
            ListKind::Materials => serde_json::to_string_pretty(&library.materials),
            ListKind::Machines => serde_json::to_string_pretty(&library.machines),
            ListKind::Spindles => serde_json::to_string_pretty(&library.spindles),
            ListKind::Tools => serde_json::to_string_pretty(&library.tools),
        }
        .into_diagnostic()?;
        println!("{}", text);
        return Ok(());
    }

    match kind {
        ListKind::Materials => {
            for m in &library.materials {
                println!(
                    "{:<16} {:<24} {:<10} {:>4.0}-{:<4.0} m/min",
                    m.id, m.name, m.category, m.vc_range_m_min[0], m.vc_range_m_min[1]
                );
            }
        }
        ListKind::Machines => {
            for m in &library.machines {
                println!(
                    "{:<16} {:<24} {:>6.0} mm/min  rigidity {:.2}",
                    m.id, m.name, m.axis_max_feed_mm_min, m.rigidity_factor
                );
            }
        }
        ListKind::Spindles => {
            for s in &library.spindles {
                println!(
                    "{:<16} {:<34} {:>4.1} kW  {:.0}-{:.0} RPM",
                    s.id, s.name, s.rated_power_kw, s.rpm_min, s.rpm_max
                );
            }
        }
        ListKind::Tools => {
            for t in &library.tools {
                println!(
                    "{:<16} {:<13} {:>6.2} mm  {} fl  {:<8} {}",
                    t.id,
                    t.tool_type,
                    t.diameter_mm,
                    t.flutes,
                    String::from(t.material.clone()),
                    t.name
                );
            }
        }
    }
    Ok(())
}

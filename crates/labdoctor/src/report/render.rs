//! Text and JSON rendering of a [`Report`].

use std::fmt::Write;

use crate::checks::{CheckId, Finding, FindingKind, Severity};
use crate::state::PROCESSING;

use crate::format;

use super::{Report, Section};

fn tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Informational => "",
        Severity::Anomaly => "[ANOMALY] ",
        Severity::CheckError => "[CHECK ERROR] ",
    }
}

fn write_finding(out: &mut String, finding: &Finding, indent: usize) {
    let pad = " ".repeat(indent);
    let _ = writeln!(out, "{}- {}{}", pad, tag(finding.severity), finding.message);
    for detail in &finding.details {
        let _ = writeln!(out, "{}  {}: {}", pad, detail.label, detail.value);
    }
}

fn write_section(out: &mut String, number: usize, title: &str, section: &Section) {
    let _ = writeln!(out, "\n{}. {}:", number, title);
    if let Some(reason) = &section.skipped {
        let _ = writeln!(out, "  Skipped: {}", reason);
        return;
    }
    for finding in &section.findings {
        write_finding(out, finding, 2);
    }
}

fn write_stuck_section(out: &mut String, section: &Section) {
    let _ = writeln!(out, "\n1. Reports stuck in '{}' status:", PROCESSING);
    let stuck = section
        .findings
        .iter()
        .filter(|f| matches!(f.kind, FindingKind::StuckReport { .. }))
        .count();
    if stuck > 0 {
        let _ = writeln!(out, "Found {} reports stuck in '{}' status:", stuck, PROCESSING);
    }
    for finding in &section.findings {
        if finding.check == CheckId::StorageCrossCheck {
            write_finding(out, finding, 4);
        } else {
            if matches!(finding.kind, FindingKind::StuckReport { .. })
                && !out.ends_with(":\n")
            {
                out.push('\n');
            }
            write_finding(out, finding, 2);
        }
    }
}

/// Renders the report as plain text in fixed section order.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Diagnosing PDF Extraction and Lab Report Processing ==="
    );
    let _ = writeln!(
        out,
        "Snapshot taken at {} UTC",
        format::timestamp(Some(report.generated_at))
    );

    write_stuck_section(&mut out, &report.stuck);
    write_section(&mut out, 2, "Derived biomarker data for stuck reports", &report.derived);
    write_section(&mut out, 3, "Distribution of report statuses", &report.distribution);
    write_section(&mut out, 4, "Processing time statistics", &report.durations);
    write_section(&mut out, 5, "Recently completed reports", &report.recent);
    write_section(&mut out, 6, "Requested report ids", &report.lookups);

    let _ = writeln!(out, "\n=== DIAGNOSIS ===");
    for (i, item) in report.diagnosis.items.iter().enumerate() {
        let _ = writeln!(out, "{}. {}{}", i + 1, tag(item.severity), item.headline);
        if let Some(detail) = &item.detail {
            let _ = writeln!(out, "   {}", detail);
        }
    }
    if report.diagnosis.items.is_empty() {
        let _ = writeln!(out, "Nothing to report.");
    }

    out
}

/// Renders the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

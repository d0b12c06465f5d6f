use std::fmt::{self, Write};

use super::Report;
use crate::aggregate::{
    AggregatedSummary, ComponentRow, LocationSummary, TargetCount, HTML_LOCATION_LIMIT,
};
use crate::policy::PolicyOutcome;

const STYLE: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; color: #333; }
        .container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); overflow: hidden; }
        .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; text-align: center; }
        .header h1 { margin: 0; font-size: 2.5em; font-weight: 300; }
        .header p { margin: 10px 0 0 0; opacity: 0.9; font-size: 1.1em; }
        .stats { display: flex; justify-content: space-around; padding: 20px; background: #f8f9fa; border-bottom: 1px solid #e9ecef; }
        .stat-item { text-align: center; }
        .stat-number { font-size: 2em; font-weight: bold; color: #667eea; }
        .stat-label { color: #666; font-size: 0.9em; margin-top: 5px; }
        .table-container { padding: 20px; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th { background: #667eea; color: white; padding: 15px; text-align: left; font-weight: 600; }
        td { padding: 12px 15px; border-bottom: 1px solid #e9ecef; }
        tr:hover { background-color: #f8f9fa; }
        .breakdown { display: flex; gap: 20px; margin-bottom: 20px; flex-wrap: wrap; }
        .breakdown-item { background: #f8f9fa; padding: 15px; border-radius: 8px; text-align: center; min-width: 120px; }
        .breakdown-count { font-size: 1.5em; font-weight: bold; color: #667eea; }
        .breakdown-label { color: #666; font-size: 0.9em; }
        .type-badge { display: inline-block; padding: 4px 8px; border-radius: 12px; font-size: 0.8em; font-weight: 600; text-transform: uppercase; }
        .type-ml-model { background: #e3f2fd; color: #1976d2; }
        .type-dataset { background: #f3e5f5; color: #7b1fa2; }
        .type-library { background: #e8f5e8; color: #388e3c; }
        .type-application { background: #fff3e0; color: #f57c00; }
        .locations { font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', monospace; font-size: 0.9em; color: #666; max-width: 300px; word-break: break-all; }
        .policy { margin: 20px; padding: 20px; border-radius: 8px; }
        .policy-pass { background: #e8f5e8; color: #2e7d32; }
        .policy-fail { background: #fdecea; color: #c62828; }
        .policy-skip { background: #f8f9fa; color: #666; }
        .repositories ul { columns: 2; list-style: none; padding: 0; }
        .repositories li { padding: 6px 0; border-bottom: 1px solid #e9ecef; }
        .repo-count { color: #667eea; font-weight: 600; margin-left: 8px; }
        .no-data { text-align: center; padding: 60px 20px; color: #666; }
        .no-data h2 { color: #999; margin-bottom: 10px; }
        .footer { padding: 20px; text-align: center; color: #666; border-top: 1px solid #e9ecef; background: #f8f9fa; }
"#;

/// Render a self-contained HTML document; no external assets are referenced.
pub fn render_html(report: &Report<'_>, generated_at: &str) -> anyhow::Result<String> {
    let summary = report.summary;
    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "    <meta charset=\"UTF-8\">")?;
    writeln!(
        out,
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    )?;
    writeln!(out, "    <title>AI Bill of Materials Report</title>")?;
    writeln!(out, "    <style>{STYLE}    </style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<div class=\"container\">")?;
    writeln!(out, "    <div class=\"header\">")?;
    writeln!(out, "        <h1>🤖 AI Bill of Materials Report</h1>")?;
    writeln!(
        out,
        "        <p>Comprehensive analysis of AI components across all targets</p>"
    )?;
    writeln!(out, "    </div>")?;

    write_header_stats(&mut out, summary)?;
    if let Some(outcome) = report.policy {
        write_policy_panel(&mut out, outcome)?;
    }

    writeln!(out, "    <div class=\"table-container\">")?;
    write_type_breakdown(&mut out, summary)?;
    write_components_table(&mut out, &summary.rows)?;
    writeln!(out, "    </div>")?;

    write_repository_list(&mut out, &summary.target_counts)?;

    writeln!(out, "    <div class=\"footer\">")?;
    writeln!(
        out,
        "        <p>Generated by aibom-tools • {}</p>",
        escape_html(generated_at)
    )?;
    writeln!(out, "    </div>")?;
    writeln!(out, "</div>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

fn write_header_stats(out: &mut String, summary: &AggregatedSummary) -> fmt::Result {
    writeln!(out, "    <div class=\"stats\">")?;
    for (value, label) in [
        (summary.total_component_count, "Total AI Components"),
        (summary.target_count(), "Targets Scanned"),
        (summary.distinct_type_count(), "Component Types"),
    ] {
        writeln!(
            out,
            "        <div class=\"stat-item\"><div class=\"stat-number\">{value}</div><div class=\"stat-label\">{label}</div></div>"
        )?;
    }
    writeln!(out, "    </div>")
}

fn write_policy_panel(out: &mut String, outcome: &PolicyOutcome) -> fmt::Result {
    if outcome.was_skipped() {
        return writeln!(
            out,
            "    <div class=\"policy policy-skip\"><h3>🛡️ Model Policy</h3><p>The policy lists no rejected models; nothing was checked.</p></div>"
        );
    }
    if outcome.is_compliant() {
        return writeln!(
            out,
            "    <div class=\"policy policy-pass\"><h3>🛡️ Model Policy</h3><p>✅ All ML models comply with the policy ({} rejected model(s) checked).</p></div>",
            outcome.rejected_models
        );
    }

    writeln!(out, "    <div class=\"policy policy-fail\">")?;
    writeln!(out, "        <h3>🛡️ Model Policy</h3>")?;
    writeln!(
        out,
        "        <p>❌ {} policy violation(s) found.</p>",
        outcome.violations.len()
    )?;
    writeln!(
        out,
        "        <table><thead><tr><th>Model</th><th>Target Name</th><th>Locations</th></tr></thead><tbody>"
    )?;
    for violation in &outcome.violations {
        writeln!(
            out,
            "            <tr><td><strong>{}</strong></td><td>{}</td><td class=\"locations\">{}</td></tr>",
            escape_html(&violation.model_name),
            escape_html(&violation.target_name),
            escape_html(&violation.locations.inline_text())
        )?;
    }
    writeln!(out, "        </tbody></table>")?;
    writeln!(out, "    </div>")
}

fn write_type_breakdown(out: &mut String, summary: &AggregatedSummary) -> fmt::Result {
    let breakdown = summary.breakdown();
    if breakdown.is_empty() {
        return Ok(());
    }
    writeln!(out, "        <h3>📊 Component Types Breakdown</h3>")?;
    writeln!(out, "        <div class=\"breakdown\">")?;
    for entry in &breakdown {
        writeln!(
            out,
            "            <div class=\"breakdown-item\"><div class=\"breakdown-count\">{}</div><div class=\"breakdown-label\">{}</div></div>",
            entry.count,
            escape_html(&entry.display())
        )?;
    }
    writeln!(out, "        </div>")
}

fn write_components_table(out: &mut String, rows: &[ComponentRow]) -> fmt::Result {
    if rows.is_empty() {
        return write_no_data(out);
    }
    writeln!(out, "        <h3>🔍 AI Components Details</h3>")?;
    writeln!(out, "        <table>")?;
    writeln!(
        out,
        "            <thead><tr><th>AI Component</th><th>Target Name</th><th>Type</th><th>Locations</th></tr></thead>"
    )?;
    writeln!(out, "            <tbody>")?;
    for row in rows {
        let component = &row.component;
        let locations = LocationSummary::for_component(component, HTML_LOCATION_LIMIT);
        writeln!(
            out,
            "                <tr><td><strong>{}</strong></td><td>{}</td><td><span class=\"type-badge {}\">{}</span></td><td class=\"locations\">{}</td></tr>",
            escape_html(component.name()),
            escape_html(&row.target_name),
            component.canonical_type().badge_class(),
            escape_html(&component.type_label()),
            escape_html(&locations.inline_text())
        )?;
    }
    writeln!(out, "            </tbody>")?;
    writeln!(out, "        </table>")
}

fn write_no_data(out: &mut String) -> fmt::Result {
    writeln!(out, "        <div class=\"no-data\">")?;
    writeln!(out, "            <h2>⚠️ No AI Components Found</h2>")?;
    writeln!(
        out,
        "            <p>No AI components were detected in any of the scanned targets.</p>"
    )?;
    writeln!(out, "        </div>")
}

fn write_repository_list(out: &mut String, targets: &[TargetCount]) -> fmt::Result {
    writeln!(out, "    <div class=\"table-container repositories\">")?;
    writeln!(out, "        <h3>📁 Scanned Repositories ({})</h3>", targets.len())?;
    if targets.is_empty() {
        writeln!(out, "        <p>No repositories were scanned.</p>")?;
        return writeln!(out, "    </div>");
    }
    let mut sorted: Vec<&TargetCount> = targets.iter().collect();
    sorted.sort_by_key(|target| target.target_name.to_lowercase());
    writeln!(out, "        <ul>")?;
    for target in sorted {
        writeln!(
            out,
            "            <li>{}<span class=\"repo-count\">{}</span></li>",
            escape_html(&target.target_name),
            target.component_count
        )?;
    }
    writeln!(out, "        </ul>")?;
    writeln!(out, "    </div>")
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

use std::fmt::Write;

use colored::{ColoredString, Colorize};

use super::Report;
use crate::aggregate::{
    AggregatedSummary, BreakdownEntry, LocationSummary, CONSOLE_LOCATION_LIMIT,
};
use crate::policy::PolicyOutcome;

const HEADERS: [&str; 4] = ["AI Component", "Target Name", "Type", "Locations"];
const VIOLATION_HEADERS: [&str; 3] = ["Model", "Target Name", "Locations"];

type Style = fn(ColoredString) -> ColoredString;

#[derive(Clone, Copy)]
struct Palette {
    color: bool,
}

impl Palette {
    fn paint(self, text: &str, style: Style) -> String {
        if self.color {
            style(text.normal()).to_string()
        } else {
            text.to_string()
        }
    }
}

const NO_PAYLOADS: &str = "⚠️  No AI components found in any targets.";

/// Render the summary table, per-type breakdown and policy section for a terminal.
///
/// When no target produced a payload the summary collapses to a single warning line;
/// the policy section is still printed.
pub fn render_console(report: &Report<'_>, color: bool) -> anyhow::Result<String> {
    let palette = Palette { color };
    let mut out = String::new();

    if report.targets.is_empty() {
        writeln!(out, "{}", palette.paint(NO_PAYLOADS, |s| s.yellow()))?;
    } else {
        write_summary(&mut out, report.summary, palette)?;
    }

    if let Some(outcome) = report.policy {
        writeln!(out)?;
        write_policy(&mut out, outcome, palette)?;
    }
    Ok(out)
}

fn write_summary(
    out: &mut String,
    summary: &AggregatedSummary,
    palette: Palette,
) -> std::fmt::Result {
    writeln!(
        out,
        "{}",
        palette.paint("🤖 AI Components Summary - All Targets 🎯", |s| s
            .bold()
            .green())
    )?;
    writeln!(out)?;
    write_component_table(out, summary, palette)?;

    writeln!(out)?;
    writeln!(
        out,
        "{}",
        palette.paint(
            &format!(
                "📈 Total AI Components Found: {}",
                summary.total_component_count
            ),
            |s| s.bold().green()
        )
    )?;
    write_breakdown(out, summary, palette)
}

fn write_component_table(
    out: &mut String,
    summary: &AggregatedSummary,
    palette: Palette,
) -> std::fmt::Result {
    let rows: Vec<[String; 4]> = summary
        .rows
        .iter()
        .map(|row| {
            [
                row.component.name().to_string(),
                row.target_name.clone(),
                row.component.type_label(),
                LocationSummary::for_component(&row.component, CONSOLE_LOCATION_LIMIT)
                    .console_text(),
            ]
        })
        .collect();
    let styles: [Style; 4] = [|s| s.cyan(), |s| s.yellow(), |s| s.blue(), |s| s.dimmed()];
    write_table(out, &HEADERS, &rows, styles, palette)?;
    if rows.is_empty() {
        writeln!(out, "  No AI components match the selected types.")?;
    }
    Ok(())
}

fn write_breakdown(
    out: &mut String,
    summary: &AggregatedSummary,
    palette: Palette,
) -> std::fmt::Result {
    let breakdown = summary.breakdown();
    if breakdown.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        palette.paint("📊 Component Types Breakdown:", |s| s.bold().cyan())
    )?;
    let labels: Vec<_> = breakdown.iter().map(BreakdownEntry::display).collect();
    let width = labels
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once("Type".len()))
        .max()
        .unwrap_or_default();
    writeln!(
        out,
        "  {}  {}",
        palette.paint(&format!("{:<width$}", "Type"), |s| s.bold().blue()),
        palette.paint("Count", |s| s.bold().blue())
    )?;
    for (label, entry) in labels.iter().zip(&breakdown) {
        writeln!(
            out,
            "  {}  {}",
            palette.paint(&format!("{label:<width$}"), |s| s.cyan()),
            palette.paint(&format!("{:>5}", entry.count), |s| s.green())
        )?;
    }
    Ok(())
}

fn write_policy(out: &mut String, outcome: &PolicyOutcome, palette: Palette) -> std::fmt::Result {
    writeln!(
        out,
        "{}",
        palette.paint("🛡️  Model Policy Check:", |s| s.bold().cyan())
    )?;
    if outcome.was_skipped() {
        writeln!(out, "  Policy lists no rejected models; check skipped.")?;
        return Ok(());
    }
    if outcome.is_compliant() {
        writeln!(
            out,
            "{}",
            palette.paint(
                &format!(
                    "  ✅ All ML models comply with the policy ({} rejected model(s) checked).",
                    outcome.rejected_models
                ),
                |s| s.bold().green()
            )
        )?;
        return Ok(());
    }
    writeln!(
        out,
        "{}",
        palette.paint(
            &format!(
                "  ❌ {} policy violation(s) found:",
                outcome.violations.len()
            ),
            |s| s.bold().red()
        )
    )?;
    let rows: Vec<[String; 3]> = outcome
        .violations
        .iter()
        .map(|violation| {
            [
                violation.model_name.clone(),
                violation.target_name.clone(),
                violation.locations.console_text(),
            ]
        })
        .collect();
    let styles: [Style; 3] = [|s| s.red(), |s| s.yellow(), |s| s.dimmed()];
    write_table(out, &VIOLATION_HEADERS, &rows, styles, palette)
}

/// Left-aligned columns; cells may span several lines, continuation lines are
/// padded under their own column.
fn write_table<const N: usize>(
    out: &mut String,
    headers: &[&str; N],
    rows: &[[String; N]],
    styles: [Style; N],
    palette: Palette,
) -> std::fmt::Result {
    let mut widths = [0usize; N];
    for (width, header) in widths.iter_mut().zip(headers) {
        *width = header.chars().count();
    }
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            let cell_width = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
            *width = (*width).max(cell_width);
        }
    }

    let header_cells: Vec<String> = headers
        .iter()
        .zip(widths)
        .map(|(header, width)| palette.paint(&format!("{header:<width$}"), |s| s.bold().magenta()))
        .collect();
    writeln!(out, "  {}", header_cells.join("  ").trim_end())?;
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    writeln!(out, "  {}", rule.join("  "))?;

    for row in rows {
        let cell_lines: Vec<Vec<&str>> = row.iter().map(|cell| cell.lines().collect()).collect();
        let height = cell_lines.iter().map(Vec::len).max().unwrap_or(1).max(1);
        for line_idx in 0..height {
            let mut line = String::new();
            for (col, lines) in cell_lines.iter().enumerate() {
                let text = lines.get(line_idx).copied().unwrap_or("");
                let width = widths[col];
                if col > 0 {
                    line.push_str("  ");
                }
                line.push_str(&palette.paint(&format!("{text:<width$}"), styles[col]));
            }
            writeln!(out, "  {}", line.trim_end())?;
        }
    }
    Ok(())
}

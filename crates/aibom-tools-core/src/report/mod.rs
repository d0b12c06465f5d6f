//! Console, JSON and HTML renderings of one aggregation pass.
//!
//! Console and HTML render the filtered [`AggregatedSummary`]; the JSON export is a
//! pass-through of the raw payloads and ignores filters and policy.

use std::time::SystemTime;

use crate::aggregate::AggregatedSummary;
use crate::bom::TargetAggregate;
use crate::policy::PolicyOutcome;

pub mod console;
pub mod html;
pub mod json;

/// Format styles supported by [`render_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
    Html,
}

/// Inputs shared by every rendering.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Raw scanned targets, used by the JSON export.
    pub targets: &'a [TargetAggregate],
    pub summary: &'a AggregatedSummary,
    /// `None` when no policy was supplied.
    pub policy: Option<&'a PolicyOutcome>,
}

/// Presentation knobs that do not change report content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit ANSI styling in console output.
    pub color: bool,
    /// Timestamp printed in the HTML footer.
    pub generated_at: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: false,
            generated_at: timestamp_now(),
        }
    }
}

/// Current time as an RFC 3339 string with second precision.
pub fn timestamp_now() -> String {
    humantime::format_rfc3339_seconds(SystemTime::now()).to_string()
}

/// Produce a report string in the requested format.
pub fn render_report(
    report: &Report<'_>,
    format: OutputFormat,
    options: &RenderOptions,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Console => console::render_console(report, options.color),
        OutputFormat::Json => json::render_json(report.targets),
        OutputFormat::Html => html::render_html(report, &options.generated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::bom::ScanResult;
    use crate::policy::RejectionPolicy;
    use crate::taxonomy::normalize_type_filter;
    use serde_json::json;

    fn targets() -> Vec<TargetAggregate> {
        vec![
            TargetAggregate::new(
                "acme/api",
                ScanResult::new(json!({"components": [
                    {"name": "Root", "type": "application"},
                    {"name": "gpt-4", "type": "machine-learning-model"},
                    {"name": "langchain", "type": "library"}
                ]})),
            ),
            TargetAggregate::new(
                "acme/web",
                ScanResult::new(json!({"data": {"attributes": {"components": [
                    {"name": "Root", "type": "application"}
                ]}}})),
            ),
        ]
    }

    fn options() -> RenderOptions {
        RenderOptions {
            color: false,
            generated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn json_output_ignores_filter_and_policy() {
        let targets = targets();
        let unfiltered = aggregate(&targets, None);
        let filter = normalize_type_filter(Some("library")).unwrap();
        let filtered = aggregate(&targets, filter.as_ref());
        let outcome = PolicyOutcome::evaluate(&targets, &RejectionPolicy::from_names(["gpt-4"]));

        let plain = render_report(
            &Report {
                targets: &targets,
                summary: &unfiltered,
                policy: None,
            },
            OutputFormat::Json,
            &options(),
        )
        .unwrap();
        let with_everything = render_report(
            &Report {
                targets: &targets,
                summary: &filtered,
                policy: Some(&outcome),
            },
            OutputFormat::Json,
            &options(),
        )
        .unwrap();
        assert_eq!(plain, with_everything);
    }

    #[test]
    fn filter_changes_console_and_html_output() {
        let targets = targets();
        let unfiltered = aggregate(&targets, None);
        let filter = normalize_type_filter(Some("library")).unwrap();
        let filtered = aggregate(&targets, filter.as_ref());
        for format in [OutputFormat::Console, OutputFormat::Html] {
            let all = render_report(
                &Report {
                    targets: &targets,
                    summary: &unfiltered,
                    policy: None,
                },
                format,
                &options(),
            )
            .unwrap();
            let libraries = render_report(
                &Report {
                    targets: &targets,
                    summary: &filtered,
                    policy: None,
                },
                format,
                &options(),
            )
            .unwrap();
            assert!(all.contains("gpt-4"), "{format:?} should list the model");
            assert!(!libraries.contains("gpt-4"), "{format:?} should hide the model");
            assert!(libraries.contains("langchain"));
        }
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let stamp = timestamp_now();
        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.len(), "2024-01-01T00:00:00Z".len());
    }
}

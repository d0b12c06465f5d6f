use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::bom::{ScanResult, TargetAggregate};

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    all_aibom_data: Vec<JsonEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    target_name: &'a str,
    aibom_data: &'a ScanResult,
}

impl<'a> From<&'a [TargetAggregate]> for JsonExport<'a> {
    fn from(targets: &'a [TargetAggregate]) -> Self {
        Self {
            all_aibom_data: targets
                .iter()
                .map(|target| JsonEntry {
                    target_name: target.target_name(),
                    aibom_data: target.payload(),
                })
                .collect(),
        }
    }
}

/// Archive every raw payload, in scan order, indented with four spaces.
pub fn render_json(targets: &[TargetAggregate]) -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    JsonExport::from(targets).serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}

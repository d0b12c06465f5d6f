use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::taxonomy::{type_label, CanonicalType};

pub const UNKNOWN_COMPONENT: &str = "Unknown Component";
pub const UNKNOWN_TYPE: &str = "unknown";

/// Raw AI-BOM payload returned for one target. Kept verbatim for the JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult(Value);

impl ScanResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ScanResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One `{location, line}` entry from a component's evidence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Occurrence {
    pub location: Option<String>,
    pub line: Option<String>,
}

impl Occurrence {
    fn from_value(value: &Value) -> Self {
        let location = value
            .get("location")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let line = value.get("line").and_then(line_text);
        Self { location, line }
    }

    /// `location:line`, `location`, or `None` when there is no location.
    pub fn display(&self) -> Option<String> {
        let location = self.location.as_deref()?;
        Some(match &self.line {
            Some(line) => format!("{location}:{line}"),
            None => location.to_string(),
        })
    }
}

// Zero, empty strings and non-scalar values count as "no line".
fn line_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// A detected AI component, read through a lenient accessor so partial records still render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    name: Option<String>,
    kind: Option<String>,
    occurrences: Vec<Occurrence>,
}

impl Component {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind.into()),
            occurrences: Vec::new(),
        }
    }

    pub fn with_occurrence(mut self, location: &str, line: Option<u32>) -> Self {
        self.occurrences.push(Occurrence {
            location: Some(location.to_string()),
            line: line.map(|l| l.to_string()),
        });
        self
    }

    /// Build from one entry of a payload's component list; non-objects yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        let occurrences = object
            .get("evidence")
            .and_then(|evidence| evidence.get("occurrences"))
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Occurrence::from_value).collect())
            .unwrap_or_default();
        Some(Self {
            name: text("name"),
            kind: text("type"),
            occurrences,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_COMPONENT)
    }

    pub fn raw_type(&self) -> &str {
        self.kind.as_deref().unwrap_or(UNKNOWN_TYPE)
    }

    pub fn canonical_type(&self) -> CanonicalType {
        CanonicalType::from_internal(self.raw_type())
    }

    pub fn type_label(&self) -> String {
        type_label(self.raw_type())
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Formatted source locations, skipping occurrences without a location.
    pub fn locations(&self) -> Vec<String> {
        self.occurrences
            .iter()
            .filter_map(Occurrence::display)
            .collect()
    }

    /// The placeholder the scanner emits for the target itself.
    pub fn is_synthetic_root(&self) -> bool {
        self.name.as_deref() == Some("Root") && self.kind.as_deref() == Some("application")
    }
}

/// Component list of a payload in either schema shape, synthetic root excluded.
///
/// The legacy `data.attributes.components` path wins whenever a top-level `data`
/// key exists; otherwise `components` is used. Anything malformed yields no components.
pub fn extract_components(scan: &ScanResult) -> Vec<Component> {
    let value = scan.as_value();
    let list = match value.get("data") {
        Some(data) => data
            .get("attributes")
            .and_then(|attributes| attributes.get("components")),
        None => value.get("components"),
    };
    list.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Component::from_value)
                .filter(|component| !component.is_synthetic_root())
                .collect()
        })
        .unwrap_or_default()
}

/// Components of one successfully scanned target together with its raw payload.
///
/// Target names are not unique; every aggregate is a distinct scan instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetAggregate {
    target_name: String,
    payload: ScanResult,
    components: Vec<Component>,
}

impl TargetAggregate {
    pub fn new(target_name: impl Into<String>, payload: ScanResult) -> Self {
        let components = extract_components(&payload);
        Self {
            target_name: target_name.into(),
            payload,
            components,
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn payload(&self) -> &ScanResult {
        &self.payload
    }

    /// Non-root components in payload order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn components_json() -> Value {
        json!([
            {"name": "Root", "type": "application"},
            {
                "name": "gpt-4o",
                "type": "machine-learning-model",
                "evidence": {"occurrences": [
                    {"location": "app/chat.py", "line": 12},
                    {"location": "app/util.py"}
                ]}
            },
            {"name": "openai", "type": "library"}
        ])
    }

    #[test]
    fn both_schema_shapes_yield_the_same_components() {
        let legacy = ScanResult::new(json!({
            "data": {"attributes": {"components": components_json()}}
        }));
        let current = ScanResult::new(json!({"components": components_json()}));

        let from_legacy = extract_components(&legacy);
        let from_current = extract_components(&current);
        assert_eq!(from_legacy, from_current);
        let names: Vec<_> = from_current.iter().map(Component::name).collect();
        assert_eq!(names, vec!["gpt-4o", "openai"]);
    }

    #[test]
    fn data_key_disables_current_shape_fallback() {
        let scan = ScanResult::new(json!({
            "data": {"attributes": {}},
            "components": components_json()
        }));
        assert!(extract_components(&scan).is_empty());
    }

    #[test]
    fn malformed_payloads_yield_no_components() {
        for payload in [
            json!(null),
            json!("text"),
            json!({"components": {"not": "a list"}}),
            json!({"data": "oops"}),
        ] {
            assert!(extract_components(&ScanResult::new(payload)).is_empty());
        }
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let scan = ScanResult::new(json!({"components": [42, {"name": "x", "type": "data"}]}));
        assert_eq!(extract_components(&scan).len(), 1);
    }

    #[test]
    fn missing_fields_use_sentinels() {
        let component = Component::from_value(&json!({})).unwrap();
        assert_eq!(component.name(), UNKNOWN_COMPONENT);
        assert_eq!(component.raw_type(), UNKNOWN_TYPE);
        assert_eq!(component.canonical_type(), CanonicalType::Unknown);
        assert_eq!(component.type_label(), "Unknown");
    }

    #[test]
    fn root_requires_both_name_and_type() {
        assert!(Component::new("Root", "application").is_synthetic_root());
        assert!(!Component::new("Root", "library").is_synthetic_root());
        assert!(!Component::new("root", "application").is_synthetic_root());
    }

    #[test]
    fn locations_format_line_only_when_present() {
        let component = Component::from_value(&json!({
            "name": "m",
            "type": "data",
            "evidence": {"occurrences": [
                {"location": "a.py", "line": 5},
                {"location": "b.py"},
                {"line": 9},
                {"location": "c.py", "line": "7"}
            ]}
        }))
        .unwrap();
        assert_eq!(component.locations(), vec!["a.py:5", "b.py", "c.py:7"]);
    }

    #[test]
    fn aggregate_keeps_payload_verbatim() {
        let payload = json!({"components": components_json(), "extra": true});
        let aggregate = TargetAggregate::new("repo", ScanResult::new(payload.clone()));
        assert_eq!(aggregate.payload().as_value(), &payload);
        assert_eq!(aggregate.components().len(), 2);
    }
}

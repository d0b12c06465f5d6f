use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::aggregate::{LocationSummary, HTML_LOCATION_LIMIT};
use crate::bom::TargetAggregate;
use crate::taxonomy::CanonicalType;

pub mod loader;

/// Normalized (trimmed, lower-case) model names that must not appear in any target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RejectionPolicy {
    rejected: BTreeSet<String>,
}

impl RejectionPolicy {
    pub(crate) fn new(rejected: BTreeSet<String>) -> Self {
        Self { rejected }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| normalize_model_name(name.as_ref()))
                .collect(),
        )
    }

    pub fn is_rejected(&self, model_name: &str) -> bool {
        self.rejected.contains(&normalize_model_name(model_name))
    }

    pub fn is_empty(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rejected.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rejected.iter().map(String::as_str)
    }
}

fn normalize_model_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A rejected model found in a scanned target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyViolation {
    /// Name as reported by the scanner, not normalized.
    pub model_name: String,
    pub target_name: String,
    /// Up to five formatted locations and the number cut, as in the HTML table.
    pub locations: LocationSummary,
}

/// Check every non-root ML model in `targets` against the policy.
///
/// Display filters never apply here. An absent or empty policy skips the check.
#[instrument(name = "evaluate_policy", skip_all, fields(targets = targets.len()))]
pub fn evaluate_policy(
    targets: &[TargetAggregate],
    policy: Option<&RejectionPolicy>,
) -> Vec<PolicyViolation> {
    let Some(policy) = policy.filter(|p| !p.is_empty()) else {
        return Vec::new();
    };

    let violations: Vec<_> = targets
        .iter()
        .flat_map(|target| {
            target
                .components()
                .iter()
                .filter(|component| {
                    component.canonical_type() == CanonicalType::MachineLearningModel
                        && policy.is_rejected(component.name())
                })
                .map(move |component| PolicyViolation {
                    model_name: component.name().to_string(),
                    target_name: target.target_name().to_string(),
                    locations: LocationSummary::for_component(component, HTML_LOCATION_LIMIT),
                })
        })
        .collect();
    debug!(violations = violations.len(), "policy evaluated");
    violations
}

/// What the reports need to know about a policy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub rejected_models: usize,
    pub violations: Vec<PolicyViolation>,
}

impl PolicyOutcome {
    pub fn evaluate(targets: &[TargetAggregate], policy: &RejectionPolicy) -> Self {
        Self {
            rejected_models: policy.len(),
            violations: evaluate_policy(targets, Some(policy)),
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    /// True when the policy names no models, so nothing was checked.
    pub fn was_skipped(&self) -> bool {
        self.rejected_models == 0
    }
}

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::bom::{Component, TargetAggregate};
use crate::taxonomy::{type_label, CanonicalType, TypeFilter};

/// Locations shown per component in the console table.
pub const CONSOLE_LOCATION_LIMIT: usize = 3;
/// Locations shown per component in the HTML report and policy violations.
pub const HTML_LOCATION_LIMIT: usize = 5;
pub const NO_SOURCE_LOCATIONS: &str = "No source locations";

/// A component paired with the target it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRow {
    pub component: Component,
    pub target_name: String,
}

/// Non-root component count for one scanned target, independent of any filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetCount {
    pub target_name: String,
    pub component_count: usize,
}

/// One line of the per-type breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownEntry {
    pub kind: CanonicalType,
    /// Plural label for known types, title-cased raw type otherwise.
    pub label: String,
    pub count: usize,
}

impl BreakdownEntry {
    /// `icon label`, e.g. `🧠 ML Models` or `🔧 Widget`.
    pub fn display(&self) -> String {
        format!("{} {}", self.kind.icon(), self.label)
    }
}

/// Result of folding every target's components through the include filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedSummary {
    pub total_component_count: usize,
    /// Counts per canonical type; unrecognized raw types all land in `Unknown`.
    pub per_type_count: BTreeMap<CanonicalType, usize>,
    /// Counts per raw type string for components mapped to `Unknown`.
    pub unknown_type_count: BTreeMap<String, usize>,
    pub rows: Vec<ComponentRow>,
    pub target_counts: Vec<TargetCount>,
}

impl AggregatedSummary {
    pub fn target_count(&self) -> usize {
        self.target_counts.len()
    }

    /// Known types present plus each distinct unrecognized raw type.
    pub fn distinct_type_count(&self) -> usize {
        self.per_type_count
            .keys()
            .filter(|kind| **kind != CanonicalType::Unknown)
            .count()
            + self.unknown_type_count.len()
    }

    /// Breakdown lines sorted by raw type identifier, so unrecognized types
    /// sit between the known ones alphabetically.
    pub fn breakdown(&self) -> Vec<BreakdownEntry> {
        let known = self
            .per_type_count
            .iter()
            .filter(|(kind, _)| **kind != CanonicalType::Unknown)
            .map(|(kind, count)| {
                (
                    kind.internal_id().to_string(),
                    BreakdownEntry {
                        kind: *kind,
                        label: kind.plural_label().to_string(),
                        count: *count,
                    },
                )
            });
        let unknown = self.unknown_type_count.iter().map(|(raw, count)| {
            (
                raw.clone(),
                BreakdownEntry {
                    kind: CanonicalType::Unknown,
                    label: type_label(raw),
                    count: *count,
                },
            )
        });
        let mut entries: Vec<_> = known.chain(unknown).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, entry)| entry).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fold targets into one summary, preserving target order then component order.
#[instrument(name = "aggregate_components", skip_all, fields(targets = targets.len(), filtered = filter.is_some()))]
pub fn aggregate(targets: &[TargetAggregate], filter: Option<&TypeFilter>) -> AggregatedSummary {
    let summary = targets
        .iter()
        .fold(AggregatedSummary::default(), |mut summary, target| {
            summary.target_counts.push(TargetCount {
                target_name: target.target_name().to_string(),
                component_count: target.components().len(),
            });
            // `components()` already excludes the synthetic root.
            for component in target.components() {
                let kind = component.canonical_type();
                if filter.is_some_and(|f| !f.contains(kind)) {
                    continue;
                }
                *summary.per_type_count.entry(kind).or_insert(0) += 1;
                if kind == CanonicalType::Unknown {
                    *summary
                        .unknown_type_count
                        .entry(component.raw_type().to_string())
                        .or_insert(0) += 1;
                }
                summary.total_component_count += 1;
                summary.rows.push(ComponentRow {
                    component: component.clone(),
                    target_name: target.target_name().to_string(),
                });
            }
            summary
        });
    debug!(
        components = summary.total_component_count,
        types = summary.distinct_type_count(),
        "aggregation completed"
    );
    summary
}

/// The first `limit` formatted locations of a component plus how many were cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationSummary {
    pub shown: Vec<String>,
    pub remaining: usize,
}

impl LocationSummary {
    pub fn new(mut locations: Vec<String>, limit: usize) -> Self {
        let remaining = locations.len().saturating_sub(limit);
        locations.truncate(limit);
        Self {
            shown: locations,
            remaining,
        }
    }

    pub fn for_component(component: &Component, limit: usize) -> Self {
        Self::new(component.locations(), limit)
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    pub fn more_suffix(&self) -> Option<String> {
        (self.remaining > 0).then(|| format!("... and {} more", self.remaining))
    }

    /// Newline-separated console cell.
    pub fn console_text(&self) -> String {
        if self.is_empty() {
            return NO_SOURCE_LOCATIONS.to_string();
        }
        let mut lines = self.shown.clone();
        lines.extend(self.more_suffix());
        lines.join("\n")
    }

    /// Single-line HTML cell, `a; b; c ... and N more`.
    pub fn inline_text(&self) -> String {
        if self.is_empty() {
            return NO_SOURCE_LOCATIONS.to_string();
        }
        let mut text = self.shown.join("; ");
        if let Some(suffix) = self.more_suffix() {
            text.push(' ');
            text.push_str(&suffix);
        }
        text
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigurationError;

/// Closed classification every detected component is normalized to.
///
/// Variant order follows the internal identifiers alphabetically so that
/// ordered maps keyed by this type list breakdowns in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalType {
    Application,
    Data,
    Library,
    MachineLearningModel,
    Unknown,
}

/// User-facing names accepted by the include filter.
const ALIASES: &[(&str, CanonicalType)] = &[
    ("ml model", CanonicalType::MachineLearningModel),
    ("ml models", CanonicalType::MachineLearningModel),
    ("machine learning model", CanonicalType::MachineLearningModel),
    ("machine learning models", CanonicalType::MachineLearningModel),
    ("dataset", CanonicalType::Data),
    ("datasets", CanonicalType::Data),
    ("data", CanonicalType::Data),
    ("library", CanonicalType::Library),
    ("libraries", CanonicalType::Library),
    ("application", CanonicalType::Application),
    ("applications", CanonicalType::Application),
    ("app", CanonicalType::Application),
    ("apps", CanonicalType::Application),
];

impl CanonicalType {
    /// Every variant that can be selected through the include filter.
    pub const FILTERABLE: [CanonicalType; 4] = [
        CanonicalType::MachineLearningModel,
        CanonicalType::Data,
        CanonicalType::Library,
        CanonicalType::Application,
    ];

    /// Map the scanner's internal type tag. Total: unrecognized tags become `Unknown`.
    pub fn from_internal(raw: &str) -> Self {
        match raw {
            "machine-learning-model" => Self::MachineLearningModel,
            "data" => Self::Data,
            "library" => Self::Library,
            "application" => Self::Application,
            _ => Self::Unknown,
        }
    }

    /// Resolve a user-supplied name (alias or internal identifier), case-insensitively.
    pub fn from_user_name(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_lowercase();
        if let Some((_, kind)) = ALIASES.iter().find(|(alias, _)| *alias == needle) {
            return Some(*kind);
        }
        match Self::from_internal(&needle) {
            Self::Unknown => None,
            kind => Some(kind),
        }
    }

    pub fn internal_id(self) -> &'static str {
        match self {
            Self::MachineLearningModel => "machine-learning-model",
            Self::Data => "data",
            Self::Library => "library",
            Self::Application => "application",
            Self::Unknown => "unknown",
        }
    }

    /// Aliases that resolve to this type, in table order.
    pub fn aliases(self) -> Vec<&'static str> {
        ALIASES
            .iter()
            .filter(|(_, kind)| *kind == self)
            .map(|(alias, _)| *alias)
            .collect()
    }

    /// Singular label used in table rows. `None` for `Unknown`, whose label comes from the raw tag.
    fn row_label(self) -> Option<&'static str> {
        match self {
            Self::MachineLearningModel => Some("ML Model"),
            Self::Data => Some("Dataset"),
            Self::Library => Some("Library"),
            Self::Application => Some("Application"),
            Self::Unknown => None,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::MachineLearningModel => "🧠",
            Self::Data => "📊",
            Self::Library => "📚",
            Self::Application | Self::Unknown => "🔧",
        }
    }

    /// Plural label used by the per-type breakdowns.
    pub fn plural_label(self) -> &'static str {
        match self {
            Self::MachineLearningModel => "ML Models",
            Self::Data => "Datasets",
            Self::Library => "Libraries",
            Self::Application => "Applications",
            Self::Unknown => "Other",
        }
    }

    /// CSS class of the HTML type badge.
    pub fn badge_class(self) -> &'static str {
        match self {
            Self::MachineLearningModel => "type-ml-model",
            Self::Data => "type-dataset",
            Self::Library => "type-library",
            Self::Application | Self::Unknown => "type-application",
        }
    }
}

/// Display label for a raw component type tag, e.g. `data` → `Dataset`, `custom-thing` → `Custom-Thing`.
pub fn type_label(raw: &str) -> String {
    CanonicalType::from_internal(raw)
        .row_label()
        .map(str::to_string)
        .unwrap_or_else(|| title_case(raw))
}

fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Non-empty set of canonical types selected by `--include`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilter {
    types: BTreeSet<CanonicalType>,
}

impl TypeFilter {
    pub fn contains(&self, kind: CanonicalType) -> bool {
        self.types.contains(&kind)
    }

    pub fn types(&self) -> impl Iterator<Item = CanonicalType> + '_ {
        self.types.iter().copied()
    }
}

/// Parse a comma-separated include list into a type filter.
///
/// `None` or an empty string means "no filter" and yields `Ok(None)`. Anything else,
/// whitespace included, must name at least one known type. Unrecognized names are
/// logged and dropped; if nothing survives the call fails.
pub fn normalize_type_filter(raw: Option<&str>) -> Result<Option<TypeFilter>, ConfigurationError> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let mut types = BTreeSet::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match CanonicalType::from_user_name(token) {
            Some(kind) => {
                types.insert(kind);
            }
            None => warn!(
                component_type = %token.to_lowercase(),
                "unknown component type will be ignored"
            ),
        }
    }

    if types.is_empty() {
        return Err(ConfigurationError::NoValidComponentTypes);
    }
    Ok(Some(TypeFilter { types }))
}

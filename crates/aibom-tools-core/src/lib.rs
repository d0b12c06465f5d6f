pub mod aggregate;
pub mod bom;
pub mod collect;
pub mod error;
pub mod policy;
pub mod provider;
pub mod report;
pub mod taxonomy;

pub use aggregate::{
    aggregate, AggregatedSummary, BreakdownEntry, ComponentRow, LocationSummary, TargetCount,
};
pub use bom::{extract_components, Component, Occurrence, ScanResult, TargetAggregate};
pub use collect::{collect_scans, ScanBatch, TargetOutcome};
pub use error::{ConfigurationError, PolicyFormatError, TargetRetrievalError};
pub use policy::{
    evaluate_policy,
    loader::{load_policy, load_policy_file},
    PolicyOutcome, PolicyViolation, RejectionPolicy,
};
pub use provider::{file_provider::FileTargetProvider, Target, TargetProvider};
pub use report::{render_report, OutputFormat, RenderOptions, Report};
pub use taxonomy::{normalize_type_filter, CanonicalType, TypeFilter};

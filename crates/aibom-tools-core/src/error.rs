use std::path::PathBuf;

use thiserror::Error;

/// Invalid or missing user input detected before any scanning starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no valid component types specified")]
    NoValidComponentTypes,
    #[error("{setting} is required (pass {flag} or set {env})")]
    MissingSetting {
        setting: &'static str,
        flag: &'static str,
        env: &'static str,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures while reading or validating a model-rejection policy document.
#[derive(Debug, Error)]
pub enum PolicyFormatError {
    #[error("failed to read policy file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("policy document could not be parsed: {0}")]
    Parse(String),
    #[error("policy document must be a mapping with a `reject` key")]
    NotAMapping,
    #[error("policy document is missing the `reject` key")]
    MissingRejectKey,
    #[error("policy `reject` value must be a list of model names")]
    RejectNotAList,
    #[error("policy `reject` entry #{index} must be a string")]
    NonStringEntry { index: usize },
}

/// The collaborator could not produce any targets to scan.
#[derive(Debug, Error)]
pub enum TargetRetrievalError {
    #[error("could not retrieve any targets")]
    NoTargets,
    #[error("failed to list targets")]
    Listing(#[source] anyhow::Error),
}

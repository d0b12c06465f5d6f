use std::{collections::BTreeSet, fs, path::Path};

use serde_yaml::Value;
use tracing::debug;

use super::RejectionPolicy;
use crate::error::PolicyFormatError;

const REJECT_KEY: &str = "reject";

/// Parse a policy document (YAML or JSON) into the set of rejected model names.
///
/// Names are trimmed and lower-cased; duplicates collapse. Keys other than
/// `reject` are ignored.
pub fn load_policy(document: impl AsRef<[u8]>) -> Result<RejectionPolicy, PolicyFormatError> {
    let value: Value = serde_yaml::from_slice(document.as_ref())
        .map_err(|err| PolicyFormatError::Parse(err.to_string()))?;
    let mapping = value.as_mapping().ok_or(PolicyFormatError::NotAMapping)?;
    let entries = mapping
        .get(REJECT_KEY)
        .ok_or(PolicyFormatError::MissingRejectKey)?
        .as_sequence()
        .ok_or(PolicyFormatError::RejectNotAList)?;

    let mut rejected = BTreeSet::new();
    for (index, entry) in entries.iter().enumerate() {
        let name = entry
            .as_str()
            .ok_or(PolicyFormatError::NonStringEntry { index })?;
        rejected.insert(name.trim().to_lowercase());
    }
    debug!(rejected = rejected.len(), "policy loaded");
    Ok(RejectionPolicy::new(rejected))
}

/// Read and parse a policy file. The file is closed before parsing starts.
pub fn load_policy_file(path: &Path) -> Result<RejectionPolicy, PolicyFormatError> {
    let document = fs::read(path).map_err(|source| PolicyFormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_policy(document)
}

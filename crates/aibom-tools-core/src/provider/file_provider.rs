use std::{fs, path::PathBuf};

use anyhow::{ensure, Context, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Target, TargetProvider};
use crate::bom::ScanResult;

/// Serves targets from an inventory directory: `targets.json` plus one `aiboms/<id>.json` per target.
pub struct FileTargetProvider {
    base_path: PathBuf,
    cache: OnceCell<Vec<Target>>,
}

impl FileTargetProvider {
    /// Create a provider rooted at the given inventory directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: OnceCell::new(),
        }
    }

    fn targets_path(&self) -> PathBuf {
        self.base_path.join("targets.json")
    }

    /// `aiboms/<id>.json`; ids that could leave the inventory directory are refused.
    fn aibom_path(&self, target: &Target) -> Result<PathBuf> {
        let id = target.id.as_str();
        ensure!(
            !id.contains(['/', '\\']) && !id.contains(".."),
            "target id {id:?} is not a plain file name"
        );
        Ok(self.base_path.join("aiboms").join(format!("{id}.json")))
    }

    fn load_targets(&self) -> Result<Vec<Target>> {
        let path = self.targets_path();
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read target listing at {}", path.display()))?;
        let listing: TargetListing = serde_json::from_str(&raw).with_context(|| {
            format!("invalid JSON structure in target listing at {}", path.display())
        })?;
        let targets = match listing {
            TargetListing::Bare(targets) => targets,
            TargetListing::Document { data } => data,
        };
        debug!(count = targets.len(), path = %path.display(), "target listing loaded");
        Ok(targets)
    }

    fn read_aibom(&self, target: &Target) -> Result<ScanResult> {
        let path = self.aibom_path(target)?;
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read AI-BOM at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON in AI-BOM at {}", path.display()))
    }
}

#[async_trait::async_trait]
impl TargetProvider for FileTargetProvider {
    async fn list_targets(&self) -> Result<Vec<Target>> {
        let targets = self.cache.get_or_try_init(|| self.load_targets())?;
        Ok(targets.clone())
    }

    async fn scan_target(&self, target: &Target) -> Option<ScanResult> {
        if target.id.is_empty() {
            warn!(target = %target.display_name, "target has no id; cannot locate its AI-BOM");
            return None;
        }
        match self.read_aibom(target) {
            Ok(scan) => Some(scan),
            Err(err) => {
                warn!(target = %target.display_name, error = %format!("{err:#}"), "AI-BOM unavailable");
                None
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetListing {
    Bare(Vec<Target>),
    Document { data: Vec<Target> },
}

use tracing::{debug, info, instrument};

use crate::bom::TargetAggregate;
use crate::error::TargetRetrievalError;
use crate::provider::{Target, TargetProvider};

/// What happened to one listed target during collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Payload retrieved; `components` counts non-root components.
    Scanned {
        target_name: String,
        components: usize,
    },
    Failed {
        target_name: String,
    },
    /// Integration type not handled by the AI-BOM scanner.
    Skipped {
        target_name: String,
        integration_type: Option<String>,
    },
}

/// Everything gathered from the provider in one run, in listing order.
#[derive(Debug, Clone, Default)]
pub struct ScanBatch {
    pub aggregates: Vec<TargetAggregate>,
    pub outcomes: Vec<TargetOutcome>,
}

impl ScanBatch {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TargetOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TargetOutcome::Skipped { .. }))
            .count()
    }
}

/// List targets and fetch each supported target's AI-BOM, one at a time.
///
/// `on_listed` sees the full listing before any scan starts; `on_outcome` is called
/// as each target finishes. A failed scan is recorded and collection continues.
#[instrument(name = "collect_scans", skip_all)]
pub async fn collect_scans<P, L, F>(
    provider: &P,
    on_listed: L,
    mut on_outcome: F,
) -> Result<ScanBatch, TargetRetrievalError>
where
    P: TargetProvider + ?Sized,
    L: FnOnce(&[Target]),
    F: FnMut(&TargetOutcome),
{
    let targets = provider
        .list_targets()
        .await
        .map_err(TargetRetrievalError::Listing)?;
    if targets.is_empty() {
        return Err(TargetRetrievalError::NoTargets);
    }
    on_listed(&targets);

    let mut batch = ScanBatch::default();
    for target in &targets {
        let outcome = if !target.is_supported() {
            debug!(target = %target.display_name, integration = ?target.integration_type, "skipping unsupported target");
            TargetOutcome::Skipped {
                target_name: target.display_name.clone(),
                integration_type: target.integration_type.clone(),
            }
        } else {
            match provider.scan_target(target).await {
                Some(scan) => {
                    let aggregate = TargetAggregate::new(target.display_name.clone(), scan);
                    let components = aggregate.components().len();
                    batch.aggregates.push(aggregate);
                    TargetOutcome::Scanned {
                        target_name: target.display_name.clone(),
                        components,
                    }
                }
                None => TargetOutcome::Failed {
                    target_name: target.display_name.clone(),
                },
            }
        };
        on_outcome(&outcome);
        batch.outcomes.push(outcome);
    }

    info!(
        listed = targets.len(),
        scanned = batch.aggregates.len(),
        failed = batch.failed(),
        skipped = batch.skipped(),
        "target collection finished"
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::ScanResult;
    use anyhow::Result;
    use serde_json::json;
    use std::collections::HashMap;

    struct StaticProvider {
        targets: Vec<Target>,
        scans: HashMap<String, serde_json::Value>,
    }

    #[async_trait::async_trait]
    impl TargetProvider for StaticProvider {
        async fn list_targets(&self) -> Result<Vec<Target>> {
            Ok(self.targets.clone())
        }

        async fn scan_target(&self, target: &Target) -> Option<ScanResult> {
            self.scans.get(&target.id).cloned().map(ScanResult::new)
        }
    }

    struct BrokenProvider;

    #[async_trait::async_trait]
    impl TargetProvider for BrokenProvider {
        async fn list_targets(&self) -> Result<Vec<Target>> {
            Err(anyhow::anyhow!("listing backend offline"))
        }

        async fn scan_target(&self, _target: &Target) -> Option<ScanResult> {
            None
        }
    }

    fn provider() -> StaticProvider {
        StaticProvider {
            targets: vec![
                Target::new("a", "acme/api", Some("github")),
                Target::new("b", "acme/image", Some("docker-hub")),
                Target::new("c", "acme/broken", Some("gitlab")),
                Target::new("d", "acme/api", Some("azure-repos")),
            ],
            scans: HashMap::from([
                (
                    "a".to_string(),
                    json!({"components": [
                        {"name": "Root", "type": "application"},
                        {"name": "gpt-4o", "type": "machine-learning-model"}
                    ]}),
                ),
                (
                    "d".to_string(),
                    json!({"data": {"attributes": {"components": []}}}),
                ),
            ]),
        }
    }

    #[tokio::test]
    async fn classifies_each_target_in_listing_order() {
        let mut seen = Vec::new();
        let mut listed = 0;
        let batch = collect_scans(&provider(), |t| listed = t.len(), |o| seen.push(o.clone()))
            .await
            .unwrap();

        assert_eq!(listed, 4);
        assert_eq!(seen, batch.outcomes);
        assert_eq!(
            batch.outcomes,
            vec![
                TargetOutcome::Scanned {
                    target_name: "acme/api".into(),
                    components: 1
                },
                TargetOutcome::Skipped {
                    target_name: "acme/image".into(),
                    integration_type: Some("docker-hub".into())
                },
                TargetOutcome::Failed {
                    target_name: "acme/broken".into()
                },
                TargetOutcome::Scanned {
                    target_name: "acme/api".into(),
                    components: 0
                },
            ]
        );
        assert_eq!(batch.aggregates.len(), 2);
        assert_eq!(batch.failed(), 1);
        assert_eq!(batch.skipped(), 1);
    }

    #[tokio::test]
    async fn empty_listing_is_fatal() {
        let empty = StaticProvider {
            targets: Vec::new(),
            scans: HashMap::new(),
        };
        let err = collect_scans(&empty, |_| {}, |_| {}).await.unwrap_err();
        assert!(matches!(err, TargetRetrievalError::NoTargets));
    }

    #[tokio::test]
    async fn listing_errors_are_retrieval_errors() {
        let err = collect_scans(&BrokenProvider, |_| {}, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TargetRetrievalError::Listing(_)));
        assert!(format!("{err:#}").contains("failed to list targets"));
    }
}

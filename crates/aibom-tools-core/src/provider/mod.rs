use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde::Deserialize;

use crate::bom::ScanResult;

pub mod file_provider;

/// Version-control integrations the AI-BOM scanner can analyse.
pub const SUPPORTED_INTEGRATIONS: &[&str] = &[
    "github",
    "github-enterprise",
    "github-cloud-app",
    "github-server-app",
    "gitlab",
    "azure-repos",
    "bitbucket-cloud",
    "bitbucket-server",
    "bitbucket-cloud-app",
];

pub const UNKNOWN_TARGET_NAME: &str = "Unknown Name";

/// One scannable repository known to the target provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "TargetRecord")]
pub struct Target {
    pub id: String,
    pub display_name: String,
    pub integration_type: Option<String>,
}

impl Target {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        integration_type: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            integration_type: integration_type.map(str::to_string),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.integration_type
            .as_deref()
            .is_some_and(|kind| SUPPORTED_INTEGRATIONS.contains(&kind))
    }
}

/// Wire shape of a target listing entry:
/// `{id, attributes: {display_name}, relationships: {integration: {data: {attributes: {integration_type}}}}}`.
#[derive(Deserialize)]
struct TargetRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    attributes: TargetAttributes,
    #[serde(default)]
    relationships: TargetRelationships,
}

#[derive(Deserialize, Default)]
struct TargetAttributes {
    display_name: Option<String>,
}

#[derive(Deserialize, Default)]
struct TargetRelationships {
    #[serde(default)]
    integration: Relationship,
}

#[derive(Deserialize, Default)]
struct Relationship {
    #[serde(default)]
    data: RelationshipData,
}

#[derive(Deserialize, Default)]
struct RelationshipData {
    #[serde(default)]
    attributes: IntegrationAttributes,
}

#[derive(Deserialize, Default)]
struct IntegrationAttributes {
    integration_type: Option<String>,
}

impl From<TargetRecord> for Target {
    fn from(record: TargetRecord) -> Self {
        Self {
            id: record.id,
            display_name: record
                .attributes
                .display_name
                .unwrap_or_else(|| UNKNOWN_TARGET_NAME.to_string()),
            integration_type: record
                .relationships
                .integration
                .data
                .attributes
                .integration_type,
        }
    }
}

/// Source of targets and their raw AI-BOM payloads, so backends (files, HTTP, fixtures) can be swapped.
#[async_trait]
pub trait TargetProvider: Send + Sync {
    /// Every target visible to the caller, in listing order.
    async fn list_targets(&self) -> AnyResult<Vec<Target>>;

    /// The AI-BOM payload for one target, or `None` when the scan failed.
    async fn scan_target(&self, target: &Target) -> Option<ScanResult>;
}

use std::{fs, path::PathBuf};

use aibom_tools_core::{
    aggregate, collect_scans, evaluate_policy, load_policy, load_policy_file,
    normalize_type_filter, render_report, CanonicalType, FileTargetProvider, OutputFormat,
    PolicyOutcome, RenderOptions, Report, ScanResult, TargetAggregate, TargetOutcome,
};
use serde_json::{json, Value};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn samples_dir() -> PathBuf {
    workspace_root().join("samples")
}

fn options() -> RenderOptions {
    RenderOptions {
        color: false,
        generated_at: "2024-01-01T00:00:00Z".into(),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn sample_inventory_end_to_end() {
    let provider = FileTargetProvider::new(samples_dir().join("inventory"));
    let batch = collect_scans(&provider, |_| {}, |_| {})
        .await
        .expect("sample inventory should list targets");

    assert_eq!(
        batch.outcomes,
        vec![
            TargetOutcome::Scanned {
                target_name: "acme/chat-api".into(),
                components: 4
            },
            TargetOutcome::Scanned {
                target_name: "acme/web".into(),
                components: 0
            },
            TargetOutcome::Skipped {
                target_name: "acme/base-image".into(),
                integration_type: Some("docker-hub".into())
            },
            TargetOutcome::Failed {
                target_name: "acme/legacy".into()
            },
        ]
    );

    let filter = normalize_type_filter(Some("ML Models")).unwrap();
    let summary = aggregate(&batch.aggregates, filter.as_ref());
    assert_eq!(summary.total_component_count, 2);
    assert_eq!(
        summary.per_type_count.keys().copied().collect::<Vec<_>>(),
        vec![CanonicalType::MachineLearningModel]
    );

    let policy = load_policy_file(&samples_dir().join("policy.yaml")).unwrap();
    assert_eq!(policy.iter().collect::<Vec<_>>(), vec!["badmodel", "llama-2-7b"]);
    let outcome = PolicyOutcome::evaluate(&batch.aggregates, &policy);
    assert_eq!(outcome.violations.len(), 1);
    assert_eq!(outcome.violations[0].target_name, "acme/chat-api");
    assert_eq!(
        outcome.violations[0].locations.shown,
        vec!["src/legacy/classifier.py:8"]
    );

    let report = Report {
        targets: &batch.aggregates,
        summary: &summary,
        policy: Some(&outcome),
    };
    let html = render_report(&report, OutputFormat::Html, &options()).unwrap();
    assert!(html.contains("gpt-4o-mini"));
    assert!(!html.contains("langchain"));
    assert!(html.contains("policy-fail"));

    let exported: Value =
        serde_json::from_str(&render_report(&report, OutputFormat::Json, &options()).unwrap())
            .unwrap();
    let raw: Value = serde_json::from_str(
        &fs::read_to_string(samples_dir().join("inventory/aiboms/t-chat-api.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(exported["all_aibom_data"][0]["aibom_data"], raw);
    assert_eq!(exported["all_aibom_data"].as_array().unwrap().len(), 2);
}

#[test]
fn two_targets_with_one_rejected_model() {
    let targets = vec![
        TargetAggregate::new(
            "A",
            ScanResult::new(json!({"components": [
                {"name": "Root", "type": "application"},
                {"name": "BadModel", "type": "machine-learning-model"}
            ]})),
        ),
        TargetAggregate::new(
            "B",
            ScanResult::new(json!({"data": {"attributes": {"components": [
                {"name": "Root", "type": "application"}
            ]}}})),
        ),
    ];
    let policy = load_policy("reject: [\"badmodel\"]").unwrap();

    let summary = aggregate(&targets, None);
    assert_eq!(summary.total_component_count, 1);

    let violations = evaluate_policy(&targets, Some(&policy));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].target_name, "A");
    assert_eq!(violations[0].model_name, "BadModel");
}

#[test]
fn root_component_never_reaches_any_rendering() {
    let targets = vec![TargetAggregate::new(
        "solo",
        ScanResult::new(json!({"components": [{"name": "Root", "type": "application"}]})),
    )];
    let summary = aggregate(&targets, None);
    assert_eq!(summary.total_component_count, 0);
    let report = Report {
        targets: &targets,
        summary: &summary,
        policy: None,
    };
    for format in [OutputFormat::Console, OutputFormat::Html] {
        let output = render_report(&report, format, &options()).unwrap();
        assert!(!output.contains(">Root<"), "{format:?}");
        assert!(!output.contains("  Root "), "{format:?}");
    }
}

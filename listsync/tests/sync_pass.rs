use std::collections::BTreeMap;

use listsync::destination::memory::MemoryDestination;
use listsync::mapping::FieldMapping;
use listsync::pipeline::SyncPipeline;
use listsync::source::memory::MemorySource;
use listsync::types::{PassReport, SourceRecord};
use listsync_config::shared::MappingConfig;
use listsync_telemetry::tracing::init_test_tracing;
use serde_json::{Map, Value, json};

fn name_mapping() -> FieldMapping {
    FieldMapping::from_config(&MappingConfig {
        key_column: "code".to_string(),
        key_field: "Code".to_string(),
        fields: [("name".to_string(), "name".to_string())]
            .into_iter()
            .collect::<BTreeMap<_, _>>(),
    })
}

fn record(code: &str, name: &str) -> SourceRecord {
    [
        ("code".to_string(), json!(code)),
        ("name".to_string(), json!(name)),
    ]
    .into_iter()
    .collect()
}

fn item_fields(code: &str, name: &str) -> Map<String, Value> {
    [
        ("Code".to_string(), json!(code)),
        ("name".to_string(), json!(name)),
    ]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn pass_converges_destination_and_second_pass_is_idempotent() {
    init_test_tracing();

    let destination = MemoryDestination::new("Code");
    destination.seed(item_fields("B", "Bob")).await;
    destination.seed(item_fields("C", "Carol")).await;

    let source = MemorySource::new(vec![record("A", "Alice"), record("B", "Bob")]);
    let pipeline = SyncPipeline::new(source, destination.clone(), name_mapping());

    let report = pipeline.run_pass().await.unwrap();
    assert_eq!(
        report,
        PassReport {
            added: 1,
            updated: 0,
            deleted: 1,
            skipped: 1,
            failed: 0,
        }
    );
    assert_eq!(destination.keys().await, vec!["A", "B"]);

    // The destination now reflects the source; a second pass changes nothing.
    let report = pipeline.run_pass().await.unwrap();
    assert_eq!(
        report,
        PassReport {
            added: 0,
            updated: 0,
            deleted: 0,
            skipped: 2,
            failed: 0,
        }
    );
}

#[tokio::test]
async fn renamed_record_is_patched_on_the_destination() {
    init_test_tracing();

    let destination = MemoryDestination::new("Code");
    destination.seed(item_fields("B", "Bob")).await;

    let source = MemorySource::new(vec![record("B", "Bobby")]);
    let pipeline = SyncPipeline::new(source, destination.clone(), name_mapping());

    let report = pipeline.run_pass().await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed, 0);

    let items = destination.items().await;
    assert_eq!(items[0].fields["name"], json!("Bobby"));
}

#[tokio::test]
async fn partial_index_suppresses_deletions() {
    init_test_tracing();

    let destination = MemoryDestination::new("Code");
    for (code, name) in [("A", "Alice"), ("B", "Bob"), ("C", "Carol"), ("D", "Dan")] {
        destination.seed(item_fields(code, name)).await;
    }
    destination.set_page_size(2).await;
    destination.fail_page(1).await;

    // Only A remains in the source; with a complete index B, C, and D would
    // all be deleted.
    let source = MemorySource::new(vec![record("A", "Alice")]);
    let pipeline = SyncPipeline::new(source, destination.clone(), name_mapping());

    let report = pipeline.run_pass().await.unwrap();

    assert_eq!(report.deleted, 0);
    assert_eq!(destination.keys().await, vec!["A", "B", "C", "D"]);
}

#[tokio::test]
async fn extraction_failure_aborts_pass_and_next_pass_retries() {
    init_test_tracing();

    let destination = MemoryDestination::new("Code");
    destination.seed(item_fields("C", "Carol")).await;

    let source = MemorySource::new(vec![record("A", "Alice")]);
    source.fail_next_fetch().await;

    let pipeline = SyncPipeline::new(source, destination.clone(), name_mapping());

    // The failing pass leaves the destination untouched.
    assert!(pipeline.run_pass().await.is_err());
    assert_eq!(destination.keys().await, vec!["C"]);

    // The next pass retries the extraction and reconciles normally.
    let report = pipeline.run_pass().await.unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(destination.keys().await, vec!["A"]);
}

#[tokio::test]
async fn empty_extraction_skips_the_pass() {
    init_test_tracing();

    let destination = MemoryDestination::new("Code");
    destination.seed(item_fields("B", "Bob")).await;

    let source = MemorySource::new(Vec::new());
    let pipeline = SyncPipeline::new(source, destination.clone(), name_mapping());

    let report = pipeline.run_pass().await.unwrap();

    assert_eq!(report, PassReport::default());
    assert_eq!(destination.keys().await, vec!["B"]);
}

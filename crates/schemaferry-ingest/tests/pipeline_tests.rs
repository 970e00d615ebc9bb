//! End-to-end tests for the ingestion loop
//!
//! Messages come from a `MemorySource` and statements go to a
//! `MockExecutor`, so no Kafka or Hive installation is needed.

use pretty_assertions::assert_eq;
use schemaferry_core::{ErrorPolicy, IdentifierPolicy};
use schemaferry_ddl::{DdlError, DdlSynthesizer, StatementTarget};
use schemaferry_executor::MockExecutor;
use schemaferry_ingest::{
    IngestError, Ingestor, JsonlDeadLetterSink, MemoryDeadLetterSink, MemorySource,
    MessageOutcome, MessagePosition, MessageSource, RunSummary,
};

// =============================================================================
// Fixtures
// =============================================================================

const SALES: &str = r#"{"database_name":"sales","tables":[{"name":"orders","columns":[{"name":"id","data_type":"int","is_nullable":false,"is_primary":true},{"name":"note","data_type":"varchar","is_nullable":true,"is_primary":false}]}]}"#;

const UNKNOWN_TYPE: &str = r#"{"database_name":"docs","tables":[{"name":"pages","columns":[{"name":"body","data_type":"json","is_nullable":true,"is_primary":false}]}]}"#;

const THREE_TABLES: &str = r#"{
  "database_name": "shop",
  "tables": [
    {"name": "customers", "columns": [{"name": "id", "data_type": "bigint", "is_nullable": false, "is_primary": true}]},
    {"name": "orders", "columns": [{"name": "id", "data_type": "bigint", "is_nullable": false, "is_primary": true}]},
    {"name": "items", "columns": [{"name": "id", "data_type": "bigint", "is_nullable": false, "is_primary": true}]}
  ]
}"#;

const ORDERS_DDL: &str = "CREATE TABLE IF NOT EXISTS sales.orders (\n  id INT NOT NULL,\n  note STRING\n);";

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_scenario_sales_orders() {
    let executor = MockExecutor::new();
    let mut ingestor = Ingestor::new(MemorySource::from_payloads([SALES]), executor.clone());

    let summary = ingestor.run().await.unwrap();

    assert_eq!(
        executor.executed().await,
        vec!["CREATE DATABASE IF NOT EXISTS sales;".to_string(), ORDERS_DDL.to_string()]
    );
    assert_eq!(
        summary,
        RunSummary {
            applied: 1,
            skipped: 0,
            dead_lettered: 0,
            statements: 2,
        }
    );
    assert_eq!(ingestor.source().committed(), &[MessagePosition::Memory(0)]);
}

#[tokio::test]
async fn test_scenario_unknown_type_maps_to_string() {
    let executor = MockExecutor::new();
    let mut ingestor = Ingestor::new(MemorySource::from_payloads([UNKNOWN_TYPE]), executor.clone());

    ingestor.run().await.unwrap();

    let executed = executor.executed().await;
    assert_eq!(
        executed[1],
        "CREATE TABLE IF NOT EXISTS docs.pages (\n  body STRING\n);"
    );
}

#[tokio::test]
async fn test_scenario_execution_failure_halts_remaining_tables() {
    let executor = MockExecutor::new().fail_when_contains("shop.orders");
    let mut source = MemorySource::from_payloads([THREE_TABLES]);
    source.push(SALES);
    let mut ingestor = Ingestor::new(source, executor.clone());

    let err = ingestor.run().await.unwrap_err();

    match &err {
        IngestError::Execution { target, .. } => assert_eq!(
            target,
            &StatementTarget::Table {
                database: "shop".to_string(),
                table: "orders".to_string(),
            }
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("table shop.orders"));

    let executed = executor.executed().await;
    assert_eq!(executed.len(), 3);
    assert!(!executed.iter().any(|sql| sql.contains("shop.items")));
    assert!(!executed.iter().any(|sql| sql.contains("sales")));

    // Failed message stays uncommitted and the next one is never read
    assert!(ingestor.source().committed().is_empty());
    assert_eq!(ingestor.source().remaining(), 1);
}

// =============================================================================
// Fail-fast behaviour
// =============================================================================

#[tokio::test]
async fn test_decode_error_is_fatal() {
    let executor = MockExecutor::new();
    let mut source = MemorySource::from_payloads(["not json"]);
    source.push(SALES);
    let mut ingestor = Ingestor::new(source, executor.clone());

    assert!(matches!(ingestor.run().await, Err(IngestError::Decode(_))));
    assert!(executor.executed().await.is_empty());
}

#[tokio::test]
async fn test_read_error_is_fatal_under_every_policy() {
    for policy in [ErrorPolicy::FailFast, ErrorPolicy::SkipMessage, ErrorPolicy::DeadLetter] {
        let mut source = MemorySource::from_payloads([SALES]);
        source.push_error("broker unreachable");
        source.push(SALES);

        let mut ingestor = Ingestor::new(source, MockExecutor::new())
            .with_policy(policy)
            .with_dead_letter_sink(MemoryDeadLetterSink::new());

        assert!(
            matches!(ingestor.run().await, Err(IngestError::Source(_))),
            "{policy:?}"
        );
        assert_eq!(ingestor.summary().applied, 1);
    }
}

#[tokio::test]
async fn test_empty_table_is_rejected_before_execution() {
    let payload = r#"{"database_name":"db","tables":[{"name":"ok","columns":[{"name":"id","data_type":"int"}]},{"name":"empty","columns":[]}]}"#;
    let executor = MockExecutor::new();
    let mut ingestor = Ingestor::new(MemorySource::from_payloads([payload]), executor.clone());

    let err = ingestor.run().await.unwrap_err();

    assert!(matches!(err, IngestError::Ddl(DdlError::EmptyTable { .. })));
    assert!(executor.executed().await.is_empty());
}

#[tokio::test]
async fn test_unsafe_identifier_is_rejected() {
    let payload = r#"{"database_name":"db; DROP DATABASE prod","tables":[]}"#;
    let executor = MockExecutor::new();
    let mut ingestor = Ingestor::new(MemorySource::from_payloads([payload]), executor.clone());

    assert!(matches!(
        ingestor.run().await,
        Err(IngestError::Ddl(DdlError::InvalidIdentifier { .. }))
    ));
    assert!(executor.executed().await.is_empty());
}

#[tokio::test]
async fn test_quote_policy_accepts_unusual_names() {
    let payload = r#"{"database_name":"my-db","tables":[{"name":"order items","columns":[{"name":"id","data_type":"int"}]}]}"#;
    let executor = MockExecutor::new();
    let mut ingestor = Ingestor::new(MemorySource::from_payloads([payload]), executor.clone())
        .with_synthesizer(DdlSynthesizer::new(IdentifierPolicy::Quote));

    ingestor.run().await.unwrap();

    assert_eq!(
        executor.executed().await,
        vec![
            "CREATE DATABASE IF NOT EXISTS `my-db`;".to_string(),
            "CREATE TABLE IF NOT EXISTS `my-db`.`order items` (\n  `id` INT NOT NULL\n);".to_string(),
        ]
    );
}

// =============================================================================
// Redelivery and ordering
// =============================================================================

#[tokio::test]
async fn test_redelivered_message_reexecutes_same_ddl() {
    let executor = MockExecutor::new();
    let mut ingestor = Ingestor::new(MemorySource::from_payloads([SALES, SALES]), executor.clone());

    let summary = ingestor.run().await.unwrap();

    let executed = executor.executed().await;
    assert_eq!(summary.applied, 2);
    assert_eq!(executed.len(), 4);
    assert_eq!(executed[0], executed[2]);
    assert_eq!(executed[1], executed[3]);
    assert!(executed.iter().all(|sql| sql.contains("IF NOT EXISTS")));
}

#[tokio::test]
async fn test_messages_processed_in_order() {
    let executor = MockExecutor::new();
    let mut ingestor = Ingestor::new(
        MemorySource::from_payloads([THREE_TABLES, SALES]),
        executor.clone(),
    );

    ingestor.run().await.unwrap();

    let executed = executor.executed().await;
    let tables: Vec<&str> = executed
        .iter()
        .filter_map(|sql| sql.strip_prefix("CREATE TABLE IF NOT EXISTS "))
        .map(|rest| rest.split(' ').next().unwrap_or_default())
        .collect();
    assert_eq!(
        tables,
        vec!["shop.customers", "shop.orders", "shop.items", "sales.orders"]
    );
}

#[tokio::test]
async fn test_schema_without_tables_creates_database_only() {
    let executor = MockExecutor::new();
    let mut ingestor = Ingestor::new(
        MemorySource::from_payloads([r#"{"database_name":"bare","tables":[]}"#]),
        executor.clone(),
    );

    ingestor.run().await.unwrap();
    assert_eq!(
        executor.executed().await,
        vec!["CREATE DATABASE IF NOT EXISTS bare;".to_string()]
    );
}

#[tokio::test]
async fn test_null_tables_creates_database_only() {
    let mut ingestor = Ingestor::new(
        MemorySource::from_payloads([r#"{"database_name":"bare","tables":null}"#]),
        MockExecutor::new(),
    );

    let summary = ingestor.run().await.unwrap();

    assert_eq!(summary.applied, 1);
    assert_eq!(
        ingestor.executor().executed().await,
        vec!["CREATE DATABASE IF NOT EXISTS bare;".to_string()]
    );
}

#[tokio::test]
async fn test_null_columns_is_an_empty_table() {
    let payload = r#"{"database_name":"db","tables":[{"name":"t","columns":null}]}"#;
    let mut ingestor = Ingestor::new(MemorySource::from_payloads([payload]), MockExecutor::new());

    let err = ingestor.run().await.unwrap_err();

    assert!(matches!(err, IngestError::Ddl(DdlError::EmptyTable { .. })));
    assert!(ingestor.executor().executed().await.is_empty());
}

// =============================================================================
// Skip and dead-letter policies
// =============================================================================

#[tokio::test]
async fn test_skip_policy_continues_with_next_message() {
    let executor = MockExecutor::new().fail_when_contains("shop.orders");
    let mut source = MemorySource::from_payloads(["{", THREE_TABLES]);
    source.push(SALES);
    let mut ingestor = Ingestor::new(source, executor.clone()).with_policy(ErrorPolicy::SkipMessage);

    let summary = ingestor.run().await.unwrap();

    assert_eq!(summary.applied, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(ingestor.source().committed().len(), 3);
    assert!(executor
        .executed()
        .await
        .contains(&ORDERS_DDL.to_string()));
}

#[tokio::test]
async fn test_dead_letter_policy_records_failures() {
    let sink = MemoryDeadLetterSink::new();
    let mut ingestor = Ingestor::new(
        MemorySource::from_payloads(["{\"tables\": []}", SALES]),
        MockExecutor::new(),
    )
    .with_policy(ErrorPolicy::DeadLetter)
    .with_dead_letter_sink(sink.clone());

    let summary = ingestor.run().await.unwrap();

    assert_eq!(summary.applied, 1);
    assert_eq!(summary.dead_lettered, 1);

    let records = sink.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].position, "memory#0");
    assert_eq!(records[0].payload, "{\"tables\": []}");
    assert!(records[0].error.contains("database_name"));
}

#[tokio::test]
async fn test_dead_letter_write_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlDeadLetterSink::new(dir.path().join("missing/dlq.jsonl"));
    let mut ingestor = Ingestor::new(MemorySource::from_payloads(["{"]), MockExecutor::new())
        .with_policy(ErrorPolicy::DeadLetter)
        .with_dead_letter_sink(sink);

    assert!(matches!(
        ingestor.run().await,
        Err(IngestError::DeadLetter(_))
    ));
    assert!(ingestor.source().committed().is_empty());
}

#[tokio::test]
async fn test_handle_message_outcomes() {
    let mut source = MemorySource::from_payloads([SALES, "{"]);
    let mut ingestor = Ingestor::new(MemorySource::new(), MockExecutor::new())
        .with_policy(ErrorPolicy::SkipMessage);

    let good = source.next_message().await.unwrap().unwrap();
    let bad = source.next_message().await.unwrap().unwrap();

    assert_eq!(
        ingestor.handle_message(&good).await.unwrap(),
        MessageOutcome::Applied { statements: 2 }
    );
    assert!(matches!(
        ingestor.handle_message(&bad).await.unwrap(),
        MessageOutcome::Skipped { .. }
    ));
}

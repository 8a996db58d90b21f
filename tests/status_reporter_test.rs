//! Full reporting cycles against in-memory collaborators and a mock collector

mod common;

use common::*;
use ledger_status::cache::InMemoryCounterStore;
use ledger_status::config::ReporterConfig;
use ledger_status::error::ReporterError;
use ledger_status::ledger::InMemoryLedgerRegistry;
use ledger_status::reporting::{CycleOutcome, StatusReporter};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn collector(expected_posts: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nodes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected_posts)
        .mount(&server)
        .await;
    server
}

fn reporter(
    env: ledger_status::reporting::ReportingEnvironment,
    server: &MockServer,
    timeout: Duration,
) -> StatusReporter {
    StatusReporter::new(env, publish_context(), server.uri(), server.uri(), timeout).unwrap()
}

#[tokio::test]
async fn test_cycle_publishes_complete_snapshot() {
    let server = collector(1).await;
    let env = environment(busy_counter_store(), sample_registry());
    let reporter = reporter(env, &server, Duration::from_secs(10));

    let snapshot = reporter.report_at(NOW).await.unwrap();

    assert_eq!(reporter.token(), NODE_TOKEN);
    assert_eq!(snapshot.ledger_node_id, NODE_ID);
    assert_eq!(snapshot.status.duration.aggregate, 1200);
    assert_eq!(snapshot.status.ops_per_second.local, 12);
    assert_eq!(snapshot.status.ops_per_second.peer, 4);
    assert_eq!(snapshot.status.events.events_per_second_local, 3);
    assert_eq!(snapshot.status.events.events_per_second_peer, 1);
    assert_eq!(snapshot.status.events.total, 5);
    assert_eq!(snapshot.status.events.outstanding, 2);
    assert_eq!(snapshot.status.events.merge_events_total, 3);
    assert_eq!(snapshot.status.events.merge_events_outstanding, 1);
    assert_eq!(snapshot.status.events.avg_consensus_time, 400.0);
    assert_eq!(snapshot.status.load_average, FIXED_LOAD);
    assert_eq!(snapshot.status.target_node.as_deref(), Some(VOTER_ID));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, serde_json::to_value(&snapshot).unwrap());
    assert_eq!(
        body["status"]["latestSummary"]["eventBlock"]["block"]["blockHeight"],
        json!(42)
    );
    assert_eq!(body["privateHostname"], "ip-10-0-0-12.internal");

    let last = reporter.last_cycle().unwrap();
    assert!(last.is_success());
    assert!(last.finished_at >= last.started_at);
}

#[tokio::test]
async fn test_idle_node_reports_zero_rates() {
    let server = collector(1).await;
    let env = environment(Arc::new(InMemoryCounterStore::new()), sample_registry());
    let reporter = reporter(env, &server, Duration::from_secs(10));

    let snapshot = reporter.report_at(NOW).await.unwrap();

    assert_eq!(snapshot.status.ops_per_second.local, 0);
    assert_eq!(snapshot.status.ops_per_second.peer, 0);
    assert_eq!(snapshot.status.events.events_per_second_local, 0);
    assert_eq!(snapshot.status.duration.find_consensus, 0);
}

#[tokio::test]
async fn test_ledger_failure_publishes_nothing() {
    let server = collector(0).await;
    let registry = Arc::new(FailingRegistry::default());
    let env = environment(busy_counter_store(), registry.clone());
    let reporter = reporter(env, &server, Duration::from_secs(10));

    let err = reporter.report_at(NOW).await.unwrap_err();

    assert!(matches!(err, ReporterError::Storage { .. }));
    assert_eq!(registry.lookups.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(server.received_requests().await.unwrap().is_empty());

    let last = reporter.last_cycle().unwrap();
    assert!(matches!(last.outcome, CycleOutcome::Failed { .. }));
}

#[tokio::test]
async fn test_cache_outage_publishes_nothing() {
    let server = collector(0).await;
    let store = busy_counter_store();
    store.set_unavailable(true);
    let reporter = reporter(
        environment(store, sample_registry()),
        &server,
        Duration::from_secs(10),
    );

    let err = reporter.report_at(NOW).await.unwrap_err();
    assert!(matches!(err, ReporterError::CacheUnavailable(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stalled_ledger_hits_cycle_deadline() {
    let server = collector(0).await;
    let env = environment(busy_counter_store(), Arc::new(StalledRegistry));
    let reporter = reporter(env, &server, Duration::from_millis(200));

    let err = reporter.report_at(NOW).await.unwrap_err();

    assert!(matches!(err, ReporterError::Timeout { .. }));
    assert!(!reporter.last_cycle().unwrap().is_success());
}

#[tokio::test]
async fn test_collector_rejection_fails_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nodes"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let reporter = reporter(
        environment(busy_counter_store(), sample_registry()),
        &server,
        Duration::from_secs(10),
    );

    let err = reporter.report_at(NOW).await.unwrap_err();
    assert!(matches!(
        err,
        ReporterError::PublishFailed {
            status: Some(500),
            ..
        }
    ));
}

#[tokio::test]
async fn test_reporter_fetches_genesis_from_primary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genesis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"genesis": true})))
        .expect(1)
        .mount(&server)
        .await;
    let reporter = reporter(
        environment(busy_counter_store(), sample_registry()),
        &server,
        Duration::from_secs(10),
    );

    let genesis = reporter.fetch_genesis().await.unwrap();
    assert_eq!(genesis.into_inner(), json!({"genesis": true}));
}

#[tokio::test]
async fn test_reporter_from_config_with_memory_cache() {
    let server = collector(1).await;
    let mut config = ReporterConfig::default();
    config.node.ledger_node_id = NODE_ID.to_string();
    config.node.label = "node-1".to_string();
    config.cache.backend = "memory".to_string();
    config.collector.primary_base_url = server.uri();

    let registry = Arc::new(InMemoryLedgerRegistry::new());
    registry.register(sample_ledger_node());

    let reporter = StatusReporter::from_config(&config, registry).await.unwrap();
    let snapshot = reporter.report_once().await.unwrap();

    assert_eq!(snapshot.label, "node-1");
    assert_eq!(snapshot.status.ops_per_second.local, 0);
    assert_eq!(snapshot.status.events.total, 5);
}

#[test]
fn test_invalid_identifier_is_rejected_up_front() {
    let store = Arc::new(InMemoryCounterStore::new());
    let env = environment(store, sample_registry());
    let mut context = publish_context();
    context.ledger_node_id = "::".to_string();

    let err = StatusReporter::new(
        env,
        context,
        "http://primary",
        "http://primary",
        Duration::from_secs(1),
    )
    .unwrap_err();
    assert!(matches!(err, ReporterError::InvalidIdentifier { .. }));
}

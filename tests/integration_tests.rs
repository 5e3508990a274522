//! Integration tests using mock RPC server
//!
//! Tests the full flow: paginator → contract view source → JSON-RPC → records

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use feedpoll::http::{HttpClient, HttpClientConfig};
use feedpoll::{
    ContractViewSource, FeedConfig, ManualScheduler, PollEvent, PollingPaginator, Record,
    RecordFamily, RecordId, RecordSet,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

/// Serves `get_feedbacks` views over a fixed list of ids, newest first
struct FeedbackContract {
    ids: Vec<u64>,
}

impl Respond for FeedbackContract {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let encoded = body["params"]["args_base64"].as_str().unwrap();
        let args: Value = serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap();

        let page = args["page"].as_u64().unwrap() as usize;
        let size = args["size"].as_u64().unwrap() as usize;
        let records: Vec<Value> = self
            .ids
            .iter()
            .skip(page * size)
            .take(size)
            .map(|id| json!({"id": id, "content": format!("feedback {id}"), "create_at": id * 1000}))
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "feedpoll",
            "result": {"result": Value::Array(records).to_string().into_bytes(), "logs": []}
        }))
    }
}

fn ids(records: &RecordSet) -> Vec<u64> {
    records
        .iter()
        .map(|r| match r.id {
            RecordId::Number(n) => n,
            RecordId::Text(_) => panic!("expected numeric id"),
        })
        .collect()
}

async fn recv(updates: &mut mpsc::UnboundedReceiver<RecordSet>) -> RecordSet {
    tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("no update delivered")
        .expect("update channel closed")
}

// ============================================================================
// Contract feed
// ============================================================================

#[tokio::test]
async fn test_pages_through_contract_feed() {
    let mock_server = MockServer::start().await;
    Mock::given(wiremock::matchers::method("POST"))
        .respond_with(FeedbackContract {
            ids: vec![1, 2, 3, 4, 5],
        })
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .max_retries(0)
            .no_rate_limit()
            .build(),
    )
    .unwrap();
    let source =
        ContractViewSource::new(client, mock_server.uri(), "feedback.testnet", RecordFamily::All);

    let scheduler = ManualScheduler::new();
    let (tx, mut updates) = mpsc::unbounded_channel();
    let paginator = PollingPaginator::builder()
        .page_size(3)
        .source(source)
        .scheduler(scheduler.clone())
        .on_update(move |records| {
            let _ = tx.send(records.clone());
        })
        .build()
        .unwrap();

    assert_ok!(paginator.start());
    assert_eq!(ids(&recv(&mut updates).await), vec![1, 2, 3]);

    paginator.next_page();
    scheduler.tick();
    assert_eq!(ids(&recv(&mut updates).await), vec![4, 5]);

    paginator.next_page();
    scheduler.tick();
    assert!(recv(&mut updates).await.is_empty());

    paginator.prev_page();
    paginator.prev_page();
    paginator.prev_page();
    assert_eq!(paginator.page(), 1);
    scheduler.tick();
    assert_eq!(ids(&recv(&mut updates).await), vec![1, 2, 3]);

    paginator.stop();
    assert_eq!(scheduler.active_timers(), 0);
}

#[tokio::test]
async fn test_outage_keeps_last_page() {
    let mock_server = MockServer::start().await;
    Mock::given(wiremock::matchers::method("POST"))
        .respond_with(FeedbackContract { ids: vec![1, 2] })
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(wiremock::matchers::method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .max_retries(0)
            .no_rate_limit()
            .build(),
    )
    .unwrap();
    let source = ContractViewSource::new(client, mock_server.uri(), "c", RecordFamily::All);

    let scheduler = ManualScheduler::new();
    let (tx, mut updates) = mpsc::unbounded_channel();
    let (failure_tx, mut failures) = mpsc::unbounded_channel();
    let paginator = PollingPaginator::builder()
        .page_size(3)
        .source(source)
        .scheduler(scheduler.clone())
        .on_update(move |records| {
            let _ = tx.send(records.clone());
        })
        .on_event(move |event| {
            if let PollEvent::Failed { error, .. } = event {
                let _ = failure_tx.send(error.to_string());
            }
        })
        .build()
        .unwrap();

    paginator.start().unwrap();
    assert_eq!(ids(&recv(&mut updates).await), vec![1, 2]);

    scheduler.tick();
    let failure = tokio::time::timeout(Duration::from_secs(5), failures.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(failure.contains("503"));

    assert_eq!(ids(&paginator.records()), vec![1, 2]);
    assert!(paginator.is_running());
    assert_eq!(scheduler.active_timers(), 1);
}

// ============================================================================
// Wall-clock polling
// ============================================================================

#[tokio::test]
async fn test_tokio_timer_keeps_refreshing() {
    let offsets = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&offsets);
    let (tx, mut updates) = mpsc::unbounded_channel();

    let paginator = PollingPaginator::builder()
        .page_size(2)
        .interval_ms(30)
        .fetch_fn(move |offset, limit| {
            seen.lock().unwrap().push(offset);
            async move {
                Ok((offset..offset + u64::from(limit))
                    .map(|id| Record::new(id, "polled"))
                    .collect())
            }
        })
        .on_update(move |records| {
            let _ = tx.send(records.clone());
        })
        .build()
        .unwrap();

    paginator.start().unwrap();
    assert_eq!(ids(&recv(&mut updates).await), vec![0, 1]);

    paginator.set_page(3);
    loop {
        let records = recv(&mut updates).await;
        if ids(&records) == vec![4, 5] {
            break;
        }
    }

    paginator.stop();
    let calls = offsets.lock().unwrap().clone();
    assert_eq!(calls.first(), Some(&0));
    assert!(calls.contains(&4));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_feed_config_drives_paginator() {
    let config = FeedConfig::from_yaml_str(
        "rpc_url: http://localhost:3030\ncontract: c\npage_size: 4\ninitial_page: 3\n",
    )
    .unwrap();

    let paginator = PollingPaginator::builder()
        .config(config.paginator_config())
        .fetch_fn(|_, _| async { Ok(Vec::new()) })
        .on_update(|_| {})
        .build()
        .unwrap();

    assert_eq!(paginator.page(), 3);
    assert_eq!(paginator.offset(), 8);
    assert_eq!(paginator.config().interval, Duration::from_millis(1000));
}

#[test]
fn test_invalid_feed_config_fails_fast() {
    assert_err!(FeedConfig::from_yaml_str(
        "rpc_url: http://localhost:3030\ncontract: c\npage_size: 0\n"
    ));
    assert_err!(FeedConfig::from_yaml_str("contract: c\n"));
}

//! Integration tests for the performance benchmark pipeline.
//!
//! A reply helper plays the service and answers each `SORT_REQUEST` the
//! client sends with a `PERFORMANCE_RESULT` frame.  The timers the pipeline
//! arms (settle, advance, retry, send cooldown) are fired by hand, so every
//! test runs the whole suite without waiting.
//!
//! ```text
//! start ─▶ settle ─▶ SORT_REQUEST ─▶ PERFORMANCE_RESULT ─▶ advance ─▶ settle ─▶ …
//!                                                        └─ last one ─▶ suite complete
//! ```

mod common;

use common::Harness;
use serde_json::{json, Value};
use sortviz_client::application::timers::TimerKind;
use sortviz_client::domain::{ClientConfig, ClientError, DatasetPolicy};
use sortviz_core::{Algorithm, DatasetParams};

/// Builds the service's reply to one sent request.
fn reply(request: &Value, echo_id: bool) -> String {
    let mut frame = json!({
        "type": "PERFORMANCE_RESULT",
        "algorithm": request["algorithm"],
        "dataSize": request["data"].as_array().map(Vec::len),
        "distribution": request["distribution"],
        "time": 7,
        "comparisons": 1200,
        "swaps": 300,
        "sorted": true,
        "timestamp": 1_718_000_000_000u64
    });
    if echo_id {
        frame["requestId"] = request["requestId"].clone();
    }
    frame.to_string()
}

/// Fires timers until a new request has been transmitted, and returns it.
fn next_request(h: &mut Harness) -> Value {
    let before = h.transport.sent().len();
    h.fire(TimerKind::BenchmarkSettle);
    if h.transport.sent().len() == before {
        assert!(h.fire_cooldown(), "request neither sent nor waiting on the cooldown");
    }
    let sent = h.sent_json();
    assert_eq!(sent.len(), before + 1, "exactly one request per step");
    sent[before].clone()
}

/// Runs a whole suite, answering every request.  Returns the requests sent.
fn run_suite(h: &mut Harness, algorithms: &[Algorithm], echo_id: bool) -> Vec<Value> {
    h.client
        .start_benchmark(DatasetParams::default(), algorithms)
        .unwrap();
    let mut requests = Vec::new();
    for i in 0..algorithms.len() {
        if i > 0 {
            h.fire(TimerKind::BenchmarkAdvance);
        }
        let request = next_request(h);
        h.frame(&reply(&request, echo_id));
        requests.push(request);
    }
    requests
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_six_algorithm_suite_sends_six_requests_and_completes_once() {
    // Arrange
    let mut h = Harness::connected();
    h.client
        .start_benchmark(DatasetParams::default(), &Algorithm::ALL)
        .unwrap();

    // Act / Assert: suite-complete only after the sixth result
    let mut requests = Vec::new();
    for (i, algorithm) in Algorithm::ALL.iter().enumerate() {
        if i > 0 {
            h.fire(TimerKind::BenchmarkAdvance);
        }
        let request = next_request(&mut h);
        assert_eq!(request["algorithm"], algorithm.wire_name());
        assert!(h.notifier.suites.lock().unwrap().is_empty());
        h.frame(&reply(&request, true));
        requests.push(request);
    }

    // Assert
    assert_eq!(requests.len(), 6);
    assert_eq!(h.recorder.algorithms(), Algorithm::ALL.to_vec());
    let suites = h.notifier.suites.lock().unwrap();
    assert_eq!(suites.len(), 1);
    assert_eq!(
        suites[0].keys().copied().collect::<Vec<_>>(),
        {
            let mut all = Algorithm::ALL.to_vec();
            all.sort();
            all
        }
    );
    assert!(!h.client.core().benchmark().is_running());
    assert_eq!(h.client.core().timers().armed_count(), 1, "only the send cooldown");
}

#[test]
fn test_requests_carry_performance_mode_and_shared_dataset() {
    // Arrange
    let mut h = Harness::connected();

    // Act
    let requests = run_suite(&mut h, &[Algorithm::Heap, Algorithm::Merge, Algorithm::Quick], true);

    // Assert
    for request in &requests {
        assert_eq!(request["type"], "SORT_REQUEST");
        assert_eq!(request["mode"], "PERFORMANCE");
        assert_eq!(request["dataType"], "INTEGER");
        assert_eq!(request["distribution"], "RANDOM");
        assert_eq!(request["data"].as_array().unwrap().len(), 100);
    }
    assert_eq!(requests[0]["data"], requests[1]["data"]);
    assert_eq!(requests[1]["data"], requests[2]["data"]);
    let ids: Vec<&str> = requests.iter().map(|r| r["requestId"].as_str().unwrap()).collect();
    assert!(ids[0] != ids[1] && ids[1] != ids[2], "every step has its own id");
}

#[test]
fn test_regenerate_policy_gives_each_algorithm_fresh_data() {
    // Arrange
    let mut config = ClientConfig::default();
    config.benchmark.dataset_policy = DatasetPolicy::RegeneratePerAlgorithm;
    let mut h = Harness::with_config(config);
    h.client.connect(common::URL).unwrap();
    h.open();

    // Act
    let requests = run_suite(&mut h, &[Algorithm::Bubble, Algorithm::Shell], true);

    // Assert
    assert_ne!(requests[0]["data"], requests[1]["data"]);
    assert_eq!(h.notifier.suites.lock().unwrap().len(), 1);
}

#[test]
fn test_results_without_request_id_match_by_algorithm_name() {
    let mut h = Harness::connected();

    run_suite(&mut h, &[Algorithm::Insertion, Algorithm::Quick], false);

    assert_eq!(h.recorder.algorithms(), vec![Algorithm::Insertion, Algorithm::Quick]);
    assert_eq!(h.notifier.suites.lock().unwrap().len(), 1);
}

#[test]
fn test_duplicate_and_foreign_results_are_ignored() {
    // Arrange
    let mut h = Harness::connected();
    h.client
        .start_benchmark(DatasetParams::default(), &[Algorithm::Heap, Algorithm::Merge])
        .unwrap();
    let first = next_request(&mut h);

    // Act: a result for an algorithm that is not current, then the real one
    // twice
    h.frame(r#"{"type":"PERFORMANCE_RESULT","algorithm":"BUBBLE","time":1,"comparisons":1,"swaps":1}"#);
    h.frame(&reply(&first, true));
    h.frame(&reply(&first, true));

    // Assert
    assert_eq!(h.recorder.algorithms(), vec![Algorithm::Heap]);
    assert!(h.notifier.suites.lock().unwrap().is_empty());
    assert!(h.client.core().benchmark().is_running());
}

#[test]
fn test_failed_send_retries_the_same_step() {
    // Arrange
    let mut h = Harness::connected();
    h.client
        .start_benchmark(DatasetParams::default(), &[Algorithm::Quick])
        .unwrap();

    // Act: the first transmit fails, the retry goes out
    h.transport.fail_sends(true);
    h.fire(TimerKind::BenchmarkSettle);
    h.transport.fail_sends(false);
    assert_eq!(h.scheduler.pending_of(TimerKind::BenchmarkRetry).len(), 1);
    h.fire(TimerKind::BenchmarkRetry);

    // Assert
    let sent = h.sent_json();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["algorithm"], "QUICK");
    assert!(matches!(
        h.notifier.errors.lock().unwrap()[0],
        ClientError::SendFailure { .. }
    ));

    h.frame(&reply(&sent[0], true));
    assert_eq!(h.notifier.suites.lock().unwrap().len(), 1);
}

#[test]
fn test_service_error_mid_suite_discards_partial_results() {
    // Arrange
    let mut h = Harness::connected();
    h.client
        .start_benchmark(DatasetParams::default(), &[Algorithm::Heap, Algorithm::Merge])
        .unwrap();
    let first = next_request(&mut h);
    h.frame(&reply(&first, true));

    // Act
    h.frame(r#"{"type":"ERROR","message":"sorter crashed","code":"INTERNAL"}"#);

    // Assert
    assert!(!h.client.core().benchmark().is_running());
    assert!(!h.client.core().timers().is_armed(TimerKind::BenchmarkAdvance));
    assert!(h.notifier.suites.lock().unwrap().is_empty());
    assert!(matches!(
        h.notifier.errors.lock().unwrap().last(),
        Some(ClientError::Application { .. })
    ));
}

#[test]
fn test_restarting_a_suite_replaces_the_running_one() {
    // Arrange
    let mut h = Harness::connected();
    h.client
        .start_benchmark(DatasetParams::default(), &[Algorithm::Heap, Algorithm::Merge])
        .unwrap();
    let stale = next_request(&mut h);

    // Act
    h.client
        .start_benchmark(DatasetParams::default(), &[Algorithm::Shell])
        .unwrap();
    h.frame(&reply(&stale, true));

    // Assert: the old suite's result is not recorded
    assert!(h.recorder.algorithms().is_empty());
    assert_eq!(h.client.core().benchmark().current_algorithm(), Some(Algorithm::Shell));
}

#[test]
fn test_invalid_suites_are_rejected() {
    let mut h = Harness::connected();

    let empty = h.client.start_benchmark(DatasetParams::default(), &[]);
    let zero = h.client.start_benchmark(
        DatasetParams {
            size: 0,
            ..DatasetParams::default()
        },
        &[Algorithm::Quick],
    );

    assert!(matches!(empty, Err(ClientError::InvalidRequest(_))));
    assert!(matches!(zero, Err(ClientError::InvalidRequest(_))));
    assert!(!h.client.core().benchmark().is_running());
}

#[test]
fn test_repeated_algorithm_is_rejected_before_anything_is_sent() {
    // Arrange
    let mut h = Harness::connected();
    let running = run_suite(&mut h, &[Algorithm::Heap], true);

    // Act
    let repeated = h
        .client
        .start_benchmark(DatasetParams::default(), &[Algorithm::Quick, Algorithm::Quick]);

    // Assert
    assert!(matches!(repeated, Err(ClientError::InvalidRequest(_))));
    assert!(!h.client.core().benchmark().is_running());
    assert!(h.scheduler.pending_of(TimerKind::BenchmarkSettle).is_empty());
    assert_eq!(h.transport.sent().len(), running.len());
    assert_eq!(h.notifier.suites.lock().unwrap().len(), 1);
}

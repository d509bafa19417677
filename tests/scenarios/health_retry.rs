//! Health verification scenarios: retry accounting, early exit,
//! address-resolution short-circuit
//!
//! Tests run with a paused tokio clock, so virtual elapsed time counts
//! the verifier's sleeps exactly.

use crate::helpers::*;
use atlas_pipeline::cluster::HealthVerifier;
use atlas_pipeline::core::config::PipelineConfig;
use atlas_pipeline::core::error::PipelineError;
use atlas_pipeline::core::retry::RetryPolicy;
use std::time::Duration;
use tokio::time::Instant;

fn config() -> PipelineConfig {
    PipelineConfig::default()
}

/// attempts=5, delay=2s, probes fail 4 times then succeed: success with
/// exactly 5 probes and 4 sleeps of 2s.
#[tokio::test(start_paused = true)]
async fn test_succeeds_after_transient_failures() {
    let config = config();
    let executor = FakeExecutor::new(vec![ok("192.168.49.2\n")]);
    let probe = FakeProbe::new(vec![false, false, false, false, true]);
    let policy = RetryPolicy::fixed(5, Duration::from_secs(2));

    let start = Instant::now();
    HealthVerifier::new(&executor, &probe, &config)
        .with_policy(policy)
        .verify()
        .await
        .unwrap();

    assert_eq!(probe.calls(), 5);
    assert_eq!(start.elapsed(), Duration::from_secs(8));
}

/// Five failures exhaust the budget: exactly 5 probes and 4 sleeps -
/// no sleep after the final attempt.
#[tokio::test(start_paused = true)]
async fn test_exhaustion_after_max_attempts() {
    let config = config();
    let executor = FakeExecutor::new(vec![ok("192.168.49.2\n")]);
    let probe = FakeProbe::new(vec![false, false, false, false, false]);
    let policy = RetryPolicy::fixed(5, Duration::from_secs(2));

    let start = Instant::now();
    let err = HealthVerifier::new(&executor, &probe, &config)
        .with_policy(policy)
        .verify()
        .await
        .unwrap_err();

    match err {
        PipelineError::HealthCheckExhausted { attempts, url } => {
            assert_eq!(attempts, 5);
            assert_eq!(url, "http://192.168.49.2:30080/health");
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
    assert_eq!(probe.calls(), 5);
    assert_eq!(start.elapsed(), Duration::from_secs(8));
}

/// A healthy first answer exits early: one probe, zero sleeps.
#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_skips_sleeping() {
    let config = config();
    let executor = FakeExecutor::new(vec![ok("192.168.49.2\n")]);
    let probe = FakeProbe::new(vec![true]);

    let start = Instant::now();
    HealthVerifier::new(&executor, &probe, &config)
        .verify()
        .await
        .unwrap();

    assert_eq!(probe.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

/// Address-resolution failure short-circuits: zero probes, zero sleeps.
/// Retries are reserved for a reachable-but-not-ready endpoint.
#[tokio::test(start_paused = true)]
async fn test_address_failure_short_circuits() {
    let config = config();
    let executor = FakeExecutor::new(vec![failed(80, "not running")]);
    let probe = FakeProbe::healthy();

    let start = Instant::now();
    let err = HealthVerifier::new(&executor, &probe, &config)
        .verify()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::AddressUnresolved { .. }));
    assert_eq!(probe.calls(), 0);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

/// Output with no address in it is as fatal as a failed query.
#[tokio::test(start_paused = true)]
async fn test_unparseable_address_output_is_fatal() {
    let config = config();
    let executor = FakeExecutor::new(vec![ok("no ip for you\n")]);
    let probe = FakeProbe::healthy();

    let err = HealthVerifier::new(&executor, &probe, &config)
        .verify()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::AddressUnresolved { .. }));
    assert_eq!(probe.calls(), 0);
}

/// The probed URL is built from the resolved address, configured port,
/// and health path.
#[tokio::test]
async fn test_probes_resolved_address_and_port() {
    let mut config = config();
    config.node_port = 31000;
    config.health_path = "/healthz".to_string();
    let executor = FakeExecutor::new(vec![ok("10.11.12.13\n")]);
    let probe = FakeProbe::new(vec![true]);

    HealthVerifier::new(&executor, &probe, &config)
        .verify()
        .await
        .unwrap();

    assert_eq!(probe.urls(), vec!["http://10.11.12.13:31000/healthz"]);
}

/// The address is resolved once, not per attempt.
#[tokio::test(start_paused = true)]
async fn test_address_resolved_once() {
    let config = config();
    let executor = FakeExecutor::new(vec![ok("192.168.49.2\n")]);
    let probe = FakeProbe::new(vec![false, false, true]);

    HealthVerifier::new(&executor, &probe, &config)
        .verify()
        .await
        .unwrap();

    assert_eq!(executor.call_count(), 1);
    assert_eq!(probe.calls(), 3);
}

mod common;

use std::time::{Duration, Instant};

use br_ledger::{Error, HttpAdminRpc, LedgerAdvancer};
use common::{advancer_with, config_with_interval, MockRpc};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_count_matches_successes_for_any_interleaving() {
    let sequences: [&[bool]; 4] = [
        &[true, false, true, true, false],
        &[false, false, true, false, true, true, true],
        &[true, true, true, false, false, false],
        &[false, false, false],
    ];

    for sequence in sequences {
        let (advancer, _) = advancer_with(
            MockRpc::new().with_script(sequence),
            config_with_interval(1000),
        );
        for _ in sequence {
            let _ = advancer.advance_once().await;
        }

        let expected = sequence.iter().filter(|ok| **ok).count() as u64;
        assert_eq!(advancer.status().await.advanced_count, expected);
    }
}

#[tokio::test]
async fn test_success_clears_previous_error() {
    let (advancer, _) = advancer_with(
        MockRpc::new().with_script(&[false, true]),
        config_with_interval(1000),
    );

    assert!(advancer.advance_once().await.is_err());
    let status = advancer.status().await;
    assert_eq!(status.last_error.as_deref(), Some("Admin RPC request failed: connection refused"));

    assert_eq!(advancer.advance_once().await.unwrap(), 1);
    let status = advancer.status().await;
    assert_eq!(status.last_error, None);
    assert_eq!(status.advanced_count, 1);
    assert_eq!(status.last_ledger_index, 1);
}

#[tokio::test]
async fn test_failure_leaves_last_index_untouched() {
    let (advancer, _) = advancer_with(
        MockRpc::new().with_script(&[true, true, false]),
        config_with_interval(1000),
    );

    advancer.advance_once().await.unwrap();
    advancer.advance_once().await.unwrap();
    assert!(advancer.advance_once().await.is_err());

    let status = advancer.status().await;
    assert_eq!(status.advanced_count, 2);
    assert_eq!(status.last_ledger_index, 2);
    assert!(status.last_error.is_some());
}

#[tokio::test]
async fn test_first_attempt_is_immediate() {
    let (advancer, rpc) = advancer_with(MockRpc::new(), config_with_interval(60_000));
    let cancel = CancellationToken::new();

    let task = {
        let advancer = advancer.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { advancer.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(rpc.calls(), 1);
    assert_eq!(advancer.status().await.advanced_count, 1);
    assert!(advancer.status().await.running);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("loop should stop promptly")
        .unwrap();
    assert!(!advancer.status().await.running);
}

#[tokio::test]
async fn test_periodic_ticks() {
    let (advancer, _) = advancer_with(MockRpc::new(), config_with_interval(100));
    let cancel = CancellationToken::new();

    let task = {
        let advancer = advancer.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { advancer.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(550)).await;
    cancel.cancel();
    task.await.unwrap();

    let count = advancer.status().await.advanced_count;
    assert!((5..=6).contains(&count), "unexpected advanced_count {count}");
}

#[tokio::test]
async fn test_slow_rpc_never_overlaps() {
    let call_duration = Duration::from_millis(150);
    let run_for = Duration::from_millis(1000);
    let (advancer, rpc) = advancer_with(
        MockRpc::new().with_delay(call_duration),
        config_with_interval(50),
    );
    let cancel = CancellationToken::new();

    let task = {
        let advancer = advancer.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { advancer.run(cancel).await })
    };

    tokio::time::sleep(run_for).await;
    cancel.cancel();
    task.await.unwrap();

    assert_eq!(rpc.max_in_flight(), 1);
    let completed = advancer.status().await.advanced_count;
    let bound = (run_for.as_millis() / call_duration.as_millis()) as u64;
    assert!(completed >= 1);
    assert!(completed <= bound, "{completed} calls completed, bound {bound}");
}

#[tokio::test]
async fn test_errors_never_stop_the_loop() {
    let (advancer, rpc) = advancer_with(MockRpc::failing(), config_with_interval(50));
    let cancel = CancellationToken::new();

    let task = {
        let advancer = advancer.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { advancer.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!task.is_finished());
    cancel.cancel();
    task.await.unwrap();

    let status = advancer.status().await;
    assert!(rpc.calls() >= 3);
    assert_eq!(status.advanced_count, 0);
    assert!(status.last_error.is_some());
}

#[tokio::test]
async fn test_no_attempt_after_cancellation() {
    let (advancer, rpc) = advancer_with(MockRpc::new(), config_with_interval(50));
    let cancel = CancellationToken::new();

    let task = {
        let advancer = advancer.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { advancer.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(120)).await;
    cancel.cancel();
    task.await.unwrap();
    let calls = rpc.calls();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(rpc.calls(), calls);
}

#[tokio::test]
async fn test_already_cancelled_run_makes_no_call() {
    let (advancer, rpc) = advancer_with(MockRpc::new(), config_with_interval(50));
    let cancel = CancellationToken::new();
    cancel.cancel();

    advancer.run(cancel).await;
    assert_eq!(rpc.calls(), 0);
}

#[tokio::test]
async fn test_ready_after_startup_failures() {
    let (advancer, rpc) = advancer_with(
        MockRpc::new().with_script(&[false, false, true]),
        config_with_interval(1000),
    );

    advancer
        .wait_until_ready(Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(rpc.calls(), 3);
    // Readiness probes are not advancements.
    assert_eq!(advancer.status().await.advanced_count, 0);
    assert_eq!(advancer.status().await.last_error, None);
}

#[tokio::test]
async fn test_ready_timeout_against_dead_endpoint() {
    // Nothing listens on port 1.
    let rpc = HttpAdminRpc::new("http://127.0.0.1:1").unwrap();
    let advancer = LedgerAdvancer::new(rpc, config_with_interval(1000));

    let started = Instant::now();
    let result = advancer.wait_until_ready(Duration::from_secs(2)).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(Error::ReadyTimeout(_))));
    assert!(elapsed >= Duration::from_secs(2), "returned after {elapsed:?}");
    assert!(
        elapsed <= Duration::from_millis(2500),
        "returned after {elapsed:?}"
    );
}

#[tokio::test]
async fn test_ready_timeout_against_hanging_endpoint() {
    let (advancer, _) = advancer_with(
        MockRpc::new().with_delay(Duration::from_secs(10)),
        config_with_interval(1000),
    );

    let started = Instant::now();
    let result = advancer.wait_until_ready(Duration::from_secs(1)).await;

    assert!(matches!(result, Err(Error::ReadyTimeout(_))));
    assert!(started.elapsed() < Duration::from_millis(1500));
}

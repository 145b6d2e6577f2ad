// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{ErrorKind, PollerConfig, ReconcilingPoller, SdnError};

type FetchResult = Result<Vec<u32>, SdnError>;

// Replay `script` one result per fetch, repeating the last one forever.
fn start_scripted_poller(
    config: PollerConfig,
    script: Vec<FetchResult>,
    fetch_delay: Option<Duration>,
) -> (ReconcilingPoller<Vec<u32>>, Arc<AtomicUsize>) {
    let fetch_count = Arc::new(AtomicUsize::new(0));
    let script = Arc::new(Mutex::new(VecDeque::from(script)));
    let counter = fetch_count.clone();
    let poller = ReconcilingPoller::start("test", config, move || {
        let counter = counter.clone();
        let script = script.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = fetch_delay {
                tokio::time::sleep(delay).await;
            }
            let mut script = script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        }
    })
    .unwrap();
    (poller, fetch_count)
}

fn upstream_down() -> SdnError {
    SdnError::new(ErrorKind::UpstreamUnavailable, "refused".to_string())
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_equal_values_published_once() {
    let (poller, fetch_count) = start_scripted_poller(
        PollerConfig::new(1000, 0),
        vec![Ok(vec![1, 2]), Ok(vec![1, 2])],
        None,
    );
    let mut rx = poller.subscribe();

    sleep_ms(3500).await;

    assert_eq!(fetch_count.load(Ordering::SeqCst), 4);
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.generation, 1);
    assert_eq!(state.value(), Some(&vec![1, 2]));
    assert_eq!(state.error, None);

    sleep_ms(2000).await;
    assert!(!rx.has_changed().unwrap());
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_changed_value_is_published() {
    let (poller, _) = start_scripted_poller(
        PollerConfig::new(1000, 0),
        vec![Ok(vec![1]), Ok(vec![1]), Ok(vec![1, 2])],
        None,
    );

    sleep_ms(1500).await;
    assert_eq!(poller.state().generation, 1);

    sleep_ms(1000).await;
    let state = poller.state();
    assert_eq!(state.generation, 2);
    assert_eq!(state.value(), Some(&vec![1, 2]));
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_last_good_value() {
    let (poller, fetch_count) = start_scripted_poller(
        PollerConfig::new(1000, 0),
        vec![Ok(vec![1]), Err(upstream_down()), Ok(vec![1])],
        None,
    );
    let mut rx = poller.subscribe();

    sleep_ms(1500).await;
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.value(), Some(&vec![1]));
    assert_eq!(
        state.error.map(|e| e.kind()),
        Some(ErrorKind::UpstreamUnavailable)
    );
    assert_eq!(state.generation, 1);

    // Loop keeps running and recovers
    sleep_ms(1000).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 3);
    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.value(), Some(&vec![1]));
    assert_eq!(state.error, None);
    assert_eq!(state.generation, 1);
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_first_fetch_failure_has_no_value() {
    let (poller, _) = start_scripted_poller(
        PollerConfig::new(1000, 0),
        vec![Err(upstream_down())],
        None,
    );

    sleep_ms(10).await;
    let state = poller.state();
    assert!(state.value.is_none());
    assert!(state.error.is_some());
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_fetch_and_notification() {
    let (poller, fetch_count) = start_scripted_poller(
        PollerConfig::new(1000, 0),
        vec![Ok(vec![1]), Ok(vec![2]), Ok(vec![3])],
        None,
    );
    let rx = poller.subscribe();

    sleep_ms(1500).await;
    poller.stop().await;
    let count = fetch_count.load(Ordering::SeqCst);
    let generation = rx.borrow().generation;

    sleep_ms(5000).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), count);
    assert_eq!(rx.borrow().generation, generation);
    assert_eq!(generation, 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_in_flight_fetch() {
    let (poller, fetch_count) = start_scripted_poller(
        PollerConfig::new(1000, 0),
        vec![Ok(vec![1])],
        Some(Duration::from_millis(3000)),
    );
    let rx = poller.subscribe();

    sleep_ms(100).await;
    assert!(poller.is_fetching());
    poller.stop().await;

    sleep_ms(5000).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 1);
    assert!(rx.borrow().value.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_ticks_dropped_while_fetch_in_flight() {
    let (poller, fetch_count) = start_scripted_poller(
        PollerConfig::new(1000, 0),
        vec![Ok(vec![1])],
        Some(Duration::from_millis(2500)),
    );

    sleep_ms(500).await;
    assert!(poller.is_fetching());
    assert!(!poller.request_refresh());

    // Ticks missed during first fetch collapse into one fetch at 2500ms
    sleep_ms(3500).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 2);

    sleep_ms(3400).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 3);
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_min_gap_suppress_fetch() {
    let (poller, fetch_count) = start_scripted_poller(
        PollerConfig::new(100, 1000),
        vec![Ok(vec![1])],
        None,
    );

    sleep_ms(2550).await;
    // 0ms, 1000ms and 2000ms
    assert_eq!(fetch_count.load(Ordering::SeqCst), 3);
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_request_refresh() {
    let (poller, fetch_count) = start_scripted_poller(
        PollerConfig::new(10000, 0),
        vec![Ok(vec![1]), Ok(vec![2])],
        None,
    );

    sleep_ms(100).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 1);
    assert!(poller.request_refresh());

    sleep_ms(100).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 2);
    assert_eq!(poller.state().value(), Some(&vec![2]));
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_request_refresh_subject_to_min_gap() {
    let (poller, fetch_count) = start_scripted_poller(
        PollerConfig::new(10000, 1000),
        vec![Ok(vec![1])],
        None,
    );

    sleep_ms(100).await;
    assert!(poller.request_refresh());
    sleep_ms(100).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 1);

    sleep_ms(1000).await;
    assert!(poller.request_refresh());
    sleep_ms(100).await;
    assert_eq!(fetch_count.load(Ordering::SeqCst), 2);
    poller.stop().await;
}

#[tokio::test]
async fn test_zero_interval_rejected() {
    let result = ReconcilingPoller::start(
        "test",
        PollerConfig::new(0, 0),
        || async { Ok(vec![1u32]) },
    );

    assert_eq!(
        result.err().map(|e| e.kind()),
        Some(ErrorKind::InvalidArgument)
    );
}

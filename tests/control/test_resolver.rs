//! Tests for session ID resolution

#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use common::{connect, init_logging, settle, test_options, wait_for};
use headless_console::{ErrorKind, HeadlessError, HeadlessEvent, HeadlessOptions};

#[tokio::test(start_paused = true)]
async fn test_session_id_resolves_on_first_answer() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let resolve = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });

    console.answer_session_id("S-abc").await;

    let session_id = resolve.await.unwrap().unwrap().unwrap();
    assert_eq!(session_id.as_str(), "S-abc");
    assert_eq!(client.session_id_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_answers_are_retried() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let resolve = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });

    console.answer_session_id("Loading...").await;
    console.answer_session_id("No world is focused").await;
    settle().await;
    assert_eq!(client.session_id_attempts(), 2);

    console.answer_session_id("S-late").await;

    let session_id = resolve.await.unwrap().unwrap().unwrap();
    assert_eq!(session_id.as_str(), "S-late");
    assert_eq!(client.session_id_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cached_session_id_needs_no_command() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let resolve = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });
    console.answer_session_id("S-abc").await;
    resolve.await.unwrap().unwrap();

    let again = client.get_session_id().await.unwrap().unwrap();
    assert_eq!(again.as_str(), "S-abc");
    console.expect_silence().await;
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_cycle() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });

    console.answer_session_id("S-shared").await;
    console.expect_silence().await;

    let first = first.await.unwrap().unwrap().unwrap();
    let second = second.await.unwrap().unwrap().unwrap();
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_emits_error_and_resets() {
    init_logging();
    let options = HeadlessOptions::builder()
        .command_timeout(None)
        .session_id_max_attempts(2)
        .session_id_retry_delay(Duration::from_millis(100))
        .build();
    let (client, mut console) = connect(options);
    let mut events = client.take_event_receiver().unwrap();

    let resolve = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });

    for _ in 0..3 {
        console.answer_session_id("Loading...").await;
    }

    assert_eq!(resolve.await.unwrap().unwrap(), None);
    let event = wait_for(&mut events, |event| matches!(event, HeadlessEvent::Error { .. })).await;
    assert!(matches!(
        event,
        HeadlessEvent::Error {
            kind: ErrorKind::SessionResolutionExhausted,
            ..
        }
    ));
    assert_eq!(client.session_id_attempts(), 0);
    assert_eq!(client.cached_session_id(), None);

    // No further attempts until someone asks again
    console.expect_silence().await;

    let mut repeated = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, HeadlessEvent::Error { .. }) {
            repeated += 1;
        }
    }
    assert_eq!(repeated, 0, "exhaustion must be reported exactly once");
}

#[tokio::test(start_paused = true)]
async fn test_default_budget_allows_fifteen_rejections() {
    init_logging();
    let (client, mut console) = connect(HeadlessOptions::builder().command_timeout(None).build());

    let resolve = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });

    for _ in 0..15 {
        console.answer_session_id("Loading...").await;
    }
    settle().await;
    assert_eq!(client.session_id_attempts(), 15);

    console.answer_session_id("S-just-in-time").await;
    let session_id = resolve.await.unwrap().unwrap().unwrap();
    assert_eq!(session_id.as_str(), "S-just-in-time");
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_attempt_counts_as_rejection() {
    init_logging();
    let options = HeadlessOptions::builder()
        .command_timeout(Some(Duration::from_secs(1)))
        .session_id_retry_delay(Duration::from_millis(10))
        .build();
    let (client, mut console) = connect(options);

    let resolve = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });

    console.expect_command("sessionId").await;
    console.answer_session_id("S-second-try").await;

    let session_id = resolve.await.unwrap().unwrap().unwrap();
    assert_eq!(session_id.as_str(), "S-second-try");
}

#[tokio::test(start_paused = true)]
async fn test_failed_resolution_leaves_client_not_ready() {
    init_logging();
    let options = HeadlessOptions::builder()
        .command_timeout(None)
        .session_id_max_attempts(0)
        .build();
    let (client, mut console) = connect(options);
    let mut events = client.take_event_receiver().unwrap();

    console.boot().await;
    console.answer_session_id("Starting...").await;
    wait_for(&mut events, |event| matches!(event, HeadlessEvent::Error { .. })).await;

    assert!(client.is_running());
    assert!(!client.is_ready());

    // A later request starts over and readiness can still be established
    let resolve = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });
    console.answer_session_id("S-now").await;
    assert_eq!(resolve.await.unwrap().unwrap().unwrap().as_str(), "S-now");
}

#[tokio::test(start_paused = true)]
async fn test_closed_engine_fails_resolution() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let resolve = tokio::spawn({
        let client = client.clone();
        async move { client.get_session_id().await }
    });

    console.expect_command("sessionId").await;
    console.close_output();

    assert!(matches!(resolve.await.unwrap(), Err(HeadlessError::Closed)));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_last_handle_stops_readiness_retries() {
    init_logging();
    let options = HeadlessOptions::builder()
        .command_timeout(None)
        .session_id_retry_delay(Duration::from_secs(60))
        .build();
    let (client, mut console) = connect(options);

    console.boot().await;
    console.answer_session_id("Starting...").await;
    settle().await;
    assert_eq!(client.session_id_attempts(), 1);

    // The readiness check is now waiting to retry; it must not keep the engine up
    drop(client);
    assert_eq!(console.next_command().await, None);
}

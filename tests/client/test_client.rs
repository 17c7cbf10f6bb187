//! Integration tests for `HeadlessClient`
//!
//! Drives the engine through a scripted console over in-memory pipes.

#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use common::{connect, init_logging, settle, test_options, wait_for};
use headless_console::transport::PROMPT_IDLE_TIMEOUT;
use headless_console::{
    AccessLevel, HeadlessClient, HeadlessError, HeadlessEvent, HeadlessOptions, PipeTransport,
    WorldRef,
};
use tokio_test::{assert_pending, assert_ready};

#[tokio::test(start_paused = true)]
async fn test_idle_command_is_written_immediately() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let pending = client.submit("status").unwrap();
    console.expect_command("status").await;
    console.send("World: Lobby, Users: 1").await;

    assert_eq!(pending.await.unwrap(), "World: Lobby, Users: 1");
}

#[tokio::test(start_paused = true)]
async fn test_commands_resolve_in_submission_order() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let a = client.submit("a").unwrap();
    let b = client.submit("b").unwrap();
    let c = client.submit("c").unwrap();

    console.expect_command("a").await;
    console.expect_silence().await;
    console.send("ra").await;

    console.expect_command("b").await;
    console.expect_silence().await;
    console.send("rb").await;

    console.expect_command("c").await;
    console.send("rc").await;

    assert_eq!(a.await.unwrap(), "ra");
    assert_eq!(b.await.unwrap(), "rb");
    assert_eq!(c.await.unwrap(), "rc");
}

#[tokio::test(start_paused = true)]
async fn test_queued_command_stays_pending_until_head_answers() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let mut head = client.submit("users").unwrap();
    let mut second = client.submit("worlds").unwrap();

    console.expect_command("users").await;
    settle().await;
    assert_pending!(futures::poll!(&mut head));
    assert_pending!(futures::poll!(&mut second));
    assert!(!client.can_send());
    assert_eq!(client.state().queued, 1);

    console.send("alice").await;
    settle().await;
    assert_eq!(assert_ready!(futures::poll!(&mut head)).unwrap(), "alice");
    assert_pending!(futures::poll!(&mut second));

    console.expect_command("worlds").await;
    console.send("0. Lobby").await;
    assert_eq!(second.await.unwrap(), "0. Lobby");

    settle().await;
    assert!(client.can_send());
}

#[tokio::test(start_paused = true)]
async fn test_prompt_echoes_are_not_responses() {
    init_logging();
    let (client, mut console) = connect(test_options());
    let mut events = client.take_event_receiver().unwrap();

    let pending = client.submit("status").unwrap();
    console.expect_command("status").await;

    // Prompt printed without a trailing newline is released once the console idles
    console.send_raw(b"Lobby> ").await;
    tokio::time::sleep(PROMPT_IDLE_TIMEOUT * 3).await;
    wait_for(&mut events, |event| {
        matches!(event, HeadlessEvent::Message { line } if line == "Lobby> ")
    })
    .await;

    console.send("Lobby>").await;
    console.send("Name: Lobby").await;

    assert_eq!(pending.await.unwrap(), "Name: Lobby");
}

#[tokio::test(start_paused = true)]
async fn test_response_split_after_prompt_marker_is_not_cut() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let pending = client.submit("users").unwrap();
    console.expect_command("users").await;

    console.send_raw(b"Role changed: User ->").await;
    settle().await;
    console.send_raw(b" Admin\n").await;

    assert_eq!(pending.await.unwrap(), "Role changed: User -> Admin");
}

#[tokio::test(start_paused = true)]
async fn test_buffered_prompt_is_released_when_command_is_written() {
    init_logging();
    let (client, mut console) = connect(test_options());

    // The console answers long before it would count as idle
    console.send_raw(b"World> ").await;
    settle().await;

    let pending = client.submit("status").unwrap();
    console.expect_command("status").await;
    console.send("World: Lobby").await;

    assert_eq!(pending.await.unwrap(), "World: Lobby");
}

#[tokio::test(start_paused = true)]
async fn test_unsolicited_lines_are_broadcast_but_not_matched() {
    init_logging();
    let (client, mut console) = connect(test_options());
    let mut events = client.take_event_receiver().unwrap();

    console.send("Garbage collecting").await;
    wait_for(&mut events, |event| {
        matches!(event, HeadlessEvent::Message { line } if line == "Garbage collecting")
    })
    .await;

    let pending = client.submit("gc").unwrap();
    console.expect_command("gc").await;
    console.send("GC done").await;
    assert_eq!(pending.await.unwrap(), "GC done");
}

#[tokio::test(start_paused = true)]
async fn test_login_and_invite_render_console_lines() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let session = tokio::spawn({
        let client = client.clone();
        async move {
            let login = client.login("bot@example.com", "hunter2").await?;
            let invite = client.invite("friend").await?;
            Ok::<_, HeadlessError>((login, invite))
        }
    });

    console
        .expect_command(r#"login "bot@example.com" "hunter2""#)
        .await;
    console.send("Logged in successfully!").await;
    console.expect_command(r#"invite "friend""#).await;
    console.send("Invite sent!").await;

    let (login, invite) = session.await.unwrap().unwrap();
    assert_eq!(login, "Logged in successfully!");
    assert_eq!(invite, "Invite sent!");
}

#[tokio::test(start_paused = true)]
async fn test_invite_queued_behind_login_with_echo_lines() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let mut login = Box::pin(client.login("a", "b"));
    let mut invite = Box::pin(client.invite("c"));
    assert_pending!(futures::poll!(&mut login));
    assert_pending!(futures::poll!(&mut invite));

    console.expect_command(r#"login "a" "b""#).await;
    console.expect_silence().await;
    console.send("Lobby>").await;
    console.send("Logged in!").await;

    console.expect_command(r#"invite "c""#).await;
    console.send("Lobby>").await;
    console.send("Invite Sent!").await;

    assert_eq!(login.await.unwrap(), "Logged in!");
    assert_eq!(invite.await.unwrap(), "Invite Sent!");
}

#[tokio::test(start_paused = true)]
async fn test_facade_methods_write_expected_lines() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let script = tokio::spawn({
        let client = client.clone();
        async move {
            client.focus(2u32).await?;
            client.focus(WorldRef::from("My World")).await?;
            client.start_world_template("SpaceWorld").await?;
            client.access_level(AccessLevel::FriendsOfFriends).await?;
            client.save_config(None).await?;
            client.save_config(Some("backup.json")).await?;
            client.fetch_session_id().await?;
            client.close_world().await
        }
    });

    for expected in [
        "focus 2",
        r#"focus "My World""#,
        "startWorldTemplate SpaceWorld",
        r#"accessLevel "FriendsOfFriends""#,
        "saveConfig",
        "saveConfig backup.json",
        "sessionID",
        "close",
    ] {
        console.expect_command(expected).await;
        console.send("ok").await;
    }

    assert_eq!(script.await.unwrap().unwrap(), "ok");
}

#[tokio::test(start_paused = true)]
async fn test_invalid_arguments_are_rejected_before_writing() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let err = client.kick("evil\" user").await.unwrap_err();
    assert!(matches!(err, HeadlessError::InvalidArgument(_)));

    let err = client.start_world_template("two words").await.unwrap_err();
    assert!(matches!(err, HeadlessError::InvalidArgument(_)));

    let err = client.submit("status\nshutdown").unwrap_err();
    assert!(matches!(err, HeadlessError::InvalidArgument(_)));

    let pending = client.submit("status").unwrap();
    console.expect_command("status").await;
    console.send("fine").await;
    assert_eq!(pending.await.unwrap(), "fine");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fails_head_and_advances() {
    init_logging();
    let options = HeadlessOptions::builder()
        .command_timeout(Some(Duration::from_secs(1)))
        .build();
    let (client, mut console) = connect(options);

    let stalled = client.submit("restart").unwrap();
    let next = client.submit("status").unwrap();

    console.expect_command("restart").await;
    match stalled.await {
        Err(HeadlessError::Timeout { command, after }) => {
            assert_eq!(command, "restart");
            assert_eq!(after, Duration::from_secs(1));
        }
        other => panic!("expected timeout, got {other:?}"),
    }

    console.expect_command("status").await;
    console.send("running").await;
    assert_eq!(next.await.unwrap(), "running");
}

#[tokio::test(start_paused = true)]
async fn test_per_call_timeout_overrides_default() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let quick = client
        .submit_with_timeout("users", Some(Duration::from_millis(200)))
        .unwrap();
    console.expect_command("users").await;

    let err = quick.await.unwrap_err();
    assert!(matches!(err, HeadlessError::Timeout { .. }));
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_queued_command_skips_it() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let a = client.submit("a").unwrap();
    let b = client.submit("b").unwrap();
    let c = client.submit("c").unwrap();

    console.expect_command("a").await;
    b.cancel();
    settle().await;
    console.send("ra").await;

    console.expect_command("c").await;
    console.send("rc").await;

    assert_eq!(a.await.unwrap(), "ra");
    assert!(matches!(b.await, Err(HeadlessError::Cancelled(text)) if text == "b"));
    assert_eq!(c.await.unwrap(), "rc");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_in_flight_command_advances_queue() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let a = client.submit("a").unwrap();
    let b = client.submit("b").unwrap();

    console.expect_command("a").await;
    a.cancel();

    assert!(matches!(a.await, Err(HeadlessError::Cancelled(_))));
    console.expect_command("b").await;
    console.send("rb").await;
    assert_eq!(b.await.unwrap(), "rb");
}

#[tokio::test(start_paused = true)]
async fn test_dropped_handle_keeps_its_place() {
    init_logging();
    let (client, mut console) = connect(test_options());

    drop(client.submit("a").unwrap());
    let b = client.submit("b").unwrap();

    console.expect_command("a").await;
    console.send("ra").await;
    console.expect_command("b").await;
    console.send("rb").await;

    assert_eq!(b.await.unwrap(), "rb");
}

#[tokio::test(start_paused = true)]
async fn test_stream_end_fails_pending_commands() {
    init_logging();
    let (client, mut console) = connect(test_options());
    let mut events = client.take_event_receiver().unwrap();

    let a = client.submit("a").unwrap();
    let b = client.submit("b").unwrap();
    console.expect_command("a").await;

    console.close_output();

    assert!(matches!(a.await, Err(HeadlessError::Closed)));
    assert!(matches!(b.await, Err(HeadlessError::Closed)));
    wait_for(&mut events, |event| matches!(event, HeadlessEvent::Closed)).await;
    assert!(client.is_closed());

    let late = client.run_command("status").await;
    assert!(matches!(late, Err(HeadlessError::Closed)));
}

#[tokio::test(start_paused = true)]
async fn test_close_stops_engine_and_transport() {
    init_logging();
    let (client, mut console) = connect(test_options());

    let pending = client.submit("save").unwrap();
    console.expect_command("save").await;

    client.close().await.unwrap();
    assert!(matches!(pending.await, Err(HeadlessError::Closed)));
    assert!(client.is_closed());

    // Writer side was shut down
    assert_eq!(console.next_command().await, None);

    // Closing twice is fine
    client.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_dropping_every_handle_stops_engine() {
    init_logging();
    let (client, mut console) = connect(test_options());

    drop(client);
    assert_eq!(console.next_command().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_events_stream_ends_after_closed() {
    use futures::StreamExt;

    init_logging();
    let (client, mut console) = connect(test_options());
    let events = client.events();

    console.send("hello").await;
    console.close_output();

    let collected: Vec<_> = events.collect().await;
    assert_eq!(
        collected,
        vec![
            HeadlessEvent::Message {
                line: "hello".to_string()
            },
            HeadlessEvent::Closed,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_event_receiver_can_be_taken_once() {
    let (client, _console) = connect(test_options());

    assert!(client.take_event_receiver().is_some());
    assert!(client.take_event_receiver().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_initial_state() {
    let (client, _console) = connect(HeadlessOptions::default());

    assert!(!client.is_running());
    assert!(client.is_starting());
    assert!(!client.is_ready());
    assert!(!client.is_log_mode());
    assert!(client.can_send());
    assert_eq!(client.compatibility_hash(), None);
    assert_eq!(client.machine_id(), None);
    assert_eq!(client.cached_session_id(), None);
    assert_eq!(client.options().session_id_max_attempts, 15);
}

#[tokio::test]
async fn test_zero_event_capacity_fails_construction() {
    let (reader, _console_output) = tokio::io::duplex(64);
    let (_console_input, writer) = tokio::io::duplex(64);
    let options = HeadlessOptions::builder().event_capacity(0).build();

    let err = HeadlessClient::with_transport(PipeTransport::new(reader, writer), options).unwrap_err();
    assert!(matches!(err, HeadlessError::InvalidConfig(_)));
}

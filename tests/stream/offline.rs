use std::time::Duration;

use finnews_rs::stream::{LiveStreamBuilder, Phase, Scope, StreamError};
use finnews_rs::{NewsCategory, NewsSource};
use httpmock::Method::GET;
use tokio::time::timeout;

use crate::common::{client_for, setup_server};

const WAIT: Duration = Duration::from_secs(5);

fn sse_body() -> String {
    [
        ": connected\n\n",
        "data: {\"newsId\":\"fh-1\",\"headline\":\"One\"}\n\n",
        "data: {broken\n\n",
        "event: heartbeat\ndata: {}\n\n",
        "data: {\"newsId\":\"fh-2\",\"headline\":\"Two\"}\n\n",
    ]
    .concat()
}

#[tokio::test]
async fn counts_pushed_items_and_reconnects_when_the_server_hangs_up() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/news/stream")
            .query_param("source", "sec")
            .query_param("category", "earnings")
            .header("accept", "text/event-stream");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(sse_body());
    });

    let client = client_for(&server);
    let mut live = LiveStreamBuilder::new(&client)
        .source(Some(NewsSource::Sec))
        .category(Some(NewsCategory::Earnings))
        // far enough out that the test never sees the second attempt
        .initial_delay(Duration::from_secs(60))
        .start();

    let state = timeout(WAIT, live.wait_for(|s| s.phase == Phase::Reconnecting))
        .await
        .expect("stream never hung up")
        .expect("driver stopped");

    mock.assert_calls(1);
    assert_eq!(state.new_count, 2, "malformed and named events are skipped");
    assert_eq!(state.retry_count, 1);
    assert!(!state.connected);
    assert_eq!(state.last_error, Some(StreamError::Reconnecting));

    live.acknowledge();
    let state = timeout(WAIT, live.wait_for(|s| s.new_count == 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.phase, Phase::Reconnecting);

    live.stop().await;
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/news/stream");
        then.status(500).body("");
    });

    let client = client_for(&server);
    let mut live = LiveStreamBuilder::new(&client)
        .max_retries(3)
        .initial_delay(Duration::from_millis(10))
        .max_delay(Duration::from_millis(20))
        .start();

    let state = timeout(WAIT, live.wait_for(|s| s.phase == Phase::Failed))
        .await
        .expect("stream never gave up")
        .expect("driver stopped");

    assert_eq!(state.retry_count, 3);
    assert_eq!(state.last_error, Some(StreamError::MaxRetriesExceeded));

    // no timer is left behind
    tokio::time::sleep(Duration::from_millis(100)).await;
    mock.assert_calls(3);
    assert_eq!(live.state().phase, Phase::Failed);

    live.abort();
}

#[tokio::test]
async fn disabled_subscription_never_connects_until_enabled() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/news/stream");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(sse_body());
    });

    let client = client_for(&server);
    let mut live = LiveStreamBuilder::new(&client)
        .enabled(false)
        .initial_delay(Duration::from_secs(60))
        .start();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(live.state().phase, Phase::Idle);
    mock.assert_calls(0);

    live.enable();
    let state = timeout(WAIT, live.wait_for(|s| s.phase == Phase::Reconnecting))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.new_count, 2);
    mock.assert_calls(1);

    live.disable();
    let state = timeout(WAIT, live.wait_for(|s| s.phase == Phase::Disabled))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.new_count, 0);
    assert_eq!(state.retry_count, 0);

    live.stop().await;
}

#[tokio::test]
async fn rescoping_opens_a_new_connection_with_the_new_filters() {
    let server = setup_server();
    let all = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/news/stream")
            .query_param_missing("source");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(sse_body());
    });
    let fred = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/news/stream")
            .query_param("source", "fred");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body("data: {}\n\n");
    });

    let client = client_for(&server);
    let mut live = LiveStreamBuilder::new(&client)
        .initial_delay(Duration::from_secs(60))
        .start();

    timeout(WAIT, live.wait_for(|s| s.phase == Phase::Reconnecting))
        .await
        .unwrap()
        .unwrap();

    live.set_scope(Scope::new(Some(NewsSource::Fred), None));
    let state = timeout(
        WAIT,
        live.wait_for(|s| s.phase == Phase::Reconnecting && s.new_count == 1),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(state.retry_count, 1);
    all.assert_calls(1);
    fred.assert_calls(1);

    live.stop().await;
}

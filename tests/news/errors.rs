use std::time::Duration;

use finnews_rs::{Backoff, ErrorKind, NewsClient, NewsError, NewsItem, RetryConfig};
use httpmock::Method::GET;
use url::Url;

use crate::common::{client_for, fixture, setup_server};

#[tokio::test]
async fn error_body_message_and_code_are_surfaced() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/news/missing");
        then.status(404)
            .header("content-type", "application/json")
            .body(fixture("news_error", "not_found", "json"));
    });

    let client = client_for(&server);
    let err = client.news_detail("missing").await.unwrap_err();

    match &err {
        NewsError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(*status, 404);
            assert_eq!(code.as_deref(), Some("NOT_FOUND"));
            assert_eq!(message, "News item not found");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.code(), Some("NOT_FOUND"));
    assert_eq!(err.user_message(), "News item not found");
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_status_line() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/news");
        then.status(500).body("<html>boom</html>");
    });

    let client = client_for(&server);
    let err = client.news().fetch().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.user_message(), "HTTP 500: Internal Server Error");
    assert_eq!(err.code(), None);
}

#[tokio::test]
async fn success_false_on_2xx_is_a_protocol_failure() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/news/stats");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("news_error", "failed_envelope", "json"));
    });

    let client = client_for(&server);
    let err = client.news_stats().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.status(), Some(200));
    assert_eq!(err.code(), Some("UPSTREAM_DOWN"));
    assert_eq!(err.user_message(), "Upstream provider unavailable");
}

#[tokio::test]
async fn malformed_success_body_is_unknown_failure() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/news");
        then.status(200)
            .header("content-type", "application/json")
            .body("{\"success\": true, \"data\": [");
    });

    let client = client_for(&server);
    let err = client.news().fetch().await.unwrap_err();

    assert!(matches!(err, NewsError::Json(_)));
    assert_eq!(err.kind(), ErrorKind::Unknown);
}

#[tokio::test]
async fn paginated_response_without_meta_is_rejected() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/news");
        then.status(200)
            .header("content-type", "application/json")
            .body("{\"success\": true, \"data\": []}");
    });

    let client = client_for(&server);
    let err = client.news().fetch().await.unwrap_err();

    assert!(matches!(err, NewsError::Data(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    // nothing listens on the discard port
    let client = NewsClient::builder()
        .base_url(Url::parse("http://127.0.0.1:9/").unwrap())
        .retry_config(RetryConfig::disabled())
        .build()
        .unwrap();

    let err = client.news().fetch().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.user_message(), "Please check your network connection");
}

#[tokio::test]
async fn query_layer_retries_once_on_gateway_errors() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/news");
        then.status(503).body("");
    });

    let client = NewsClient::builder()
        .base_url(Url::parse(&server.base_url()).unwrap())
        .retry_config(RetryConfig {
            backoff: Backoff::Fixed(Duration::from_millis(5)),
            ..RetryConfig::default()
        })
        .build()
        .unwrap();

    let err = client.news().fetch().await.unwrap_err();

    mock.assert_calls(2);
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn per_call_retry_override_wins() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/news");
        then.status(503).body("");
    });

    let client = client_for(&server);
    let _ = client
        .news()
        .retry_policy(Some(RetryConfig {
            max_retries: 2,
            backoff: Backoff::Fixed(Duration::from_millis(5)),
            ..RetryConfig::default()
        }))
        .fetch()
        .await;

    mock.assert_calls(3);
}

#[tokio::test]
async fn raw_request_never_retries() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/news");
        then.status(503).body("");
    });

    let client = NewsClient::builder()
        .base_url(Url::parse(&server.base_url()).unwrap())
        .retry_config(RetryConfig {
            max_retries: 5,
            backoff: Backoff::Fixed(Duration::from_millis(5)),
            ..RetryConfig::default()
        })
        .build()
        .unwrap();

    let err = client
        .request::<Vec<NewsItem>>("api/v1/news", &[])
        .await
        .unwrap_err();

    mock.assert_calls(1);
    assert_eq!(err.user_message(), "HTTP 503: Service Unavailable");
}

#[tokio::test]
async fn numeric_error_code_on_2xx_stays_a_protocol_failure() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/news");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success":false,"message":"rate limited","code":429}"#);
    });

    let client = client_for(&server);
    let err = client.news().fetch().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.code(), Some("429"));
    assert_eq!(err.user_message(), "rate limited");
}

#[tokio::test]
async fn numeric_error_code_on_non_2xx_keeps_the_server_message() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/news/gone");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"success":false,"message":"no such item","code":404}"#);
    });

    let client = client_for(&server);
    let err = client.news_detail("gone").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.code(), Some("404"));
    assert_eq!(err.user_message(), "no such item");
}

#[tokio::test]
async fn failure_envelope_with_foreign_data_shape_is_a_protocol_failure() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/news");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success":false,"message":"bad filter","data":{"field":"source"}}"#);
    });

    let client = client_for(&server);
    let err = client.news().fetch().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.code(), None);
    assert_eq!(err.user_message(), "bad filter");
}

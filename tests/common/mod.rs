#![allow(dead_code)]

use finnews_rs::{NewsClient, RetryConfig};
use httpmock::{Method::GET, Mock, MockServer};
use serde_json::{Value, json};
use std::{fs, path::Path};
use url::Url;

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn fixture(endpoint: &str, key: &str, ext: &str) -> String {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let filename = format!("{endpoint}_{key}.{ext}");
    let path = dir.join(&filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

/// A client pointed at `server` that never retries, so call counts are exact.
pub fn client_for(server: &MockServer) -> NewsClient {
    NewsClient::builder()
        .base_url(Url::parse(&server.base_url()).unwrap())
        .retry_config(RetryConfig::disabled())
        .build()
        .unwrap()
}

/// Same as [`client_for`] with the query cache turned off.
pub fn uncached_client_for(server: &MockServer) -> NewsClient {
    NewsClient::builder()
        .base_url(Url::parse(&server.base_url()).unwrap())
        .retry_config(RetryConfig::disabled())
        .cache(false)
        .build()
        .unwrap()
}

pub fn item(id: &str) -> Value {
    json!({
        "newsId": id,
        "headline": format!("Headline {id}"),
        "summary": format!("Summary of {id}"),
        "source": "finnhub",
        "category": "market",
        "url": format!("https://news.example.com/{id}"),
        "publishedAt": "2025-03-14T12:00:00Z",
        "symbols": ["AAPL"]
    })
}

pub fn page_body(ids: &[&str], total: u32, limit: u32, offset: u32) -> String {
    json!({
        "success": true,
        "data": ids.iter().map(|id| item(id)).collect::<Vec<_>>(),
        "meta": { "total": total, "limit": limit, "offset": offset }
    })
    .to_string()
}

pub fn mock_list_page<'a>(
    server: &'a MockServer,
    offset: u32,
    limit: u32,
    ids: &[&str],
    total: u32,
) -> Mock<'a> {
    let body = page_body(ids, total, limit, offset);
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/news")
            .query_param("offset", offset.to_string())
            .query_param("limit", limit.to_string());
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

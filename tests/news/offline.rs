use finnews_rs::{NewsCategory, NewsItem, NewsSource};
use httpmock::Method::GET;

use crate::common::{client_for, fixture, setup_server};

#[tokio::test]
async fn offline_list_sends_filters_and_parses_page() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/news")
            .query_param("source", "sec")
            .query_param("category", "earnings")
            .query_param("limit", "20")
            .query_param("offset", "0");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("news_list", "all", "json"));
    });

    let client = client_for(&server);
    let page = client
        .news()
        .source(Some(NewsSource::Sec))
        .category(Some(NewsCategory::Earnings))
        .fetch()
        .await
        .unwrap();

    mock.assert();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.items[0].id, "fh-1001");
    assert_eq!(page.items[1].source, NewsSource::Sec);
    assert_eq!(page.items[1].source.to_string(), "SEC");
    assert_eq!(page.items[1].category, NewsCategory::Earnings);
    assert!(
        page.items[2].symbols.is_empty(),
        "a missing symbols field defaults to empty"
    );
}

#[tokio::test]
async fn offline_list_omits_unset_filters() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/news")
            .query_param_missing("source")
            .query_param_missing("category")
            .query_param("limit", "5")
            .query_param("offset", "40");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("news_list", "all", "json"));
    });

    let client = client_for(&server);
    client.news().limit(5).offset(40).fetch().await.unwrap();

    mock.assert();
}

#[tokio::test]
async fn offline_search_sends_query() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/news/search")
            .query_param("q", "fed rates")
            .query_param("limit", "20")
            .query_param("offset", "0");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("news_search", "fed", "json"));
    });

    let client = client_for(&server);
    let page = client.search("fed rates").fetch().await.unwrap();

    mock.assert();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].headline, "Fed holds rates steady");
}

#[tokio::test]
async fn offline_empty_search_never_hits_the_network() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/news/search");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("news_search", "fed", "json"));
    });

    let client = client_for(&server);
    let err = client.search("   ").fetch().await.unwrap_err();

    assert!(matches!(err, finnews_rs::NewsError::Data(_)));
    mock.assert_calls(0);
}

#[tokio::test]
async fn offline_detail_by_id() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/news/fh-1001");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("news_detail", "fh-1001", "json"));
    });

    let client = client_for(&server);
    let item = client.news_detail("fh-1001").await.unwrap();

    mock.assert();
    assert_eq!(item.id, "fh-1001");
    assert_eq!(item.symbols, vec!["AAPL".to_string(), "TSM".to_string()]);
    assert_eq!(item.published_at.to_rfc3339(), "2025-03-14T13:45:00+00:00");
}

#[tokio::test]
async fn offline_stats_top_sources() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/news/stats");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("news_stats", "all", "json"));
    });

    let client = client_for(&server);
    let stats = client.news_stats().await.unwrap();

    mock.assert();
    assert_eq!(stats.total, 1250);
    let top: Vec<_> = stats.top_sources(3).iter().map(|c| c.source).collect();
    assert_eq!(
        top,
        vec![NewsSource::Finnhub, NewsSource::Rss, NewsSource::Sec]
    );
    assert_eq!(stats.top_sources(10).len(), 4);
    assert_eq!(stats.by_category[0].category, NewsCategory::Market);
}

#[tokio::test]
async fn offline_raw_request_skips_none_params() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/news")
            .query_param_missing("category")
            .query_param("limit", "3");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("news_list", "all", "json"));
    });

    let client = client_for(&server);
    let resp = client
        .request::<Vec<NewsItem>>(
            "api/v1/news",
            &[("category", None), ("limit", Some("3".to_string()))],
        )
        .await
        .unwrap();

    mock.assert();
    assert_eq!(resp.data.len(), 3);
    assert_eq!(resp.meta.map(|m| m.limit), Some(20));
}

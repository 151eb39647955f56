use crate::core::client::{PATH_NEWS, PATH_SEARCH, PATH_STATS};
use crate::core::net::{self, append_params};
use crate::core::{
    CacheMode, NewsCategory, NewsClient, NewsError, NewsItem, NewsSource, NewsStats, Page,
    QueryKind, RetryConfig,
};

fn into_page(resp: net::ApiResponse<Vec<NewsItem>>) -> Result<Page, NewsError> {
    let meta = resp
        .meta
        .ok_or_else(|| NewsError::Data("paginated response is missing meta".into()))?;
    Ok(Page {
        items: resp.data,
        meta,
    })
}

#[allow(clippy::too_many_arguments)]
pub(super) async fn fetch_list(
    client: &NewsClient,
    source: Option<NewsSource>,
    category: Option<NewsCategory>,
    limit: u32,
    offset: u32,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Page, NewsError> {
    let mut url = client.endpoint(PATH_NEWS)?;
    append_params(
        &mut url,
        &[
            ("source", source.map(|s| s.as_str().to_string())),
            ("category", category.map(|c| c.as_str().to_string())),
            ("limit", Some(limit.to_string())),
            ("offset", Some(offset.to_string())),
        ],
    );

    let resp = net::get_json(client, url, QueryKind::List, cache_mode, retry_override).await?;
    into_page(resp)
}

pub(super) async fn fetch_search(
    client: &NewsClient,
    query: &str,
    limit: u32,
    offset: u32,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Page, NewsError> {
    let mut url = client.endpoint(PATH_SEARCH)?;
    append_params(
        &mut url,
        &[
            ("q", Some(query.to_string())),
            ("limit", Some(limit.to_string())),
            ("offset", Some(offset.to_string())),
        ],
    );

    let resp = net::get_json(client, url, QueryKind::Search, cache_mode, retry_override).await?;
    into_page(resp)
}

pub(super) async fn fetch_detail(
    client: &NewsClient,
    id: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<NewsItem, NewsError> {
    let mut url = client.endpoint(PATH_NEWS)?;
    url.path_segments_mut()
        .map_err(|()| NewsError::Data("base URL cannot carry a path".into()))?
        .push(id);

    let resp = net::get_json(client, url, QueryKind::Detail, cache_mode, retry_override).await?;
    Ok(resp.data)
}

pub(super) async fn fetch_stats(
    client: &NewsClient,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<NewsStats, NewsError> {
    let url = client.endpoint(PATH_STATS)?;
    let resp = net::get_json(client, url, QueryKind::Stats, cache_mode, retry_override).await?;
    Ok(resp.data)
}

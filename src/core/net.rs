//! Request wrapper: query-string building, envelope decoding and error normalization.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::core::client::{CacheMode, QueryKind, RetryConfig};
use crate::core::models::PageMeta;
use crate::core::wire::{Header, Payload};
use crate::core::{NewsClient, NewsError};

/// A successful, unwrapped API envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    /// Present on paginated endpoints.
    pub meta: Option<PageMeta>,
}

/// Appends every `Some` parameter to `url`'s query string; `None`s are skipped.
pub(crate) fn append_params(url: &mut Url, params: &[(&str, Option<String>)]) {
    let present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
        .collect();
    if present.is_empty() {
        return;
    }
    let mut qp = url.query_pairs_mut();
    for (k, v) in present {
        qp.append_pair(k, v);
    }
}

/// Turns a raw status + body into either the envelope payload or a normalized error.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<ApiResponse<T>, NewsError> {
    if !status.is_success() {
        let header: Header = serde_json::from_str(body).unwrap_or_default();
        return Err(NewsError::Api {
            status: status.as_u16(),
            code: header.code,
            message: header.message.unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown Status")
                )
            }),
        });
    }

    let header: Header = serde_json::from_str(body)?;
    if !header.success {
        return Err(NewsError::Api {
            status: status.as_u16(),
            code: header.code,
            message: header
                .message
                .unwrap_or_else(|| "API request failed".to_string()),
        });
    }

    let payload: Payload<T> = serde_json::from_str(body)?;
    let data = payload
        .data
        .ok_or_else(|| NewsError::Data("response envelope has no data".into()))?;
    Ok(ApiResponse {
        data,
        meta: payload.meta,
    })
}

/// Cached, retried GET used by every endpoint builder.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &NewsClient,
    url: Url,
    kind: QueryKind,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<ApiResponse<T>, NewsError> {
    if cache_mode == CacheMode::Use
        && let Some(body) = client.cache_get(kind, &url).await
    {
        return decode_envelope(StatusCode::OK, &body);
    }

    let req = client
        .http()
        .get(url.clone())
        .header("accept", "application/json");
    let resp = client.send_with_retry(req, retry_override).await?;
    let status = resp.status();
    let body = resp.text().await?;

    let parsed = decode_envelope(status, &body)?;
    if cache_mode != CacheMode::Bypass {
        client.cache_put(kind, &url, &body).await;
    }
    Ok(parsed)
}

impl NewsClient {
    /// Issues a single GET to `path` (relative to the base URL) and unwraps the envelope.
    ///
    /// `None` parameters are left out of the query string. This is the raw wrapper:
    /// it never retries and never touches the cache.
    ///
    /// # Errors
    ///
    /// - `NewsError::Http` when the server cannot be reached.
    /// - `NewsError::Api` for non-2xx statuses and `success: false` envelopes.
    /// - `NewsError::Json` / `NewsError::Data` when the body is not a valid envelope.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<ApiResponse<T>, NewsError> {
        let mut url = self.endpoint(path)?;
        append_params(&mut url, params);

        let resp = self
            .http()
            .get(url)
            .header("accept", "application/json")
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        decode_envelope(status, &body)
    }
}

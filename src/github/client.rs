// GitHub API HTTP client.
// Handles authentication, rate limiting, transient-failure retry, and pagination links.

use std::time::Duration;

use reqwest::{
    Client, ClientBuilder, RequestBuilder, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT},
};
use tracing::{debug, warn};

use crate::error::{GhlsError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Attempts per request, including the first one.
const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// GitHub API client with authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: RateLimit,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token and API root.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Self::with_builder(token, base_url, Client::builder())
    }

    /// Create a client from a preconfigured reqwest builder.
    pub(crate) fn with_builder(
        token: &str,
        base_url: &str,
        builder: ClientBuilder,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| GhlsError::Other(e.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("ghls"));

        let client = builder
            .default_headers(headers)
            .build()
            .map_err(GhlsError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: RateLimit::default(),
        })
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    /// URL under the API root built from raw path segments.
    ///
    /// Each segment is percent-encoded, so `/`, `?` and `#` stay inside it.
    pub fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let invalid = || GhlsError::Other(format!("invalid API URL: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request to an endpoint with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &mut self,
        segments: &[&str],
        params: &T,
    ) -> Result<Response> {
        let url = self.endpoint_url(segments)?;
        let request = self.client.get(url).query(params);
        self.send(request).await
    }

    /// Make a GET request to an absolute URL, as handed out in `Link` headers.
    pub async fn get_url(&mut self, url: &str) -> Result<Response> {
        let request = self.client.get(url);
        self.send(request).await
    }

    /// Send a request, retrying connection failures and server errors with backoff.
    async fn send(&mut self, request: RequestBuilder) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let pending = request
                .try_clone()
                .ok_or_else(|| GhlsError::Other("request cannot be retried".to_string()))?;

            match pending.send().await {
                Ok(response) if is_transient(response.status()) && attempt < MAX_ATTEMPTS => {
                    warn!(status = %response.status(), attempt, "GitHub server error, retrying");
                }
                Ok(response) => {
                    debug!(url = %response.url(), status = %response.status(), "GitHub response");
                    self.update_rate_limit(&response);
                    return self.check_response(response).await;
                }
                Err(err) if (err.is_connect() || err.is_timeout()) && attempt < MAX_ATTEMPTS => {
                    warn!(error = %err, attempt, "GitHub request failed, retrying");
                }
                Err(err) => return Err(GhlsError::Api(err)),
            }

            tokio::time::sleep(backoff_delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&mut self, response: &Response) {
        let headers = response.headers();

        if let Some(limit) = header_number(headers, "x-ratelimit-limit") {
            self.rate_limit.limit = limit;
        }
        if let Some(remaining) = header_number(headers, "x-ratelimit-remaining") {
            self.rate_limit.remaining = remaining;
        }
        if let Some(reset) = header_number(headers, "x-ratelimit-reset") {
            self.rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(GhlsError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(GhlsError::NotFound(url))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if self.rate_limit.remaining == 0 =>
            {
                let reset_at = chrono::DateTime::from_timestamp(self.rate_limit.reset as i64, 0)
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(GhlsError::RateLimited { reset_at })
            }
            status => Err(GhlsError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Server-side failures worth another attempt.
fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
}

/// Delay before the retry that follows `attempt` (1-based): 500ms, 1s, 2s, ...
fn backoff_delay(attempt: u32) -> Duration {
    INITIAL_BACKOFF * 2u32.saturating_pow(attempt.saturating_sub(1))
}

/// URL of the next page from a response's `Link` header, if any.
pub fn next_page_url(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LINK)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_next_link)
}

/// Extract the `rel="next"` target from a `Link` header value.
fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

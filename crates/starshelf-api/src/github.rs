use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::retry::{is_retryable_status, with_retry, RetryConfig};

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Media type that makes GitHub include the `starred_at` timestamp
/// alongside each repository in the starred listing.
const STAR_MEDIA_TYPE: &str = "application/vnd.github.v3.star+json";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// One element of the star+json response.
#[derive(Debug, Clone, Deserialize)]
pub struct StarredEntry {
    /// When the star was created, as `%Y-%m-%dT%H:%M:%SZ`. Left as text
    /// here; the import pipeline decides whether to parse it.
    pub starred_at: String,
    pub repo: StarredRepo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StarredRepo {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
}

/// One page of starred repositories plus the link to the page after it.
/// `next_page` is `None` on the last page.
#[derive(Debug, Clone)]
pub struct StarredPage {
    pub entries: Vec<StarredEntry>,
    pub next_page: Option<String>,
}

/// Client for the GitHub starred-repositories endpoint.
pub struct StarsClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
    retry_config: RetryConfig,
}

impl StarsClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise instances, and the seam tests point at a stub server.
    pub fn with_base_url(token: Option<String>, base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("starshelf/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            base_url,
            retry_config: RetryConfig::default(),
        }
    }

    /// Create client with custom retry configuration
    pub fn with_retry_config(token: Option<String>, retry_config: RetryConfig) -> Self {
        let mut client = Self::new(token);
        client.retry_config = retry_config;
        client
    }

    /// URL of the first page of a user's starred repositories. Later
    /// pages come out of the `Link` response header, not from here.
    pub fn first_page_url(&self, username: &str) -> String {
        format!("{}/users/{}/starred", self.base_url, username)
    }

    /// Fetch one page of starred repositories.
    pub async fn starred_page(&self, url: &str) -> Result<StarredPage> {
        let token = self.token.clone();

        // Wrap in retry logic
        with_retry(&self.retry_config, || async {
            let mut request = self.client.get(url).header("Accept", STAR_MEDIA_TYPE);

            if let Some(ref token) = token {
                request = request.header("Authorization", format!("Bearer {}", token));
            }

            let response = request.send().await?;

            if response.status() == 404 {
                return Err(ApiError::NotFound(url.to_string()));
            }

            if response.status() == 401 {
                return Err(ApiError::AuthRequired);
            }

            if response.status() == 429 {
                return Err(ApiError::RateLimitExceeded);
            }

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();

                if is_retryable_status(status) {
                    return Err(ApiError::RequestFailed(format!(
                        "Status {}: {}",
                        status, body
                    )));
                }

                return Err(ApiError::RequestFailed(format!(
                    "Status {}: {}",
                    status, body
                )));
            }

            // The Link header has to come off before the body is consumed
            let next_page = next_link(response.headers());
            debug!(?next_page, "fetched starred page");

            let body = response.text().await?;
            let entries: Vec<StarredEntry> = serde_json::from_str(&body)?;

            Ok(StarredPage { entries, next_page })
        })
        .await
    }
}

fn next_link(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let value = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    parse_next_link(value)
}

/// Extracts the `rel="next"` target from a `Link` header value, e.g.
/// `<https://api.github.com/...&page=2>; rel="next", <...>; rel="last"`.
/// Returns `None` when there is no next page.
fn parse_next_link(header: &str) -> Option<String> {
    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let target = parts.next().unwrap_or_default().trim();
        let is_next = parts.any(|param| param.trim() == "rel=\"next\"");
        if is_next && target.starts_with('<') && target.ends_with('>') {
            return Some(target[1..target.len() - 1].to_string());
        }
    }
    None
}

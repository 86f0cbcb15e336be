use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::auth::Token;
use crate::error::{RelogError, Result};

use super::types::{Issue, IssuePayload};

/// GitHub REST client for fetching tracker issues.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    owner: String,
    repo: String,
    token: Option<Token>,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `owner` - Repository owner/organization
    /// * `repo` - Repository name
    /// * `token` - Optional bearer credential; unauthenticated requests work
    ///   for public repositories but hit a much lower rate limit
    pub fn new(
        base_url: String,
        owner: String,
        repo: String,
        token: Option<Token>,
    ) -> Result<Self> {
        Url::parse(&base_url)
            .map_err(|e| RelogError::Config(format!("Invalid tracker base URL '{base_url}': {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("relog/0.3"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RelogError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            owner,
            repo,
            token,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    /// Fetch a single issue by number.
    ///
    /// # Errors
    ///
    /// Returns a `Network` error for transport failures and an `Api` error
    /// carrying the status and response body for non-2xx replies.
    pub async fn get_issue(&self, number: u64) -> Result<Issue> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}",
            self.base_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            number
        );

        let response = self.auth_request(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(RelogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: IssuePayload = response.json().await?;
        Ok(payload.into())
    }
}

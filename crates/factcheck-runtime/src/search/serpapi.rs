//! SerpAPI backend (paid).
//!
//! `GET {base_url}?q=..&api_key=..&num=..`, results read from
//! `organic_results`.

use async_trait::async_trait;
use std::time::Duration;

use super::{ProviderRecord, SearchBackend, SearchError};
use crate::providers::{ApiCredential, CredentialSource};

/// Environment variable name for the search API key.
pub const SEARCH_API_KEY_ENV: &str = "SEARCH_API_KEY";

/// Default endpoint.
pub const SERPAPI_URL: &str = "https://serpapi.com/search";

/// SerpAPI organic-results backend.
pub struct SerpApiBackend {
    credential: ApiCredential,
    base_url: String,
    timeout: Duration,
    #[cfg(feature = "serpapi")]
    client: reqwest::Client,
}

impl std::fmt::Debug for SerpApiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiBackend")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SerpApiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "Search API key",
        ))
    }

    /// Create from the `SEARCH_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, SearchError> {
        let credential = ApiCredential::from_env(SEARCH_API_KEY_ENV, "Search API key")?;
        Ok(Self::with_credential(credential))
    }

    pub fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: SERPAPI_URL.to_string(),
            timeout: Duration::from_secs(10),
            #[cfg(feature = "serpapi")]
            client: reqwest::Client::new(),
        }
    }

    /// Set custom endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(any(test, feature = "serpapi"))]
#[derive(Debug, serde::Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(any(test, feature = "serpapi"))]
#[derive(Debug, serde::Deserialize)]
struct OrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

#[cfg(any(test, feature = "serpapi"))]
impl SerpResponse {
    fn into_records(self, limit: usize) -> Result<Vec<ProviderRecord>, SearchError> {
        if let Some(message) = self.error {
            return Err(SearchError::ApiError {
                status: 200,
                message,
            });
        }

        Ok(self
            .organic_results
            .into_iter()
            .take(limit)
            .map(|r| ProviderRecord::Serp {
                title: r.title,
                link: r.link,
                snippet: r.snippet,
            })
            .collect())
    }
}

#[async_trait]
impl SearchBackend for SerpApiBackend {
    #[cfg(feature = "serpapi")]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProviderRecord>, SearchError> {
        let num = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("api_key", self.credential.expose()),
                ("num", num.as_str()),
            ])
            .header(reqwest::header::USER_AGENT, super::USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(self.timeout)
                } else {
                    SearchError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: SerpResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        body.into_records(limit)
    }

    #[cfg(not(feature = "serpapi"))]
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<ProviderRecord>, SearchError> {
        Err(SearchError::NotConfigured(
            "SerpAPI backend requires 'serpapi' feature".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}

//! Search capability.
//!
//! A [`SearchBackend`] turns a query into provider-native result records.
//! Backends report failures as [`SearchError`]; turning those into empty
//! evidence is the gatherer's job, not theirs.
//!
//! ## Backends
//!
//! | Name | Feature | Credential |
//! |------|---------|------------|
//! | `serpapi` | `serpapi` | `SEARCH_API_KEY` |
//! | `duckduckgo` | `duckduckgo` | none |

use async_trait::async_trait;
use factcheck_core::EvidenceRecord;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::providers::CredentialError;

mod duckduckgo;
mod serpapi;

pub use duckduckgo::{DuckDuckGoBackend, DUCKDUCKGO_HTML_URL};
pub use serpapi::{SerpApiBackend, SEARCH_API_KEY_ENV, SERPAPI_URL};

/// User agent sent with every search request.
pub const USER_AGENT: &str = "FactCheckerBot/1.0";

/// Errors from search backends.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Search API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed search response: {0}")]
    ParseError(String),

    #[error("Search timed out after {0:?}")]
    Timeout(Duration),

    #[error("Search backend not configured: {0}")]
    NotConfigured(String),
}

impl From<CredentialError> for SearchError {
    fn from(err: CredentialError) -> Self {
        SearchError::NotConfigured(err.to_string())
    }
}

/// A search result in the shape its provider returned it.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRecord {
    /// SerpAPI organic result
    Serp {
        title: Option<String>,
        link: Option<String>,
        snippet: Option<String>,
    },

    /// DuckDuckGo text result
    Ddg {
        title: Option<String>,
        href: Option<String>,
        body: Option<String>,
    },
}

impl ProviderRecord {
    /// Map provider field names onto the uniform evidence shape.
    pub fn normalize(self) -> EvidenceRecord {
        match self {
            ProviderRecord::Serp {
                title,
                link,
                snippet,
            } => EvidenceRecord::new(title, link, snippet),
            ProviderRecord::Ddg { title, href, body } => EvidenceRecord::new(title, href, body),
        }
    }
}

/// A web search provider.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one query, returning at most `limit` records in provider order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProviderRecord>, SearchError>;

    /// Backend name, used for circuit breaking and logs.
    fn name(&self) -> &str;
}

/// Create a backend by registered name.
pub fn backend_by_name(
    name: &str,
    timeout: Duration,
) -> Result<Arc<dyn SearchBackend>, SearchError> {
    match name {
        "serpapi" => Ok(Arc::new(SerpApiBackend::from_env()?.with_timeout(timeout))),
        "duckduckgo" => Ok(Arc::new(DuckDuckGoBackend::new().with_timeout(timeout))),
        other => Err(SearchError::NotConfigured(format!(
            "unknown search backend '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serp_record_normalizes_link() {
        let record = ProviderRecord::Serp {
            title: Some("Moon landing".into()),
            link: Some("https://www.nasa.gov/apollo-11".into()),
            snippet: Some("Apollo 11 landed in 1969.".into()),
        }
        .normalize();

        assert_eq!(record.url.as_deref(), Some("https://www.nasa.gov/apollo-11"));
        assert_eq!(record.snippet.as_deref(), Some("Apollo 11 landed in 1969."));
        assert_eq!(record.domain, "www.nasa.gov");
    }

    #[test]
    fn test_ddg_record_normalizes_href_and_body() {
        let record = ProviderRecord::Ddg {
            title: None,
            href: Some("https://en.wikipedia.org/wiki/Moon".into()),
            body: Some("The Moon is Earth's only natural satellite.".into()),
        }
        .normalize();

        assert!(record.title.is_none());
        assert_eq!(record.domain, "en.wikipedia.org");
        assert_eq!(
            record.snippet.as_deref(),
            Some("The Moon is Earth's only natural satellite.")
        );
    }

    #[test]
    fn test_unknown_backend_name() {
        let result = backend_by_name("altavista", Duration::from_secs(1));
        assert!(matches!(result, Err(SearchError::NotConfigured(_))));
    }

    #[test]
    fn test_credential_error_conversion() {
        let err: SearchError = CredentialError::MissingEnv {
            name: "Search API key",
            env_var: SEARCH_API_KEY_ENV.into(),
        }
        .into();
        assert!(err.to_string().contains("SEARCH_API_KEY"));
    }
}

//! DuckDuckGo backend (free).
//!
//! Queries the HTML endpoint and scrapes result blocks. Result links come
//! wrapped in a `/l/?uddg=` redirect; the target URL is unwrapped before it
//! becomes a record.

use async_trait::async_trait;
use std::time::Duration;

use super::{ProviderRecord, SearchBackend, SearchError};

/// Default endpoint.
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Keyless DuckDuckGo backend.
pub struct DuckDuckGoBackend {
    base_url: String,
    timeout: Duration,
    #[cfg(feature = "duckduckgo")]
    client: reqwest::Client,
}

impl std::fmt::Debug for DuckDuckGoBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDuckGoBackend")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for DuckDuckGoBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckDuckGoBackend {
    pub fn new() -> Self {
        Self {
            base_url: DUCKDUCKGO_HTML_URL.to_string(),
            timeout: Duration::from_secs(10),
            #[cfg(feature = "duckduckgo")]
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

/// Extract result records from a results page, in page order.
#[cfg(feature = "duckduckgo")]
fn parse_results(html: &str, limit: usize) -> Result<Vec<ProviderRecord>, SearchError> {
    use scraper::{Html, Selector};

    let selector = |css: &str| {
        Selector::parse(css).map_err(|e| SearchError::ParseError(format!("{e:?}")))
    };
    let result_selector = selector("div.result")?;
    let link_selector = selector("a.result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let text_of = |el: scraper::ElementRef<'_>| {
        let text = el.text().collect::<String>().trim().to_string();
        (!text.is_empty()).then_some(text)
    };

    let records = document
        .select(&result_selector)
        .filter_map(|result| {
            let link = result.select(&link_selector).next()?;
            let href = link.value().attr("href").map(unwrap_redirect);
            Some(ProviderRecord::Ddg {
                title: text_of(link),
                href,
                body: result.select(&snippet_selector).next().and_then(text_of),
            })
        })
        .take(limit)
        .collect();

    Ok(records)
}

/// Resolve a `/l/?uddg=<target>` redirect to its target; other links pass through.
#[cfg(feature = "duckduckgo")]
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    url::Url::parse(&absolute)
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or_else(|| href.to_string())
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    #[cfg(feature = "duckduckgo")]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProviderRecord>, SearchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query)])
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
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message: format!("DuckDuckGo returned {status}"),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::HttpError(e.to_string()))?;

        parse_results(&html, limit)
    }

    #[cfg(not(feature = "duckduckgo"))]
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<ProviderRecord>, SearchError> {
        Err(SearchError::NotConfigured(
            "DuckDuckGo backend requires 'duckduckgo' feature".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

//! Evidence records gathered from web search.
//!
//! Every search result, whatever provider produced it, is normalized into an
//! [`EvidenceRecord`] before it reaches scoring or prompting.

use serde::{Deserialize, Serialize};

/// A search-derived source used to support or refute an assumption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceRecord {
    /// Result title, if the provider returned one
    pub title: Option<String>,

    /// Result link
    pub url: Option<String>,

    /// Result excerpt
    pub snippet: Option<String>,

    /// Host segment of `url`; empty when there is no usable URL
    pub domain: String,
}

impl EvidenceRecord {
    /// Create a record, deriving `domain` from `url`.
    pub fn new(title: Option<String>, url: Option<String>, snippet: Option<String>) -> Self {
        let domain = extract_domain(url.as_deref());
        Self {
            title,
            url,
            snippet,
            domain,
        }
    }
}

/// Extract the host segment from a URL.
///
/// If the URL contains `//`, the domain is the third `/`-delimited segment
/// (`https://a.gov/x` -> `a.gov`); otherwise it is the first segment
/// (`a.gov/x` -> `a.gov`). Absent or empty URLs yield an empty string.
pub fn extract_domain(url: Option<&str>) -> String {
    let url = match url {
        Some(u) if !u.is_empty() => u,
        _ => return String::new(),
    };

    let index = if url.contains("//") { 2 } else { 0 };
    url.split('/').nth(index).unwrap_or_default().to_string()
}

/// Builder for creating evidence with fluent API.
pub struct EvidenceBuilder {
    title: Option<String>,
    url: Option<String>,
    snippet: Option<String>,
}

impl EvidenceBuilder {
    /// Start building evidence for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            title: None,
            url: Some(url.into()),
            snippet: None,
        }
    }

    /// Start building evidence with no URL.
    pub fn without_url() -> Self {
        Self {
            title: None,
            url: None,
            snippet: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Build the record.
    pub fn build(self) -> EvidenceRecord {
        EvidenceRecord::new(self.title, self.url, self.snippet)
    }
}

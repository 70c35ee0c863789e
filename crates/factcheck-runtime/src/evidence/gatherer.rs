//! Evidence gatherer over the configured search backends.

use async_trait::async_trait;
use factcheck_core::EvidenceRecord;
use std::sync::Arc;

use super::{EvidenceError, EvidenceSource};
use crate::config::SearchConfig;
use crate::observer::{PipelineObserver, SearchFailure, TracingObserver};
use crate::providers::ApiCredential;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig};
use crate::search::{backend_by_name, SearchBackend, SearchError, SEARCH_API_KEY_ENV};

/// Records kept per query unless configured otherwise.
pub const DEFAULT_RESULTS_LIMIT: usize = 5;

/// Searches the paid backend when one is configured, the free one otherwise.
///
/// Failures never reach the caller: a failed search, or one skipped because
/// the backend's circuit is open, yields no records and a [`SearchFailure`]
/// sent to the observer. Circuit state lasts for one run and is cleared by
/// [`EvidenceSource::start_run`].
pub struct EvidenceGatherer {
    paid: Option<Arc<dyn SearchBackend>>,
    free: Arc<dyn SearchBackend>,
    limit: usize,
    breaker: CircuitBreaker,
    observer: Arc<dyn PipelineObserver>,
}

impl EvidenceGatherer {
    pub fn new(free: Arc<dyn SearchBackend>) -> Self {
        Self {
            paid: None,
            free,
            limit: DEFAULT_RESULTS_LIMIT,
            breaker: CircuitBreaker::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Build from configuration.
    ///
    /// The paid backend is used only when `SEARCH_API_KEY` holds a non-empty
    /// value.
    pub fn from_config(
        search: &SearchConfig,
        circuit_breaker: &CircuitBreakerConfig,
        observer: Arc<dyn PipelineObserver>,
    ) -> Result<Self, SearchError> {
        let free = backend_by_name(&search.free_provider, search.timeout)?;
        let mut gatherer = Self::new(free)
            .with_limit(search.results_limit)
            .with_circuit_breaker(circuit_breaker.clone())
            .with_observer(observer);

        if ApiCredential::optional_from_env(SEARCH_API_KEY_ENV, "Search API key").is_some() {
            gatherer = gatherer.with_paid(backend_by_name(&search.paid_provider, search.timeout)?);
        }

        tracing::debug!(backend = gatherer.active_backend(), "Evidence gatherer configured");
        Ok(gatherer)
    }

    pub fn with_paid(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.paid = Some(backend);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = CircuitBreaker::new(config);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Name of the backend searches go to.
    pub fn active_backend(&self) -> &str {
        self.backend().name()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn backend(&self) -> &dyn SearchBackend {
        self.paid.as_deref().unwrap_or(self.free.as_ref())
    }

    /// Search for `query`, returning at most `limit` normalized records.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<EvidenceRecord> {
        let backend = self.backend();
        let name = backend.name();

        if self.breaker.is_open(name) {
            self.report(query, name, "circuit open");
            return Vec::new();
        }

        match backend.search(query, limit).await {
            Ok(records) => {
                self.breaker.record_success(name);
                records
                    .into_iter()
                    .take(limit)
                    .map(|record| record.normalize())
                    .collect()
            }
            Err(e) => {
                self.breaker.record_failure(name);
                self.report(query, name, &e.to_string());
                Vec::new()
            }
        }
    }

    fn report(&self, query: &str, backend: &str, reason: &str) {
        self.observer
            .search_failed(&SearchFailure::new(query, backend, reason));
    }
}

#[async_trait]
impl EvidenceSource for EvidenceGatherer {
    async fn gather(&self, query: &str) -> Result<Vec<EvidenceRecord>, EvidenceError> {
        Ok(self.search(query, self.limit).await)
    }

    fn start_run(&self) {
        self.breaker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use crate::search::ProviderRecord;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubBackend {
        name: &'static str,
        calls: AtomicU32,
        fail: bool,
        records: Vec<ProviderRecord>,
    }

    impl StubBackend {
        fn ok(name: &'static str, records: Vec<ProviderRecord>) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicU32::new(0),
                fail: false,
                records,
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicU32::new(0),
                fail: true,
                records: Vec::new(),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for StubBackend {
        async fn search(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<ProviderRecord>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SearchError::HttpError("connection refused".into()));
            }
            Ok(self.records.clone())
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn ddg(href: &str) -> ProviderRecord {
        ProviderRecord::Ddg {
            title: Some("t".into()),
            href: Some(href.into()),
            body: Some("b".into()),
        }
    }

    fn serp(link: &str) -> ProviderRecord {
        ProviderRecord::Serp {
            title: Some("t".into()),
            link: Some(link.into()),
            snippet: Some("s".into()),
        }
    }

    #[tokio::test]
    async fn test_free_backend_when_no_paid() {
        let free = StubBackend::ok("duckduckgo", vec![ddg("https://a.gov/x")]);
        let gatherer = EvidenceGatherer::new(free.clone());

        let records = gatherer.search("q", 5).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].domain, "a.gov");
        assert_eq!(gatherer.active_backend(), "duckduckgo");
    }

    #[tokio::test]
    async fn test_paid_backend_preferred() {
        let free = StubBackend::ok("duckduckgo", vec![ddg("https://a.gov/x")]);
        let paid = StubBackend::ok("serpapi", vec![serp("https://b.edu/y")]);
        let gatherer = EvidenceGatherer::new(free.clone()).with_paid(paid.clone());

        let records = gatherer.search("q", 5).await;
        assert_eq!(records[0].domain, "b.edu");
        assert_eq!(free.calls.load(Ordering::SeqCst), 0);
        assert_eq!(paid.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_results_truncated_to_limit() {
        let free = StubBackend::ok(
            "duckduckgo",
            vec![ddg("https://a.gov"), ddg("https://b.gov"), ddg("https://c.gov")],
        );
        let gatherer = EvidenceGatherer::new(free).with_limit(2);

        assert_eq!(gatherer.gather("q").await.unwrap().len(), 2);
        assert_eq!(gatherer.search("q", 1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_becomes_empty_and_is_reported() {
        let observer = Arc::new(RecordingObserver::new());
        let gatherer = EvidenceGatherer::new(StubBackend::failing("duckduckgo"))
            .with_observer(observer.clone());

        let records = gatherer.gather("is the moon cheese").await.unwrap();
        assert!(records.is_empty());

        let failures = observer.search_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].query, "is the moon cheese");
        assert_eq!(failures[0].backend, "duckduckgo");
        assert!(failures[0].reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_open_circuit_skips_backend() {
        let observer = Arc::new(RecordingObserver::new());
        let backend = StubBackend::failing("serpapi");
        let gatherer = EvidenceGatherer::new(backend.clone())
            .with_circuit_breaker(CircuitBreakerConfig {
                failure_threshold: 2,
                ..Default::default()
            })
            .with_observer(observer.clone());

        gatherer.search("a", 5).await;
        gatherer.search("b", 5).await;
        let records = gatherer.search("c", 5).await;

        assert!(records.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        let failures = observer.search_failures();
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[2].reason, "circuit open");
    }

    #[tokio::test]
    async fn test_start_run_closes_circuit() {
        let backend = StubBackend::failing("serpapi");
        let gatherer = EvidenceGatherer::new(backend.clone()).with_circuit_breaker(
            CircuitBreakerConfig {
                failure_threshold: 1,
                ..Default::default()
            },
        );

        gatherer.search("a", 5).await;
        gatherer.search("b", 5).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        gatherer.start_run();
        gatherer.search("c", 5).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}

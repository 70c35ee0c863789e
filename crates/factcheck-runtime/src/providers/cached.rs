//! In-memory memo of completions.
//!
//! Identical prompts with identical model settings return the stored text
//! instead of calling the provider again. Entries live only in memory and
//! expire after a TTL.

use async_trait::async_trait;
use moka::future::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use super::{ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage};

/// Cache key for a completion request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey(u64);

impl CacheKey {
    fn new(messages: &[ChatMessage], config: &CompletionConfig) -> Self {
        let mut hasher = DefaultHasher::new();
        config.model.hash(&mut hasher);
        config.max_tokens.hash(&mut hasher);
        config.temperature.to_bits().hash(&mut hasher);
        messages.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Provider wrapper that memoizes successful completions.
///
/// Failures are never cached. A cache hit reports zero token usage.
pub struct CachedProvider {
    inner: Arc<dyn LlmProvider>,
    cache: Cache<CacheKey, CompletionResponse>,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    /// Clear the cache.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl LlmProvider for CachedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let key = CacheKey::new(&messages, config);

        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(provider = self.inner.name(), "Completion cache hit");
            return Ok(CompletionResponse {
                usage: TokenUsage::default(),
                ..hit
            });
        }

        let response = self.inner.complete(messages, config).await?;
        self.cache.insert(key, response.clone()).await;
        Ok(response)
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        self.inner.estimate_tokens(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProvider {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for CountingProvider {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::HttpError("connection reset".into()));
            }
            Ok(CompletionResponse {
                content: format!("echo: {}", messages[0].content),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                },
                model: "counting".into(),
                stop_reason: None,
            })
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting(fail: bool) -> Arc<CountingProvider> {
        Arc::new(CountingProvider {
            calls: AtomicU32::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn test_identical_prompt_served_from_cache() {
        let inner = counting(false);
        let cached = CachedProvider::new(inner.clone(), 100, Duration::from_secs(60));
        let config = CompletionConfig::default();

        let first = cached
            .complete(vec![ChatMessage::user("claim")], &config)
            .await
            .unwrap();
        let second = cached
            .complete(vec![ChatMessage::user("claim")], &config)
            .await
            .unwrap();

        assert_eq!(first.content, second.content);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.usage.total(), 15);
        assert_eq!(second.usage.total(), 0);
    }

    #[tokio::test]
    async fn test_different_settings_miss() {
        let inner = counting(false);
        let cached = CachedProvider::new(inner.clone(), 100, Duration::from_secs(60));

        let config = CompletionConfig::default();
        let warmer = CompletionConfig {
            temperature: 0.9,
            ..Default::default()
        };

        cached.complete(vec![ChatMessage::user("x")], &config).await.unwrap();
        cached.complete(vec![ChatMessage::user("x")], &warmer).await.unwrap();
        cached.complete(vec![ChatMessage::user("y")], &config).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failures_not_cached() {
        let inner = counting(true);
        let cached = CachedProvider::new(inner.clone(), 100, Duration::from_secs(60));
        let config = CompletionConfig::default();

        assert!(cached.complete(vec![ChatMessage::user("x")], &config).await.is_err());
        assert!(cached.complete(vec![ChatMessage::user("x")], &config).await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}

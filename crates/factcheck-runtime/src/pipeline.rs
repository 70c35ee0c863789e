//! Claim verification pipeline.
//!
//! One run turns a claim into a [`FactCheckReport`]:
//!
//! 1. Initial response from the claim alone
//! 2. Assumption extraction from that response
//! 3. Per-assumption verification: evidence, analysis, verdict, credibility
//! 4. Final synthesis over all results
//!
//! followed by classification of the claim. A model failure in stages 1, 2,
//! 4 or classification ends the run with an error report. A failure inside
//! stage 3 is confined to its assumption, which is recorded with an `Error`
//! verdict while the run continues.
//!
//! Stage 3 runs up to `max_concurrent_assumptions` assumptions at once.
//! Results are collected in extraction order whatever order they finish in.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use factcheck_core::{
    assumption_verdict, split_assumptions, Assumption, Claim, CompletedCheck, CoreError,
    CredibilityScorer, FactCheckReport, Synthesizer, VerificationResult, VerificationResults,
};

use crate::config::{ConfigError, RuntimeConfig};
use crate::evidence::{EvidenceError, EvidenceGatherer, EvidenceSource};
use crate::observer::{PipelineObserver, TracingObserver};
use crate::prompts::{
    ClassificationPrompt, ExtractionPrompt, InitialResponsePrompt, PromptSet, SynthesisPrompt,
    TemplateError, VerificationPrompt,
};
use crate::providers::{CachedProvider, LlmProvider, ProviderError, ProviderRegistry};
use crate::query::{ModelClient, Stage};
use crate::resilience::UsageReport;
use crate::search::SearchError;

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid claim")]
    InvalidClaim,

    #[error("{stage} failed: {source}")]
    ModelQuery {
        stage: Stage,
        #[source]
        source: ProviderError,
    },
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidClaim => PipelineError::InvalidClaim,
        }
    }
}

/// Errors confined to one assumption.
#[derive(Error, Debug)]
pub enum AssumptionError {
    #[error("Evidence gathering failed: {0}")]
    Evidence(#[from] EvidenceError),

    #[error("Verification query failed: {0}")]
    Analysis(#[source] ProviderError),
}

/// Errors from assembling a verifier.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("No model provider set")]
    MissingProvider,

    #[error("No evidence source set")]
    MissingEvidenceSource,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Runs the verification pipeline.
///
/// Holds no per-run state: runs on one verifier are independent, apart from
/// the usage ledger and the optional completion cache.
pub struct ClaimVerifier {
    client: ModelClient,
    evidence: Arc<dyn EvidenceSource>,
    prompts: PromptSet,
    observer: Arc<dyn PipelineObserver>,
    scorer: CredibilityScorer,
    synthesizer: Synthesizer,
    max_concurrent_assumptions: usize,
}

impl ClaimVerifier {
    pub fn builder() -> ClaimVerifierBuilder {
        ClaimVerifierBuilder::new()
    }

    /// Build the production graph: registered model provider, search-backed
    /// evidence gatherer and `tracing` observer.
    pub fn from_config(config: RuntimeConfig) -> Result<Self, BuildError> {
        config.validate()?;

        let observer: Arc<dyn PipelineObserver> = Arc::new(TracingObserver);
        let provider = ProviderRegistry::with_defaults()
            .create(&config.model.provider, &config.model.provider_json())?;
        let evidence = EvidenceGatherer::from_config(
            &config.search,
            &config.circuit_breaker,
            observer.clone(),
        )?;

        ClaimVerifierBuilder::new()
            .provider(provider)
            .evidence_source(Arc::new(evidence))
            .observer(observer)
            .config(config)
            .build()
    }

    /// Verify one claim.
    ///
    /// Never fails: every outcome, including an invalid claim, is a report.
    pub async fn verify(&self, claim: &str) -> FactCheckReport {
        let started = Instant::now();
        self.evidence.start_run();

        let report = match self.run(claim).await {
            Ok(check) => {
                tracing::info!(
                    assumptions = check.assumptions.len(),
                    failed = check.failed_assumptions(),
                    verdict = %check.final_answer.verdict,
                    "Claim verified"
                );
                FactCheckReport::Success(check)
            }
            Err(e) => {
                tracing::error!(error = %e, "Fact-check failed");
                FactCheckReport::error(e.to_string())
            }
        };

        self.observer.run_finished(report.status(), started.elapsed());
        report
    }

    async fn run(&self, claim: &str) -> Result<CompletedCheck, PipelineError> {
        let claim = Claim::parse(claim)?;

        let initial_response = self
            .ask(
                Stage::InitialResponse,
                self.prompts.render(&InitialResponsePrompt {
                    claim: claim.as_str(),
                }),
            )
            .await?;

        let extraction = self
            .ask(
                Stage::Extraction,
                self.prompts.render(&ExtractionPrompt {
                    response: &initial_response,
                }),
            )
            .await?;
        let assumptions = split_assumptions(&extraction);
        tracing::debug!(count = assumptions.len(), "Assumptions extracted");

        let started = Instant::now();
        let verification_results = self.verify_assumptions(&assumptions).await;
        self.observer
            .stage_completed(Stage::Verification, started.elapsed());

        let serialized = self.synthesizer.serialize_results(&verification_results);
        let synthesis = self
            .ask(
                Stage::Synthesis,
                self.prompts.render(&SynthesisPrompt {
                    claim: claim.as_str(),
                    initial_response: &initial_response,
                    verification_results: &serialized,
                }),
            )
            .await?;
        let final_answer = self.synthesizer.final_answer(&synthesis);

        let claim_type = self
            .ask(
                Stage::Classification,
                self.prompts.render(&ClassificationPrompt {
                    claim: claim.as_str(),
                }),
            )
            .await?
            .trim()
            .to_string();

        Ok(CompletedCheck {
            claim: claim.into_inner(),
            claim_type,
            initial_response,
            assumptions,
            verification_results,
            final_answer,
        })
    }

    /// One fatal-on-failure model call.
    async fn ask(&self, stage: Stage, prompt: String) -> Result<String, PipelineError> {
        let started = Instant::now();
        let text = self
            .client
            .query(stage, &prompt)
            .await
            .map_err(|source| PipelineError::ModelQuery { stage, source })?;
        self.observer.stage_completed(stage, started.elapsed());
        Ok(text)
    }

    async fn verify_assumptions(&self, assumptions: &[Assumption]) -> VerificationResults {
        let outcomes: Vec<(String, VerificationResult)> = stream::iter(assumptions)
            .map(|assumption| async move {
                let result = match self.verify_assumption(assumption).await {
                    Ok(result) => result,
                    Err(e) => {
                        let message = e.to_string();
                        self.observer
                            .assumption_failed(assumption.as_str(), &message);
                        VerificationResult::failed(message)
                    }
                };
                (assumption.as_str().to_string(), result)
            })
            .buffered(self.max_concurrent_assumptions)
            .collect()
            .await;

        outcomes.into_iter().collect()
    }

    async fn verify_assumption(
        &self,
        assumption: &Assumption,
    ) -> Result<VerificationResult, AssumptionError> {
        let evidence = self.evidence.gather(assumption.as_str()).await?;

        let serialized = self.synthesizer.serialize_evidence(&evidence);
        let prompt = self.prompts.render(&VerificationPrompt {
            assumption: assumption.as_str(),
            evidence: &serialized,
        });
        let analysis = self
            .client
            .query(Stage::Verification, &prompt)
            .await
            .map_err(AssumptionError::Analysis)?;

        let verdict = assumption_verdict(&analysis);
        let credibility = self.scorer.score(&evidence);
        Ok(VerificationResult::checked(
            verdict,
            evidence,
            credibility,
            analysis,
        ))
    }

    /// Model usage since this verifier was built.
    pub fn usage(&self) -> UsageReport {
        self.client.usage().report()
    }

    pub fn max_concurrent_assumptions(&self) -> usize {
        self.max_concurrent_assumptions
    }
}

impl std::fmt::Debug for ClaimVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimVerifier")
            .field("client", &self.client)
            .field(
                "max_concurrent_assumptions",
                &self.max_concurrent_assumptions,
            )
            .finish()
    }
}

/// Builder for [`ClaimVerifier`].
pub struct ClaimVerifierBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    evidence: Option<Arc<dyn EvidenceSource>>,
    observer: Arc<dyn PipelineObserver>,
    prompts: Option<PromptSet>,
    config: RuntimeConfig,
}

impl ClaimVerifierBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            evidence: None,
            observer: Arc::new(TracingObserver),
            prompts: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the model provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set where evidence comes from.
    pub fn evidence_source(mut self, source: Arc<dyn EvidenceSource>) -> Self {
        self.evidence = Some(source);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Use these templates instead of the configured ones.
    pub fn prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for `pipeline.max_concurrent_assumptions`.
    pub fn max_concurrent_assumptions(mut self, limit: usize) -> Self {
        self.config.pipeline.max_concurrent_assumptions = limit;
        self
    }

    /// Build the verifier.
    pub fn build(self) -> Result<ClaimVerifier, BuildError> {
        self.config.validate()?;

        let mut provider = self.provider.ok_or(BuildError::MissingProvider)?;
        let evidence = self.evidence.ok_or(BuildError::MissingEvidenceSource)?;
        let prompts = match self.prompts {
            Some(prompts) => prompts,
            None => PromptSet::with_overrides(&self.config.prompts)?,
        };

        let cache = &self.config.cache;
        if cache.enabled {
            provider = Arc::new(CachedProvider::new(provider, cache.max_entries, cache.ttl));
        }

        Ok(ClaimVerifier {
            client: ModelClient::new(provider, self.config.model.completion_config()),
            evidence,
            prompts,
            observer: self.observer,
            scorer: CredibilityScorer::new(),
            synthesizer: Synthesizer::new(),
            max_concurrent_assumptions: self.config.pipeline.max_concurrent_assumptions,
        })
    }
}

impl Default for ClaimVerifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

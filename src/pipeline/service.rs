//! Summarization service coordinating redaction, chunking, and completion calls.

use crate::{
    completion::{ChatClient, CompletionClient, CompletionError, CompletionRequest},
    config::{Config, get_config},
    metrics::{MetricsSnapshot, PipelineMetrics},
    pipeline::{
        chunking,
        prompts::{
            ANSWER_SYSTEM_PROMPT, MAP_SYSTEM_PROMPT, REDUCE_SYSTEM_PROMPT, build_answer_prompt,
            build_chunk_prompt, build_reduce_prompt,
        },
        redact::redact,
        types::{AnswerError, SummarizationError, SummaryOutcome},
    },
};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

/// Tunable pipeline parameters, resolved from configuration at startup.
///
/// Chunk size and overlap default to 2000/200 characters; the map fan-out is
/// bounded at 4 workers. All values are externally settable (see `config`).
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Bounded concurrency for map-step completion calls.
    pub map_workers: usize,
    /// Output token budget per completion call.
    pub max_tokens: u32,
    /// Sampling temperature per completion call.
    pub temperature: f32,
    /// Retries applied to retryable completion failures.
    pub max_retries: usize,
}

impl PipelineSettings {
    /// Extract pipeline parameters from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            map_workers: config.map_workers,
            max_tokens: config.completion_max_tokens,
            temperature: config.completion_temperature,
            max_retries: config.completion_max_retries,
        }
    }
}

/// Coordinates the full summarization pipeline: redaction, chunking, parallel
/// map calls, and the single combine-and-refine reduce call.
///
/// The service owns the completion client and metrics registry so the HTTP
/// surface and tests reuse the same components. Construct it once near process
/// start and share it through an `Arc`.
pub struct SummarizerService {
    completion_client: Box<dyn CompletionClient>,
    settings: PipelineSettings,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the summarization pipeline used by external surfaces.
#[async_trait]
pub trait SummarizerApi: Send + Sync {
    /// Redact, chunk, and summarize raw document text.
    async fn summarize(&self, text: &str) -> Result<SummaryOutcome, SummarizationError>;

    /// Answer a free-form question against the redacted full document.
    async fn answer(&self, document_text: &str, question: &str) -> Result<String, AnswerError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummarizerService {
    /// Build a new service from the loaded configuration.
    ///
    /// Fails fast with [`CompletionError::MissingCredential`] when no provider
    /// credential is configured.
    pub fn new() -> Result<Self, CompletionError> {
        let config = get_config();
        tracing::info!(model = %config.completion_model, "Initializing completion client");
        let client = ChatClient::new(config.completion())?;
        Ok(Self::with_client(
            Box::new(client),
            PipelineSettings::from_config(config),
        ))
    }

    /// Build a service around an explicit completion client and settings.
    pub fn with_client(client: Box<dyn CompletionClient>, settings: PipelineSettings) -> Self {
        Self {
            completion_client: client,
            settings,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Redact, chunk, and summarize a document via map-reduce.
    ///
    /// Map-step calls run with bounded concurrency and their results land in an
    /// index-tagged slot vector, so partial summaries always re-enter the reduce
    /// step in original chunk order regardless of completion order. Any map or
    /// reduce failure that survives the retry policy fails the whole request.
    pub async fn summarize(&self, text: &str) -> Result<SummaryOutcome, SummarizationError> {
        let redacted = redact(text);
        if redacted.trim().is_empty() {
            tracing::debug!("Empty document; skipping completion calls");
            return Ok(SummaryOutcome {
                summary: String::new(),
                chunk_count: 0,
                chunk_size: self.settings.chunk_size,
            });
        }

        let chunks = chunking::split(
            &redacted,
            self.settings.chunk_size,
            self.settings.chunk_overlap,
        )?;
        tracing::info!(
            chunks = chunks.len(),
            chunk_size = self.settings.chunk_size,
            overlap = self.settings.chunk_overlap,
            "Summarizing document"
        );

        let mut slots: Vec<Option<String>> = vec![None; chunks.len()];
        let map_futures: Vec<_> = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                let request = CompletionRequest {
                    system_prompt: Some(MAP_SYSTEM_PROMPT.to_string()),
                    user_prompt: build_chunk_prompt(chunk),
                    max_tokens: self.settings.max_tokens,
                    temperature: self.settings.temperature,
                };
                async move { (index, self.complete_with_retry(request).await) }
            })
            .collect();
        let mut map_results =
            stream::iter(map_futures).buffer_unordered(self.settings.map_workers.max(1));

        while let Some((index, result)) = map_results.next().await {
            match result {
                Ok(partial) => slots[index] = Some(partial),
                Err(source) => {
                    tracing::error!(chunk = index, error = %source, "Map step failed");
                    return Err(SummarizationError::MapStep { index, source });
                }
            }
        }
        drop(map_results);

        let partial_summaries: Vec<String> = slots
            .into_iter()
            .map(|slot| slot.expect("map step yielded a result for every chunk index"))
            .collect();

        let reduce_request = CompletionRequest {
            system_prompt: Some(REDUCE_SYSTEM_PROMPT.to_string()),
            user_prompt: build_reduce_prompt(&partial_summaries),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        let summary = self
            .complete_with_retry(reduce_request)
            .await
            .map_err(SummarizationError::Reduce)?;

        self.metrics.record_summary(partial_summaries.len() as u64);
        tracing::info!(chunks = partial_summaries.len(), "Document summarized");

        Ok(SummaryOutcome {
            summary,
            chunk_count: partial_summaries.len(),
            chunk_size: self.settings.chunk_size,
        })
    }

    /// Answer a question against the redacted full document in one completion call.
    ///
    /// The document is embedded whole; input exceeding the model's context window
    /// is a documented limitation of this path, not handled here.
    pub async fn answer(
        &self,
        document_text: &str,
        question: &str,
    ) -> Result<String, AnswerError> {
        let redacted = redact(document_text);
        let request = CompletionRequest {
            system_prompt: Some(ANSWER_SYSTEM_PROMPT.to_string()),
            user_prompt: build_answer_prompt(&redacted, question),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        let answer = self.complete_with_retry(request).await?;
        self.metrics.record_answer();
        tracing::info!("Question answered");
        Ok(answer)
    }

    /// Return the current pipeline metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Issue one completion call, retrying retryable failures up to the
    /// configured attempt budget. The client itself never retries.
    async fn complete_with_retry(
        &self,
        request: CompletionRequest,
    ) -> Result<String, CompletionError> {
        let mut attempt = 0;
        loop {
            match self.completion_client.complete(request.clone()).await {
                Ok(text) => return Ok(text),
                Err(error) if error.is_retryable() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %error, attempt, "Retrying completion call");
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[async_trait]
impl SummarizerApi for SummarizerService {
    async fn summarize(&self, text: &str) -> Result<SummaryOutcome, SummarizationError> {
        SummarizerService::summarize(self, text).await
    }

    async fn answer(&self, document_text: &str, question: &str) -> Result<String, AnswerError> {
        SummarizerService::answer(self, document_text, question).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummarizerService::metrics_snapshot(self)
    }
}

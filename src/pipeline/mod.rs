//! Document summarization pipeline: redaction, chunking, and map-reduce orchestration.

pub mod chunking;
mod prompts;
pub mod redact;
mod service;
pub mod types;

pub use service::{PipelineSettings, SummarizerApi, SummarizerService};
pub use types::{AnswerError, ChunkingError, SummarizationError, SummaryOutcome};

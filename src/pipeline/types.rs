//! Core data types and error definitions for the summarization pipeline.

use crate::completion::CompletionError;
use thiserror::Error;

/// Errors produced while splitting text into overlapping chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Configured chunk size leaves no room for content.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Configured overlap would prevent the splitter from advancing.
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    OverlapTooLarge {
        /// Overlap requested by the caller.
        overlap: usize,
        /// Chunk size the overlap was checked against.
        chunk_size: usize,
    },
}

/// Errors emitted by the map-reduce summarization pipeline.
///
/// Policy is fail-fast: any unrecovered map or reduce failure aborts the whole
/// request. Partial summaries are never returned as if complete.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// Chunking step failed to segment the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// A map-step completion call failed after retries.
    #[error("Failed to summarize chunk {index}: {source}")]
    MapStep {
        /// Zero-based index of the chunk whose call failed.
        index: usize,
        /// Underlying completion failure.
        #[source]
        source: CompletionError,
    },
    /// The combine-and-refine completion call failed after retries.
    #[error("Failed to combine partial summaries: {0}")]
    Reduce(#[source] CompletionError),
}

/// Errors emitted by the Q&A path.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// The single completion call failed after retries.
    #[error("Failed to answer question: {0}")]
    Completion(#[from] CompletionError),
}

/// Result of a completed summarization produced by
/// [`crate::pipeline::SummarizerService::summarize`].
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    /// Final refined summary text; empty for an empty document.
    pub summary: String,
    /// Number of chunks the document was split into.
    pub chunk_count: usize,
    /// Chunk size used during splitting.
    pub chunk_size: usize,
}

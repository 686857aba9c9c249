//! Prompt builders for map, reduce, and answer completion calls.

/// System instruction for per-chunk map calls.
pub(crate) const MAP_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Summarize the user content briefly.";

/// System instruction for the combine-and-refine reduce call.
pub(crate) const REDUCE_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Please produce a concise final summary.";

/// System instruction for the Q&A call.
pub(crate) const ANSWER_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the user's text to answer their question.";

/// Separator placed between partial summaries before the reduce call.
pub(crate) const PARTIAL_SUMMARY_SEPARATOR: &str = " ";

/// Build the user prompt for one map-step chunk.
pub(crate) fn build_chunk_prompt(chunk: &str) -> String {
    format!("Text:\n{chunk}\n\nSummary:")
}

/// Build the user prompt for the reduce step from ordered partial summaries.
pub(crate) fn build_reduce_prompt(partial_summaries: &[String]) -> String {
    let combined = partial_summaries.join(PARTIAL_SUMMARY_SEPARATOR);
    format!("Combine and refine these partial summaries:\n\n{combined}\n\nFinal Summary:")
}

/// Build the user prompt embedding the redacted document and the question.
pub(crate) fn build_answer_prompt(document: &str, question: &str) -> String {
    format!("Document:\n{document}\n\nQuestion: {question}\nAnswer:")
}

#![deny(missing_docs)]

//! Core library for the docbrief summarization service.

/// HTTP routing and REST handlers.
pub mod api;
/// Chat-completion client abstraction and provider adapter.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization and Q&A counters.
pub mod metrics;
/// Redaction, chunking, and map-reduce summarization pipeline.
pub mod pipeline;

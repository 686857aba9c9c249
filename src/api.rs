//! HTTP surface for docbrief.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /summarize` – Redact a raw document, split it into overlapping chunks, and
//!   produce a map-reduce summary. Returns `{summary, chunk_count, chunk_size}`.
//! - `POST /answer` – Redact the full document and answer a free-form question against
//!   it in a single completion call.
//! - `GET /metrics` – Observe summarization and Q&A counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Handlers surface typed pipeline errors; provider-side failures map to `502` so
//! callers can tell a broken upstream from a broken request.

use crate::completion::CompletionError;
use crate::pipeline::{AnswerError, SummarizationError, SummarizerApi};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummarizerApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize_document::<S>))
        .route("/answer", post(answer_question::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Raw extracted document text to redact and summarize.
    text: String,
}

/// Success response for the `POST /summarize` endpoint.
#[derive(Serialize)]
struct SummarizeResponse {
    /// Final refined summary; empty for an empty document.
    summary: String,
    /// Number of chunks the document was split into.
    chunk_count: usize,
    /// Chunk size used for this request.
    chunk_size: usize,
}

/// Summarize a document through the redact/chunk/map-reduce pipeline.
async fn summarize_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummarizerApi,
{
    let outcome = service.summarize(&request.text).await?;
    tracing::info!(
        chunks = outcome.chunk_count,
        chunk_size = outcome.chunk_size,
        "Summarize request completed"
    );
    Ok(Json(SummarizeResponse {
        summary: outcome.summary,
        chunk_count: outcome.chunk_count,
        chunk_size: outcome.chunk_size,
    }))
}

/// Request body for the `POST /answer` endpoint.
#[derive(Deserialize)]
struct AnswerRequest {
    /// Raw extracted document text used as context.
    text: String,
    /// Free-form question about the document.
    question: String,
}

/// Success response for the `POST /answer` endpoint.
#[derive(Serialize)]
struct AnswerResponse {
    /// Model answer returned verbatim.
    answer: String,
}

/// Answer a question against the redacted full document.
async fn answer_question<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError>
where
    S: SummarizerApi,
{
    let answer = service.answer(&request.text, &request.question).await?;
    tracing::info!("Answer request completed");
    Ok(Json(AnswerResponse { answer }))
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    documents_summarized: u64,
    chunks_summarized: u64,
    questions_answered: u64,
}

/// Return a concise metrics snapshot with pipeline counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: SummarizerApi,
{
    let snapshot = service.metrics_snapshot();
    Json(MetricsResponse {
        documents_summarized: snapshot.documents_summarized,
        chunks_summarized: snapshot.chunks_summarized,
        questions_answered: snapshot.questions_answered,
    })
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Redact a raw document, chunk it, and produce a map-reduce summary. Response returns { \"summary\": string, \"chunk_count\": number, \"chunk_size\": number }.",
                request_example: Some(json!({
                    "text": "Extracted document contents"
                })),
            },
            CommandDescriptor {
                name: "answer",
                method: "POST",
                path: "/answer",
                description: "Answer a free-form question against the redacted full document in one completion call.",
                request_example: Some(json!({
                    "text": "Extracted document contents",
                    "question": "What is the main conclusion?"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return summarization and Q&A counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Provider-side failures surface as a bad gateway; everything else is internal.
fn status_for_completion(error: &CompletionError) -> StatusCode {
    match error {
        CompletionError::Provider { .. }
        | CompletionError::MalformedResponse(_)
        | CompletionError::Transport(_) => StatusCode::BAD_GATEWAY,
        CompletionError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<SummarizationError> for AppError {
    fn from(inner: SummarizationError) -> Self {
        let status = match &inner {
            SummarizationError::MapStep { source, .. } | SummarizationError::Reduce(source) => {
                status_for_completion(source)
            }
            SummarizationError::Chunking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: inner.to_string(),
        }
    }
}

impl From<AnswerError> for AppError {
    fn from(inner: AnswerError) -> Self {
        let AnswerError::Completion(source) = &inner;
        Self {
            status: status_for_completion(source),
            message: inner.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::completion::CompletionError;
    use crate::metrics::MetricsSnapshot;
    use crate::pipeline::{AnswerError, SummarizationError, SummarizerApi, SummaryOutcome};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_exposes_summarize_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let summarize = commands
            .iter()
            .find(|cmd| cmd.name == "summarize")
            .expect("summarize command present");

        assert_eq!(summarize.method, "POST");
        assert_eq!(summarize.path, "/summarize");
        assert!(summarize.description.to_lowercase().contains("redact"));
        assert!(commands.len() >= 3);
    }

    #[tokio::test]
    async fn summarize_route_returns_outcome() {
        let service = Arc::new(StubSummarizer::ok());
        let app = create_router(service.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "text": "Document body" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["summary"], "stub summary");
        assert_eq!(json["chunk_count"], 2);
        assert_eq!(json["chunk_size"], 2000);

        let texts = service.summarize_calls.lock().await;
        assert_eq!(texts.as_slice(), ["Document body"]);
    }

    #[tokio::test]
    async fn answer_route_passes_document_and_question() {
        let service = Arc::new(StubSummarizer::ok());
        let app = create_router(service.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/answer")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "text": "Document body", "question": "why?" }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["answer"], "stub answer");

        let calls = service.answer_calls.lock().await;
        assert_eq!(
            calls.as_slice(),
            [("Document body".to_string(), "why?".to_string())]
        );
    }

    #[tokio::test]
    async fn provider_failure_maps_to_bad_gateway() {
        let service = Arc::new(StubSummarizer::failing());
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "text": "Document body" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn metrics_route_reports_counters() {
        let service = Arc::new(StubSummarizer::ok());
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["documents_summarized"], 3);
        assert_eq!(json["questions_answered"], 1);
    }

    struct StubSummarizer {
        summarize_calls: Arc<Mutex<Vec<String>>>,
        answer_calls: Arc<Mutex<Vec<(String, String)>>>,
        fail: bool,
    }

    impl StubSummarizer {
        fn ok() -> Self {
            Self {
                summarize_calls: Arc::new(Mutex::new(Vec::new())),
                answer_calls: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl SummarizerApi for StubSummarizer {
        async fn summarize(&self, text: &str) -> Result<SummaryOutcome, SummarizationError> {
            if self.fail {
                return Err(SummarizationError::Reduce(CompletionError::Provider {
                    status: 500,
                    body: "upstream down".into(),
                }));
            }
            self.summarize_calls.lock().await.push(text.to_string());
            Ok(SummaryOutcome {
                summary: "stub summary".into(),
                chunk_count: 2,
                chunk_size: 2000,
            })
        }

        async fn answer(
            &self,
            document_text: &str,
            question: &str,
        ) -> Result<String, AnswerError> {
            if self.fail {
                return Err(AnswerError::Completion(CompletionError::Provider {
                    status: 500,
                    body: "upstream down".into(),
                }));
            }
            self.answer_calls
                .lock()
                .await
                .push((document_text.to_string(), question.to_string()));
            Ok("stub answer".into())
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_summarized: 3,
                chunks_summarized: 9,
                questions_answered: 1,
            }
        }
    }
}

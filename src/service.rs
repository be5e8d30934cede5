use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sink::TraceSink;

/// Failure talking to an external service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("response contained no content")]
    Empty,
}

impl From<ureq::Error> for ServiceError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(code) => ServiceError::Status {
                code,
                body: String::new(),
            },
            other => ServiceError::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Decode(e.to_string())
    }
}

/// One prompt sent on behalf of a step.
#[derive(Debug, Clone, Copy)]
pub struct LlmCall<'a> {
    /// Name of the step issuing the call.
    pub step: &'a str,
    pub prompt: &'a str,
}

/// A text-completion backend.
///
/// Implementations are shared by every run in the process, so they take
/// `&self` and must not keep per-run state. They report each call to the
/// given sink.
pub trait ReasoningService: Send + Sync {
    fn complete(&self, call: &LlmCall<'_>, sink: &dyn TraceSink) -> Result<String, ServiceError>;
}

/// A single web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "content")]
    pub snippet: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// A web search backend.
pub trait SearchService: Send + Sync {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ServiceError>;
}

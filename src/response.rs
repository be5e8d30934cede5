use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The caller-facing envelope for one run.
///
/// Serializes as `{"status":"success","result":...}` or
/// `{"status":"error","detail":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunResponse {
    Success { result: String },
    Error { detail: String },
}

impl RunResponse {
    /// Wrap a run result. The error's display text becomes `detail` verbatim.
    pub fn from_result<E: Display>(result: Result<String, E>) -> Self {
        match result {
            Ok(result) => RunResponse::Success { result },
            Err(e) => RunResponse::Error {
                detail: e.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunResponse::Success { .. })
    }
}

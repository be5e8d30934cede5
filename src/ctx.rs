use std::sync::Arc;

use tracing::debug;

use crate::agent::StepError;
use crate::service::{LlmCall, ReasoningService, SearchHit, SearchService, ServiceError};
use crate::sink::{NoopSink, TraceSink};

/// Execution context for steps: the process-wide service handles.
///
/// Built once at startup and shared by every run. Cloning is cheap.
#[derive(Clone)]
pub struct Ctx {
    llm: Arc<dyn ReasoningService>,
    search: Arc<dyn SearchService>,
    sink: Arc<dyn TraceSink>,
}

impl Ctx {
    pub fn new(llm: Arc<dyn ReasoningService>, search: Arc<dyn SearchService>) -> Self {
        Self {
            llm,
            search,
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Send one prompt on behalf of `step`. Errors are not caught here.
    pub fn complete(&self, step: &str, prompt: &str) -> Result<String, StepError> {
        debug!(step, "sending prompt");
        let call = LlmCall { step, prompt };
        Ok(self.llm.complete(&call, self.sink.as_ref())?)
    }

    /// Run a web search. The raw service error is returned so the caller can
    /// decide whether it is recoverable.
    pub fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ServiceError> {
        debug!(query, max_results, "searching");
        self.search.search(query, max_results)
    }
}

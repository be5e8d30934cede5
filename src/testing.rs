//! Fake services shared by unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ctx::Ctx;
use crate::service::{LlmCall, ReasoningService, SearchHit, SearchService, ServiceError};
use crate::sink::{TraceSink, traced};

/// Answers every prompt with the same reply, optionally failing for one step.
pub struct EchoLlm {
    reply: String,
    fail_on: Option<&'static str>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl EchoLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_on: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, step: &'static str) -> Self {
        self.fail_on = Some(step);
        self
    }

    pub fn prompt_for(&self, step: &str) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == step)
            .map(|(_, p)| p.clone())
    }
}

impl ReasoningService for EchoLlm {
    fn complete(&self, call: &LlmCall<'_>, sink: &dyn TraceSink) -> Result<String, ServiceError> {
        self.prompts
            .lock()
            .unwrap()
            .push((call.step.to_string(), call.prompt.to_string()));
        traced(sink, call, || match self.fail_on {
            Some(step) if step == call.step || step == "*" => {
                Err(ServiceError::Transport("model overloaded".into()))
            }
            _ => Ok(self.reply.clone()),
        })
    }
}

/// Returns a fixed hit list and records each query.
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl SearchService for StaticSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ServiceError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

pub struct FailingSearch;

impl SearchService for FailingSearch {
    fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>, ServiceError> {
        Err(ServiceError::Transport("search quota exhausted".into()))
    }
}

pub fn ctx(llm: &Arc<EchoLlm>, search: Arc<dyn SearchService>) -> Ctx {
    Ctx::new(llm.clone(), search)
}

pub fn echo_ctx(reply: &str) -> Ctx {
    Ctx::new(
        Arc::new(EchoLlm::new(reply)),
        Arc::new(StaticSearch::new(vec![SearchHit::new("A", "B")])),
    )
}

/// Records `start {step}` and `end {step} ok|err` for every reasoning call.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<String>>,
}

impl TraceSink for RecordingSink {
    fn on_llm_start(&self, call: &LlmCall<'_>) {
        self.events.lock().unwrap().push(format!("start {}", call.step));
    }

    fn on_llm_end(
        &self,
        call: &LlmCall<'_>,
        outcome: Result<&str, &ServiceError>,
        _elapsed: Duration,
    ) {
        let tag = if outcome.is_ok() { "ok" } else { "err" };
        self.events
            .lock()
            .unwrap()
            .push(format!("end {} {tag}", call.step));
    }
}

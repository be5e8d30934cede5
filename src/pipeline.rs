use tracing::{info, instrument};

use crate::steps::{self, WebSearchStep};
use crate::workflow::END;
use crate::{Ctx, Runner, State, StepError, Workflow, WorkflowError};

/// Separator between transcript entries in the joined report.
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// Build the six-step analysis workflow:
/// planner, web search, technical, macro, sentiment, writer.
pub fn analysis_workflow(max_results: usize) -> Result<Workflow, WorkflowError> {
    Workflow::builder("market-analysis")
        .register(steps::planner())
        .register(WebSearchStep::new(max_results))
        .register(steps::technical_analyst())
        .register(steps::macro_analyst())
        .register(steps::sentiment_analyst())
        .register(steps::writer())
        .start_at("planner")
        .then("web_searcher")
        .then("technical_analyst")
        .then("macro_analyst")
        .then("sentiment_analyst")
        .then("writer")
        .then(END)
        .build()
}

/// The run entry point: query in, joined transcript out.
///
/// Build once and reuse; each call to [`Pipeline::run`] gets its own state.
pub struct Pipeline {
    runner: Runner,
}

impl Pipeline {
    pub fn new() -> Result<Self, WorkflowError> {
        Self::with_max_results(steps::DEFAULT_MAX_RESULTS)
    }

    pub fn with_max_results(max_results: usize) -> Result<Self, WorkflowError> {
        let wf = analysis_workflow(max_results)?;
        Ok(Self {
            runner: Runner::new(wf).with_tracing(),
        })
    }

    pub fn step_names(&self) -> &[&'static str] {
        self.runner.workflow().order()
    }

    /// Run every step and return the final state.
    pub fn run_state(&self, query: &str, ctx: &Ctx) -> Result<State, StepError> {
        self.runner.run(State::new(query), ctx)
    }

    /// Run every step and join the transcript with blank lines.
    #[instrument(skip(self, ctx), fields(workflow = self.runner.workflow().name()))]
    pub fn run(&self, query: &str, ctx: &Ctx) -> Result<String, StepError> {
        let state = self.run_state(query, ctx)?;
        let transcript = state.into_transcript();
        info!(entries = transcript.len(), "analysis complete");
        Ok(transcript.join(ENTRY_SEPARATOR))
    }
}

/// Build a default pipeline and run `query` through it once.
pub fn run(query: &str, ctx: &Ctx) -> Result<String, StepError> {
    let pipeline = Pipeline::new().map_err(|e| StepError::invalid(e.to_string()))?;
    pipeline.run(query, ctx)
}

//! A linear multi-analyst research pipeline.
//!
//! A fixed chain of steps runs over one shared [`State`]: a planner, a web
//! search step, three analysts and a writer. Each step reads fields written
//! by earlier steps, makes its external call(s) and returns a [`Patch`] that
//! sets the one field it owns and appends one entry to the transcript. The
//! [`Pipeline`] joins the transcript into the final report.
//!
//! # Quick start
//!
//! ```rust
//! use analyst_line::{Agent, CallKind, Ctx, Field, Patch, Runner, State, StepResult, Workflow, END};
//!
//! struct Shout;
//! impl Agent for Shout {
//!     fn name(&self) -> &'static str { "shout" }
//!     fn title(&self) -> &'static str { "Shouter" }
//!     fn reads(&self) -> &'static [Field] { &[Field::Query] }
//!     fn writes(&self) -> Field { Field::Plan }
//!     fn calls(&self) -> CallKind { CallKind::None }
//!     fn run(&self, state: &State, _ctx: &Ctx) -> StepResult {
//!         let loud = state.query().to_uppercase();
//!         Ok(Patch::new().set(Field::Plan, loud.as_str()).with_entry(self.title(), &loud))
//!     }
//! }
//!
//! let wf = Workflow::builder("demo")
//!     .register(Shout)
//!     .then(END)
//!     .build()
//!     .unwrap();
//!
//! # struct Quiet;
//! # impl analyst_line::ReasoningService for Quiet {
//! #     fn complete(&self, _: &analyst_line::LlmCall<'_>, _: &dyn analyst_line::TraceSink)
//! #         -> Result<String, analyst_line::ServiceError> { Ok(String::new()) }
//! # }
//! # impl analyst_line::SearchService for Quiet {
//! #     fn search(&self, _: &str, _: usize)
//! #         -> Result<Vec<analyst_line::SearchHit>, analyst_line::ServiceError> { Ok(vec![]) }
//! # }
//! # let ctx = Ctx::new(std::sync::Arc::new(Quiet), std::sync::Arc::new(Quiet));
//! let state = Runner::new(wf).run(State::new("buy?"), &ctx).unwrap();
//! assert_eq!(state.get(Field::Plan), Some("BUY?"));
//! assert_eq!(state.transcript(), &["**Shouter**\n\nBUY?".to_string()]);
//! ```

mod agent;
pub mod clients;
pub mod config;
mod ctx;
pub mod pipeline;
mod response;
mod runner;
mod service;
pub mod sink;
mod state;
pub mod steps;
pub mod tools;
pub mod transcript;
mod workflow;

#[cfg(test)]
mod testing;

pub use agent::{Agent, CallKind, StepError, StepResult};
pub use config::{Config, ConfigError};
pub use ctx::Ctx;
pub use pipeline::{Pipeline, analysis_workflow, run};
pub use response::RunResponse;
pub use runner::{ErrorEvent, Runner, StepEvent};
pub use service::{LlmCall, ReasoningService, SearchHit, SearchService, ServiceError};
pub use sink::{NoopSink, OtelSink, TraceSink, TracingSink};
pub use state::{Field, MergePolicy, Patch, State};
pub use workflow::{END, Workflow, WorkflowBuilder, WorkflowError};

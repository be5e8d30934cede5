use thiserror::Error;

use crate::ctx::Ctx;
use crate::service::ServiceError;
use crate::state::{Field, Patch, State};

/// The result of running a step: the patch to merge into state.
pub type StepResult = Result<Patch, StepError>;

/// The external calls a step makes each time it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    None,
    /// One reasoning-service call.
    Llm,
    /// One reasoning-service call to build a query, then one search call.
    LlmAndSearch,
}

/// One unit of the pipeline.
///
/// A step reads the fields it declares in [`Agent::reads`], performs its
/// external work and returns a [`Patch`] that sets [`Agent::writes`] and adds
/// exactly one transcript entry. Steps take `&self` so a built workflow can
/// serve several runs at once.
pub trait Agent: Send + Sync + 'static {
    /// A unique name for this step, used to wire edges.
    fn name(&self) -> &'static str;

    /// Heading of the step's transcript entry.
    fn title(&self) -> &'static str;

    /// Fields this step reads. Each must be seeded or written by an earlier step.
    fn reads(&self) -> &'static [Field];

    /// The single result field this step owns.
    fn writes(&self) -> Field;

    fn calls(&self) -> CallKind;

    /// Run one step against the state as left by all earlier steps.
    fn run(&self, state: &State, ctx: &Ctx) -> StepResult;
}

/// Error type for agent steps, with variants designed around what the caller
/// can do about them.
#[derive(Debug, Error)]
pub enum StepError {
    /// Bad input or agent logic error. Don't retry, fix the code.
    #[error("invalid: {0}")]
    Invalid(String),
    /// An external service call failed. Displays the service's own message.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Everything else. Inspect the message for details.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    /// Create an [`Invalid`](StepError::Invalid) error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        StepError::Invalid(msg.into())
    }

    /// Create an [`Other`](StepError::Other) error.
    pub fn other(msg: impl Into<String>) -> Self {
        StepError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- StepError constructors ---

    #[test]
    fn invalid_constructor() {
        let err = StepError::invalid("bad input");
        assert!(matches!(err, StepError::Invalid(msg) if msg == "bad input"));
    }

    #[test]
    fn other_constructor() {
        let err = StepError::other("something");
        assert!(matches!(err, StepError::Other(msg) if msg == "something"));
    }

    // --- StepError Display ---

    #[test]
    fn display_invalid() {
        let err = StepError::Invalid("bad input".into());
        assert_eq!(err.to_string(), "invalid: bad input");
    }

    #[test]
    fn display_other() {
        let err = StepError::Other("something".into());
        assert_eq!(err.to_string(), "something");
    }

    #[test]
    fn service_error_displays_unchanged() {
        let err: StepError = ServiceError::Transport("quota exceeded".into()).into();
        assert_eq!(err.to_string(), "quota exceeded");
        assert!(matches!(err, StepError::Service(_)));
    }
}

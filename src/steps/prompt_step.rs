use tracing::debug;

use super::template::render;
use crate::{Agent, CallKind, Ctx, Field, Patch, State, StepResult};

/// A step that fills one template from state and asks the reasoning service.
///
/// Reasoning errors are returned as-is and end the run.
pub struct PromptStep {
    name: &'static str,
    title: &'static str,
    template: &'static str,
    reads: &'static [Field],
    writes: Field,
}

impl PromptStep {
    pub const fn new(
        name: &'static str,
        title: &'static str,
        template: &'static str,
        reads: &'static [Field],
        writes: Field,
    ) -> Self {
        Self {
            name,
            title,
            template,
            reads,
            writes,
        }
    }

    pub fn template(&self) -> &'static str {
        self.template
    }
}

impl Agent for PromptStep {
    fn name(&self) -> &'static str {
        self.name
    }

    fn title(&self) -> &'static str {
        self.title
    }

    fn reads(&self) -> &'static [Field] {
        self.reads
    }

    fn writes(&self) -> Field {
        self.writes
    }

    fn calls(&self) -> CallKind {
        CallKind::Llm
    }

    fn run(&self, state: &State, ctx: &Ctx) -> StepResult {
        let prompt = render(self.template, state)?;
        let response = ctx.complete(self.name, &prompt)?;
        debug!(step = self.name, len = response.len(), "step produced result");

        Ok(Patch::new()
            .set(self.writes, response.as_str())
            .with_entry(self.title, &response))
    }
}

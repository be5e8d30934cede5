use crate::state::Field;
use crate::workflow::END;
use crate::{Agent, CallKind, Ctx, Patch, State, StepError, Workflow};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Passed to the `on_step` hook after each successful agent step.
pub struct StepEvent<'a> {
    pub agent: &'a str,
    pub title: &'a str,
    pub calls: CallKind,
    pub duration: Duration,
    pub step_number: usize,
}

/// Passed to the `on_error` hook when an agent errors.
pub struct ErrorEvent<'a> {
    pub agent: &'a str,
    pub error: &'a StepError,
    pub step_number: usize,
}

type StepHook = Box<dyn Fn(&StepEvent) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&ErrorEvent) + Send + Sync>;

/// Drives a [`Workflow`] from its start step to [`END`].
///
/// A runner holds no per-run data, so one instance can serve concurrent runs.
pub struct Runner {
    wf: Workflow,
    on_step: Option<StepHook>,
    on_error: Option<ErrorHook>,
}

impl Runner {
    pub fn new(wf: Workflow) -> Self {
        Self {
            wf,
            on_step: None,
            on_error: None,
        }
    }

    /// Register a callback that fires after each successful agent step.
    pub fn on_step(mut self, cb: impl Fn(&StepEvent) + Send + Sync + 'static) -> Self {
        self.on_step = Some(Box::new(cb));
        self
    }

    /// Register a callback that fires when an agent errors.
    pub fn on_error(mut self, cb: impl Fn(&ErrorEvent) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(cb));
        self
    }

    /// Set both hooks to log step transitions and errors through `tracing`.
    pub fn with_tracing(self) -> Self {
        let workflow = self.wf.name();
        self.on_step(move |e| {
            info!(
                workflow,
                step = e.step_number,
                agent = e.agent,
                calls = ?e.calls,
                elapsed_ms = e.duration.as_millis() as u64,
                "{} finished",
                e.title
            );
        })
        .on_error(move |e| {
            error!(
                workflow,
                step = e.step_number,
                agent = e.agent,
                error = %e.error,
                "step failed"
            );
        })
    }

    pub fn workflow(&self) -> &Workflow {
        &self.wf
    }

    /// Run every step in order, merging each patch into `state`.
    ///
    /// The first step error stops the run and is returned as-is; the partly
    /// built state is dropped.
    pub fn run(&self, mut state: State, ctx: &Ctx) -> Result<State, StepError> {
        let mut current = self.wf.start();
        let mut step_number: usize = 0;

        loop {
            step_number += 1;

            let agent = self
                .wf
                .agent(current)
                .ok_or_else(|| StepError::other(format!("unknown step: {current}")))?;

            let start = Instant::now();
            let result = agent
                .run(&state, ctx)
                .and_then(|patch| check_ownership(agent, patch));
            let duration = start.elapsed();

            match result {
                Err(err) => {
                    if let Some(cb) = &self.on_error {
                        cb(&ErrorEvent {
                            agent: current,
                            error: &err,
                            step_number,
                        });
                    }
                    return Err(err);
                }
                Ok(patch) => {
                    state.apply(patch);
                    if let Some(cb) = &self.on_step {
                        cb(&StepEvent {
                            agent: current,
                            title: agent.title(),
                            calls: agent.calls(),
                            duration,
                            step_number,
                        });
                    }
                }
            }

            match self.wf.default_next(current) {
                Some(END) => return Ok(state),
                Some(next) => current = next,
                None => {
                    return Err(StepError::other(format!(
                        "step '{current}' has no next step configured"
                    )));
                }
            }
        }
    }
}

/// A patch may set only the agent's own field, once, plus exactly one
/// transcript entry.
fn check_ownership(agent: &dyn Agent, patch: Patch) -> Result<Patch, StepError> {
    let owned = agent.writes();
    let mut entries = 0;
    let mut sets = 0;

    for (field, _) in patch.updates() {
        match *field {
            Field::Transcript => entries += 1,
            f if f == owned => sets += 1,
            f => {
                return Err(StepError::invalid(format!(
                    "step '{}' wrote field '{f}' it does not own",
                    agent.name()
                )));
            }
        }
    }

    if entries != 1 || sets != 1 {
        return Err(StepError::invalid(format!(
            "step '{}' must set '{owned}' once and add one transcript entry (set {sets}, added {entries})",
            agent.name()
        )));
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::echo_ctx;
    use crate::StepResult;
    use std::sync::{Arc, Mutex};

    /// A step whose patch comes from a plain function.
    struct Scripted {
        name: &'static str,
        reads: &'static [Field],
        writes: Field,
        patch: fn(&State, Field) -> StepResult,
    }

    impl Agent for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }
        fn title(&self) -> &'static str {
            self.name
        }
        fn reads(&self) -> &'static [Field] {
            self.reads
        }
        fn writes(&self) -> Field {
            self.writes
        }
        fn calls(&self) -> CallKind {
            CallKind::None
        }
        fn run(&self, state: &State, _ctx: &Ctx) -> StepResult {
            (self.patch)(state, self.writes)
        }
    }

    fn well_behaved(state: &State, field: Field) -> StepResult {
        // Record how much transcript this step could see.
        let seen = state.transcript().len().to_string();
        Ok(Patch::new().set(field, seen.clone()).with_entry(field.key(), &seen))
    }

    fn step(name: &'static str, reads: &'static [Field], writes: Field) -> Scripted {
        Scripted {
            name,
            reads,
            writes,
            patch: well_behaved,
        }
    }

    fn two_step(second: Scripted) -> Runner {
        let wf = Workflow::builder("test")
            .register(step("first", &[Field::Query], Field::Plan))
            .register(second)
            .start_at("first")
            .then("second")
            .then(END)
            .build()
            .unwrap();
        Runner::new(wf)
    }

    #[test]
    fn runs_in_order_and_feeds_state_forward() {
        let runner = two_step(step("second", &[Field::Plan], Field::Synthesis));
        let state = runner.run(State::new("q"), &echo_ctx("x")).unwrap();

        assert_eq!(state.get(Field::Plan), Some("0"));
        assert_eq!(state.get(Field::Synthesis), Some("1"));
        assert_eq!(
            state.transcript(),
            &["**plan**\n\n0".to_string(), "**synthesis**\n\n1".to_string()]
        );
    }

    #[test]
    fn error_stops_run_and_returns_it_unchanged() {
        let runner = two_step(Scripted {
            patch: |_, _| Err(StepError::other("boom")),
            ..step("second", &[Field::Plan], Field::Synthesis)
        });

        let err = runner.run(State::new("q"), &echo_ctx("x")).unwrap_err();
        assert!(matches!(err, StepError::Other(msg) if msg == "boom"));
    }

    #[test]
    fn writing_foreign_field_is_fatal() {
        let runner = two_step(Scripted {
            patch: |_, _| Ok(Patch::new().set(Field::Critique, "x").with_entry("t", "x")),
            ..step("second", &[], Field::Synthesis)
        });

        let err = runner.run(State::new("q"), &echo_ctx("x")).unwrap_err();
        assert!(matches!(err, StepError::Invalid(_)));
        assert!(err.to_string().contains("'critique' it does not own"));
    }

    #[test]
    fn missing_transcript_entry_is_fatal() {
        let runner = two_step(Scripted {
            patch: |_, field| Ok(Patch::new().set(field, "x")),
            ..step("second", &[], Field::Synthesis)
        });

        let err = runner.run(State::new("q"), &echo_ctx("x")).unwrap_err();
        assert!(err.to_string().contains("added 0"));
    }

    #[test]
    fn on_step_fires_per_step_with_numbers() {
        let steps = Arc::new(Mutex::new(Vec::new()));
        let steps_clone = Arc::clone(&steps);

        let runner = two_step(step("second", &[], Field::Synthesis)).on_step(move |e| {
            steps_clone
                .lock()
                .unwrap()
                .push((e.step_number, e.agent.to_string()));
        });

        runner.run(State::new("q"), &echo_ctx("x")).unwrap();

        let steps = steps.lock().unwrap();
        assert_eq!(
            *steps,
            vec![(1, "first".to_string()), (2, "second".to_string())]
        );
    }

    #[test]
    fn on_error_fires_on_agent_error() {
        let count = Arc::new(Mutex::new(0usize));
        let count_clone = Arc::clone(&count);

        let runner = two_step(Scripted {
            patch: |_, _| Err(StepError::other("nope")),
            ..step("second", &[], Field::Synthesis)
        })
        .on_error(move |e| {
            assert_eq!(e.agent, "second");
            assert_eq!(e.step_number, 2);
            *count_clone.lock().unwrap() += 1;
        });

        let _ = runner.run(State::new("q"), &echo_ctx("x"));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn with_tracing_does_not_change_results() {
        let runner = two_step(step("second", &[], Field::Synthesis)).with_tracing();
        let state = runner.run(State::new("q"), &echo_ctx("x")).unwrap();
        assert_eq!(state.transcript().len(), 2);
    }

    #[test]
    fn runner_is_shareable_across_threads() {
        let runner = two_step(step("second", &[], Field::Synthesis));
        let ctx = echo_ctx("x");

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let runner = &runner;
                    let ctx = &ctx;
                    s.spawn(move || runner.run(State::new(format!("q{i}")), ctx).unwrap())
                })
                .collect();
            for (i, h) in handles.into_iter().enumerate() {
                let state = h.join().unwrap();
                assert_eq!(state.query(), format!("q{i}"));
                assert_eq!(state.transcript().len(), 2);
            }
        });
    }
}

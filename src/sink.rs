//! Observability side channel for reasoning-service calls.
//!
//! A sink is handed to every [`ReasoningService::complete`] call. Nothing it
//! does feeds back into the run.
//!
//! [`ReasoningService::complete`]: crate::ReasoningService::complete

use std::borrow::Cow;
use std::time::{Duration, Instant, SystemTime};

use opentelemetry::trace::{Span, Status, Tracer};
use opentelemetry::{KeyValue, global};
use tracing::{debug, warn};

use crate::service::{LlmCall, ServiceError};

pub trait TraceSink: Send + Sync {
    fn on_llm_start(&self, _call: &LlmCall<'_>) {}

    fn on_llm_end(
        &self,
        _call: &LlmCall<'_>,
        _outcome: Result<&str, &ServiceError>,
        _elapsed: Duration,
    ) {
    }
}

/// Run `f` as one reasoning call, reporting start and end to `sink`.
pub fn traced<F>(sink: &dyn TraceSink, call: &LlmCall<'_>, f: F) -> Result<String, ServiceError>
where
    F: FnOnce() -> Result<String, ServiceError>,
{
    sink.on_llm_start(call);
    let start = Instant::now();
    let result = f();
    sink.on_llm_end(call, result.as_deref(), start.elapsed());
    result
}

/// Drops everything.
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Emits `tracing` events.
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn on_llm_start(&self, call: &LlmCall<'_>) {
        debug!(step = call.step, prompt_len = call.prompt.len(), "llm call started");
    }

    fn on_llm_end(
        &self,
        call: &LlmCall<'_>,
        outcome: Result<&str, &ServiceError>,
        elapsed: Duration,
    ) {
        match outcome {
            Ok(text) => debug!(
                step = call.step,
                response_len = text.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "llm call finished"
            ),
            Err(e) => warn!(
                step = call.step,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "llm call failed"
            ),
        }
    }
}

/// Records one OpenTelemetry span per call on the global tracer provider.
pub struct OtelSink {
    tracer_name: Cow<'static, str>,
}

impl OtelSink {
    pub fn new(tracer_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tracer_name: tracer_name.into(),
        }
    }
}

impl Default for OtelSink {
    fn default() -> Self {
        Self::new("analyst-line")
    }
}

impl TraceSink for OtelSink {
    fn on_llm_end(
        &self,
        call: &LlmCall<'_>,
        outcome: Result<&str, &ServiceError>,
        elapsed: Duration,
    ) {
        let tracer = global::tracer(self.tracer_name.clone());
        let end = SystemTime::now();
        let start = end.checked_sub(elapsed).unwrap_or(end);

        let mut span = tracer
            .span_builder(format!("llm {}", call.step))
            .with_start_time(start)
            .with_attributes([
                KeyValue::new("step", call.step.to_string()),
                KeyValue::new("prompt.length", call.prompt.len() as i64),
            ])
            .start(&tracer);

        match outcome {
            Ok(text) => span.set_attribute(KeyValue::new("response.length", text.len() as i64)),
            Err(e) => span.set_status(Status::error(e.to_string())),
        }
        span.end_with_timestamp(end);
    }
}

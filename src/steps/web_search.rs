use tracing::{info, warn};

use super::prompts::SEARCH_QUERY;
use super::template::render;
use crate::service::SearchHit;
use crate::{Agent, CallKind, Ctx, Field, Patch, State, StepResult};

/// Default number of search results requested.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Asks the reasoning service for a search query, runs it, and records the
/// findings.
///
/// Reasoning errors end the run. Search errors do not: the findings become a
/// one-line diagnostic and the run carries on with it.
pub struct WebSearchStep {
    max_results: usize,
}

impl WebSearchStep {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }
}

impl Default for WebSearchStep {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULTS)
    }
}

impl Agent for WebSearchStep {
    fn name(&self) -> &'static str {
        "web_searcher"
    }

    fn title(&self) -> &'static str {
        "Web Search Agent (Tavily)"
    }

    fn reads(&self) -> &'static [Field] {
        &[Field::Query, Field::Plan]
    }

    fn writes(&self) -> Field {
        Field::WebSearchResults
    }

    fn calls(&self) -> CallKind {
        CallKind::LlmAndSearch
    }

    fn run(&self, state: &State, ctx: &Ctx) -> StepResult {
        let prompt = render(SEARCH_QUERY, state)?;
        let reply = ctx.complete(self.name(), &prompt)?;
        let query = reply.trim();

        let findings = match ctx.search(query, self.max_results) {
            Ok(hits) => {
                info!(query = %query, hits = hits.len(), "web search finished");
                format_findings(query, &hits)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "web search failed, continuing");
                format!("Error during web search: {e}")
            }
        };

        Ok(Patch::new()
            .set(self.writes(), findings.as_str())
            .with_entry(self.title(), &findings))
    }
}

fn format_findings(query: &str, hits: &[SearchHit]) -> String {
    let lines: Vec<String> = hits
        .iter()
        .map(|h| format!("- {}: {}", h.title, h.snippet))
        .collect();
    format!(
        "Executing Tavily web search for \"{query}\". Key findings:\n{}",
        lines.join("\n")
    )
}

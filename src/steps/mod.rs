//! The analysis steps and their fixed order.

mod prompt_step;
pub mod prompts;
mod template;
mod web_search;

pub use prompt_step::PromptStep;
pub use template::{placeholders, render};
pub use web_search::{DEFAULT_MAX_RESULTS, WebSearchStep};

use crate::state::Field;

pub fn planner() -> PromptStep {
    PromptStep::new(
        "planner",
        "Planner Agent",
        prompts::PLANNER,
        &[Field::Query],
        Field::Plan,
    )
}

pub fn technical_analyst() -> PromptStep {
    PromptStep::new(
        "technical_analyst",
        "Technical Analyst",
        prompts::TECHNICAL,
        &[Field::WebSearchResults],
        Field::TechnicalAnalysis,
    )
}

pub fn macro_analyst() -> PromptStep {
    PromptStep::new(
        "macro_analyst",
        "Macro Analyst",
        prompts::MACRO,
        &[Field::WebSearchResults],
        Field::MacroAnalysis,
    )
}

pub fn sentiment_analyst() -> PromptStep {
    PromptStep::new(
        "sentiment_analyst",
        "Sentiment Analyst",
        prompts::SENTIMENT,
        &[Field::WebSearchResults],
        Field::SentimentAnalysis,
    )
}

pub fn writer() -> PromptStep {
    PromptStep::new(
        "writer",
        "Final Synthesis",
        prompts::WRITER,
        &[
            Field::TechnicalAnalysis,
            Field::MacroAnalysis,
            Field::SentimentAnalysis,
            Field::WebSearchResults,
        ],
        Field::FinalReport,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Agent;

    #[test]
    fn declared_reads_match_template_placeholders() {
        for step in [
            planner(),
            technical_analyst(),
            macro_analyst(),
            sentiment_analyst(),
            writer(),
        ] {
            let mut declared = step.reads().to_vec();
            let mut used = placeholders(step.template());
            declared.sort();
            used.sort();
            assert_eq!(declared, used, "{}", step.name());
        }

        let mut used = placeholders(prompts::SEARCH_QUERY);
        used.sort();
        assert_eq!(used, WebSearchStep::default().reads());
    }
}

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

/// A named slot in the shared run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// The caller's question. Seeded by [`State::new`], never patched.
    Query,
    Plan,
    PriceVerification,
    VectorRetrieval,
    WebSearchResults,
    TechnicalAnalysis,
    MacroAnalysis,
    SentimentAnalysis,
    Synthesis,
    Critique,
    FinalReport,
    /// Ordered, accumulate-only record of every executed step.
    Transcript,
}

/// How a patched value is merged into a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The value replaces whatever was there. Only expected once per run.
    Overwrite,
    /// The value is appended to the field's list.
    Append,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Query,
        Field::Plan,
        Field::PriceVerification,
        Field::VectorRetrieval,
        Field::WebSearchResults,
        Field::TechnicalAnalysis,
        Field::MacroAnalysis,
        Field::SentimentAnalysis,
        Field::Synthesis,
        Field::Critique,
        Field::FinalReport,
        Field::Transcript,
    ];

    /// The placeholder name used in prompt templates.
    pub const fn key(self) -> &'static str {
        match self {
            Field::Query => "query",
            Field::Plan => "plan",
            Field::PriceVerification => "price_verification",
            Field::VectorRetrieval => "vector_retrieval",
            Field::WebSearchResults => "web_search_results",
            Field::TechnicalAnalysis => "technical_analysis",
            Field::MacroAnalysis => "macro_analysis",
            Field::SentimentAnalysis => "sentiment_analysis",
            Field::Synthesis => "synthesis",
            Field::Critique => "critique",
            Field::FinalReport => "final_report",
            Field::Transcript => "transcript",
        }
    }

    pub const fn merge_policy(self) -> MergePolicy {
        match self {
            Field::Transcript => MergePolicy::Append,
            _ => MergePolicy::Overwrite,
        }
    }

    /// Look up a field by its template key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A partial state update returned by a step.
///
/// A patch only records `(field, value)` pairs in order. Whether a value
/// replaces or extends the field is decided by [`Field::merge_policy`] when
/// the patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    updates: Vec<(Field, String)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: Field, value: impl Into<String>) -> Self {
        self.updates.push((field, value.into()));
        self
    }

    /// Add one transcript entry with the standard `**Title**` heading.
    pub fn with_entry(self, title: &str, content: &str) -> Self {
        self.set(Field::Transcript, Patch::entry(title, content))
    }

    /// Format a transcript entry.
    pub fn entry(title: &str, content: &str) -> String {
        format!("**{title}**\n\n{content}")
    }

    pub fn updates(&self) -> &[(Field, String)] {
        &self.updates
    }

    /// The transcript entries this patch would append, in order.
    pub fn transcript_delta(&self) -> impl Iterator<Item = &str> {
        self.updates
            .iter()
            .filter(|(f, _)| *f == Field::Transcript)
            .map(|(_, v)| v.as_str())
    }
}

/// The shared record a single run evolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    values: BTreeMap<Field, String>,
    lists: BTreeMap<Field, Vec<String>>,
}

impl State {
    /// Fresh state with only the query set and an empty transcript.
    pub fn new(query: impl Into<String>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(Field::Query, query.into());
        Self {
            values,
            lists: BTreeMap::new(),
        }
    }

    pub fn query(&self) -> &str {
        self.values
            .get(&Field::Query)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// The value of an overwrite field, if some step has written it.
    ///
    /// Append fields have no single value; use [`State::list`].
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn list(&self, field: Field) -> &[String] {
        self.lists.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_written(&self, field: Field) -> bool {
        match field.merge_policy() {
            MergePolicy::Overwrite => self.values.contains_key(&field),
            MergePolicy::Append => self.lists.contains_key(&field),
        }
    }

    pub fn transcript(&self) -> &[String] {
        self.list(Field::Transcript)
    }

    pub fn into_transcript(mut self) -> Vec<String> {
        self.lists.remove(&Field::Transcript).unwrap_or_default()
    }

    /// Merge a patch into this state.
    ///
    /// Append fields concatenate. Overwrite fields must not already hold a
    /// value: that is a wiring defect and panics in debug builds. Release
    /// builds overwrite and log a warning.
    pub fn apply(&mut self, patch: Patch) {
        for (field, value) in patch.updates {
            match field.merge_policy() {
                MergePolicy::Append => self.lists.entry(field).or_default().push(value),
                MergePolicy::Overwrite => {
                    let taken = self.values.contains_key(&field);
                    debug_assert!(!taken, "field `{field}` written twice");
                    if taken {
                        warn!(%field, "overwriting a field that was already written");
                    }
                    self.values.insert(field, value);
                }
            }
        }
    }
}

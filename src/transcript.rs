//! Reading a joined transcript back into per-step sections.

use serde::Serialize;

use crate::pipeline::ENTRY_SEPARATOR;

/// Who wrote a transcript section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Planner,
    #[serde(rename = "Price Verification")]
    PriceVerification,
    #[serde(rename = "Vector Retrieval")]
    VectorRetrieval,
    #[serde(rename = "Web Search")]
    WebSearch,
    Technical,
    Macro,
    Sentiment,
    Writer,
    Critic,
}

// Normalised step headings; a heading must equal one of these.
const ROLE_KEYS: [(&str, Role); 13] = [
    ("planner", Role::Planner),
    ("price verification", Role::PriceVerification),
    ("vector retrieval", Role::VectorRetrieval),
    ("web search", Role::WebSearch),
    ("technical", Role::Technical),
    ("technical analyst", Role::Technical),
    ("macro", Role::Macro),
    ("macro analyst", Role::Macro),
    ("sentiment", Role::Sentiment),
    ("sentiment analyst", Role::Sentiment),
    ("writer", Role::Writer),
    ("final synthesis", Role::Writer),
    ("critic", Role::Critic),
];

impl Role {
    /// Map a transcript heading such as `Web Search Agent (Tavily)` to a role.
    pub fn from_heading(heading: &str) -> Option<Role> {
        let normalised = heading
            .replace("(Tavily)", "")
            .replace(" Agent", "")
            .trim()
            .to_lowercase();
        ROLE_KEYS
            .iter()
            .find(|(key, _)| *key == normalised)
            .map(|&(_, role)| role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub role: Role,
    pub content: String,
}

/// Split a joined transcript into sections.
///
/// A paragraph consisting only of `**Heading**` with a known role opens a
/// section; every other paragraph belongs to the open section. Paragraphs
/// before the first heading are dropped.
pub fn parse_sections(text: &str) -> Vec<Section> {
    if text.starts_with("Error:") {
        return vec![Section {
            role: Role::Critic,
            content: text.to_string(),
        }];
    }

    let mut sections: Vec<Section> = Vec::new();
    let mut open = false;

    for paragraph in text.split(ENTRY_SEPARATOR).map(str::trim) {
        if paragraph.is_empty() {
            continue;
        }
        if let Some(role) = heading(paragraph).and_then(Role::from_heading) {
            sections.push(Section {
                role,
                content: String::new(),
            });
            open = true;
            continue;
        }
        if !open {
            continue;
        }
        if let Some(section) = sections.last_mut() {
            if !section.content.is_empty() {
                section.content.push_str(ENTRY_SEPARATOR);
            }
            section.content.push_str(paragraph);
        }
    }

    sections.retain(|s| !s.content.is_empty());

    if sections.is_empty() {
        let preview: String = text.chars().take(200).collect();
        let content = if preview.trim().is_empty() {
            "Analyzing...".to_string()
        } else {
            preview
        };
        return vec![Section {
            role: Role::Planner,
            content,
        }];
    }
    sections
}

fn heading(paragraph: &str) -> Option<&str> {
    let inner = paragraph.strip_prefix("**")?.strip_suffix("**")?;
    if inner.is_empty() || inner.contains('*') || inner.contains('\n') {
        return None;
    }
    Some(inner)
}

use crate::StepError;
use crate::state::{Field, State};

/// Substitute every `{field}` placeholder in `template` with the value from
/// `state`.
///
/// A placeholder naming an unknown or unwritten field is an error: it means
/// the step was wired to run before its inputs exist.
pub fn render(template: &str, state: &State) -> Result<String, StepError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            // unmatched brace, keep the remainder literally
            out.push_str(&rest[open..]);
            return Ok(out);
        };

        let key = &after[..close];
        let field = Field::from_key(key)
            .ok_or_else(|| StepError::invalid(format!("template names unknown field '{key}'")))?;
        let value = state
            .get(field)
            .ok_or_else(|| StepError::invalid(format!("field '{field}' read before it was written")))?;
        out.push_str(value);
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// The fields a template refers to, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else { break };
        if let Some(field) = Field::from_key(&after[..close]) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        rest = &after[close + 1..];
    }
    fields
}

// ── Input validation ──
//
// Applied before any store write. Text is trimmed; topics missing a name
// or an explanation are dropped rather than rejected one by one.

use crate::error::CoreError;
use crate::model::Topic;

/// Trim `value` and reject it when nothing is left.
pub fn required(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

/// Keep the topics with both a name and an explanation, trimmed.
///
/// Fails when none survive: a lecture always carries at least one topic.
pub fn sanitize_topics(topics: impl IntoIterator<Item = Topic>) -> Result<Vec<Topic>, CoreError> {
    let kept: Vec<Topic> = topics
        .into_iter()
        .filter_map(|topic| {
            let name = topic.name.trim();
            let explanation = topic.explanation.trim();
            (!name.is_empty() && !explanation.is_empty()).then(|| Topic {
                name: name.to_owned(),
                explanation: explanation.to_owned(),
                difficulty: topic.difficulty,
            })
        })
        .collect();

    if kept.is_empty() {
        return Err(CoreError::validation(
            "add at least one topic with both a name and an explanation",
        ));
    }
    Ok(kept)
}

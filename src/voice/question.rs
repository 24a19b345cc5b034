//! Question classification heuristic
//!
//! Decides whether a finalized transcript is a question worth answering.
//! Pure and stateless; classification runs on the whole transcript, not per
//! sentence. The heuristic has known blind spots (statements containing
//! "or", lead words buried mid-sentence) and is kept deliberately simple.

/// Interrogative words that mark a question when they open the transcript
const LEAD_WORDS: [&str; 15] = [
    "what", "where", "when", "who", "why", "how", "is", "are", "can", "could", "would", "should",
    "do", "does", "did",
];

/// Classify a finalized transcript as question or not
///
/// Returns true if the trimmed, lowercased text ends with `?`, starts with
/// an interrogative lead word followed by a space, or contains ` or `
/// (implicit alternative-questions like "is it A or B").
#[must_use]
pub fn is_question(text: &str) -> bool {
    let trimmed = text.trim().to_lowercase();
    if trimmed.is_empty() {
        return false;
    }

    if trimmed.ends_with('?') {
        return true;
    }

    if LEAD_WORDS
        .iter()
        .any(|word| {
            trimmed
                .strip_prefix(word)
                .is_some_and(|rest| rest.starts_with(' '))
        })
    {
        return true;
    }

    trimmed.contains(" or ")
}

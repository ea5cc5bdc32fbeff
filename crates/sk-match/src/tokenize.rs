//! Lowercase word tokens and trigger-phrase matching.

use std::collections::HashSet;

/// Lowercased alphanumeric runs of `text`, minus `stopwords`.
#[must_use]
pub fn tokenize(text: &str, stopwords: &HashSet<String>) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(|token| !stopwords.contains(token))
        .collect()
}

/// Lowercased `text` with every non-alphanumeric character removed, so
/// `GLP-1`, `glp_1`, and `glp1` compare equal.
#[must_use]
pub fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `trigger` appears in the request, exactly or as a bag of words.
///
/// The fuzzy form requires every non-stopword token of the trigger to be
/// among `query_tokens`. A trigger made only of stopwords never matches.
#[must_use]
pub fn trigger_matches(
    trigger: &str,
    query_lower: &str,
    query_tokens: &HashSet<String>,
    stopwords: &HashSet<String>,
) -> bool {
    let trigger_lower = trigger.trim().to_lowercase();
    if trigger_lower.is_empty() {
        return false;
    }
    if query_lower.contains(&trigger_lower) {
        return true;
    }
    let trigger_tokens = tokenize(&trigger_lower, stopwords);
    !trigger_tokens.is_empty() && trigger_tokens.is_subset(query_tokens)
}

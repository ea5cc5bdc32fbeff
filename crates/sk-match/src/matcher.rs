//! Additive scoring of registry entries against a `Requirements` record.

use std::collections::HashSet;

use sk_config::{DataSourceProfile, MatchingConfig};
use sk_core::{MatchResult, RegistryEntry, Requirements};
use tracing::debug;

use crate::tokenize::{squash, tokenize, trigger_matches};

const PAGINATION_PATTERN: &str = "pagination";
const MULTI_FILTER_PATTERN: &str = "multi-filter";

#[derive(Debug, Clone)]
pub struct SemanticMatcher {
    config: MatchingConfig,
    stopwords: HashSet<String>,
}

/// Request-side values computed once per query.
struct Prepared<'a> {
    requirements: &'a Requirements,
    profile: DataSourceProfile,
    sources: Vec<String>,
    query_lower: String,
    query_tokens: HashSet<String>,
    topic: String,
    keyword: String,
}

impl SemanticMatcher {
    #[must_use]
    pub fn new(config: MatchingConfig) -> Self {
        let stopwords = config
            .stopwords
            .iter()
            .map(|word| word.to_lowercase())
            .collect();
        Self { config, stopwords }
    }

    #[must_use]
    pub const fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// External services a candidate must declare to be considered:
    /// the requested servers, or the data type's default source.
    #[must_use]
    pub fn requested_sources(&self, requirements: &Requirements) -> Vec<String> {
        if requirements.servers.is_empty() {
            let source = self.config.profile(requirements.data_type.as_str()).source;
            if source.is_empty() { Vec::new() } else { vec![source] }
        } else {
            requirements.servers.clone()
        }
    }

    /// Score one entry. `None` when the entry fails the data-source pre-filter.
    #[must_use]
    pub fn score(&self, entry: &RegistryEntry, requirements: &Requirements) -> Option<MatchResult> {
        let prepared = self.prepare(requirements);
        self.score_prepared(entry, &prepared)
    }

    /// Every candidate that passes the pre-filter, highest score first.
    /// Equal scores keep registry order.
    #[must_use]
    pub fn rank(&self, entries: &[RegistryEntry], requirements: &Requirements) -> Vec<MatchResult> {
        let prepared = self.prepare(requirements);
        let mut results: Vec<MatchResult> = entries
            .iter()
            .filter_map(|entry| self.score_prepared(entry, &prepared))
            .collect();
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }

    /// The best candidate scoring at least `min_score`.
    #[must_use]
    pub fn find_matching_skill(
        &self,
        entries: &[RegistryEntry],
        requirements: &Requirements,
    ) -> Option<MatchResult> {
        let best = self
            .rank(entries, requirements)
            .into_iter()
            .next()
            .filter(|result| result.score >= self.config.min_score);
        debug!(
            data_type = %requirements.data_type,
            topic = %requirements.topic,
            best = best.as_ref().map(|result| result.entry.name.as_str()),
            score = best.as_ref().map(|result| result.score),
            "semantic match"
        );
        best
    }

    fn prepare<'a>(&self, requirements: &'a Requirements) -> Prepared<'a> {
        let profile = self.config.profile(requirements.data_type.as_str());
        let query_lower = requirements.query.to_lowercase();
        let query_tokens = tokenize(&query_lower, &self.stopwords);
        let keyword = if profile.keyword.is_empty() {
            squash(requirements.data_type.as_str())
        } else {
            squash(&profile.keyword)
        };
        Prepared {
            requirements,
            sources: self.requested_sources(requirements),
            topic: squash(&requirements.topic),
            keyword,
            profile,
            query_lower,
            query_tokens,
        }
    }

    fn score_prepared(&self, entry: &RegistryEntry, prepared: &Prepared<'_>) -> Option<MatchResult> {
        if !entry.serves_any(&prepared.sources) {
            return None;
        }

        let weights = &self.config.weights;
        let requirements = prepared.requirements;
        let name = squash(&entry.name);
        let mut score = 0;
        let mut reasons = Vec::new();

        if let Some(trigger) = entry.capability_tags.iter().find(|trigger| {
            trigger_matches(
                trigger,
                &prepared.query_lower,
                &prepared.query_tokens,
                &self.stopwords,
            )
        }) {
            score += weights.trigger_phrase;
            reasons.push(format!("trigger phrase '{trigger}' matches request"));
        }

        if !prepared.topic.is_empty() && name.contains(&prepared.topic) {
            score += weights.topic_in_name;
            reasons.push(format!("name contains topic '{}'", requirements.topic));
        }

        if !prepared.keyword.is_empty() && name.contains(&prepared.keyword) {
            score += weights.data_type_in_name;
            reasons.push(format!("name contains data type '{}'", prepared.keyword));
        }

        if requirements.has_filters() && entry.has_pattern(PAGINATION_PATTERN) {
            score += weights.pagination;
            reasons.push("supports pagination for filtered queries".to_string());
        }

        if requirements.filter_count() > 2 && entry.has_pattern(MULTI_FILTER_PATTERN) {
            score += weights.multi_filter;
            reasons.push("supports multiple filters".to_string());
        }

        if entry.complexity == requirements.implied_complexity() {
            score += weights.complexity;
            reasons.push(format!("complexity '{}' fits filter count", entry.complexity));
        }

        if !prepared.profile.category.is_empty()
            && entry.category.eq_ignore_ascii_case(&prepared.profile.category)
        {
            score += weights.category;
            reasons.push(format!("category '{}'", entry.category));
        }

        Some(MatchResult {
            entry: entry.clone(),
            score,
            matched_reasons: reasons,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sk_core::{Complexity, DataType};

    use super::*;

    fn trials_entry(name: &str) -> RegistryEntry {
        let mut entry = RegistryEntry::new(name, format!("{name}.py"), format!("{name}.md"));
        entry.data_sources.insert("ct_gov_mcp".into());
        entry
    }

    fn matcher() -> SemanticMatcher {
        SemanticMatcher::new(MatchingConfig::default())
    }

    #[test]
    fn entries_outside_requested_sources_are_never_scored() {
        let mut entry = trials_entry("get_glp1_trials");
        entry.data_sources.clear();
        entry.data_sources.insert("pubmed_mcp".into());
        let requirements = Requirements::new(DataType::Trials, "glp1");

        assert_eq!(matcher().score(&entry, &requirements), None);
    }

    #[test]
    fn explicit_servers_replace_the_default_source() {
        let mut requirements = Requirements::new(DataType::Trials, "glp1");
        requirements.servers = vec!["pubmed_mcp".into()];
        assert_eq!(matcher().requested_sources(&requirements), vec!["pubmed_mcp"]);

        let requirements = Requirements::new(DataType::Trials, "glp1");
        assert_eq!(matcher().requested_sources(&requirements), vec!["ct_gov_mcp"]);
    }

    #[test]
    fn topic_and_data_type_are_matched_ignoring_punctuation() {
        let entry = trials_entry("get_glp1_trials");
        let requirements = Requirements::new(DataType::Trials, "GLP-1");

        let result = matcher().score(&entry, &requirements).expect("passes pre-filter");

        // topic (10) + data type (8) + simple complexity for no filters (3)
        assert_eq!(result.score, 21);
        assert_eq!(result.matched_reasons.len(), 3);
    }

    #[test]
    fn each_rule_fires_at_most_once() {
        let mut entry = trials_entry("get_obesity_trials");
        entry.capability_tags = vec!["obesity trials".into(), "trials obesity".into()];
        entry.patterns.insert("pagination".into());
        entry.patterns.insert("multi-filter".into());
        entry.complexity = Complexity::Medium;
        entry.category = "Clinical-Trials".into();

        let mut requirements = Requirements::new(DataType::Trials, "obesity");
        requirements.query = "show me obesity trials".into();
        requirements.filters = json!({"phase": "3", "status": "recruiting", "country": "US"})
            .as_object()
            .cloned()
            .unwrap_or_default();

        let result = matcher().score(&entry, &requirements).expect("passes pre-filter");

        assert_eq!(result.score, 15 + 10 + 8 + 5 + 3 + 3 + 2);
        assert_eq!(result.matched_reasons.len(), 7);
    }

    #[test]
    fn null_filters_do_not_count() {
        let mut entry = trials_entry("x");
        entry.patterns.insert("pagination".into());
        let mut requirements = Requirements::new(DataType::Trials, "");
        requirements.filters = json!({"phase": null}).as_object().cloned().unwrap_or_default();

        let result = matcher().score(&entry, &requirements).expect("passes pre-filter");

        // only the complexity rule: no filters implies simple
        assert_eq!(result.score, 3);
    }
}

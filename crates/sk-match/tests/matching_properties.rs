//! Ranking, threshold, and determinism properties of the matcher.

use pretty_assertions::assert_eq;
use sk_config::MatchingConfig;
use sk_core::{DataType, RegistryEntry, Requirements};
use sk_match::SemanticMatcher;

fn entry(name: &str, source: &str, tags: &[&str]) -> RegistryEntry {
    let mut entry = RegistryEntry::new(name, format!("{name}.py"), format!("{name}.md"));
    entry.data_sources.insert(source.to_string());
    entry.capability_tags = tags.iter().map(|tag| (*tag).to_string()).collect();
    entry
}

fn registry() -> Vec<RegistryEntry> {
    vec![
        entry("get_glp1_trials", "ct_gov_mcp", &["glp-1 trials"]),
        entry("get_obesity_trials", "ct_gov_mcp", &["obesity trials"]),
        entry("get_obesity_publications", "pubmed_mcp", &["obesity papers"]),
        entry("get_alzheimer_trials", "ct_gov_mcp", &[]),
    ]
}

fn obesity_request() -> Requirements {
    let mut requirements = Requirements::new(DataType::Trials, "obesity");
    requirements.query = "recruiting obesity trials in the US".into();
    requirements
}

#[test]
fn best_match_is_the_trigger_and_topic_hit() {
    let matcher = SemanticMatcher::new(MatchingConfig::default());

    let best = matcher
        .find_matching_skill(&registry(), &obesity_request())
        .expect("a match should be found");

    assert_eq!(best.entry.name, "get_obesity_trials");
    assert_eq!(best.score, 15 + 10 + 8 + 3);
}

#[test]
fn matching_is_deterministic() {
    let matcher = SemanticMatcher::new(MatchingConfig::default());
    let entries = registry();
    let requirements = obesity_request();

    let first = matcher.find_matching_skill(&entries, &requirements);
    let second = matcher.find_matching_skill(&entries, &requirements);

    assert_eq!(first, second);
}

#[test]
fn rank_excludes_other_sources_and_keeps_registry_order_on_ties() {
    let matcher = SemanticMatcher::new(MatchingConfig::default());
    let requirements = Requirements::new(DataType::Trials, "");

    let names: Vec<String> = matcher
        .rank(&registry(), &requirements)
        .into_iter()
        .map(|result| result.entry.name)
        .collect();

    // All three trials entries tie on data type + complexity.
    assert_eq!(
        names,
        vec!["get_glp1_trials", "get_obesity_trials", "get_alzheimer_trials"]
    );
}

#[test]
fn results_below_minimum_are_no_match() {
    let matcher = SemanticMatcher::new(MatchingConfig::default());
    let entries = vec![entry("fetch_records", "ct_gov_mcp", &[])];
    let requirements = Requirements::new(DataType::Trials, "oncology");

    let ranked = matcher.rank(&entries, &requirements);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score, 3);
    assert_eq!(matcher.find_matching_skill(&entries, &requirements), None);
}

#[test]
fn no_result_ever_scores_below_minimum() {
    let config = MatchingConfig {
        min_score: 12,
        ..MatchingConfig::default()
    };
    let matcher = SemanticMatcher::new(config);

    for topic in ["obesity", "glp1", "alzheimer", "oncology", ""] {
        let requirements = Requirements::new(DataType::Trials, topic);
        if let Some(result) = matcher.find_matching_skill(&registry(), &requirements) {
            assert!(result.score >= 12, "{topic}: {}", result.score);
        }
    }
}

#[test]
fn empty_registry_has_no_match() {
    let matcher = SemanticMatcher::new(MatchingConfig::default());
    assert_eq!(matcher.find_matching_skill(&[], &obesity_request()), None);
}

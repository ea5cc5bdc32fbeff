//! Semantic matcher weights and the data-type catalogue.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const fn default_min_score() -> u32 {
    5
}

const fn default_adapt_threshold() -> u32 {
    8
}

fn default_stopwords() -> Vec<String> {
    [
        "a", "an", "the", "and", "or", "of", "for", "in", "on", "to", "with", "by", "from", "all",
        "any", "get", "find", "show", "list", "me", "my", "that", "this", "is", "are", "what",
        "which", "about",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Additive weight of each scoring rule. Each rule fires at most once per candidate.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatchWeights {
    pub trigger_phrase: u32,
    pub topic_in_name: u32,
    pub data_type_in_name: u32,
    pub pagination: u32,
    pub multi_filter: u32,
    pub complexity: u32,
    pub category: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            trigger_phrase: 15,
            topic_in_name: 10,
            data_type_in_name: 8,
            pagination: 5,
            multi_filter: 3,
            complexity: 3,
            category: 2,
        }
    }
}

/// What a data type means in terms of registry metadata.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct DataSourceProfile {
    /// External service identifier entries declare in `data_sources`.
    #[serde(default)]
    pub source: String,
    /// Substring looked for in candidate names.
    #[serde(default)]
    pub keyword: String,
    /// Registry category implied by this data type.
    #[serde(default)]
    pub category: String,
    /// Implementation patterns a script for this data type needs.
    #[serde(default)]
    pub required_patterns: Vec<String>,
    /// Designated template for new scripts of this category.
    #[serde(default)]
    pub best_reference: Option<String>,
}

fn profile(
    source: &str,
    keyword: &str,
    category: &str,
    required_patterns: &[&str],
    best_reference: &str,
) -> DataSourceProfile {
    DataSourceProfile {
        source: source.to_string(),
        keyword: keyword.to_string(),
        category: category.to_string(),
        required_patterns: required_patterns.iter().map(|p| (*p).to_string()).collect(),
        best_reference: Some(best_reference.to_string()),
    }
}

fn default_data_types() -> BTreeMap<String, DataSourceProfile> {
    BTreeMap::from([
        (
            "trials".to_string(),
            profile(
                "ct_gov_mcp",
                "trials",
                "clinical-trials",
                &["pagination"],
                "get_glp1_trials",
            ),
        ),
        (
            "fda_drugs".to_string(),
            profile("fda_mcp", "fda", "drug-labels", &[], "get_fda_drug_labels"),
        ),
        (
            "patents".to_string(),
            profile(
                "uspto_patents_mcp",
                "patents",
                "patents",
                &["pagination"],
                "get_glp1_patents",
            ),
        ),
        (
            "publications".to_string(),
            profile(
                "pubmed_mcp",
                "publications",
                "literature",
                &[],
                "get_pubmed_publications",
            ),
        ),
    ])
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MatchingConfig {
    /// Results scoring below this are "no match".
    #[serde(default = "default_min_score")]
    pub min_score: u32,

    /// Minimum semantic score for adapting a non-exact entry.
    #[serde(default = "default_adapt_threshold")]
    pub adapt_threshold: u32,

    #[serde(default)]
    pub weights: MatchWeights,

    /// Tokens ignored when fuzzy-matching trigger phrases.
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,

    /// Catalogue keyed by data type (`trials`, `fda_drugs`, ...).
    #[serde(default = "default_data_types")]
    pub data_types: BTreeMap<String, DataSourceProfile>,
}

impl MatchingConfig {
    /// Profile for a data type key; an unknown key yields an empty profile.
    #[must_use]
    pub fn profile(&self, data_type: &str) -> DataSourceProfile {
        self.data_types.get(data_type).cloned().unwrap_or_default()
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            adapt_threshold: default_adapt_threshold(),
            weights: MatchWeights::default(),
            stopwords: default_stopwords(),
            data_types: default_data_types(),
        }
    }
}

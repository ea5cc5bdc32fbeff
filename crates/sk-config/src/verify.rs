//! Verification harness pattern tables.
//!
//! Every entry is a regular expression, except `data_markers` which are
//! plain substrings. Order matters for `count_patterns`: the first positive
//! count wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

fn default_error_signatures() -> Vec<String> {
    strings(&[
        r"Traceback \(most recent call last\)",
        r"ModuleNotFoundError",
        r"ImportError",
        r"SyntaxError",
        r"NameError",
        r"AttributeError",
        r"KeyError",
        r"TypeError",
        r"ValueError",
        r"ConnectionError",
        r"Connection refused",
        r"TimeoutError",
        r"Read timed out",
        r"Max retries exceeded",
        r"(?i)mcp (?:server )?error",
    ])
}

fn default_count_patterns() -> Vec<String> {
    strings(&[
        r"(?i)total[ _](?:trials|results|records|studies|articles|patents|count|found)?\s*[:=]\s*(\d[\d,]*)",
        r"(?i)found\s+(\d[\d,]*)",
        r"(?i)retrieved\s+(\d[\d,]*)",
        r"(?i)(\d[\d,]*)\s+(?:trials|results|records|studies|articles|publications|patents|labels|drugs)\b",
        r#"(?i)"?(?:count|total)"?\s*[:=]\s*(\d[\d,]*)"#,
    ])
}

fn default_data_markers() -> Vec<String> {
    strings(&["NCT0", "PMID", "nctId", "brand_name", "generic_name", "patent_number"])
}

const HAS_MORE_TRUE: &str = r#"(?i)"?has_?more"?\s*[:=]\s*true"#;
const HAS_MORE_FALSE: &str = r#"(?i)"?has_?more"?\s*[:=]\s*false"#;
const ALL_PAGES: &str = r"(?i)all pages (?:retrieved|fetched)|pagination complete";

/// Expectations for one external service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct ServerProfile {
    /// Patterns that must all appear in the script output.
    #[serde(default)]
    pub schema_fields: Vec<String>,
    /// Explicit "there is another page" signals.
    #[serde(default)]
    pub more_pages_markers: Vec<String>,
    /// Explicit "every page was consumed" signals.
    #[serde(default)]
    pub complete_markers: Vec<String>,
    /// Page-size limits; a count equal to one of these suggests truncation.
    #[serde(default)]
    pub suspicious_counts: Vec<u64>,
}

fn default_servers() -> BTreeMap<String, ServerProfile> {
    BTreeMap::from([
        (
            "ct_gov".to_string(),
            ServerProfile {
                schema_fields: strings(&[r"NCT\d{8}"]),
                more_pages_markers: strings(&[
                    r#"(?i)"?next_?page_?token"?\s*[:=]\s*"[A-Za-z0-9_-]{4,}""#,
                    HAS_MORE_TRUE,
                ]),
                complete_markers: strings(&[ALL_PAGES, HAS_MORE_FALSE]),
                suspicious_counts: vec![100, 500, 1000],
            },
        ),
        (
            "fda".to_string(),
            ServerProfile {
                schema_fields: strings(&[r"(?i)brand_name|generic_name|application_number"]),
                more_pages_markers: strings(&[HAS_MORE_TRUE]),
                complete_markers: strings(&[ALL_PAGES, HAS_MORE_FALSE]),
                suspicious_counts: vec![100, 1000],
            },
        ),
        (
            "pubmed".to_string(),
            ServerProfile {
                schema_fields: strings(&[r"PMID:?\s*\d+"]),
                more_pages_markers: strings(&[HAS_MORE_TRUE]),
                complete_markers: strings(&[ALL_PAGES, HAS_MORE_FALSE]),
                suspicious_counts: vec![20, 100, 10000],
            },
        ),
        (
            "uspto".to_string(),
            ServerProfile {
                schema_fields: strings(&[r"(?i)patent[_ ]?(?:number|id)|\bUS\s?\d{7,8}"]),
                more_pages_markers: strings(&[HAS_MORE_TRUE]),
                complete_markers: strings(&[ALL_PAGES, HAS_MORE_FALSE]),
                suspicious_counts: vec![100, 500, 1000],
            },
        ),
        ("generic".to_string(), ServerProfile::default()),
    ])
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct VerifyConfig {
    /// Fatal-error signatures searched in the shell output.
    #[serde(default = "default_error_signatures")]
    pub error_signatures: Vec<String>,

    /// Ordered count-extraction patterns with one capture group.
    #[serde(default = "default_count_patterns")]
    pub count_patterns: Vec<String>,

    /// Substrings that prove data was returned when no count is printed.
    #[serde(default = "default_data_markers")]
    pub data_markers: Vec<String>,

    /// Profiles keyed by server type (`ct_gov`, `fda`, `pubmed`, `uspto`, `generic`).
    #[serde(default = "default_servers")]
    pub servers: BTreeMap<String, ServerProfile>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            error_signatures: default_error_signatures(),
            count_patterns: default_count_patterns(),
            data_markers: default_data_markers(),
            servers: default_servers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_define_all_server_types() {
        let config = VerifyConfig::default();
        for key in ["ct_gov", "fda", "pubmed", "uspto", "generic"] {
            assert!(config.servers.contains_key(key), "missing {key}");
        }
        assert!(config.servers["generic"].schema_fields.is_empty());
        assert_eq!(config.servers["ct_gov"].suspicious_counts, vec![100, 500, 1000]);
    }

    #[test]
    fn unknown_server_has_no_profile() {
        let config = VerifyConfig::default();
        assert!(!config.servers.contains_key("sec_edgar"));
    }
}

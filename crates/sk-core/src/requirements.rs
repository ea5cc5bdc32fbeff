use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::{Complexity, DataType};

/// What a caller needs, as matched against registry entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Requirements {
    pub data_type: DataType,
    /// Subject of the request, e.g. a therapeutic area.
    pub topic: String,
    #[serde(default)]
    pub filters: Map<String, Value>,
    /// External services the result must call. Empty means "the data type's default".
    #[serde(default)]
    pub servers: Vec<String>,
    /// The caller's original free-text request.
    #[serde(default)]
    pub query: String,
}

impl Requirements {
    #[must_use]
    pub fn new(data_type: DataType, topic: impl Into<String>) -> Self {
        Self {
            data_type,
            topic: topic.into(),
            filters: Map::new(),
            servers: Vec::new(),
            query: String::new(),
        }
    }

    /// Number of filters that carry a value.
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.filters.values().filter(|value| !value.is_null()).count()
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.filter_count() > 0
    }

    /// More than two filters implies a medium-complexity script.
    #[must_use]
    pub fn implied_complexity(&self) -> Complexity {
        if self.filter_count() > 2 {
            Complexity::Medium
        } else {
            Complexity::Simple
        }
    }
}

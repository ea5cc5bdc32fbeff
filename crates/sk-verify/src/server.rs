//! External service identifiers that select schema and pagination expectations.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerType {
    CtGov,
    Fda,
    Pubmed,
    Uspto,
    #[default]
    Generic,
}

impl ServerType {
    pub const ALL: [Self; 5] = [
        Self::CtGov,
        Self::Fda,
        Self::Pubmed,
        Self::Uspto,
        Self::Generic,
    ];

    /// Key into `verify.servers`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CtGov => "ct_gov",
            Self::Fda => "fda",
            Self::Pubmed => "pubmed",
            Self::Uspto => "uspto",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_config_keys() {
        for server in ServerType::ALL {
            let json = serde_json::to_string(&server).unwrap();
            assert_eq!(json, format!("\"{}\"", server.as_str()));
        }
    }
}

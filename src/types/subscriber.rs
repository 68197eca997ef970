use serde::{Deserialize, Serialize};

/// An end user following a set of instruments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Followed instrument identifiers, in the order they were added.
    #[serde(default)]
    pub pairs: Vec<String>,
    /// Whether level alerts are enabled.
    #[serde(default)]
    pub alerts: bool,
}

impl Subscriber {
    pub fn follows(&self, instrument: &str) -> bool {
        self.pairs.iter().any(|p| p == instrument)
    }
}

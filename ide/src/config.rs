use analyzer::MarkerPair;
use serde::{Deserialize, Serialize};

/// Configuration knobs for a popup session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompletionConfig {
    /// Delimiters around embedded expressions.
    pub markers: MarkerPair,
    /// Query the language-service worker after member-access recomputes.
    pub enrichment: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            markers: MarkerPair::default(),
            enrichment: true,
        }
    }
}

//! Settings for the inference engines.

use super::EliminationOrdering;

use serde::{Deserialize, Serialize};

/// Query-time settings. The defaults are what `VariableElimination::new` uses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// How the elimination order of each query is chosen
    pub ordering: EliminationOrdering,
}

impl InferenceConfig {

    /// Use the given elimination ordering policy
    pub fn with_ordering(mut self, ordering: EliminationOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_greedy() {
        let config: InferenceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.ordering, EliminationOrdering::Greedy);

        let config = InferenceConfig::default().with_ordering(EliminationOrdering::MaxCardinality);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"ordering":"MaxCardinality"}"#);
    }
}

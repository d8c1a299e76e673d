//! Build-time settings for a `DirectedModel`.

use crate::cpd::DEFAULT_TOLERANCE;

use serde::{Deserialize, Serialize};

/// Settings applied while validating a model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// How far a CPD row may be from summing to one
    pub cpd_tolerance: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig { cpd_tolerance: DEFAULT_TOLERANCE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: ModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ModelConfig::default());

        let config: ModelConfig = serde_json::from_str(r#"{"cpd_tolerance": 0.01}"#).unwrap();
        assert_eq!(config.cpd_tolerance, 0.01);
    }
}

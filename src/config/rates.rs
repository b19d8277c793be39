//! Exchange-rate service configuration

use serde::Deserialize;

use super::error::ValidationError;

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_refresh_hours() -> u64 {
    12
}

/// Exchange-rate configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatesConfig {
    /// Comma-separated API keys, tried in order
    #[serde(default)]
    pub api_keys: String,

    /// Base currency the rates are relative to
    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    /// Cache refresh interval in hours
    #[serde(default = "default_refresh_hours")]
    pub refresh_hours: u64,
}

impl RatesConfig {
    /// The configured API keys, in fallback order.
    pub fn keys(&self) -> Vec<String> {
        self.api_keys
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .collect()
    }

    /// Validate rates configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.keys().is_empty() {
            return Err(ValidationError::NoRateApiKeys);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_split_and_trimmed() {
        let config = RatesConfig {
            api_keys: " key1, key2 ,key3 ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.keys(), vec!["key1", "key2", "key3"]);
    }

    #[test]
    fn empty_key_list_fails_validation() {
        let config = RatesConfig {
            api_keys: " , ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::NoRateApiKeys));
    }

    #[test]
    fn single_key_is_enough() {
        let config = RatesConfig {
            api_keys: "key1".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}

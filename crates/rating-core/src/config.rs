use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{RatingError, Thresholds, DEFAULT_BUY_THRESHOLD, DEFAULT_HOLD_THRESHOLD};

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConfig {
    // Recommendation cut-offs (0-10 scale)
    pub thresholds: Thresholds,

    // Market data
    pub yahoo_base_url: String,
    pub yahoo_rate_limit: usize,       // requests per minute
    pub yahoo_timeout_secs: u64,

    // Optional JSON file replacing the built-in reference medians
    pub reference_tables_path: Option<PathBuf>,

    // HTTP surface
    pub api_bind_addr: String,
}

impl RatingConfig {
    /// Load from process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, RatingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RatingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let buy = parse_or(&lookup, "BUY_THRESHOLD", DEFAULT_BUY_THRESHOLD)?;
        let hold = parse_or(&lookup, "HOLD_THRESHOLD", DEFAULT_HOLD_THRESHOLD)?;

        let config = Self {
            thresholds: Thresholds::new(buy, hold)?,

            yahoo_base_url: lookup("YAHOO_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string()),
            yahoo_rate_limit: parse_or(&lookup, "YAHOO_RATE_LIMIT", 60)?,
            yahoo_timeout_secs: parse_or(&lookup, "YAHOO_TIMEOUT_SECS", 30)?,

            reference_tables_path: lookup("REFERENCE_TABLES_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),

            api_bind_addr: lookup("API_BIND_ADDR")
                .unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        if config.yahoo_rate_limit == 0 {
            return Err(RatingError::InvalidConfig(
                "YAHOO_RATE_LIMIT must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            yahoo_rate_limit: 60,
            yahoo_timeout_secs: 30,
            reference_tables_path: None,
            api_bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, RatingError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RatingError::InvalidConfig(format!("{}='{}' is not a valid value", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<RatingConfig, RatingError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RatingConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.thresholds, Thresholds::default());
        assert_eq!(config.yahoo_base_url, DEFAULT_YAHOO_BASE_URL);
        assert_eq!(config.yahoo_rate_limit, 60);
        assert!(config.reference_tables_path.is_none());
        assert_eq!(config.api_bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BUY_THRESHOLD", "7.5"),
            ("HOLD_THRESHOLD", " 5 "),
            ("YAHOO_BASE_URL", "http://localhost:9000/"),
            ("REFERENCE_TABLES_PATH", "medians.json"),
        ])
        .unwrap();
        assert_eq!(config.thresholds, Thresholds { buy: 7.5, hold: 5.0 });
        assert_eq!(config.yahoo_base_url, "http://localhost:9000");
        assert_eq!(config.reference_tables_path, Some(PathBuf::from("medians.json")));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("BUY_THRESHOLD", "high")]),
            Err(RatingError::InvalidConfig(_))
        ));
        assert!(matches!(
            config_from(&[("HOLD_THRESHOLD", "11")]),
            Err(RatingError::InvalidConfig(_))
        ));
        assert!(matches!(
            config_from(&[("YAHOO_RATE_LIMIT", "0")]),
            Err(RatingError::InvalidConfig(_))
        ));
    }
}

//! Model settings and configuration.
//!
//! This module provides the [`ModelSettings`] type for configuring
//! generation behavior: token limits, sampling, stop sequences, and
//! request timeouts.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for model generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,

    /// Sampling temperature (0.0 to 2.0 typically).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Top-p (nucleus) sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Request timeout.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "option_duration_serde",
        default
    )]
    pub timeout: Option<Duration>,

    /// Extra provider-specific settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl ModelSettings {
    /// Create new empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens.
    #[must_use]
    pub fn max_tokens(mut self, tokens: u64) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set top-p.
    #[must_use]
    pub fn top_p(mut self, p: f64) -> Self {
        self.top_p = Some(p);
        self
    }

    /// Set stop sequences.
    #[must_use]
    pub fn stop(mut self, sequences: Vec<String>) -> Self {
        self.stop = Some(sequences);
        self
    }

    /// Add a stop sequence.
    #[must_use]
    pub fn add_stop(mut self, sequence: impl Into<String>) -> Self {
        self.stop.get_or_insert_with(Vec::new).push(sequence.into());
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set extra provider-specific settings.
    #[must_use]
    pub fn extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Merge another settings object over this one.
    ///
    /// Fields set in `other` win; unset fields keep their value here.
    #[must_use]
    pub fn merge(mut self, other: &ModelSettings) -> Self {
        if other.max_tokens.is_some() {
            self.max_tokens = other.max_tokens;
        }
        if other.temperature.is_some() {
            self.temperature = other.temperature;
        }
        if other.top_p.is_some() {
            self.top_p = other.top_p;
        }
        if other.stop.is_some() {
            self.stop = other.stop.clone();
        }
        if other.seed.is_some() {
            self.seed = other.seed;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.extra.is_some() {
            self.extra = other.extra.clone();
        }
        self
    }
}

/// Serde support for `Option<Duration>` as whole seconds.
mod option_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder() {
        let settings = ModelSettings::new()
            .max_tokens(1000)
            .temperature(0.7)
            .add_stop("\n\n");

        assert_eq!(settings.max_tokens, Some(1000));
        assert_eq!(settings.temperature, Some(0.7));
        assert_eq!(settings.stop, Some(vec!["\n\n".to_string()]));
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = ModelSettings::new().max_tokens(100).temperature(0.0);
        let merged = base.merge(&ModelSettings::new().temperature(1.0));

        assert_eq!(merged.max_tokens, Some(100));
        assert_eq!(merged.temperature, Some(1.0));
    }

    #[test]
    fn test_serde_skips_unset() {
        let json = serde_json::to_string(&ModelSettings::new().seed(7)).unwrap();
        assert_eq!(json, "{\"seed\":7}");
    }

    #[test]
    fn test_timeout_roundtrip() {
        let settings = ModelSettings::new().timeout(Duration::from_secs(30));
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: ModelSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.timeout, Some(Duration::from_secs(30)));
    }
}

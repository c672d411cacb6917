use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// What a dispatch does with a slot whose signature doesn't match the arguments
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MismatchPolicy {
    /// Skip the slot silently
    #[default]
    Skip,
    /// Skip the slot and log a warning
    Warn,
    /// Refuse the whole dispatch before any handler runs
    Strict,
}

/// Dispatcher settings
///
/// Deserializable so a host application can embed it in its own config file:
///
/// ```
/// use typed_events::{DispatcherConfig, MismatchPolicy};
///
/// let config: DispatcherConfig = serde_json::from_str(r#"{"mismatch_policy":"warn"}"#).unwrap();
/// assert_eq!(config.mismatch_policy, MismatchPolicy::Warn);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub mismatch_policy: MismatchPolicy,
}

impl DispatcherConfig {
    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_default_policy_is_skip() {
        assert_eq!(DispatcherConfig::default().mismatch_policy, MismatchPolicy::Skip);
    }

    #[rstest]
    #[case("skip", MismatchPolicy::Skip)]
    #[case("warn", MismatchPolicy::Warn)]
    #[case("strict", MismatchPolicy::Strict)]
    fn test_policy_parses_from_str(#[case] input: &str, #[case] expected: MismatchPolicy) {
        assert_eq!(MismatchPolicy::from_str(input).unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(MismatchPolicy::from_str("loud").is_err());
    }

    #[test]
    fn test_every_policy_survives_serde() {
        for policy in MismatchPolicy::iter() {
            let json = serde_json::to_string(&policy).unwrap();
            assert_eq!(json, format!("\"{}\"", policy));
            let back: MismatchPolicy = serde_json::from_str(&json).unwrap();
            assert_eq!(back, policy);
        }
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: DispatcherConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DispatcherConfig::default());
    }
}

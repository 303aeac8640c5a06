//! Adjudicator settings.

use serde::Deserialize;

/// One day, in seconds.
pub const DEFAULT_CHALLENGE_PERIOD: u64 = 86_400;

/// Settings fixed when an [Adjudicator][crate::Adjudicator] is created.
///
/// Deserializable from any serde format, missing fields fall back to their
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdjudicatorConfig {
    /// Challenge duration for channels whose proposal does not set one.
    /// Changing it does not affect channels that are already open.
    pub challenge_period: u64,
}

impl Default for AdjudicatorConfig {
    fn default() -> Self {
        Self {
            challenge_period: DEFAULT_CHALLENGE_PERIOD,
        }
    }
}

impl AdjudicatorConfig {
    pub fn with_challenge_period(challenge_period: u64) -> Self {
        Self { challenge_period }
    }
}

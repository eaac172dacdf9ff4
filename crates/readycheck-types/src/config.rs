/// Configuration types for ready checks, parsed from `config/readycheck.yaml`.
///
/// Every field has a default so a partial (or missing) file is valid.
use serde::{Deserialize, Serialize};

use crate::reactions::{ACCEPT_EMOJI, CANCEL_EMOJI};

/// Top-level configuration document.
///
/// ```yaml
/// validation:
///   accept_emoji: "✅"
///   cancel_emoji: "❎"
///   default_threshold: 10
///   default_timeout_secs: 120
///   timeout_mode: per_reaction
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadyCheckConfig {
    /// Wait-loop settings.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Settings for the validation wait-loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Symbol participants click to accept.
    pub accept_emoji: String,
    /// Symbol participants click to cancel the round.
    pub cancel_emoji: String,
    /// Distinct accepts required when the caller does not pass a threshold.
    pub default_threshold: usize,
    /// Timeout used when the caller does not pass one (in seconds).
    pub default_timeout_secs: u64,
    /// How the timeout budget is spent across waits.
    pub timeout_mode: TimeoutMode,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            accept_emoji: ACCEPT_EMOJI.to_string(),
            cancel_emoji: CANCEL_EMOJI.to_string(),
            default_threshold: 10,
            default_timeout_secs: 120,
            timeout_mode: TimeoutMode::PerReaction,
        }
    }
}

/// How the timeout applies over a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutMode {
    /// Every wait gets the full timeout again. A slow trickle of accepts can
    /// keep the round open well past the nominal timeout.
    #[default]
    PerReaction,
    /// One absolute deadline set when the round starts.
    Deadline,
}

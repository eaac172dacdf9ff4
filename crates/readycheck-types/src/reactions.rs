/// Shared data types for ready checks.
///
/// Identities, reaction events flowing in from the chat platform, affordance
/// requests flowing out to it, and the outcome of a single ready check.
use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default "accept" symbol.
pub const ACCEPT_EMOJI: &str = "\u{2705}"; // ✅

/// Default "cancel" symbol.
pub const CANCEL_EMOJI: &str = "\u{274e}"; // ❎

// ============================================================
// Identity Types
// ============================================================

/// Identity of a participant eligible to answer a ready check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ParticipantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identity of the chat message participants react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================
// Reaction Types
// ============================================================

/// A reaction added to a message, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// The message that was reacted to.
    pub message: MessageId,
    /// Who reacted.
    pub user: ParticipantId,
    /// The emoji symbol, e.g. "✅".
    pub emoji: String,
    /// When the platform reported the reaction.
    pub timestamp: DateTime<Utc>,
}

impl ReactionEvent {
    /// Build an event stamped with the current time.
    pub fn new(message: MessageId, user: ParticipantId, emoji: impl Into<String>) -> Self {
        Self {
            message,
            user,
            emoji: emoji.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A request to attach a reaction affordance to a message.
///
/// Queued by the reaction hub for the platform adapter to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReaction {
    /// Target message.
    pub message: MessageId,
    /// Emoji symbol to attach.
    pub emoji: String,
}

// ============================================================
// Outcome Types
// ============================================================

/// Terminal result of one ready check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// The threshold of distinct accepts was reached.
    Validated,
    /// No qualifying reaction arrived in time.
    TimedOut {
        /// Eligible participants who never accepted.
        stragglers: HashSet<ParticipantId>,
    },
    /// A participant reacted with the cancel symbol.
    Cancelled {
        /// The participant who cancelled.
        by: ParticipantId,
    },
}

impl ValidationOutcome {
    /// Whether the ready check succeeded.
    pub fn is_validated(&self) -> bool {
        matches!(self, ValidationOutcome::Validated)
    }

    /// Participants to drop from the queue: the stragglers on timeout, the
    /// canceller on cancellation, nobody on success.
    pub fn dropped_participants(&self) -> Option<HashSet<ParticipantId>> {
        match self {
            ValidationOutcome::Validated => None,
            ValidationOutcome::TimedOut { stragglers } => Some(stragglers.clone()),
            ValidationOutcome::Cancelled { by } => Some(HashSet::from([*by])),
        }
    }

    /// Flatten into the `(validated, payload)` pair used by older callers.
    ///
    /// The pair does not say whether a non-validated payload comes from a
    /// timeout or a cancellation.
    pub fn into_parts(self) -> (bool, Option<HashSet<ParticipantId>>) {
        match self {
            ValidationOutcome::Validated => (true, None),
            ValidationOutcome::TimedOut { stragglers } => (false, Some(stragglers)),
            ValidationOutcome::Cancelled { by } => (false, Some(HashSet::from([by]))),
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Validated => write!(f, "validated"),
            ValidationOutcome::TimedOut { stragglers } => {
                write!(f, "timed out ({} stragglers)", stragglers.len())
            }
            ValidationOutcome::Cancelled { by } => write!(f, "cancelled by {by}"),
        }
    }
}

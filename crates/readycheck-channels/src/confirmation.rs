//! Ready check: reaction-based confirmation from a group of participants.
//!
//! Puts the accept and cancel affordances on a message, then waits for
//! eligible participants to react. A round ends in one of three ways:
//! - enough distinct participants accepted
//! - nobody reacted in time, and whoever had not accepted is reported
//! - one participant cancelled, and that participant is reported
//!
//! Failures of the reaction source are not handled here; they propagate to
//! the caller as-is.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use readycheck_types::config::{TimeoutMode, ValidationConfig};
use readycheck_types::errors::ReadyCheckError;
use readycheck_types::reactions::{MessageId, ParticipantId, ReactionEvent, ValidationOutcome};
use readycheck_types::traits::ReactionSource;

/// Run a ready check with the default symbols (✅ / ❎) and a per-reaction timeout.
///
/// See [`ReadyCheck::run`].
pub async fn run_validation(
    event_source: &dyn ReactionSource,
    target_message: MessageId,
    participants: &[ParticipantId],
    threshold: usize,
    timeout: Duration,
) -> Result<ValidationOutcome, ReadyCheckError> {
    ReadyCheck::default()
        .run(event_source, target_message, participants, threshold, timeout)
        .await
}

/// A configured ready check.
///
/// Holds no per-round state, so one instance can drive any number of rounds,
/// including concurrent rounds on different messages.
#[derive(Debug, Clone, Default)]
pub struct ReadyCheck {
    config: ValidationConfig,
}

impl ReadyCheck {
    /// Create a ready check with the given settings.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// The settings this ready check runs with.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Run one round using the configured default threshold and timeout.
    pub async fn run_with_defaults(
        &self,
        source: &dyn ReactionSource,
        message: MessageId,
        participants: &[ParticipantId],
    ) -> Result<ValidationOutcome, ReadyCheckError> {
        let timeout = Duration::from_secs(self.config.default_timeout_secs);
        self.run(
            source,
            message,
            participants,
            self.config.default_threshold,
            timeout,
        )
        .await
    }

    /// Run one round on `message`.
    ///
    /// Attaches the accept then the cancel affordance (once each), then waits
    /// until `threshold` distinct participants accepted, one cancelled, or a
    /// wait timed out. Only reactions on `message`, from `participants`, with
    /// one of the two symbols count. Duplicate participants collapse, and a
    /// threshold above their number can only end by timeout or cancel.
    ///
    /// With [`TimeoutMode::PerReaction`] every wait gets the full `timeout`;
    /// with [`TimeoutMode::Deadline`] the whole round does.
    pub async fn run(
        &self,
        source: &dyn ReactionSource,
        message: MessageId,
        participants: &[ParticipantId],
        threshold: usize,
        timeout: Duration,
    ) -> Result<ValidationOutcome, ReadyCheckError> {
        let eligible: HashSet<ParticipantId> = participants.iter().copied().collect();
        let accept = self.config.accept_emoji.as_str();
        let cancel = self.config.cancel_emoji.as_str();

        tracing::info!(
            message = %message,
            participants = eligible.len(),
            threshold,
            timeout = ?timeout,
            mode = ?self.config.timeout_mode,
            "starting ready check"
        );

        source.add_reaction(message, accept).await?;
        source.add_reaction(message, cancel).await?;

        let concerns_round = |event: &ReactionEvent| {
            event.message == message
                && eligible.contains(&event.user)
                && (event.emoji == accept || event.emoji == cancel)
        };

        // A timeout too large to add to the clock means the round has no deadline.
        let deadline = match self.config.timeout_mode {
            TimeoutMode::PerReaction => None,
            TimeoutMode::Deadline => Instant::now().checked_add(timeout),
        };
        let mut accepted: HashSet<ParticipantId> = HashSet::new();

        let outcome = loop {
            if accepted.len() >= threshold {
                break ValidationOutcome::Validated;
            }

            // None once the deadline has passed: end the round without waiting again.
            let budget = match deadline {
                None => Some(timeout),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    (!remaining.is_zero()).then_some(remaining)
                }
            };

            let event = match budget {
                Some(budget) => source.wait_for_reaction(&concerns_round, budget).await?,
                None => None,
            };

            let Some(event) = event else {
                let stragglers = eligible.difference(&accepted).copied().collect();
                break ValidationOutcome::TimedOut { stragglers };
            };

            if event.emoji == cancel {
                break ValidationOutcome::Cancelled { by: event.user };
            }

            if accepted.insert(event.user) {
                tracing::debug!(
                    message = %message,
                    user = %event.user,
                    accepted = accepted.len(),
                    threshold,
                    "participant accepted"
                );
            }
        };

        tracing::info!(message = %message, outcome = %outcome, "ready check finished");
        Ok(outcome)
    }
}

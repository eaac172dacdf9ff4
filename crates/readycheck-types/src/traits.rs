/// Trait contracts between ready checks and the chat platform.
///
/// The wait-loop codes against these interfaces only. A bot plugs its
/// gateway in by implementing [`ReactionSource`]; the in-process reaction hub
/// in `readycheck-channels` is one such implementation.
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ReadyCheckError;
use crate::reactions::{MessageId, ReactionEvent};

/// Predicate deciding whether a reaction event concerns the waiting ready check.
pub type ReactionFilter<'a> = dyn Fn(&ReactionEvent) -> bool + Send + Sync + 'a;

// ============================================================
// Channel Traits
// ============================================================

/// Source of reaction events for one ready check, plus the ability to put
/// reaction affordances on a message.
#[async_trait]
pub trait ReactionSource: Send + Sync {
    /// Attach a reaction affordance (an emoji participants can click) to a message.
    ///
    /// Attaching the same emoji twice must not be an error.
    async fn add_reaction(&self, message: MessageId, emoji: &str) -> Result<(), ReadyCheckError>;

    /// Suspend until the next event passing `filter`, or until `timeout` elapses.
    ///
    /// Returns `Ok(None)` on timeout. Events rejected by the filter are
    /// consumed and do not restart the countdown. Dropping the returned future
    /// must release whatever the wait registered.
    async fn wait_for_reaction(
        &self,
        filter: &ReactionFilter<'_>,
        timeout: Duration,
    ) -> Result<Option<ReactionEvent>, ReadyCheckError>;
}

//! Reaction hub: multiplexes reaction traffic between the chat platform and ready checks.
//!
//! Routes inbound reaction events from the platform adapter to every waiting
//! ready check, and outbound affordance requests from ready checks back to
//! the adapter, which turns them into real API calls.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Mutex};

use readycheck_types::errors::ReadyCheckError;
use readycheck_types::reactions::{MessageId, OutboundReaction, ReactionEvent};
use readycheck_types::traits::{ReactionFilter, ReactionSource};

/// Default buffer size for both directions.
pub const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out of reaction events.
///
/// Cloning the hub shares the same channels. Once every clone is dropped,
/// listeners see the hub as closed.
#[derive(Clone)]
pub struct ReactionHub {
    inbound: broadcast::Sender<ReactionEvent>,
    outbound: mpsc::Sender<OutboundReaction>,
}

impl ReactionHub {
    /// Create a hub and the outbox receiver the platform adapter drains.
    ///
    /// `capacity` bounds both the per-listener event buffer and the outbox;
    /// a listener falling further behind than that loses the oldest events.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundReaction>) {
        let capacity = capacity.max(1);
        let (inbound, _) = broadcast::channel(capacity);
        let (outbound, outbox) = mpsc::channel(capacity);
        (Self { inbound, outbound }, outbox)
    }

    /// Push a reaction reported by the platform to all current listeners.
    ///
    /// Returns how many listeners received it. With no listener the event is
    /// simply dropped.
    pub fn publish(&self, event: ReactionEvent) -> usize {
        match self.inbound.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(message = %event.message, user = %event.user, "no listener for reaction, dropping");
                0
            }
        }
    }

    /// Subscribe a new listener. Events published from now on are buffered
    /// for it until it waits for them.
    pub fn listener(&self) -> ReactionListener {
        ReactionListener {
            inbound: Mutex::new(self.inbound.subscribe()),
            outbound: self.outbound.clone(),
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inbound.receiver_count()
    }
}

/// One subscription to a [`ReactionHub`], usable as a [`ReactionSource`].
///
/// Dropping the listener ends the subscription.
pub struct ReactionListener {
    inbound: Mutex<broadcast::Receiver<ReactionEvent>>,
    outbound: mpsc::Sender<OutboundReaction>,
}

#[async_trait]
impl ReactionSource for ReactionListener {
    async fn add_reaction(&self, message: MessageId, emoji: &str) -> Result<(), ReadyCheckError> {
        self.outbound
            .send(OutboundReaction {
                message,
                emoji: emoji.to_string(),
            })
            .await
            .map_err(|_| {
                ReadyCheckError::Channel(format!(
                    "reaction outbox closed, cannot add {emoji} to message {message}"
                ))
            })
    }

    async fn wait_for_reaction(
        &self,
        filter: &ReactionFilter<'_>,
        timeout: Duration,
    ) -> Result<Option<ReactionEvent>, ReadyCheckError> {
        let mut inbound = self.inbound.lock().await;

        let next = async {
            loop {
                match inbound.recv().await {
                    Ok(event) if filter(&event) => return Ok(event),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "reaction listener lagged, oldest events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(ReadyCheckError::Channel(
                            "reaction hub closed".to_string(),
                        ));
                    }
                }
            }
        };

        match tokio::time::timeout(timeout, next).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readycheck_types::reactions::{ParticipantId, ACCEPT_EMOJI, CANCEL_EMOJI};

    fn any(_: &ReactionEvent) -> bool {
        true
    }

    fn accept(message: u64, user: u64) -> ReactionEvent {
        ReactionEvent::new(MessageId(message), ParticipantId(user), ACCEPT_EMOJI)
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_receives_buffered_event() {
        let (hub, _outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();

        assert_eq!(hub.publish(accept(1, 10)), 1);

        let event = listener
            .wait_for_reaction(&any, Duration::from_secs(1))
            .await
            .unwrap()
            .expect("event should be delivered");
        assert_eq!(event.user, ParticipantId(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_receives_later_event() {
        let (hub, _outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();

        let publisher = hub.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            publisher.publish(accept(1, 11));
        });

        let event = listener
            .wait_for_reaction(&any, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(event.map(|e| e.user), Some(ParticipantId(11)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_skips_non_matching_events() {
        let (hub, _outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();

        hub.publish(accept(2, 10));
        hub.publish(ReactionEvent::new(MessageId(1), ParticipantId(10), "🎉"));
        hub.publish(ReactionEvent::new(MessageId(1), ParticipantId(12), CANCEL_EMOJI));

        let only_cancels = |event: &ReactionEvent| event.emoji == CANCEL_EMOJI;
        let event = listener
            .wait_for_reaction(&only_cancels, Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.user, ParticipantId(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_with_none() {
        let (hub, _outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();
        hub.publish(accept(2, 10));

        let start = tokio::time::Instant::now();
        let only_message_1 = |event: &ReactionEvent| event.message == MessageId(1);
        let result = listener
            .wait_for_reaction(&only_message_1, Duration::from_secs(3))
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_publish_without_listeners_returns_zero() {
        let (hub, _outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        assert_eq!(hub.publish(accept(1, 10)), 0);
    }

    #[tokio::test]
    async fn test_closed_hub_is_an_error() {
        let (hub, _outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();
        drop(hub);

        let result = listener
            .wait_for_reaction(&any, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(ReadyCheckError::Channel(_))));
    }

    #[tokio::test]
    async fn test_buffered_events_survive_hub_close() {
        let (hub, _outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();
        hub.publish(accept(1, 10));
        drop(hub);

        let first = listener
            .wait_for_reaction(&any, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = listener
            .wait_for_reaction(&any, Duration::from_secs(1))
            .await;
        assert!(second.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagged_listener_keeps_receiving() {
        let (hub, _outbox) = ReactionHub::new(2);
        let listener = hub.listener();

        for user in 1..=4 {
            hub.publish(accept(1, user));
        }

        // The two oldest events were overwritten.
        let event = listener
            .wait_for_reaction(&any, Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.user, ParticipantId(3));
    }

    #[tokio::test]
    async fn test_add_reaction_queues_outbound() {
        let (hub, mut outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();

        listener.add_reaction(MessageId(5), ACCEPT_EMOJI).await.unwrap();

        let queued = outbox.recv().await.unwrap();
        assert_eq!(
            queued,
            OutboundReaction {
                message: MessageId(5),
                emoji: ACCEPT_EMOJI.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_add_reaction_fails_without_adapter() {
        let (hub, outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();
        drop(outbox);

        let err = listener
            .add_reaction(MessageId(5), ACCEPT_EMOJI)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("outbox closed"));
    }

    #[test]
    fn test_dropping_listener_ends_subscription() {
        let (hub, _outbox) = ReactionHub::new(DEFAULT_CAPACITY);
        let listener = hub.listener();
        assert_eq!(hub.listener_count(), 1);

        drop(listener);
        assert_eq!(hub.listener_count(), 0);
    }
}

//! Creation events fanned out to live subscriptions
//!
//! Mutations publish after the entity is stored and fully loaded. Publishing
//! never waits on subscribers and never fails: with nobody listening the event
//! is simply dropped. Subscribers only see events published after they
//! subscribed, in publish order per channel.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::BoxStream;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::graphql::types::{TimeEntry, User};

/// Named topic for creation events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    UserCreated,
    TimeEntryCreated,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::UserCreated, Channel::TimeEntryCreated];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::UserCreated => "createdUser",
            Channel::TimeEntryCreated => "createdTime",
        }
    }
}

/// Entity carried by an event
#[derive(Debug, Clone)]
pub enum EventPayload {
    User(User),
    TimeEntry(TimeEntry),
}

/// Channel plus the just-created entity
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub channel: Channel,
    pub payload: EventPayload,
}

impl NotificationEvent {
    pub fn user_created(user: User) -> Self {
        Self {
            channel: Channel::UserCreated,
            payload: EventPayload::User(user),
        }
    }

    pub fn time_entry_created(entry: TimeEntry) -> Self {
        Self {
            channel: Channel::TimeEntryCreated,
            payload: EventPayload::TimeEntry(entry),
        }
    }
}

/// Publish/subscribe seam, placed in schema data as `Arc<dyn EventBus>`
pub trait EventBus: Send + Sync {
    /// Fire-and-forget delivery to current subscribers of `event.channel`
    fn publish(&self, event: NotificationEvent);

    /// Lazy stream of payloads published on `channel` from now on.
    /// Dropping the stream unsubscribes.
    fn subscribe(&self, channel: Channel) -> BoxStream<'static, EventPayload>;
}

pub type SharedEventBus = Arc<dyn EventBus>;

/// In-process bus with one broadcast channel per [`Channel`]
pub struct BroadcastEventBus {
    senders: HashMap<Channel, broadcast::Sender<EventPayload>>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let senders = Channel::ALL
            .into_iter()
            .map(|channel| (channel, broadcast::channel(capacity.max(1)).0))
            .collect();
        Self { senders }
    }

    pub fn shared(capacity: usize) -> SharedEventBus {
        Arc::new(Self::new(capacity))
    }

    /// Number of live subscriptions on `channel`
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.senders
            .get(&channel)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: NotificationEvent) {
        let Some(sender) = self.senders.get(&event.channel) else {
            return;
        };

        match sender.send(event.payload) {
            Ok(receivers) => {
                tracing::debug!(channel = event.channel.name(), receivers, "Event published");
            }
            Err(_) => {
                tracing::trace!(channel = event.channel.name(), "Event dropped: no subscribers");
            }
        }
    }

    fn subscribe(&self, channel: Channel) -> BoxStream<'static, EventPayload> {
        let Some(sender) = self.senders.get(&channel) else {
            return Box::pin(futures::stream::empty());
        };

        let stream = BroadcastStream::new(sender.subscribe()).filter_map(move |result| {
            match result {
                Ok(payload) => Some(payload),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(channel = channel.name(), skipped, "Subscriber lagged; events skipped");
                    None
                }
            }
        });
        Box::pin(stream)
    }
}

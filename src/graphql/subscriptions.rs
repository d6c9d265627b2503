//! GraphQL subscriptions for creation events
//!
//! Each subscription is a lazy stream over one [`Channel`] of the injected
//! event bus. It only yields entities created after it connected and ends
//! when the client disconnects or the bus shuts down.

use async_graphql::{Context, Subscription};
use futures::Stream;
use tokio_stream::StreamExt;

use crate::services::{Channel, EventPayload, SharedEventBus};

use super::types::{TimeEntry, User};

#[derive(Default)]
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Users created from now on
    async fn on_created_user(&self, ctx: &Context<'_>) -> impl Stream<Item = User> {
        let events = ctx.data_unchecked::<SharedEventBus>();
        events
            .subscribe(Channel::UserCreated)
            .filter_map(|payload| match payload {
                EventPayload::User(user) => Some(user),
                _ => None,
            })
    }

    /// Time entries created from now on, with their owner
    async fn on_created_time(&self, ctx: &Context<'_>) -> impl Stream<Item = TimeEntry> {
        let events = ctx.data_unchecked::<SharedEventBus>();
        events
            .subscribe(Channel::TimeEntryCreated)
            .filter_map(|payload| match payload {
                EventPayload::TimeEntry(entry) => Some(entry),
                _ => None,
            })
    }
}

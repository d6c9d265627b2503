//! GraphQL API with subscriptions for creation events
//!
//! Queries and mutations are split per domain under `queries/` and
//! `mutations/` and merged into the roots in `schema.rs`.

pub mod auth;
pub mod helpers;
pub mod mutations;
pub mod queries;
mod schema;
mod subscriptions;
pub mod types;

pub use auth::{AuthExt, AuthGate, Identity, Role};
pub use schema::{MutationRoot, QueryRoot, TimekeeperSchema, build_schema};
pub use subscriptions::SubscriptionRoot;
pub use types::{PayloadAuth, TimeEntry, User};

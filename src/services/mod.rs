//! Application services
//!
//! - `auth`: credentials, access tokens and signin
//! - `events`: creation events fanned out to subscriptions

pub mod auth;
pub mod events;

pub use auth::{AccessTokenClaims, AuthConfig, AuthService, SigninResult};
pub use events::{
    BroadcastEventBus, Channel, EventBus, EventPayload, NotificationEvent, SharedEventBus,
};

pub mod auth;
pub mod time_entries;
pub mod users;

pub use auth::AuthMutations;
pub use time_entries::TimeEntryMutations;
pub use users::UserMutations;

pub(crate) mod prelude {
    pub(crate) use std::sync::Arc;

    pub(crate) use async_graphql::{Context, ID, Object, Result};

    pub(crate) use crate::db::*;
    pub(crate) use crate::error::{ApiError, ApiResult, IntoGraphqlResult};
    pub(crate) use crate::graphql::auth::{AuthExt, AuthGate, Role};
    pub(crate) use crate::graphql::helpers::*;
    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::services::{AuthService, NotificationEvent, SharedEventBus};
}

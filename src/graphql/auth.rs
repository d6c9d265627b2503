//! GraphQL authentication and authorization
//!
//! The caller's [`Identity`] is derived once per request from the bearer token
//! and stored in the request data. Mutations that need a role wrap their body
//! in an [`AuthGate`] declared next to the resolver:
//!
//! ```ignore
//! const DELETE_TIME: AuthGate = AuthGate::require(Role::Admin);
//!
//! async fn delete_time(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
//!     DELETE_TIME
//!         .run(ctx.identity(), || async { /* touches the database */ })
//!         .await
//!         .into_gql()
//! }
//! ```
//!
//! The wrapped closure is only called after the check passes, so a denied
//! request never reaches persistence.

use std::future::Future;

use async_graphql::{Context, Enum};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Role tag carried by users and access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[graphql(name = "RoleEnum")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Professional,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Professional => "PROFESSIONAL",
        }
    }

    /// Parse a stored role; unknown values are treated as no role
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "PROFESSIONAL" => Some(Role::Professional),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller, valid for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Option<Role>,
}

/// Role check composed around a resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthGate {
    required: Option<Role>,
}

impl AuthGate {
    /// Gate that lets every caller through, including anonymous ones
    pub const fn open() -> Self {
        Self { required: None }
    }

    /// Gate that only admits identities carrying exactly `role`
    pub const fn require(role: Role) -> Self {
        Self {
            required: Some(role),
        }
    }

    pub fn check(&self, identity: Option<&Identity>) -> ApiResult<()> {
        let Some(required) = self.required else {
            return Ok(());
        };

        match identity {
            Some(Identity {
                role: Some(role), ..
            }) if *role == required => Ok(()),
            _ => {
                tracing::debug!(
                    required = %required,
                    user_id = identity.map(|i| i.user_id.as_str()),
                    "Authorization denied"
                );
                Err(ApiError::Authorization(format!(
                    "Role '{}' required",
                    required
                )))
            }
        }
    }

    /// Run `op` only if `identity` passes the check; its result is returned unchanged
    pub async fn run<T, F, Fut>(&self, identity: Option<&Identity>, op: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        self.check(identity)?;
        op().await
    }
}

/// Extension trait to get the caller's identity from GraphQL context
pub trait AuthExt {
    /// The identity attached to this request, if a valid token was presented
    fn identity(&self) -> Option<&Identity>;
}

impl<'a> AuthExt for Context<'a> {
    fn identity(&self) -> Option<&Identity> {
        self.data_opt::<Identity>()
    }
}

//! GraphQL object and input types
//!
//! Field names follow the public schema contract (`registered_times`,
//! `date_registered`, ...), so several fields are renamed explicitly.

use async_graphql::{Context, ID, InputObject, MaybeUndefined, Object, Result};

use crate::db::{Database, TimeEntryRecord, UserRecord};
use crate::error::{ApiError, IntoGraphqlResult};

use super::auth::Role;

// ============================================================================
// Objects
// ============================================================================

/// A user with (optionally) preloaded time entries
#[derive(Debug, Clone)]
pub struct User {
    pub record: UserRecord,
    /// `None` means not loaded yet; the resolver fetches on demand
    pub registered_times: Option<Vec<TimeEntryRecord>>,
}

impl User {
    pub fn with_times(record: UserRecord, times: Vec<TimeEntryRecord>) -> Self {
        Self {
            record,
            registered_times: Some(times),
        }
    }

    pub fn unloaded(record: UserRecord) -> Self {
        Self {
            record,
            registered_times: None,
        }
    }
}

#[Object(name = "User")]
impl User {
    async fn id(&self) -> ID {
        ID(self.record.id.clone())
    }

    async fn name(&self) -> &str {
        &self.record.name
    }

    async fn email(&self) -> &str {
        &self.record.email
    }

    async fn role(&self) -> Option<Role> {
        self.record.role.as_deref().and_then(Role::parse)
    }

    #[graphql(name = "registered_times")]
    async fn registered_times(&self, ctx: &Context<'_>) -> Result<Vec<TimeEntry>> {
        let records = match &self.registered_times {
            Some(records) => records.clone(),
            None => {
                let db = ctx.data_unchecked::<Database>();
                db.time_entries()
                    .list_by_user(&self.record.id)
                    .await
                    .map_err(ApiError::from)
                    .into_gql()?
            }
        };

        Ok(records
            .into_iter()
            .map(|record| TimeEntry {
                record,
                user: self.record.clone(),
            })
            .collect())
    }
}

/// A registered time entry with its owner preloaded
#[derive(Debug, Clone)]
pub struct TimeEntry {
    pub record: TimeEntryRecord,
    pub user: UserRecord,
}

#[Object(name = "Registered_Time")]
impl TimeEntry {
    async fn id(&self) -> ID {
        ID(self.record.id.clone())
    }

    #[graphql(name = "date_registered")]
    async fn date_registered(&self) -> &str {
        &self.record.date_registered
    }

    #[graphql(name = "time_registered")]
    async fn time_registered(&self) -> &str {
        &self.record.time_registered
    }

    async fn user(&self) -> User {
        User::unloaded(self.user.clone())
    }
}

/// Result of a successful signin
#[derive(Debug, Clone)]
pub struct PayloadAuth {
    pub token: String,
    pub user: User,
}

#[Object(name = "PayloadAuth")]
impl PayloadAuth {
    async fn token(&self) -> &str {
        &self.token
    }

    async fn user(&self) -> &User {
        &self.user
    }
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, InputObject)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Omit to keep the role, `null` to clear it
    pub role: MaybeUndefined<Role>,
}

#[derive(Debug, Clone, InputObject)]
pub struct CreateTimeInput {
    #[graphql(name = "date_registered")]
    pub date_registered: String,
    #[graphql(name = "time_registered")]
    pub time_registered: String,
    /// Owner of the entry; defaults to the caller
    pub user: Option<CreateTimeUserInput>,
}

#[derive(Debug, Clone, InputObject)]
pub struct CreateTimeUserInput {
    pub id: Option<ID>,
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateTimeInput {
    #[graphql(name = "time_registered")]
    pub time_registered: String,
}

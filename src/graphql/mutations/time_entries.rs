use super::prelude::*;

use crate::graphql::auth::Identity;

const CREATE_TIME: AuthGate = AuthGate::require(Role::Professional);
const UPDATE_TIME: AuthGate = AuthGate::require(Role::Admin);
const DELETE_TIME: AuthGate = AuthGate::require(Role::Admin);

#[derive(Default)]
pub struct TimeEntryMutations;

#[Object]
impl TimeEntryMutations {
    /// Register a time entry and notify `onCreatedTime` subscribers.
    ///
    /// Without `data.user.id` the entry belongs to the caller.
    async fn create_time(&self, ctx: &Context<'_>, data: CreateTimeInput) -> Result<TimeEntry> {
        let identity = ctx.identity();
        CREATE_TIME
            .run(identity, || create_time(ctx, identity, data))
            .await
            .into_gql()
    }

    async fn update_time(
        &self,
        ctx: &Context<'_>,
        id: ID,
        data: UpdateTimeInput,
    ) -> Result<TimeEntry> {
        UPDATE_TIME
            .run(ctx.identity(), || update_time(ctx, id, data))
            .await
            .into_gql()
    }

    async fn delete_time(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        DELETE_TIME
            .run(ctx.identity(), || delete_time(ctx, id))
            .await
            .into_gql()
    }
}

async fn create_time(
    ctx: &Context<'_>,
    identity: Option<&Identity>,
    data: CreateTimeInput,
) -> ApiResult<TimeEntry> {
    let db = ctx.data_unchecked::<Database>();
    let events = ctx.data_unchecked::<SharedEventBus>();

    let owner_id = match data.user.and_then(|u| u.id) {
        Some(id) => id.0,
        None => identity
            .map(|i| i.user_id.clone())
            .ok_or_else(|| ApiError::Validation("Time entry owner is required".to_string()))?,
    };

    let owner = db
        .users()
        .get_by_id(&owner_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", owner_id.clone()))?;

    let record = db
        .time_entries()
        .create(CreateTimeEntry {
            date_registered: data.date_registered,
            time_registered: data.time_registered,
            user_id: owner.id.clone(),
        })
        .await?;

    tracing::info!(time_entry_id = %record.id, user_id = %owner.id, "Time entry created");

    let entry = TimeEntry {
        record,
        user: owner,
    };
    events.publish(NotificationEvent::time_entry_created(entry.clone()));
    Ok(entry)
}

async fn update_time(ctx: &Context<'_>, id: ID, data: UpdateTimeInput) -> ApiResult<TimeEntry> {
    let db = ctx.data_unchecked::<Database>();

    let record = db
        .time_entries()
        .update(
            &id,
            UpdateTimeEntry {
                time_registered: data.time_registered,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Registered_Time", id.0.clone()))?;

    tracing::info!(time_entry_id = %record.id, "Time entry updated");
    time_entry_with_user(db, record).await
}

async fn delete_time(ctx: &Context<'_>, id: ID) -> ApiResult<bool> {
    let db = ctx.data_unchecked::<Database>();
    if !db.time_entries().delete(&id).await? {
        return Err(ApiError::not_found("Registered_Time", id.0));
    }
    tracing::info!(time_entry_id = %id.as_str(), "Time entry deleted");
    Ok(true)
}

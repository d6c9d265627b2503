// Helper functions shared across GraphQL query/mutation modules.

use std::collections::HashMap;

use crate::db::{Database, TimeEntryFilter, TimeEntryRecord, is_unique_violation};
use crate::error::{ApiError, ApiResult};

use super::types::{TimeEntry, User};

/// All users with their time entries, in two queries
pub(crate) async fn users_with_times(db: &Database) -> ApiResult<Vec<User>> {
    let users = db.users().list_all().await?;
    let mut by_user: HashMap<String, Vec<TimeEntryRecord>> = HashMap::new();
    for entry in db.time_entries().list(TimeEntryFilter::default()).await? {
        by_user.entry(entry.user_id.clone()).or_default().push(entry);
    }

    Ok(users
        .into_iter()
        .map(|user| {
            let times = by_user.remove(&user.id).unwrap_or_default();
            User::with_times(user, times)
        })
        .collect())
}

/// One user with their time entries, or `NotFound`
pub(crate) async fn user_with_times(db: &Database, id: &str) -> ApiResult<User> {
    let user = db
        .users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    let times = db.time_entries().list_by_user(id).await?;
    Ok(User::with_times(user, times))
}

/// Time entries matching `filter`, each with its owner
pub(crate) async fn time_entries_with_users(
    db: &Database,
    filter: TimeEntryFilter,
) -> ApiResult<Vec<TimeEntry>> {
    let entries = db.time_entries().list(filter).await?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let owners: HashMap<String, _> = db
        .users()
        .list_all()
        .await?
        .into_iter()
        .map(|user| (user.id.clone(), user))
        .collect();

    entries
        .into_iter()
        .map(|record| -> ApiResult<TimeEntry> {
            let user = owners
                .get(&record.user_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Time entry {} has no owner", record.id))?;
            Ok(TimeEntry { record, user })
        })
        .collect()
}

/// Attach the owner to a freshly loaded entry
pub(crate) async fn time_entry_with_user(
    db: &Database,
    record: TimeEntryRecord,
) -> ApiResult<TimeEntry> {
    let user = db
        .users()
        .get_by_id(&record.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", record.user_id.clone()))?;
    Ok(TimeEntry { record, user })
}

/// Map a duplicate email to a validation error; anything else stays internal
pub(crate) fn email_conflict(err: anyhow::Error) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::Validation("Email already registered".to_string())
    } else {
        ApiError::Internal(err)
    }
}

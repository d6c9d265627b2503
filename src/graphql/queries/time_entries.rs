use super::prelude::*;

#[derive(Default)]
pub struct TimeEntryQueries;

#[Object]
impl TimeEntryQueries {
    /// Registered times with their owners, optionally for one user only
    async fn all_registered_times(
        &self,
        ctx: &Context<'_>,
        user_id: Option<String>,
    ) -> Result<Vec<TimeEntry>> {
        let db = ctx.data_unchecked::<Database>();
        time_entries_with_users(db, TimeEntryFilter { user_id })
            .await
            .into_gql()
    }
}

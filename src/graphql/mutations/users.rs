use async_graphql::MaybeUndefined;

use super::prelude::*;

const CREATE_USER: AuthGate = AuthGate::open();
const UPDATE_USER: AuthGate = AuthGate::open();
const DELETE_USER: AuthGate = AuthGate::open();

#[derive(Default)]
pub struct UserMutations;

#[Object]
impl UserMutations {
    /// Register a user and notify `onCreatedUser` subscribers
    async fn create_user(&self, ctx: &Context<'_>, data: CreateUserInput) -> Result<User> {
        CREATE_USER
            .run(ctx.identity(), || create_user(ctx, data))
            .await
            .into_gql()
    }

    /// Change any subset of a user's fields
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        #[graphql(default)] data: UpdateUserInput,
    ) -> Result<User> {
        UPDATE_USER
            .run(ctx.identity(), || update_user(ctx, id, data))
            .await
            .into_gql()
    }

    /// Remove a user together with their registered times
    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        DELETE_USER
            .run(ctx.identity(), || delete_user(ctx, id))
            .await
            .into_gql()
    }
}

async fn create_user(ctx: &Context<'_>, data: CreateUserInput) -> ApiResult<User> {
    let db = ctx.data_unchecked::<Database>();
    let auth = ctx.data_unchecked::<Arc<AuthService>>();
    let events = ctx.data_unchecked::<SharedEventBus>();

    let password_hash = auth.hash_password(&data.password)?;
    let record = db
        .users()
        .create(CreateUser {
            name: data.name,
            email: data.email,
            password_hash,
            role: Some(data.role.as_str().to_string()),
        })
        .await
        .map_err(email_conflict)?;

    tracing::info!(user_id = %record.id, role = %data.role, "User created");

    // A new user owns no entries yet, so this is already fully loaded
    let user = User::with_times(record, Vec::new());
    events.publish(NotificationEvent::user_created(user.clone()));
    Ok(user)
}

async fn update_user(ctx: &Context<'_>, id: ID, data: UpdateUserInput) -> ApiResult<User> {
    let db = ctx.data_unchecked::<Database>();
    let auth = ctx.data_unchecked::<Arc<AuthService>>();

    let password_hash = match data.password.as_deref() {
        Some(password) => Some(auth.hash_password(password)?),
        None => None,
    };

    let updated = db
        .users()
        .update(
            &id,
            UpdateUser {
                name: data.name,
                email: data.email,
                password_hash,
                role: match data.role {
                    MaybeUndefined::Undefined => None,
                    MaybeUndefined::Null => Some(None),
                    MaybeUndefined::Value(role) => Some(Some(role.as_str().to_string())),
                },
            },
        )
        .await
        .map_err(email_conflict)?;

    if updated.is_none() {
        return Err(ApiError::not_found("User", id.0));
    }

    tracing::info!(user_id = %id.as_str(), "User updated");
    user_with_times(db, &id).await
}

async fn delete_user(ctx: &Context<'_>, id: ID) -> ApiResult<bool> {
    let db = ctx.data_unchecked::<Database>();
    if !db.users().delete(&id).await? {
        return Err(ApiError::not_found("User", id.0));
    }
    tracing::info!(user_id = %id.as_str(), "User deleted");
    Ok(true)
}

//! GraphQL schema definition with queries, mutations, and subscriptions
//!
//! Reads and user mutations are open. Time entry mutations are gated by role
//! inside their resolvers (see [`AuthGate`](super::auth::AuthGate)).

use std::sync::Arc;

use async_graphql::{MergedObject, Schema};

use crate::db::Database;
use crate::services::{AuthService, SharedEventBus};

use super::mutations::{AuthMutations, TimeEntryMutations, UserMutations};
use super::queries::{TimeEntryQueries, UserQueries};
use super::subscriptions::SubscriptionRoot;

/// The GraphQL schema type
pub type TimekeeperSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(UserQueries, TimeEntryQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(UserMutations, TimeEntryMutations, AuthMutations);

/// Build the GraphQL schema with all resolvers
///
/// The event bus is injected so tests and alternative transports can supply
/// their own implementation.
pub fn build_schema(
    db: Database,
    auth: Arc<AuthService>,
    events: SharedEventBus,
) -> TimekeeperSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        SubscriptionRoot,
    )
    .data(db)
    .data(auth)
    .data(events)
    .finish()
}

#[cfg(test)]
mod tests {
    use async_graphql::{Request, Response};
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::db::{CreateUser, TimeEntryFilter, UserRecord, test_database};
    use crate::graphql::auth::{Identity, Role};
    use crate::services::{AuthConfig, BroadcastEventBus};

    struct Harness {
        db: Database,
        auth: Arc<AuthService>,
        schema: TimekeeperSchema,
    }

    async fn harness() -> Harness {
        let db = test_database().await;
        let auth = Arc::new(AuthService::new(
            db.clone(),
            AuthConfig {
                jwt_secret: "schema-test".to_string(),
                token_lifetime: 60,
                bcrypt_cost: 4,
            },
        ));
        let schema = build_schema(db.clone(), auth.clone(), BroadcastEventBus::shared(16));
        Harness { db, auth, schema }
    }

    impl Harness {
        async fn user(&self, email: &str, role: Option<Role>) -> UserRecord {
            self.db
                .users()
                .create(CreateUser {
                    name: email.split('@').next().unwrap_or(email).to_string(),
                    email: email.to_string(),
                    password_hash: self.auth.hash_password("hunter2").unwrap(),
                    role: role.map(|r| r.as_str().to_string()),
                })
                .await
                .unwrap()
        }

        async fn run(&self, query: &str, identity: Option<Identity>) -> Response {
            let mut request = Request::new(query);
            if let Some(identity) = identity {
                request = request.data(identity);
            }
            self.schema.execute(request).await
        }
    }

    fn as_identity(user: &UserRecord) -> Identity {
        Identity {
            user_id: user.id.clone(),
            role: user.role.as_deref().and_then(Role::parse),
        }
    }

    fn error_code(response: &Response) -> Option<String> {
        let body = serde_json::to_value(response).unwrap();
        body["errors"][0]["extensions"]["code"]
            .as_str()
            .map(str::to_string)
    }

    fn data(response: Response) -> Value {
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        response.data.into_json().unwrap()
    }

    #[tokio::test]
    async fn test_create_time_by_admin_is_forbidden_and_stores_nothing() {
        let h = harness().await;
        let admin = h.user("admin@example.com", Some(Role::Admin)).await;

        let response = h
            .run(
                r#"mutation { createTime(data: { date_registered: "2024-05-01", time_registered: "08:00" }) { id } }"#,
                Some(as_identity(&admin)),
            )
            .await;

        assert_eq!(error_code(&response).as_deref(), Some("FORBIDDEN"));
        let stored = h
            .db
            .time_entries()
            .list(TimeEntryFilter::default())
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_create_time_by_professional_defaults_owner_to_caller() {
        let h = harness().await;
        let pro = h.user("pro@example.com", Some(Role::Professional)).await;

        let response = h
            .run(
                r#"mutation { createTime(data: { date_registered: "2024-05-01", time_registered: "08:00" }) { time_registered user { id email } } }"#,
                Some(as_identity(&pro)),
            )
            .await;

        assert_eq!(
            data(response),
            json!({ "createTime": {
                "time_registered": "08:00",
                "user": { "id": pro.id, "email": "pro@example.com" }
            }})
        );
    }

    #[tokio::test]
    async fn test_create_time_for_unknown_owner_is_not_found() {
        let h = harness().await;
        let pro = h.user("pro@example.com", Some(Role::Professional)).await;

        let response = h
            .run(
                r#"mutation { createTime(data: { date_registered: "2024-05-01", time_registered: "08:00", user: { id: "ghost" } }) { id } }"#,
                Some(as_identity(&pro)),
            )
            .await;

        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_admin_gated_mutation_rejects_professional_and_anonymous() {
        let h = harness().await;
        let pro = h.user("pro@example.com", Some(Role::Professional)).await;
        let query = r#"mutation { updateTime(id: "1", data: { time_registered: "09:00" }) { id } }"#;

        let response = h.run(query, Some(as_identity(&pro))).await;
        assert_eq!(error_code(&response).as_deref(), Some("FORBIDDEN"));

        let response = h.run(query, None).await;
        assert_eq!(error_code(&response).as_deref(), Some("FORBIDDEN"));
    }

    #[tokio::test]
    async fn test_delete_unknown_time_is_not_found_for_admin() {
        let h = harness().await;
        let admin = h.user("admin@example.com", Some(Role::Admin)).await;

        let response = h
            .run(
                r#"mutation { deleteTime(id: "missing") }"#,
                Some(as_identity(&admin)),
            )
            .await;

        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_update_unknown_time_is_not_found_for_admin() {
        let h = harness().await;
        let admin = h.user("admin@example.com", Some(Role::Admin)).await;
        let pro = h.user("pro@example.com", Some(Role::Professional)).await;
        data(
            h.run(
                r#"mutation { createTime(data: { date_registered: "2024-05-01", time_registered: "08:00" }) { id } }"#,
                Some(as_identity(&pro)),
            )
            .await,
        );

        let response = h
            .run(
                r#"mutation { updateTime(id: "missing", data: { time_registered: "23:59" }) { id } }"#,
                Some(as_identity(&admin)),
            )
            .await;

        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
        let stored = h
            .db
            .time_entries()
            .list(TimeEntryFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].time_registered, "08:00");
    }

    #[tokio::test]
    async fn test_admin_updates_and_deletes_time() {
        let h = harness().await;
        let admin = h.user("admin@example.com", Some(Role::Admin)).await;
        let pro = h.user("pro@example.com", Some(Role::Professional)).await;

        let created = data(
            h.run(
                r#"mutation { createTime(data: { date_registered: "2024-05-01", time_registered: "08:00" }) { id } }"#,
                Some(as_identity(&pro)),
            )
            .await,
        );
        let id = created["createTime"]["id"].as_str().unwrap().to_string();

        let updated = data(
            h.run(
                &format!(
                    r#"mutation {{ updateTime(id: "{id}", data: {{ time_registered: "17:30" }}) {{ date_registered time_registered }} }}"#
                ),
                Some(as_identity(&admin)),
            )
            .await,
        );
        assert_eq!(
            updated,
            json!({ "updateTime": { "date_registered": "2024-05-01", "time_registered": "17:30" } })
        );

        let deleted = data(
            h.run(
                &format!(r#"mutation {{ deleteTime(id: "{id}") }}"#),
                Some(as_identity(&admin)),
            )
            .await,
        );
        assert_eq!(deleted, json!({ "deleteTime": true }));
    }

    #[tokio::test]
    async fn test_open_operations_need_no_identity() {
        let h = harness().await;

        let created = data(
            h.run(
                r#"mutation { createUser(data: { name: "Ana", email: "ana@example.com", password: "pw", role: PROFESSIONAL }) { id role registered_times { id } } }"#,
                None,
            )
            .await,
        );
        assert_eq!(created["createUser"]["role"], json!("PROFESSIONAL"));
        assert_eq!(created["createUser"]["registered_times"], json!([]));
        let id = created["createUser"]["id"].as_str().unwrap().to_string();

        let updated = data(
            h.run(
                &format!(r#"mutation {{ updateUser(id: "{id}", data: {{ name: "Ana Maria" }}) {{ name email }} }}"#),
                None,
            )
            .await,
        );
        assert_eq!(
            updated,
            json!({ "updateUser": { "name": "Ana Maria", "email": "ana@example.com" } })
        );

        let listed = data(h.run("{ allUsers { name } allRegisteredTimes { id } }", None).await);
        assert_eq!(
            listed,
            json!({ "allUsers": [{ "name": "Ana Maria" }], "allRegisteredTimes": [] })
        );

        let deleted = data(
            h.run(&format!(r#"mutation {{ deleteUser(id: "{id}") }}"#), None)
                .await,
        );
        assert_eq!(deleted, json!({ "deleteUser": true }));
    }

    #[tokio::test]
    async fn test_delete_unknown_user_is_not_found() {
        let h = harness().await;
        let existing = h.user("keep@example.com", Some(Role::Professional)).await;

        let response = h
            .run(r#"mutation { deleteUser(id: "nobody") }"#, None)
            .await;

        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
        let users = h.db.users().list_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, existing.id);
    }

    #[tokio::test]
    async fn test_update_user_role_can_be_cleared_with_null() {
        let h = harness().await;
        let user = h.user("role@example.com", Some(Role::Admin)).await;

        let kept = data(
            h.run(
                &format!(r#"mutation {{ updateUser(id: "{}", data: {{ name: "Renamed" }}) {{ role }} }}"#, user.id),
                None,
            )
            .await,
        );
        assert_eq!(kept, json!({ "updateUser": { "role": "ADMIN" } }));

        let cleared = data(
            h.run(
                &format!(r#"mutation {{ updateUser(id: "{}", data: {{ role: null }}) {{ name role }} }}"#, user.id),
                None,
            )
            .await,
        );
        assert_eq!(
            cleared,
            json!({ "updateUser": { "name": "Renamed", "role": null } })
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_is_bad_user_input() {
        let h = harness().await;
        h.user("taken@example.com", None).await;

        let response = h
            .run(
                r#"mutation { createUser(data: { name: "Dup", email: "TAKEN@example.com", password: "pw", role: ADMIN }) { id } }"#,
                None,
            )
            .await;

        assert_eq!(error_code(&response).as_deref(), Some("BAD_USER_INPUT"));
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let h = harness().await;
        let response = h
            .run(
                r#"mutation { updateUser(id: "nobody", data: { name: "X" }) { id } }"#,
                None,
            )
            .await;
        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_signin_wrong_password_is_bad_user_input() {
        let h = harness().await;
        h.user("gil@example.com", Some(Role::Admin)).await;

        let response = h
            .run(
                r#"mutation { signin(email: "gil@example.com", password: "wrong") { token } }"#,
                None,
            )
            .await;

        assert_eq!(error_code(&response).as_deref(), Some("BAD_USER_INPUT"));
    }

    #[tokio::test]
    async fn test_signin_returns_token_for_caller() {
        let h = harness().await;
        let user = h.user("gil@example.com", Some(Role::Admin)).await;

        let body = data(
            h.run(
                r#"mutation { signin(email: "gil@example.com", password: "hunter2") { token user { id role } } }"#,
                None,
            )
            .await,
        );

        assert_eq!(body["signin"]["user"], json!({ "id": user.id, "role": "ADMIN" }));
        let token = body["signin"]["token"].as_str().unwrap();
        assert_eq!(h.auth.verify_token(token).unwrap(), as_identity(&user));
    }

    #[tokio::test]
    async fn test_all_registered_times_filters_by_user() {
        let h = harness().await;
        let first = h.user("first@example.com", Some(Role::Professional)).await;
        let second = h.user("second@example.com", Some(Role::Professional)).await;

        for owner in [&first, &second, &first] {
            data(
                h.run(
                    r#"mutation { createTime(data: { date_registered: "2024-05-01", time_registered: "08:00" }) { id } }"#,
                    Some(as_identity(owner)),
                )
                .await,
            );
        }

        let body = data(
            h.run(
                &format!(r#"{{ allRegisteredTimes(userId: "{}") {{ user {{ email }} }} }}"#, first.id),
                None,
            )
            .await,
        );
        assert_eq!(
            body,
            json!({ "allRegisteredTimes": [
                { "user": { "email": "first@example.com" } },
                { "user": { "email": "first@example.com" } }
            ]})
        );

        let all = data(h.run("{ allUsers { email registered_times { id } } }", None).await);
        assert_eq!(all["allUsers"][0]["registered_times"].as_array().unwrap().len(), 2);
        assert_eq!(all["allUsers"][1]["registered_times"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_subscriber_receives_created_user() {
        let h = harness().await;

        let stream = h
            .schema
            .execute_stream(Request::new("subscription { onCreatedUser { id name } }"));
        tokio::pin!(stream);
        let mut next = stream.next();
        assert!(futures::poll!(&mut next).is_pending());

        let created = data(
            h.run(
                r#"mutation { createUser(data: { name: "Eve", email: "eve@example.com", password: "pw", role: ADMIN }) { id } }"#,
                None,
            )
            .await,
        );

        let event = data(next.await.unwrap());
        assert_eq!(
            event,
            json!({ "onCreatedUser": { "id": created["createUser"]["id"], "name": "Eve" } })
        );
    }

    #[tokio::test]
    async fn test_subscriber_receives_created_time_with_owner() {
        let h = harness().await;
        let pro = h.user("pro@example.com", Some(Role::Professional)).await;

        let stream = h.schema.execute_stream(Request::new(
            "subscription { onCreatedTime { time_registered user { email } } }",
        ));
        tokio::pin!(stream);
        let mut next = stream.next();
        assert!(futures::poll!(&mut next).is_pending());

        data(
            h.run(
                r#"mutation { createTime(data: { date_registered: "2024-05-01", time_registered: "10:15" }) { id } }"#,
                Some(as_identity(&pro)),
            )
            .await,
        );

        let event = data(next.await.unwrap());
        assert_eq!(
            event,
            json!({ "onCreatedTime": { "time_registered": "10:15", "user": { "email": "pro@example.com" } } })
        );
    }
}

//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use futures::stream::BoxStream;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use timekeeper::AppState;
use timekeeper::db::{CreateUser, Database, UserRecord};
use timekeeper::graphql::{Role, build_schema};
use timekeeper::services::{
    AuthConfig, AuthService, BroadcastEventBus, Channel, EventBus, EventPayload,
    NotificationEvent, SharedEventBus,
};

pub const PASSWORD: &str = "correct horse";

/// Bus that only records what was published
#[derive(Default)]
pub struct RecordingBus {
    pub published: Mutex<Vec<NotificationEvent>>,
}

impl RecordingBus {
    pub fn channels(&self) -> Vec<Channel> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.channel)
            .collect()
    }
}

impl EventBus for RecordingBus {
    fn publish(&self, event: NotificationEvent) {
        self.published.lock().unwrap().push(event);
    }

    fn subscribe(&self, _channel: Channel) -> BoxStream<'static, EventPayload> {
        Box::pin(futures::stream::empty())
    }
}

pub struct TestApp {
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub router: Router,
}

pub async fn build_test_app() -> TestApp {
    build_test_app_with_bus(BroadcastEventBus::shared(16)).await
}

pub async fn build_test_app_with_bus(events: SharedEventBus) -> TestApp {
    let db = Database::connect("sqlite::memory:", 1).await.unwrap();
    db.migrate().await.unwrap();

    let auth = Arc::new(AuthService::new(
        db.clone(),
        AuthConfig {
            jwt_secret: "integration-secret".to_string(),
            token_lifetime: 300,
            bcrypt_cost: 4,
        },
    ));
    let schema = build_schema(db.clone(), auth.clone(), events);
    let router = timekeeper::api::router(AppState {
        db: db.clone(),
        auth: auth.clone(),
        schema,
    });

    TestApp { db, auth, router }
}

impl TestApp {
    pub async fn create_user(&self, email: &str, role: Option<Role>) -> UserRecord {
        self.db
            .users()
            .create(CreateUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: self.auth.hash_password(PASSWORD).unwrap(),
                role: role.map(|r| r.as_str().to_string()),
            })
            .await
            .unwrap()
    }

    /// POST a GraphQL document, optionally with a bearer token
    pub async fn graphql(&self, query: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::post("/graphql").header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = serde_json::json!({ "query": query }).to_string();
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, accept: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(uri);
        if let Some(accept) = accept {
            builder = builder.header("accept", accept);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}

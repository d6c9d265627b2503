//! Timekeeper - GraphQL service for users and their registered working times
//!
//! All operations are exposed via GraphQL at `/graphql`, with creation events
//! streamed over `/graphql/ws`.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod services;

use std::sync::Arc;

use crate::db::Database;
use crate::graphql::TimekeeperSchema;
use crate::services::AuthService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub schema: TimekeeperSchema,
}

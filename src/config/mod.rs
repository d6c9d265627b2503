//! Application configuration management

use std::env;

use anyhow::{Context, Result, bail};

const DEFAULT_TOKEN_LIFETIME: i64 = 24 * 60 * 60;

/// Ten years
const MAX_TOKEN_LIFETIME: i64 = 10 * 365 * 24 * 60 * 60;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// SQLite connection URL
    pub database_url: String,

    /// Maximum pooled database connections
    pub database_max_connections: u32,

    /// JWT signing secret
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub token_lifetime: i64,

    /// Bcrypt cost factor
    pub bcrypt_cost: u32,

    /// Per-channel buffer for creation events
    pub event_channel_capacity: usize,

    /// Admin account ensured at startup
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials for the admin account seeded on startup
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.trim().to_string(),
            _ => {
                tracing::warn!("JWT_SECRET not set; using an insecure development secret");
                "dev-secret-change-me".to_string()
            }
        };

        let bootstrap_admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin {
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:timekeeper.db?mode=rwc".to_string()),

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),

            jwt_secret,

            token_lifetime: parse_token_lifetime(env::var("TOKEN_LIFETIME").ok())?,

            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),

            event_channel_capacity: env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),

            bootstrap_admin,
        })
    }
}

/// Token lifetime in seconds: default when unset, error when unparsable or
/// outside `1..=MAX_TOKEN_LIFETIME`
fn parse_token_lifetime(raw: Option<String>) -> Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TOKEN_LIFETIME);
    };
    let seconds: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid TOKEN_LIFETIME: {}", raw))?;
    if !(1..=MAX_TOKEN_LIFETIME).contains(&seconds) {
        bail!(
            "TOKEN_LIFETIME must be between 1 and {} seconds, got {}",
            MAX_TOKEN_LIFETIME,
            seconds
        );
    }
    Ok(seconds)
}

//! Authentication service for password hashing and JWT handling
//!
//! Provides:
//! - Password hashing with bcrypt
//! - Access token issuance and verification
//! - Signin by email and password

use anyhow::{Context, Result, anyhow};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::{BootstrapAdmin, Config};
use crate::db::{CreateUser, Database, UserRecord};
use crate::error::{ApiError, ApiResult};
use crate::graphql::auth::{Identity, Role};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims structure for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,
    /// User role, absent for users without one
    pub role: Option<Role>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 24 hours)
    pub token_lifetime: i64,
    /// Bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_lifetime: config.token_lifetime,
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

/// Token and user returned by a successful signin
#[derive(Debug, Clone)]
pub struct SigninResult {
    pub token: String,
    pub user: UserRecord,
}

// ============================================================================
// Auth Service
// ============================================================================

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: Database, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Hash a password with the configured bcrypt cost
    pub fn hash_password(&self, password: &str) -> Result<String> {
        hash(password, self.config.bcrypt_cost).context("Failed to hash password")
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        verify(password, password_hash).context("Failed to verify password")
    }

    /// Sign an access token for `user`
    pub fn issue_token(&self, user: &UserRecord) -> Result<String> {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(self.config.token_lifetime)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| anyhow!("Token lifetime out of range: {}", self.config.token_lifetime))?;
        let claims = AccessTokenClaims {
            sub: user.id.clone(),
            role: user.role.as_deref().and_then(Role::parse),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .context("Failed to sign access token")
    }

    /// Verify signature and expiry, and extract the caller's identity
    pub fn verify_token(&self, token: &str) -> Result<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .context("Invalid token")?;

        Ok(Identity {
            user_id: token_data.claims.sub,
            role: token_data.claims.role,
        })
    }

    /// Identity for a bearer token. Malformed, forged or expired tokens yield `None`.
    pub fn identify(&self, token: &str) -> Option<Identity> {
        match self.verify_token(token) {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.user_id, "Token verified");
                Some(identity)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Token rejected; continuing anonymously");
                None
            }
        }
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn signin(&self, email: &str, password: &str) -> ApiResult<SigninResult> {
        let Some(user) = self.db.users().get_by_email(email).await? else {
            tracing::info!(email = %email, "Signin failed: unknown email");
            return Err(ApiError::Validation(INVALID_CREDENTIALS.to_string()));
        };

        if !self.verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Signin failed: wrong password");
            return Err(ApiError::Validation(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(SigninResult { token, user })
    }

    /// Make sure the configured admin account exists.
    ///
    /// An existing account with that email is returned as is; its password
    /// and role are not touched.
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> Result<UserRecord> {
        let (user, created) = self
            .db
            .users()
            .find_or_create_by_email(CreateUser {
                name: admin.name.clone(),
                email: admin.email.clone(),
                password_hash: self.hash_password(&admin.password)?,
                role: Some(Role::Admin.as_str().to_string()),
            })
            .await
            .context("Failed to seed admin account")?;

        if created {
            tracing::info!(user_id = %user.id, email = %user.email, "Admin account created");
        } else {
            tracing::debug!(user_id = %user.id, "Admin account already present");
        }
        Ok(user)
    }
}

//! Error taxonomy surfaced to GraphQL callers
//!
//! Every resolver failure is one of these variants. The variant decides the
//! `extensions.code` clients see, so a denial is never confused with a
//! missing record or a server fault.

use async_graphql::ErrorExtensions;

/// Caller-visible failure of a single operation
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required role absent or mismatched
    #[error("{0}")]
    Authorization(String),

    /// Referenced identifier has no matching record
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected (credential mismatch, duplicate email, ...)
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Extension code attached to the GraphQL error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "BAD_USER_INPUT",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        let message = match self {
            Self::Internal(e) => {
                tracing::error!(error = %e, "Operation failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let code = self.code();
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// Convert service results into GraphQL results carrying the error code
pub trait IntoGraphqlResult<T> {
    fn into_gql(self) -> async_graphql::Result<T>;
}

impl<T> IntoGraphqlResult<T> for ApiResult<T> {
    fn into_gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }
}

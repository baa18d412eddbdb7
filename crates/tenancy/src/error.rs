//! Error types for tenant resolution and routing.
//!
//! Request-time failures are represented by [`TenancyError`], which renders
//! itself as a JSON error response. Failures while building a
//! [`TenantRegistry`](crate::tenant::TenantRegistry) are represented by
//! [`RegistryError`] and never reach a request.
//!
//! # Error Mapping
//!
//! | Error | HTTP Status | Code |
//! |-------|-------------|------|
//! | Resolution | 500 | resolution-failed |
//! | InvalidTenantKey | 400 | invalid-tenant |
//! | TenantNotFound | 404 | tenant-not-found |
//! | UndefinedTenant | 404 | undefined-tenant |
//! | OrderingViolation | 500 | pipeline-misconfigured |
//! | InvalidUri | 400 | invalid-uri |

// Variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Boxed error produced by a [`TenantParser`](crate::resolver::TenantParser).
pub type BoxError = axum::BoxError;

/// Result alias for request-time tenancy operations.
pub type TenancyResult<T> = Result<T, TenancyError>;

/// Result alias for registry construction.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while resolving, attaching or rewriting a request's tenant.
///
/// All of these are local to a single request.
#[derive(Error, Debug)]
pub enum TenancyError {
    /// The resolution strategy failed. The request is failed, never retried.
    #[error("tenant resolution failed: {0}")]
    Resolution(#[source] BoxError),

    /// The request named a tenant with a malformed key.
    #[error("invalid tenant key: {key:?}")]
    InvalidTenantKey { key: String },

    /// The resolved key is not registered and the policy rejects it.
    #[error("tenant not found: {key}")]
    TenantNotFound { key: String },

    /// A step dereferenced an attached tenant that is not registered.
    #[error("undefined tenant: {key}")]
    UndefinedTenant { key: String },

    /// A step that needs an attached tenant ran before injection.
    #[error("no tenant attached to request before {step}")]
    OrderingViolation { step: &'static str },

    /// The rewritten request URI could not be built.
    #[error("invalid rewritten uri: {0}")]
    InvalidUri(String),
}

impl TenancyError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TenancyError::Resolution(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TenancyError::InvalidTenantKey { .. } => StatusCode::BAD_REQUEST,
            TenancyError::TenantNotFound { .. } => StatusCode::NOT_FOUND,
            TenancyError::UndefinedTenant { .. } => StatusCode::NOT_FOUND,
            TenancyError::OrderingViolation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            TenancyError::InvalidUri(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Returns the machine-readable error code used in response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            TenancyError::Resolution(_) => "resolution-failed",
            TenancyError::InvalidTenantKey { .. } => "invalid-tenant",
            TenancyError::TenantNotFound { .. } => "tenant-not-found",
            TenancyError::UndefinedTenant { .. } => "undefined-tenant",
            TenancyError::OrderingViolation { .. } => "pipeline-misconfigured",
            TenancyError::InvalidUri(_) => "invalid-uri",
        }
    }
}

impl IntoResponse for TenancyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't leak parser internals to clients
        let message = match &self {
            TenancyError::Resolution(_) | TenancyError::OrderingViolation { .. } => {
                status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": self.code(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Errors raised while building a tenant registry or tenancy state.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("duplicate tenant key: {key}")]
    DuplicateKey { key: String },

    #[error("tenant {key} has invalid environment {environment:?}")]
    InvalidEnvironment { key: String, environment: String },

    #[error("failed to read tenant registry: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tenant registry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("default tenant {key:?} is not a valid tenant key")]
    InvalidDefaultTenant { key: String },

    #[error("invalid tenant header name: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderName),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TenancyError::TenantNotFound { key: "x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TenancyError::UndefinedTenant { key: "x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TenancyError::InvalidTenantKey { key: "a.b".into() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TenancyError::OrderingViolation { step: "rewrite" }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            TenancyError::Resolution("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_display() {
        let err = TenancyError::UndefinedTenant {
            key: "ghost".into(),
        };
        assert_eq!(err.to_string(), "undefined tenant: ghost");

        let err = RegistryError::DuplicateKey { key: "acme".into() };
        assert!(err.to_string().contains("acme"));
    }

    #[test]
    fn test_into_response_status() {
        let response = TenancyError::TenantNotFound { key: "nope".into() }.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = TenancyError::Resolution("db down".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

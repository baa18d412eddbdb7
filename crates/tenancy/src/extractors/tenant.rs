//! Tenant extractors.
//!
//! Handlers mounted behind [`inject_tenant`](crate::middleware::inject_tenant)
//! can take the attached tenant as an argument instead of reading request
//! extensions by hand.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::TenancyError;
use crate::middleware::inject::CurrentTenant;
use crate::tenant::Tenant;

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = TenancyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentTenant>()
            .cloned()
            .ok_or(TenancyError::OrderingViolation {
                step: "tenant extraction",
            })
    }
}

/// Extractor for a registered tenant.
///
/// Rejects with [`TenancyError::UndefinedTenant`] when the attached key is not
/// registered.
///
/// # Example
///
/// ```rust,ignore
/// use helios_tenancy::extractors::RequireTenant;
///
/// async fn handler(RequireTenant(tenant): RequireTenant) -> String {
///     tenant.environment().to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireTenant(pub Arc<Tenant>);

impl<S> FromRequestParts<S> for RequireTenant
where
    S: Send + Sync,
{
    type Rejection = TenancyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let current = CurrentTenant::from_request_parts(parts, state).await?;
        current.require().cloned().map(RequireTenant)
    }
}

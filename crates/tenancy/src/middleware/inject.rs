//! Tenant injection middleware.
//!
//! Resolves the request's tenant through [`Tenancy::inject`] and attaches it
//! as a [`CurrentTenant`] request extension. Mount it ahead of any
//! tenant-aware routing:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .fallback_service(tenant_router)
//!     .layer(axum::middleware::from_fn_with_state(tenancy, inject_tenant));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Extensions,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::{TenancyError, TenancyResult};
use crate::state::Tenancy;
use crate::tenant::{Tenant, TenantKey, TenantSource};

/// The tenant attached to a request.
///
/// `tenant` is `None` when the resolved key is not registered and the
/// unknown-tenant policy attaches it anyway; dereferencing it through
/// [`require`](Self::require) then fails with
/// [`TenancyError::UndefinedTenant`].
#[derive(Debug, Clone)]
pub struct CurrentTenant {
    key: TenantKey,
    tenant: Option<Arc<Tenant>>,
    source: TenantSource,
}

impl CurrentTenant {
    /// Creates an attachment for the given key.
    pub fn new(key: TenantKey, tenant: Option<Arc<Tenant>>, source: TenantSource) -> Self {
        Self {
            key,
            tenant,
            source,
        }
    }

    /// Returns the resolved key.
    pub fn key(&self) -> &TenantKey {
        &self.key
    }

    /// Returns the registered tenant, if the key is registered.
    pub fn tenant(&self) -> Option<&Arc<Tenant>> {
        self.tenant.as_ref()
    }

    /// Returns the registered tenant or an undefined-tenant error.
    pub fn require(&self) -> TenancyResult<&Arc<Tenant>> {
        self.tenant
            .as_ref()
            .ok_or_else(|| TenancyError::UndefinedTenant {
                key: self.key.to_string(),
            })
    }

    /// Returns the strategy that produced the key.
    pub fn source(&self) -> TenantSource {
        self.source
    }

    /// Returns true if the key is registered.
    pub fn is_defined(&self) -> bool {
        self.tenant.is_some()
    }
}

/// Attaches a tenant to request extensions.
///
/// Only a previously attached [`CurrentTenant`] is replaced; all other
/// extensions are left untouched.
pub fn annotate(extensions: &mut Extensions, current: CurrentTenant) {
    if let Some(previous) = extensions.insert(current) {
        debug!(previous = %previous.key(), "Replaced attached tenant");
    }
}

/// Middleware that resolves and attaches the request's tenant.
///
/// Use with `axum::middleware::from_fn_with_state`. Resolution failures are
/// rendered as error responses and the rest of the pipeline is skipped.
pub async fn inject_tenant(
    State(tenancy): State<Tenancy>,
    request: Request,
    next: Next,
) -> Response {
    match tenancy.inject(request).await {
        Ok(request) => next.run(request).await,
        Err(err) => {
            debug!(error = %err, "Tenant injection failed");
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::TenantConfig;

    #[derive(Clone, Debug, PartialEq)]
    struct RequestId(u64);

    fn current(key: &str, env: Option<&str>) -> CurrentTenant {
        let key = TenantKey::new(key).unwrap();
        let tenant = env.map(|e| Arc::new(Tenant::new(key.clone(), TenantConfig::new(e))));
        CurrentTenant::new(key, tenant, TenantSource::Header)
    }

    #[test]
    fn test_annotate_preserves_other_extensions() {
        let mut extensions = Extensions::new();
        extensions.insert(RequestId(7));

        annotate(&mut extensions, current("acme", Some("prod")));

        assert_eq!(extensions.get::<RequestId>(), Some(&RequestId(7)));
        assert_eq!(
            extensions.get::<CurrentTenant>().unwrap().key().as_str(),
            "acme"
        );
    }

    #[test]
    fn test_annotate_replaces_previous_tenant() {
        let mut extensions = Extensions::new();
        annotate(&mut extensions, current("acme", Some("prod")));
        annotate(&mut extensions, current("beta", Some("staging")));

        let attached = extensions.get::<CurrentTenant>().unwrap();
        assert_eq!(attached.key().as_str(), "beta");
        assert_eq!(attached.require().unwrap().environment(), "staging");
    }

    #[test]
    fn test_require_undefined() {
        let attached = current("ghost", None);
        assert!(!attached.is_defined());
        let err = attached.require().unwrap_err();
        assert!(matches!(err, TenancyError::UndefinedTenant { key } if key == "ghost"));
    }
}

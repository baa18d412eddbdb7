//! Composite per-tenant router.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    Router,
    extract::Request,
    response::{IntoResponse, Response},
};
use tower::{Service, ServiceExt};
use tracing::debug;

use crate::error::{TenancyError, TenancyResult};
use crate::middleware::inject::CurrentTenant;
use crate::middleware::rewrite::{self, build_uri_with_new_path};
use crate::tenant::{TenantConfig, TenantKey, TenantRegistry};

type BoxFuture = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

/// A composite router mounting one handler chain per tenant.
///
/// Built by [`MiddlewareTable::register`](super::MiddlewareTable::register).
/// Clones share the same underlying router; use [`ptr_eq`](Self::ptr_eq) to
/// check identity.
///
/// Requests must carry a [`CurrentTenant`] (see
/// [`inject_tenant`](crate::middleware::inject_tenant)).
///
/// # Example
///
/// ```rust,ignore
/// let orders = table.register("orders", |config| {
///     Router::new().route(&format!("/{}/orders", config.environment()), get(list_orders))
/// });
///
/// let app = Router::new()
///     .nest_service("/api", orders)
///     .layer(axum::middleware::from_fn_with_state(tenancy, inject_tenant));
/// ```
#[derive(Clone)]
pub struct TenantRouter {
    inner: Arc<Inner>,
}

struct Inner {
    router: Router,
    mounts: Vec<TenantKey>,
}

impl TenantRouter {
    /// Builds the composite router.
    ///
    /// `factory` is called exactly once per tenant, in registry order.
    /// Requests no tenant chain handles are restored and passed to `next`.
    pub(crate) fn build<F>(registry: &TenantRegistry, mut factory: F, next: Router) -> Self
    where
        F: FnMut(&TenantConfig) -> Router,
    {
        let mut router = Router::new();
        let mut mounts = Vec::with_capacity(registry.len());

        for tenant in registry.iter() {
            let chain = factory(tenant.config());
            router = router.nest(&tenant.key().mount_path(), chain);
            mounts.push(tenant.key().clone());
        }

        let router = router.fallback(move |mut request: Request| {
            let next = next.clone();
            async move {
                rewrite::exit(&mut request);
                next.oneshot(request).await.into_response()
            }
        });

        Self {
            inner: Arc::new(Inner { router, mounts }),
        }
    }

    /// Returns the tenant keys with a mounted chain, in mount order.
    pub fn mounts(&self) -> &[TenantKey] {
        &self.inner.mounts
    }

    /// Returns true if both routers are the same registration.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Wraps this router as the fallback of a plain Axum [`Router`].
    pub fn into_router(self) -> Router {
        Router::new().fallback_service(self)
    }
}

/// Addresses the rewritten request to the chain mounted for its tenant.
fn dispatch(request: &mut Request) -> TenancyResult<()> {
    let key = request
        .extensions()
        .get::<CurrentTenant>()
        .map(|current| current.key().clone())
        .ok_or(TenancyError::OrderingViolation { step: "dispatch" })?;

    let path = format!("{}{}", key.mount_path(), request.uri().path());
    debug!(tenant = %key, path = %path, "Dispatching to tenant chain");

    let uri = build_uri_with_new_path(request.uri(), &path)?;
    *request.uri_mut() = uri;
    Ok(())
}

impl Service<Request> for TenantRouter {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let router = self.inner.router.clone();

        Box::pin(async move {
            if let Err(err) = rewrite::enter(&mut request).and_then(|()| dispatch(&mut request)) {
                return Ok(err.into_response());
            }
            router.oneshot(request).await
        })
    }
}

impl fmt::Debug for TenantRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantRouter")
            .field("mounts", &self.inner.mounts)
            .finish_non_exhaustive()
    }
}

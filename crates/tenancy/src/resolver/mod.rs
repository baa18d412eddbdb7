//! Tenant resolution strategies.
//!
//! A [`TenantParser`] inspects the head of an incoming request and produces
//! the tenant key it names, or `None` to let the configured default apply.
//! Parsing is asynchronous so strategies can consult external services; it
//! is the only point at which injection suspends.
//!
//! Built-in strategies:
//!
//! - [`HeaderTenantParser`] - key from a request header (`X-Tenant-ID`)
//! - [`HostTenantParser`] - key from the first label of the `Host` header
//! - [`DefaultTenantParser`] - never yields a key (single-tenant setups)
//! - [`FnTenantParser`] - wraps an async closure, see [`parser_fn`]

mod parsers;

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::error::BoxError;
use crate::tenant::{TenantKey, TenantSource};

pub use parsers::{
    DefaultTenantParser, FnTenantParser, HeaderTenantParser, HostTenantParser, X_TENANT_ID,
    parser_fn,
};

/// Injected strategy that extracts a tenant key from a request.
#[async_trait]
pub trait TenantParser: Send + Sync {
    /// Extracts a tenant key from the request head.
    ///
    /// Returns `Ok(None)` when the request does not name a tenant. An error
    /// fails the request.
    async fn parse(&self, parts: &Parts) -> Result<Option<TenantKey>, BoxError>;

    /// Returns the source reported for keys produced by this parser.
    fn source(&self) -> TenantSource {
        TenantSource::Custom
    }
}

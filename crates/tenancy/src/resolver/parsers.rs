//! Built-in resolution strategies.

use std::future::Future;
use std::net::IpAddr;

use async_trait::async_trait;
use axum::http::{HeaderName, header::HOST, request::Parts};

use super::TenantParser;
use crate::error::{BoxError, TenancyError};
use crate::tenant::{TenantKey, TenantSource};

/// Header name for tenant identification.
pub static X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

/// Reads the tenant key from a request header.
///
/// A missing or empty header yields `None`. A header that is present but not
/// a valid tenant key fails resolution rather than silently using the
/// default tenant.
#[derive(Debug, Clone)]
pub struct HeaderTenantParser {
    header: HeaderName,
}

impl HeaderTenantParser {
    /// Creates a parser reading the given header.
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Returns the header this parser reads.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Default for HeaderTenantParser {
    fn default() -> Self {
        Self::new(X_TENANT_ID.clone())
    }
}

#[async_trait]
impl TenantParser for HeaderTenantParser {
    async fn parse(&self, parts: &Parts) -> Result<Option<TenantKey>, BoxError> {
        let Some(value) = parts.headers.get(&self.header) else {
            return Ok(None);
        };

        let value = value
            .to_str()
            .map_err(|_| TenancyError::InvalidTenantKey {
                key: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })?
            .trim();
        if value.is_empty() {
            return Ok(None);
        }

        Ok(Some(TenantKey::new(value)?))
    }

    fn source(&self) -> TenantSource {
        TenantSource::Header
    }
}

/// Reads the tenant key from the first label of the `Host` header.
///
/// `acme.example.com` resolves to `acme`. Hosts with fewer than `min_labels`
/// labels (such as the bare `example.com`) and IP addresses yield `None`.
#[derive(Debug, Clone)]
pub struct HostTenantParser {
    min_labels: usize,
}

impl HostTenantParser {
    /// Creates a parser requiring at least `min_labels` host labels.
    pub fn new(min_labels: usize) -> Self {
        Self { min_labels }
    }
}

impl Default for HostTenantParser {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl TenantParser for HostTenantParser {
    async fn parse(&self, parts: &Parts) -> Result<Option<TenantKey>, BoxError> {
        let host = match parts.headers.get(HOST) {
            Some(value) => value.to_str()?,
            None => match parts.uri.host() {
                Some(host) => host,
                None => return Ok(None),
            },
        };

        // IPv6 literal
        if host.starts_with('[') {
            return Ok(None);
        }

        // Strip the port
        let host = host.split(':').next().unwrap_or(host);
        if host.parse::<IpAddr>().is_ok() {
            return Ok(None);
        }

        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() < self.min_labels {
            return Ok(None);
        }

        Ok(Some(TenantKey::new(labels[0])?))
    }

    fn source(&self) -> TenantSource {
        TenantSource::Host
    }
}

/// Never yields a key, so every request resolves to the default tenant.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTenantParser;

#[async_trait]
impl TenantParser for DefaultTenantParser {
    async fn parse(&self, _parts: &Parts) -> Result<Option<TenantKey>, BoxError> {
        Ok(None)
    }

    fn source(&self) -> TenantSource {
        TenantSource::Default
    }
}

/// Adapts an async function into a [`TenantParser`].
///
/// The function receives an owned copy of the request head so the returned
/// future does not borrow from the request.
#[derive(Clone)]
pub struct FnTenantParser<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnTenantParser<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTenantParser").finish_non_exhaustive()
    }
}

/// Builds a parser from an async function.
///
/// # Example
///
/// ```rust
/// use helios_tenancy::error::BoxError;
/// use helios_tenancy::resolver::parser_fn;
/// use helios_tenancy::tenant::TenantKey;
///
/// let parser = parser_fn(|parts| async move {
///     let key = parts
///         .uri
///         .query()
///         .and_then(|q| q.strip_prefix("tenant="))
///         .map(TenantKey::new)
///         .transpose()?;
///     Ok::<_, BoxError>(key)
/// });
/// ```
pub fn parser_fn<F, Fut>(f: F) -> FnTenantParser<F>
where
    F: Fn(Parts) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<TenantKey>, BoxError>> + Send,
{
    FnTenantParser { f }
}

#[async_trait]
impl<F, Fut> TenantParser for FnTenantParser<F>
where
    F: Fn(Parts) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<TenantKey>, BoxError>> + Send,
{
    async fn parse(&self, parts: &Parts) -> Result<Option<TenantKey>, BoxError> {
        (self.f)(clone_parts(parts)).await
    }
}

/// Copies the request head.
///
/// `Parts` is not `Clone` because extensions are type-erased; they are left
/// empty in the copy.
fn clone_parts(parts: &Parts) -> Parts {
    let (mut copy, ()) = axum::http::Request::new(()).into_parts();
    copy.method = parts.method.clone();
    copy.uri = parts.uri.clone();
    copy.version = parts.version;
    copy.headers = parts.headers.clone();
    copy
}

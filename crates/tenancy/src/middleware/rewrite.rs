//! Reversible environment prefix rewriting.
//!
//! A request's URI moves through two states:
//!
//! - **original**: the path as received by the tenant router
//! - **rewritten**: `/{environment}{path}`, where `environment` comes from the
//!   attached tenant's configuration
//!
//! [`enter`] performs original → rewritten and records the pre-rewrite URI in
//! a [`PreRewriteUri`] extension. [`exit`] restores it. Running both leaves
//! the URI exactly as it was, query string included.
//!
//! [`rewrite_entry`] and [`rewrite_exit`] expose the two transitions as
//! standalone Axum middleware.

use axum::{
    extract::{OriginalUri, Request},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::error::{TenancyError, TenancyResult};
use crate::middleware::inject::CurrentTenant;

/// Extension holding the URI a request had before the entry rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreRewriteUri(pub Uri);

/// Rewrites the request path to `/{environment}{path}`.
///
/// Requires a tenant to have been attached by the injection step.
///
/// # Errors
///
/// - [`TenancyError::OrderingViolation`] if no tenant is attached
/// - [`TenancyError::UndefinedTenant`] if the attached tenant is not registered
pub fn enter(request: &mut Request) -> TenancyResult<()> {
    let current = request.extensions().get::<CurrentTenant>().ok_or_else(|| {
        error!(path = %request.uri().path(), "Rewrite ran before tenant injection");
        TenancyError::OrderingViolation {
            step: "entry rewrite",
        }
    })?;
    let environment = current.require()?.environment().to_string();

    let original = request.uri().clone();
    let path = environment_path(&environment, original.path());
    let rewritten = build_uri_with_new_path(&original, &path)?;

    debug!(from = %original.path(), to = %rewritten.path(), "Entry rewrite");

    let extensions = request.extensions_mut();
    if extensions.get::<OriginalUri>().is_none() {
        extensions.insert(OriginalUri(original.clone()));
    }
    extensions.insert(PreRewriteUri(original));
    *request.uri_mut() = rewritten;

    Ok(())
}

/// Restores the URI recorded by [`enter`].
///
/// Does nothing if the request was never rewritten.
pub fn exit(request: &mut Request) {
    if let Some(PreRewriteUri(original)) = request.extensions_mut().remove::<PreRewriteUri>() {
        debug!(from = %request.uri().path(), to = %original.path(), "Exit rewrite");
        *request.uri_mut() = original;
    }
}

/// Middleware form of [`enter`].
///
/// Failures are rendered as error responses.
pub async fn rewrite_entry(mut request: Request, next: Next) -> Response {
    match enter(&mut request) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

/// Middleware form of [`exit`].
pub async fn rewrite_exit(mut request: Request, next: Next) -> Response {
    exit(&mut request);
    next.run(request).await
}

/// Prefixes `path` with an environment segment.
///
/// An empty path becomes `/{environment}`.
pub fn environment_path(environment: &str, path: &str) -> String {
    if path.is_empty() || path.starts_with('/') {
        format!("/{}{}", environment, path)
    } else {
        format!("/{}/{}", environment, path)
    }
}

/// Builds a new URI with a different path but the same query.
pub fn build_uri_with_new_path(original: &Uri, new_path: &str) -> TenancyResult<Uri> {
    let mut parts = original.clone().into_parts();

    let path_and_query = match original.query() {
        Some(query) => format!("{}?{}", new_path, query),
        None => new_path.to_string(),
    };

    parts.path_and_query = Some(
        path_and_query
            .parse()
            .map_err(|e| TenancyError::InvalidUri(format!("{}: {}", path_and_query, e)))?,
    );

    Uri::from_parts(parts).map_err(|e| TenancyError::InvalidUri(e.to_string()))
}

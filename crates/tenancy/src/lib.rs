//! # helios-tenancy - Tenant Resolution and Per-Tenant Routing
//!
//! This crate resolves the tenant of every incoming request and routes it
//! through a handler chain built specifically for that tenant. It is
//! designed for Axum applications that serve several tenants from one
//! process, each with its own configuration and deployment environment.
//!
//! ## Features
//!
//! - **Pluggable Resolution**: Tenant keys come from a header, the `Host`
//!   header, a custom async function or a fixed default
//! - **Read-Only Registry**: Tenants are registered once at startup and looked
//!   up lock-free at request time
//! - **Per-Tenant Chains**: A factory builds one [`Router`](axum::Router) per
//!   tenant from its configuration
//! - **Environment Rewriting**: Chains see `/{environment}{path}`; the original
//!   URI is restored when a request falls through
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use axum::{Router, middleware::from_fn_with_state, routing::get};
//! use helios_tenancy::{MiddlewareTable, Tenancy, TenancyConfig, inject_tenant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TenancyConfig::from_env();
//!     helios_tenancy::init_logging(&config.log_level);
//!
//!     let tenancy = Tenancy::from_config(&config)?;
//!
//!     let mut table = MiddlewareTable::new(tenancy.clone());
//!     let api = table.register("api".to_string(), |tenant| {
//!         Router::new().route(
//!             &format!("/{}/orders", tenant.environment()),
//!             get(|| async { "orders" }),
//!         )
//!     });
//!
//!     let app = Router::new()
//!         .fallback_service(api)
//!         .layer(from_fn_with_state(tenancy, inject_tenant));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request Flow
//!
//! | Step | Component | Effect |
//! |------|-----------|--------|
//! | inject | [`inject_tenant`] | attaches [`CurrentTenant`](middleware::CurrentTenant) |
//! | entry rewrite | [`TenantRouter`] | path becomes `/{environment}{path}` |
//! | dispatch | [`TenantRouter`] | runs the chain built for the tenant |
//! | exit rewrite | [`TenantRouter`] | restores the original URI on fall-through |
//!
//! ## Error Handling
//!
//! Request-time failures are [`TenancyError`] values rendered as JSON
//! responses. See [`error`] for the status code mapping.

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod resolver;
pub mod routing;
pub mod state;
pub mod tenant;

// Re-export commonly used types
pub use config::TenancyConfig;
pub use error::{TenancyError, TenancyResult};
pub use middleware::inject_tenant;
pub use routing::{MiddlewareTable, TableEntry, TenantRouter};
pub use state::Tenancy;

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// helios_tenancy::init_logging("debug");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_tenancy={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

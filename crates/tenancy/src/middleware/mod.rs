//! HTTP middleware for tenant-aware pipelines.
//!
//! This module contains Axum middleware components:
//!
//! - [`inject`] - Tenant resolution and request annotation
//! - [`rewrite`] - Reversible environment prefix rewriting

pub mod inject;
pub mod rewrite;

pub use inject::{CurrentTenant, annotate, inject_tenant};
pub use rewrite::{PreRewriteUri, rewrite_entry, rewrite_exit};

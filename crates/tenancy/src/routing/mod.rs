//! Per-tenant routing.
//!
//! - [`TenantRouter`] - composite service dispatching to per-tenant chains
//! - [`MiddlewareTable`] - named registry of composite and internal routers
//!
//! # Dispatch
//!
//! For every registered tenant, the chain built by the factory is mounted
//! under `/{key}`. A request flows through:
//!
//! 1. entry rewrite: working path becomes `/{environment}{path}`
//! 2. dispatch to the chain mounted under the attached tenant's key; the
//!    chain sees the working path
//! 3. if the chain has no matching route, exit rewrite restores the original
//!    URI and the request continues to the fall-through router
//!
//! Dispatch is by tenant **key**, rewriting is by tenant **environment**.
//! Two tenants sharing an environment still reach their own chains.

mod table;
mod tenant_router;

pub use table::{MiddlewareTable, TableEntry};
pub use tenant_router::TenantRouter;

//! Tenant identity and the read-only tenant registry.
//!
//! - [`TenantKey`] - validated tenant identifier, also used as routing prefix
//! - [`Tenant`] / [`TenantConfig`] - immutable tenant record
//! - [`TenantRegistry`] - fixed key to tenant mapping, built once at startup
//! - [`TenantSource`] - which strategy produced a request's tenant key
//!
//! # Registry Format
//!
//! Registries can be loaded from JSON. The document is an array so that
//! registration order is explicit:
//!
//! ```json
//! [
//!   { "key": "acme", "config": { "environment": "prod" } },
//!   { "key": "beta", "config": { "environment": "staging", "region": "eu" },
//!     "metadata": { "plan": "trial" } }
//! ]
//! ```

mod key;
mod model;
mod registry;
mod source;

pub use key::{TenantKey, is_valid_segment};
pub use model::{Tenant, TenantConfig};
pub use registry::TenantRegistry;
pub use source::TenantSource;

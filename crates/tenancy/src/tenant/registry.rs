//! The tenant registry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::key::{TenantKey, is_valid_segment};
use super::model::Tenant;
use crate::error::{RegistryError, RegistryResult};

/// Fixed mapping from tenant key to tenant.
///
/// The registry is built once during startup and is read-only afterwards:
/// there is no API to add or remove tenants. Iteration follows registration
/// order, which is also the order tenant chains are mounted in.
///
/// # Example
///
/// ```
/// use helios_tenancy::tenant::{Tenant, TenantConfig, TenantKey, TenantRegistry};
///
/// let registry = TenantRegistry::new([
///     Tenant::new(TenantKey::new("acme").unwrap(), TenantConfig::new("prod")),
///     Tenant::new(TenantKey::new("beta").unwrap(), TenantConfig::new("staging")),
/// ])
/// .unwrap();
///
/// assert_eq!(registry.get("beta").unwrap().environment(), "staging");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TenantRegistry {
    tenants: Vec<Arc<Tenant>>,
    index: HashMap<TenantKey, usize>,
}

impl TenantRegistry {
    /// Builds a registry from tenants in registration order.
    ///
    /// Fails on duplicate keys and on environments that are not usable as a
    /// single path segment.
    pub fn new(tenants: impl IntoIterator<Item = Tenant>) -> RegistryResult<Self> {
        let mut registry = Self::default();

        for tenant in tenants {
            let environment = tenant.environment();
            if !is_valid_segment(environment) {
                return Err(RegistryError::InvalidEnvironment {
                    key: tenant.key().to_string(),
                    environment: environment.to_string(),
                });
            }

            if registry.index.contains_key(tenant.key()) {
                return Err(RegistryError::DuplicateKey {
                    key: tenant.key().to_string(),
                });
            }

            registry
                .index
                .insert(tenant.key().clone(), registry.tenants.len());
            registry.tenants.push(Arc::new(tenant));
        }

        debug!(tenants = registry.len(), "Built tenant registry");
        Ok(registry)
    }

    /// Parses a registry from a JSON array of tenants.
    pub fn from_json_str(json: &str) -> RegistryResult<Self> {
        let tenants: Vec<Tenant> = serde_json::from_str(json)?;
        Self::new(tenants)
    }

    /// Loads a registry from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading tenant registry");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Looks up a tenant by key.
    pub fn get(&self, key: &str) -> Option<&Arc<Tenant>> {
        self.index.get(key).map(|&i| &self.tenants[i])
    }

    /// Returns true if a tenant with this key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterates over tenants in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tenant>> {
        self.tenants.iter()
    }

    /// Iterates over tenant keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &TenantKey> {
        self.tenants.iter().map(|t| t.key())
    }

    /// Returns the number of registered tenants.
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    /// Returns true if no tenants are registered.
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

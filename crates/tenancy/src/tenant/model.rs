//! Tenant records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::key::TenantKey;

/// Per-tenant configuration.
///
/// Every tenant has an `environment`, which becomes the leading segment of
/// the working path seen by that tenant's handler chain. Any other fields are
/// kept verbatim in [`settings`](Self::settings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Environment segment used by the entry rewrite.
    pub environment: String,

    /// Remaining configuration fields.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl TenantConfig {
    /// Creates a configuration with only an environment.
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            settings: Map::new(),
        }
    }

    /// Adds a setting, returning the updated configuration.
    pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(name.into(), value.into());
        self
    }

    /// Returns the environment segment.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Reads a configuration field by name.
    ///
    /// `environment` is readable through this accessor as well.
    pub fn get(&self, field: &str) -> Option<Value> {
        if field == "environment" {
            return Some(Value::String(self.environment.clone()));
        }
        self.settings.get(field).cloned()
    }
}

/// A registered tenant.
///
/// Tenants are immutable once the registry is built and are shared with
/// requests as `Arc<Tenant>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    key: TenantKey,
    config: TenantConfig,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl Tenant {
    /// Creates a tenant with empty metadata.
    pub fn new(key: TenantKey, config: TenantConfig) -> Self {
        Self {
            key,
            config,
            metadata: Map::new(),
        }
    }

    /// Attaches metadata to the tenant.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the tenant key.
    pub fn key(&self) -> &TenantKey {
        &self.key
    }

    /// Returns the tenant configuration.
    pub fn config(&self) -> &TenantConfig {
        &self.config
    }

    /// Returns the tenant's environment segment.
    pub fn environment(&self) -> &str {
        self.config.environment()
    }

    /// Returns the tenant metadata.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_get() {
        let config = TenantConfig::new("prod").with_setting("region", "eu-west-1");

        assert_eq!(config.get("environment"), Some(json!("prod")));
        assert_eq!(config.get("region"), Some(json!("eu-west-1")));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn test_tenant_deserialize() {
        let tenant: Tenant = serde_json::from_value(json!({
            "key": "beta",
            "config": { "environment": "staging", "maxUsers": 5 },
            "metadata": { "plan": "trial" }
        }))
        .unwrap();

        assert_eq!(tenant.key().as_str(), "beta");
        assert_eq!(tenant.environment(), "staging");
        assert_eq!(tenant.config().get("maxUsers"), Some(json!(5)));
        assert_eq!(tenant.metadata()["plan"], "trial");
    }

    #[test]
    fn test_tenant_requires_environment() {
        let result = serde_json::from_value::<Tenant>(json!({
            "key": "beta",
            "config": { "region": "eu" }
        }));
        assert!(result.is_err());
    }
}

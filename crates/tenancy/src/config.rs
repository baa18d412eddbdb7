//! Tenancy configuration.
//!
//! Supports programmatic construction, command line arguments and
//! environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TENANCY_DEFAULT_TENANT` | default | Key used when resolution yields none |
//! | `TENANCY_TENANT_HEADER` | x-tenant-id | Header read by the header parser |
//! | `TENANCY_UNKNOWN_TENANT` | reject | Policy for unregistered keys |
//! | `TENANCY_REGISTRY_FILE` | (unset) | JSON tenant registry |
//! | `TENANCY_LOG_LEVEL` | info | Log level |
//!
//! # Example
//!
//! ```rust
//! use helios_tenancy::config::{TenancyConfig, UnknownTenantPolicy};
//!
//! let config = TenancyConfig {
//!     default_tenant: "acme".to_string(),
//!     unknown_tenant: UnknownTenantPolicy::Fallback,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::path::PathBuf;

use axum::http::HeaderName;
use clap::{Parser, ValueEnum};

use crate::error::RegistryResult;
use crate::tenant::{TenantRegistry, is_valid_segment};

/// What to do when a resolved tenant key is not in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnknownTenantPolicy {
    /// Fail the request with a not-found error during injection.
    #[default]
    Reject,
    /// Use the default tenant instead. Rejects if the default is also unknown.
    Fallback,
    /// Attach an undefined tenant and let later steps fail when they need it.
    Attach,
}

impl fmt::Display for UnknownTenantPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownTenantPolicy::Reject => write!(f, "reject"),
            UnknownTenantPolicy::Fallback => write!(f, "fallback"),
            UnknownTenantPolicy::Attach => write!(f, "attach"),
        }
    }
}

/// Configuration for tenant resolution.
#[derive(Debug, Clone, Parser)]
#[command(name = "tenancy")]
#[command(about = "Tenant resolution and routing")]
pub struct TenancyConfig {
    /// Tenant key used when the resolution strategy yields none.
    #[arg(long, env = "TENANCY_DEFAULT_TENANT", default_value = "default")]
    pub default_tenant: String,

    /// Header carrying the tenant key.
    #[arg(long, env = "TENANCY_TENANT_HEADER", default_value = "x-tenant-id")]
    pub tenant_header: String,

    /// Policy for keys that are not in the registry.
    #[arg(long, env = "TENANCY_UNKNOWN_TENANT", value_enum, default_value_t = UnknownTenantPolicy::Reject)]
    pub unknown_tenant: UnknownTenantPolicy,

    /// Path to a JSON tenant registry.
    #[arg(long, env = "TENANCY_REGISTRY_FILE")]
    pub registry_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "TENANCY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            default_tenant: "default".to_string(),
            tenant_header: "x-tenant-id".to_string(),
            unknown_tenant: UnknownTenantPolicy::Reject,
            registry_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl TenancyConfig {
    /// Creates a configuration from environment variables.
    ///
    /// Falls back to defaults when parsing fails.
    pub fn from_env() -> Self {
        Self::try_parse_from(["tenancy"]).unwrap_or_default()
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !is_valid_segment(&self.default_tenant) {
            errors.push(format!(
                "Default tenant {:?} is not a valid tenant key",
                self.default_tenant
            ));
        }

        if HeaderName::try_from(self.tenant_header.as_str()).is_err() {
            errors.push(format!(
                "Tenant header {:?} is not a valid header name",
                self.tenant_header
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Loads the registry named by `registry_file`.
    ///
    /// Returns an empty registry when no file is configured.
    pub fn load_registry(&self) -> RegistryResult<TenantRegistry> {
        match &self.registry_file {
            Some(path) => TenantRegistry::from_file(path),
            None => TenantRegistry::new(Vec::new()),
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            default_tenant: "test-tenant".to_string(),
            log_level: "debug".to_string(),
            ..Default::default()
        }
    }
}

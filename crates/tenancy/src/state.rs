//! Shared tenancy state.
//!
//! [`Tenancy`] bundles everything the injection step needs: the tenant
//! registry, the resolution strategy, the default tenant key and the policy
//! for unknown tenants. It is cheap to clone and is used as Axum middleware
//! state.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::HeaderName;
use tracing::{debug, warn};

use crate::config::{TenancyConfig, UnknownTenantPolicy};
use crate::error::{RegistryError, RegistryResult, TenancyError, TenancyResult};
use crate::middleware::inject::{CurrentTenant, annotate};
use crate::resolver::{HeaderTenantParser, TenantParser};
use crate::tenant::{TenantKey, TenantRegistry, TenantSource};

/// Shared tenant resolution state.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use helios_tenancy::Tenancy;
/// use helios_tenancy::config::TenancyConfig;
/// use helios_tenancy::resolver::HeaderTenantParser;
/// use helios_tenancy::tenant::TenantRegistry;
///
/// let registry = TenantRegistry::from_json_str(
///     r#"[{ "key": "acme", "config": { "environment": "prod" } }]"#,
/// )
/// .unwrap();
///
/// let config = TenancyConfig {
///     default_tenant: "acme".to_string(),
///     ..Default::default()
/// };
///
/// let tenancy =
///     Tenancy::new(registry, Arc::new(HeaderTenantParser::default()), &config).unwrap();
/// assert_eq!(tenancy.default_tenant(), "acme");
/// ```
#[derive(Clone)]
pub struct Tenancy {
    registry: Arc<TenantRegistry>,
    parser: Arc<dyn TenantParser>,
    default_tenant: TenantKey,
    policy: UnknownTenantPolicy,
}

impl std::fmt::Debug for Tenancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tenancy")
            .field("tenants", &self.registry.len())
            .field("default_tenant", &self.default_tenant)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Tenancy {
    /// Creates tenancy state with an explicit resolution strategy.
    ///
    /// The default tenant must be a valid key but need not be registered.
    /// When it is missing from the registry a warning is logged and requests
    /// that fall back to it follow the unknown-tenant policy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDefaultTenant`] if the configured
    /// default is not a valid tenant key.
    pub fn new(
        registry: TenantRegistry,
        parser: Arc<dyn TenantParser>,
        config: &TenancyConfig,
    ) -> RegistryResult<Self> {
        let default_tenant = TenantKey::new(config.default_tenant.as_str()).map_err(|_| {
            RegistryError::InvalidDefaultTenant {
                key: config.default_tenant.clone(),
            }
        })?;

        if !registry.contains(default_tenant.as_str()) {
            warn!(
                default_tenant = %default_tenant,
                "Default tenant is not in the tenant registry"
            );
        }

        Ok(Self {
            registry: Arc::new(registry),
            parser,
            default_tenant,
            policy: config.unknown_tenant,
        })
    }

    /// Creates tenancy state from configuration alone.
    ///
    /// Loads the registry from `registry_file` and resolves tenants from the
    /// configured header.
    pub fn from_config(config: &TenancyConfig) -> RegistryResult<Self> {
        let registry = config.load_registry()?;
        let header = HeaderName::try_from(config.tenant_header.as_str())?;
        let parser = Arc::new(HeaderTenantParser::new(header));
        Self::new(registry, parser, config)
    }

    /// Returns the tenant registry.
    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Returns the default tenant key.
    pub fn default_tenant(&self) -> &str {
        self.default_tenant.as_str()
    }

    /// Returns the unknown-tenant policy.
    pub fn policy(&self) -> UnknownTenantPolicy {
        self.policy
    }

    /// Resolves the request's tenant and attaches it.
    ///
    /// Runs the resolution strategy (the only suspension point), substitutes
    /// the default key when it yields none, looks the key up and attaches a
    /// [`CurrentTenant`] to the request extensions.
    ///
    /// # Errors
    ///
    /// - [`TenancyError::Resolution`] if the strategy fails
    /// - [`TenancyError::InvalidTenantKey`] if the strategy produced a malformed key
    /// - [`TenancyError::TenantNotFound`] if the key is unknown and the policy rejects it
    pub async fn inject(&self, request: Request) -> TenancyResult<Request> {
        let (mut parts, body) = request.into_parts();

        let parsed = self.parser.parse(&parts).await.map_err(|e| {
            // Keep malformed keys distinguishable from strategy failures
            match e.downcast::<TenancyError>() {
                Ok(err) => *err,
                Err(e) => TenancyError::Resolution(e),
            }
        })?;

        let current = self.bind(parsed)?;
        debug!(
            tenant = %current.key(),
            source = %current.source(),
            defined = current.is_defined(),
            "Resolved tenant"
        );

        annotate(&mut parts.extensions, current);
        Ok(Request::from_parts(parts, body))
    }

    /// Binds a parsed key (or the default) to a registered tenant.
    pub(crate) fn bind(&self, parsed: Option<TenantKey>) -> TenancyResult<CurrentTenant> {
        let defaulted = parsed.is_none();
        let (key, source) = match parsed {
            Some(key) => (key, self.parser.source()),
            None => (self.default_tenant.clone(), TenantSource::Default),
        };

        if let Some(tenant) = self.registry.get(key.as_str()) {
            return Ok(CurrentTenant::new(key, Some(Arc::clone(tenant)), source));
        }

        warn!(tenant = %key, policy = %self.policy, "Resolved tenant is not registered");

        match self.policy {
            UnknownTenantPolicy::Reject => Err(TenancyError::TenantNotFound {
                key: key.to_string(),
            }),
            UnknownTenantPolicy::Fallback if !defaulted => {
                match self.registry.get(self.default_tenant.as_str()) {
                    Some(tenant) => Ok(CurrentTenant::new(
                        self.default_tenant.clone(),
                        Some(Arc::clone(tenant)),
                        TenantSource::Default,
                    )),
                    None => Err(TenancyError::TenantNotFound {
                        key: self.default_tenant.to_string(),
                    }),
                }
            }
            UnknownTenantPolicy::Fallback => Err(TenancyError::TenantNotFound {
                key: key.to_string(),
            }),
            UnknownTenantPolicy::Attach => Ok(CurrentTenant::new(key, None, source)),
        }
    }
}

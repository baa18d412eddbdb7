//! Tenant routing test harness.

use std::sync::Arc;

use axum::{Router, extract::Request, middleware::from_fn_with_state, routing::get};
use axum_test::TestServer;

use helios_tenancy::config::{TenancyConfig, UnknownTenantPolicy};
use helios_tenancy::extractors::RequireTenant;
use helios_tenancy::middleware::CurrentTenant;
use helios_tenancy::resolver::{HeaderTenantParser, TenantParser};
use helios_tenancy::tenant::{Tenant, TenantConfig, TenantKey, TenantRegistry};
use helios_tenancy::{MiddlewareTable, Tenancy, TenantRouter, inject_tenant};

/// Registry used by most tests: two tenants in different environments.
pub fn acme_beta_registry() -> TenantRegistry {
    TenantRegistry::new([
        Tenant::new(
            TenantKey::new("acme").unwrap(),
            TenantConfig::new("prod").with_setting("region", "us"),
        ),
        Tenant::new(
            TenantKey::new("beta").unwrap(),
            TenantConfig::new("staging").with_setting("region", "eu"),
        ),
    ])
    .unwrap()
}

/// Builds tenancy state with the given default and policy.
pub fn tenancy(
    registry: TenantRegistry,
    parser: Arc<dyn TenantParser>,
    default_tenant: &str,
    policy: UnknownTenantPolicy,
) -> Tenancy {
    let config = TenancyConfig {
        default_tenant: default_tenant.to_string(),
        unknown_tenant: policy,
        ..TenancyConfig::for_testing()
    };
    Tenancy::new(registry, parser, &config).expect("Failed to build tenancy")
}

/// Header-resolved tenancy over [`acme_beta_registry`] defaulting to `acme`.
pub fn header_tenancy(policy: UnknownTenantPolicy) -> Tenancy {
    tenancy(
        acme_beta_registry(),
        Arc::new(HeaderTenantParser::default()),
        "acme",
        policy,
    )
}

/// Chain factory echoing what a tenant's handlers observe.
///
/// `GET /{env}/orders` answers `"{key}|{env}|{region}|{path}"`.
pub fn echo_chain(config: &TenantConfig) -> Router {
    let env = config.environment().to_string();
    Router::new().route(
        &format!("/{}/orders", env),
        get(
            |current: CurrentTenant, RequireTenant(tenant): RequireTenant, request: Request| async move {
                let region = tenant
                    .config()
                    .get("region")
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default();
                format!(
                    "{}|{}|{}|{}",
                    current.key(),
                    tenant.environment(),
                    region,
                    request.uri().path()
                )
            },
        ),
    )
}

/// Wraps a tenant router with tenant injection in a test server.
pub fn serve(tenancy: Tenancy, router: TenantRouter) -> TestServer {
    let app = Router::new()
        .fallback_service(router)
        .layer(from_fn_with_state(tenancy, inject_tenant));
    TestServer::new(app).expect("Failed to create test server")
}

/// Registers [`echo_chain`] with a fall-through router echoing the path and
/// query it receives, and serves it.
pub fn echo_server(tenancy: Tenancy) -> TestServer {
    let next = Router::new().fallback(|request: Request| async move {
        let path = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();
        format!("next:{}", path)
    });

    let mut table = MiddlewareTable::new(tenancy.clone());
    let router = table.register_with_fallthrough("api".to_string(), echo_chain, next);
    serve(tenancy, router)
}

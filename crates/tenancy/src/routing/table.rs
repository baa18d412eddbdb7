//! Named registry of composite and internal routers.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use axum::Router;
use tracing::{info, warn};

use super::tenant_router::TenantRouter;
use crate::state::Tenancy;
use crate::tenant::TenantConfig;

/// A router stored in a [`MiddlewareTable`].
#[derive(Debug, Clone)]
pub enum TableEntry {
    /// Composite router with one chain per tenant, wrapped in the entry and
    /// exit rewrites.
    Tenant(TenantRouter),
    /// Router stored as built, with no tenant mounts and no rewriting.
    /// Used for stages that run before a tenant is known, such as resolution
    /// helpers or health checks.
    Internal(Router),
}

impl TableEntry {
    /// Returns the composite router if this is a tenant entry.
    pub fn tenant_router(&self) -> Option<&TenantRouter> {
        match self {
            TableEntry::Tenant(router) => Some(router),
            TableEntry::Internal(_) => None,
        }
    }

    /// Returns true for entries registered through
    /// [`MiddlewareTable::register_internal`].
    pub fn is_internal(&self) -> bool {
        matches!(self, TableEntry::Internal(_))
    }

    /// Converts the entry into a plain Axum [`Router`].
    pub fn into_router(self) -> Router {
        match self {
            TableEntry::Tenant(router) => router.into_router(),
            TableEntry::Internal(router) => router,
        }
    }
}

/// Registry of tenant-aware and internal routers keyed by name.
///
/// Registration happens during startup through `&mut self`; at request time
/// the table is only read. The name type is chosen by the caller, so an enum
/// gives compile-time checked names:
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Stack { Api, Admin }
///
/// let mut table = MiddlewareTable::<Stack>::new(tenancy);
/// table.register(Stack::Api, |config| api_routes(config));
/// let api = table.lookup(&Stack::Api).cloned();
/// ```
#[derive(Debug)]
pub struct MiddlewareTable<N = String> {
    tenancy: Tenancy,
    routers: HashMap<N, TableEntry>,
}

impl<N> MiddlewareTable<N>
where
    N: Eq + Hash + Debug,
{
    /// Creates an empty table for the given tenancy state.
    pub fn new(tenancy: Tenancy) -> Self {
        Self {
            tenancy,
            routers: HashMap::new(),
        }
    }

    /// Builds and stores a composite router under `name`.
    ///
    /// The factory is called once per registered tenant with that tenant's
    /// configuration, and the resulting chain is mounted under `/{key}`.
    /// Requests no chain handles end with a 404 after the exit rewrite.
    /// Registering an existing name replaces the previous router.
    pub fn register<F>(&mut self, name: N, factory: F) -> TenantRouter
    where
        F: FnMut(&TenantConfig) -> Router,
    {
        self.register_with_fallthrough(name, factory, Router::new())
    }

    /// Like [`register`](Self::register), passing unhandled requests to `next`
    /// with their original URI restored.
    pub fn register_with_fallthrough<F>(&mut self, name: N, factory: F, next: Router) -> TenantRouter
    where
        F: FnMut(&TenantConfig) -> Router,
    {
        let router = TenantRouter::build(self.tenancy.registry(), factory, next);
        info!(
            name = ?name,
            tenants = router.mounts().len(),
            "Registered tenant router"
        );

        self.insert(name, TableEntry::Tenant(router.clone()));
        router
    }

    /// Stores a router that is not split per tenant.
    ///
    /// The factory runs once with the tenancy state. Its router is stored
    /// as returned: no tenant chains are mounted and requests are not
    /// rewritten.
    pub fn register_internal<F>(&mut self, name: N, factory: F) -> Router
    where
        F: FnOnce(&Tenancy) -> Router,
    {
        let router = factory(&self.tenancy);
        info!(name = ?name, "Registered internal router");

        self.insert(name, TableEntry::Internal(router.clone()));
        router
    }

    fn insert(&mut self, name: N, entry: TableEntry) {
        if let Some(previous) = self.routers.insert(name, entry) {
            warn!(
                internal = previous.is_internal(),
                "Replaced previously registered router"
            );
        }
    }

    /// Returns the entry previously registered under `name`.
    pub fn lookup<Q>(&self, name: &Q) -> Option<&TableEntry>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.routers.get(name)
    }

    /// Combined accessor: registers when a factory is given, otherwise looks
    /// up the existing router.
    pub fn middleware<F>(&mut self, name: N, factory: Option<F>) -> Option<TableEntry>
    where
        F: FnMut(&TenantConfig) -> Router,
    {
        match factory {
            Some(factory) => Some(TableEntry::Tenant(self.register(name, factory))),
            None => self.routers.get(&name).cloned(),
        }
    }

    /// Returns the tenancy state the routers were built from.
    pub fn tenancy(&self) -> &Tenancy {
        &self.tenancy
    }

    /// Iterates over registered names.
    pub fn names(&self) -> impl Iterator<Item = &N> {
        self.routers.keys()
    }

    /// Returns the number of registered routers.
    pub fn len(&self) -> usize {
        self.routers.len()
    }

    /// Returns true if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::TenancyConfig;
    use crate::resolver::DefaultTenantParser;
    use crate::tenant::{Tenant, TenantKey, TenantRegistry};
    use axum::{body::Body, extract::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn tenancy() -> Tenancy {
        let registry = TenantRegistry::new([
            Tenant::new(TenantKey::new("acme").unwrap(), TenantConfig::new("prod")),
            Tenant::new(TenantKey::new("beta").unwrap(), TenantConfig::new("staging")),
            Tenant::new(TenantKey::new("gamma").unwrap(), TenantConfig::new("prod")),
        ])
        .unwrap();
        Tenancy::new(
            registry,
            Arc::new(DefaultTenantParser),
            &TenancyConfig {
                default_tenant: "acme".to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn tenant_router<'a>(table: &'a MiddlewareTable, name: &str) -> &'a TenantRouter {
        table
            .lookup(name)
            .and_then(TableEntry::tenant_router)
            .unwrap()
    }

    fn routes(config: &TenantConfig) -> Router {
        Router::new().route(
            &format!("/{}/ping", config.environment()),
            get(|| async { "pong" }),
        )
    }

    #[test]
    fn test_factory_called_once_per_tenant() {
        let calls = AtomicUsize::new(0);
        let mut table = MiddlewareTable::new(tenancy());

        table.register("api".to_string(), |config| {
            calls.fetch_add(1, Ordering::SeqCst);
            routes(config)
        });

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_lookup_is_reference_stable() {
        let mut table = MiddlewareTable::new(tenancy());
        let registered = table.register("api".to_string(), routes);

        let first = tenant_router(&table, "api");
        assert!(TenantRouter::ptr_eq(&registered, first));

        let second = tenant_router(&table, "api");
        assert!(TenantRouter::ptr_eq(first, second));
    }

    #[test]
    fn test_lookup_unregistered() {
        let table: MiddlewareTable = MiddlewareTable::new(tenancy());
        assert!(table.lookup("api").is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut table = MiddlewareTable::new(tenancy());
        let first = table.register("api".to_string(), routes);
        let second = table.register("api".to_string(), routes);

        assert_eq!(table.len(), 1);
        assert!(!TenantRouter::ptr_eq(&first, &second));
        assert!(TenantRouter::ptr_eq(&second, tenant_router(&table, "api")));
    }

    #[test]
    fn test_middleware_getter_and_setter() {
        let mut table = MiddlewareTable::new(tenancy());

        assert!(
            table
                .middleware("api".to_string(), None::<fn(&TenantConfig) -> Router>)
                .is_none()
        );

        let built = table
            .middleware("api".to_string(), Some(routes))
            .unwrap();
        let fetched = table
            .middleware("api".to_string(), None::<fn(&TenantConfig) -> Router>)
            .unwrap();

        assert!(TenantRouter::ptr_eq(
            built.tenant_router().unwrap(),
            fetched.tenant_router().unwrap()
        ));
    }

    #[test]
    fn test_enum_names() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        enum Stack {
            Api,
            Admin,
        }

        let mut table = MiddlewareTable::<Stack>::new(tenancy());
        table.register(Stack::Api, routes);

        assert!(table.lookup(&Stack::Api).is_some());
        assert!(table.lookup(&Stack::Admin).is_none());
        assert_eq!(table.names().collect::<Vec<_>>(), vec![&Stack::Api]);
    }

    #[test]
    fn test_internal_factory_sees_tenancy() {
        let mut table = MiddlewareTable::new(tenancy());
        let mut default_tenant = None;

        table.register_internal("resolve".to_string(), |tenancy| {
            default_tenant = Some(tenancy.default_tenant().to_string());
            Router::new()
        });

        assert_eq!(default_tenant.as_deref(), Some("acme"));
        let entry = table.lookup("resolve").unwrap();
        assert!(entry.is_internal());
        assert!(entry.tenant_router().is_none());
    }

    #[tokio::test]
    async fn test_internal_router_is_not_rewritten() {
        let mut table = MiddlewareTable::new(tenancy());
        table.register_internal("health".to_string(), |_| {
            Router::new().route(
                "/health",
                get(|request: Request| async move { request.uri().path().to_string() }),
            )
        });

        // No tenant attached: internal routers run without injection
        let router = table.lookup("health").cloned().unwrap().into_router();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"/health");
    }

    #[test]
    fn test_internal_replaces_tenant_entry() {
        let mut table = MiddlewareTable::new(tenancy());
        table.register("api".to_string(), routes);
        table.register_internal("api".to_string(), |_| Router::new());

        assert_eq!(table.len(), 1);
        assert!(table.lookup("api").unwrap().is_internal());
    }
}

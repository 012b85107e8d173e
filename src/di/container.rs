use super::decorators::{component_extractor, component_for_key, injector_factory, scope_of};
use super::{Key, Scope, Token};
use crate::config::ContainerConfig;
use crate::error::{Result, TesseraError};
use crate::injector::{BoundFactory, Injectable};
use crate::reflect::{ClassRef, Value, downcast_value};
use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::any::Any;
use std::future::Future;
use std::sync::{Arc, LazyLock};

/// Producer registered with [`Container::set_resolver`].
pub type SyncResolver = Arc<dyn Fn(&Container) -> Result<Value> + Send + Sync>;

/// Producer registered with [`Container::set_async_resolver`].
pub type AsyncResolver = Arc<dyn Fn(Container) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

#[derive(Clone)]
struct Registered<R> {
    resolver: R,
    scope: Scope,
}

/// A key and its effective scope, as reported by [`Container::list_services`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistration {
    pub key: Key,
    pub scope: Scope,
}

/// Hierarchical dependency injection container.
///
/// A root container owns singleton instances and every registered resolver.
/// A child container, created with [`Container::create_child_container`],
/// owns request-scoped instances and delegates everything else to its
/// parent. Cloning a container yields another handle to the same container.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

struct Inner {
    parent: Option<Container>,
    services: DashMap<Key, Value>,
    sync_resolvers: DashMap<Key, Registered<SyncResolver>>,
    async_resolvers: DashMap<Key, Registered<AsyncResolver>>,
    in_flight: DashMap<Key, Arc<tokio::sync::Mutex<()>>>,
    config: ContainerConfig,
}

static GLOBAL: LazyLock<Container> = LazyLock::new(Container::new);

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::build(None, config)
    }

    fn build(parent: Option<Container>, config: ContainerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                parent,
                services: DashMap::new(),
                sync_resolvers: DashMap::new(),
                async_resolvers: DashMap::new(),
                in_flight: DashMap::new(),
                config,
            }),
        }
    }

    /// Process-wide root container.
    pub fn global() -> &'static Container {
        &GLOBAL
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    pub fn is_child(&self) -> bool {
        self.inner.parent.is_some()
    }

    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    pub fn root(&self) -> &Container {
        let mut current = self;
        while let Some(parent) = &current.inner.parent {
            current = parent;
        }
        current
    }

    /// Child container scoping one unit of work, such as one request.
    pub fn create_child_container(&self) -> Container {
        Self::build(Some(self.clone()), self.inner.config)
    }

    /// Same container, `true` for handles of one container.
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Injector factory bound to this container.
    pub fn injector(&self) -> BoundFactory<Container> {
        injector_factory().with(self.clone())
    }

    /// Store a value in this container under a token or name.
    ///
    /// # Errors
    /// Class keys are produced by the container and rejected with
    /// [`TesseraError::InvalidKey`].
    pub fn set(&self, key: impl Into<Key>, value: Value) -> Result<()> {
        let key = key.into();
        if key.is_class() {
            return Err(TesseraError::InvalidKey {
                key: key.to_string(),
                message: "class keys cannot be set, register a resolver instead".to_string(),
            });
        }
        self.inner.services.insert(key, value);
        Ok(())
    }

    pub fn set_value<T: Any + Send + Sync>(&self, key: impl Into<Key>, value: T) -> Result<()> {
        self.set(key, crate::reflect::value(value))
    }

    /// Register a producer for `key`. Registration always lands on the root.
    pub fn set_resolver<F>(&self, key: impl Into<Key>, resolver: F, scope: Scope)
    where
        F: Fn(&Container) -> Result<Value> + Send + Sync + 'static,
    {
        let key = key.into();
        tracing::debug!(key = %key, scope = %scope, "registering resolver");
        self.root().inner.sync_resolvers.insert(
            key,
            Registered {
                resolver: Arc::new(resolver),
                scope,
            },
        );
    }

    pub fn set_async_resolver<F, Fut>(&self, key: impl Into<Key>, resolver: F, scope: Scope)
    where
        F: Fn(Container) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let key = key.into();
        tracing::debug!(key = %key, scope = %scope, "registering async resolver");
        let resolver: AsyncResolver = Arc::new(move |container| Box::pin(resolver(container)));
        self.root()
            .inner
            .async_resolvers
            .insert(key, Registered { resolver, scope });
    }

    fn sync_resolver(&self, key: &Key) -> Option<Registered<SyncResolver>> {
        self.root()
            .inner
            .sync_resolvers
            .get(key)
            .map(|entry| entry.value().clone())
    }

    fn async_resolver(&self, key: &Key) -> Option<Registered<AsyncResolver>> {
        self.root()
            .inner
            .async_resolvers
            .get(key)
            .map(|entry| entry.value().clone())
    }

    fn cached(&self, key: &Key) -> Option<Value> {
        self.inner.services.get(key).map(|entry| entry.value().clone())
    }

    /// Resolve `key` synchronously.
    ///
    /// Resolution order: a registered resolver, then the class itself for
    /// class keys, then for tokens and names this container's values, a
    /// component declared with that key, and finally the parent. `Ok(None)`
    /// means nothing is registered under `key`. A component reached through
    /// its extra key must carry construction metadata.
    ///
    /// # Errors
    /// Fails with [`TesseraError::ScopeMismatch`] when a request-scoped key is
    /// resolved from a root container, with
    /// [`TesseraError::AsyncResolverInSyncContext`] when only an async
    /// resolver is registered and it has not produced a cached instance yet,
    /// and with any construction error.
    pub fn get(&self, key: &Key) -> Result<Option<Value>> {
        if let Some(registered) = self.sync_resolver(key) {
            let resolver = registered.resolver;
            return self
                .scoped(key, registered.scope, &|container| resolver(container))
                .map(Some);
        }
        if let Some(registered) = self.async_resolver(key) {
            return self
                .cached_in_scope(key, registered.scope)
                .map(Some)
                .ok_or_else(|| TesseraError::AsyncResolverInSyncContext {
                    key: key.to_string(),
                });
        }
        match key {
            Key::Class(class) => self.get_class(*class),
            _ => self.get_named(key),
        }
    }

    /// Instance already produced for `key` by the container owning `scope`.
    fn cached_in_scope(&self, key: &Key, scope: Scope) -> Option<Value> {
        match scope {
            Scope::Singleton => self.root().cached(key),
            Scope::Request if self.is_child() => self.cached(key),
            Scope::Request | Scope::Transient => None,
        }
    }

    fn get_class(&self, class: ClassRef) -> Result<Option<Value>> {
        if !class.is_constructible() {
            return Ok(None);
        }
        self.scoped(&Key::Class(class), scope_of(class), &|container| {
            container.construct(class)
        })
        .map(Some)
    }

    fn get_named(&self, key: &Key) -> Result<Option<Value>> {
        if let Some(value) = self.cached(key) {
            return Ok(Some(value));
        }
        if let Some(class) = component_for_key(key) {
            class.ops()?;
            return self.get_class(class);
        }
        match &self.inner.parent {
            Some(parent) => parent.get(key),
            None => Ok(None),
        }
    }

    fn scoped(
        &self,
        key: &Key,
        scope: Scope,
        produce: &dyn Fn(&Container) -> Result<Value>,
    ) -> Result<Value> {
        match scope {
            Scope::Transient => produce(self),
            Scope::Singleton => match &self.inner.parent {
                Some(parent) => parent.scoped(key, scope, produce),
                None => self.get_or_produce(key, produce),
            },
            Scope::Request if self.is_child() => self.get_or_produce(key, produce),
            Scope::Request => Err(self.scope_mismatch(key)),
        }
    }

    fn get_or_produce(&self, key: &Key, produce: &dyn Fn(&Container) -> Result<Value>) -> Result<Value> {
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }
        let value = produce(self)?;
        tracing::debug!(key = %key, "caching instance");
        Ok(self
            .inner
            .services
            .entry(key.clone())
            .or_insert(value)
            .value()
            .clone())
    }

    fn scope_mismatch(&self, key: &Key) -> TesseraError {
        tracing::warn!(key = %key, "request scoped service resolved from a root container");
        TesseraError::ScopeMismatch {
            key: key.to_string(),
        }
    }

    fn construct(&self, class: ClassRef) -> Result<Value> {
        self.injector().construct_class(class).map(Value::from)
    }

    /// Resolve `key`, awaiting async resolvers, async injectors and
    /// initialization hooks.
    ///
    /// Same order as [`Container::get`], except that an async resolver takes
    /// precedence over a sync one. Singleton and request instances are built
    /// at most once per owning container, even under concurrent first access.
    pub fn get_async<'a>(&'a self, key: &'a Key) -> BoxFuture<'a, Result<Option<Value>>> {
        Box::pin(async move {
            if let Some(registered) = self.async_resolver(key) {
                let resolver = registered.resolver;
                let produce = move |container: Container| resolver(container);
                return self
                    .scoped_async(key, registered.scope, Arc::new(produce))
                    .await
                    .map(Some);
            }
            if let Some(registered) = self.sync_resolver(key) {
                let resolver = registered.resolver;
                let produce = move |container: Container| -> BoxFuture<'static, Result<Value>> {
                    let value = resolver(&container);
                    Box::pin(async move { value })
                };
                return self
                    .scoped_async(key, registered.scope, Arc::new(produce))
                    .await
                    .map(Some);
            }
            match key {
                Key::Class(class) => self.get_class_async(*class).await,
                _ => self.get_named_async(key).await,
            }
        })
    }

    async fn get_class_async(&self, class: ClassRef) -> Result<Option<Value>> {
        if !class.is_constructible() {
            return Ok(None);
        }
        let produce = move |container: Container| -> BoxFuture<'static, Result<Value>> {
            Box::pin(async move {
                let value = container.construct_async(class).await?;
                class.initialize(value.clone()).await?;
                Ok(value)
            })
        };
        self.scoped_async(&Key::Class(class), scope_of(class), Arc::new(produce))
            .await
            .map(Some)
    }

    async fn get_named_async(&self, key: &Key) -> Result<Option<Value>> {
        if let Some(value) = self.cached(key) {
            return Ok(Some(value));
        }
        if let Some(class) = component_for_key(key) {
            class.ops()?;
            return self.get_class_async(class).await;
        }
        match &self.inner.parent {
            Some(parent) => parent.get_async(key).await,
            None => Ok(None),
        }
    }

    fn scoped_async<'a>(&'a self, key: &'a Key, scope: Scope, produce: AsyncResolver) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            match scope {
                Scope::Transient => produce(self.clone()).await,
                Scope::Singleton => match &self.inner.parent {
                    Some(parent) => parent.scoped_async(key, scope, produce).await,
                    None => self.get_or_produce_async(key, produce).await,
                },
                Scope::Request if self.is_child() => self.get_or_produce_async(key, produce).await,
                Scope::Request => Err(self.scope_mismatch(key)),
            }
        })
    }

    async fn get_or_produce_async(&self, key: &Key, produce: AsyncResolver) -> Result<Value> {
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }
        let gate = self.inner.in_flight.entry(key.clone()).or_default().value().clone();
        let _guard = gate.lock().await;
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }
        let value = produce(self.clone()).await?;
        tracing::debug!(key = %key, "caching instance");
        let value = self
            .inner
            .services
            .entry(key.clone())
            .or_insert(value)
            .value()
            .clone();
        // A failed attempt keeps the gate so waiters retry behind it.
        self.inner
            .in_flight
            .remove_if(key, |_, current| Arc::ptr_eq(current, &gate));
        Ok(value)
    }

    async fn construct_async(&self, class: ClassRef) -> Result<Value> {
        self.injector()
            .construct_class_async(class, self.inner.config.resolve_mode)
            .await
            .map(Value::from)
    }

    pub fn get_as<T: Any + Send + Sync>(&self, key: impl Into<Key>) -> Result<Option<Arc<T>>> {
        self.get(&key.into())?.map(downcast_value::<T>).transpose()
    }

    pub fn get_async_as<T: Any + Send + Sync>(
        &self,
        key: impl Into<Key>,
    ) -> impl Future<Output = Result<Option<Arc<T>>>> + Send {
        let key = key.into();
        async move { self.get_async(&key).await?.map(downcast_value::<T>).transpose() }
    }

    pub fn get_token<T: Any + Send + Sync>(&self, token: &Token<T>) -> Result<Option<Arc<T>>> {
        self.get_as::<T>(token)
    }

    pub async fn get_token_async<T: Any + Send + Sync>(&self, token: &Token<T>) -> Result<Option<Arc<T>>> {
        self.get_async_as::<T>(token).await
    }

    /// Resolve an injectable type by its class key.
    ///
    /// # Errors
    /// Fails with [`TesseraError::DependencyNotFound`] when nothing produced a value.
    pub fn resolve<T: Injectable>(&self) -> Result<Arc<T>> {
        self.get_as::<T>(Key::of::<T>())?
            .ok_or_else(not_found::<T>)
    }

    pub async fn resolve_async<T: Injectable>(&self) -> Result<Arc<T>> {
        self.get_async_as::<T>(Key::of::<T>())
            .await?
            .ok_or_else(not_found::<T>)
    }

    /// Keys whose effective scope is `scope`: components, keyed by their
    /// extra key when they declare one, plus sync and async resolvers.
    pub fn list_services(&self, scope: Scope) -> Vec<ServiceRegistration> {
        let mut services: IndexMap<Key, Scope> = IndexMap::new();
        let extractor = component_extractor();
        for class in extractor.decorated_classes() {
            let options = extractor.get_value(class).unwrap_or_default();
            if options.scope == scope {
                services.insert(options.key.unwrap_or(Key::Class(class)), options.scope);
            }
        }
        let root = self.root();
        for entry in root.inner.sync_resolvers.iter() {
            if entry.scope == scope {
                services.insert(entry.key().clone(), entry.scope);
            }
        }
        for entry in root.inner.async_resolvers.iter() {
            if entry.scope == scope {
                services.insert(entry.key().clone(), entry.scope);
            }
        }
        services
            .into_iter()
            .map(|(key, scope)| ServiceRegistration { key, scope })
            .collect()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("is_child", &self.is_child())
            .field("services", &self.inner.services.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

fn not_found<T>() -> TesseraError {
    TesseraError::DependencyNotFound {
        type_name: std::any::type_name::<T>().to_string(),
    }
}

use crate::config::ContainerConfig;
use crate::di::{Container, Key, Scope};
use crate::error::Result;
use crate::injector::ResolveMode;
use crate::reflect::Value;
use std::any::Any;
use std::future::Future;

type Step = Box<dyn FnOnce(&Container) -> Result<()> + Send>;

/// Builder for a root container
///
/// Collects configuration, values and resolvers, and applies them in
/// registration order when the container is built.
///
/// # Example
/// ```
/// use tessera::di::{ContainerBuilder, Scope};
/// use tessera::injector::ResolveMode;
///
/// let container = ContainerBuilder::new()
///     .resolve_mode(ResolveMode::Sequential)
///     .value("region", "eu-west-1".to_string())
///     .resolver("retries", |_| Ok(tessera::value(3u8)), Scope::Singleton)
///     .build()
///     .unwrap();
///
/// assert_eq!(*container.get_as::<u8>("retries").unwrap().unwrap(), 3);
/// ```
pub struct ContainerBuilder {
    config: ContainerConfig,
    steps: Vec<Step>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            steps: Vec::new(),
        }
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolve_mode(mut self, mode: ResolveMode) -> Self {
        self.config = self.config.with_resolve_mode(mode);
        self
    }

    /// Store a value under a token or name
    pub fn value<T: Any + Send + Sync>(mut self, key: impl Into<Key>, value: T) -> Self {
        let key = key.into();
        self.steps
            .push(Box::new(move |container: &Container| container.set_value(key, value)));
        self
    }

    pub fn resolver<F>(mut self, key: impl Into<Key>, resolver: F, scope: Scope) -> Self
    where
        F: Fn(&Container) -> Result<Value> + Send + Sync + 'static,
    {
        let key = key.into();
        self.steps.push(Box::new(move |container: &Container| {
            container.set_resolver(key, resolver, scope);
            Ok(())
        }));
        self
    }

    pub fn async_resolver<F, Fut>(mut self, key: impl Into<Key>, resolver: F, scope: Scope) -> Self
    where
        F: Fn(Container) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let key = key.into();
        self.steps.push(Box::new(move |container: &Container| {
            container.set_async_resolver(key, resolver, scope);
            Ok(())
        }));
        self
    }

    /// Build the container
    ///
    /// # Errors
    /// Fails when a value was registered under a class key.
    pub fn build(self) -> Result<Container> {
        let container = Container::with_config(self.config);
        for step in self.steps {
            step(&container)?;
        }
        Ok(container)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Application bootstrap
//!
//! Eagerly builds every singleton service of a root container so that all
//! initialization hooks have completed before the application starts work.

use crate::di::{Container, Scope};
use crate::error::{Result, TesseraError};
use std::time::Duration;

/// Bootstraps the singletons of one container
///
/// # Example
///
/// ```rust,no_run
/// use tessera::boot::Runner;
/// use tessera::di::Container;
///
/// # async fn run() -> tessera::Result<()> {
/// let started = Runner::new(Container::global().clone()).start().await?;
/// tracing::info!("{started} singletons ready");
/// # Ok(())
/// # }
/// ```
pub struct Runner {
    container: Container,
}

impl Runner {
    /// Runner for the root of `container`.
    pub fn new(container: Container) -> Self {
        Self {
            container: container.root().clone(),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Resolve every singleton service in turn, awaiting its init hook.
    ///
    /// Returns the number of services started.
    pub async fn start(&self) -> Result<usize> {
        let services = self.container.list_services(Scope::Singleton);
        tracing::info!("Starting {} singleton services...", services.len());

        for service in &services {
            tracing::debug!("Starting: {}", service.key);
            let started = self.container.get_async(&service.key).await.map_err(|e| {
                tracing::error!("Starting {} failed: {}", service.key, e);
                e
            })?;
            if started.is_none() {
                tracing::error!("Starting {} failed: nothing can produce it", service.key);
                return Err(TesseraError::DependencyNotFound {
                    type_name: service.key.to_string(),
                });
            }
            tracing::debug!("Started: {}", service.key);
        }

        tracing::info!("Startup complete ({} services started)", services.len());
        Ok(services.len())
    }

    pub async fn start_with_timeout(&self, timeout: Duration) -> Result<usize> {
        tokio::time::timeout(timeout, self.start())
            .await
            .map_err(|_| TesseraError::timeout("startup", format!("Timeout after {:?}", timeout)))?
    }
}

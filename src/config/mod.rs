//! Container configuration, loaded from the environment.

use crate::error::{Result, TesseraError};
use crate::injector::ResolveMode;
use std::env;

/// Environment variable selecting the async [`ResolveMode`].
pub const RESOLVE_MODE_VAR: &str = "TESSERA_RESOLVE_MODE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerConfig {
    /// How the container's async paths resolve constructor arguments and fields.
    pub resolve_mode: ResolveMode,
}

impl ContainerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    /// Load from `(name, value)` pairs; unknown names are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (name, value) in vars {
            if name.as_ref() == RESOLVE_MODE_VAR {
                let value = value.as_ref();
                config.resolve_mode = value.trim().parse().map_err(|_| {
                    TesseraError::Config(format!(
                        "{RESOLVE_MODE_VAR}={value} is not one of: concurrent, sequential"
                    ))
                })?;
            }
        }
        Ok(config)
    }

    pub fn with_resolve_mode(mut self, resolve_mode: ResolveMode) -> Self {
        self.resolve_mode = resolve_mode;
        self
    }
}

//! # Tessera
//!
//! Metadata-driven dependency injection for Rust.
//!
//! Tessera attaches metadata to types and members through decorator
//! factories, builds objects through injectors bound to constructor
//! parameters, method parameters and properties, and manages their lifetime
//! in a hierarchical container with singleton, transient and request scopes.
//!
//! ## Features
//!
//! - **Decorator factories**: class, method, property and parameter
//!   decorators with single or multi metadata, plus one compound decorator
//! - **Injectors**: per-slot getters with a default fallback, resolved
//!   synchronously or asynchronously, concurrently or in order
//! - **Scoped container**: root and child containers, resolvers, tokens and
//!   async initialization hooks
//! - **Derives**: `#[derive(Injectable)]` and `#[invocable]` generate the type
//!   tables the engine needs
//!
//! ## Quick Start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! #[derive(Injectable)]
//! struct Database {
//!     url: String,
//! }
//!
//! #[derive(Injectable)]
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! component().apply_to::<Database>(ComponentOptions::singleton());
//! component().apply_to::<UserService>(ComponentOptions::transient());
//! inject().constructor_param::<Database>(0, Some(Key::from("db_url")));
//!
//! let container = Container::new();
//! container.set_value("db_url", "postgres://localhost".to_string()).unwrap();
//!
//! let service = container.resolve::<UserService>().unwrap();
//! assert_eq!(service.db.url, "postgres://localhost");
//! ```

extern crate self as tessera;

pub mod boot;
pub mod config;
pub mod decorators;
pub mod di;
pub mod error;
pub mod injector;
pub mod reflect;

// Re-export core types
pub use di::{Container, ContainerBuilder, Key, Scope, Token};
pub use error::{Result, TesseraError};
pub use injector::{Arguments, Initializable, Injectable, Invocable, ResolveMode};
pub use reflect::{ClassRef, Value, value};

// Re-export macros
pub use tessera_macro::{Injectable, invocable};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;

/// Prelude module for convenient imports
///
/// ```
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use crate::boot::Runner;
    pub use crate::config::ContainerConfig;
    pub use crate::decorators::{
        Marker, Multi, Single, Target, create_class_decorator, create_decorator,
        create_method_decorator, create_parameter_decorator, create_property_decorator,
    };
    pub use crate::di::{
        ComponentOptions, Container, ContainerBuilder, Key, Scope, Token, component, inject,
        injector_factory,
    };
    pub use crate::error::{Result, TesseraError};
    pub use crate::injector::{
        Arguments, Initializable, InjectorFactory, Invocable, Resolution, ResolveMode,
    };
    pub use crate::reflect::{ClassRef, Value, value};
    pub use crate::{Injectable, invocable};
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}

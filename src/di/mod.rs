//! Hierarchical container with singleton, transient and request scopes.

mod builder;
mod container;
mod decorators;
mod key;
mod scope;

pub use builder::ContainerBuilder;
pub use container::{AsyncResolver, Container, ServiceRegistration, SyncResolver};
pub use decorators::{
    ComponentDecorator, ComponentExtractor, ComponentOptions, component, component_extractor,
    inject, injector_factory,
};
pub use key::{Key, Token, TokenKey};
pub use scope::Scope;

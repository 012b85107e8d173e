//! Container-facing decorators: component metadata and the `inject` injector.

use super::{Container, Key, Scope};
use crate::decorators::{ClassDecorator, ClassExtractor, ClassPayload, Single, create_class_decorator};
use crate::error::Result;
use crate::injector::{Injector, InjectorFactory, InjectorPayload, Resolution};
use crate::reflect::ClassRef;
use std::sync::{Arc, LazyLock};

/// Options recorded by [`component`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentOptions {
    pub scope: Scope,
    /// Extra key the component is resolvable through.
    pub key: Option<Key>,
}

impl ComponentOptions {
    pub fn new(scope: Scope) -> Self {
        Self { scope, key: None }
    }

    pub fn singleton() -> Self {
        Self::new(Scope::Singleton)
    }

    pub fn transient() -> Self {
        Self::new(Scope::Transient)
    }

    pub fn request() -> Self {
        Self::new(Scope::Request)
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

pub type ComponentDecorator = ClassDecorator<Single, ComponentOptions, ComponentOptions>;
pub type ComponentExtractor = ClassExtractor<Single, ComponentOptions>;

static COMPONENT: LazyLock<(ComponentDecorator, ComponentExtractor)> = LazyLock::new(|| {
    create_class_decorator(Single, |_: &ClassPayload, options: ComponentOptions| options)
});

static INJECTOR_FACTORY: LazyLock<Arc<InjectorFactory<Container>>> =
    LazyLock::new(|| InjectorFactory::with_default(inject_declared_type));

static INJECT: LazyLock<Injector<Container, Option<Key>>> = LazyLock::new(|| {
    injector_factory().create_injector(|payload, key: &Option<Key>| {
        let key = key.clone().unwrap_or(Key::Class(payload.declared_type));
        resolve(payload.context, key, payload.is_async)
    })
});

/// Marks a class as a container component.
///
/// ```
/// use tessera::Injectable;
/// use tessera::di::{Container, ComponentOptions, component};
///
/// #[derive(Injectable)]
/// struct Clock;
///
/// component().apply_to::<Clock>(ComponentOptions::transient());
/// let container = Container::new();
/// let a = container.resolve::<Clock>().unwrap();
/// let b = container.resolve::<Clock>().unwrap();
/// assert!(!std::sync::Arc::ptr_eq(&a, &b));
/// ```
pub fn component() -> &'static ComponentDecorator {
    &COMPONENT.0
}

pub fn component_extractor() -> &'static ComponentExtractor {
    &COMPONENT.1
}

/// Injection domain of the container. Parameters without an explicit
/// injector are resolved from the container by declared type; properties
/// without one are left alone.
pub fn injector_factory() -> &'static Arc<InjectorFactory<Container>> {
    &INJECTOR_FACTORY
}

/// Injects the value registered under a key, or under the slot's declared
/// type when the key is `None`.
pub fn inject() -> &'static Injector<Container, Option<Key>> {
    &INJECT
}

pub(crate) fn scope_of(class: ClassRef) -> Scope {
    component_extractor()
        .get_value(class)
        .map(|options| options.scope)
        .unwrap_or_default()
}

/// Component registered with `key` as its extra key.
pub(crate) fn component_for_key(key: &Key) -> Option<ClassRef> {
    let extractor = component_extractor();
    extractor.decorated_classes().into_iter().find(|class| {
        extractor
            .get_value(*class)
            .is_some_and(|options| options.key.as_ref() == Some(key))
    })
}

fn inject_declared_type(payload: InjectorPayload<Container>) -> Result<Resolution> {
    if payload.is_property() {
        return Ok(Resolution::none());
    }
    resolve(payload.context, Key::Class(payload.declared_type), payload.is_async)
}

fn resolve(container: Container, key: Key, is_async: bool) -> Result<Resolution> {
    if is_async {
        Ok(Resolution::pending(async move { container.get_async(&key).await }))
    } else {
        container.get(&key).map(Resolution::Ready)
    }
}

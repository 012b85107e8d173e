use super::{Marker, Meta, Mode, Registry, Transformer, read, store, write};
use crate::injector::Invocable;
use crate::reflect::{ClassRef, MethodInfo};
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MethodPayload {
    pub target: ClassRef,
    pub name: &'static str,
    pub params: Vec<ClassRef>,
    pub return_type: ClassRef,
}

type MethodMap<K, M> = IndexMap<ClassRef, IndexMap<&'static str, <K as Mode>::Stored<M>>>;

pub struct MethodDecorator<K: Mode, M: Meta, A> {
    registry: Registry<MethodMap<K, M>>,
    transformer: Transformer<MethodPayload, A, M>,
}

pub struct MethodExtractor<K: Mode, M: Meta> {
    registry: Registry<MethodMap<K, M>>,
}

impl<K: Mode, M: Meta, A> Clone for MethodDecorator<K, M, A> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            transformer: self.transformer.clone(),
        }
    }
}

impl<K: Mode, M: Meta> Clone for MethodExtractor<K, M> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<K: Mode, M: Meta, A> MethodDecorator<K, M, A> {
    pub fn apply(&self, class: ClassRef, method: &MethodInfo, args: A) {
        let payload = MethodPayload {
            target: class,
            name: method.name,
            params: method.params.clone(),
            return_type: method.returns,
        };
        let meta = (self.transformer)(&payload, args);
        let mut registry = write(&self.registry);
        store::<K, M, _>(registry.entry(class).or_default(), method.name, meta);
    }

    /// Decorate method `name` of `T`. A name missing from the method table is
    /// still recorded, with no parameters and the fallback return type.
    pub fn apply_to<T: Invocable>(&self, name: &'static str, args: A) {
        let method = MethodInfo::find::<T>(name)
            .unwrap_or_else(|| MethodInfo::new(name, Vec::new(), ClassRef::object()));
        self.apply(ClassRef::opaque::<T>(), &method, args);
    }
}

impl<K: Mode, M: Meta> MethodExtractor<K, M> {
    pub fn decorated_classes(&self) -> Vec<ClassRef> {
        read(&self.registry).keys().copied().collect()
    }

    pub fn decorated_methods(&self, class: ClassRef) -> Vec<&'static str> {
        read(&self.registry)
            .get(&class)
            .map(|methods| methods.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn get_metadata(&self, class: ClassRef, method: &str) -> Option<K::Stored<M>> {
        read(&self.registry).get(&class)?.get(method).cloned()
    }
}

pub fn create_method_decorator<K, M, A, F>(
    _mode: K,
    transformer: F,
) -> (MethodDecorator<K, M, A>, MethodExtractor<K, M>)
where
    K: Mode,
    M: Meta,
    F: Fn(&MethodPayload, A) -> M + Send + Sync + 'static,
{
    let registry: Registry<MethodMap<K, M>> = Arc::default();
    (
        MethodDecorator {
            registry: registry.clone(),
            transformer: Arc::new(transformer),
        },
        MethodExtractor { registry },
    )
}

pub fn create_method_marker<K: Mode>(mode: K) -> (MethodDecorator<K, Marker, ()>, MethodExtractor<K, Marker>) {
    create_method_decorator(mode, |_: &MethodPayload, ()| Marker)
}

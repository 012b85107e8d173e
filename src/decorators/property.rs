use super::{Marker, Meta, Mode, Registry, Transformer, read, store, write};
use crate::injector::Injectable;
use crate::reflect::{ClassRef, extract_property_type};
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PropertyPayload {
    pub target: ClassRef,
    pub name: &'static str,
    /// Declared type, or the fallback type when the class carries no table.
    pub ty: ClassRef,
}

type PropertyMap<K, M> = IndexMap<ClassRef, IndexMap<&'static str, <K as Mode>::Stored<M>>>;

pub struct PropertyDecorator<K: Mode, M: Meta, A> {
    registry: Registry<PropertyMap<K, M>>,
    transformer: Transformer<PropertyPayload, A, M>,
}

pub struct PropertyExtractor<K: Mode, M: Meta> {
    registry: Registry<PropertyMap<K, M>>,
}

impl<K: Mode, M: Meta, A> Clone for PropertyDecorator<K, M, A> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            transformer: self.transformer.clone(),
        }
    }
}

impl<K: Mode, M: Meta> Clone for PropertyExtractor<K, M> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<K: Mode, M: Meta, A> PropertyDecorator<K, M, A> {
    pub fn apply(&self, class: ClassRef, name: &'static str, args: A) {
        let payload = PropertyPayload {
            target: class,
            name,
            ty: extract_property_type(class, name),
        };
        let meta = (self.transformer)(&payload, args);
        let mut registry = write(&self.registry);
        store::<K, M, _>(registry.entry(class).or_default(), name, meta);
    }

    pub fn apply_to<T: Injectable>(&self, name: &'static str, args: A) {
        self.apply(ClassRef::of::<T>(), name, args);
    }
}

impl<K: Mode, M: Meta> PropertyExtractor<K, M> {
    pub fn decorated_classes(&self) -> Vec<ClassRef> {
        read(&self.registry).keys().copied().collect()
    }

    pub fn decorated_properties(&self, class: ClassRef) -> Vec<&'static str> {
        read(&self.registry)
            .get(&class)
            .map(|properties| properties.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn get_metadata(&self, class: ClassRef, property: &str) -> Option<K::Stored<M>> {
        read(&self.registry).get(&class)?.get(property).cloned()
    }
}

pub fn create_property_decorator<K, M, A, F>(
    _mode: K,
    transformer: F,
) -> (PropertyDecorator<K, M, A>, PropertyExtractor<K, M>)
where
    K: Mode,
    M: Meta,
    F: Fn(&PropertyPayload, A) -> M + Send + Sync + 'static,
{
    let registry: Registry<PropertyMap<K, M>> = Arc::default();
    (
        PropertyDecorator {
            registry: registry.clone(),
            transformer: Arc::new(transformer),
        },
        PropertyExtractor { registry },
    )
}

pub fn create_property_marker<K: Mode>(
    mode: K,
) -> (PropertyDecorator<K, Marker, ()>, PropertyExtractor<K, Marker>) {
    create_property_decorator(mode, |_: &PropertyPayload, ()| Marker)
}

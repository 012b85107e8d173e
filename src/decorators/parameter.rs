use super::{Marker, Meta, Mode, Registry, Transformer, read, store, write};
use crate::reflect::ClassRef;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ParameterPayload {
    pub target: ClassRef,
    /// Method name, `None` for the constructor.
    pub name: Option<&'static str>,
    pub index: usize,
}

type ParameterMap<K, M> =
    IndexMap<ClassRef, IndexMap<Option<&'static str>, IndexMap<usize, <K as Mode>::Stored<M>>>>;

pub struct ParameterDecorator<K: Mode, M: Meta, A> {
    registry: Registry<ParameterMap<K, M>>,
    transformer: Transformer<ParameterPayload, A, M>,
}

pub struct ParameterExtractor<K: Mode, M: Meta> {
    registry: Registry<ParameterMap<K, M>>,
}

impl<K: Mode, M: Meta, A> Clone for ParameterDecorator<K, M, A> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            transformer: self.transformer.clone(),
        }
    }
}

impl<K: Mode, M: Meta> Clone for ParameterExtractor<K, M> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<K: Mode, M: Meta, A> ParameterDecorator<K, M, A> {
    pub fn apply(&self, class: ClassRef, method: Option<&'static str>, index: usize, args: A) {
        let payload = ParameterPayload {
            target: class,
            name: method,
            index,
        };
        let meta = (self.transformer)(&payload, args);
        let mut registry = write(&self.registry);
        let slots = registry.entry(class).or_default().entry(method).or_default();
        store::<K, M, _>(slots, index, meta);
    }

    pub fn apply_to<T: 'static>(&self, method: Option<&'static str>, index: usize, args: A) {
        self.apply(ClassRef::opaque::<T>(), method, index, args);
    }
}

impl<K: Mode, M: Meta> ParameterExtractor<K, M> {
    pub fn decorated_classes(&self) -> Vec<ClassRef> {
        read(&self.registry).keys().copied().collect()
    }

    /// Methods with decorated parameters; `None` stands for the constructor.
    pub fn decorated_methods(&self, class: ClassRef) -> Vec<Option<&'static str>> {
        read(&self.registry)
            .get(&class)
            .map(|methods| methods.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Metadata of every decorated parameter of `method` as `(position, metadata)`
    /// pairs in position order. Undecorated positions are absent.
    pub fn get_method_metadata(
        &self,
        class: ClassRef,
        method: Option<&'static str>,
    ) -> Option<Vec<(usize, K::Stored<M>)>> {
        let registry = read(&self.registry);
        let slots = registry.get(&class)?.get(&method)?;
        let mut decorated: Vec<_> = slots
            .iter()
            .map(|(index, meta)| (*index, meta.clone()))
            .collect();
        decorated.sort_by_key(|(index, _)| *index);
        Some(decorated)
    }

    pub fn get_parameter_metadata(
        &self,
        class: ClassRef,
        method: Option<&'static str>,
        index: usize,
    ) -> Option<K::Stored<M>> {
        read(&self.registry)
            .get(&class)?
            .get(&method)?
            .get(&index)
            .cloned()
    }
}

pub fn create_parameter_decorator<K, M, A, F>(
    _mode: K,
    transformer: F,
) -> (ParameterDecorator<K, M, A>, ParameterExtractor<K, M>)
where
    K: Mode,
    M: Meta,
    F: Fn(&ParameterPayload, A) -> M + Send + Sync + 'static,
{
    let registry: Registry<ParameterMap<K, M>> = Arc::default();
    (
        ParameterDecorator {
            registry: registry.clone(),
            transformer: Arc::new(transformer),
        },
        ParameterExtractor { registry },
    )
}

pub fn create_parameter_marker<K: Mode>(
    mode: K,
) -> (ParameterDecorator<K, Marker, ()>, ParameterExtractor<K, Marker>) {
    create_parameter_decorator(mode, |_: &ParameterPayload, ()| Marker)
}

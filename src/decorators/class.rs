use super::{Marker, Meta, Mode, Registry, Transformer, read, store, write};
use crate::injector::Injectable;
use crate::reflect::{ClassRef, extract_constructor_param_types};
use indexmap::IndexMap;
use indexmap::map::MutableKeys;
use std::sync::Arc;

/// What a class transformer sees.
#[derive(Debug, Clone)]
pub struct ClassPayload {
    pub class: ClassRef,
    pub constructor_parameters: Vec<ClassRef>,
}

type ClassMap<K, M> = IndexMap<ClassRef, <K as Mode>::Stored<M>>;

pub struct ClassDecorator<K: Mode, M: Meta, A> {
    registry: Registry<ClassMap<K, M>>,
    transformer: Transformer<ClassPayload, A, M>,
}

pub struct ClassExtractor<K: Mode, M: Meta> {
    registry: Registry<ClassMap<K, M>>,
}

impl<K: Mode, M: Meta, A> Clone for ClassDecorator<K, M, A> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            transformer: self.transformer.clone(),
        }
    }
}

impl<K: Mode, M: Meta> Clone for ClassExtractor<K, M> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<K: Mode, M: Meta, A> ClassDecorator<K, M, A> {
    pub fn apply(&self, class: ClassRef, args: A) {
        let payload = ClassPayload {
            class,
            constructor_parameters: extract_constructor_param_types(class),
        };
        let meta = (self.transformer)(&payload, args);
        let mut registry = write(&self.registry);
        // Keep the constructible form of the key once one is seen.
        if class.is_constructible() {
            if let Some((_, stored, _)) = registry.get_full_mut2(&class) {
                *stored = class;
            }
        }
        store::<K, M, _>(&mut registry, class, meta);
    }

    /// Decorate `T`, keeping its construction metadata on the stored key.
    pub fn apply_to<T: Injectable>(&self, args: A) {
        self.apply(ClassRef::of::<T>(), args);
    }
}

impl<K: Mode, M: Meta> ClassExtractor<K, M> {
    /// Decorated classes in first-application order.
    pub fn decorated_classes(&self) -> Vec<ClassRef> {
        read(&self.registry).keys().copied().collect()
    }

    pub fn get_value(&self, class: ClassRef) -> Option<K::Stored<M>> {
        read(&self.registry).get(&class).cloned()
    }

    pub fn is_decorated(&self, class: ClassRef) -> bool {
        read(&self.registry).contains_key(&class)
    }
}

pub fn create_class_decorator<K, M, A, F>(
    _mode: K,
    transformer: F,
) -> (ClassDecorator<K, M, A>, ClassExtractor<K, M>)
where
    K: Mode,
    M: Meta,
    F: Fn(&ClassPayload, A) -> M + Send + Sync + 'static,
{
    let registry: Registry<ClassMap<K, M>> = Arc::default();
    (
        ClassDecorator {
            registry: registry.clone(),
            transformer: Arc::new(transformer),
        },
        ClassExtractor { registry },
    )
}

pub fn create_class_marker<K: Mode>(mode: K) -> (ClassDecorator<K, Marker, ()>, ClassExtractor<K, Marker>) {
    create_class_decorator(mode, |_: &ClassPayload, ()| Marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorators::{Multi, Single};

    struct A;
    struct B;

    #[derive(crate::Injectable)]
    struct Built;

    #[test]
    fn empty_single_decorator() {
        let (decorator, extractor) = create_class_marker(Single);
        let a = ClassRef::opaque::<A>();
        decorator.apply(a, ());
        decorator.apply(a, ());

        assert_eq!(extractor.decorated_classes(), vec![a]);
        assert_eq!(extractor.get_value(a), Some(Marker));
    }

    #[test]
    fn empty_multi_decorator() {
        let (decorator, extractor) = create_class_marker(Multi);
        let a = ClassRef::opaque::<A>();
        decorator.apply(a, ());
        decorator.apply(a, ());

        assert_eq!(extractor.decorated_classes().len(), 1);
        assert_eq!(extractor.get_value(a).map(|v| v.len()), Some(2));
    }

    #[test]
    fn single_keeps_last_applied() {
        let (decorator, extractor) = create_class_decorator(Single, |_: &ClassPayload, v: u32| v);
        let a = ClassRef::opaque::<A>();
        decorator.apply(a, 3);
        decorator.apply(a, 4);

        assert_eq!(extractor.decorated_classes().len(), 1);
        assert_eq!(extractor.get_value(a), Some(4));
    }

    #[test]
    fn multi_keeps_application_order() {
        let (decorator, extractor) = create_class_decorator(Multi, |_: &ClassPayload, v: u32| v);
        let a = ClassRef::opaque::<A>();
        let b = ClassRef::opaque::<B>();
        decorator.apply(a, 4);
        decorator.apply(b, 1);
        decorator.apply(a, 3);

        assert_eq!(extractor.decorated_classes(), vec![a, b]);
        assert_eq!(extractor.get_value(a), Some(vec![4, 3]));
        assert!(!extractor.is_decorated(ClassRef::opaque::<u8>()));
    }

    #[test]
    fn transformer_sees_class() {
        let (decorator, extractor) =
            create_class_decorator(Single, |payload: &ClassPayload, _: ()| payload.class.name());
        decorator.apply(ClassRef::opaque::<A>(), ());

        let name = extractor.get_value(ClassRef::opaque::<A>());
        assert!(name.is_some_and(|n| n.ends_with("A")));
    }

    #[test]
    fn constructible_key_replaces_opaque_one() {
        let (decorator, extractor) = create_class_marker(Single);
        decorator.apply(ClassRef::opaque::<Built>(), ());
        assert!(!extractor.decorated_classes()[0].is_constructible());

        decorator.apply_to::<Built>(());
        decorator.apply(ClassRef::opaque::<Built>(), ());

        let classes = extractor.decorated_classes();
        assert_eq!(classes.len(), 1);
        assert!(classes[0].is_constructible());
    }
}

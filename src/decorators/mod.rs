//! Decorator factories.
//!
//! Each factory returns a `(decorator, extractor)` pair sharing one registry.
//! The decorator records metadata for a class or one of its members; the
//! extractor answers queries about what has been recorded. Decorations are
//! plain function calls, normally made once during startup, so the
//! registries are read-mostly afterwards.
//!
//! The storage mode is chosen with a [`Mode`] value: [`Single`] keeps the
//! metadata of the last application, [`Multi`] keeps every application in
//! order.

mod class;
mod compound;
mod method;
mod parameter;
mod property;

pub use class::{ClassDecorator, ClassExtractor, ClassPayload, create_class_decorator, create_class_marker};
pub use compound::{CompoundDecorator, CompoundExtractors, CompoundPayload, create_decorator, create_marker};
pub use method::{
    MethodDecorator, MethodExtractor, MethodPayload, create_method_decorator, create_method_marker,
};
pub use parameter::{
    ParameterDecorator, ParameterExtractor, ParameterPayload, create_parameter_decorator,
    create_parameter_marker,
};
pub use property::{
    PropertyDecorator, PropertyExtractor, PropertyPayload, create_property_decorator,
    create_property_marker,
};

use crate::error::{Result, TesseraError};
use crate::reflect::{ClassRef, MethodInfo};
use indexmap::IndexMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Anything that can be stored as decorator metadata.
pub trait Meta: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Meta for T {}

/// Storage discipline for repeated applications on the same slot.
pub trait Mode: Send + Sync + 'static {
    type Stored<M: Meta>: Clone + Send + Sync + 'static;

    fn first<M: Meta>(meta: M) -> Self::Stored<M>;

    fn append<M: Meta>(stored: &mut Self::Stored<M>, meta: M);
}

/// Last applied wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Single;

/// Every application is kept, in application order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multi;

impl Mode for Single {
    type Stored<M: Meta> = M;

    fn first<M: Meta>(meta: M) -> M {
        meta
    }

    fn append<M: Meta>(stored: &mut M, meta: M) {
        *stored = meta;
    }
}

impl Mode for Multi {
    type Stored<M: Meta> = Vec<M>;

    fn first<M: Meta>(meta: M) -> Vec<M> {
        vec![meta]
    }

    fn append<M: Meta>(stored: &mut Vec<M>, meta: M) {
        stored.push(meta);
    }
}

/// Metadata of decorators created without a transformer. Only its presence matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marker;

pub(crate) type Transformer<P, A, M> = Arc<dyn Fn(&P, A) -> M + Send + Sync>;

pub(crate) type Registry<T> = Arc<RwLock<T>>;

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn store<K: Mode, M: Meta, Q: Hash + Eq>(
    map: &mut IndexMap<Q, K::Stored<M>>,
    key: Q,
    meta: M,
) {
    match map.get_mut(&key) {
        Some(stored) => K::append::<M>(stored, meta),
        None => {
            map.insert(key, K::first(meta));
        }
    }
}

/// Where a decoration or an injector is applied.
///
/// Built with [`Target::class`], [`Target::property`], [`Target::method`] or
/// [`Target::parameter`]; the fields are public so callers forwarding raw
/// application shapes can fill them directly and let [`Target::shape`]
/// classify them.
#[derive(Debug, Clone)]
pub struct Target {
    pub class: ClassRef,
    pub member: Option<&'static str>,
    pub slot: Option<TargetSlot>,
}

#[derive(Debug, Clone)]
pub enum TargetSlot {
    /// Numeric parameter position; `0` is a valid position.
    Parameter(usize),
    /// Method descriptor.
    Method(MethodInfo),
}

/// Classified application shape.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Class,
    Method(&'a MethodInfo),
    Property(&'static str),
    /// Parameter of the named method, or of the constructor when `None`.
    Parameter(Option<&'static str>, usize),
}

impl Target {
    pub fn class(class: ClassRef) -> Self {
        Self {
            class,
            member: None,
            slot: None,
        }
    }

    pub fn property(class: ClassRef, name: &'static str) -> Self {
        Self {
            class,
            member: Some(name),
            slot: None,
        }
    }

    pub fn method(class: ClassRef, method: MethodInfo) -> Self {
        Self {
            class,
            member: Some(method.name),
            slot: Some(TargetSlot::Method(method)),
        }
    }

    pub fn parameter(class: ClassRef, member: Option<&'static str>, index: usize) -> Self {
        Self {
            class,
            member,
            slot: Some(TargetSlot::Parameter(index)),
        }
    }

    /// Classify the target:
    /// no member and no slot is a class, a numeric slot is a parameter, a
    /// member without slot is a property, a member with a method descriptor
    /// is a method. A method descriptor without member name is rejected.
    pub fn shape(&self) -> Result<Shape<'_>> {
        match (&self.member, &self.slot) {
            (None, None) => Ok(Shape::Class),
            (member, Some(TargetSlot::Parameter(index))) => Ok(Shape::Parameter(*member, *index)),
            (Some(name), None) => Ok(Shape::Property(*name)),
            (Some(_), Some(TargetSlot::Method(method))) => Ok(Shape::Method(method)),
            (None, Some(TargetSlot::Method(method))) => Err(TesseraError::InvalidTarget {
                message: format!(
                    "method descriptor [{}] on class [{}] has no member name",
                    method.name, self.class
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Host;

    #[test]
    fn shape_dispatch() {
        let class = ClassRef::opaque::<Host>();

        assert!(matches!(Target::class(class).shape(), Ok(Shape::Class)));
        assert!(matches!(
            Target::property(class, "name").shape(),
            Ok(Shape::Property("name"))
        ));
        assert!(matches!(
            Target::parameter(class, None, 0).shape(),
            Ok(Shape::Parameter(None, 0))
        ));
        assert!(matches!(
            Target::parameter(class, Some("run"), 2).shape(),
            Ok(Shape::Parameter(Some("run"), 2))
        ));

        let method = MethodInfo::new("run", vec![], ClassRef::object());
        match Target::method(class, method).shape() {
            Ok(Shape::Method(info)) => assert_eq!(info.name, "run"),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn method_descriptor_without_member_is_rejected() {
        let target = Target {
            class: ClassRef::opaque::<Host>(),
            member: None,
            slot: Some(TargetSlot::Method(MethodInfo::new(
                "run",
                vec![],
                ClassRef::object(),
            ))),
        };
        assert!(matches!(
            target.shape(),
            Err(TesseraError::InvalidTarget { .. })
        ));
    }
}

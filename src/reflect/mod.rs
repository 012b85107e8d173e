//! Compile-time type tables standing in for runtime reflection.
//!
//! Every injectable type describes itself through [`Injectable::type_info`]
//! (constructor parameters and properties) and optionally
//! [`Invocable::methods`] (method signatures). A [`ClassRef`] is the runtime
//! handle to such a type: it identifies the type and, when the type is
//! injectable, carries the type-erased operations the construction engine
//! needs.

mod declared;
mod extract;

pub use declared::{Declared, DeclaredClass, DeclaredOpaque};
pub use extract::{
    extract_constructor_param_types, extract_method_param_types, extract_method_return_type,
    extract_parameter_type, extract_property_type,
};

use crate::error::{Result, TesseraError};
use crate::injector::{Arguments, Injectable, Invocable};
use futures::future::BoxFuture;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased, shareable value produced by an injector, resolver or container.
pub type Value = Arc<dyn Any + Send + Sync>;

/// A freshly constructed, not yet shared instance.
pub type Instance = Box<dyn Any + Send + Sync>;

/// Wrap any value into a [`Value`].
pub fn value<T: Any + Send + Sync>(value: T) -> Value {
    Arc::new(value)
}

/// Downcast a [`Value`] to a concrete shared type.
pub fn downcast_value<T: Any + Send + Sync>(value: Value) -> Result<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| TesseraError::downcast::<T>())
}

#[derive(Clone, Copy)]
pub(crate) struct ClassOps {
    pub(crate) type_info: fn() -> TypeInfo,
    pub(crate) construct: fn(&Arguments) -> Result<Instance>,
    pub(crate) assign: fn(&mut Instance, &str, Value) -> Result<()>,
    pub(crate) initialize: fn(Value) -> BoxFuture<'static, Result<()>>,
}

/// Runtime reference to a type, used as a map key by decorators, injectors
/// and the container.
///
/// Equality and hashing only consider the [`TypeId`], so an opaque reference
/// and a constructible reference to the same type are interchangeable keys.
#[derive(Clone, Copy)]
pub struct ClassRef {
    id: TypeId,
    name: &'static str,
    ops: Option<ClassOps>,
}

impl ClassRef {
    /// Reference to an injectable type, carrying its type table and constructor.
    pub fn of<T: Injectable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            ops: Some(ClassOps {
                type_info: T::type_info,
                construct: construct_erased::<T>,
                assign: assign_erased::<T>,
                initialize: initialize_erased::<T>,
            }),
        }
    }

    /// Reference to a type that carries no metadata.
    pub fn opaque<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            ops: None,
        }
    }

    /// The generic fallback type used when a slot has no declared type.
    pub fn object() -> Self {
        Self {
            id: TypeId::of::<dyn Any>(),
            name: "Object",
            ops: None,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn is_object(&self) -> bool {
        self.id == TypeId::of::<dyn Any>()
    }

    /// Whether the construction engine can build this type.
    pub fn is_constructible(&self) -> bool {
        self.ops.is_some()
    }

    /// The type table, if the type carries one.
    pub fn type_info(&self) -> Option<TypeInfo> {
        self.ops.map(|ops| (ops.type_info)())
    }

    pub(crate) fn ops(&self) -> Result<ClassOps> {
        self.ops.ok_or_else(|| TesseraError::NotConstructible {
            class: self.name.to_string(),
        })
    }

    /// Run the initialization hook of an instance of this class, if it has one.
    pub(crate) async fn initialize(&self, instance: Value) -> Result<()> {
        match self.ops {
            Some(ops) => (ops.initialize)(instance).await,
            None => Ok(()),
        }
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassRef").field(&self.name).finish()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn construct_erased<T: Injectable>(args: &Arguments) -> Result<Instance> {
    Ok(Box::new(T::construct(args)?))
}

fn assign_erased<T: Injectable>(instance: &mut Instance, property: &str, value: Value) -> Result<()> {
    instance
        .downcast_mut::<T>()
        .ok_or_else(TesseraError::downcast::<T>)?
        .assign(property, value)
}

fn initialize_erased<T: Injectable>(value: Value) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        let instance = downcast_value::<T>(value)?;
        match instance.initializer() {
            Some(hook) => hook.init().await,
            None => Ok(()),
        }
    })
}

/// Declared constructor parameters and injectable properties of a type.
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    pub constructor: Vec<ClassRef>,
    pub properties: Vec<PropertyInfo>,
}

impl TypeInfo {
    pub fn new(constructor: Vec<ClassRef>) -> Self {
        Self {
            constructor,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: &'static str, ty: ClassRef) -> Self {
        self.properties.push(PropertyInfo { name, ty });
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct PropertyInfo {
    pub name: &'static str,
    pub ty: ClassRef,
}

/// Signature of an invocable method.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub name: &'static str,
    pub params: Vec<ClassRef>,
    pub returns: ClassRef,
}

impl MethodInfo {
    pub fn new(name: &'static str, params: Vec<ClassRef>, returns: ClassRef) -> Self {
        Self {
            name,
            params,
            returns,
        }
    }

    /// Look up a method signature in the method table of `T`.
    pub fn find<T: Invocable>(name: &str) -> Option<MethodInfo> {
        T::methods().into_iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_and_object_refs() {
        let a = ClassRef::opaque::<u32>();
        let b = ClassRef::opaque::<u32>();
        assert_eq!(a, b);
        assert!(a.is::<u32>());
        assert!(!a.is_constructible());
        assert!(a.type_info().is_none());

        let object = ClassRef::object();
        assert!(object.is_object());
        assert_eq!(object.name(), "Object");
        assert_ne!(object, a);
    }

    #[test]
    fn not_constructible_error_names_the_class() {
        let err = ClassRef::opaque::<String>().ops().err().unwrap();
        assert!(err.to_string().contains("String"));
    }
}

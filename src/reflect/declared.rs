//! Declared-type lookup used by the derive macros.
//!
//! `(&Declared::<X>::new()).declared()` yields [`ClassRef::of`] when `X` is
//! [`Injectable`] and [`ClassRef::opaque`] otherwise. Method resolution
//! picks the by-reference impl first and only falls back to the autoref
//! impl when the `Injectable` bound does not hold, so both traits must be
//! in scope at the call site.

use super::ClassRef;
use crate::injector::Injectable;
use std::marker::PhantomData;

pub struct Declared<T: ?Sized>(PhantomData<fn() -> *const T>);

impl<T: ?Sized> Declared<T> {
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

pub trait DeclaredClass {
    fn declared(&self) -> ClassRef;
}

impl<T: Injectable> DeclaredClass for Declared<T> {
    fn declared(&self) -> ClassRef {
        ClassRef::of::<T>()
    }
}

pub trait DeclaredOpaque {
    fn declared(&self) -> ClassRef;
}

impl<T: ?Sized + 'static> DeclaredOpaque for &Declared<T> {
    fn declared(&self) -> ClassRef {
        ClassRef::opaque::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injector::Arguments;
    use crate::reflect::TypeInfo;

    struct Leaf;

    impl Injectable for Leaf {
        fn type_info() -> TypeInfo {
            TypeInfo::default()
        }

        fn construct(_args: &Arguments) -> crate::Result<Self> {
            Ok(Leaf)
        }
    }

    #[test]
    fn prefers_injectable_metadata() {
        let declared = (&Declared::<Leaf>::new()).declared();
        assert!(declared.is::<Leaf>());
        assert!(declared.is_constructible());

        let opaque = (&Declared::<u8>::new()).declared();
        assert!(opaque.is::<u8>());
        assert!(!opaque.is_constructible());
    }
}

//! Declared-type lookups.
//!
//! None of these fail: a type or member without metadata resolves to an
//! empty parameter list or to [`ClassRef::object`].

use super::{ClassRef, MethodInfo};
use crate::injector::Invocable;

/// Declared constructor parameter types of `class`, in order.
pub fn extract_constructor_param_types(class: ClassRef) -> Vec<ClassRef> {
    class
        .type_info()
        .map(|info| info.constructor)
        .unwrap_or_default()
}

/// Declared parameter types of `method` on `T`, in order.
pub fn extract_method_param_types<T: Invocable>(method: &str) -> Vec<ClassRef> {
    MethodInfo::find::<T>(method)
        .map(|m| m.params)
        .unwrap_or_default()
}

pub fn extract_method_return_type<T: Invocable>(method: &str) -> ClassRef {
    MethodInfo::find::<T>(method)
        .map(|m| m.returns)
        .unwrap_or_else(ClassRef::object)
}

pub fn extract_property_type(class: ClassRef, property: &str) -> ClassRef {
    class
        .type_info()
        .and_then(|info| info.property(property).map(|p| p.ty))
        .unwrap_or_else(ClassRef::object)
}

/// Declared type at `index` of an already extracted parameter list.
pub fn extract_parameter_type(params: &[ClassRef], index: usize) -> ClassRef {
    params.get(index).copied().unwrap_or_else(ClassRef::object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injector::{Arguments, Injectable};
    use crate::reflect::TypeInfo;

    struct Plain;

    struct Described {
        _port: u16,
    }

    impl Injectable for Described {
        fn type_info() -> TypeInfo {
            TypeInfo::new(vec![ClassRef::opaque::<u16>()])
                .with_property("label", ClassRef::opaque::<String>())
        }

        fn construct(args: &Arguments) -> crate::Result<Self> {
            Ok(Self {
                _port: args.get_cloned::<u16>(0)?,
            })
        }
    }

    #[test]
    fn missing_metadata_falls_back() {
        let plain = ClassRef::opaque::<Plain>();
        assert!(extract_constructor_param_types(plain).is_empty());
        assert!(extract_property_type(plain, "anything").is_object());
        assert!(extract_parameter_type(&[], 0).is_object());
    }

    #[test]
    fn reads_declared_types() {
        let class = ClassRef::of::<Described>();
        let params = extract_constructor_param_types(class);
        assert_eq!(params.len(), 1);
        assert!(params[0].is::<u16>());
        assert!(extract_parameter_type(&params, 0).is::<u16>());
        assert!(extract_parameter_type(&params, 1).is_object());
        assert!(extract_property_type(class, "label").is::<String>());
        assert!(extract_property_type(class, "missing").is_object());
    }
}

use crate::error::{Result, TesseraError};
use crate::reflect::{ClassRef, Value, downcast_value};
use std::any::Any;
use std::sync::Arc;

/// Resolved argument list for one constructor or method call.
///
/// A `None` slot means its injector produced no value.
#[derive(Clone)]
pub struct Arguments {
    class: ClassRef,
    member: Option<&'static str>,
    values: Vec<Option<Value>>,
}

impl Arguments {
    pub fn new(class: ClassRef, member: Option<&'static str>, values: Vec<Option<Value>>) -> Self {
        Self {
            class,
            member,
            values,
        }
    }

    pub fn class(&self) -> ClassRef {
        self.class
    }

    /// Method name, `None` for constructor arguments.
    pub fn member(&self) -> Option<&'static str> {
        self.member
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn raw(&self, index: usize) -> Option<Value> {
        self.values.get(index).cloned().flatten()
    }

    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        self.get_optional::<T>(index)?
            .ok_or_else(|| TesseraError::DependencyNotFound {
                type_name: format!(
                    "{} for argument [{}] of [{}] on class [{}]",
                    std::any::type_name::<T>(),
                    index,
                    self.member.unwrap_or("constructor"),
                    self.class
                ),
            })
    }

    pub fn get_optional<T: Any + Send + Sync>(&self, index: usize) -> Result<Option<Arc<T>>> {
        self.raw(index).map(downcast_value::<T>).transpose()
    }

    pub fn get_cloned<T: Any + Send + Sync + Clone>(&self, index: usize) -> Result<T> {
        self.get::<T>(index).map(|v| T::clone(&v))
    }

    pub fn get_optional_cloned<T: Any + Send + Sync + Clone>(&self, index: usize) -> Result<Option<T>> {
        Ok(self.get_optional::<T>(index)?.map(|v| T::clone(&v)))
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arguments")
            .field("class", &self.class)
            .field("member", &self.member)
            .field("len", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::value;

    struct Owner;

    #[test]
    fn typed_access() {
        let args = Arguments::new(
            ClassRef::opaque::<Owner>(),
            Some("run"),
            vec![Some(value(7u32)), None, Some(value("x".to_string()))],
        );

        assert_eq!(*args.get::<u32>(0).unwrap(), 7);
        assert_eq!(args.get_cloned::<String>(2).unwrap(), "x");
        assert!(args.get_optional::<u32>(1).unwrap().is_none());
        assert!(args.get_optional_cloned::<u32>(5).unwrap().is_none());
    }

    #[test]
    fn missing_and_mistyped_arguments() {
        let args = Arguments::new(ClassRef::opaque::<Owner>(), None, vec![None, Some(value(1u8))]);

        let missing = args.get::<u32>(0).unwrap_err().to_string();
        assert!(missing.contains("constructor"));
        assert!(matches!(
            args.get::<u32>(1),
            Err(TesseraError::DowncastFailed { .. })
        ));
    }
}

use super::{Arguments, Fields, Injectable, InjectorFactory, Invocable, Invocation, ResolveMode};
use crate::error::{Result, TesseraError};
use crate::reflect::{ClassOps, ClassRef, Instance, MethodInfo, Value};
use std::sync::Arc;

/// An injector factory bound to one context value.
///
/// Construction order: fields and constructor arguments are resolved, the
/// constructor runs, then every resolved field value is assigned on top of
/// the constructed instance. Injected field values therefore take precedence
/// over values the constructor set; a field whose getter produced no value
/// keeps the constructor's value.
pub struct BoundFactory<C> {
    factory: Arc<InjectorFactory<C>>,
    context: C,
}

impl<C: Clone> Clone for BoundFactory<C> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            context: self.context.clone(),
        }
    }
}

impl<C: Clone + Send + Sync + 'static> BoundFactory<C> {
    pub(crate) fn new(factory: Arc<InjectorFactory<C>>, context: C) -> Self {
        Self { factory, context }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn construct<T: Injectable>(&self) -> Result<T> {
        into_typed(self.construct_class(ClassRef::of::<T>())?)
    }

    /// Construct a class from its reference.
    ///
    /// # Errors
    /// Fails with [`TesseraError::NotConstructible`] for references without
    /// construction metadata, and with any error a getter or the constructor
    /// reports.
    pub fn construct_class(&self, class: ClassRef) -> Result<Instance> {
        let ops = class.ops()?;
        let info = (ops.type_info)();
        let fields = self.factory.fields(&self.context, class)?;
        let args = self
            .factory
            .method_arguments(&self.context, class, None, &info.constructor)?;
        finish(class, ops, &args, fields)
    }

    pub async fn construct_async<T: Injectable>(&self, mode: ResolveMode) -> Result<T> {
        into_typed(self.construct_class_async(ClassRef::of::<T>(), mode).await?)
    }

    pub async fn construct_class_async(&self, class: ClassRef, mode: ResolveMode) -> Result<Instance> {
        let ops = class.ops()?;
        let info = (ops.type_info)();
        let fields = self.factory.fields_async(&self.context, class, mode);
        let args = self
            .factory
            .method_arguments_async(&self.context, class, None, &info.constructor, mode);
        let (fields, args) = match mode {
            ResolveMode::Sequential => {
                let fields = fields.await?;
                (fields, args.await?)
            }
            ResolveMode::Concurrent => futures::try_join!(fields, args)?,
        };
        finish(class, ops, &args, fields)
    }

    /// Call `method` on `instance` with every parameter injected.
    ///
    /// # Errors
    /// Async methods cannot complete here and fail with
    /// [`TesseraError::PendingInSyncContext`]; use [`BoundFactory::call_async`].
    pub fn call<T: Invocable>(&self, instance: &T, method: &'static str) -> Result<Value> {
        let class = ClassRef::opaque::<T>();
        let info = find_method::<T>(class, method)?;
        let args = self
            .factory
            .method_arguments(&self.context, class, Some(method), &info.params)?;
        match instance.invoke(method, &args)? {
            Invocation::Ready(value) => Ok(value),
            Invocation::Pending(_) => Err(TesseraError::PendingInSyncContext {
                slot: format!("{class}::{method}"),
            }),
        }
    }

    pub async fn call_async<T: Invocable>(
        &self,
        instance: &T,
        method: &'static str,
        mode: ResolveMode,
    ) -> Result<Value> {
        let class = ClassRef::opaque::<T>();
        let info = find_method::<T>(class, method)?;
        let args = self
            .factory
            .method_arguments_async(&self.context, class, Some(method), &info.params, mode)
            .await?;
        instance.invoke(method, &args)?.settle().await
    }
}

fn find_method<T: Invocable>(class: ClassRef, method: &str) -> Result<MethodInfo> {
    MethodInfo::find::<T>(method).ok_or_else(|| TesseraError::UnknownMember {
        class: class.name().to_string(),
        member: method.to_string(),
    })
}

fn finish(class: ClassRef, ops: ClassOps, args: &Arguments, fields: Fields) -> Result<Instance> {
    let mut instance = (ops.construct)(args)?;
    for (name, value) in fields {
        if let Some(value) = value {
            (ops.assign)(&mut instance, name, value)?;
        }
    }
    tracing::debug!(class = %class, "constructed instance");
    Ok(instance)
}

fn into_typed<T: Injectable>(instance: Instance) -> Result<T> {
    instance
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| TesseraError::downcast::<T>())
}

use super::getter::{Getter, GetterRepository, Registered, Slot};
use super::{Arguments, BoundFactory, Injectable, InjectorPayload, Invocable, Resolution, ResolveMode};
use crate::decorators::{Shape, Target, read, write};
use crate::error::{Result, TesseraError};
use crate::reflect::{
    ClassRef, MethodInfo, Value, extract_constructor_param_types, extract_parameter_type,
    extract_property_type,
};
use futures::future::try_join_all;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};

/// Resolved property values keyed by property name, in registration order.
pub type Fields = IndexMap<&'static str, Option<Value>>;

/// Getter used for parameter slots that have no explicit injector.
pub type DefaultInjector<C> = Arc<dyn Fn(InjectorPayload<C>) -> Result<Resolution> + Send + Sync>;

/// Getter registry of one injection domain.
pub struct InjectorFactory<C> {
    getters: RwLock<GetterRepository<C>>,
    default_injector: Option<Getter<C>>,
}

/// Create the factory of an injection domain, optionally with a default injector.
pub fn create_injector_factory<C>(default_injector: Option<DefaultInjector<C>>) -> Arc<InjectorFactory<C>>
where
    C: Clone + Send + Sync + 'static,
{
    Arc::new(InjectorFactory {
        getters: RwLock::default(),
        default_injector,
    })
}

impl<C: Clone + Send + Sync + 'static> InjectorFactory<C> {
    /// Factory without default injector: every parameter slot needs an explicit injector.
    pub fn new() -> Arc<Self> {
        create_injector_factory(None)
    }

    pub fn with_default<F>(default_injector: F) -> Arc<Self>
    where
        F: Fn(InjectorPayload<C>) -> Result<Resolution> + Send + Sync + 'static,
    {
        create_injector_factory(Some(Arc::new(default_injector)))
    }

    pub fn has_default_injector(&self) -> bool {
        self.default_injector.is_some()
    }

    /// Create an injector whose getters run `transformer` with the arguments
    /// supplied when the injector is applied to a slot.
    pub fn create_injector<A, F>(self: &Arc<Self>, transformer: F) -> Injector<C, A>
    where
        A: Send + Sync + 'static,
        F: Fn(InjectorPayload<C>, &A) -> Result<Resolution> + Send + Sync + 'static,
    {
        Injector {
            factory: self.clone(),
            transformer: Arc::new(transformer),
        }
    }

    /// Bind the factory to one context value.
    pub fn with(self: &Arc<Self>, context: C) -> BoundFactory<C> {
        BoundFactory::new(self.clone(), context)
    }

    fn register(&self, class: ClassRef, slot: Slot, declared: ClassRef, getter: Getter<C>) {
        tracing::trace!(class = %class, member = ?slot.member, index = ?slot.index, "registering getter");
        write(&self.getters).set(class, slot, Registered { declared, getter });
    }

    fn payload(
        context: &C,
        class: ClassRef,
        slot: Slot,
        declared_type: ClassRef,
        is_async: bool,
    ) -> InjectorPayload<C> {
        InjectorPayload {
            context: context.clone(),
            target: class,
            member: slot.member,
            index: slot.index,
            declared_type,
            is_async,
        }
    }

    fn resolve_parameter(
        &self,
        context: &C,
        class: ClassRef,
        method: Option<&'static str>,
        index: usize,
        declared: ClassRef,
        is_async: bool,
    ) -> Result<Resolution> {
        let slot = Slot::parameter(method, index);
        let registered = read(&self.getters).get(class, slot);
        let getter = match (registered, &self.default_injector) {
            (Some(registered), _) => registered.getter,
            (None, Some(default_injector)) => default_injector.clone(),
            (None, None) => {
                return Err(TesseraError::missing_injector(class.name(), method, index));
            }
        };
        getter(Self::payload(context, class, slot, declared, is_async))
    }

    fn resolve_properties(
        &self,
        context: &C,
        class: ClassRef,
        is_async: bool,
    ) -> Result<Vec<(&'static str, Resolution)>> {
        let properties = read(&self.getters).properties(class);
        properties
            .into_iter()
            .map(|(name, registered)| {
                let payload =
                    Self::payload(context, class, Slot::property(name), registered.declared, is_async);
                Ok((name, (registered.getter)(payload)?))
            })
            .collect()
    }

    /// Resolve every parameter of `method` (the constructor when `None`) in
    /// parameter order. `params` are the declared parameter types.
    pub fn method_arguments(
        &self,
        context: &C,
        class: ClassRef,
        method: Option<&'static str>,
        params: &[ClassRef],
    ) -> Result<Arguments> {
        let values = (0..params.len())
            .map(|index| {
                let declared = extract_parameter_type(params, index);
                self.resolve_parameter(context, class, method, index, declared, false)?
                    .into_ready(|| slot_name(class, method, Some(index)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Arguments::new(class, method, values))
    }

    pub async fn method_arguments_async(
        &self,
        context: &C,
        class: ClassRef,
        method: Option<&'static str>,
        params: &[ClassRef],
        mode: ResolveMode,
    ) -> Result<Arguments> {
        let values = match mode {
            ResolveMode::Sequential => {
                let mut values = Vec::with_capacity(params.len());
                for index in 0..params.len() {
                    let declared = extract_parameter_type(params, index);
                    let resolution =
                        self.resolve_parameter(context, class, method, index, declared, true)?;
                    values.push(resolution.settle().await?);
                }
                values
            }
            ResolveMode::Concurrent => {
                let resolutions = (0..params.len())
                    .map(|index| {
                        let declared = extract_parameter_type(params, index);
                        self.resolve_parameter(context, class, method, index, declared, true)
                    })
                    .collect::<Result<Vec<_>>>()?;
                try_join_all(resolutions.into_iter().map(Resolution::settle)).await?
            }
        };
        Ok(Arguments::new(class, method, values))
    }

    /// Resolve every property of `class` that has an explicit injector.
    pub fn fields(&self, context: &C, class: ClassRef) -> Result<Fields> {
        self.resolve_properties(context, class, false)?
            .into_iter()
            .map(|(name, resolution)| {
                let value = resolution.into_ready(|| slot_name(class, Some(name), None))?;
                Ok((name, value))
            })
            .collect()
    }

    pub async fn fields_async(&self, context: &C, class: ClassRef, mode: ResolveMode) -> Result<Fields> {
        let mut fields = Fields::new();
        match mode {
            ResolveMode::Sequential => {
                let properties = read(&self.getters).properties(class);
                for (name, registered) in properties {
                    let payload =
                        Self::payload(context, class, Slot::property(name), registered.declared, true);
                    let value = (registered.getter)(payload)?.settle().await?;
                    fields.insert(name, value);
                }
            }
            ResolveMode::Concurrent => {
                let (names, resolutions): (Vec<_>, Vec<_>) =
                    self.resolve_properties(context, class, true)?.into_iter().unzip();
                let values = try_join_all(resolutions.into_iter().map(Resolution::settle)).await?;
                fields.extend(names.into_iter().zip(values));
            }
        }
        Ok(fields)
    }
}

fn slot_name(class: ClassRef, member: Option<&str>, index: Option<usize>) -> String {
    match index {
        Some(index) => format!("{}::{}[{}]", class, member.unwrap_or("constructor"), index),
        None => format!("{}::{}", class, member.unwrap_or("constructor")),
    }
}

/// Binds getters of one injection domain to slots.
///
/// `A` is the argument type supplied at each application; the transformer
/// receives it by reference every time the slot is resolved.
pub struct Injector<C, A> {
    factory: Arc<InjectorFactory<C>>,
    transformer: Arc<dyn Fn(InjectorPayload<C>, &A) -> Result<Resolution> + Send + Sync>,
}

impl<C, A> Clone for Injector<C, A> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            transformer: self.transformer.clone(),
        }
    }
}

impl<C: Clone + Send + Sync + 'static, A: Send + Sync + 'static> Injector<C, A> {
    /// Bind a getter to a parameter or property target.
    ///
    /// # Errors
    /// Class and method targets carry no value and are rejected with
    /// [`TesseraError::InvalidTarget`].
    pub fn apply(&self, target: Target, args: A) -> Result<()> {
        let class = target.class;
        match target.shape()? {
            Shape::Class => Err(TesseraError::InvalidTarget {
                message: format!("injectors cannot be applied to class [{class}]"),
            }),
            Shape::Method(method) => Err(TesseraError::InvalidTarget {
                message: format!(
                    "injectors cannot be applied to method [{}] of [{class}], only to its parameters",
                    method.name
                ),
            }),
            Shape::Property(name) => {
                self.bind(class, Slot::property(name), extract_property_type(class, name), args);
                Ok(())
            }
            Shape::Parameter(method, index) => {
                let declared = match method {
                    None => extract_parameter_type(&extract_constructor_param_types(class), index),
                    Some(_) => ClassRef::object(),
                };
                self.bind(class, Slot::parameter(method, index), declared, args);
                Ok(())
            }
        }
    }

    pub fn constructor_param<T: Injectable>(&self, index: usize, args: A) {
        let class = ClassRef::of::<T>();
        let declared = extract_parameter_type(&extract_constructor_param_types(class), index);
        self.bind(class, Slot::parameter(None, index), declared, args);
    }

    pub fn method_param<T: Invocable>(&self, method: &'static str, index: usize, args: A) {
        let params = MethodInfo::find::<T>(method)
            .map(|m| m.params)
            .unwrap_or_default();
        let declared = extract_parameter_type(&params, index);
        self.bind(ClassRef::opaque::<T>(), Slot::parameter(Some(method), index), declared, args);
    }

    pub fn property<T: Injectable>(&self, name: &'static str, args: A) {
        let class = ClassRef::of::<T>();
        self.bind(class, Slot::property(name), extract_property_type(class, name), args);
    }

    fn bind(&self, class: ClassRef, slot: Slot, declared: ClassRef, args: A) {
        let transformer = self.transformer.clone();
        let getter: Getter<C> = Arc::new(move |payload| transformer(payload, &args));
        self.factory.register(class, slot, declared, getter);
    }
}

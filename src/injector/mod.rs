//! Injector engine and construction engine.
//!
//! An [`InjectorFactory`] owns the getters of one injection domain, i.e. one
//! context type `C`. [`Injector`]s created from it bind getters to
//! constructor parameters, method parameters and properties. Binding the
//! factory to a context value with [`InjectorFactory::with`] yields a
//! [`BoundFactory`] that constructs classes and calls methods with every slot
//! resolved through those getters.

mod arguments;
mod bound;
mod factory;
mod getter;
mod injectable;

pub use arguments::Arguments;
pub use bound::BoundFactory;
pub use factory::{Fields, Injector, InjectorFactory, create_injector_factory};
pub use injectable::{Initializable, Injectable, Invocable, Invocation};

use crate::error::{Result, TesseraError};
use crate::reflect::{ClassRef, Value};
use futures::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use strum_macros::{Display, EnumString};

/// What a getter produced for one slot.
pub enum Resolution {
    /// Available now. `None` means the getter has no value for the slot.
    Ready(Option<Value>),
    /// Available once the future completes; only usable on async paths.
    Pending(BoxFuture<'static, Result<Option<Value>>>),
}

impl Resolution {
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Resolution::Ready(Some(crate::reflect::value(value)))
    }

    pub fn raw(value: Value) -> Self {
        Resolution::Ready(Some(value))
    }

    pub fn none() -> Self {
        Resolution::Ready(None)
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        Resolution::Pending(Box::pin(future))
    }

    pub(crate) fn into_ready(self, slot: impl FnOnce() -> String) -> Result<Option<Value>> {
        match self {
            Resolution::Ready(value) => Ok(value),
            Resolution::Pending(_) => Err(TesseraError::PendingInSyncContext { slot: slot() }),
        }
    }

    pub async fn settle(self) -> Result<Option<Value>> {
        match self {
            Resolution::Ready(value) => Ok(value),
            Resolution::Pending(future) => future.await,
        }
    }
}

/// Everything a getter knows about the slot it resolves.
#[derive(Clone)]
pub struct InjectorPayload<C> {
    pub context: C,
    pub target: ClassRef,
    /// Method or property name; `None` for constructor parameters.
    pub member: Option<&'static str>,
    /// Parameter position; `None` for properties.
    pub index: Option<usize>,
    pub declared_type: ClassRef,
    pub is_async: bool,
}

impl<C> InjectorPayload<C> {
    pub fn is_property(&self) -> bool {
        self.index.is_none()
    }

    pub fn is_parameter(&self) -> bool {
        self.index.is_some()
    }
}

/// How the async paths resolve the slots of one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResolveMode {
    /// All slots are awaited together; results keep slot order.
    #[default]
    Concurrent,
    /// Each slot completes before the next one starts.
    Sequential,
}

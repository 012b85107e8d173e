use super::Arguments;
use crate::error::{Result, TesseraError};
use crate::reflect::{MethodInfo, TypeInfo, Value};
use async_trait::async_trait;
use futures::future::BoxFuture;

/// A type the construction engine can build.
///
/// Usually derived with `#[derive(Injectable)]`, which lists every named
/// field as a constructor parameter and `#[property]` fields as injectable
/// properties.
///
/// # Example
/// ```
/// use tessera::Injectable;
/// use std::sync::Arc;
///
/// #[derive(Injectable)]
/// struct Repository;
///
/// #[derive(Injectable)]
/// struct UserService {
///     repository: Arc<Repository>,
///     #[property]
///     label: String,
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Constructor parameter types and injectable properties.
    fn type_info() -> TypeInfo;

    /// Build an instance from resolved constructor arguments.
    ///
    /// # Errors
    /// Returns an error when a required argument is missing or has the wrong type.
    fn construct(args: &Arguments) -> Result<Self>;

    /// Overwrite property `property` with an injected value.
    fn assign(&mut self, property: &str, value: Value) -> Result<()> {
        let _ = value;
        Err(TesseraError::UnknownMember {
            class: std::any::type_name::<Self>().to_string(),
            member: property.to_string(),
        })
    }

    /// Post-construction hook, awaited by the async container path.
    fn initializer(&self) -> Option<&dyn Initializable> {
        None
    }
}

#[async_trait]
pub trait Initializable: Send + Sync {
    async fn init(&self) -> Result<()>;
}

/// A type whose methods can be called with injected arguments.
///
/// Generated by `#[invocable]` on an inherent `impl` block.
pub trait Invocable: Send + Sync + 'static {
    fn methods() -> Vec<MethodInfo>;

    fn invoke<'a>(&'a self, method: &str, args: &Arguments) -> Result<Invocation<'a>>;
}

/// Outcome of dispatching a method by name.
pub enum Invocation<'a> {
    Ready(Value),
    Pending(BoxFuture<'a, Result<Value>>),
}

impl<'a> Invocation<'a> {
    pub async fn settle(self) -> Result<Value> {
        match self {
            Invocation::Ready(value) => Ok(value),
            Invocation::Pending(future) => future.await,
        }
    }
}

use proc_macro::TokenStream;

mod injectable;
mod invocable;
mod slot;

/// Derive macro generating the type table and constructor of a struct
///
/// Every named field is a constructor parameter, in declaration order.
/// Fields tagged `#[property]` start from `Default` and are filled by
/// property injectors instead. `Arc<T>` fields are shared instances of `T`,
/// `Option<..>` fields are optional, any other field type is cloned out of
/// the injected value. Fields tagged `#[injectable(default)]` are neither
/// parameters nor properties and always start from `Default`.
/// `#[injectable(init)]` exposes the type's `Initializable` implementation
/// to the container.
///
/// # Example
/// ```ignore
/// use tessera::Injectable;
/// use std::sync::Arc;
///
/// #[derive(Injectable)]
/// #[injectable(init)]
/// pub struct UserService {
///     repository: Arc<UserRepository>,
///     #[property]
///     page_size: usize,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, property))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro generating the method table and by-name dispatch of an
/// impl block
///
/// Every `&self` method becomes invocable with injected arguments; `async`
/// methods dispatch as pending invocations. Return values must be
/// `Send + Sync + 'static`, and so must the futures of `async` methods.
///
/// # Example
/// ```ignore
/// #[invocable]
/// impl UserController {
///     pub fn count(&self, repository: Arc<UserRepository>) -> usize {
///         repository.len()
///     }
///
///     pub async fn find(&self, id: u64) -> Option<User> {
///         self.service.find(id).await
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn invocable(attr: TokenStream, item: TokenStream) -> TokenStream {
    invocable::invocable_attribute(attr, item)
}

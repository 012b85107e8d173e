use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

/// How a field or parameter type is read from resolved arguments.
pub enum Slot {
    /// `Arc<X>` with a sized `X`: shared instance of `X`.
    Shared(Type),
    /// `Option<Arc<X>>`: optional shared instance of `X`.
    OptionalShared(Type),
    /// `&X`: borrowed from a shared instance of `X`.
    Borrowed(Type),
    /// `Option<T>`: optional cloned value of `T`.
    OptionalValue(Type),
    /// Any other `T`, cloned out of the argument.
    Value(Type),
}

impl Slot {
    pub fn classify(ty: &Type) -> Self {
        if let Type::Reference(reference) = ty {
            return Slot::Borrowed((*reference.elem).clone());
        }
        if let Some(inner) = generic_argument(ty, "Arc") {
            if !matches!(inner, Type::TraitObject(_)) {
                return Slot::Shared(inner);
            }
        }
        if let Some(inner) = generic_argument(ty, "Option") {
            return match generic_argument(&inner, "Arc") {
                Some(shared) if !matches!(shared, Type::TraitObject(_)) => Slot::OptionalShared(shared),
                _ => Slot::OptionalValue(inner),
            };
        }
        Slot::Value(ty.clone())
    }

    /// The type the slot declares to the engine.
    pub fn declared(&self) -> &Type {
        match self {
            Slot::Shared(ty)
            | Slot::OptionalShared(ty)
            | Slot::Borrowed(ty)
            | Slot::OptionalValue(ty)
            | Slot::Value(ty) => ty,
        }
    }

    /// Class reference of the declared type.
    pub fn declared_class(&self) -> TokenStream2 {
        let ty = self.declared();
        quote!((&::tessera::reflect::Declared::<#ty>::new()).declared())
    }

    /// Expression reading argument `index` out of `args`.
    pub fn read(&self, index: usize) -> TokenStream2 {
        match self {
            Slot::Shared(ty) | Slot::Borrowed(ty) => quote!(args.get::<#ty>(#index)?),
            Slot::OptionalShared(ty) => quote!(args.get_optional::<#ty>(#index)?),
            Slot::OptionalValue(ty) => quote!(args.get_optional_cloned::<#ty>(#index)?),
            Slot::Value(ty) => quote!(args.get_cloned::<#ty>(#index)?),
        }
    }

    /// Expression converting the `value` variable into the slot type.
    pub fn convert(&self) -> TokenStream2 {
        match self {
            Slot::Shared(ty) | Slot::Borrowed(ty) => {
                quote!(::tessera::reflect::downcast_value::<#ty>(value)?)
            }
            Slot::OptionalShared(ty) => {
                quote!(::std::option::Option::Some(::tessera::reflect::downcast_value::<#ty>(value)?))
            }
            Slot::OptionalValue(ty) => quote! {
                ::std::option::Option::Some(
                    <#ty as ::std::clone::Clone>::clone(&*::tessera::reflect::downcast_value::<#ty>(value)?)
                )
            },
            Slot::Value(ty) => quote! {
                <#ty as ::std::clone::Clone>::clone(&*::tessera::reflect::downcast_value::<#ty>(value)?)
            },
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, Slot::Borrowed(_))
    }
}

/// `T` when `ty` is `Name<T>`.
fn generic_argument(ty: &Type, name: &str) -> Option<Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner.clone()),
        _ => None,
    }
}

/// Imports that make `Declared::declared` resolve.
pub fn declared_imports() -> TokenStream2 {
    quote! {
        #[allow(unused_imports)]
        use ::tessera::reflect::{DeclaredClass as _, DeclaredOpaque as _};
    }
}

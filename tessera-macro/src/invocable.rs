use crate::slot::{Slot, declared_imports};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, ReturnType, parse_macro_input};

/// A `&self` method exposed through the method table.
struct InvocableMethod<'a> {
    method: &'a ImplItemFn,
    params: Vec<Slot>,
}

pub fn invocable_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);

    generate_invocable_impl(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_invocable_impl(input: &ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[invocable] must be placed on an inherent impl block",
        ));
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let methods: Vec<InvocableMethod> = input
        .items
        .iter()
        .filter_map(|item| match item {
            ImplItem::Fn(method) if takes_shared_self(method) => Some(method),
            _ => None,
        })
        .map(|method| InvocableMethod {
            method,
            params: method
                .sig
                .inputs
                .iter()
                .filter_map(|arg| match arg {
                    FnArg::Typed(pat) => Some(Slot::classify(&pat.ty)),
                    FnArg::Receiver(_) => None,
                })
                .collect(),
        })
        .collect();

    let table = methods.iter().map(|m| {
        let name = m.method.sig.ident.to_string();
        let params = m.params.iter().map(Slot::declared_class);
        let returns = match &m.method.sig.output {
            ReturnType::Default => quote!(::tessera::reflect::ClassRef::opaque::<()>()),
            ReturnType::Type(_, ty) => quote!((&::tessera::reflect::Declared::<#ty>::new()).declared()),
        };
        quote! {
            ::tessera::reflect::MethodInfo::new(#name, ::std::vec![#(#params),*], #returns)
        }
    });

    let arms = methods.iter().map(|m| {
        let ident = &m.method.sig.ident;
        let name = ident.to_string();
        let bindings: Vec<_> = (0..m.params.len()).map(|i| format_ident!("arg{}", i)).collect();
        let reads = m.params.iter().enumerate().map(|(i, slot)| {
            let binding = &bindings[i];
            let read = slot.read(i);
            quote!(let #binding = #read;)
        });
        let call_args = m.params.iter().zip(&bindings).map(|(slot, binding)| {
            if slot.is_borrowed() {
                quote!(&#binding)
            } else {
                quote!(#binding)
            }
        });
        let invocation = if m.method.sig.asyncness.is_some() {
            quote! {
                ::tessera::injector::Invocation::Pending(::std::boxed::Box::pin(async move {
                    ::std::result::Result::Ok(::tessera::value(self.#ident(#(#call_args),*).await))
                }))
            }
        } else {
            quote! {
                ::tessera::injector::Invocation::Ready(::tessera::value(self.#ident(#(#call_args),*)))
            }
        };
        quote! {
            #name => {
                #(#reads)*
                ::std::result::Result::Ok(#invocation)
            }
        }
    });

    let declared_imports = declared_imports();

    Ok(quote! {
        #input

        impl #impl_generics ::tessera::injector::Invocable for #self_ty #where_clause {
            fn methods() -> ::std::vec::Vec<::tessera::reflect::MethodInfo> {
                #declared_imports
                ::std::vec![#(#table),*]
            }

            #[allow(unused_variables)]
            fn invoke<'tessera>(
                &'tessera self,
                method: &str,
                args: &::tessera::injector::Arguments,
            ) -> ::tessera::Result<::tessera::injector::Invocation<'tessera>> {
                match method {
                    #(#arms)*
                    _ => ::std::result::Result::Err(::tessera::TesseraError::UnknownMember {
                        class: ::std::any::type_name::<Self>().to_string(),
                        member: method.to_string(),
                    }),
                }
            }
        }
    })
}

fn takes_shared_self(method: &ImplItemFn) -> bool {
    match method.sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) => receiver.reference.is_some() && receiver.mutability.is_none(),
        _ => false,
    }
}

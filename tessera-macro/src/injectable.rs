use crate::slot::{Slot, declared_imports};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, parse_macro_input};

struct FieldSlot {
    ident: Ident,
    slot: Slot,
    kind: FieldKind,
}

#[derive(PartialEq)]
enum FieldKind {
    /// Constructor parameter.
    Parameter,
    /// `#[property]`: starts from `Default`, filled by property injectors.
    Property,
    /// `#[injectable(default)]`: starts from `Default`, never injected.
    Default,
}

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    generate_injectable_impl(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let with_init = parse_struct_attrs(input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .map(|field| {
                    Ok(FieldSlot {
                        ident: field
                            .ident
                            .clone()
                            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?,
                        slot: match Slot::classify(&field.ty) {
                            // `&'static T` fields hold the reference itself.
                            Slot::Borrowed(_) => Slot::Value(field.ty.clone()),
                            slot => slot,
                        },
                        kind: parse_field_attrs(field)?,
                    })
                })
                .collect::<syn::Result<Vec<_>>>()?,
            Fields::Unit => Vec::new(),
            Fields::Unnamed(fields) => {
                return Err(syn::Error::new_spanned(
                    fields,
                    "#[derive(Injectable)] only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] can only be applied to structs",
            ));
        }
    };

    let constructor: Vec<&FieldSlot> = fields
        .iter()
        .filter(|f| f.kind == FieldKind::Parameter)
        .collect();
    let properties: Vec<&FieldSlot> = fields
        .iter()
        .filter(|f| f.kind == FieldKind::Property)
        .collect();

    let constructor_types = constructor.iter().map(|f| f.slot.declared_class());
    let property_entries = properties.iter().map(|f| {
        let name = f.ident.to_string();
        let declared = f.slot.declared_class();
        quote!(.with_property(#name, #declared))
    });

    let construct_body = if matches!(&input.data, Data::Struct(data) if matches!(data.fields, Fields::Unit)) {
        quote!(::std::result::Result::Ok(Self))
    } else {
        let initializers = fields.iter().map(|f| {
            let ident = &f.ident;
            if f.kind != FieldKind::Parameter {
                quote!(#ident: ::std::default::Default::default())
            } else {
                let index = constructor
                    .iter()
                    .position(|c| c.ident == f.ident)
                    .unwrap_or_default();
                let read = f.slot.read(index);
                quote!(#ident: #read)
            }
        });
        quote!(::std::result::Result::Ok(Self { #(#initializers),* }))
    };

    let assign_arms = fields.iter().filter(|f| f.kind != FieldKind::Default).map(|f| {
        let ident = &f.ident;
        let name = ident.to_string();
        let convert = f.slot.convert();
        quote! {
            #name => {
                self.#ident = #convert;
                ::std::result::Result::Ok(())
            }
        }
    });

    let initializer = with_init.then(|| {
        quote! {
            fn initializer(&self) -> ::std::option::Option<&dyn ::tessera::injector::Initializable> {
                ::std::option::Option::Some(self)
            }
        }
    });

    let declared_imports = declared_imports();

    Ok(quote! {
        impl #impl_generics ::tessera::injector::Injectable for #struct_name #ty_generics #where_clause {
            fn type_info() -> ::tessera::reflect::TypeInfo {
                #declared_imports
                ::tessera::reflect::TypeInfo::new(::std::vec![#(#constructor_types),*])
                    #(#property_entries)*
            }

            #[allow(unused_variables)]
            fn construct(
                args: &::tessera::injector::Arguments
            ) -> ::tessera::Result<Self> {
                #construct_body
            }

            #[allow(unused_variables, unreachable_code)]
            fn assign(
                &mut self,
                property: &str,
                value: ::tessera::reflect::Value,
            ) -> ::tessera::Result<()> {
                match property {
                    #(#assign_arms)*
                    _ => ::std::result::Result::Err(::tessera::TesseraError::UnknownMember {
                        class: ::std::any::type_name::<Self>().to_string(),
                        member: property.to_string(),
                    }),
                }
            }

            #initializer
        }
    })
}

/// `#[injectable(init)]` enables the initialization hook.
fn parse_struct_attrs(input: &DeriveInput) -> syn::Result<bool> {
    let mut with_init = false;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("injectable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("init") {
                with_init = true;
                Ok(())
            } else {
                Err(meta.error("unsupported injectable option, expected `init`"))
            }
        })?;
    }
    Ok(with_init)
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldKind> {
    let mut kind = FieldKind::Parameter;
    for attr in &field.attrs {
        if attr.path().is_ident("property") {
            kind = FieldKind::Property;
        } else if attr.path().is_ident("injectable") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    kind = FieldKind::Default;
                    Ok(())
                } else {
                    Err(meta.error("unsupported field option, expected `default`"))
                }
            })?;
        }
    }
    Ok(kind)
}

//! Derive macro implementation for envarfig

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

mod attrs;

use attrs::FieldAttrs;

/// `EnvBind` derive macro
///
/// Implements `envarfig::EnvBind` by binding every named field, in
/// declaration order, from its `#[env(...)]` annotation.
///
/// # Field Attributes
///
/// - `#[env("NAME")]`: Bind from the `NAME` environment variable
/// - `#[env("NAME,required")]`: Fail if `NAME` is unset and there is no default
/// - `#[env("NAME,default=value")]`: Text used when `NAME` is unset
/// - `#[env("NAME,delimiter=';'")]`: Separator for sequences and maps
/// - `#[env("NAME,isstring")]`: Take `Vec<u8>` / `Vec<char>` from the raw text
///
/// A field without an annotation fails at bind time with
/// `BindError::MissingAnnotation`, before any field is bound.
///
/// The derived type can not itself be used as a field of another record;
/// binding such a field fails with `BindError::UnsupportedShape`.
///
/// # Example
///
/// See the `envarfig` crate documentation for usage examples.
#[proc_macro_derive(EnvBind, attributes(env))]
pub fn derive_env_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    // Struct name
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Extract fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "EnvBind only supports structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "EnvBind only supports structs")
                .to_compile_error()
                .into();
        }
    };

    // Generate one binder call per field
    let mut annotation_checks = Vec::new();
    let mut field_binders = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = match FieldAttrs::from_field(field) {
            Ok(attrs) => attrs,
            Err(e) => return e.to_compile_error().into(),
        };

        let field_name = field_ident.unraw().to_string();
        let annotation = attrs.annotation;

        if annotation.is_empty() {
            annotation_checks.push(quote! {
                ::envarfig::Binder::check_annotation(#field_name, "")?;
            });
        }

        field_binders.push(quote! {
            binder.field(#field_name, #annotation, &mut self.#field_ident)?;
        });
    }

    let expanded = quote! {
        impl #impl_generics ::envarfig::EnvBind for #struct_name #ty_generics #where_clause {
            fn bind_fields(
                &mut self,
                binder: &::envarfig::Binder<'_>,
            ) -> ::core::result::Result<(), ::envarfig::BindError> {
                #(#annotation_checks)*
                #(#field_binders)*
                ::core::result::Result::Ok(())
            }
        }

        // Records do not nest: used as a field, element, key or value they
        // fail with an unsupported shape error.
        impl #impl_generics ::envarfig::FieldValue for #struct_name #ty_generics #where_clause {
            fn check_shape(name: &str) -> ::core::result::Result<(), ::envarfig::BindError> {
                ::core::result::Result::Err(::envarfig::BindError::unsupported::<Self>(name))
            }

            fn coerce(
                _text: &str,
                field: &::envarfig::FieldDescriptor,
            ) -> ::core::result::Result<Self, ::envarfig::BindError> {
                ::core::result::Result::Err(::envarfig::BindError::unsupported::<Self>(&field.name))
            }

            fn zero(name: &str) -> ::core::result::Result<Self, ::envarfig::BindError> {
                ::core::result::Result::Err(::envarfig::BindError::unsupported::<Self>(name))
            }
        }

        impl #impl_generics ::envarfig::Element for #struct_name #ty_generics #where_clause {
            fn check_shape(name: &str) -> ::core::result::Result<(), ::envarfig::BindError> {
                ::core::result::Result::Err(::envarfig::BindError::unsupported::<Self>(name))
            }

            fn parse_element(
                _text: &str,
                name: &str,
            ) -> ::core::result::Result<Self, ::envarfig::BindError> {
                ::core::result::Result::Err(::envarfig::BindError::unsupported::<Self>(name))
            }

            fn zero(name: &str) -> ::core::result::Result<Self, ::envarfig::BindError> {
                ::core::result::Result::Err(::envarfig::BindError::unsupported::<Self>(name))
            }
        }
    };

    TokenStream::from(expanded)
}

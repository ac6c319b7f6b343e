//! Attribute parsing for `#[env(...)]` annotations.
//!
//! The annotation string itself is interpreted at bind time by
//! `envarfig::FieldDescriptor::parse`; here it is only extracted.

use syn::{Attribute, Expr, ExprLit, Field, Lit, LitStr, Meta};

/// The `#[env(...)]` annotation of a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Raw annotation text.
    ///
    /// Empty when the field has no `#[env]` attribute or a bare `#[env]`;
    /// binding such a field fails with a missing annotation error.
    pub annotation: String,
}

impl FieldAttrs {
    /// Extract the annotation from a struct field.
    ///
    /// Accepts `#[env("NAME,...")]` and `#[env = "NAME,..."]`. Attributes
    /// with other names are left for other macros.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }
            attrs.annotation = parse_annotation(attr)?;
        }

        Ok(attrs)
    }
}

fn parse_annotation(attr: &Attribute) -> syn::Result<String> {
    match &attr.meta {
        // #[env]
        Meta::Path(_) => Ok(String::new()),

        // #[env("NAME,required")]
        Meta::List(_) => {
            let lit: LitStr = attr.parse_args()?;
            Ok(lit.value())
        }

        // #[env = "NAME,required"]
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => Ok(lit.value()),
            other => Err(syn::Error::new_spanned(
                other,
                "env annotation must be a string literal",
            )),
        },
    }
}

use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use syn::{Attribute, Lit, LitStr, Meta, MetaNameValue};

/// Collects the trait names listed in `#[derive(...)]` attributes, by last path segment.
pub fn derived_trait_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                traits.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    traits
}

pub fn expect_name_value(meta: Meta) -> Result<MetaNameValue, TokenStream> {
    match meta {
        Meta::NameValue(name_value) => Ok(name_value),
        other => Err(syn::Error::new_spanned(
            other,
            "Expected name-value arguments like `rename_all = \"...\"`",
        )
        .to_compile_error()),
    }
}

pub fn parse_string_literal(name_value: &MetaNameValue, label: &str) -> Result<LitStr, TokenStream> {
    if let syn::Expr::Lit(expr_lit) = &name_value.value
        && let Lit::Str(lit) = &expr_lit.lit
    {
        return Ok(lit.clone());
    }
    Err(syn::Error::new_spanned(&name_value.value, format!("{label} must be a string literal"))
        .to_compile_error())
}

pub fn parse_path(name_value: &MetaNameValue, label: &str) -> Result<syn::Path, TokenStream> {
    if let syn::Expr::Path(expr_path) = &name_value.value {
        return Ok(expr_path.path.clone());
    }
    Err(syn::Error::new_spanned(&name_value.value, format!("{label} must be a path"))
        .to_compile_error())
}

pub fn set_once<T>(current: Option<T>, token: &MetaNameValue, value: T) -> Result<T, TokenStream> {
    if current.is_some() {
        return Err(syn::Error::new_spanned(token, "Duplicate argument").to_compile_error());
    }
    Ok(value)
}

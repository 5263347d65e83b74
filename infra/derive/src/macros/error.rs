use crate::macros::args::derived_trait_names;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, Ident, Type, Variant};

/// What the expansion needs to know about one error variant.
struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfgs: Vec<&'a Attribute>,
}

impl ErrorVariant<'_> {
    fn is_internal(&self) -> bool {
        self.ident == "Internal"
    }
}

pub fn expand_error(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let ext_trait = format_ident!("{}Ext", name);

    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "elim_error can only be applied to enums")
            .to_compile_error();
    };

    let variants = match data.variants.iter().map(inspect_variant).collect::<Result<Vec<_>, _>>() {
        Ok(variants) => variants,
        Err(err) => return err,
    };

    let derives = missing_derives(&input.attrs);
    let ext_impl = expand_ext_trait(name, &ext_trait, &variants);
    let source_impls = variants
        .iter()
        .filter(|variant| !variant.is_internal())
        .filter_map(|variant| expand_source_impls(name, &ext_trait, variant));
    let internal_impls = variants
        .iter()
        .find(|variant| variant.is_internal())
        .map(|variant| expand_internal_impls(name, variant));

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #derives
        #input

        #ext_impl
        #(#source_impls)*
        #internal_impls

        #[allow(dead_code)]
        fn format_context(context: &Option<::std::borrow::Cow<'static, str>>) -> ::std::borrow::Cow<'static, str> {
            match context {
                Some(context) => ::std::borrow::Cow::Owned(format!(" ({context})")),
                None => ::std::borrow::Cow::Borrowed(""),
            }
        }
    }
}

fn missing_derives(attrs: &[Attribute]) -> TokenStream {
    let present = derived_trait_names(attrs);
    let mut missing = Vec::new();
    if !present.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !present.contains("Error") {
        missing.push(quote! { ::thiserror::Error });
    }
    if missing.is_empty() {
        return quote! {};
    }
    quote! { #[derive(#(#missing),*)] }
}

fn inspect_variant(variant: &Variant) -> Result<ErrorVariant<'_>, TokenStream> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            variant,
            "elim_error requires named fields so source and context can be wired",
        )
        .to_compile_error());
    };

    let has_context = context_field(fields)?.is_some();
    let source = source_field(fields).and_then(|field| field.ident.as_ref().map(|ident| (ident, &field.ty)));

    if source.is_some() && !has_context {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "elim_error requires `context: Option<Cow<'static, str>>` next to a source field",
        )
        .to_compile_error());
    }

    Ok(ErrorVariant {
        ident: &variant.ident,
        source,
        has_context,
        cfgs: variant.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).collect(),
    })
}

fn context_field(fields: &FieldsNamed) -> Result<Option<&Field>, TokenStream> {
    let Some(field) = fields.named.iter().find(|field| field.ident.as_ref().is_some_and(|i| i == "context"))
    else {
        return Ok(None);
    };
    if is_optional_static_cow(&field.ty) {
        Ok(Some(field))
    } else {
        Err(syn::Error::new_spanned(&field.ty, "context field must be Option<Cow<'static, str>>")
            .to_compile_error())
    }
}

fn source_field(fields: &FieldsNamed) -> Option<&Field> {
    fields.named.iter().find(|field| {
        field.ident.as_ref().is_some_and(|ident| ident == "source")
            || field.attrs.iter().any(|attr| attr.path().is_ident("source") || attr.path().is_ident("from"))
    })
}

fn expand_ext_trait(name: &Ident, ext_trait: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let arms = variants.iter().filter(|variant| variant.has_context).map(|variant| {
        let cfgs = &variant.cfgs;
        let ident = variant.ident;
        quote! { #(#cfgs)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });

    quote! {
        pub trait #ext_trait<T> {
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext_trait<T> for ::std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #(#arms)*
                        _ => {}
                    }
                    err
                })
            }
        }
    }
}

fn expand_source_impls(name: &Ident, ext_trait: &Ident, variant: &ErrorVariant<'_>) -> Option<TokenStream> {
    let (field, ty) = variant.source?;
    let ident = variant.ident;
    let cfgs = &variant.cfgs;

    Some(quote! {
        #(#cfgs)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self {
                Self::#ident { #field, context: None }
            }
        }

        #(#cfgs)*
        #[automatically_derived]
        impl<T> #ext_trait<T> for ::std::result::Result<T, #ty> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn expand_internal_impls(name: &Ident, variant: &ErrorVariant<'_>) -> TokenStream {
    let cfgs = &variant.cfgs;

    quote! {
        #(#cfgs)*
        #[automatically_derived]
        impl From<&'static str> for #name {
            #[inline]
            fn from(message: &'static str) -> Self {
                Self::Internal { message: ::std::borrow::Cow::Borrowed(message), context: None }
            }
        }

        #(#cfgs)*
        #[automatically_derived]
        impl From<String> for #name {
            #[inline]
            fn from(message: String) -> Self {
                Self::Internal { message: ::std::borrow::Cow::Owned(message), context: None }
            }
        }
    }
}

/// Matches `Option<Cow<'static, str>>` by last path segments.
fn is_optional_static_cow(ty: &Type) -> bool {
    let Some(cow) = single_generic(ty, "Option").and_then(|args| match args.first() {
        Some(syn::GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }) else {
        return false;
    };
    let Some(args) = single_generic(cow, "Cow") else {
        return false;
    };
    let mut args = args.iter();
    let lifetime_ok = matches!(args.next(), Some(syn::GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let str_ok = matches!(
        args.next(),
        Some(syn::GenericArgument::Type(Type::Path(path)))
            if path.path.segments.last().is_some_and(|seg| seg.ident == "str")
    );
    lifetime_ok && str_ok
}

fn single_generic<'a>(
    ty: &'a Type,
    outer: &str,
) -> Option<&'a syn::punctuated::Punctuated<syn::GenericArgument, syn::Token![,]>> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != outer {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => Some(&args.args),
        _ => None,
    }
}

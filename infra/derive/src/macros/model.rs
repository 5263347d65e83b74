use crate::macros::args::{derived_trait_names, expect_name_value, parse_path, parse_string_literal, set_once};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::parse::Parser;
use syn::{Expr, Field, Fields, Ident, ItemStruct, LitStr, Meta, Path, Type};

/// Property naming policy applied to field names.
#[derive(Clone, Copy)]
enum Naming {
    Camel,
    Snake,
    Kebab,
}

impl Naming {
    fn from_lit(lit: &LitStr) -> Result<Self, TokenStream> {
        match lit.value().as_str() {
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "kebab-case" => Ok(Self::Kebab),
            _ => Err(syn::Error::new_spanned(
                lit,
                "rename_all must be one of camelCase, snake_case or kebab-case",
            )
            .to_compile_error()),
        }
    }

    fn apply(self, field: &str) -> String {
        match self {
            Self::Snake => field.to_owned(),
            Self::Kebab => field.replace('_', "-"),
            Self::Camel => {
                let mut out = String::with_capacity(field.len());
                for (idx, part) in field.split('_').filter(|part| !part.is_empty()).enumerate() {
                    if idx == 0 {
                        out.push_str(part);
                    } else {
                        out.push_str(&capitalize(part));
                    }
                }
                out
            },
        }
    }
}

struct ModelArgs {
    naming: Naming,
    validate: Option<Path>,
}

struct ModelField {
    ident: Ident,
    ty: Type,
    property: String,
    default: Option<Expr>,
    copy: bool,
}

pub fn expand_model(args: TokenStream, mut input: ItemStruct) -> TokenStream {
    let args = match parse_args(args) {
        Ok(args) => args,
        Err(err) => return err,
    };
    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "value_model does not support generic structs")
            .to_compile_error();
    }
    let Fields::Named(named) = &mut input.fields else {
        return syn::Error::new_spanned(&input.ident, "value_model requires a struct with named fields")
            .to_compile_error();
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &mut named.named {
        match inspect_field(field, args.naming) {
            Ok(model_field) => fields.push(model_field),
            Err(err) => return err,
        }
        field.attrs.retain(|attr| !attr.path().is_ident("model"));
    }

    let derive_debug = if derived_trait_names(&input.attrs).contains("Debug") {
        quote! {}
    } else {
        quote! { #[derive(Debug)] }
    };

    let builder_items = expand_builder(&input, &fields, args.validate.as_ref());
    let accessor_items = expand_accessors(&input, &fields);
    let contract_items = expand_contract(&input, &fields);

    quote! {
        #derive_debug
        #input

        #builder_items
        #accessor_items
        #contract_items
    }
}

fn parse_args(args: TokenStream) -> Result<ModelArgs, TokenStream> {
    let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
    let metas = parser.parse2(args).map_err(|err| err.to_compile_error())?;

    let mut naming = None;
    let mut validate = None;

    for meta in metas {
        let name_value = expect_name_value(meta)?;
        if name_value.path.is_ident("rename_all") {
            let lit = parse_string_literal(&name_value, "rename_all")?;
            naming = Some(set_once(naming, &name_value, Naming::from_lit(&lit)?)?);
        } else if name_value.path.is_ident("validate") {
            let path = parse_path(&name_value, "validate")?;
            validate = Some(set_once(validate, &name_value, path)?);
        } else {
            return Err(syn::Error::new_spanned(
                name_value.path,
                "Unsupported argument; expected rename_all or validate",
            )
            .to_compile_error());
        }
    }

    Ok(ModelArgs { naming: naming.unwrap_or(Naming::Camel), validate })
}

fn inspect_field(field: &Field, naming: Naming) -> Result<ModelField, TokenStream> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "value_model requires named fields").to_compile_error());
    };

    let mut default = None;
    let mut copy = false;
    let mut rename = None;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("copy") {
                copy = true;
                Ok(())
            } else if meta.path.is_ident("default") {
                default = Some(meta.value()?.parse::<Expr>()?);
                Ok(())
            } else if meta.path.is_ident("rename") {
                rename = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else {
                Err(meta.error("Unsupported model attribute; expected copy, default or rename"))
            }
        })
        .map_err(|err| err.to_compile_error())?;
    }

    let raw = ident.to_string();
    let property = rename.unwrap_or_else(|| naming.apply(raw.trim_start_matches("r#")));

    Ok(ModelField { ident, ty: field.ty.clone(), property, default, copy })
}

fn expand_builder(input: &ItemStruct, fields: &[ModelField], validate: Option<&Path>) -> TokenStream {
    let name = &input.ident;
    let vis = &input.vis;
    let builder = format_ident!("{}Builder", name);
    let doc = format!("Builder for [`{name}`]. Unset properties keep their defaults.");

    let idents: Vec<&Ident> = fields.iter().map(|field| &field.ident).collect();
    let types: Vec<&Type> = fields.iter().map(|field| &field.ty).collect();

    let defaults = fields.iter().map(|field| {
        let ident = &field.ident;
        match &field.default {
            Some(expr) => quote! { #ident: #expr },
            None => quote! { #ident: ::std::default::Default::default() },
        }
    });

    let setters = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let set = format_ident!("set_{}", ident);
        quote! {
            #[must_use = "builder setters return the updated builder"]
            #vis fn #ident(mut self, value: #ty) -> Self {
                self.#ident = value;
                self
            }

            #vis fn #set(&mut self, value: #ty) -> &mut Self {
                self.#ident = value;
                self
            }
        }
    });

    let validation = validate.map(|path| quote! { #path(&model)?; });

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone)]
        #vis struct #builder {
            #( #idents: #types, )*
        }

        #[automatically_derived]
        impl ::std::default::Default for #builder {
            fn default() -> Self {
                Self { #( #defaults, )* }
            }
        }

        impl #builder {
            #( #setters )*

            /// Produces the immutable model.
            ///
            /// # Errors
            /// Returns `ModelError` when the model rejects the assembled values.
            #vis fn build(self) -> ::std::result::Result<#name, ::elim_model::ModelError> {
                let model = #name { #( #idents: self.#idents, )* };
                #validation
                Ok(model)
            }
        }
    }
}

fn expand_accessors(input: &ItemStruct, fields: &[ModelField]) -> TokenStream {
    let name = &input.ident;
    let vis = &input.vis;
    let builder = format_ident!("{}Builder", name);

    let accessors = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        if field.copy {
            quote! {
                #[must_use]
                #vis const fn #ident(&self) -> #ty {
                    self.#ident
                }
            }
        } else {
            quote! {
                #[must_use]
                #vis const fn #ident(&self) -> &#ty {
                    &self.#ident
                }
            }
        }
    });
    let idents = fields.iter().map(|field| &field.ident);

    quote! {
        impl #name {
            #[must_use]
            #vis fn builder() -> #builder {
                <#builder as ::std::default::Default>::default()
            }

            /// Returns a builder preloaded with this model's values.
            #[must_use]
            #vis fn to_builder(&self) -> #builder {
                #builder { #( #idents: ::std::clone::Clone::clone(&self.#idents), )* }
            }

            #( #accessors )*
        }
    }
}

fn expand_contract(input: &ItemStruct, fields: &[ModelField]) -> TokenStream {
    let name = &input.ident;
    let builder = format_ident!("{}Builder", name);

    let declarations = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let property = &field.property;
        let mutator = format!("set{}", capitalize(property));
        quote! {
            contract.accessor(
                #property,
                <#ty as ::elim_model::Property>::KIND,
                |model: &#name| ::elim_model::Property::to_value(&model.#ident),
            );
            contract.mutator(
                #mutator,
                <#ty as ::elim_model::Property>::KIND,
                |builder: &mut #builder, value: ::elim_model::Value| {
                    builder.#ident = <#ty as ::elim_model::Property>::from_value(value)?;
                    Ok(())
                },
            );
        }
    });

    quote! {
        #[automatically_derived]
        impl ::elim_model::Model for #name {
            type Builder = #builder;

            fn describe(contract: &mut ::elim_model::ContractDecl<Self>) {
                contract.factory(<#builder as ::std::default::Default>::default);
                contract.terminator(#builder::build);
                #( #declarations )*
            }
        }
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

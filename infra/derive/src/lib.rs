#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the rule engine crates.
//!
//! * [`elim_error`] turns an enum into a context-aware error type.
//! * [`value_model`] turns a struct into an immutable value model with a companion builder
//!   and a declared construction contract.
//!
//! The examples below are `ignore`d because the generated code refers to `elim_model` and
//! `thiserror`, which only exist in consuming crates.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to `Result<T, Error>` and to `Result<T, Source>` for every wrapped source error.
/// * **Standard Conversions**: Implements `From<Source>` for variants with a `source` field.
/// * **Internal Fallback**: Implements `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant is present.
/// * **Context Formatting**: Emits a module-local `format_context` helper for `#[error]` strings.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A `context` field must have the type `Option<Cow<'static, str>>`.
/// 3. Variants wrapping a source error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use elim_derive::elim_error;
/// use std::borrow::Cow;
///
/// #[elim_error]
/// pub enum StorageError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn elim_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}

/// Attribute macro to define an immutable value model.
///
/// For a struct `Rule` with private named fields the macro generates:
///
/// * `RuleBuilder` with `Default` (field defaults), by-value setters named after the fields,
///   `set_*` mutators taking `&mut self`, and a fallible `build()`.
/// * Read accessors on `Rule` named after the fields; `copy` fields return by value.
/// * `Rule::builder()` and `Rule::to_builder()`.
/// * An `elim_model::Model` impl declaring every property, its mutator, and its kind.
///
/// # Arguments
///
/// * `rename_all = "camelCase"` - Property naming policy (`camelCase`, `snake_case`, `kebab-case`).
/// * `validate = path::to::fn` - Called by `build()` as `fn(&Rule) -> Result<(), ModelError>`.
///
/// # Field Attributes
///
/// * `#[model(default = expr)]` - Builder default (otherwise `Default::default()`).
/// * `#[model(copy)]` - Accessor returns the value instead of a reference.
/// * `#[model(rename = "name")]` - Overrides the property name.
///
/// # Example
///
/// ```rust,ignore
/// use elim_derive::value_model;
///
/// #[value_model(validate = Zone::validate)]
/// #[derive(Clone, PartialEq)]
/// pub struct Zone {
///     #[model(copy, default = 8.0)]
///     radius: f64,
///     name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn value_model(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::model::expand_model(args.into(), input).into()
}

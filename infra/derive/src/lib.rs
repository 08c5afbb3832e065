#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Helm crates: error enums with context support and
//! the `OpenAPI`-aware model/handler attributes used by the HTTP surface.
//!
//! The examples below are `ignore`d to avoid compiling in this crate; the real
//! usages live in `helm-vault`, `helm-storage` and `helm-settings`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a standard API data model.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug`, `Serialize` and `Deserialize` when missing.
/// * **`OpenAPI`**: `utoipa::ToSchema` behind the consuming crate's `server` feature.
/// * **Serde Policy**: `rename_all = "camelCase"` and `deny_unknown_fields` by default.
///
/// # Arguments
///
/// * `rename_all = "..."` - Overrides the rename policy.
/// * `deny_unknown_fields = false` - Disables strict field checking.
///
/// # Example
///
/// ```rust,ignore
/// use helm_derive::api_model;
///
/// #[api_model(deny_unknown_fields = false)]
/// pub struct GatewayView {
///     pub url: String,
///     pub has_token: bool,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Bridges an Axum handler with `OpenAPI` documentation.
///
/// Accepts standard `utoipa::path` arguments (`get`, `put`, `path = "..."`,
/// `responses(...)`, `tag = "..."`), applied only when the `server` feature is on.
///
/// # Example
///
/// ```rust,ignore
/// use helm_derive::api_handler;
///
/// #[api_handler(
///     get,
///     path = "/config",
///     responses((status = OK, body = ConfigResponse)),
///     tag = "Settings"
/// )]
/// pub async fn get_config(State(store): State<ConfigStore>) -> impl IntoResponse {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into a domain error type.
///
/// # Features
///
/// * **Automatic Derives**: `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: a companion `<Name>Ext` trait adding `.context(...)` to
///   `Result<T, Name>` and to `Result<T, Source>` for every wrapped source type.
/// * **Conversions**: `From<Source>` for variants with a `source` (or `#[source]`/`#[from]`)
///   field, so `?` works on upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. Any variant carrying a source must also carry `context: Option<Cow<'static, str>>`.
/// 3. One error enum per module: the generated `format_context` helper is module-scoped.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[helm_derive::helm_error]
/// pub enum StorageError {
///     #[error("Hardware I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal storage error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Vec<u8>, StorageError> {
///     std::fs::read("helm-config.json").context("Reading dashboard config")
/// }
/// ```
#[proc_macro_attribute]
pub fn helm_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

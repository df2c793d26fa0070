#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared across the Provis workspace.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! provis-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns an enum into a Provis error type.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A `<Name>Ext` trait adding `.context(..)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant carrying a source error.
/// * `From<Source>` for variants carrying a source error.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * An inherent `context()` accessor returning the attached context, if any.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Every variant uses named fields.
/// 3. A variant with a `source` field (or a `#[source]`/`#[from]` field) must also declare
///    `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use provis_derive::provis_error;
/// use std::borrow::Cow;
///
/// #[provis_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<Vec<u8>, StoreError> {
///     Ok(std::fs::read("data.bin").context("Reading snapshot")?)
/// }
/// ```
#[proc_macro_attribute]
pub fn provis_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

//! `#[derive(Scannable)]`: emits the static layout descriptor and member
//! accessors `rowscan` needs to scan rows into a struct.
//!
//! Field attributes:
//!
//! - `#[scan(rename = "col")]` maps the field to column `col`. On an embedded
//!   field the rename becomes the prefix of every column beneath it.
//! - `#[scan(skip)]` (or `rename = "-"`) ignores the field.
//! - `#[scan(embed)]` promotes the fields of a nested `Scannable` struct
//!   (held by value, in a `Box`, or in an `Option<Box<_>>`) into this struct's
//!   columns.
//!
//! Only fields with `pub` visibility are scan targets.

mod attrs;
mod expand;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

#[proc_macro_derive(Scannable, attributes(scan))]
pub fn derive_scannable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::derive(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

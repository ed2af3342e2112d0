//! Derive macros for squint
//!
//! Provides `#[derive(Record)]` and `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod from_row;
mod record;

/// Derive `Record` (and `ToFragment`) for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use squint::Record;
///
/// #[derive(Record)]
/// struct User {
///     pub id: i64,
///     #[squint(db = "user_name")]
///     pub name: String,
///     #[squint(db = "-")]
///     pub cached: String,
///     #[squint(flatten)]
///     pub audit: Audit,
///     secret: String,
/// }
/// ```
///
/// # Attributes
///
/// - `#[squint(db = "name,omitempty")]` - tag read by the builder under its
///   configured tag key (`db` by default): a column name, `-` to skip, and
///   `keepempty` / `omitempty` / `nullempty` overrides. Any key may be used.
/// - `#[squint(flatten)]` - splice a nested `Record`'s columns into this one
///
/// Private fields are never columns. Every other field must implement
/// `squint::Valuer`.
#[proc_macro_derive(Record, attributes(squint))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow` for a struct.
///
/// # Example
///
/// ```ignore
/// use squint::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     #[squint(db = "user_name")]
///     name: String,
///     email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[squint(db = "name")]` - read from a different column (`-` leaves the
///   field at its `Default`)
/// - `#[squint(flatten)]` - decode a nested `FromRow` type from the same row
#[proc_macro_derive(FromRow, attributes(squint))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

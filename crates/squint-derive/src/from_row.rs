//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

use crate::attrs::get_field_attrs;

/// Tag key holding column names, matching the builder's default.
const TAG: &str = "db";

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "FromRow can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "FromRow can only be derived for structs",
            ));
        }
    };

    let mut field_extracts = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let attrs = get_field_attrs(field)?;

        let extract = if attrs.skipped(TAG) {
            quote! { #field_name: ::std::default::Default::default() }
        } else if attrs.flatten {
            quote! { #field_name: <#ty as ::squint::FromRow>::from_row(row)? }
        } else {
            let column_name = attrs
                .column(TAG)
                .unwrap_or_else(|| field_name.unraw().to_string());
            quote! { #field_name: row.try_get_column(#column_name)? }
        };
        field_extracts.push(extract);
    }

    Ok(quote! {
        impl #impl_generics ::squint::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::squint::row::Row) -> ::squint::SquintResult<Self> {
                use ::squint::RowExt;
                Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}

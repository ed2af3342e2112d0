//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result, Visibility};

use crate::attrs::get_field_attrs;

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut field_exprs = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.unraw().to_string();
        let attrs = get_field_attrs(field)?;
        let keys = attrs.tags.iter().map(|(k, _)| k);
        let values = attrs.tags.iter().map(|(_, v)| v);
        let tags = quote! { &[#((#keys, #values)),*] };

        let expr = if attrs.flatten {
            quote! {
                ::squint::Field::embedded(#field_name, #tags, ::squint::Record::fields(&self.#ident))
            }
        } else if matches!(field.vis, Visibility::Inherited) {
            quote! { ::squint::Field::hidden(#field_name) }
        } else {
            quote! {
                ::squint::Field::valuer(#field_name, #tags, &self.#ident)
            }
        };
        field_exprs.push(expr);
    }

    Ok(quote! {
        impl #impl_generics ::squint::Record for #name #ty_generics #where_clause {
            fn fields(&self) -> ::std::vec::Vec<::squint::Field> {
                ::std::vec![#(#field_exprs),*]
            }
        }

        impl #impl_generics ::squint::ToFragment for #name #ty_generics #where_clause {
            fn to_fragment(&self) -> ::squint::Fragment {
                ::squint::Fragment::Record(::squint::Record::fields(self))
            }
        }
    })
}

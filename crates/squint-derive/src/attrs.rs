//! `#[squint(...)]` field attribute parsing.
//!
//! Accepted forms, comma separated inside one attribute or spread over
//! several:
//!
//! - `key = "value"`: a tag, e.g. `db = "user_name,omitempty"`
//! - `flatten`: splice a nested record's columns into the parent

use proc_macro2::Span;
use syn::Result;

const MODE_TOKENS: [&str; 3] = ["keepempty", "omitempty", "nullempty"];

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) tags: Vec<(String, String)>,
    pub(crate) flatten: bool,
}

impl syn::parse::Parse for FieldAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            let key = ident.to_string();

            if input.peek(syn::Token![=]) {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                if attrs.tags.iter().any(|(k, _)| *k == key) {
                    return Err(syn::Error::new(value.span(), format!("duplicate `{key}` tag")));
                }
                attrs.tags.push((key, value.value()));
            } else if key == "flatten" {
                attrs.flatten = true;
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown squint attribute `{key}`"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else if !input.is_empty() {
                return Err(syn::Error::new(Span::call_site(), "expected `,`"));
            }
        }

        Ok(attrs)
    }
}

impl FieldAttrs {
    /// The raw tag value for `key`.
    pub(crate) fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the `key` tag excludes the field (`"-"`).
    pub(crate) fn skipped(&self, key: &str) -> bool {
        self.tag(key)
            .is_some_and(|raw| raw.split(',').any(|t| t.trim() == "-"))
    }

    /// The column name from the `key` tag, ignoring empty-value tokens.
    pub(crate) fn column(&self, key: &str) -> Option<String> {
        self.tag(key)?
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "-" && !MODE_TOKENS.contains(t))
            .next_back()
            .map(str::to_string)
    }
}

pub(crate) fn get_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut merged = FieldAttrs::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("squint") {
            continue;
        }

        let parsed: FieldAttrs = attr.parse_args()?;
        for (key, value) in parsed.tags {
            if merged.tags.iter().any(|(k, _)| *k == key) {
                return Err(syn::Error::new_spanned(attr, format!("duplicate `{key}` tag")));
            }
            merged.tags.push((key, value));
        }
        merged.flatten |= parsed.flatten;
    }

    Ok(merged)
}

//! `SeaOrmResource` derive: REST metadata for sea-orm entities.
//!
//! Reads `#[sea_orm(table_name = "...")]` and implements
//! `core_proc_macros::ApiResource` for the model.
//!
//! ```ignore
//! #[derive(Clone, Debug, DeriveEntityModel, SeaOrmResource)]
//! #[sea_orm(table_name = "categories")]
//! pub struct Model {
//!     #[sea_orm(primary_key)]
//!     pub id: i32,
//!     pub name: String,
//! }
//!
//! assert_eq!(Model::URL, "/categories");
//! assert_eq!(Model::URL_WITH_ID, "/categories/{id}");
//! assert_eq!(Model::COLLECTION, "categories");
//! assert_eq!(Model::TAG, "Categories");
//! assert_eq!(Model::RESOURCE, "Category");
//! ```
//!
//! Every default can be overridden:
//!
//! ```ignore
//! #[sea_orm(table_name = "reviews")]
//! #[sea_orm_resource(url = "/feedback", tag = "Product reviews", resource = "Product review")]
//! pub struct Model { /* ... */ }
//! ```

extern crate proc_macro;

use darling::FromDeriveInput;
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Lit, Meta};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(sea_orm_resource), forward_attrs(sea_orm))]
struct SeaOrmResourceInput {
    ident: syn::Ident,
    attrs: Vec<syn::Attribute>,
    #[darling(default)]
    collection: Option<String>,
    #[darling(default)]
    url: Option<String>,
    #[darling(default)]
    tag: Option<String>,
    #[darling(default)]
    resource: Option<String>,
}

/// Derives `ApiResource` from the sea-orm table name.
///
/// # Attributes
///
/// - `collection`: override the collection name (default: `table_name`)
/// - `url`: override the collection path (default: `/table_name`)
/// - `tag`: override the OpenAPI tag (default: capitalized collection)
/// - `resource`: override the singular name (default: singularized, capitalized table name)
#[proc_macro_derive(SeaOrmResource, attributes(sea_orm_resource))]
pub fn sea_orm_resource_derive(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = parse_macro_input!(input as DeriveInput);
    let receiver = match SeaOrmResourceInput::from_derive_input(&ast) {
        Ok(receiver) => receiver,
        Err(err) => return TokenStream::from(err.write_errors()),
    };

    match impl_sea_orm_resource(receiver) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn capitalize_first_letter(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// English singular for the table names used in this workspace.
fn singularize(plural: &str) -> String {
    if let Some(stem) = plural.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = plural.strip_suffix('s') {
        stem.to_string()
    } else {
        plural.to_string()
    }
}

fn extract_table_name(attrs: &[syn::Attribute]) -> Option<String> {
    for attr in attrs {
        if !attr.path().is_ident("sea_orm") {
            continue;
        }
        if let Meta::List(meta_list) = &attr.meta {
            let mut table_name = None;
            let _ = meta_list.parse_nested_meta(|meta| {
                if meta.path.is_ident("table_name") {
                    let value = meta.value()?;
                    if let Lit::Str(lit_str) = value.parse::<Lit>()? {
                        table_name = Some(lit_str.value());
                    }
                }
                Ok(())
            });
            if table_name.is_some() {
                return table_name;
            }
        }
    }
    None
}

fn impl_sea_orm_resource(receiver: SeaOrmResourceInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &receiver.ident;

    let table_name = extract_table_name(&receiver.attrs).ok_or_else(|| {
        syn::Error::new_spanned(
            ident,
            "SeaOrmResource requires #[sea_orm(table_name = \"...\")] attribute",
        )
    })?;

    let collection = receiver.collection.unwrap_or_else(|| table_name.clone());
    let url = receiver.url.unwrap_or_else(|| format!("/{}", table_name));
    let tag = receiver
        .tag
        .unwrap_or_else(|| capitalize_first_letter(&collection));
    let resource = receiver
        .resource
        .unwrap_or_else(|| capitalize_first_letter(&singularize(&table_name)));
    let url_with_id = format!("{}/{{id}}", url.trim_end_matches('/'));

    Ok(quote! {
        impl core_proc_macros::ApiResource for #ident {
            const URL: &'static str = #url;
            const URL_WITH_ID: &'static str = #url_with_id;
            const COLLECTION: &'static str = #collection;
            const TAG: &'static str = #tag;
            const RESOURCE: &'static str = #resource;
        }
    })
}

//! Procedural macros for the searchlayer project.
//!
//! Provides `#[derive(Searchable)]`, which turns a plain filter struct into
//! a search model: it generates the static field-descriptor table, the
//! per-call value extraction, and the pagination-directive accessor that
//! `searchlayer_core::model::Searchable` requires.
//!
//! Field semantics are decided once, from the declared field types:
//!
//! - `SearchRequest` (or `Option<SearchRequest>`) — the nested directive
//! - `String` / `Option<String>` — text criterion
//! - `TimeRange`, `DateRange`, `NumberRange` (optionally wrapped in `Option`)
//! - `Vec<T>` — inclusion-set criterion
//! - `bool`, integers, floats (optionally wrapped in `Option`) — equality
//!
//! Per-field annotations:
//!
//! ```ignore
//! #[derive(Searchable)]
//! struct UserFilter {
//!     request: SearchRequest,
//!     #[search(column = "user_name", matches = "prefix")]
//!     name: Option<String>,
//!     #[search(keyword = "contain")]
//!     email: Option<String>,
//! }
//! ```
//!
//! The store column falls back from `#[search(column = "...")]` to
//! `#[serde(rename = "...")]` to the field identifier. An unsupported match
//! mode or field type is a compile error.
//!
//! The generated code refers to the `searchlayer_core` and `bson` crates by
//! name, so both must be dependencies of the deriving crate.

#[allow(unused_extern_crates)]
extern crate self as searchlayer_macros;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Fields, GenericArgument, LitStr, Meta, PathArguments, Token, Type,
    parse_macro_input, punctuated::Punctuated, spanned::Spanned,
};

/// Derives `searchlayer_core::model::Searchable` for a named-field struct.
#[proc_macro_derive(Searchable, attributes(search))]
pub fn derive_searchable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// How one field of the model compiles, decided from its declared type.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldShape {
    Text,
    Directive,
    Time,
    Date,
    Number,
    List,
    Scalar,
}

impl FieldShape {
    fn kind_tokens(self) -> TokenStream2 {
        match self {
            FieldShape::Text => quote!(searchlayer_core::field::FieldKind::Text),
            FieldShape::Directive => quote!(searchlayer_core::field::FieldKind::Directive),
            FieldShape::Time => quote!(searchlayer_core::field::FieldKind::Time),
            FieldShape::Date => quote!(searchlayer_core::field::FieldKind::Date),
            FieldShape::Number => quote!(searchlayer_core::field::FieldKind::Number),
            FieldShape::List => quote!(searchlayer_core::field::FieldKind::List),
            FieldShape::Scalar => quote!(searchlayer_core::field::FieldKind::Scalar),
        }
    }
}

/// Annotations read from `#[search(...)]` and `#[serde(...)]`.
#[derive(Default)]
struct FieldAnnotations {
    column: Option<LitStr>,
    serde_rename: Option<LitStr>,
    matches: Option<LitStr>,
    keyword: Option<LitStr>,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "Searchable can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            input.span(),
            "Searchable requires named fields",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Searchable does not support generic search models",
        ));
    }

    let mut descriptors = Vec::new();
    let mut values = Vec::new();
    let mut directive = None;

    for field in &fields.named {
        let ident = field.ident.as_ref().expect("named field");
        let annotations = read_annotations(field)?;
        let (shape, optional) = classify(&field.ty)?;

        if shape == FieldShape::Directive && directive.is_none() {
            directive = Some((ident.clone(), optional));
        }

        descriptors.push(descriptor_tokens(ident, shape, &annotations)?);
        values.push(value_tokens(ident, shape, optional));
    }

    let name = &input.ident;
    let request_body = match &directive {
        Some((ident, true)) => quote!(self.#ident.as_ref()),
        Some((ident, false)) => quote!(::core::option::Option::Some(&self.#ident)),
        None => quote!(::core::option::Option::None),
    };

    Ok(quote! {
        #[automatically_derived]
        impl searchlayer_core::model::Searchable for #name {
            fn descriptors() -> &'static [searchlayer_core::field::FieldDescriptor] {
                static DESCRIPTORS: &[searchlayer_core::field::FieldDescriptor] = &[
                    #(#descriptors),*
                ];
                DESCRIPTORS
            }

            fn values(&self) -> ::std::vec::Vec<searchlayer_core::model::FieldValue<'_>> {
                ::std::vec![
                    #(#values),*
                ]
            }

            fn request(&self) -> ::core::option::Option<&searchlayer_core::model::SearchRequest> {
                #request_body
            }
        }
    })
}

fn read_annotations(field: &syn::Field) -> syn::Result<FieldAnnotations> {
    let mut annotations = FieldAnnotations::default();

    for attr in &field.attrs {
        if attr.path().is_ident("search") {
            let metas =
                attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            for meta in metas {
                let name_value = meta.require_name_value()?;
                let literal = string_literal(&name_value.value)?;
                if name_value.path.is_ident("column") {
                    annotations.column = Some(literal);
                } else if name_value.path.is_ident("matches") {
                    annotations.matches = Some(literal);
                } else if name_value.path.is_ident("keyword") {
                    annotations.keyword = Some(literal);
                } else {
                    return Err(syn::Error::new(
                        name_value.path.span(),
                        "expected `column`, `matches`, or `keyword`",
                    ));
                }
            }
        } else if attr.path().is_ident("serde") {
            // Only the plain rename matters for column fallback; every other
            // serde annotation is left to serde.
            let Ok(metas) =
                attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
            else {
                continue;
            };
            for meta in metas {
                if let Meta::NameValue(name_value) = meta {
                    if name_value.path.is_ident("rename") {
                        if let Ok(literal) = string_literal(&name_value.value) {
                            annotations.serde_rename = Some(literal);
                        }
                    }
                }
            }
        }
    }

    Ok(annotations)
}

fn string_literal(value: &syn::Expr) -> syn::Result<LitStr> {
    if let syn::Expr::Lit(literal) = value {
        if let syn::Lit::Str(text) = &literal.lit {
            return Ok(text.clone());
        }
    }

    Err(syn::Error::new(value.span(), "expected a string literal"))
}

fn classify(ty: &Type) -> syn::Result<(FieldShape, bool)> {
    let (ty, optional) = match unwrap_generic(ty, "Option") {
        Some(inner) => (inner, true),
        None => (ty, false),
    };

    let Some(ident) = type_ident(ty) else {
        return Err(syn::Error::new(ty.span(), "unsupported search field type"));
    };

    let shape = match ident.to_string().as_str() {
        "String" => FieldShape::Text,
        "SearchRequest" => FieldShape::Directive,
        "TimeRange" => FieldShape::Time,
        "DateRange" => FieldShape::Date,
        "NumberRange" => FieldShape::Number,
        "Vec" => FieldShape::List,
        "bool" | "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "f32" | "f64" => {
            FieldShape::Scalar
        }
        _ => {
            return Err(syn::Error::new(
                ty.span(),
                "unsupported search field type; expected a text, range, list, scalar, or SearchRequest field",
            ));
        }
    };

    Ok((shape, optional))
}

fn type_ident(ty: &Type) -> Option<&syn::Ident> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|segment| &segment.ident),
        _ => None,
    }
}

fn unwrap_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    arguments.args.iter().find_map(|argument| match argument {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

fn descriptor_tokens(
    ident: &syn::Ident,
    shape: FieldShape,
    annotations: &FieldAnnotations,
) -> syn::Result<TokenStream2> {
    let name = ident.to_string();
    let kind = shape.kind_tokens();
    let mut descriptor = quote! {
        searchlayer_core::field::FieldDescriptor::new(#name, #kind)
    };

    // Column fallback: explicit annotation, else serde wire name, else the
    // field identifier (already the descriptor default).
    if let Some(column) = annotations.column.as_ref().or(annotations.serde_rename.as_ref()) {
        descriptor = quote!(#descriptor.with_column(#column));
    }
    if let Some(matches) = &annotations.matches {
        let mode = mode_tokens(matches)?;
        descriptor = quote!(#descriptor.with_matches(#mode));
    }
    if let Some(keyword) = &annotations.keyword {
        let mode = mode_tokens(keyword)?;
        descriptor = quote!(#descriptor.with_keyword(#mode));
    }

    Ok(descriptor)
}

fn mode_tokens(literal: &LitStr) -> syn::Result<TokenStream2> {
    match literal.value().as_str() {
        "exact" => Ok(quote!(searchlayer_core::field::MatchMode::Exact)),
        "prefix" => Ok(quote!(searchlayer_core::field::MatchMode::Prefix)),
        "contain" => Ok(quote!(searchlayer_core::field::MatchMode::Contain)),
        other => Err(syn::Error::new(
            literal.span(),
            format!("match mode \"{other}\" is not supported"),
        )),
    }
}

fn value_tokens(ident: &syn::Ident, shape: FieldShape, optional: bool) -> TokenStream2 {
    match (shape, optional) {
        (FieldShape::Text, true) => quote! {
            searchlayer_core::model::FieldValue::Text(self.#ident.as_deref())
        },
        (FieldShape::Text, false) => quote! {
            searchlayer_core::model::FieldValue::Text(::core::option::Option::Some(
                self.#ident.as_str(),
            ))
        },
        (FieldShape::Directive, true) => quote! {
            searchlayer_core::model::FieldValue::Directive(self.#ident.as_ref())
        },
        (FieldShape::Directive, false) => quote! {
            searchlayer_core::model::FieldValue::Directive(::core::option::Option::Some(
                &self.#ident,
            ))
        },
        (FieldShape::Time, true) => quote! {
            searchlayer_core::model::FieldValue::Time(self.#ident.as_ref())
        },
        (FieldShape::Time, false) => quote! {
            searchlayer_core::model::FieldValue::Time(::core::option::Option::Some(&self.#ident))
        },
        (FieldShape::Date, true) => quote! {
            searchlayer_core::model::FieldValue::Date(self.#ident.as_ref())
        },
        (FieldShape::Date, false) => quote! {
            searchlayer_core::model::FieldValue::Date(::core::option::Option::Some(&self.#ident))
        },
        (FieldShape::Number, true) => quote! {
            searchlayer_core::model::FieldValue::Number(self.#ident.as_ref())
        },
        (FieldShape::Number, false) => quote! {
            searchlayer_core::model::FieldValue::Number(::core::option::Option::Some(
                &self.#ident,
            ))
        },
        (FieldShape::List, _) => quote! {
            searchlayer_core::model::FieldValue::List(
                self.#ident
                    .iter()
                    .map(|item| ::bson::Bson::from(item.clone()))
                    .collect(),
            )
        },
        (FieldShape::Scalar, true) => quote! {
            searchlayer_core::model::FieldValue::Scalar(
                self.#ident.clone().map(::bson::Bson::from),
            )
        },
        (FieldShape::Scalar, false) => quote! {
            searchlayer_core::model::FieldValue::Scalar(::core::option::Option::Some(
                ::bson::Bson::from(self.#ident.clone()),
            ))
        },
    }
}

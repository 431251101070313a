// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, LitStr};

/// One annotated struct member.
struct MemberInfo {
    /// `self.name` or `self.0`.
    access: proc_macro2::TokenStream,
    ty: syn::Type,
    key: String,
}

/// `#[derive(Record)]` macro: generates a `fluxline::Record` impl
///
/// Only members carrying `#[influx("key")]` are emitted, under `key`.
/// Every annotated member type must implement `fluxline::ToFieldValue`
/// (integers, floats, `bool`, `String`, `&str`, `SystemTime`, `FieldValue`),
/// so unsupported kinds fail to compile.
///
/// Example:
/// ```ignore
/// use fluxline::Record;
///
/// #[derive(Record)]
/// struct DiskStats {
///     #[influx("used_bytes")]
///     used: u64,
///     #[influx("mount")]
///     mount_point: String,
///     cache: Vec<u8>,      // Not annotated, skipped
/// }
/// ```
#[proc_macro_derive(Record, attributes(influx))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return syn::Error::new_spanned(&input, "value must be a structured record")
                .to_compile_error()
                .into()
        }
    };

    let mut members = Vec::new();
    let mut seen_keys = HashSet::new();

    for (idx, field) in fields.iter().enumerate() {
        let mut key = None;
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("influx")) {
            if key.is_some() {
                return syn::Error::new_spanned(attr, "duplicate #[influx] attribute")
                    .to_compile_error()
                    .into();
            }
            let lit: LitStr = match attr.parse_args() {
                Ok(lit) => lit,
                Err(e) => {
                    return syn::Error::new(e.span(), "expected #[influx(\"field_key\")]")
                        .to_compile_error()
                        .into()
                }
            };
            if lit.value().is_empty() {
                return syn::Error::new_spanned(&lit, "field key must not be empty")
                    .to_compile_error()
                    .into();
            }
            if !seen_keys.insert(lit.value()) {
                return syn::Error::new_spanned(
                    &lit,
                    format!("field key {:?} is used twice", lit.value()),
                )
                .to_compile_error()
                .into();
            }
            key = Some(lit.value());
        }

        // Opt-in: members without the attribute are not exported
        let Some(key) = key else {
            continue;
        };

        let access = match &field.ident {
            Some(ident) => quote! { self.#ident },
            None => {
                let index = syn::Index::from(idx);
                quote! { self.#index }
            }
        };

        members.push(MemberInfo {
            access,
            ty: field.ty.clone(),
            key,
        });
    }

    let inserts: Vec<_> = members
        .iter()
        .map(|m| {
            let access = &m.access;
            let key = &m.key;
            quote! {
                fields.insert(#key, ::fluxline::ToFieldValue::to_field_value(&#access));
            }
        })
        .collect();

    // Generic member types need the conversion bound spelled out
    let mut generics = input.generics.clone();
    if !members.is_empty() && !generics.params.is_empty() {
        let where_clause = generics.make_where_clause();
        for m in &members {
            let ty = &m.ty;
            where_clause
                .predicates
                .push(syn::parse_quote! { #ty: ::fluxline::ToFieldValue });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let unused = if members.is_empty() {
        quote! { let _ = fields; }
    } else {
        quote! {}
    };

    let expanded = quote! {
        impl #impl_generics ::fluxline::Record for #name #ty_generics #where_clause {
            fn record_fields(&self, fields: &mut ::fluxline::FieldSet) {
                #unused
                #(#inserts)*
            }
        }
    };

    TokenStream::from(expanded)
}

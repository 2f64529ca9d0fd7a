//! Implementation of the `#[derive(Selectors)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Field, Fields, Generics, Ident, parse_macro_input};

/// Main implementation of the Selectors derive macro.
pub fn derive_selectors_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Struct(data_struct) => {
            generate_struct_selectors(&input.ident, &input.generics, &data_struct.fields)
        }
        Data::Enum(_) => syn::Error::new_spanned(
            &input.ident,
            "Selectors can only be derived for structs, not enums. Use #[derive(Choices)] for enums.",
        )
        .to_compile_error(),
        Data::Union(_) => {
            syn::Error::new_spanned(&input.ident, "Selectors cannot be derived for unions.")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

fn generate_struct_selectors(name: &Ident, generics: &Generics, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Named(named_fields) => {
            let methods: Vec<TokenStream2> = named_fields
                .named
                .iter()
                .filter_map(generate_field_selector)
                .collect();

            let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

            quote! {
                impl #impl_generics #name #type_generics #where_clause {
                    #(#methods)*
                }
            }
        }
        Fields::Unnamed(_) => syn::Error::new_spanned(
            name,
            "Selectors can only be derived for structs with named fields, not tuple structs.",
        )
        .to_compile_error(),
        Fields::Unit => syn::Error::new_spanned(
            name,
            "Selectors cannot be derived for unit structs (structs with no fields).",
        )
        .to_compile_error(),
    }
}

fn generate_field_selector(field: &Field) -> Option<TokenStream2> {
    let field_name = field.ident.as_ref()?;
    let field_type = &field.ty;
    let method_name = format_ident!("{}_selector", field_name);

    Some(quote! {
        #[doc = concat!("Returns a selector focusing on the `", stringify!(#field_name), "` field.")]
        #[must_use]
        pub fn #method_name() -> ::bifocal::optics::Selector<Self, #field_type>
        where
            Self: ::bifocal::Data,
            #field_type: ::bifocal::Data,
        {
            ::bifocal::optics::Selector::new(
                |source: &Self, _: &::bifocal::optics::Params| source.#field_name.clone(),
                |source: &Self, _: &::bifocal::optics::Params, value: #field_type| {
                    let mut updated = source.clone();
                    updated.#field_name = value;
                    updated
                },
            )
        }
    })
}

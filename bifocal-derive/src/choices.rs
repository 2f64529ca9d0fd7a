//! Implementation of the `#[derive(Choices)]` macro.
//!
//! Every variant gets a `MaybeConverter` from the enum to the variant's
//! payload.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Generics, Ident, Type, Variant, parse_macro_input};

/// Main implementation of the Choices derive macro.
pub fn derive_choices_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Enum(data_enum) => generate_enum_choices(
            &input.ident,
            &input.generics,
            &data_enum.variants.iter().collect::<Vec<_>>(),
        ),
        Data::Struct(_) => syn::Error::new_spanned(
            &input.ident,
            "Choices can only be derived for enums, not structs. Use #[derive(Selectors)] for structs.",
        )
        .to_compile_error(),
        Data::Union(_) => {
            syn::Error::new_spanned(&input.ident, "Choices cannot be derived for unions.")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

fn generate_enum_choices(name: &Ident, generics: &Generics, variants: &[&Variant]) -> TokenStream2 {
    let methods: Vec<TokenStream2> = variants
        .iter()
        .map(|variant| generate_variant_choice(variant))
        .collect();

    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #name #type_generics #where_clause {
            #(#methods)*
        }
    }
}

/// Payload of a variant: its field types, the pattern that binds them and
/// the expression that rebuilds the variant from the same bindings.
struct Payload<'a> {
    types: Vec<&'a Type>,
    pattern: TokenStream2,
    construct: TokenStream2,
    bindings: Vec<Ident>,
}

fn payload_of(variant: &Variant) -> Payload<'_> {
    let variant_name = &variant.ident;
    match &variant.fields {
        Fields::Unit => Payload {
            types: Vec::new(),
            pattern: quote! { Self::#variant_name },
            construct: quote! { Self::#variant_name },
            bindings: Vec::new(),
        },
        Fields::Unnamed(fields) => {
            let bindings: Vec<Ident> = (0..fields.unnamed.len())
                .map(|index| format_ident!("field_{}", index))
                .collect();
            Payload {
                types: fields.unnamed.iter().map(|field| &field.ty).collect(),
                pattern: quote! { Self::#variant_name(#(#bindings),*) },
                construct: quote! { Self::#variant_name(#(#bindings.clone()),*) },
                bindings,
            }
        }
        Fields::Named(fields) => {
            let bindings: Vec<Ident> = fields
                .named
                .iter()
                .filter_map(|field| field.ident.clone())
                .collect();
            Payload {
                types: fields.named.iter().map(|field| &field.ty).collect(),
                pattern: quote! { Self::#variant_name { #(#bindings),* } },
                construct: quote! { Self::#variant_name { #(#bindings: #bindings.clone()),* } },
                bindings,
            }
        }
    }
}

fn generate_variant_choice(variant: &Variant) -> TokenStream2 {
    let variant_name = &variant.ident;
    let method_name = format_ident!("{}_choice", to_snake_case(&variant_name.to_string()));
    let Payload {
        types,
        pattern,
        construct,
        bindings,
    } = payload_of(variant);

    let (focus_type, narrowed, destructure) = match (types.as_slice(), bindings.as_slice()) {
        ([], _) => (quote! { () }, quote! { () }, quote! { _ }),
        ([single], [binding]) => (
            quote! { #single },
            quote! { #binding.clone() },
            quote! { #binding },
        ),
        _ => (
            quote! { (#(#types),*) },
            quote! { (#(#bindings.clone()),*) },
            quote! { (#(#bindings),*) },
        ),
    };

    quote! {
        #[doc = concat!("Returns a choice narrowing to the `", stringify!(#variant_name), "` variant.")]
        #[must_use]
        #[allow(unreachable_patterns)]
        pub fn #method_name() -> ::bifocal::optics::MaybeConverter<Self, #focus_type>
        where
            Self: ::bifocal::Data,
            #focus_type: ::bifocal::Data,
        {
            ::bifocal::optics::MaybeConverter::new(
                |source: &Self, _: &::bifocal::optics::Params| match source {
                    #pattern => Some(#narrowed),
                    _ => None,
                },
                |focus: &#focus_type, _: &::bifocal::optics::Params| {
                    let #destructure = focus;
                    #construct
                },
            )
        }
    }
}

/// Converts a `PascalCase` variant name to `snake_case`.
///
/// Runs of capitals are kept together: `XMLParser` becomes `xml_parser`.
fn to_snake_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 4);
    let chars: Vec<char> = input.chars().collect();

    for (index, &character) in chars.iter().enumerate() {
        if character.is_uppercase() {
            if index > 0 {
                let previous = chars[index - 1];
                let next_is_lowercase = chars.get(index + 1).is_some_and(|c| c.is_lowercase());
                if previous.is_lowercase()
                    || previous.is_ascii_digit()
                    || (previous.is_uppercase() && next_is_lowercase)
                {
                    result.push('_');
                }
            }
            result.extend(character.to_lowercase());
        } else {
            result.push(character);
        }
    }

    result
}

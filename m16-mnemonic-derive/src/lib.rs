//! Derives `FromStr` for a fieldless enum by matching the full, lowercased
//! variant name against the input string.
//!
//! Modeled directly on `util-derive`'s `EnumFromStr`: same
//! `syn`/`quote` shape, same one-match-arm-per-variant codegen. The only
//! difference is the match key — `util-derive` matches the variant's
//! identifier verbatim (`"VARIANT"`), which suits that crate's
//! upper-snake-case opcode names; mnemonics are lowercase words
//! (`"add"`, `"ldr"`), so this derive lowercases each identifier before
//! using it as a match arm. This replaces the nested first-letter
//! `switch` dispatch the mnemonic recognizer used with a single flat
//! match table, built once at compile time.

use proc_macro::TokenStream;
use quote::quote;

#[proc_macro_derive(MnemonicFromStr)]
pub fn mnemonic_from_str_derive(input: TokenStream) -> TokenStream {
    let syn_item: syn::DeriveInput = syn::parse(input).unwrap();
    let name = &syn_item.ident;

    let variants = match &syn_item.data {
        syn::Data::Enum(enum_item) => &enum_item.variants,
        _ => panic!("MnemonicFromStr can only be derived for an enum."),
    };
    assert!(
        variants.iter().all(|v| v.fields.is_empty()),
        "MnemonicFromStr requires every variant to be fieldless."
    );

    let literals = variants
        .iter()
        .map(|v| v.ident.to_string().to_lowercase());
    let identifiers = variants.iter().map(|v| &v.ident);

    let expanded = quote! {
        impl ::core::str::FromStr for #name {
            type Err = crate::error::UnknownMnemonic;

            fn from_str(s: &str) -> Result<#name, crate::error::UnknownMnemonic> {
                match s {
                    #( #literals => Ok(#name::#identifiers), )*
                    _ => Err(crate::error::UnknownMnemonic(s.to_string())),
                }
            }
        }
    };
    expanded.into()
}

//! Bridges the compiler's attribute invocation to the expansion engine.

use declsynth_core::directive::{Directive, DirectiveKind};
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Item};

pub fn expand_attribute(kind: DirectiveKind, attr: TokenStream, input: TokenStream) -> TokenStream {
    let anchor = parse_macro_input!(input as Item);

    // Diagnostics point at the attribute that invoked us.
    let directive = Directive::new(kind, attr.into(), Span::call_site());

    let expanded = match declsynth_core::expand(&directive, &anchor) {
        Ok(generated) => quote! {
            #anchor
            #(#generated)*
        },
        Err(diag) => {
            let error = diag.to_compile_error();
            quote! {
                #anchor
                #error
            }
        }
    };

    TokenStream::from(expanded)
}

//! Variant-tag projection: a data-less companion enum plus an accessor that
//! maps every anchor value to its tag.

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{Ident, ImplItem, Item};

use crate::access::{self, AccessLevel};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::directive::Directive;
use crate::scan::{AnchorFacts, VariantCase};

/// First code point lower-cased, remainder unchanged.
pub fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn synthesize_bare(
    facts: &AnchorFacts,
    cases: &[VariantCase],
    resolved: Option<AccessLevel>,
    type_name: &str,
    with_equality: bool,
    directive: &Directive,
) -> Result<Vec<Item>, Diagnostic> {
    let invalid = || {
        Diagnostic::error(
            DiagnosticKind::InvalidTypeName,
            directive.span,
            format!("Invalid type name: '{type_name}'."),
        )
    };

    let Some(anchor) = facts.name.as_ref() else {
        return Err(invalid());
    };
    let tag: Ident = syn::parse_str(type_name).map_err(|_| invalid())?;
    let accessor_name = lower_camel(type_name);
    let accessor: Ident = syn::parse_str(&accessor_name).map_err(|_| invalid())?;

    let vis = access::visibility_tokens(resolved);
    let (impl_generics, ty_generics, where_clause) = facts.generics.split_for_impl();

    let tags = cases.iter().map(|c| {
        let cfg = &c.cfg_attrs;
        let name = &c.name;
        quote!(#(#cfg)* #name)
    });
    let arms = cases.iter().map(|c| {
        let cfg = &c.cfg_attrs;
        let name = &c.name;
        quote!(#(#cfg)* Self::#name { .. } => #tag::#name)
    });

    let container = lower(
        quote! {
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            #vis enum #tag {
                #(#tags,)*
            }
        },
        &invalid,
    )?;
    let projection = lower(
        quote! {
            impl #impl_generics #anchor #ty_generics #where_clause {
                #[allow(non_snake_case)]
                #vis fn #accessor(&self) -> #tag {
                    match self {
                        #(#arms,)*
                    }
                }
            }
        },
        &invalid,
    )?;

    if !emitted_names_match(&container, &projection, type_name, &accessor_name, cases.len()) {
        return Err(invalid());
    }

    let mut items = vec![container, projection];
    if with_equality {
        items.push(lower(
            quote! {
                #[automatically_derived]
                impl #impl_generics ::core::cmp::PartialEq for #anchor #ty_generics #where_clause {
                    fn eq(&self, other: &Self) -> bool {
                        self.#accessor() == other.#accessor()
                    }
                }
            },
            &invalid,
        )?);
    }

    tracing::debug!(
        anchor = %anchor,
        tag = type_name,
        cases = cases.len(),
        with_equality,
        "synthesized tag projection"
    );
    Ok(items)
}

fn lower(tokens: TokenStream, invalid: &dyn Fn() -> Diagnostic) -> Result<Item, Diagnostic> {
    syn::parse2(tokens).map_err(|_| invalid())
}

/// Reads the emitted declarations back: the container must be named
/// `type_name`, the accessor `lower_camel(type_name)`, and the accessor
/// must have exactly one arm per case.
fn emitted_names_match(
    container: &Item,
    projection: &Item,
    type_name: &str,
    accessor_name: &str,
    case_count: usize,
) -> bool {
    let Item::Enum(container) = container else {
        return false;
    };
    if container.ident.to_token_stream().to_string() != type_name
        || container.variants.len() != case_count
    {
        return false;
    }

    let Item::Impl(projection) = projection else {
        return false;
    };
    let Some(ImplItem::Fn(f)) = projection.items.first() else {
        return false;
    };
    if f.sig.ident.to_token_stream().to_string() != accessor_name {
        return false;
    }
    matches!(
        f.block.stmts.as_slice(),
        [syn::Stmt::Expr(syn::Expr::Match(m), None)] if m.arms.len() == case_count
    )
}

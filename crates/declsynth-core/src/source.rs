//! Offline host: expands every directive in a Rust source file and returns
//! the rewritten file together with all diagnostics.

use anyhow::{Context, Result};
use quote::ToTokens;
use syn::{Attribute, Item};

use crate::diagnostics::{Diagnostic, Report};
use crate::directive::Directive;

#[derive(Debug, Clone)]
pub struct SourceExpansion {
    pub file: syn::File,
    pub diagnostics: Vec<Diagnostic>,
    pub source_sha256: String,
}

impl SourceExpansion {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Token text of the expanded file, newline terminated.
    pub fn render(&self) -> String {
        let mut out = self.file.to_token_stream().to_string();
        out.push('\n');
        out
    }

    pub fn report(&self) -> Report {
        Report::new(self.source_sha256.clone(), self.diagnostics.clone())
    }
}

pub fn expand_source(src: &str) -> Result<SourceExpansion> {
    let mut file = syn::parse_file(src).context("parse Rust source")?;

    let mut diagnostics = Vec::new();
    file.items = expand_items(std::mem::take(&mut file.items), &mut diagnostics);

    tracing::debug!(
        items = file.items.len(),
        diagnostics = diagnostics.len(),
        "expanded source file"
    );
    Ok(SourceExpansion {
        file,
        diagnostics,
        source_sha256: crate::util::sha256_hex(src.as_bytes()),
    })
}

fn expand_items(items: Vec<Item>, diagnostics: &mut Vec<Diagnostic>) -> Vec<Item> {
    let mut out = Vec::with_capacity(items.len());
    for mut item in items {
        if let Item::Mod(m) = &mut item {
            if let Some((_, inner)) = &mut m.content {
                *inner = expand_items(std::mem::take(inner), diagnostics);
            }
        }

        let directives = take_directives(&mut item, diagnostics);
        let mut generated = Vec::new();
        for directive in &directives {
            match crate::expand(directive, &item) {
                Ok(items) => generated.extend(items),
                Err(diag) => diagnostics.push(diag),
            }
        }
        out.push(item);
        out.extend(generated);
    }
    out
}

/// Removes directive attributes from `item`, keeping the others in place.
/// Malformed directives are dropped with a diagnostic.
fn take_directives(item: &mut Item, diagnostics: &mut Vec<Diagnostic>) -> Vec<Directive> {
    let Some(attrs) = item_attrs_mut(item) else {
        return Vec::new();
    };

    let mut directives = Vec::new();
    attrs.retain(|attr| match Directive::from_attribute(attr) {
        None => true,
        Some(Ok(directive)) => {
            directives.push(directive);
            false
        }
        Some(Err(diag)) => {
            diagnostics.push(diag);
            false
        }
    });
    directives
}

fn item_attrs_mut(item: &mut Item) -> Option<&mut Vec<Attribute>> {
    Some(match item {
        Item::Const(i) => &mut i.attrs,
        Item::Enum(i) => &mut i.attrs,
        Item::ExternCrate(i) => &mut i.attrs,
        Item::Fn(i) => &mut i.attrs,
        Item::ForeignMod(i) => &mut i.attrs,
        Item::Impl(i) => &mut i.attrs,
        Item::Macro(i) => &mut i.attrs,
        Item::Mod(i) => &mut i.attrs,
        Item::Static(i) => &mut i.attrs,
        Item::Struct(i) => &mut i.attrs,
        Item::Trait(i) => &mut i.attrs,
        Item::TraitAlias(i) => &mut i.attrs,
        Item::Type(i) => &mut i.attrs,
        Item::Union(i) => &mut i.attrs,
        Item::Use(i) => &mut i.attrs,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    fn item_names(items: &[Item]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                Item::Enum(e) => format!("enum {}", e.ident),
                Item::Struct(s) => format!("struct {}", s.ident),
                Item::Trait(t) => format!("trait {}", t.ident),
                Item::Mod(m) => format!("mod {}", m.ident),
                Item::Impl(imp) => match &imp.trait_ {
                    Some((_, path, _)) => format!(
                        "impl {}",
                        path.segments.last().map(|s| s.ident.to_string()).unwrap_or_default()
                    ),
                    None => "impl".to_string(),
                },
                other => other.to_token_stream().to_string(),
            })
            .collect()
    }

    #[test]
    fn splices_generated_items_after_anchor() {
        let src = r#"
            #[derive(Debug)]
            #[bare_providing]
            pub enum E { A(String), B }

            struct Untouched;
        "#;
        let expansion = expand_source(src).expect("expand");
        assert!(expansion.is_ok(), "{:?}", expansion.diagnostics);
        assert_eq!(
            item_names(&expansion.file.items),
            ["enum E", "enum Bare", "impl", "struct Untouched"]
        );
        let Item::Enum(anchor) = &expansion.file.items[0] else {
            panic!("anchor first");
        };
        assert_eq!(anchor.attrs.len(), 1);
        assert!(anchor.attrs[0].path().is_ident("derive"));
    }

    #[test]
    fn recurses_into_inline_modules() {
        let src = r#"
            mod shapes {
                #[declsynth::hashable_sequence_of_existential]
                pub trait P: declsynth::DynamicHashable {}
            }
        "#;
        let expansion = expand_source(src).expect("expand");
        assert!(expansion.is_ok(), "{:?}", expansion.diagnostics);
        let Item::Mod(m) = &expansion.file.items[0] else {
            panic!("module");
        };
        let inner = &m.content.as_ref().expect("inline module").1;
        assert_eq!(
            item_names(inner),
            [
                "trait P",
                "struct HashableSequenceOfP",
                "impl",
                "impl Deref",
                "impl PartialEq",
                "impl Eq",
                "impl Hash",
            ]
        );
    }

    #[test]
    fn every_directive_runs_and_failures_only_drop_their_own_output() {
        let src = r#"
            #[bare_providing(type_name = "Kind")]
            #[with_bare_cases(type_name = "Oh uh")]
            enum E { A(u8) }

            #[bare_providing]
            enum Flat { A, B }

            #[hashable_existential]
            struct NotATrait;
        "#;
        let expansion = expand_source(src).expect("expand");
        let kinds: Vec<DiagnosticKind> = expansion.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            [
                DiagnosticKind::InvalidTypeName,
                DiagnosticKind::NoAssociatedValue,
                DiagnosticKind::InvalidDeclarationKind,
            ]
        );
        assert_eq!(
            item_names(&expansion.file.items),
            ["enum E", "enum Kind", "impl", "enum Flat", "struct NotATrait"]
        );
    }

    #[test]
    fn malformed_directive_is_reported_and_stripped() {
        let src = r#"
            #[bare_providing = "Kind"]
            enum E { A(u8) }
        "#;
        let expansion = expand_source(src).expect("expand");
        assert_eq!(expansion.diagnostics.len(), 1);
        assert_eq!(expansion.diagnostics[0].kind, DiagnosticKind::InvalidArgument);
        assert_eq!(item_names(&expansion.file.items), ["enum E"]);
    }

    #[test]
    fn diagnostics_carry_source_locations() {
        let src = "enum Ok1 { A(u8) }\n\n#[bare_providing(access = Public)]\nenum E { A(u8) }\n";
        let expansion = expand_source(src).expect("expand");
        let report = expansion.report();
        assert!(!report.ok);
        assert_eq!(report.diagnostics[0].location.line, 3);
        assert_eq!(report.source_sha256.len(), 64);
    }

    #[test]
    fn render_is_deterministic() {
        let src = "#[with_bare_cases] pub(crate) enum E<T> { A(T), B }";
        let first = expand_source(src).expect("expand").render();
        let second = expand_source(src).expect("expand").render();
        assert_eq!(first, second);
        assert!(first.ends_with('\n'));
        assert!(syn::parse_file(&first).is_ok());
    }

    #[test]
    fn unparsable_source_is_an_error() {
        let err = expand_source("enum {").expect_err("parse error");
        assert!(format!("{err:#}").contains("parse Rust source"));
    }
}

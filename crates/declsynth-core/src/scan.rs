use syn::{Attribute, Generics, Ident, Item};

use crate::access::AccessLevel;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::directive::Directive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    VariantType,
    InterfaceType,
    Unsupported,
}

impl AnchorKind {
    fn expected(self) -> &'static str {
        match self {
            AnchorKind::VariantType => "an enum",
            AnchorKind::InterfaceType => "a non-generic trait",
            AnchorKind::Unsupported => "a supported declaration",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariantCase {
    pub name: Ident,
    pub has_payload: bool,
    /// `#[cfg]` gates of the variant; the tag and the accessor arm carry them too.
    pub cfg_attrs: Vec<Attribute>,
}

/// Everything the synthesizers need to know about the anchor declaration.
#[derive(Debug, Clone)]
pub struct AnchorFacts {
    pub kind: AnchorKind,
    /// Human-readable kind of the item, used in diagnostics ("a struct").
    pub described_as: &'static str,
    pub name: Option<Ident>,
    pub generics: Generics,
    pub variant_cases: Vec<VariantCase>,
    pub declared_access: Option<AccessLevel>,
    pub interface_name: Option<Ident>,
}

pub fn scan_anchor(anchor: &Item) -> AnchorFacts {
    let mut facts = AnchorFacts {
        kind: AnchorKind::Unsupported,
        described_as: describe_item(anchor),
        name: None,
        generics: Generics::default(),
        variant_cases: Vec::new(),
        declared_access: None,
        interface_name: None,
    };

    match anchor {
        Item::Enum(e) => {
            facts.kind = AnchorKind::VariantType;
            facts.name = Some(e.ident.clone());
            facts.generics = e.generics.clone();
            facts.declared_access = AccessLevel::from_visibility(&e.vis);
            facts.variant_cases = e
                .variants
                .iter()
                .map(|v| VariantCase {
                    name: v.ident.clone(),
                    has_payload: !matches!(v.fields, syn::Fields::Unit),
                    cfg_attrs: v
                        .attrs
                        .iter()
                        .filter(|a| a.path().is_ident("cfg"))
                        .cloned()
                        .collect(),
                })
                .collect();
        }
        Item::Trait(t) => {
            facts.name = Some(t.ident.clone());
            facts.generics = t.generics.clone();
            facts.declared_access = AccessLevel::from_visibility(&t.vis);
            // `Box<dyn Trait>` needs every parameter spelled out, so generic
            // traits cannot anchor a wrapper.
            if t.generics.params.is_empty() {
                facts.kind = AnchorKind::InterfaceType;
                facts.interface_name = Some(t.ident.clone());
            } else {
                facts.described_as = "a generic trait";
            }
        }
        _ => {}
    }

    facts
}

impl AnchorFacts {
    /// Checks the anchor can feed the variant-tag synthesizer and returns
    /// its cases in declaration order.
    pub fn require_variant_type(&self, directive: &Directive) -> Result<&[VariantCase], Diagnostic> {
        self.require_kind(AnchorKind::VariantType, directive)?;
        if !self.variant_cases.iter().any(|c| c.has_payload) {
            return Err(Diagnostic::error(
                DiagnosticKind::NoAssociatedValue,
                directive.span,
                format!(
                    "'#[{}]' can only be attached to an enum with at least one variant carrying data.",
                    directive.kind.name()
                ),
            ));
        }
        Ok(&self.variant_cases)
    }

    pub fn require_interface_type(&self, directive: &Directive) -> Result<&Ident, Diagnostic> {
        self.require_kind(AnchorKind::InterfaceType, directive)?;
        self.interface_name.as_ref().ok_or_else(|| {
            Diagnostic::error(
                DiagnosticKind::InvalidDeclarationKind,
                directive.span,
                "Trait anchor has no name.",
            )
        })
    }

    fn require_kind(&self, expected: AnchorKind, directive: &Directive) -> Result<(), Diagnostic> {
        if self.kind == expected {
            return Ok(());
        }
        Err(Diagnostic::error(
            DiagnosticKind::InvalidDeclarationKind,
            directive.span,
            format!(
                "'#[{}]' can only be attached to {}, not {}.",
                directive.kind.name(),
                expected.expected(),
                self.described_as
            ),
        ))
    }
}

fn describe_item(item: &Item) -> &'static str {
    match item {
        Item::Const(_) => "a constant",
        Item::Enum(_) => "an enum",
        Item::ExternCrate(_) => "an extern crate",
        Item::Fn(_) => "a function",
        Item::ForeignMod(_) => "an extern block",
        Item::Impl(_) => "an impl block",
        Item::Macro(_) => "a macro invocation",
        Item::Mod(_) => "a module",
        Item::Static(_) => "a static",
        Item::Struct(_) => "a struct",
        Item::Trait(_) => "a trait",
        Item::TraitAlias(_) => "a trait alias",
        Item::Type(_) => "a type alias",
        Item::Union(_) => "a union",
        Item::Use(_) => "a use declaration",
        _ => "an unsupported item",
    }
}

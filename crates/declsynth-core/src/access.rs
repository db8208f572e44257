use proc_macro2::TokenStream;
use quote::quote;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::directive::{AccessArg, Directive};

/// Visibility tiers, ordered from most restrictive to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Private,
    Super,
    Crate,
    Public,
}

impl AccessLevel {
    /// What an item gets when it carries no visibility tokens at all.
    pub const DEFAULT: AccessLevel = AccessLevel::Private;

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Private" => Some(AccessLevel::Private),
            "Super" => Some(AccessLevel::Super),
            "Crate" => Some(AccessLevel::Crate),
            "Public" => Some(AccessLevel::Public),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AccessLevel::Private => "Private",
            AccessLevel::Super => "Super",
            AccessLevel::Crate => "Crate",
            AccessLevel::Public => "Public",
        }
    }

    /// Reads the level an anchor declares for itself. Inherited visibility is
    /// "not declared". `pub(in path)` for any path other than `crate`,
    /// `super` or `self` is scanned as `Super`: it is at least as visible as
    /// the parent module and never crate-wide.
    pub fn from_visibility(vis: &syn::Visibility) -> Option<Self> {
        match vis {
            syn::Visibility::Public(_) => Some(AccessLevel::Public),
            syn::Visibility::Inherited => None,
            syn::Visibility::Restricted(r) => {
                if r.path.is_ident("crate") {
                    Some(AccessLevel::Crate)
                } else if r.path.is_ident("self") {
                    Some(AccessLevel::Private)
                } else {
                    Some(AccessLevel::Super)
                }
            }
        }
    }

    pub fn tokens(self) -> TokenStream {
        match self {
            AccessLevel::Private => quote!(pub(self)),
            AccessLevel::Super => quote!(pub(super)),
            AccessLevel::Crate => quote!(pub(crate)),
            AccessLevel::Public => quote!(pub),
        }
    }
}

/// Visibility tokens for a resolved access; `None` emits nothing.
pub fn visibility_tokens(resolved: Option<AccessLevel>) -> TokenStream {
    resolved.map(AccessLevel::tokens).unwrap_or_default()
}

/// A public wrapper always gets `pub fn new`. Below that only the immutable
/// shapes, whose field is sealed, get one.
pub fn requires_explicit_constructor(resolved: Option<AccessLevel>) -> bool {
    resolved == Some(AccessLevel::Public)
}

pub fn resolve_access(
    arg: &AccessArg,
    declared: Option<AccessLevel>,
    directive: &Directive,
) -> Result<Option<AccessLevel>, Diagnostic> {
    let effective = match arg {
        AccessArg::Explicit(level) => Some(*level),
        AccessArg::ForceDefault => None,
        AccessArg::Inherit => declared,
    };

    let anchor_level = declared.unwrap_or(AccessLevel::DEFAULT);
    if effective.unwrap_or(AccessLevel::DEFAULT) > anchor_level {
        return Err(Diagnostic::error(
            DiagnosticKind::AccessLevelViolation,
            directive.span,
            "Expansion type cannot have less restrictive access than its anchor declaration.",
        ));
    }

    tracing::trace!(
        directive = directive.kind.name(),
        ?declared,
        ?effective,
        "resolved access"
    );
    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveKind;

    const LEVELS: [AccessLevel; 4] = [
        AccessLevel::Private,
        AccessLevel::Super,
        AccessLevel::Crate,
        AccessLevel::Public,
    ];

    fn directive() -> Directive {
        Directive::new(
            DirectiveKind::BareProviding,
            TokenStream::new(),
            proc_macro2::Span::call_site(),
        )
    }

    #[test]
    fn explicit_level_wins() {
        let got = resolve_access(
            &AccessArg::Explicit(AccessLevel::Super),
            Some(AccessLevel::Public),
            &directive(),
        )
        .expect("resolve");
        assert_eq!(got, Some(AccessLevel::Super));
    }

    #[test]
    fn force_default_ignores_anchor_level() {
        let got = resolve_access(
            &AccessArg::ForceDefault,
            Some(AccessLevel::Public),
            &directive(),
        )
        .expect("resolve");
        assert_eq!(got, None);
    }

    #[test]
    fn omitted_inherits_anchor_level() {
        let d = directive();
        assert_eq!(
            resolve_access(&AccessArg::Inherit, Some(AccessLevel::Crate), &d).expect("resolve"),
            Some(AccessLevel::Crate)
        );
        assert_eq!(
            resolve_access(&AccessArg::Inherit, None, &d).expect("resolve"),
            None
        );
    }

    #[test]
    fn monotonicity_holds_for_every_pair() {
        let d = directive();
        for declared in LEVELS {
            for requested in LEVELS {
                let got = resolve_access(&AccessArg::Explicit(requested), Some(declared), &d);
                if requested <= declared {
                    assert_eq!(got.expect("allowed pair"), Some(requested));
                } else {
                    let err = got.expect_err("violating pair");
                    assert_eq!(err.kind, DiagnosticKind::AccessLevelViolation);
                }
            }
        }
    }

    #[test]
    fn undeclared_anchor_is_checked_against_default() {
        let d = directive();
        let err = resolve_access(&AccessArg::Explicit(AccessLevel::Public), None, &d)
            .expect_err("public over private anchor");
        assert_eq!(err.kind, DiagnosticKind::AccessLevelViolation);
        assert_eq!(
            resolve_access(&AccessArg::Explicit(AccessLevel::Private), None, &d)
                .expect("private over private anchor"),
            Some(AccessLevel::Private)
        );
    }

    #[test]
    fn scans_restricted_visibilities() {
        let cases: [(&str, Option<AccessLevel>); 7] = [
            ("", None),
            ("pub", Some(AccessLevel::Public)),
            ("pub(crate)", Some(AccessLevel::Crate)),
            ("pub(super)", Some(AccessLevel::Super)),
            ("pub(self)", Some(AccessLevel::Private)),
            ("pub(in crate)", Some(AccessLevel::Crate)),
            ("pub(in crate::a::b)", Some(AccessLevel::Super)),
        ];
        for (src, want) in cases {
            let vis: syn::Visibility = syn::parse_str(src).expect("parse visibility");
            assert_eq!(AccessLevel::from_visibility(&vis), want, "{src:?}");
        }
    }

    #[test]
    fn constructor_only_for_public() {
        assert!(requires_explicit_constructor(Some(AccessLevel::Public)));
        for level in [AccessLevel::Private, AccessLevel::Super, AccessLevel::Crate] {
            assert!(!requires_explicit_constructor(Some(level)));
        }
        assert!(!requires_explicit_constructor(None));
    }
}

use std::collections::BTreeSet;

use proc_macro2::{Span, TokenStream};
use quote::ToTokens;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Lit, MetaNameValue, Token};

use crate::access::AccessLevel;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Phase};
use crate::existential::WrapperShape;

pub const ACCESS_LABEL: &str = "access";
pub const TYPE_NAME_LABEL: &str = "type_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    BareProviding,
    WithBareCases,
    HashableExistential,
    HashableOptionalExistential,
    HashableMutableExistential,
    HashableMutableOptionalExistential,
    HashableSequenceOfExistential,
    HashableMutableSequenceOfExistential,
}

/// Which synthesizer a directive feeds, with its fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    VariantTag {
        default_type_name: &'static str,
        with_equality: bool,
    },
    Existential(WrapperShape),
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 8] = [
        DirectiveKind::BareProviding,
        DirectiveKind::WithBareCases,
        DirectiveKind::HashableExistential,
        DirectiveKind::HashableOptionalExistential,
        DirectiveKind::HashableMutableExistential,
        DirectiveKind::HashableMutableOptionalExistential,
        DirectiveKind::HashableSequenceOfExistential,
        DirectiveKind::HashableMutableSequenceOfExistential,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::BareProviding => "bare_providing",
            DirectiveKind::WithBareCases => "with_bare_cases",
            DirectiveKind::HashableExistential => "hashable_existential",
            DirectiveKind::HashableOptionalExistential => "hashable_optional_existential",
            DirectiveKind::HashableMutableExistential => "hashable_mutable_existential",
            DirectiveKind::HashableMutableOptionalExistential => {
                "hashable_mutable_optional_existential"
            }
            DirectiveKind::HashableSequenceOfExistential => "hashable_sequence_of_existential",
            DirectiveKind::HashableMutableSequenceOfExistential => {
                "hashable_mutable_sequence_of_existential"
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn family(self) -> Family {
        match self {
            DirectiveKind::BareProviding => Family::VariantTag {
                default_type_name: "Bare",
                with_equality: false,
            },
            DirectiveKind::WithBareCases => Family::VariantTag {
                default_type_name: "BareCase",
                with_equality: true,
            },
            DirectiveKind::HashableExistential => Family::Existential(WrapperShape::SINGLE),
            DirectiveKind::HashableOptionalExistential => {
                Family::Existential(WrapperShape::SINGLE.optional())
            }
            DirectiveKind::HashableMutableExistential => {
                Family::Existential(WrapperShape::SINGLE.mutable())
            }
            DirectiveKind::HashableMutableOptionalExistential => {
                Family::Existential(WrapperShape::SINGLE.mutable().optional())
            }
            DirectiveKind::HashableSequenceOfExistential => {
                Family::Existential(WrapperShape::SEQUENCE_OF)
            }
            DirectiveKind::HashableMutableSequenceOfExistential => {
                Family::Existential(WrapperShape::SEQUENCE_OF.mutable())
            }
        }
    }

    fn accepts(self, label: &str) -> bool {
        match label {
            ACCESS_LABEL => true,
            TYPE_NAME_LABEL => matches!(self.family(), Family::VariantTag { .. }),
            _ => false,
        }
    }
}

/// One directive occurrence: which directive, its raw argument tokens and
/// where it sits in the source. Every diagnostic of the invocation is
/// anchored at `span`.
#[derive(Debug, Clone)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub args: TokenStream,
    pub span: Span,
}

impl Directive {
    pub fn new(kind: DirectiveKind, args: TokenStream, span: Span) -> Self {
        Directive { kind, args, span }
    }

    /// Recognizes `#[bare_providing(...)]` style attributes by the last path
    /// segment. Returns `None` for attributes that are not directives.
    pub fn from_attribute(attr: &syn::Attribute) -> Option<Result<Self, Diagnostic>> {
        let name = attr.path().segments.last()?.ident.to_string();
        let kind = DirectiveKind::from_name(&name)?;
        let span = attr.span();
        let args = match &attr.meta {
            syn::Meta::Path(_) => Ok(TokenStream::new()),
            syn::Meta::List(list) => Ok(list.tokens.clone()),
            syn::Meta::NameValue(nv) => Err(Diagnostic::error(
                DiagnosticKind::InvalidArgument,
                span,
                format!(
                    "Unexpected arguments for '#[{name}]': '= {}'.",
                    nv.value.to_token_stream()
                ),
            )),
        };
        Some(args.map(|args| Directive::new(kind, args, span)))
    }
}

/// The `access` argument, keeping "omitted" apart from an explicit `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessArg {
    #[default]
    Inherit,
    ForceDefault,
    Explicit(AccessLevel),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectiveArgs {
    pub access: AccessArg,
    pub type_name: Option<String>,
}

pub fn parse_directive_args(directive: &Directive) -> Result<DirectiveArgs, Diagnostic> {
    let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated
        .parse2(directive.args.clone())
        .map_err(|e| {
            invalid_argument(
                directive,
                format!(
                    "Malformed arguments for '#[{}]': {e}.",
                    directive.kind.name()
                ),
            )
        })?;

    let mut args = DirectiveArgs::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for pair in pairs {
        let Some(label) = pair.path.get_ident() else {
            return Err(invalid_argument(
                directive,
                format!(
                    "Unexpected argument label: '{}'.",
                    pair.path.to_token_stream()
                ),
            ));
        };
        let label = label.to_string();
        if !directive.kind.accepts(&label) {
            return Err(invalid_argument(
                directive,
                format!(
                    "'#[{}]' does not take a `{label}` argument.",
                    directive.kind.name()
                ),
            ));
        }
        if !seen.insert(label.clone()) {
            return Err(invalid_argument(
                directive,
                format!("Duplicate `{label}` argument."),
            ));
        }
        match label.as_str() {
            ACCESS_LABEL => args.access = parse_access(directive, &pair.value)?,
            _ => args.type_name = Some(parse_type_name(directive, &pair.value)?),
        }
    }
    Ok(args)
}

/// Accepts `None`, a bare level name, or `AccessLevel::<level>`.
fn parse_access(directive: &Directive, expr: &Expr) -> Result<AccessArg, Diagnostic> {
    let unexpected = || {
        invalid_argument(
            directive,
            format!(
                "Unexpected `access` expression: '{}'.",
                expr.to_token_stream()
            ),
        )
    };
    let Expr::Path(path) = expr else {
        return Err(unexpected());
    };
    if path.qself.is_some()
        || path.path.leading_colon.is_some()
        || path.path.segments.iter().any(|s| !s.arguments.is_none())
    {
        return Err(unexpected());
    }
    let segments: Vec<&syn::Ident> = path.path.segments.iter().map(|s| &s.ident).collect();
    let level = match segments.as_slice() {
        [single] if *single == "None" => return Ok(AccessArg::ForceDefault),
        [single] => *single,
        [scope, level] if *scope == "AccessLevel" => *level,
        _ => return Err(unexpected()),
    };
    let text = level.to_string();
    AccessLevel::from_name(&text)
        .map(AccessArg::Explicit)
        .ok_or_else(|| {
            invalid_argument(directive, format!("Unexpected access level: '{text}'."))
        })
}

fn parse_type_name(directive: &Directive, expr: &Expr) -> Result<String, Diagnostic> {
    if let Expr::Lit(syn::ExprLit {
        lit: Lit::Str(s), ..
    }) = expr
    {
        let value = s.value();
        if !value.is_empty() {
            return Ok(value);
        }
    }
    Err(Diagnostic::error(
        DiagnosticKind::InvalidTypeName,
        directive.span,
        format!("Invalid type name: '{}'.", expr.to_token_stream()),
    )
    .in_phase(Phase::Directive))
}

fn invalid_argument(directive: &Directive, message: String) -> Diagnostic {
    Diagnostic::error(DiagnosticKind::InvalidArgument, directive.span, message)
}

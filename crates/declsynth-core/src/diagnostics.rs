use std::fmt;

use declsynth_contracts::DIAG_REPORT_SCHEMA_VERSION;
use proc_macro2::{Span, TokenStream};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Scan,
    Directive,
    Resolve,
    Lower,
}

/// Closed set of failures an expansion can report. Every one is fatal to the
/// invocation that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticKind {
    #[serde(rename = "DS0100")]
    InvalidDeclarationKind,
    #[serde(rename = "DS0110")]
    NoAssociatedValue,
    #[serde(rename = "DS0200")]
    InvalidArgument,
    #[serde(rename = "DS0300")]
    AccessLevelViolation,
    #[serde(rename = "DS0400")]
    InvalidTypeName,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 5] = [
        DiagnosticKind::InvalidDeclarationKind,
        DiagnosticKind::NoAssociatedValue,
        DiagnosticKind::InvalidArgument,
        DiagnosticKind::AccessLevelViolation,
        DiagnosticKind::InvalidTypeName,
    ];

    pub fn code_str(self) -> &'static str {
        match self {
            DiagnosticKind::InvalidDeclarationKind => "DS0100",
            DiagnosticKind::NoAssociatedValue => "DS0110",
            DiagnosticKind::InvalidArgument => "DS0200",
            DiagnosticKind::AccessLevelViolation => "DS0300",
            DiagnosticKind::InvalidTypeName => "DS0400",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            DiagnosticKind::InvalidDeclarationKind | DiagnosticKind::NoAssociatedValue => {
                Phase::Scan
            }
            DiagnosticKind::InvalidArgument => Phase::Directive,
            DiagnosticKind::AccessLevelViolation => Phase::Resolve,
            DiagnosticKind::InvalidTypeName => Phase::Lower,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            DiagnosticKind::InvalidDeclarationKind => {
                "directive is attached to the wrong kind of declaration"
            }
            DiagnosticKind::NoAssociatedValue => "no enum variant carries data",
            DiagnosticKind::InvalidArgument => "malformed directive argument",
            DiagnosticKind::AccessLevelViolation => {
                "expansion would be more visible than its anchor declaration"
            }
            DiagnosticKind::InvalidTypeName => "type name is not a valid identifier",
        }
    }

    pub fn default_help(self) -> Option<&'static str> {
        match self {
            DiagnosticKind::NoAssociatedValue => {
                Some("A data-less enum is already its own tag type; drop the directive.")
            }
            DiagnosticKind::AccessLevelViolation => Some(
                "Lower the `access` argument or widen the visibility of the anchor declaration.",
            ),
            DiagnosticKind::InvalidTypeName => Some(
                "Pass a single string literal holding a Rust identifier, e.g. `type_name = \"Kind\"`.",
            ),
            _ => None,
        }
    }
}

/// Line/column of a diagnostic anchor. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub line: usize,
    pub column: usize,
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        let start = span.start();
        SourceSpan {
            line: start.line,
            column: start.column,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "code")]
    pub kind: DiagnosticKind,
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(rename = "loc")]
    pub location: SourceSpan,
    #[serde(skip)]
    pub span: Span,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            phase: kind.phase(),
            severity: Severity::Error,
            message: message.into(),
            help: kind.default_help().map(|s| s.to_string()),
            location: SourceSpan::from(span),
            span,
        }
    }

    /// Overrides the kind's default phase for a failure raised earlier than usual.
    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Renders the diagnostic as a `compile_error!` invocation anchored at its span.
    pub fn to_compile_error(&self) -> TokenStream {
        syn::Error::new(self.span, &self.message).to_compile_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} {:?}: {}",
            self.location.line,
            self.location.column,
            self.kind.code_str(),
            self.phase,
            self.message
        )?;
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    pub source_sha256: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(source_sha256: impl Into<String>, mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by(|a, b| {
            (a.location.line, a.location.column)
                .cmp(&(b.location.line, b.location.column))
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| a.message.cmp(&b.message))
        });
        Report {
            schema_version: DIAG_REPORT_SCHEMA_VERSION.to_string(),
            ok: diagnostics.is_empty(),
            source_path: None,
            source_sha256: source_sha256.into(),
            diagnostics,
        }
    }

    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}

pub fn render_diagnostics_md() -> String {
    let mut out = String::new();
    out.push_str("# declsynth diagnostics catalog\n\n");
    out.push_str(
        "This document is generated from `crates/declsynth-core/src/diagnostics.rs`.\n\n",
    );
    out.push_str("| Code | Phase | Severity | Message | Help |\n");
    out.push_str("| ---- | ----- | -------- | ------- | ---- |\n");
    for kind in DiagnosticKind::ALL {
        out.push_str(&format!(
            "| {} | {:?} | {:?} | {} | {} |\n",
            kind.code_str(),
            kind.phase(),
            Severity::Error,
            kind.default_message(),
            kind.default_help().unwrap_or("")
        ));
    }
    out
}

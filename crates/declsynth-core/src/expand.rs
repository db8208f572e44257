use syn::Item;

use crate::access::resolve_access;
use crate::bare::synthesize_bare;
use crate::diagnostics::Diagnostic;
use crate::directive::{parse_directive_args, Directive, Family};
use crate::existential::synthesize_wrapper;
use crate::scan::scan_anchor;

/// Runs one directive against its anchor and returns the items to splice
/// next to it. Stops at the first failure; nothing is produced in that case.
pub fn expand(directive: &Directive, anchor: &Item) -> Result<Vec<Item>, Diagnostic> {
    let facts = scan_anchor(anchor);
    let args = parse_directive_args(directive)?;

    tracing::debug!(
        directive = directive.kind.name(),
        anchor = facts.name.as_ref().map(|n| n.to_string()).unwrap_or_default(),
        "expanding"
    );

    match directive.kind.family() {
        Family::VariantTag {
            default_type_name,
            with_equality,
        } => {
            let cases = facts.require_variant_type(directive)?;
            let resolved = resolve_access(&args.access, facts.declared_access, directive)?;
            let type_name = args.type_name.as_deref().unwrap_or(default_type_name);
            synthesize_bare(&facts, cases, resolved, type_name, with_equality, directive)
        }
        Family::Existential(shape) => {
            let interface = facts.require_interface_type(directive)?;
            let resolved = resolve_access(&args.access, facts.declared_access, directive)?;
            synthesize_wrapper(interface, resolved, shape, directive)
        }
    }
}

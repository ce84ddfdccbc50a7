//! Locate and validate `Main.main`.

use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::program::{FnSignature, Program, TypeRef};

use super::reachability::{EntityItem, MethodItem};

pub const MAIN_CLASS: &str = "Main";
pub const MAIN_METHOD: &str = "main";

/// Find the entry point, reporting exactly one diagnostic on failure.
///
/// Both items carry the empty instantiation: a valid entry is never generic.
pub fn find_entry(
    program: &Program,
    diagnostics: &mut Diagnostics,
) -> Option<(EntityItem, MethodItem)> {
    let Some(main_id) = program.find_entity(MAIN_CLASS) else {
        diagnostics
            .report_global(DiagnosticKind::NoMainClass)
            .message(format!("no entity named `{MAIN_CLASS}`"))
            .emit();
        return None;
    };
    let main = program.entity(main_id);

    if !main.is_class() {
        diagnostics
            .report(DiagnosticKind::MainNotAClass, main.span)
            .emit();
        return None;
    }

    if !main.generics.is_empty() {
        diagnostics
            .report(DiagnosticKind::MainClassIsGeneric, main.span)
            .emit();
        return None;
    }

    let Some(method_id) = program.lookup_method(main_id, MAIN_METHOD) else {
        diagnostics
            .report(DiagnosticKind::NoMainMethod, main.span)
            .emit();
        return None;
    };
    let method = program.method(method_id);

    if let Some(reason) = signature_problem(&method.signature) {
        diagnostics
            .report(DiagnosticKind::InvalidMainSignature, method.span)
            .message(reason)
            .related_to("in this class", main.span)
            .emit();
        return None;
    }

    if method.body.is_none() {
        diagnostics
            .report(DiagnosticKind::MainWithoutBody, method.span)
            .emit();
        return None;
    }

    debug!("entry point found: {MAIN_CLASS}.{MAIN_METHOD}");
    Some((
        EntityItem::non_generic(main_id),
        MethodItem::non_generic(method_id),
    ))
}

/// First way `sig` differs from `main(): Unit`.
fn signature_problem(sig: &FnSignature) -> Option<&'static str> {
    if !sig.generics.is_empty() {
        return Some("`main` must not be generic");
    }
    if sig.receiver.is_some() {
        return Some("`main` must not take a receiver");
    }
    if !sig.arguments.is_empty() {
        return Some("`main` must not take arguments");
    }
    if sig.return_type != TypeRef::Unit {
        return Some("`main` must return `Unit`");
    }
    None
}

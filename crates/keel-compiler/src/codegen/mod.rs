//! Reachability-driven image emission.
//!
//! Pipeline:
//! 1. [`find_entry`]: locate and validate `Main.main`
//! 2. [`analyze`]: close over everything reachable from it
//! 3. [`SelectorTable::build`]: number the invoked selectors
//! 4. header: entry label and descriptor count
//! 5. descriptor records, then function bodies, in graph order
//! 6. [`Generator::finish`]: patch every forward reference
//!
//! Entry-point problems are user errors and go to [`Diagnostics`]; anything
//! that fails after that is an [`EmitError`].

mod descriptor;
mod entry;
mod error;
mod function;
mod generator;
mod reachability;
mod selector;

#[cfg(test)]
mod reachability_tests;
#[cfg(test)]
mod selector_tests;

use tracing::debug;

use crate::analysis::AnalysisResults;
use crate::diagnostics::Diagnostics;
use crate::program::Program;

pub use descriptor::{emit_descriptors, storage};
pub use entry::{MAIN_CLASS, MAIN_METHOD, find_entry};
pub use error::EmitError;
pub use function::{emit_functions, method_name};
pub use generator::{Generator, Label, Relocatable, Target, Width};
pub use reachability::{
    EntityItem, EntityReachability, MethodItem, MethodReachability, Reachability, ReachableItem,
    analyze, owner,
};
pub use selector::{Selector, SelectorTable, selector_of};

/// Compile `program` to an image.
///
/// Returns an empty buffer when the entry point is invalid; the reason is
/// in `diagnostics`.
pub fn codegen(
    program: &Program,
    analysis: &AnalysisResults,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<u8>, EmitError> {
    let Some((entry_entity, entry_method)) = find_entry(program, diagnostics) else {
        return Ok(Vec::new());
    };

    let mut generator = Generator::new();
    let graph = analyze(program, &entry_entity, &entry_method, &mut generator)?;
    let selectors = SelectorTable::build(program, &graph)?;

    let entry_label = graph
        .method(program, &entry_method)
        .and_then(|m| m.label)
        .ok_or_else(|| EmitError::UnreachableMethod(method_name(program, &entry_method)))?;
    let count = graph.entities.len();
    let count = u16::try_from(count).map_err(|_| EmitError::TooManyDescriptors(count))?;

    generator.label(entry_label);
    generator.u16(count);
    debug!(descriptors = count, selectors = selectors.len(), "header emitted");

    emit_descriptors(program, &graph, &selectors, &mut generator)?;
    debug!(at = generator.offset(), "descriptors emitted");

    emit_functions(program, analysis, &graph, &selectors, &mut generator)?;
    debug!(
        functions = graph.functions().count(),
        entry = ?generator.label_offset(entry_label),
        "functions emitted"
    );

    let image = generator.finish()?;
    debug!(bytes = image.len(), "image emitted");
    Ok(image)
}

//! Keel compiler back end: from a resolved program to a bytecode image.
//!
//! - `program` - resolved program model and builder
//! - `analysis` - per-method register facts from type checking
//! - `instantiation` - generic type arguments and substitution
//! - `codegen` - entry resolution, reachability, selectors, emission
//! - `diagnostics` - user-facing error reporting
//! - `load` - JSON program interchange

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analysis;
pub mod codegen;
pub mod diagnostics;
pub mod instantiation;
pub mod load;
pub mod program;

#[cfg(test)]
mod load_tests;
#[cfg(test)]
pub mod test_utils;

pub use analysis::{AnalysisResults, FnAnalysis};
pub use codegen::{EmitError, codegen};
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use instantiation::Instantiation;
pub use load::{LoadError, load_path, load_str};
pub use program::{Program, ProgramBuilder};

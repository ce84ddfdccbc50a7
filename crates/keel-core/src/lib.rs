#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared across keel crates.
//!
//! - `Interner` / `Symbol`: identifier interning with insertion-ordered handles
//! - `Colors`: role-based ANSI styling for the image dump

mod colors;
mod interner;


pub use colors::{Colors, Painted};
pub use interner::{Interner, Symbol};

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Image format for keel compiled programs.
//!
//! An image is a header, a table of descriptor records (one per reachable
//! entity instantiation), and a code region of variable-length instructions.
//! This crate defines the byte layout shared by the compiler and any
//! interpreter, and provides a reader, a structural verifier, and a dump.

mod constants;
mod descriptor;
mod dump;
mod header;
mod ids;
mod image;
mod instructions;
mod reader;
mod verify;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod instructions_tests;

pub use constants::{ABSENT, HEADER_SIZE, MAX_REGISTERS};
pub use descriptor::{Descriptor, EntityTag, FieldStorage};
pub use dump::dump;
pub use header::Header;
pub use ids::{DescriptorIdx, Reg, SelectorIdx};
pub use image::{Image, ImageError, Instructions};
pub use instructions::{BinOpKind, Instruction, Opcode};
pub use verify::{VerifyError, verify};

//! Structural checks over a decoded image.
//!
//! Every embedded offset must land where the interpreter expects: the entry
//! point, dispatch slots and call targets on a function prologue (`Enter`),
//! jump targets on an instruction boundary. Descriptor and selector operands
//! must index existing tables.

use std::collections::HashSet;

use crate::ids::SelectorIdx;
use crate::image::{Image, ImageError};
use crate::instructions::Instruction;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Decode(#[from] ImageError),
    #[error("code region does not start with a function prologue (found at offset {at})")]
    MissingPrologue { at: u32 },
    #[error("entry offset {0} is not a function start")]
    EntryNotFunction(u32),
    #[error("descriptor D{descriptor} has {found} dispatch slots, expected {expected}")]
    SelectorCountMismatch {
        descriptor: usize,
        expected: usize,
        found: usize,
    },
    #[error("descriptor D{descriptor} slot #{selector} points to {target}, which is not a function start")]
    SlotNotFunction {
        descriptor: usize,
        selector: usize,
        target: u32,
    },
    #[error("call at {at} targets {target}, which is not a function start")]
    CallTargetNotFunction { at: u32, target: u32 },
    #[error("jump at {at} targets {target}, which is not an instruction start")]
    JumpTargetInvalid { at: u32, target: u32 },
    #[error("instruction at {at} references descriptor D{index}, but the image has {count}")]
    DescriptorOutOfRange { at: u32, index: u32, count: usize },
    #[error("instruction at {at} uses selector #{selector}, but the image has {count}")]
    SelectorOutOfRange { at: u32, selector: u16, count: usize },
}

pub fn verify(image: &Image) -> Result<(), VerifyError> {
    let code: Vec<(u32, Instruction)> = image.instructions().collect::<Result<_, _>>()?;

    match code.first() {
        Some((_, Instruction::Enter { .. })) | None => {}
        Some((at, _)) => return Err(VerifyError::MissingPrologue { at: *at }),
    }

    let starts: HashSet<u32> = code.iter().map(|(at, _)| *at).collect();
    let functions: HashSet<u32> = code
        .iter()
        .filter(|(_, instr)| matches!(instr, Instruction::Enter { .. }))
        .map(|(at, _)| *at)
        .collect();

    let entry = image.header().entry;
    if !functions.contains(&entry) {
        return Err(VerifyError::EntryNotFunction(entry));
    }

    let selector_count = image.selector_count();
    let descriptor_count = image.descriptors().len();

    for (index, descriptor) in image.descriptors().iter().enumerate() {
        if descriptor.selector_count() != selector_count {
            return Err(VerifyError::SelectorCountMismatch {
                descriptor: index,
                expected: selector_count,
                found: descriptor.selector_count(),
            });
        }
        for (selector, _) in descriptor.dispatch.iter().enumerate() {
            let Some(target) = descriptor.slot(SelectorIdx(selector as u16)) else {
                continue;
            };
            if !functions.contains(&target) {
                return Err(VerifyError::SlotNotFunction {
                    descriptor: index,
                    selector,
                    target,
                });
            }
        }
    }

    for (at, instr) in &code {
        let at = *at;
        match instr {
            Instruction::Call { target, .. } if !functions.contains(target) => {
                return Err(VerifyError::CallTargetNotFunction {
                    at,
                    target: *target,
                });
            }
            Instruction::CallVirtual { selector, .. } if selector.0 as usize >= selector_count => {
                return Err(VerifyError::SelectorOutOfRange {
                    at,
                    selector: selector.0,
                    count: selector_count,
                });
            }
            Instruction::New { descriptor, .. } | Instruction::TypeTest { descriptor, .. }
                if descriptor.0 as usize >= descriptor_count =>
            {
                return Err(VerifyError::DescriptorOutOfRange {
                    at,
                    index: descriptor.0,
                    count: descriptor_count,
                });
            }
            _ => {}
        }

        for target in instr.jump_targets() {
            if !starts.contains(&target) {
                return Err(VerifyError::JumpTargetInvalid { at, target });
            }
        }
    }

    Ok(())
}

//! Hand-assembled images for reader and verifier tests.
//!
//! All code offsets given to the builder (entry, dispatch slots, call and
//! jump targets) are relative to the start of the code region and get
//! rebased when the image is built.

use crate::constants::{ABSENT, HEADER_SIZE};
use crate::descriptor::{EntityTag, FieldStorage};
use crate::header::Header;
use crate::instructions::Instruction;

struct RawDescriptor {
    tag: EntityTag,
    name: String,
    fields: Vec<FieldStorage>,
    slots: Vec<Option<u32>>,
}

#[derive(Default)]
pub struct ImageBuilder {
    entry: u32,
    descriptors: Vec<RawDescriptor>,
    code: Vec<Instruction>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, rel: u32) -> Self {
        self.entry = rel;
        self
    }

    pub fn descriptor(
        mut self,
        tag: EntityTag,
        name: &str,
        fields: &[FieldStorage],
        slots: &[Option<u32>],
    ) -> Self {
        self.descriptors.push(RawDescriptor {
            tag,
            name: name.to_owned(),
            fields: fields.to_vec(),
            slots: slots.to_vec(),
        });
        self
    }

    pub fn code(mut self, instrs: impl IntoIterator<Item = Instruction>) -> Self {
        self.code.extend(instrs);
        self
    }

    fn code_start(&self) -> u32 {
        let table: usize = self
            .descriptors
            .iter()
            .map(|d| 1 + 2 + d.name.len() + 2 + d.fields.len() + 2 + 4 * d.slots.len())
            .sum();
        (HEADER_SIZE + table) as u32
    }

    pub fn build(self) -> Vec<u8> {
        let base = self.code_start();
        let header = Header {
            entry: base + self.entry,
            descriptor_count: self.descriptors.len() as u16,
        };

        let mut out = header.to_bytes().to_vec();
        for d in &self.descriptors {
            out.push(d.tag as u8);
            out.extend_from_slice(&(d.name.len() as u16).to_le_bytes());
            out.extend_from_slice(d.name.as_bytes());
            out.extend_from_slice(&(d.fields.len() as u16).to_le_bytes());
            out.extend(d.fields.iter().map(|&f| f as u8));
            out.extend_from_slice(&(d.slots.len() as u16).to_le_bytes());
            for slot in &d.slots {
                let value = slot.map_or(ABSENT, |rel| base + rel);
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        assert_eq!(out.len() as u32, base);

        for instr in &self.code {
            encode(instr, base, &mut out);
        }
        out
    }
}

/// Encode one instruction, rebasing code targets by `base`.
pub fn encode(instr: &Instruction, base: u32, out: &mut Vec<u8>) {
    out.push(instr.opcode() as u8);
    match instr {
        Instruction::Enter { argc, frame } => out.extend([*argc, *frame]),
        Instruction::LoadConst { dst, value } => {
            out.push(dst.0);
            out.extend_from_slice(&value.to_le_bytes());
        }
        Instruction::Copy { dst, src } => out.extend([dst.0, src.0]),
        Instruction::New { dst, descriptor } => {
            out.push(dst.0);
            out.extend_from_slice(&descriptor.0.to_le_bytes());
        }
        Instruction::Load { dst, obj, slot } => {
            out.extend([dst.0, obj.0]);
            out.extend_from_slice(&slot.to_le_bytes());
        }
        Instruction::Store { obj, slot, src } => {
            out.push(obj.0);
            out.extend_from_slice(&slot.to_le_bytes());
            out.push(src.0);
        }
        Instruction::Call { dst, target, args } => {
            out.push(dst.0);
            out.extend_from_slice(&(base + target).to_le_bytes());
            out.push(args.len() as u8);
            out.extend(args.iter().map(|r| r.0));
        }
        Instruction::CallVirtual {
            dst,
            selector,
            args,
        } => {
            out.push(dst.0);
            out.extend_from_slice(&selector.0.to_le_bytes());
            out.push(args.len() as u8);
            out.extend(args.iter().map(|r| r.0));
        }
        Instruction::TypeTest {
            dst,
            src,
            descriptor,
        } => {
            out.extend([dst.0, src.0]);
            out.extend_from_slice(&descriptor.0.to_le_bytes());
        }
        Instruction::BinOp { op, dst, lhs, rhs } => out.extend([*op as u8, dst.0, lhs.0, rhs.0]),
        Instruction::Jump { target } => out.extend_from_slice(&(base + target).to_le_bytes()),
        Instruction::Branch {
            cond,
            then_target,
            else_target,
        } => {
            out.push(cond.0);
            out.extend_from_slice(&(base + then_target).to_le_bytes());
            out.extend_from_slice(&(base + else_target).to_le_bytes());
        }
        Instruction::Return { src } | Instruction::Print { src } => out.push(src.0),
        Instruction::ReturnUnit => {}
    }
}

/// `Main` allocates a `Cell` and prints the result of a virtual `get`.
///
/// Offsets relative to code start: `main` at 0, `Cell.get` at 18.
pub fn cell_image() -> Vec<u8> {
    use crate::ids::{DescriptorIdx, Reg, SelectorIdx};

    ImageBuilder::new()
        .entry(0)
        .descriptor(EntityTag::Class, "Main", &[], &[None])
        .descriptor(EntityTag::Class, "Cell", &[FieldStorage::Value], &[Some(18)])
        .code([
            Instruction::Enter { argc: 0, frame: 2 },
            Instruction::New {
                dst: Reg(0),
                descriptor: DescriptorIdx(1),
            },
            Instruction::CallVirtual {
                dst: Reg(1),
                selector: SelectorIdx(0),
                args: vec![Reg(0)],
            },
            Instruction::Print { src: Reg(1) },
            Instruction::ReturnUnit,
            Instruction::Enter { argc: 1, frame: 2 },
            Instruction::Load {
                dst: Reg(1),
                obj: Reg(0),
                slot: 0,
            },
            Instruction::Return { src: Reg(1) },
        ])
        .build()
}

//! Bytecode instruction definitions.
//!
//! Instructions are variable-length: one opcode byte followed by operands.
//! Register operands are one byte, selector indices two, descriptor indices
//! and code offsets four. Code offsets are absolute positions in the image.

use std::fmt;

use crate::ids::{DescriptorIdx, Reg, SelectorIdx};
use crate::image::ImageError;
use crate::reader::Reader;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Opcode {
    Enter = 0x00,
    LoadConst = 0x01,
    Copy = 0x02,
    New = 0x03,
    Load = 0x04,
    Store = 0x05,
    Call = 0x06,
    CallVirtual = 0x07,
    TypeTest = 0x08,
    BinOp = 0x09,
    Jump = 0x0A,
    Branch = 0x0B,
    Return = 0x0C,
    ReturnUnit = 0x0D,
    Print = 0x0E,
}

impl Opcode {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0x00 => Self::Enter,
            0x01 => Self::LoadConst,
            0x02 => Self::Copy,
            0x03 => Self::New,
            0x04 => Self::Load,
            0x05 => Self::Store,
            0x06 => Self::Call,
            0x07 => Self::CallVirtual,
            0x08 => Self::TypeTest,
            0x09 => Self::BinOp,
            0x0A => Self::Jump,
            0x0B => Self::Branch,
            0x0C => Self::Return,
            0x0D => Self::ReturnUnit,
            0x0E => Self::Print,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::LoadConst => "const",
            Self::Copy => "copy",
            Self::New => "new",
            Self::Load => "load",
            Self::Store => "store",
            Self::Call => "call",
            Self::CallVirtual => "callv",
            Self::TypeTest => "test",
            Self::BinOp => "binop",
            Self::Jump => "jmp",
            Self::Branch => "br",
            Self::Return => "ret",
            Self::ReturnUnit => "ret.unit",
            Self::Print => "print",
        }
    }
}

/// Arithmetic and comparison operators carried by `BinOp`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum BinOpKind {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Lt = 3,
    Eq = 4,
}

impl BinOpKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Add,
            1 => Self::Sub,
            2 => Self::Mul,
            3 => Self::Lt,
            4 => Self::Eq,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Lt => "lt",
            Self::Eq => "eq",
        }
    }
}

/// Decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Function prologue. `argc` includes the receiver.
    Enter { argc: u8, frame: u8 },
    LoadConst { dst: Reg, value: u64 },
    Copy { dst: Reg, src: Reg },
    New { dst: Reg, descriptor: DescriptorIdx },
    Load { dst: Reg, obj: Reg, slot: u16 },
    Store { obj: Reg, slot: u16, src: Reg },
    Call { dst: Reg, target: u32, args: Vec<Reg> },
    /// `args[0]` is the receiver whose descriptor is consulted.
    CallVirtual { dst: Reg, selector: SelectorIdx, args: Vec<Reg> },
    TypeTest { dst: Reg, src: Reg, descriptor: DescriptorIdx },
    BinOp { op: BinOpKind, dst: Reg, lhs: Reg, rhs: Reg },
    Jump { target: u32 },
    Branch { cond: Reg, then_target: u32, else_target: u32 },
    Return { src: Reg },
    ReturnUnit,
    Print { src: Reg },
}

impl Instruction {
    /// Decode the instruction starting at `offset`.
    ///
    /// Returns the instruction and the offset just past it.
    pub fn decode(bytes: &[u8], offset: usize) -> Result<(Self, usize), ImageError> {
        let mut r = Reader::new(bytes, offset);
        let byte = r.u8()?;
        let opcode = Opcode::from_u8(byte).ok_or(ImageError::UnknownOpcode { offset, byte })?;

        let instr = match opcode {
            Opcode::Enter => Self::Enter {
                argc: r.u8()?,
                frame: r.u8()?,
            },
            Opcode::LoadConst => Self::LoadConst {
                dst: Reg(r.u8()?),
                value: r.u64()?,
            },
            Opcode::Copy => Self::Copy {
                dst: Reg(r.u8()?),
                src: Reg(r.u8()?),
            },
            Opcode::New => Self::New {
                dst: Reg(r.u8()?),
                descriptor: DescriptorIdx(r.u32()?),
            },
            Opcode::Load => Self::Load {
                dst: Reg(r.u8()?),
                obj: Reg(r.u8()?),
                slot: r.u16()?,
            },
            Opcode::Store => Self::Store {
                obj: Reg(r.u8()?),
                slot: r.u16()?,
                src: Reg(r.u8()?),
            },
            Opcode::Call => {
                let dst = Reg(r.u8()?);
                let target = r.u32()?;
                let args = read_args(&mut r)?;
                Self::Call { dst, target, args }
            }
            Opcode::CallVirtual => {
                let dst = Reg(r.u8()?);
                let selector = SelectorIdx(r.u16()?);
                let args = read_args(&mut r)?;
                Self::CallVirtual {
                    dst,
                    selector,
                    args,
                }
            }
            Opcode::TypeTest => Self::TypeTest {
                dst: Reg(r.u8()?),
                src: Reg(r.u8()?),
                descriptor: DescriptorIdx(r.u32()?),
            },
            Opcode::BinOp => {
                let at = r.pos();
                let raw = r.u8()?;
                let op = BinOpKind::from_u8(raw).ok_or(ImageError::UnknownBinOp {
                    offset: at,
                    byte: raw,
                })?;
                Self::BinOp {
                    op,
                    dst: Reg(r.u8()?),
                    lhs: Reg(r.u8()?),
                    rhs: Reg(r.u8()?),
                }
            }
            Opcode::Jump => Self::Jump { target: r.u32()? },
            Opcode::Branch => Self::Branch {
                cond: Reg(r.u8()?),
                then_target: r.u32()?,
                else_target: r.u32()?,
            },
            Opcode::Return => Self::Return { src: Reg(r.u8()?) },
            Opcode::ReturnUnit => Self::ReturnUnit,
            Opcode::Print => Self::Print { src: Reg(r.u8()?) },
        };

        Ok((instr, r.pos()))
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Enter { .. } => Opcode::Enter,
            Self::LoadConst { .. } => Opcode::LoadConst,
            Self::Copy { .. } => Opcode::Copy,
            Self::New { .. } => Opcode::New,
            Self::Load { .. } => Opcode::Load,
            Self::Store { .. } => Opcode::Store,
            Self::Call { .. } => Opcode::Call,
            Self::CallVirtual { .. } => Opcode::CallVirtual,
            Self::TypeTest { .. } => Opcode::TypeTest,
            Self::BinOp { .. } => Opcode::BinOp,
            Self::Jump { .. } => Opcode::Jump,
            Self::Branch { .. } => Opcode::Branch,
            Self::Return { .. } => Opcode::Return,
            Self::ReturnUnit => Opcode::ReturnUnit,
            Self::Print { .. } => Opcode::Print,
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Enter { .. } | Self::Copy { .. } => 3,
            Self::LoadConst { .. } => 10,
            Self::New { .. } => 6,
            Self::Load { .. } | Self::Store { .. } | Self::BinOp { .. } | Self::Jump { .. } => 5,
            Self::Call { args, .. } => 7 + args.len(),
            Self::CallVirtual { args, .. } => 5 + args.len(),
            Self::TypeTest { .. } => 7,
            Self::Branch { .. } => 10,
            Self::Return { .. } | Self::Print { .. } => 2,
            Self::ReturnUnit => 1,
        }
    }

    /// Absolute code offsets this instruction transfers control to.
    pub fn jump_targets(&self) -> Vec<u32> {
        match self {
            Self::Jump { target } => vec![*target],
            Self::Branch {
                then_target,
                else_target,
                ..
            } => vec![*then_target, *else_target],
            _ => Vec::new(),
        }
    }
}

fn read_args(r: &mut Reader<'_>) -> Result<Vec<Reg>, ImageError> {
    let argc = r.u8()? as usize;
    Ok(r.take(argc)?.iter().map(|&b| Reg(b)).collect())
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Reg]) -> fmt::Result {
    f.write_str("(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Self::BinOp { op, dst, lhs, rhs } = self {
            return write!(f, "{:<6}{dst} {lhs} {rhs}", op.mnemonic());
        }
        if matches!(self, Self::ReturnUnit) {
            return f.write_str(Opcode::ReturnUnit.mnemonic());
        }

        write!(f, "{:<6}", self.opcode().mnemonic())?;
        match self {
            Self::Enter { argc, frame } => write!(f, "{argc} {frame}"),
            Self::LoadConst { dst, value } => write!(f, "{dst} {value}"),
            Self::Copy { dst, src } => write!(f, "{dst} {src}"),
            Self::New { dst, descriptor } => write!(f, "{dst} {descriptor}"),
            Self::Load { dst, obj, slot } => write!(f, "{dst} {obj}.{slot}"),
            Self::Store { obj, slot, src } => write!(f, "{obj}.{slot} {src}"),
            Self::Call { dst, target, args } => {
                write!(f, "{dst} @{target} ")?;
                write_args(f, args)
            }
            Self::CallVirtual {
                dst,
                selector,
                args,
            } => {
                write!(f, "{dst} {selector} ")?;
                write_args(f, args)
            }
            Self::TypeTest {
                dst,
                src,
                descriptor,
            } => write!(f, "{dst} {src} {descriptor}"),
            Self::Jump { target } => write!(f, "@{target}"),
            Self::Branch {
                cond,
                then_target,
                else_target,
            } => write!(f, "{cond} @{then_target} @{else_target}"),
            Self::Return { src } | Self::Print { src } => write!(f, "{src}"),
            Self::BinOp { .. } | Self::ReturnUnit => Ok(()),
        }
    }
}

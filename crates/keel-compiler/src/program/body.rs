//! Method bodies: basic blocks of typed statements over numbered locals.
//!
//! Locals `0..arity` hold the parameters (receiver first). Block 0 is the
//! entry block.

use keel_bytecode::BinOpKind;
use keel_core::Symbol;

use super::TypeRef;

/// Numbered local of a method frame.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Local(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BlockId(pub u32);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FnBody {
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub terminator: Terminator,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Const {
        dst: Local,
        value: u64,
    },
    Copy {
        dst: Local,
        src: Local,
    },
    /// Allocation site. `ty` must name an entity.
    New {
        dst: Local,
        ty: TypeRef,
    },
    ReadField {
        dst: Local,
        obj: Local,
        field: Symbol,
    },
    WriteField {
        obj: Local,
        field: Symbol,
        src: Local,
    },
    /// Direct call of `method` on the entity named by `ty`.
    ///
    /// For instance methods `args[0]` is the receiver.
    StaticCall {
        dst: Local,
        ty: TypeRef,
        method: Symbol,
        type_args: Vec<TypeRef>,
        args: Vec<Local>,
    },
    /// Dispatch on the runtime type of `receiver`.
    VirtualCall {
        dst: Local,
        receiver: Local,
        method: Symbol,
        type_args: Vec<TypeRef>,
        args: Vec<Local>,
    },
    TypeTest {
        dst: Local,
        src: Local,
        ty: TypeRef,
    },
    BinOp {
        op: BinOpKind,
        dst: Local,
        lhs: Local,
        rhs: Local,
    },
    Print {
        src: Local,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    Return(Local),
    ReturnUnit,
    Jump(BlockId),
    Branch {
        cond: Local,
        then_block: BlockId,
        else_block: BlockId,
    },
}

impl FnBody {
    /// Single-block body.
    pub fn straight(statements: Vec<Statement>, terminator: Terminator) -> Self {
        Self {
            blocks: vec![Block {
                statements,
                terminator,
            }],
        }
    }
}

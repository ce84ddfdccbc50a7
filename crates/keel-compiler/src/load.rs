//! JSON program interchange.
//!
//! The front end hands over a resolved program as JSON:
//!
//! ```json
//! {
//!   "source": "class Main { ... }",
//!   "entities": [
//!     { "name": "Main", "kind": "class", "span": [6, 10],
//!       "methods": [
//!         { "name": "main", "registers": ["unit"],
//!           "body": [{ "statements": [{ "kind": "const", "dst": 0, "value": 42 }],
//!                      "terminator": { "kind": "return_unit" } }] } ] }
//!   ]
//! }
//! ```
//!
//! Types are `"unit"`, `{"param": i}` or `{"entity": {"name": "Cell", "args": [...]}}`.
//! Entity names are resolved in a first pass, so declarations may refer to
//! entities declared later in the file.

use std::path::Path;

use keel_bytecode::BinOpKind;
use rowan::{TextRange, TextSize};
use serde::Deserialize;

use crate::analysis::{AnalysisResults, FnAnalysis};
use crate::program::{
    Block, BlockId, BuildError, EntityId, EntityKind, FnBody, FnSignature, Local, Program,
    ProgramBuilder, Statement, Terminator, TypeRef,
};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid program file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    #[error("invalid span {start}..{end}")]
    InvalidSpan { start: u32, end: u32 },

    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgramJson {
    #[serde(default)]
    source: Option<String>,
    entities: Vec<EntityJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindJson {
    Class,
    Interface,
    Primitive,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityJson {
    name: String,
    kind: KindJson,
    #[serde(default)]
    span: Option<[u32; 2]>,
    #[serde(default)]
    generics: Vec<String>,
    #[serde(default)]
    fields: Vec<FieldJson>,
    #[serde(default)]
    methods: Vec<MethodJson>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldJson {
    name: String,
    #[serde(rename = "type")]
    ty: TypeJson,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodJson {
    name: String,
    #[serde(default)]
    span: Option<[u32; 2]>,
    #[serde(default)]
    generics: Vec<String>,
    #[serde(default)]
    receiver: Option<TypeJson>,
    #[serde(default)]
    arguments: Vec<TypeJson>,
    #[serde(default = "TypeJson::unit")]
    returns: TypeJson,
    #[serde(default)]
    registers: Option<Vec<TypeJson>>,
    #[serde(default)]
    body: Option<Vec<BlockJson>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TypeJson {
    Unit,
    Param(u32),
    Entity {
        name: String,
        #[serde(default)]
        args: Vec<TypeJson>,
    },
}

impl TypeJson {
    fn unit() -> Self {
        Self::Unit
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockJson {
    #[serde(default)]
    statements: Vec<StatementJson>,
    terminator: TerminatorJson,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BinOpJson {
    Add,
    Sub,
    Mul,
    Lt,
    Eq,
}

impl From<BinOpJson> for BinOpKind {
    fn from(op: BinOpJson) -> Self {
        match op {
            BinOpJson::Add => Self::Add,
            BinOpJson::Sub => Self::Sub,
            BinOpJson::Mul => Self::Mul,
            BinOpJson::Lt => Self::Lt,
            BinOpJson::Eq => Self::Eq,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StatementJson {
    Const {
        dst: u32,
        value: u64,
    },
    Copy {
        dst: u32,
        src: u32,
    },
    New {
        dst: u32,
        #[serde(rename = "type")]
        ty: TypeJson,
    },
    ReadField {
        dst: u32,
        obj: u32,
        field: String,
    },
    WriteField {
        obj: u32,
        field: String,
        src: u32,
    },
    StaticCall {
        dst: u32,
        #[serde(rename = "type")]
        ty: TypeJson,
        method: String,
        #[serde(default)]
        type_args: Vec<TypeJson>,
        #[serde(default)]
        args: Vec<u32>,
    },
    VirtualCall {
        dst: u32,
        receiver: u32,
        method: String,
        #[serde(default)]
        type_args: Vec<TypeJson>,
        #[serde(default)]
        args: Vec<u32>,
    },
    TypeTest {
        dst: u32,
        src: u32,
        #[serde(rename = "type")]
        ty: TypeJson,
    },
    BinOp {
        op: BinOpJson,
        dst: u32,
        lhs: u32,
        rhs: u32,
    },
    Print {
        src: u32,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TerminatorJson {
    Return {
        src: u32,
    },
    ReturnUnit,
    Jump {
        target: u32,
    },
    Branch {
        cond: u32,
        then_block: u32,
        else_block: u32,
    },
}

/// Parse a JSON program and the register types of its methods.
pub fn load_str(text: &str) -> Result<(Program, AnalysisResults), LoadError> {
    let doc: ProgramJson = serde_json::from_str(text)?;
    Loader::default().load(doc)
}

pub fn load_path(path: impl AsRef<Path>) -> Result<(Program, AnalysisResults), LoadError> {
    let text = std::fs::read_to_string(path)?;
    load_str(&text)
}

#[derive(Default)]
struct Loader {
    builder: ProgramBuilder,
    ids: Vec<(String, EntityId)>,
    analysis: AnalysisResults,
}

impl Loader {
    fn load(mut self, doc: ProgramJson) -> Result<(Program, AnalysisResults), LoadError> {
        if let Some(source) = doc.source {
            self.builder.source(source);
        }

        // Declare every entity first so types can name later ones.
        for entity in &doc.entities {
            let kind = match entity.kind {
                KindJson::Class => EntityKind::Class { fields: Vec::new() },
                KindJson::Interface => EntityKind::Interface,
                KindJson::Primitive => EntityKind::Primitive,
            };
            let id = self.builder.entity(&entity.name, kind)?;
            let generics: Vec<&str> = entity.generics.iter().map(String::as_str).collect();
            self.builder.generics(id, &generics);
            if let Some(span) = entity.span {
                self.builder.entity_span(id, range(span)?);
            }
            self.ids.push((entity.name.clone(), id));
        }

        for entity in doc.entities {
            let id = self.entity_id(&entity.name)?;
            for field in entity.fields {
                let ty = self.ty(&field.ty)?;
                self.builder.field(id, &field.name, ty)?;
            }
            for method in entity.methods {
                self.method(id, method)?;
            }
        }

        Ok((self.builder.build(), self.analysis))
    }

    fn method(&mut self, entity: EntityId, doc: MethodJson) -> Result<(), LoadError> {
        let signature = FnSignature {
            generics: doc
                .generics
                .iter()
                .map(|g| self.builder.intern(g))
                .collect(),
            receiver: doc.receiver.as_ref().map(|t| self.ty(t)).transpose()?,
            arguments: self.types(&doc.arguments)?,
            return_type: self.ty(&doc.returns)?,
        };

        let body = match doc.body {
            Some(blocks) => Some(FnBody {
                blocks: blocks
                    .into_iter()
                    .map(|b| self.block(b))
                    .collect::<Result<_, _>>()?,
            }),
            None => None,
        };

        let id = self.builder.method(entity, &doc.name, signature, body)?;
        if let Some(span) = doc.span {
            self.builder.method_span(id, range(span)?);
        }
        if let Some(registers) = &doc.registers {
            let registers = self.types(registers)?;
            self.analysis.insert(id, FnAnalysis::new(registers));
        }
        Ok(())
    }

    fn block(&mut self, doc: BlockJson) -> Result<Block, LoadError> {
        let statements = doc
            .statements
            .into_iter()
            .map(|s| self.statement(s))
            .collect::<Result<_, _>>()?;
        let terminator = match doc.terminator {
            TerminatorJson::Return { src } => Terminator::Return(Local(src)),
            TerminatorJson::ReturnUnit => Terminator::ReturnUnit,
            TerminatorJson::Jump { target } => Terminator::Jump(BlockId(target)),
            TerminatorJson::Branch {
                cond,
                then_block,
                else_block,
            } => Terminator::Branch {
                cond: Local(cond),
                then_block: BlockId(then_block),
                else_block: BlockId(else_block),
            },
        };
        Ok(Block {
            statements,
            terminator,
        })
    }

    fn statement(&mut self, doc: StatementJson) -> Result<Statement, LoadError> {
        Ok(match doc {
            StatementJson::Const { dst, value } => Statement::Const {
                dst: Local(dst),
                value,
            },
            StatementJson::Copy { dst, src } => Statement::Copy {
                dst: Local(dst),
                src: Local(src),
            },
            StatementJson::New { dst, ty } => Statement::New {
                dst: Local(dst),
                ty: self.ty(&ty)?,
            },
            StatementJson::ReadField { dst, obj, field } => Statement::ReadField {
                dst: Local(dst),
                obj: Local(obj),
                field: self.builder.intern(&field),
            },
            StatementJson::WriteField { obj, field, src } => Statement::WriteField {
                obj: Local(obj),
                field: self.builder.intern(&field),
                src: Local(src),
            },
            StatementJson::StaticCall {
                dst,
                ty,
                method,
                type_args,
                args,
            } => Statement::StaticCall {
                dst: Local(dst),
                ty: self.ty(&ty)?,
                method: self.builder.intern(&method),
                type_args: self.types(&type_args)?,
                args: args.into_iter().map(Local).collect(),
            },
            StatementJson::VirtualCall {
                dst,
                receiver,
                method,
                type_args,
                args,
            } => Statement::VirtualCall {
                dst: Local(dst),
                receiver: Local(receiver),
                method: self.builder.intern(&method),
                type_args: self.types(&type_args)?,
                args: args.into_iter().map(Local).collect(),
            },
            StatementJson::TypeTest { dst, src, ty } => Statement::TypeTest {
                dst: Local(dst),
                src: Local(src),
                ty: self.ty(&ty)?,
            },
            StatementJson::BinOp { op, dst, lhs, rhs } => Statement::BinOp {
                op: op.into(),
                dst: Local(dst),
                lhs: Local(lhs),
                rhs: Local(rhs),
            },
            StatementJson::Print { src } => Statement::Print { src: Local(src) },
        })
    }

    fn entity_id(&self, name: &str) -> Result<EntityId, LoadError> {
        self.ids
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, id)| id)
            .ok_or_else(|| LoadError::UnknownEntity(name.to_owned()))
    }

    fn ty(&self, doc: &TypeJson) -> Result<TypeRef, LoadError> {
        Ok(match doc {
            TypeJson::Unit => TypeRef::Unit,
            TypeJson::Param(i) => TypeRef::Param(*i),
            TypeJson::Entity { name, args } => TypeRef::Entity {
                entity: self.entity_id(name)?,
                args: self.types(args)?,
            },
        })
    }

    fn types(&self, docs: &[TypeJson]) -> Result<Vec<TypeRef>, LoadError> {
        docs.iter().map(|t| self.ty(t)).collect()
    }
}

fn range([start, end]: [u32; 2]) -> Result<TextRange, LoadError> {
    if start > end {
        return Err(LoadError::InvalidSpan { start, end });
    }
    Ok(TextRange::new(TextSize::from(start), TextSize::from(end)))
}

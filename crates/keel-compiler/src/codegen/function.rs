//! Function body emission.

use keel_bytecode::{MAX_REGISTERS, Opcode, Reg};
use keel_core::Symbol;
use tracing::trace;

use crate::analysis::{AnalysisResults, FnAnalysis};
use crate::instantiation::Instantiation;
use crate::program::{FnBody, Local, Program, Statement, Terminator, TypeRef};

use super::error::EmitError;
use super::generator::{Generator, Label, Relocatable};
use super::reachability::{MethodItem, Reachability, concrete_entity};
use super::selector::{Selector, SelectorTable};

/// Emit code for every reachable method with a body, in graph order.
pub fn emit_functions(
    program: &Program,
    analysis: &AnalysisResults,
    graph: &Reachability,
    selectors: &SelectorTable,
    generator: &mut Generator,
) -> Result<(), EmitError> {
    for (item, label) in graph.functions() {
        generator.define_label(label)?;
        let mut emitter = FnEmitter::new(program, analysis, graph, selectors, item)?;
        emitter.emit(generator)?;
    }
    Ok(())
}

/// Printable name of a method item: `Cell[U64].get`.
pub fn method_name(program: &Program, item: &MethodItem) -> String {
    let method = program.method(item.definition);
    let arity = program.entity(method.entity).generics.len();
    let (head, own) = item.instantiation.split(arity);
    let owner = program.display_entity(method.entity, head.args());
    let selector = Selector::new(method.name, own.to_vec());
    format!("{owner}.{}", selector.display(program))
}

struct FnEmitter<'a> {
    program: &'a Program,
    graph: &'a Reachability,
    selectors: &'a SelectorTable,
    item: &'a MethodItem,
    body: &'a FnBody,
    facts: &'a FnAnalysis,
    name: String,
    blocks: Vec<Label>,
}

impl<'a> FnEmitter<'a> {
    fn new(
        program: &'a Program,
        analysis: &'a AnalysisResults,
        graph: &'a Reachability,
        selectors: &'a SelectorTable,
        item: &'a MethodItem,
    ) -> Result<Self, EmitError> {
        let name = method_name(program, item);
        let Some(body) = &program.method(item.definition).body else {
            return Err(EmitError::InvalidBlock {
                method: name,
                block: 0,
            });
        };
        let facts = analysis
            .get(item.definition)
            .ok_or_else(|| EmitError::MissingAnalysis(name.clone()))?;

        Ok(Self {
            program,
            graph,
            selectors,
            item,
            body,
            facts,
            name,
            blocks: Vec::new(),
        })
    }

    fn inst(&self) -> &'a Instantiation {
        &self.item.instantiation
    }

    fn emit(&mut self, g: &mut Generator) -> Result<(), EmitError> {
        trace!(function = %self.name, at = g.offset(), "emitting function");

        let frame = self.facts.frame_size();
        let argc = self.program.method(self.item.definition).signature.arity();
        let count = frame.max(argc);
        if count > MAX_REGISTERS {
            return Err(EmitError::TooManyRegisters {
                method: self.name.clone(),
                count,
            });
        }
        if argc > frame {
            return Err(EmitError::RegisterOutOfRange {
                method: self.name.clone(),
                local: argc as u32 - 1,
                frame,
            });
        }
        g.opcode(Opcode::Enter);
        g.u8(argc as u8);
        g.u8(frame as u8);

        if self.body.blocks.is_empty() {
            return Err(EmitError::InvalidBlock {
                method: self.name.clone(),
                block: 0,
            });
        }
        self.blocks = self.body.blocks.iter().map(|_| g.create_label()).collect();

        for (&label, block) in self.blocks.iter().zip(&self.body.blocks) {
            g.define_label(label)?;
            for statement in &block.statements {
                self.statement(g, statement)?;
            }
            self.terminator(g, &block.terminator)?;
        }
        Ok(())
    }

    fn statement(&self, g: &mut Generator, statement: &Statement) -> Result<(), EmitError> {
        match statement {
            Statement::Const { dst, value } => {
                let dst = self.reg(*dst)?;
                g.opcode(Opcode::LoadConst);
                g.reg(dst);
                g.u64(*value);
            }
            Statement::Copy { dst, src } => {
                let (dst, src) = (self.reg(*dst)?, self.reg(*src)?);
                g.opcode(Opcode::Copy);
                g.reg(dst);
                g.reg(src);
            }
            Statement::New { dst, ty } => {
                let dst = self.reg(*dst)?;
                let descriptor = self.descriptor(ty)?;
                g.opcode(Opcode::New);
                g.reg(dst);
                g.relocatable(descriptor);
            }
            Statement::ReadField { dst, obj, field } => {
                let slot = self.field_slot(*obj, *field)?;
                let (dst, obj) = (self.reg(*dst)?, self.reg(*obj)?);
                g.opcode(Opcode::Load);
                g.reg(dst);
                g.reg(obj);
                g.u16(slot);
            }
            Statement::WriteField { obj, field, src } => {
                let slot = self.field_slot(*obj, *field)?;
                let (obj, src) = (self.reg(*obj)?, self.reg(*src)?);
                g.opcode(Opcode::Store);
                g.reg(obj);
                g.u16(slot);
                g.reg(src);
            }
            Statement::StaticCall {
                dst,
                ty,
                method,
                type_args,
                args,
            } => {
                let program = self.program;
                let entity = concrete_entity(program, self.inst(), ty)?;
                let missing = || EmitError::MissingCallTarget {
                    entity: program.display_entity(entity.definition, entity.instantiation.args()),
                    method: program.resolve(*method).to_owned(),
                };
                let target = program
                    .lookup_method_symbol(entity.definition, *method)
                    .ok_or_else(missing)?;
                let callee = MethodItem::new(
                    target,
                    entity
                        .instantiation
                        .extend(&self.inst().apply_all(type_args)),
                );
                let label = self
                    .graph
                    .method(program, &callee)
                    .ok_or_else(|| EmitError::UnreachableMethod(method_name(program, &callee)))?
                    .label
                    .ok_or_else(missing)?;

                let dst = self.reg(*dst)?;
                let args = self.args(args.iter().copied())?;
                g.opcode(Opcode::Call);
                g.reg(dst);
                g.label(label);
                self.emit_args(g, &args);
            }
            Statement::VirtualCall {
                dst,
                receiver,
                method,
                type_args,
                args,
            } => {
                let selector = Selector::new(*method, self.inst().apply_all(type_args));
                let idx = self
                    .selectors
                    .get(&selector)
                    .ok_or_else(|| EmitError::UnknownSelector(selector.display(self.program)))?;

                let dst = self.reg(*dst)?;
                let args = self.args(std::iter::once(*receiver).chain(args.iter().copied()))?;
                g.opcode(Opcode::CallVirtual);
                g.reg(dst);
                g.selector(idx);
                self.emit_args(g, &args);
            }
            Statement::TypeTest { dst, src, ty } => {
                let (dst, src) = (self.reg(*dst)?, self.reg(*src)?);
                let descriptor = self.descriptor(ty)?;
                g.opcode(Opcode::TypeTest);
                g.reg(dst);
                g.reg(src);
                g.relocatable(descriptor);
            }
            Statement::BinOp { op, dst, lhs, rhs } => {
                let (dst, lhs, rhs) = (self.reg(*dst)?, self.reg(*lhs)?, self.reg(*rhs)?);
                g.opcode(Opcode::BinOp);
                g.u8(*op as u8);
                g.reg(dst);
                g.reg(lhs);
                g.reg(rhs);
            }
            Statement::Print { src } => {
                let src = self.reg(*src)?;
                g.opcode(Opcode::Print);
                g.reg(src);
            }
        }
        Ok(())
    }

    fn terminator(&self, g: &mut Generator, terminator: &Terminator) -> Result<(), EmitError> {
        match terminator {
            Terminator::Return(src) => {
                let src = self.reg(*src)?;
                g.opcode(Opcode::Return);
                g.reg(src);
            }
            Terminator::ReturnUnit => g.opcode(Opcode::ReturnUnit),
            Terminator::Jump(block) => {
                let target = self.block(block.0)?;
                g.opcode(Opcode::Jump);
                g.label(target);
            }
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.reg(*cond)?;
                let (then_label, else_label) = (self.block(then_block.0)?, self.block(else_block.0)?);
                g.opcode(Opcode::Branch);
                g.reg(cond);
                g.label(then_label);
                g.label(else_label);
            }
        }
        Ok(())
    }

    fn reg(&self, local: Local) -> Result<Reg, EmitError> {
        let frame = self.facts.frame_size();
        if local.0 as usize >= frame {
            return Err(EmitError::RegisterOutOfRange {
                method: self.name.clone(),
                local: local.0,
                frame,
            });
        }
        Ok(Reg(local.0 as u8))
    }

    fn args(&self, locals: impl Iterator<Item = Local>) -> Result<Vec<Reg>, EmitError> {
        let regs = locals.map(|l| self.reg(l)).collect::<Result<Vec<_>, _>>()?;
        if regs.len() > u8::MAX as usize {
            return Err(EmitError::TooManyArguments {
                method: self.name.clone(),
                count: regs.len(),
            });
        }
        Ok(regs)
    }

    fn emit_args(&self, g: &mut Generator, args: &[Reg]) {
        g.u8(args.len() as u8);
        for &arg in args {
            g.reg(arg);
        }
    }

    fn block(&self, id: u32) -> Result<Label, EmitError> {
        self.blocks
            .get(id as usize)
            .copied()
            .ok_or_else(|| EmitError::InvalidBlock {
                method: self.name.clone(),
                block: id,
            })
    }

    fn descriptor(&self, ty: &TypeRef) -> Result<Relocatable, EmitError> {
        let program = self.program;
        let entity = concrete_entity(program, self.inst(), ty)?;
        self.graph
            .entity(&entity)
            .map(|e| e.descriptor)
            .ok_or_else(|| {
                EmitError::UnreachableEntity(
                    program.display_entity(entity.definition, entity.instantiation.args()),
                )
            })
    }

    /// Slot of `field` in the object held by `obj`, from the local's static type.
    fn field_slot(&self, obj: Local, field: Symbol) -> Result<u16, EmitError> {
        let program = self.program;
        let ty = self.facts.type_of(obj).ok_or(EmitError::RegisterOutOfRange {
            method: self.name.clone(),
            local: obj.0,
            frame: self.facts.frame_size(),
        })?;
        let entity = concrete_entity(program, self.inst(), ty)?;
        let slot = program
            .entity(entity.definition)
            .field_slot(field)
            .ok_or_else(|| EmitError::UnknownField {
                entity: program.display_entity(entity.definition, entity.instantiation.args()),
                field: program.resolve(field).to_owned(),
            })?;
        u16::try_from(slot).map_err(|_| EmitError::ValueOutOfRange {
            value: slot as u64,
            width: 2,
        })
    }
}

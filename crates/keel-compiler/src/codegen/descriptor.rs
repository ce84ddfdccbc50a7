//! Descriptor table emission.

use keel_bytecode::{ABSENT, EntityTag, FieldStorage};
use tracing::trace;

use crate::program::{EntityKind, Program, TypeRef};

use super::error::EmitError;
use super::generator::{Generator, Label};
use super::reachability::{EntityItem, EntityReachability, Reachability};
use super::selector::{SelectorTable, selector_of};

/// Emit one record per reachable entity, in graph order.
///
/// Each entity's descriptor relocatable is defined as its position in the
/// table, which is what `New` and `TypeTest` operands encode.
pub fn emit_descriptors(
    program: &Program,
    graph: &Reachability,
    selectors: &SelectorTable,
    generator: &mut Generator,
) -> Result<(), EmitError> {
    for (index, (item, reach)) in graph.entities.iter().enumerate() {
        generator.define_relocatable(reach.descriptor, index as u64)?;
        emit_record(program, item, reach, selectors, generator)?;
    }
    Ok(())
}

fn emit_record(
    program: &Program,
    item: &EntityItem,
    reach: &EntityReachability,
    selectors: &SelectorTable,
    generator: &mut Generator,
) -> Result<(), EmitError> {
    let entity = program.entity(item.definition);
    let name = program.display_entity(item.definition, item.instantiation.args());
    trace!(descriptor = %name, at = generator.offset(), "emitting descriptor");

    let tag = match entity.kind {
        EntityKind::Class { .. } => EntityTag::Class,
        EntityKind::Interface => EntityTag::Interface,
        EntityKind::Primitive => EntityTag::Primitive,
    };
    generator.u8(tag as u8);
    generator.str(&name)?;

    let fields = entity.fields();
    generator.u16(count_u16(fields.len())?);
    for field in fields {
        let ty = item.instantiation.apply(&field.ty);
        generator.u8(storage(program, &ty) as u8);
    }

    let slots = dispatch_slots(program, reach, selectors)?;
    generator.u16(count_u16(slots.len())?);
    for slot in slots {
        match slot {
            Some(label) => generator.label(label),
            None => generator.u32(ABSENT),
        }
    }
    Ok(())
}

/// Code label for each selector index. Methods reached only through static
/// calls have no slot, and bodiless methods stay absent.
fn dispatch_slots(
    program: &Program,
    reach: &EntityReachability,
    selectors: &SelectorTable,
) -> Result<Vec<Option<Label>>, EmitError> {
    let mut slots = vec![None; selectors.len()];
    for (method, m) in &reach.methods {
        let Some(label) = m.label else { continue };
        let Some(selector) = selector_of(program, method) else {
            continue;
        };
        let Some(idx) = selectors.get(&selector) else {
            continue;
        };
        let index = idx.0 as usize;
        let count = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(EmitError::SelectorOutOfRange { index, count })?;
        *slot = Some(label);
    }
    Ok(slots)
}

/// Storage class of a field of (already substituted) type `ty`.
///
/// Unit and primitives are stored inline. Everything else, including a
/// parameter left unbound, is a reference.
pub fn storage(program: &Program, ty: &TypeRef) -> FieldStorage {
    match ty {
        TypeRef::Unit => FieldStorage::Value,
        TypeRef::Entity { entity, .. } => match program.entity(*entity).kind {
            EntityKind::Primitive => FieldStorage::Value,
            EntityKind::Class { .. } | EntityKind::Interface => FieldStorage::Reference,
        },
        TypeRef::Param(_) => FieldStorage::Reference,
    }
}

fn count_u16(n: usize) -> Result<u16, EmitError> {
    u16::try_from(n).map_err(|_| EmitError::ValueOutOfRange {
        value: n as u64,
        width: 2,
    })
}

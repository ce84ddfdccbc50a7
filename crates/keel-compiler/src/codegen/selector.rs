//! Dense numbering of virtual-dispatch selectors.

use indexmap::IndexSet;
use keel_bytecode::SelectorIdx;
use keel_core::Symbol;
use tracing::debug;

use crate::program::{Program, Statement, TypeRef};

use super::error::EmitError;
use super::reachability::{MethodItem, Reachability};

/// Method name plus the method's own type arguments.
///
/// A generic method invoked with different arguments is a different
/// selector: each instantiation has its own code.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector {
    pub name: Symbol,
    pub type_args: Vec<TypeRef>,
}

impl Selector {
    pub fn new(name: Symbol, type_args: Vec<TypeRef>) -> Self {
        Self { name, type_args }
    }

    pub fn display(&self, program: &Program) -> String {
        let name = program.resolve(self.name);
        if self.type_args.is_empty() {
            return name.to_owned();
        }
        let args: Vec<String> = self
            .type_args
            .iter()
            .map(|t| program.display_type(t))
            .collect();
        format!("{name}[{}]", args.join(", "))
    }
}

/// The selector a method implements when reached through dispatch.
///
/// Static methods implement none.
pub fn selector_of(program: &Program, item: &MethodItem) -> Option<Selector> {
    let method = program.method(item.definition);
    if !method.is_instance() {
        return None;
    }
    let arity = program.entity(method.entity).generics.len();
    let (_, own) = item.instantiation.split(arity);
    Some(Selector::new(method.name, own.to_vec()))
}

#[derive(Clone, Debug, Default)]
pub struct SelectorTable {
    selectors: IndexSet<Selector>,
}

impl SelectorTable {
    /// Number every selector invoked by a reachable body, first sight first.
    pub fn build(program: &Program, graph: &Reachability) -> Result<Self, EmitError> {
        let mut selectors = IndexSet::new();

        for (item, _) in graph.functions() {
            let Some(body) = &program.method(item.definition).body else {
                continue;
            };
            let statements = body.blocks.iter().flat_map(|b| b.statements.iter());
            for statement in statements {
                if let Statement::VirtualCall {
                    method, type_args, ..
                } = statement
                {
                    let type_args = item.instantiation.apply_all(type_args);
                    selectors.insert(Selector::new(*method, type_args));
                }
            }
        }

        if selectors.len() > u16::MAX as usize {
            return Err(EmitError::TooManySelectors(selectors.len()));
        }

        debug!(count = selectors.len(), "selector table built");
        Ok(Self { selectors })
    }

    pub fn get(&self, selector: &Selector) -> Option<SelectorIdx> {
        self.selectors
            .get_index_of(selector)
            .map(|i| SelectorIdx(i as u16))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SelectorIdx, &Selector)> {
        self.selectors
            .iter()
            .enumerate()
            .map(|(i, s)| (SelectorIdx(i as u16), s))
    }
}

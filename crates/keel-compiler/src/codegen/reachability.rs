//! Reachability analysis from the entry point.
//!
//! Computes the closed set of (entity, instantiation) and (method,
//! instantiation) pairs the program can observe at run time:
//!
//! - `New` and `TypeTest` make their entity reachable
//! - `StaticCall` makes its target method and receiver entity reachable
//! - `VirtualCall` invokes a selector; every reachable entity with a matching
//!   instance method gets that method, including entities found later
//!
//! Methods are processed from a FIFO work-list and recorded in
//! insertion-ordered maps, so the result (and therefore the emitted image)
//! is identical across runs.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::instantiation::Instantiation;
use crate::program::{EntityId, MethodId, Program, Statement, TypeRef};

use super::error::EmitError;
use super::generator::{Generator, Label, Relocatable};
use super::selector::Selector;

/// A definition paired with the type arguments it is used under.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReachableItem<D> {
    pub definition: D,
    pub instantiation: Instantiation,
}

impl<D> ReachableItem<D> {
    pub fn new(definition: D, instantiation: Instantiation) -> Self {
        Self {
            definition,
            instantiation,
        }
    }

    pub fn non_generic(definition: D) -> Self {
        Self::new(definition, Instantiation::empty())
    }
}

pub type EntityItem = ReachableItem<EntityId>;
pub type MethodItem = ReachableItem<MethodId>;

/// The entity a method item belongs to, under the entity's share of the
/// method's instantiation.
pub fn owner(program: &Program, method: &MethodItem) -> EntityItem {
    let entity = program.method(method.definition).entity;
    let arity = program.entity(entity).generics.len();
    let (head, _) = method.instantiation.split(arity);
    EntityItem::new(entity, head)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodReachability {
    /// Code location. `None` for methods without a body.
    pub label: Option<Label>,
}

#[derive(Clone, Debug)]
pub struct EntityReachability {
    pub descriptor: Relocatable,
    pub methods: IndexMap<MethodItem, MethodReachability>,
}

#[derive(Clone, Debug, Default)]
pub struct Reachability {
    pub entities: IndexMap<EntityItem, EntityReachability>,
}

impl Reachability {
    pub fn entity(&self, item: &EntityItem) -> Option<&EntityReachability> {
        self.entities.get(item)
    }

    pub fn method(&self, program: &Program, item: &MethodItem) -> Option<&MethodReachability> {
        self.entities.get(&owner(program, item))?.methods.get(item)
    }

    pub fn method_count(&self) -> usize {
        self.entities.values().map(|e| e.methods.len()).sum()
    }

    /// Reachable methods with a body, in emission order.
    pub fn functions(&self) -> impl Iterator<Item = (&MethodItem, Label)> {
        self.entities
            .values()
            .flat_map(|e| e.methods.iter())
            .filter_map(|(item, m)| m.label.map(|label| (item, label)))
    }
}

/// Run the analysis seeded with the entry pair.
///
/// Descriptor relocatables and code labels are allocated from `generator`
/// as items are discovered.
pub fn analyze(
    program: &Program,
    entry_entity: &EntityItem,
    entry_method: &MethodItem,
    generator: &mut Generator,
) -> Result<Reachability, EmitError> {
    let mut analyzer = Analyzer {
        program,
        generator,
        graph: Reachability::default(),
        invoked: IndexSet::new(),
        queue: VecDeque::new(),
    };

    analyzer.add_entity(entry_entity);
    analyzer.add_method(entry_method);

    while let Some(item) = analyzer.queue.pop_front() {
        analyzer.process(&item)?;
    }

    debug!(
        entities = analyzer.graph.entities.len(),
        methods = analyzer.graph.method_count(),
        invoked = analyzer.invoked.len(),
        "reachability complete"
    );
    Ok(analyzer.graph)
}

struct Analyzer<'a> {
    program: &'a Program,
    generator: &'a mut Generator,
    graph: Reachability,
    invoked: IndexSet<Selector>,
    queue: VecDeque<MethodItem>,
}

impl Analyzer<'_> {
    fn add_entity(&mut self, item: &EntityItem) {
        if self.graph.entities.contains_key(item) {
            return;
        }

        trace!(
            entity = %self.program.display_entity(item.definition, item.instantiation.args()),
            "entity reachable"
        );
        let descriptor = self.generator.create_relocatable();
        self.graph.entities.insert(
            item.clone(),
            EntityReachability {
                descriptor,
                methods: IndexMap::new(),
            },
        );

        let invoked: Vec<Selector> = self.invoked.iter().cloned().collect();
        for selector in &invoked {
            self.add_matching(item, selector);
        }
    }

    fn add_method(&mut self, item: &MethodItem) {
        let program = self.program;
        let entity = owner(program, item);
        self.add_entity(&entity);

        let known = self
            .graph
            .entities
            .get(&entity)
            .is_some_and(|e| e.methods.contains_key(item));
        if known {
            return;
        }

        let method = program.method(item.definition);
        let label = method.body.as_ref().map(|_| self.generator.create_label());
        trace!(
            method = %program.resolve(method.name),
            entity = %program.display_entity(entity.definition, entity.instantiation.args()),
            has_body = label.is_some(),
            "method reachable"
        );

        if let Some(e) = self.graph.entities.get_mut(&entity) {
            e.methods.insert(item.clone(), MethodReachability { label });
        }
        if label.is_some() {
            self.queue.push_back(item.clone());
        }
    }

    /// Record a virtual call and close over entities already reachable.
    fn invoke(&mut self, selector: Selector) {
        if self.invoked.contains(&selector) {
            return;
        }
        self.invoked.insert(selector.clone());

        let entities: Vec<EntityItem> = self.graph.entities.keys().cloned().collect();
        for entity in &entities {
            self.add_matching(entity, &selector);
        }
    }

    /// Add the instance methods of `entity` that `selector` dispatches to.
    fn add_matching(&mut self, entity: &EntityItem, selector: &Selector) {
        let program = self.program;
        for &id in &program.entity(entity.definition).methods {
            let method = program.method(id);
            if method.name == selector.name
                && method.is_instance()
                && method.signature.generics.len() == selector.type_args.len()
            {
                let inst = entity.instantiation.extend(&selector.type_args);
                self.add_method(&MethodItem::new(id, inst));
            }
        }
    }

    fn process(&mut self, item: &MethodItem) -> Result<(), EmitError> {
        let program = self.program;
        let Some(body) = &program.method(item.definition).body else {
            return Ok(());
        };
        let inst = &item.instantiation;

        for block in &body.blocks {
            for statement in &block.statements {
                match statement {
                    Statement::New { ty, .. } | Statement::TypeTest { ty, .. } => {
                        let entity = concrete_entity(program, inst, ty)?;
                        self.add_entity(&entity);
                    }
                    Statement::StaticCall {
                        ty,
                        method,
                        type_args,
                        ..
                    } => {
                        let entity = concrete_entity(program, inst, ty)?;
                        let target = program
                            .lookup_method_symbol(entity.definition, *method)
                            .ok_or_else(|| EmitError::MissingCallTarget {
                                entity: program.display_type(&inst.apply(ty)),
                                method: program.resolve(*method).to_owned(),
                            })?;
                        let method_inst = entity.instantiation.extend(&inst.apply_all(type_args));
                        self.add_method(&MethodItem::new(target, method_inst));
                    }
                    Statement::VirtualCall {
                        method, type_args, ..
                    } => {
                        self.invoke(Selector::new(*method, inst.apply_all(type_args)));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

/// Substitute `inst` into `ty` and require a closed entity type.
pub fn concrete_entity(
    program: &Program,
    inst: &Instantiation,
    ty: &TypeRef,
) -> Result<EntityItem, EmitError> {
    let ty = inst.apply(ty);
    if !ty.is_closed() {
        return Err(EmitError::OpenType(program.display_type(&ty)));
    }
    match ty {
        TypeRef::Entity { entity, args } => Ok(EntityItem::new(entity, Instantiation::new(args))),
        other => Err(EmitError::ExpectedEntityType(program.display_type(&other))),
    }
}

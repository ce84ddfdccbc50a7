//! Resolved program model.
//!
//! This is the shape codegen consumes: every name already resolved to an
//! `EntityId` or `MethodId`, every type already checked. Programs are built
//! with [`ProgramBuilder`] (directly in tests, or by the JSON loader).

mod body;
mod builder;


use keel_core::{Interner, Symbol};
use rowan::TextRange;

pub use body::{Block, BlockId, FnBody, Local, Statement, Terminator};
pub use builder::{BuildError, ProgramBuilder};

/// Stable index of an entity in its program.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable index of a method in its program.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MethodId(pub(crate) u32);

impl MethodId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A type as written in signatures, fields, and statement operands.
///
/// `Param(i)` indexes the combined generic list of the enclosing entity
/// followed by the enclosing method's own generics.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum TypeRef {
    #[default]
    Unit,
    Param(u32),
    Entity { entity: EntityId, args: Vec<TypeRef> },
}

impl TypeRef {
    /// Non-generic use of an entity.
    pub fn entity(entity: EntityId) -> Self {
        Self::Entity {
            entity,
            args: Vec::new(),
        }
    }

    pub fn generic(entity: EntityId, args: Vec<TypeRef>) -> Self {
        Self::Entity { entity, args }
    }

    /// True when no `Param` occurs anywhere inside.
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Unit => true,
            Self::Param(_) => false,
            Self::Entity { args, .. } => args.iter().all(TypeRef::is_closed),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: Symbol,
    pub ty: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Class { fields: Vec<Field> },
    Interface,
    Primitive,
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub name: Symbol,
    pub span: TextRange,
    pub generics: Vec<Symbol>,
    pub kind: EntityKind,
    pub methods: Vec<MethodId>,
}

impl Entity {
    pub fn is_class(&self) -> bool {
        matches!(self.kind, EntityKind::Class { .. })
    }

    /// Declared fields. Only classes have any.
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            EntityKind::Class { fields } => fields,
            EntityKind::Interface | EntityKind::Primitive => &[],
        }
    }

    /// Slot index of a field, in declaration order.
    pub fn field_slot(&self, name: Symbol) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FnSignature {
    pub generics: Vec<Symbol>,
    /// Explicit receiver parameter. `None` for static methods.
    pub receiver: Option<TypeRef>,
    pub arguments: Vec<TypeRef>,
    pub return_type: TypeRef,
}

impl FnSignature {
    /// Parameter count as seen by the callee frame, receiver included.
    pub fn arity(&self) -> usize {
        self.arguments.len() + usize::from(self.receiver.is_some())
    }
}

#[derive(Clone, Debug)]
pub struct Method {
    pub name: Symbol,
    pub span: TextRange,
    pub entity: EntityId,
    pub signature: FnSignature,
    /// `None` for abstract and native methods.
    pub body: Option<FnBody>,
}

impl Method {
    pub fn is_instance(&self) -> bool {
        self.signature.receiver.is_some()
    }
}

#[derive(Debug, Default)]
pub struct Program {
    interner: Interner,
    entities: Vec<Entity>,
    methods: Vec<Method>,
    source: Option<String>,
}

impl Program {
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    pub fn find_entity(&self, name: &str) -> Option<EntityId> {
        let sym = self.interner.get(name)?;
        self.entities
            .iter()
            .position(|e| e.name == sym)
            .map(|i| EntityId(i as u32))
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id.index()]
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i as u32), e))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// First method of `entity` with the given name.
    pub fn lookup_method(&self, entity: EntityId, name: &str) -> Option<MethodId> {
        let sym = self.interner.get(name)?;
        self.lookup_method_symbol(entity, sym)
    }

    pub fn lookup_method_symbol(&self, entity: EntityId, name: Symbol) -> Option<MethodId> {
        self.entity(entity)
            .methods
            .iter()
            .copied()
            .find(|&m| self.method(m).name == name)
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Source text the spans point into, when the front end supplied it.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Render a type the way it appears in descriptor names: `Cell[U64]`.
    pub fn display_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Unit => "Unit".to_owned(),
            TypeRef::Param(i) => format!("${i}"),
            TypeRef::Entity { entity, args } => self.display_entity(*entity, args),
        }
    }

    pub fn display_entity(&self, entity: EntityId, args: &[TypeRef]) -> String {
        let name = self.resolve(self.entity(entity).name);
        if args.is_empty() {
            return name.to_owned();
        }
        let args: Vec<String> = args.iter().map(|a| self.display_type(a)).collect();
        format!("{name}[{}]", args.join(", "))
    }
}

//! Incremental construction of a [`Program`].

use keel_core::Symbol;
use rowan::TextRange;

use super::{
    Entity, EntityId, EntityKind, Field, FnBody, FnSignature, Method, MethodId, Program, TypeRef,
};

/// Errors from malformed program construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("entity `{0}` is already defined")]
    DuplicateEntity(String),

    #[error("`{entity}` already has a method named `{method}`")]
    DuplicateMethod { entity: String, method: String },

    #[error("`{entity}` already has a field named `{field}`")]
    DuplicateField { entity: String, field: String },

    #[error("`{0}` is not a class and cannot have fields")]
    FieldOnNonClass(String),
}

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.program.interner.intern(name)
    }

    /// Attach the source text that spans refer to.
    pub fn source(&mut self, text: impl Into<String>) -> &mut Self {
        self.program.source = Some(text.into());
        self
    }

    pub fn entity(&mut self, name: &str, kind: EntityKind) -> Result<EntityId, BuildError> {
        if self.program.find_entity(name).is_some() {
            return Err(BuildError::DuplicateEntity(name.to_owned()));
        }
        let name = self.intern(name);
        let id = EntityId(self.program.entities.len() as u32);
        self.program.entities.push(Entity {
            name,
            span: TextRange::default(),
            generics: Vec::new(),
            kind,
            methods: Vec::new(),
        });
        Ok(id)
    }

    pub fn class(&mut self, name: &str) -> Result<EntityId, BuildError> {
        self.entity(name, EntityKind::Class { fields: Vec::new() })
    }

    pub fn interface(&mut self, name: &str) -> Result<EntityId, BuildError> {
        self.entity(name, EntityKind::Interface)
    }

    pub fn primitive(&mut self, name: &str) -> Result<EntityId, BuildError> {
        self.entity(name, EntityKind::Primitive)
    }

    pub fn generics(&mut self, entity: EntityId, names: &[&str]) -> &mut Self {
        let names: Vec<Symbol> = names.iter().map(|n| self.intern(n)).collect();
        self.program.entities[entity.index()].generics = names;
        self
    }

    pub fn entity_span(&mut self, entity: EntityId, span: TextRange) -> &mut Self {
        self.program.entities[entity.index()].span = span;
        self
    }

    pub fn field(&mut self, entity: EntityId, name: &str, ty: TypeRef) -> Result<(), BuildError> {
        let field = self.intern(name);
        let entity_name = self.program.resolve(self.program.entity(entity).name).to_owned();

        let EntityKind::Class { fields } = &mut self.program.entities[entity.index()].kind else {
            return Err(BuildError::FieldOnNonClass(entity_name));
        };
        if fields.iter().any(|f| f.name == field) {
            return Err(BuildError::DuplicateField {
                entity: entity_name,
                field: name.to_owned(),
            });
        }
        fields.push(Field { name: field, ty });
        Ok(())
    }

    pub fn method(
        &mut self,
        entity: EntityId,
        name: &str,
        signature: FnSignature,
        body: Option<FnBody>,
    ) -> Result<MethodId, BuildError> {
        if self.program.lookup_method(entity, name).is_some() {
            let entity_name = self.program.resolve(self.program.entity(entity).name);
            return Err(BuildError::DuplicateMethod {
                entity: entity_name.to_owned(),
                method: name.to_owned(),
            });
        }

        let name = self.intern(name);
        let id = MethodId(self.program.methods.len() as u32);
        self.program.methods.push(Method {
            name,
            span: TextRange::default(),
            entity,
            signature,
            body,
        });
        self.program.entities[entity.index()].methods.push(id);
        Ok(id)
    }

    pub fn method_span(&mut self, method: MethodId, span: TextRange) -> &mut Self {
        self.program.methods[method.index()].span = span;
        self
    }

    pub fn build(self) -> Program {
        self.program
    }
}

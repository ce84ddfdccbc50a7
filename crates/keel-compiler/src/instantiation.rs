//! Concrete type arguments for a generic definition.

use crate::program::TypeRef;

/// Ordered type arguments, indexed by `TypeRef::Param`.
///
/// For a method this is the owning entity's arguments followed by the
/// method's own. The empty instantiation is a non-generic use.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instantiation(Vec<TypeRef>);

impl Instantiation {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn new(args: Vec<TypeRef>) -> Self {
        Self(args)
    }

    pub fn args(&self) -> &[TypeRef] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Substitute every `Param(i)` in `ty` with argument `i`.
    ///
    /// Parameters without a matching argument are left in place.
    pub fn apply(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Unit => TypeRef::Unit,
            TypeRef::Param(i) => self
                .0
                .get(*i as usize)
                .cloned()
                .unwrap_or(TypeRef::Param(*i)),
            TypeRef::Entity { entity, args } => TypeRef::Entity {
                entity: *entity,
                args: self.apply_all(args),
            },
        }
    }

    pub fn apply_all(&self, tys: &[TypeRef]) -> Vec<TypeRef> {
        tys.iter().map(|t| self.apply(t)).collect()
    }

    /// This instantiation followed by `more`.
    pub fn extend(&self, more: &[TypeRef]) -> Self {
        let mut args = self.0.clone();
        args.extend_from_slice(more);
        Self(args)
    }

    /// Split at `n`: the first `n` arguments and the rest.
    pub fn split(&self, n: usize) -> (Self, &[TypeRef]) {
        let n = n.min(self.0.len());
        (Self(self.0[..n].to_vec()), &self.0[n..])
    }
}

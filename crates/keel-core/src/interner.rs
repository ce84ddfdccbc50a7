//! Identifier interning for entity, method, and field names.
//!
//! Every name the compiler looks at more than once (entity names, method
//! names used as dispatch selectors, field names) is turned into a `Symbol`.
//! Symbols compare and hash as integers, and are numbered in first-seen order,
//! which keeps any structure keyed by them deterministic.

use indexmap::IndexSet;

/// A lightweight handle to an interned identifier.
///
/// Symbols are ordered by insertion order, not lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    /// Raw index, for serialization and debugging.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Create a Symbol from a raw index. Use only for deserialization.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// Identifier interner. Deduplicates names and hands out `Symbol`s.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    names: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, returning the existing Symbol if it was seen before.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(index) = self.names.get_index_of(name) {
            return Symbol(index as u32);
        }
        let (index, _) = self.names.insert_full(name.into());
        Symbol(index as u32)
    }

    /// Look up a name without interning it.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.names.get_index_of(name).map(|i| Symbol(i as u32))
    }

    /// Resolve a Symbol back to its name.
    ///
    /// # Panics
    /// Panics if the symbol was not created by this interner.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.names[sym.0 as usize]
    }

    /// Try to resolve a Symbol, returning None if it is foreign to this interner.
    #[inline]
    pub fn try_resolve(&self, sym: Symbol) -> Option<&str> {
        self.names.get_index(sym.0 as usize).map(|s| &**s)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over all names in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, s)| (Symbol(i as u32), &**s))
    }
}

//! Per-method facts computed by type checking.

use std::collections::HashMap;

use crate::program::{Local, MethodId, TypeRef};

/// Static facts about one method body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FnAnalysis {
    /// Static type of each local, indexed by `Local`. The length is the
    /// frame size.
    pub registers: Vec<TypeRef>,
}

impl FnAnalysis {
    pub fn new(registers: Vec<TypeRef>) -> Self {
        Self { registers }
    }

    pub fn frame_size(&self) -> usize {
        self.registers.len()
    }

    pub fn type_of(&self, local: Local) -> Option<&TypeRef> {
        self.registers.get(local.0 as usize)
    }
}

/// Analysis results for every method with a body.
#[derive(Clone, Debug, Default)]
pub struct AnalysisResults {
    functions: HashMap<MethodId, FnAnalysis>,
}

impl AnalysisResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: MethodId, analysis: FnAnalysis) {
        self.functions.insert(method, analysis);
    }

    pub fn get(&self, method: MethodId) -> Option<&FnAnalysis> {
        self.functions.get(&method)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

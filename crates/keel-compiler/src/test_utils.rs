//! Small programs shared by codegen tests.

use crate::analysis::{AnalysisResults, FnAnalysis};
use crate::codegen::{EmitError, codegen};
use crate::diagnostics::Diagnostics;
use crate::program::{
    BlockId, FnBody, FnSignature, Local, MethodId, Program, ProgramBuilder, Statement, Terminator,
    TypeRef,
};

pub struct Fixture {
    pub builder: ProgramBuilder,
    pub analysis: AnalysisResults,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            builder: ProgramBuilder::new(),
            analysis: AnalysisResults::new(),
        }
    }

    /// Record register types for a method with a body.
    pub fn registers(&mut self, method: MethodId, registers: Vec<TypeRef>) {
        self.analysis.insert(method, FnAnalysis::new(registers));
    }

    pub fn sym(&mut self, name: &str) -> keel_core::Symbol {
        self.builder.intern(name)
    }

    pub fn finish(self) -> (Program, AnalysisResults) {
        (self.builder.build(), self.analysis)
    }
}

pub fn compile(program: &Program, analysis: &AnalysisResults) -> (Vec<u8>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let bytes = codegen(program, analysis, &mut diagnostics).unwrap();
    (bytes, diagnostics)
}

pub fn try_compile(program: &Program, analysis: &AnalysisResults) -> Result<Vec<u8>, EmitError> {
    codegen(program, analysis, &mut Diagnostics::new())
}

pub fn local(i: u32) -> Local {
    Local(i)
}

pub fn block(i: u32) -> BlockId {
    BlockId(i)
}

/// `Main.main` prints a constant. `Dead.run` is never referenced.
pub fn hello() -> (Program, AnalysisResults) {
    let mut f = Fixture::new();
    let main = f.builder.class("Main").unwrap();
    let dead = f.builder.class("Dead").unwrap();

    let body = FnBody::straight(
        vec![
            Statement::Const {
                dst: local(0),
                value: 42,
            },
            Statement::Print { src: local(0) },
        ],
        Terminator::ReturnUnit,
    );
    let m = f
        .builder
        .method(main, "main", FnSignature::default(), Some(body))
        .unwrap();
    f.registers(m, vec![TypeRef::Unit]);

    let run = f
        .builder
        .method(
            dead,
            "run",
            FnSignature::default(),
            Some(FnBody::straight(vec![], Terminator::ReturnUnit)),
        )
        .unwrap();
    f.registers(run, vec![]);

    f.finish()
}

/// Generic `Cell[T]` used under `U64`:
///
/// ```text
/// class Cell[T] { value: T; set(self, v: T); get(self): T }
/// main: c = new Cell[U64]; Cell[U64].set(c, 7); print c.get()
/// ```
///
/// `set` is reached statically, `get` through dispatch. `Unused` and
/// `Shape` are never referenced.
pub fn cell() -> (Program, AnalysisResults) {
    let mut f = Fixture::new();
    let main = f.builder.class("Main").unwrap();
    let u64 = f.builder.primitive("U64").unwrap();
    let cell = f.builder.class("Cell").unwrap();
    f.builder.generics(cell, &["T"]);
    f.builder.field(cell, "value", TypeRef::Param(0)).unwrap();
    let unused = f.builder.class("Unused").unwrap();
    f.builder.interface("Shape").unwrap();

    let value = f.sym("value");
    let get = f.sym("get");
    let set = f.sym("set");
    let cell_t = TypeRef::generic(cell, vec![TypeRef::Param(0)]);
    let cell_u64 = TypeRef::generic(cell, vec![TypeRef::entity(u64)]);

    let set_sig = FnSignature {
        receiver: Some(cell_t.clone()),
        arguments: vec![TypeRef::Param(0)],
        ..FnSignature::default()
    };
    let set_body = FnBody::straight(
        vec![Statement::WriteField {
            obj: local(0),
            field: value,
            src: local(1),
        }],
        Terminator::ReturnUnit,
    );
    let set_id = f
        .builder
        .method(cell, "set", set_sig, Some(set_body))
        .unwrap();
    f.registers(set_id, vec![cell_t.clone(), TypeRef::Param(0)]);

    let get_sig = FnSignature {
        receiver: Some(cell_t.clone()),
        return_type: TypeRef::Param(0),
        ..FnSignature::default()
    };
    let get_body = FnBody::straight(
        vec![Statement::ReadField {
            dst: local(1),
            obj: local(0),
            field: value,
        }],
        Terminator::Return(local(1)),
    );
    let get_id = f
        .builder
        .method(cell, "get", get_sig, Some(get_body))
        .unwrap();
    f.registers(get_id, vec![cell_t, TypeRef::Param(0)]);

    let main_body = FnBody::straight(
        vec![
            Statement::New {
                dst: local(0),
                ty: cell_u64.clone(),
            },
            Statement::Const {
                dst: local(1),
                value: 7,
            },
            Statement::StaticCall {
                dst: local(2),
                ty: cell_u64.clone(),
                method: set,
                type_args: vec![],
                args: vec![local(0), local(1)],
            },
            Statement::VirtualCall {
                dst: local(3),
                receiver: local(0),
                method: get,
                type_args: vec![],
                args: vec![],
            },
            Statement::Print { src: local(3) },
        ],
        Terminator::ReturnUnit,
    );
    let main_id = f
        .builder
        .method(main, "main", FnSignature::default(), Some(main_body))
        .unwrap();
    f.registers(
        main_id,
        vec![
            cell_u64,
            TypeRef::entity(u64),
            TypeRef::Unit,
            TypeRef::entity(u64),
        ],
    );

    let unused_body = FnBody::straight(vec![], Terminator::ReturnUnit);
    let unused_id = f
        .builder
        .method(unused, "get", FnSignature::default(), Some(unused_body))
        .unwrap();
    f.registers(unused_id, vec![]);

    f.finish()
}

use crate::diagnostics::Diagnostics;
use crate::program::{FnBody, FnSignature, Program, Statement, Terminator, TypeRef};
use crate::test_utils::{Fixture, cell, hello, local};

use super::entry::find_entry;
use super::function::method_name;
use super::generator::Generator;
use super::reachability::{Reachability, analyze};

fn reach(program: &Program) -> Reachability {
    let (entity, method) = find_entry(program, &mut Diagnostics::new()).unwrap();
    analyze(program, &entity, &method, &mut Generator::new()).unwrap()
}

fn entity_names(program: &Program, graph: &Reachability) -> Vec<String> {
    graph
        .entities
        .keys()
        .map(|e| program.display_entity(e.definition, e.instantiation.args()))
        .collect()
}

fn method_names(program: &Program, graph: &Reachability) -> Vec<String> {
    graph
        .entities
        .values()
        .flat_map(|e| e.methods.keys())
        .map(|m| method_name(program, m))
        .collect()
}

#[test]
fn entry_only() {
    let (program, _) = hello();
    let graph = reach(&program);

    assert_eq!(entity_names(&program, &graph), vec!["Main"]);
    assert_eq!(method_names(&program, &graph), vec!["Main.main"]);
}

#[test]
fn generic_entity_and_both_call_kinds() {
    let (program, _) = cell();
    let graph = reach(&program);

    assert_eq!(entity_names(&program, &graph), vec!["Main", "Cell[U64]"]);
    assert_eq!(
        method_names(&program, &graph),
        vec!["Main.main", "Cell[U64].set", "Cell[U64].get"]
    );
}

#[test]
fn field_types_alone_are_not_reachable() {
    let (program, _) = cell();
    let graph = reach(&program);

    let u64 = program.find_entity("U64").unwrap();
    assert!(graph.entities.keys().all(|e| e.definition != u64));
}

#[test]
fn every_reachable_entity_gets_a_distinct_descriptor() {
    let (program, _) = cell();
    let graph = reach(&program);

    let first = graph.entities[0].descriptor;
    let second = graph.entities[1].descriptor;
    assert_ne!(first, second);
}

/// `main` allocates `A` and `B`, both implementing `speak`, then calls
/// `speak` virtually on `A` only. `B.speak` must still be reachable, and
/// `B.mute` (never invoked) must not be.
#[test]
fn virtual_call_reaches_every_implementation() {
    let mut f = Fixture::new();
    let main = f.builder.class("Main").unwrap();
    let a = f.builder.class("A").unwrap();
    let b = f.builder.class("B").unwrap();
    let speak = f.sym("speak");

    for &entity in &[a, b] {
        let sig = FnSignature {
            receiver: Some(TypeRef::entity(entity)),
            ..FnSignature::default()
        };
        let body = FnBody::straight(vec![], Terminator::ReturnUnit);
        let m = f
            .builder
            .method(entity, "speak", sig, Some(body))
            .unwrap();
        f.registers(m, vec![TypeRef::entity(entity)]);
    }
    let mute_sig = FnSignature {
        receiver: Some(TypeRef::entity(b)),
        ..FnSignature::default()
    };
    f.builder
        .method(
            b,
            "mute",
            mute_sig,
            Some(FnBody::straight(vec![], Terminator::ReturnUnit)),
        )
        .unwrap();

    // `B` becomes reachable after `speak` is already invoked.
    let body = FnBody::straight(
        vec![
            Statement::New {
                dst: local(0),
                ty: TypeRef::entity(a),
            },
            Statement::VirtualCall {
                dst: local(1),
                receiver: local(0),
                method: speak,
                type_args: vec![],
                args: vec![],
            },
            Statement::New {
                dst: local(0),
                ty: TypeRef::entity(b),
            },
        ],
        Terminator::ReturnUnit,
    );
    let m = f
        .builder
        .method(main, "main", FnSignature::default(), Some(body))
        .unwrap();
    f.registers(m, vec![TypeRef::entity(a), TypeRef::Unit]);
    let (program, _) = f.finish();

    let graph = reach(&program);

    assert_eq!(entity_names(&program, &graph), vec!["Main", "A", "B"]);
    assert_eq!(
        method_names(&program, &graph),
        vec!["Main.main", "A.speak", "B.speak"]
    );
}

#[test]
fn static_methods_do_not_match_selectors() {
    let mut f = Fixture::new();
    let main = f.builder.class("Main").unwrap();
    let run = f.sym("run");
    // Static `Main.run` shares the name of the invoked selector.
    f.builder
        .method(
            main,
            "run",
            FnSignature::default(),
            Some(FnBody::straight(vec![], Terminator::ReturnUnit)),
        )
        .unwrap();
    let body = FnBody::straight(
        vec![Statement::VirtualCall {
            dst: local(1),
            receiver: local(0),
            method: run,
            type_args: vec![],
            args: vec![],
        }],
        Terminator::ReturnUnit,
    );
    f.builder
        .method(main, "main", FnSignature::default(), Some(body))
        .unwrap();
    let (program, _) = f.finish();

    let graph = reach(&program);
    assert_eq!(method_names(&program, &graph), vec!["Main.main"]);
}

/// Recursive generic method instantiated twice.
#[test]
fn generic_method_instantiations_are_distinct() {
    let mut f = Fixture::new();
    let main = f.builder.class("Main").unwrap();
    let boxed = f.builder.class("Box").unwrap();
    let id = f.sym("id");
    let t = f.sym("T");

    // static id[T]() { Main.id[T]() }
    let id_body = FnBody::straight(
        vec![Statement::StaticCall {
            dst: local(0),
            ty: TypeRef::entity(main),
            method: id,
            type_args: vec![TypeRef::Param(0)],
            args: vec![],
        }],
        Terminator::ReturnUnit,
    );
    let sig = FnSignature {
        generics: vec![t],
        ..FnSignature::default()
    };
    f.builder.method(main, "id", sig, Some(id_body)).unwrap();

    let call = |ty: TypeRef| Statement::StaticCall {
        dst: local(0),
        ty: TypeRef::entity(main),
        method: id,
        type_args: vec![ty],
        args: vec![],
    };
    let body = FnBody::straight(
        vec![
            call(TypeRef::Unit),
            call(TypeRef::entity(boxed)),
            call(TypeRef::Unit),
        ],
        Terminator::ReturnUnit,
    );
    f.builder
        .method(main, "main", FnSignature::default(), Some(body))
        .unwrap();
    let (program, _) = f.finish();

    let graph = reach(&program);

    assert_eq!(
        method_names(&program, &graph),
        vec!["Main.main", "Main.id[Unit]", "Main.id[Box]"]
    );
    // A type argument alone does not make `Box` reachable.
    assert_eq!(entity_names(&program, &graph), vec!["Main"]);
}

#[test]
fn bodiless_methods_get_no_label() {
    let mut f = Fixture::new();
    let main = f.builder.class("Main").unwrap();
    let native = f.sym("native");
    f.builder
        .method(main, "native", FnSignature::default(), None)
        .unwrap();
    let body = FnBody::straight(
        vec![Statement::StaticCall {
            dst: local(0),
            ty: TypeRef::entity(main),
            method: native,
            type_args: vec![],
            args: vec![],
        }],
        Terminator::ReturnUnit,
    );
    f.builder
        .method(main, "main", FnSignature::default(), Some(body))
        .unwrap();
    let (program, _) = f.finish();

    let graph = reach(&program);
    let methods: Vec<_> = graph.entities[0].methods.values().collect();

    assert_eq!(methods.len(), 2);
    assert!(methods[0].label.is_some());
    assert!(methods[1].label.is_none());
    assert_eq!(graph.functions().count(), 1);
}

#[test]
fn deterministic_across_runs() {
    let (program, _) = cell();
    let first = reach(&program);
    let second = reach(&program);

    assert_eq!(
        first.entities.keys().collect::<Vec<_>>(),
        second.entities.keys().collect::<Vec<_>>()
    );
    assert_eq!(
        method_names(&program, &first),
        method_names(&program, &second)
    );
}

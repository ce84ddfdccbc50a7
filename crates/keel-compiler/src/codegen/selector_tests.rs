use keel_bytecode::SelectorIdx;

use crate::diagnostics::Diagnostics;
use crate::program::{FnBody, FnSignature, Program, Statement, Terminator, TypeRef};
use crate::test_utils::{Fixture, cell, hello, local};

use super::entry::find_entry;
use super::generator::Generator;
use super::reachability::{Reachability, analyze};
use super::selector::{Selector, SelectorTable, selector_of};

fn table(program: &Program) -> (Reachability, SelectorTable) {
    let (entity, method) = find_entry(program, &mut Diagnostics::new()).unwrap();
    let graph = analyze(program, &entity, &method, &mut Generator::new()).unwrap();
    let table = SelectorTable::build(program, &graph).unwrap();
    (graph, table)
}

fn names(program: &Program, table: &SelectorTable) -> Vec<String> {
    table.iter().map(|(_, s)| s.display(program)).collect()
}

#[test]
fn no_virtual_calls_no_selectors() {
    let (program, _) = hello();
    let (_, table) = table(&program);

    assert!(table.is_empty());
}

#[test]
fn only_invoked_selectors_are_numbered() {
    let (program, _) = cell();
    let (_, table) = table(&program);

    // `set` is reachable but only called statically.
    assert_eq!(names(&program, &table), vec!["get"]);
    let get = program.interner().get("get").unwrap();
    assert_eq!(
        table.get(&Selector::new(get, vec![])),
        Some(SelectorIdx(0))
    );
}

#[test]
fn selector_of_static_method_is_none() {
    let (program, _) = hello();
    let (graph, _) = table(&program);
    let entry = graph.entities[0].methods.keys().next().unwrap();
    assert_eq!(selector_of(&program, entry), None);
}

/// `main` invokes `b`, `a`, `b[Unit]`, `a` in that order.
fn multi() -> Program {
    let mut f = Fixture::new();
    let main = f.builder.class("Main").unwrap();
    let a = f.sym("a");
    let b = f.sym("b");

    let call = |method, type_args: Vec<TypeRef>| Statement::VirtualCall {
        dst: local(1),
        receiver: local(0),
        method,
        type_args,
        args: vec![],
    };
    let body = FnBody::straight(
        vec![
            Statement::New {
                dst: local(0),
                ty: TypeRef::entity(main),
            },
            call(b, vec![]),
            call(a, vec![]),
            call(b, vec![TypeRef::Unit]),
            call(a, vec![]),
        ],
        Terminator::ReturnUnit,
    );
    f.builder
        .method(main, "main", FnSignature::default(), Some(body))
        .unwrap();
    f.finish().0
}

#[test]
fn first_seen_order_and_type_args_distinguish() {
    let program = multi();
    let (_, table) = table(&program);

    assert_eq!(names(&program, &table), vec!["b", "a", "b[Unit]"]);
}

#[test]
fn stable_across_runs() {
    let program = multi();
    let (_, first) = table(&program);
    let (_, second) = table(&program);

    let first: Vec<_> = first.iter().map(|(i, s)| (i, s.clone())).collect();
    let second: Vec<_> = second.iter().map(|(i, s)| (i, s.clone())).collect();
    assert_eq!(first, second);
}

use indoc::indoc;
use keel_bytecode::{Image, verify};

use crate::codegen::codegen;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::load::{LoadError, load_str};
use crate::program::{EntityKind, Statement, TypeRef};

const CELL: &str = indoc! {r#"
    {
      "entities": [
        { "name": "Main", "kind": "class",
          "methods": [
            { "name": "main",
              "registers": [{ "entity": { "name": "Cell", "args": [{ "entity": { "name": "U64" } }] } },
                            { "entity": { "name": "U64" } }],
              "body": [
                { "statements": [
                    { "kind": "new", "dst": 0,
                      "type": { "entity": { "name": "Cell", "args": [{ "entity": { "name": "U64" } }] } } },
                    { "kind": "virtual_call", "dst": 1, "receiver": 0, "method": "get" },
                    { "kind": "print", "src": 1 }
                  ],
                  "terminator": { "kind": "return_unit" } }
              ] }
          ] },
        { "name": "Cell", "kind": "class", "generics": ["T"],
          "fields": [{ "name": "value", "type": { "param": 0 } }],
          "methods": [
            { "name": "get",
              "receiver": { "entity": { "name": "Cell", "args": [{ "param": 0 }] } },
              "returns": { "param": 0 },
              "registers": [{ "entity": { "name": "Cell", "args": [{ "param": 0 }] } }, { "param": 0 }],
              "body": [
                { "statements": [{ "kind": "read_field", "dst": 1, "obj": 0, "field": "value" }],
                  "terminator": { "kind": "return", "src": 1 } }
              ] }
          ] },
        { "name": "U64", "kind": "primitive" }
      ]
    }
"#};

#[test]
fn forward_references_resolve() {
    let (program, analysis) = load_str(CELL).unwrap();

    let cell = program.find_entity("Cell").unwrap();
    let u64 = program.find_entity("U64").unwrap();
    assert!(matches!(program.entity(u64).kind, EntityKind::Primitive));
    assert_eq!(program.entity(cell).generics.len(), 1);
    assert_eq!(analysis.len(), 2);

    let main = program.find_entity("Main").unwrap();
    let main = program.lookup_method(main, "main").unwrap();
    let body = program.method(main).body.as_ref().unwrap();
    assert_eq!(
        body.blocks[0].statements[0],
        Statement::New {
            dst: crate::program::Local(0),
            ty: TypeRef::generic(cell, vec![TypeRef::entity(u64)]),
        }
    );
}

#[test]
fn loaded_program_compiles_to_valid_image() {
    let (program, analysis) = load_str(CELL).unwrap();
    let mut diagnostics = Diagnostics::new();
    let bytes = codegen(&program, &analysis, &mut diagnostics).unwrap();

    assert!(diagnostics.is_empty());
    let image = Image::from_bytes(bytes).unwrap();
    verify(&image).unwrap();
    assert_eq!(image.descriptors()[1].name, "Cell[U64]");
}

#[test]
fn spans_and_source_feed_diagnostics() {
    let json = indoc! {r#"
        {
          "source": "interface Main {}",
          "entities": [{ "name": "Main", "kind": "interface", "span": [10, 14] }]
        }
    "#};
    let (program, analysis) = load_str(json).unwrap();
    let mut diagnostics = Diagnostics::new();
    let bytes = codegen(&program, &analysis, &mut diagnostics).unwrap();

    assert!(bytes.is_empty());
    assert_eq!(diagnostics.kinds(), vec![DiagnosticKind::MainNotAClass]);
    let rendered = diagnostics
        .printer()
        .source(program.source().unwrap())
        .render();
    insta::assert_snapshot!(rendered, @r"
    error: main not a class
      |
    1 | interface Main {}
      |           ^^^^
    ");
}

#[test]
fn unknown_entity() {
    let json = r#"{ "entities": [{ "name": "Main", "kind": "class",
        "fields": [{ "name": "x", "type": { "entity": { "name": "Nope" } } }] }] }"#;

    let err = load_str(json).unwrap_err();
    insta::assert_snapshot!(err, @"unknown entity `Nope`");
}

#[test]
fn duplicate_entity() {
    let json = r#"{ "entities": [
        { "name": "Main", "kind": "class" },
        { "name": "Main", "kind": "primitive" }
    ] }"#;

    let err = load_str(json).unwrap_err();
    assert!(matches!(err, LoadError::Build(_)));
    insta::assert_snapshot!(err, @"entity `Main` is already defined");
}

#[test]
fn inverted_span() {
    let json = r#"{ "entities": [{ "name": "Main", "kind": "class", "span": [4, 2] }] }"#;

    let err = load_str(json).unwrap_err();
    insta::assert_snapshot!(err, @"invalid span 4..2");
}

#[test]
fn malformed_json() {
    let err = load_str(r#"{ "entities": [{ "name": "Main" }] }"#).unwrap_err();

    assert!(matches!(err, LoadError::Json(_)));
}

use crate::test_utils::encode;
use crate::{BinOpKind, DescriptorIdx, Instruction, Opcode, Reg, SelectorIdx};

fn all_shapes() -> Vec<Instruction> {
    vec![
        Instruction::Enter { argc: 2, frame: 5 },
        Instruction::LoadConst {
            dst: Reg(0),
            value: u64::MAX,
        },
        Instruction::Copy {
            dst: Reg(1),
            src: Reg(0),
        },
        Instruction::New {
            dst: Reg(2),
            descriptor: DescriptorIdx(3),
        },
        Instruction::Load {
            dst: Reg(1),
            obj: Reg(2),
            slot: 4,
        },
        Instruction::Store {
            obj: Reg(2),
            slot: 4,
            src: Reg(1),
        },
        Instruction::Call {
            dst: Reg(3),
            target: 100,
            args: vec![Reg(0), Reg(1)],
        },
        Instruction::CallVirtual {
            dst: Reg(3),
            selector: SelectorIdx(2),
            args: vec![Reg(2)],
        },
        Instruction::TypeTest {
            dst: Reg(4),
            src: Reg(2),
            descriptor: DescriptorIdx(1),
        },
        Instruction::BinOp {
            op: BinOpKind::Lt,
            dst: Reg(4),
            lhs: Reg(0),
            rhs: Reg(1),
        },
        Instruction::Jump { target: 7 },
        Instruction::Branch {
            cond: Reg(4),
            then_target: 8,
            else_target: 9,
        },
        Instruction::Return { src: Reg(3) },
        Instruction::ReturnUnit,
        Instruction::Print { src: Reg(0) },
    ]
}

#[test]
fn size_matches_encoding() {
    for instr in all_shapes() {
        let mut out = Vec::new();
        encode(&instr, 0, &mut out);
        assert_eq!(out.len(), instr.size(), "{instr:?}");

        let (decoded, next) = Instruction::decode(&out, 0).unwrap();
        assert_eq!(decoded, instr);
        assert_eq!(next, out.len());
    }
}

#[test]
fn opcode_from_u8() {
    assert_eq!(Opcode::from_u8(0x00), Some(Opcode::Enter));
    assert_eq!(Opcode::from_u8(0x07), Some(Opcode::CallVirtual));
    assert_eq!(Opcode::from_u8(0x0E), Some(Opcode::Print));
    assert_eq!(Opcode::from_u8(0x0F), None);
}

#[test]
fn truncated_operands() {
    let bytes = [Opcode::Jump as u8, 0x01, 0x02];
    assert!(Instruction::decode(&bytes, 0).is_err());
}

#[test]
fn jump_targets() {
    let branch = Instruction::Branch {
        cond: Reg(0),
        then_target: 10,
        else_target: 20,
    };
    assert_eq!(branch.jump_targets(), vec![10, 20]);
    assert_eq!(Instruction::Jump { target: 3 }.jump_targets(), vec![3]);
    assert!(Instruction::ReturnUnit.jump_targets().is_empty());
}

#[test]
fn display() {
    let lines: Vec<String> = all_shapes().iter().map(|i| i.to_string()).collect();
    insta::assert_snapshot!(lines.join("\n"), @r"
    enter 2 5
    const r0 18446744073709551615
    copy  r1 r0
    new   r2 D3
    load  r1 r2.4
    store r2.4 r1
    call  r3 @100 (r0, r1)
    callv r3 #2 (r2)
    test  r4 r2 D1
    lt    r4 r0 r1
    jmp   @7
    br    r4 @8 @9
    ret   r3
    ret.unit
    print r0
    ");
}

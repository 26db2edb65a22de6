//! Unit tests for the TAC model

use super::*;
use mcc_common::ScalarType;
use pretty_assertions::assert_eq;

fn cond(relation: Relation, lhs: &str, rhs: &str) -> Condition {
    Condition {
        relation,
        ty: ScalarType::I32,
        lhs: Operand::ident(lhs),
        rhs: Operand::ident(rhs),
    }
}

#[test]
fn test_literal_parsing() {
    assert_eq!(parse_int_literal("42"), Some(42));
    assert_eq!(parse_int_literal("-7"), Some(-7));
    assert_eq!(parse_int_literal("0xff"), Some(255));
    assert_eq!(parse_int_literal("010"), Some(8));
    assert_eq!(parse_int_literal("4000000000u"), Some(4_000_000_000));
    assert_eq!(parse_int_literal("0xFFFFFFFFFFFFFFFF"), Some(-1));
    assert_eq!(parse_int_literal("'a'"), Some(97));
    assert_eq!(parse_int_literal("'\\n'"), Some(10));
    assert_eq!(parse_int_literal("'\\x41'"), Some(65));
    assert_eq!(parse_int_literal("1.5"), None);

    assert_eq!(parse_float_literal("1.5"), Some(1.5));
    assert_eq!(parse_float_literal("2.5f"), Some(2.5));
    assert_eq!(parse_float_literal("3"), Some(3.0));
    assert_eq!(Operand::constant("1.75").int_value(), Some(1));
}

#[test]
fn test_relation_algebra() {
    for rel in [Relation::Lt, Relation::Le, Relation::Gt, Relation::Ge, Relation::Eq, Relation::Ne] {
        assert_eq!(rel.negate().negate(), rel);
        assert_eq!(rel.swap().swap(), rel);
        assert_ne!(rel.negate(), rel);
    }
    assert_eq!(Relation::Lt.swap(), Relation::Gt);
    assert_eq!(Relation::Ge.swap(), Relation::Le);
    assert_eq!(Relation::Ne.swap(), Relation::Ne);
    assert_eq!(Relation::Le.negate(), Relation::Gt);
}

#[test]
fn test_positions_are_monotonic() {
    let mut tac = TacBuilder::new();
    let a = tac.emit_nop();
    let b = tac.emit_jump();
    let c = tac.emit_cond_jump(cond(Relation::Lt, "a", "b"));
    assert_eq!((a, b, c), (0, 1, 2));
    assert_eq!(tac.new_temp(), Operand::temp("t0"));
    assert_eq!(tac.new_temp(), Operand::temp("t1"));
}

#[test]
fn test_backpatch_resolves_every_member() {
    let mut tac = TacBuilder::new();
    let j1 = tac.emit_jump();
    let j2 = tac.emit_cond_jump(cond(Relation::Ne, "x", "y"));
    let target = tac.emit_nop();

    let list = PatchList::single(j1).merge(PatchList::single(j2));
    tac.backpatch(&list, target).unwrap();

    assert_eq!(tac.get(j1).unwrap().target(), Some(JumpTarget::Resolved(target)));
    assert_eq!(tac.get(j2).unwrap().target(), Some(JumpTarget::Resolved(target)));

    // same target again is harmless
    tac.backpatch(&list, target).unwrap();
}

#[test]
fn test_backpatch_never_retargets() {
    let mut tac = TacBuilder::new();
    let jump = tac.emit_jump();
    let first = tac.emit_nop();
    let second = tac.emit_nop();

    tac.backpatch(&PatchList::single(jump), first).unwrap();
    let err = tac.backpatch(&PatchList::single(jump), second).unwrap_err();
    assert_eq!(
        err,
        IrError::Retarget {
            id: jump,
            current: first,
            requested: second
        }
    );
}

#[test]
fn test_backpatch_rejects_plain_instructions() {
    let mut tac = TacBuilder::new();
    let nop = tac.emit_nop();
    let err = tac.backpatch(&PatchList::single(nop), nop).unwrap_err();
    assert_eq!(err, IrError::NotAJump(nop));
    assert_eq!(
        tac.backpatch(&PatchList::new(), 99).unwrap_err(),
        IrError::UnknownInstruction(99)
    );
}

#[test]
fn test_patch_list_merge_is_a_union() {
    let merged = PatchList::from_iter([1, 2]).merge(PatchList::from_iter([2, 3]));
    assert_eq!(merged.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(merged.len(), 3);
}

#[test]
fn test_program_listing_and_unresolved() {
    let mut tac = TacBuilder::new();
    let t = tac.new_temp();
    let add = tac.emit_quad(
        Operator::Add,
        ScalarType::I32,
        t.clone(),
        Operand::ident("a"),
        Operand::constant(1),
    );
    let test = tac.emit_cond_jump(cond(Relation::Lt, "a", "b"));
    let back = tac.emit_jump();
    tac.backpatch(&PatchList::single(back), add).unwrap();

    let program = tac.build(&[add, test, back]).unwrap();
    assert_eq!(program.unresolved(), vec![test]);
    assert_eq!(
        program.to_string(),
        "   0: t0 = a + 1\n   1: if a < b goto _\n   2: goto 0\n"
    );
    assert_eq!(program.position_of(back), Some(2));
}

#[test]
fn test_build_rejects_duplicates() {
    let mut tac = TacBuilder::new();
    let nop = tac.emit_nop();
    assert_eq!(tac.build(&[nop, nop]).unwrap_err(), IrError::DuplicateInstruction(nop));
}

#[test]
fn test_program_serde() {
    let mut tac = TacBuilder::new();
    let cast = tac.emit_quad(
        Operator::Cast(ScalarType::I32),
        ScalarType::F64,
        Operand::temp("t0"),
        Operand::ident("i"),
        Operand::Empty,
    );
    let program = tac.build(&[cast]).unwrap();

    let json = serde_json::to_string(&program).unwrap();
    let back: TacProgram = serde_json::from_str(&json).unwrap();
    assert_eq!(back, program);
    assert_eq!(back.instructions()[0].to_string(), "t0 = (double) i [from int]");
}

#[test]
fn test_lookup_by_id_follows_layout_order() {
    let mut tac = TacBuilder::new();
    let first = tac.emit_nop();
    let second = tac.emit_jump();
    let third = tac.emit_nop();
    tac.backpatch(&PatchList::single(second), first).unwrap();

    let program = tac.build(&[third, second, first]).unwrap();
    assert_eq!(program.position_of(third), Some(0));
    assert_eq!(program.position_of(first), Some(2));
    assert_eq!(program.position_of(99), None);
    assert_eq!(program.get(second).unwrap().id, second);

    let json = serde_json::to_string(&program).unwrap();
    assert!(!json.contains("positions"));
    let back: TacProgram = serde_json::from_str(&json).unwrap();
    assert_eq!(back.position_of(first), Some(2));
}

//! Statement translator tests

mod control_flow_tests;
mod diagnostics_tests;
mod switch_tests;

use crate::ast::{FunctionDef, Stmt, TranslationUnit};
use crate::expr::{ExprBuilder, ExprCode};
use crate::translate::{translate_unit, Translation};
use mcc_common::{ScalarType, SourceSpan};
use mcc_ir::{InstrId, InstrKind, Instruction, JumpTarget, Operator, Relation, TacBuilder, TacProgram};

pub(super) fn span() -> SourceSpan {
    SourceSpan::at(1, 1)
}

pub(super) fn int(name: &str) -> ExprCode {
    ExprCode::var(name, ScalarType::I32)
}

pub(super) fn lit(value: i64) -> ExprCode {
    ExprCode::constant(value, ScalarType::I32)
}

/// `name = value;`
pub(super) fn set(tac: &mut TacBuilder, name: &str, value: i64) -> Stmt {
    let expr = ExprBuilder::new(tac).assign(name, lit(value)).unwrap();
    Stmt::expr(expr, span())
}

/// `name = name + 1;`
pub(super) fn increment(tac: &mut TacBuilder, name: &str) -> Stmt {
    let mut e = ExprBuilder::new(tac);
    let sum = e.binary(Operator::Add, int(name), lit(1)).unwrap();
    Stmt::expr(e.assign(name, sum).unwrap(), span())
}

/// `lhs relation rhs` in control-flow form
pub(super) fn test(tac: &mut TacBuilder, relation: Relation, lhs: ExprCode, rhs: ExprCode) -> ExprCode {
    ExprBuilder::new(tac).relational(relation, lhs, rhs).unwrap()
}

pub(super) fn translate_main(tac: TacBuilder, return_type: ScalarType, body: Vec<Stmt>) -> Translation {
    let unit = TranslationUnit {
        functions: vec![FunctionDef::new("main", return_type, Stmt::compound(body, span()))],
    };
    translate_unit(&unit, tac)
}

pub(super) fn target(program: &TacProgram, id: InstrId) -> InstrId {
    match program.get(id).and_then(|i| i.target()) {
        Some(JumpTarget::Resolved(target)) => target,
        other => panic!("instruction {id} has no resolved target: {other:?}"),
    }
}

pub(super) fn func_end(program: &TacProgram) -> InstrId {
    program
        .iter()
        .find(|i| i.op() == Some(Operator::FuncEnd))
        .map(|i| i.id)
        .expect("program has a function end")
}

pub(super) fn is_cond_jump(instruction: &Instruction) -> bool {
    matches!(instruction.kind, InstrKind::CondJump { .. })
}

pub(super) fn messages(translation: &Translation) -> Vec<String> {
    translation
        .reporter
        .errors()
        .map(|d| d.message.clone())
        .collect()
}

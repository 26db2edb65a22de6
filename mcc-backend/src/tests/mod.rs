//! Backend tests


use crate::{lower_program, LoweringOptions};
use mcc_codegen::emit_instructions;
use mcc_common::{ScalarType, SourceSpan, SymbolMap};
use mcc_frontend::{translate_unit, ExprBuilder, ExprCode, FunctionDef, Stmt, Translation, TranslationUnit};
use mcc_ir::{InstrKind, Instruction, Operand, Operator, Quad, TacBuilder, TacProgram};

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
pub(super) fn set(tac: &mut TacBuilder, name: &str, value: ExprCode) -> Stmt {
    let expr = ExprBuilder::new(tac).assign(name, value).unwrap();
    Stmt::expr(expr, span())
}

pub(super) fn function(name: &str, return_type: ScalarType, body: Vec<Stmt>) -> FunctionDef {
    FunctionDef::new(name, return_type, Stmt::compound(body, span()))
}

pub(super) fn translate(tac: TacBuilder, functions: Vec<FunctionDef>) -> Translation {
    let translation = translate_unit(&TranslationUnit { functions }, tac);
    assert!(!translation.has_errors(), "{}", translation.reporter.summary());
    translation
}

/// `main` holding `quads`, numbered in order
pub(super) fn main_program(quads: Vec<Quad>) -> TacProgram {
    let mut kinds = vec![InstrKind::Plain(Quad::new(
        Operator::FuncBegin,
        ScalarType::Void,
        Operand::Empty,
        Operand::label("main"),
        Operand::Empty,
    ))];
    kinds.extend(quads.into_iter().map(InstrKind::Plain));
    kinds.push(InstrKind::Plain(Quad::new(
        Operator::FuncEnd,
        ScalarType::Void,
        Operand::Empty,
        Operand::label("main"),
        Operand::Empty,
    )));
    TacProgram::new(
        kinds
            .into_iter()
            .enumerate()
            .map(|(id, kind)| Instruction { id: id as u32, kind })
            .collect(),
    )
}

/// Lowered function text, one trimmed line per instruction
pub(super) fn text_lines(program: &TacProgram, symbols: &SymbolMap) -> Vec<String> {
    let asm = lower_program(program, symbols, &LoweringOptions::default()).unwrap();
    emit_instructions(&asm.text)
        .lines()
        .map(|line| line.trim().to_string())
        .collect()
}

pub(super) fn position(lines: &[String], line: &str) -> usize {
    lines
        .iter()
        .position(|l| l == line)
        .unwrap_or_else(|| panic!("no '{line}' in:\n{}", lines.join("\n")))
}

/// Instructions of `function` between its prologue and its epilogue
pub(super) fn body_of(lines: &[String], function: &str) -> Vec<String> {
    let start = position(lines, &format!("{function}:")) + 5;
    let end = lines[start..]
        .iter()
        .position(|l| l == "move $sp, $fp")
        .map(|offset| start + offset)
        .unwrap();
    lines[start..end].to_vec()
}

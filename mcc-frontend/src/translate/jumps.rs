//! Jump statements (goto, labels, break, continue, return)

use super::{StatementTranslator, StmtCode};
use crate::ast::Stmt;
use crate::errors::StatementError;
use crate::expr::{ExprBuilder, ExprCode};
use log::debug;
use mcc_common::{ScalarType, SourceSpan};
use mcc_ir::{Operand, Operator, PatchList};

pub(super) fn translate_goto(gen: &mut StatementTranslator, label: &str, span: &SourceSpan) -> StmtCode {
    let jump = gen.tac.emit_jump();
    match gen.function.labels.get(label).copied() {
        Some(target) => gen.patch(&PatchList::single(jump), target),
        None => {
            debug!("forward goto '{label}' from {jump}");
            gen.function
                .pending_gotos
                .entry(label.to_string())
                .or_insert_with(|| (PatchList::new(), span.clone()))
                .0
                .push(jump);
        }
    }
    StmtCode::from_code(vec![jump])
}

/// `label: body`. The label anchors a `nop` emitted ahead of the body, so
/// jumps from inside the body back to the label resolve immediately.
pub(super) fn translate_labeled(
    gen: &mut StatementTranslator,
    label: &str,
    body: &Stmt,
    span: &SourceSpan,
) -> StmtCode {
    let anchor = gen.tac.emit_nop();
    if gen.function.labels.contains_key(label) {
        gen.report(StatementError::DuplicateLabel(label.to_string()), span);
    } else {
        gen.function.labels.insert(label.to_string(), anchor);
        if let Some((waiting, _)) = gen.function.pending_gotos.remove(label) {
            gen.patch(&waiting, anchor);
        }
    }

    let mut body_code = gen.translate(body);
    let mut result = StmtCode::from_code(vec![anchor]);
    result.code.append(&mut body_code.code);
    result.next = body_code.next.take();
    result.inherit_exits(&mut body_code);
    result
}

pub(super) fn translate_break(gen: &mut StatementTranslator, span: &SourceSpan) -> StmtCode {
    if gen.loop_depth == 0 && gen.switches.is_empty() {
        gen.report(StatementError::BreakOutsideLoop, span);
    }
    let jump = gen.tac.emit_jump();
    let mut result = StmtCode::from_code(vec![jump]);
    result.break_list = PatchList::single(jump);
    result
}

pub(super) fn translate_continue(gen: &mut StatementTranslator, span: &SourceSpan) -> StmtCode {
    if gen.loop_depth == 0 {
        gen.report(StatementError::ContinueOutsideLoop, span);
    }
    let jump = gen.tac.emit_jump();
    let mut result = StmtCode::from_code(vec![jump]);
    result.continue_list = PatchList::single(jump);
    result
}

/// `return [value]`: the return instruction, then a jump to the exit
pub(super) fn translate_return(
    gen: &mut StatementTranslator,
    value: Option<&ExprCode>,
    span: &SourceSpan,
) -> StmtCode {
    let expected = gen.function.return_type;
    let mut code = Vec::new();

    let (ty, place) = match value {
        None => {
            if expected != ScalarType::Void {
                gen.report(
                    StatementError::MissingReturnValue {
                        function: gen.function.name.clone(),
                        ty: expected,
                    },
                    span,
                );
            }
            (ScalarType::Void, Operand::Empty)
        }
        Some(value) => {
            let value = gen.value_of(value, span);
            code.extend(value.code.iter().copied());
            return_value(gen, value, expected, &mut code, span)
        }
    };

    code.push(gen.tac.emit_quad(Operator::Return, ty, Operand::Empty, place, Operand::Empty));
    let exit = gen.tac.emit_jump();
    code.push(exit);

    let mut result = StmtCode::from_code(code);
    result.returns = PatchList::single(exit);
    result
}

/// Check a returned value against the function type, converting between
/// arithmetic types when they differ
fn return_value(
    gen: &mut StatementTranslator,
    value: ExprCode,
    expected: ScalarType,
    code: &mut Vec<mcc_ir::InstrId>,
    span: &SourceSpan,
) -> (ScalarType, Operand) {
    if expected == ScalarType::Void {
        gen.report(StatementError::ReturnValueInVoid(gen.function.name.clone()), span);
        return (ScalarType::Void, Operand::Empty);
    }

    let pointer_float_mix = (expected == ScalarType::Ptr && value.ty.is_float())
        || (expected.is_float() && value.ty == ScalarType::Ptr);
    if value.ty == ScalarType::Void || pointer_float_mix {
        gen.report(
            StatementError::IncompatibleReturn {
                found: value.ty,
                expected,
            },
            span,
        );
        return (expected, value.place);
    }

    if value.ty == expected {
        return (expected, value.place);
    }

    let uncoded = ExprCode {
        code: Vec::new(),
        ..value
    };
    match ExprBuilder::new(&mut *gen.tac).cast(uncoded, expected) {
        Ok(cast) => {
            code.extend(cast.code);
            (expected, cast.place)
        }
        Err(err) => {
            gen.report(StatementError::Internal(err), span);
            (expected, Operand::Empty)
        }
    }
}

//! Conditionals and loops (if, while, do-while, for)

use super::{StatementTranslator, StmtCode};
use crate::ast::Stmt;
use crate::expr::ExprCode;
use mcc_common::SourceSpan;
use mcc_ir::{InstrId, PatchList};

pub(super) fn translate_if(
    gen: &mut StatementTranslator,
    cond: &ExprCode,
    then_branch: &Stmt,
    span: &SourceSpan,
) -> StmtCode {
    let test = gen.condition(cond, span);
    let mut then_code = gen.translate(then_branch);
    gen.patch(&test.true_list, then_code.entry());

    let mut result = StmtCode::default();
    result.code = test.code;
    result.code.append(&mut then_code.code);
    result.next = then_code.next.take().merge(test.false_list);
    result.inherit_exits(&mut then_code);
    result
}

pub(super) fn translate_if_else(
    gen: &mut StatementTranslator,
    cond: &ExprCode,
    then_branch: &Stmt,
    else_branch: &Stmt,
    span: &SourceSpan,
) -> StmtCode {
    let test = gen.condition(cond, span);
    let mut then_code = gen.translate(then_branch);
    let skip = gen.tac.emit_jump();
    let mut else_code = gen.translate(else_branch);

    gen.patch(&test.true_list, then_code.entry());
    gen.patch(&test.false_list, else_code.entry());
    gen.patch(&then_code.next, skip);

    let mut result = StmtCode::default();
    result.code = test.code;
    result.code.append(&mut then_code.code);
    result.code.push(skip);
    result.code.append(&mut else_code.code);
    result.next = else_code.next.take().merge(PatchList::single(skip));
    result.inherit_exits(&mut then_code);
    result.inherit_exits(&mut else_code);
    result
}

/// Loop body with break/continue bound to this loop
fn loop_body(gen: &mut StatementTranslator, body: &Stmt) -> StmtCode {
    gen.loop_depth += 1;
    let code = gen.translate(body);
    gen.loop_depth -= 1;
    code
}

fn first_or(code: &[InstrId], fallback: InstrId) -> InstrId {
    code.first().copied().unwrap_or(fallback)
}

pub(super) fn translate_while(
    gen: &mut StatementTranslator,
    cond: &ExprCode,
    body: &Stmt,
    span: &SourceSpan,
) -> StmtCode {
    let test = gen.condition(cond, span);
    let mut body_code = loop_body(gen, body);
    let back = gen.tac.emit_jump();

    let test_entry = first_or(&test.code, body_code.entry());
    gen.patch(&test.true_list, body_code.entry());
    let to_test = body_code
        .next
        .take()
        .merge(body_code.continue_list.take())
        .merge(PatchList::single(back));
    gen.patch(&to_test, test_entry);

    let mut result = StmtCode::default();
    result.code = test.code;
    result.code.append(&mut body_code.code);
    result.code.push(back);
    result.next = test.false_list.merge(body_code.break_list.take());
    result.returns = body_code.returns.take();
    result
}

pub(super) fn translate_do_while(
    gen: &mut StatementTranslator,
    body: &Stmt,
    cond: &ExprCode,
    span: &SourceSpan,
) -> StmtCode {
    let mut body_code = loop_body(gen, body);
    let test = gen.condition(cond, span);
    // taken when the test falls through, i.e. the condition holds
    let back = gen.tac.emit_jump();

    let test_entry = first_or(&test.code, back);
    let to_test = body_code.next.take().merge(body_code.continue_list.take());
    gen.patch(&to_test, test_entry);
    gen.patch(&test.true_list.merge(PatchList::single(back)), body_code.entry());

    let mut result = StmtCode::default();
    result.code = body_code.code.split_off(0);
    result.code.extend(test.code);
    result.code.push(back);
    result.next = test.false_list.merge(body_code.break_list.take());
    result.returns = body_code.returns.take();
    result
}

pub(super) fn translate_for(
    gen: &mut StatementTranslator,
    init: Option<&ExprCode>,
    cond: Option<&ExprCode>,
    step: Option<&ExprCode>,
    body: &Stmt,
    span: &SourceSpan,
) -> StmtCode {
    let init = init.map(|e| gen.value_of(e, span));
    let test = match cond {
        Some(cond) => gen.condition(cond, span),
        None => Default::default(),
    };
    let mut body_code = loop_body(gen, body);
    let step = step.map(|e| gen.value_of(e, span));
    let back = gen.tac.emit_jump();

    let test_entry = first_or(&test.code, body_code.entry());
    let step_code = step.map(|s| s.code).unwrap_or_default();
    let step_entry = first_or(&step_code, back);

    gen.patch(&test.true_list, body_code.entry());
    let to_step = body_code.next.take().merge(body_code.continue_list.take());
    gen.patch(&to_step, step_entry);
    gen.patch(&PatchList::single(back), test_entry);

    let mut result = StmtCode::default();
    if let Some(init) = init {
        result.code = init.code;
    }
    result.code.extend(test.code);
    result.code.append(&mut body_code.code);
    result.code.extend(step_code);
    result.code.push(back);
    result.next = test.false_list.merge(body_code.break_list.take());
    result.returns = body_code.returns.take();
    result
}

//! `switch` as a chain of equality tests
//!
//! The switch starts with a jump to the first test. Every `case c:` emits
//! `if t != c goto <pending>` and resolves the previous pending test to
//! itself; code falling out of the preceding case body jumps over the test.
//! Once the body is done the last pending test goes to `default`, or out of
//! the switch.

use super::{StatementTranslator, StmtCode};
use crate::ast::Stmt;
use crate::errors::StatementError;
use crate::expr::ExprCode;
use log::debug;
use mcc_common::{ScalarType, SourceSpan};
use mcc_ir::{Condition, InstrId, Operand, PatchList, Relation};
use std::collections::BTreeMap;

#[derive(Debug)]
pub(crate) struct SwitchContext {
    place: Operand,
    ty: ScalarType,
    /// Test (or initial jump) waiting for the next case's test
    pending: PatchList,
    /// Case values seen so far, with the test each one owns
    cases: BTreeMap<i64, InstrId>,
    default_entry: Option<InstrId>,
    labels_seen: usize,
}

pub(super) fn translate_switch(
    gen: &mut StatementTranslator,
    scrutinee: &ExprCode,
    body: &Stmt,
    span: &SourceSpan,
) -> StmtCode {
    let value = gen.value_of(scrutinee, span);
    if !value.ty.is_integral() {
        gen.report(StatementError::NonIntegerSwitch(value.ty), span);
    }

    let dispatch = gen.tac.emit_jump();
    gen.switches.push(SwitchContext {
        place: value.place.clone(),
        ty: value.ty,
        pending: PatchList::single(dispatch),
        cases: BTreeMap::new(),
        default_entry: None,
        labels_seen: 0,
    });
    let mut body_code = gen.translate(body);
    let context = gen.switches.pop();

    let mut result = StmtCode::from_code(value.code);
    result.code.push(dispatch);
    result.code.append(&mut body_code.code);
    result.next = body_code.next.take().merge(body_code.break_list.take());
    result.continue_list = body_code.continue_list.take();
    result.returns = body_code.returns.take();

    if let Some(context) = context {
        debug!(
            "switch on {}: {} case(s), default: {}",
            context.place,
            context.cases.len(),
            context.default_entry.is_some()
        );
        match context.default_entry {
            Some(entry) => gen.patch(&context.pending, entry),
            None => result.next.absorb(context.pending),
        }
    }
    result
}

pub(super) fn translate_case(
    gen: &mut StatementTranslator,
    value: &ExprCode,
    body: &Stmt,
    span: &SourceSpan,
) -> StmtCode {
    if gen.switches.is_empty() {
        gen.report(StatementError::CaseOutsideSwitch, span);
        return gen.translate(body);
    }

    let Some(constant) = value.constant_value() else {
        gen.report(StatementError::NonConstantCase, span);
        return gen.translate(body);
    };

    let (place, ty, first_label) = match gen.switches.last() {
        Some(context) => (context.place.clone(), context.ty, context.labels_seen == 0),
        None => return gen.translate(body),
    };

    let mut code = Vec::new();
    let fallthrough = if first_label {
        None
    } else {
        let jump = gen.tac.emit_jump();
        code.push(jump);
        Some(jump)
    };
    let test = gen.tac.emit_cond_jump(Condition {
        relation: Relation::Ne,
        ty,
        lhs: place,
        rhs: Operand::constant(constant),
    });
    code.push(test);

    let mut duplicate = false;
    let mut previous = PatchList::new();
    if let Some(context) = gen.switches.last_mut() {
        context.labels_seen += 1;
        if context.cases.contains_key(&constant) {
            duplicate = true;
        } else {
            context.cases.insert(constant, test);
        }
        previous = std::mem::replace(&mut context.pending, PatchList::single(test));
    }
    if duplicate {
        gen.report(StatementError::DuplicateCase(constant), span);
    }
    gen.patch(&previous, test);

    let mut body_code = gen.translate(body);
    if let Some(jump) = fallthrough {
        gen.patch(&PatchList::single(jump), body_code.entry());
    }

    let mut result = StmtCode::from_code(code);
    result.code.append(&mut body_code.code);
    result.next = body_code.next.take();
    result.inherit_exits(&mut body_code);
    result
}

pub(super) fn translate_default(gen: &mut StatementTranslator, body: &Stmt, span: &SourceSpan) -> StmtCode {
    if gen.switches.is_empty() {
        gen.report(StatementError::DefaultOutsideSwitch, span);
        return gen.translate(body);
    }

    // counted before the body so a case label directly inside it keeps its
    // fall-through jump
    if let Some(context) = gen.switches.last_mut() {
        context.labels_seen += 1;
    }
    let body_code = gen.translate(body);
    let mut multiple = false;
    if let Some(context) = gen.switches.last_mut() {
        if context.default_entry.is_some() {
            multiple = true;
        } else {
            context.default_entry = Some(body_code.entry());
        }
    }
    if multiple {
        gen.report(StatementError::MultipleDefaults, span);
    }
    body_code
}

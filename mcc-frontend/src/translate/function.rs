//! Function definitions: markers, label tables and closing open exits

use super::{StatementTranslator, StmtCode};
use crate::ast::FunctionDef;
use crate::errors::StatementError;
use log::debug;
use mcc_common::{ScalarType, SourceSpan};
use mcc_ir::{InstrId, Operand, Operator, PatchList};
use std::collections::BTreeMap;

/// Per-function translation state
#[derive(Debug)]
pub(crate) struct FunctionContext {
    pub name: String,
    pub return_type: ScalarType,
    /// Defined labels and the instruction each one anchors
    pub labels: BTreeMap<String, InstrId>,
    /// Gotos to labels not seen yet, with the first use site
    pub pending_gotos: BTreeMap<String, (PatchList, SourceSpan)>,
}

impl FunctionContext {
    pub fn new(name: &str, return_type: ScalarType) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            labels: BTreeMap::new(),
            pending_gotos: BTreeMap::new(),
        }
    }
}

pub(super) fn translate_function(gen: &mut StatementTranslator, def: &FunctionDef) -> Vec<InstrId> {
    gen.function = FunctionContext::new(&def.name, def.return_type);
    gen.loop_depth = 0;
    gen.switches.clear();

    let begin = gen.tac.emit_quad(
        Operator::FuncBegin,
        def.return_type,
        Operand::Empty,
        Operand::label(&def.name),
        Operand::Empty,
    );
    let mut body: StmtCode = gen.translate(&def.body);
    let end = gen.tac.emit_quad(
        Operator::FuncEnd,
        def.return_type,
        Operand::Empty,
        Operand::label(&def.name),
        Operand::Empty,
    );

    // Everything still open leaves through the function exit. Stray
    // break/continue statements were already diagnosed.
    let open = body
        .next
        .take()
        .merge(body.returns.take())
        .merge(body.break_list.take())
        .merge(body.continue_list.take());
    gen.patch(&open, end);

    let pending = std::mem::take(&mut gen.function.pending_gotos);
    for (label, (list, span)) in pending {
        gen.report(StatementError::UndefinedLabel(label), &span);
        gen.patch(&list, end);
    }

    debug!(
        "function '{}': {} instructions, {} labels",
        def.name,
        body.code.len() + 2,
        gen.function.labels.len()
    );

    let mut code = Vec::with_capacity(body.code.len() + 2);
    code.push(begin);
    code.append(&mut body.code);
    code.push(end);
    code
}

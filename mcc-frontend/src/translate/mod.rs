//! Statement translation with backpatching
//!
//! Every statement becomes a `StmtCode`: its instructions in program order
//! and the jumps still waiting for a destination. Enclosing constructs
//! resolve those lists once the destination exists; the function definition
//! closes whatever is left.

mod control_flow;
mod function;
mod jumps;
mod switch;

use crate::ast::{FunctionDef, Stmt, StmtKind, TranslationUnit};
use crate::errors::StatementError;
use crate::expr::{ExprBuilder, ExprCode};
use log::{debug, info};
use mcc_common::{ErrorReporter, ScalarType, SourceSpan};
use mcc_ir::{InstrId, Operand, PatchList, TacBuilder, TacProgram};
use std::collections::BTreeMap;

pub(crate) use function::FunctionContext;
pub(crate) use switch::SwitchContext;

/// Translated statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StmtCode {
    /// Instructions in program order; never empty
    pub code: Vec<InstrId>,
    /// Jumps to whatever follows the statement
    pub next: PatchList,
    pub break_list: PatchList,
    pub continue_list: PatchList,
    /// Jumps from `return` statements to the function exit
    pub returns: PatchList,
}

impl StmtCode {
    fn from_code(code: Vec<InstrId>) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// First instruction of the statement
    pub fn entry(&self) -> InstrId {
        self.code[0]
    }

    /// Take over the break, continue and return exits of `inner`
    fn inherit_exits(&mut self, inner: &mut StmtCode) {
        self.break_list.absorb(inner.break_list.take());
        self.continue_list.absorb(inner.continue_list.take());
        self.returns.absorb(inner.returns.take());
    }
}

/// Condition in control-flow form, ready to be laid out
#[derive(Debug, Default)]
pub(crate) struct CondCode {
    pub code: Vec<InstrId>,
    pub true_list: PatchList,
    pub false_list: PatchList,
}

pub struct StatementTranslator<'a> {
    pub(crate) tac: &'a mut TacBuilder,
    pub(crate) reporter: &'a mut ErrorReporter,
    pub(crate) function: FunctionContext,
    pub(crate) loop_depth: usize,
    pub(crate) switches: Vec<SwitchContext>,
}

impl<'a> StatementTranslator<'a> {
    pub fn new(tac: &'a mut TacBuilder, reporter: &'a mut ErrorReporter) -> Self {
        Self {
            tac,
            reporter,
            function: FunctionContext::new("<none>", ScalarType::Void),
            loop_depth: 0,
            switches: Vec::new(),
        }
    }

    /// Translate one statement
    pub fn translate(&mut self, stmt: &Stmt) -> StmtCode {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expression_statement(expr),
            StmtKind::Compound(stmts) => self.compound(stmts),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => control_flow::translate_if_else(self, cond, then_branch, else_branch, &stmt.span),
                None => control_flow::translate_if(self, cond, then_branch, &stmt.span),
            },
            StmtKind::While { cond, body } => control_flow::translate_while(self, cond, body, &stmt.span),
            StmtKind::DoWhile { body, cond } => control_flow::translate_do_while(self, body, cond, &stmt.span),
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => control_flow::translate_for(
                self,
                init.as_ref(),
                cond.as_ref(),
                step.as_ref(),
                body,
                &stmt.span,
            ),
            StmtKind::Switch { scrutinee, body } => switch::translate_switch(self, scrutinee, body, &stmt.span),
            StmtKind::Case { value, body } => switch::translate_case(self, value, body, &stmt.span),
            StmtKind::Default { body } => switch::translate_default(self, body, &stmt.span),
            StmtKind::Labeled { label, body } => jumps::translate_labeled(self, label, body, &stmt.span),
            StmtKind::Goto(label) => jumps::translate_goto(self, label, &stmt.span),
            StmtKind::Break => jumps::translate_break(self, &stmt.span),
            StmtKind::Continue => jumps::translate_continue(self, &stmt.span),
            StmtKind::Return(value) => jumps::translate_return(self, value.as_ref(), &stmt.span),
            StmtKind::Empty => StmtCode::from_code(vec![self.tac.emit_nop()]),
        }
    }

    /// Translate a whole function definition; returns its instructions
    pub fn translate_function(&mut self, def: &FunctionDef) -> Vec<InstrId> {
        function::translate_function(self, def)
    }

    fn expression_statement(&mut self, expr: &ExprCode) -> StmtCode {
        if expr.code.is_empty() {
            return StmtCode::from_code(vec![self.tac.emit_nop()]);
        }

        let mut code = StmtCode::from_code(expr.code.clone());
        if expr.jumping {
            code.next = expr.true_list.clone().merge(expr.false_list.clone());
        }
        code
    }

    fn compound(&mut self, stmts: &[Stmt]) -> StmtCode {
        let mut result: Option<StmtCode> = None;
        for stmt in stmts {
            let mut code = self.translate(stmt);
            result = Some(match result {
                None => code,
                Some(mut acc) => {
                    let entry = code.entry();
                    self.patch(&acc.next, entry);
                    acc.code.append(&mut code.code);
                    acc.next = code.next.take();
                    acc.inherit_exits(&mut code);
                    acc
                }
            });
        }
        result.unwrap_or_else(|| StmtCode::from_code(vec![self.tac.emit_nop()]))
    }

    /// Bring an expression into control-flow form for a branch.
    ///
    /// Constant conditions are folded: a non-zero constant produces no test
    /// at all, zero produces a single jump to the false exit.
    pub(crate) fn condition(&mut self, expr: &ExprCode, span: &SourceSpan) -> CondCode {
        if expr.jumping {
            return CondCode {
                code: expr.code.clone(),
                true_list: expr.true_list.clone(),
                false_list: expr.false_list.clone(),
            };
        }

        if !expr.ty.is_integral() {
            self.report(StatementError::NonIntegerCondition(expr.ty), span);
        }

        if let Some(value) = expr.constant_value() {
            debug!("folding constant condition {value}");
            return if value != 0 {
                CondCode::default()
            } else {
                let jump = self.tac.emit_jump();
                CondCode {
                    code: vec![jump],
                    true_list: PatchList::new(),
                    false_list: PatchList::single(jump),
                }
            };
        }

        let test = ExprBuilder::new(&mut *self.tac).to_jumping(expr.clone());
        match test {
            Ok(test) => CondCode {
                code: test.code,
                true_list: test.true_list,
                false_list: test.false_list,
            },
            Err(err) => {
                self.report(StatementError::Internal(err), span);
                CondCode::default()
            }
        }
    }

    /// Expression evaluated for its value, with any control-flow form
    /// turned into 0/1
    pub(crate) fn value_of(&mut self, expr: &ExprCode, span: &SourceSpan) -> ExprCode {
        match ExprBuilder::new(&mut *self.tac).materialize(expr.clone()) {
            Ok(value) => value,
            Err(err) => {
                self.report(StatementError::Internal(err), span);
                ExprCode::value(Vec::new(), Operand::constant(0), ScalarType::I32)
            }
        }
    }

    pub(crate) fn patch(&mut self, list: &PatchList, target: InstrId) {
        if let Err(err) = self.tac.backpatch(list, target) {
            self.reporter
                .error(StatementError::Internal(err).to_string(), SourceSpan::dummy());
        }
    }

    pub(crate) fn report(&mut self, error: StatementError, span: &SourceSpan) {
        debug!("{span}: {error}");
        self.reporter.error(error.to_string(), span.clone());
    }
}

/// Result of translating a unit
#[derive(Debug)]
pub struct Translation {
    pub program: TacProgram,
    pub reporter: ErrorReporter,
}

impl Translation {
    pub fn has_errors(&self) -> bool {
        self.reporter.has_errors()
    }
}

/// Translate every function of the unit, in order, into one program.
///
/// `tac` must be the builder the unit's expression fragments were created
/// with.
pub fn translate_unit(unit: &TranslationUnit, mut tac: TacBuilder) -> Translation {
    let mut reporter = ErrorReporter::new();
    let mut order = Vec::new();
    let mut seen = BTreeMap::new();

    for def in &unit.functions {
        if let Some(previous) = seen.insert(def.name.clone(), def.span.clone()) {
            reporter
                .error(format!("redefinition of function '{}'", def.name), def.span.clone())
                .notes
                .push(format!("previous definition at {previous}"));
        }
        let mut translator = StatementTranslator::new(&mut tac, &mut reporter);
        order.extend(translator.translate_function(def));
    }

    let program = match tac.build(&order) {
        Ok(program) => program,
        Err(err) => {
            reporter.error(StatementError::Internal(err).to_string(), SourceSpan::dummy());
            TacProgram::default()
        }
    };

    info!(
        "translated {} function(s) into {} TAC instructions ({})",
        unit.functions.len(),
        program.len(),
        reporter.summary()
    );
    Translation { program, reporter }
}

#[cfg(test)]
mod tests;

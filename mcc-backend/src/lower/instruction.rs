//! Instruction Lowering - dispatch plus control flow and operators

use super::function::FunctionLowering;
use crate::error::BackendError;
use crate::templates::{branch_on, float_condition, select, OpClass, Template};
use log::trace;
use mcc_codegen::{AsmInst, BranchOp, FloatCond, FloatFmt, ImmOp, IntOp, Reg};
use mcc_ir::{Condition, InstrKind, Instruction, JumpTarget, Operator, Quad};

impl FunctionLowering<'_> {
    pub(super) fn lower_instruction(&mut self, instruction: &Instruction) -> Result<(), BackendError> {
        trace!("{}: lowering [{}] {}", self.layout.function(), instruction.id, instruction);
        match &instruction.kind {
            InstrKind::Plain(quad) => self.lower_quad(quad),
            InstrKind::Jump { target } => {
                let label = self.target_label(*target)?;
                self.alloc.spill_all()?;
                self.emit(AsmInst::J(label));
                self.alloc.reset_block();
                Ok(())
            }
            InstrKind::CondJump { cond, target } => self.lower_branch(cond, *target),
        }
    }

    fn target_label(&self, target: JumpTarget) -> Result<String, BackendError> {
        match target {
            JumpTarget::Pending => Err(BackendError::UnresolvedJump(self.position)),
            JumpTarget::Resolved(id) => Ok(self.labels.label_of(id)?.to_string()),
        }
    }

    fn lower_quad(&mut self, quad: &Quad) -> Result<(), BackendError> {
        match quad.op {
            Operator::FuncBegin => {
                let prologue = self.layout.frame().gen_prologue();
                self.emit_all(prologue);
                Ok(())
            }
            Operator::FuncEnd => {
                self.alloc.spill_all()?;
                let epilogue = self.layout.frame().gen_epilogue();
                self.emit_all(epilogue);
                Ok(())
            }
            Operator::Nop => Ok(()),
            Operator::Assign => self.lower_assign(quad),
            Operator::Cast(from) => self.convert(&quad.result, quad.ty, &quad.arg1, from),
            Operator::Neg | Operator::BitNot | Operator::LogicalNot => self.lower_unary(quad),
            Operator::AddrOf => self.lower_address_of(quad),
            Operator::Deref => self.lower_load(quad),
            Operator::StoreDeref => self.lower_store(quad),
            Operator::Param => {
                self.pending_params.push((quad.arg1.clone(), quad.ty));
                Ok(())
            }
            Operator::Call => self.lower_call(quad),
            Operator::Return => self.lower_return(quad),
            op if op.is_binary() => self.lower_binary(quad),
            op => Err(BackendError::Unsupported(format!("operator {op:?}"))),
        }
    }

    /// Operands are read before the block is flushed; the flush only
    /// stores, so the comparison still sees the loaded values
    fn lower_branch(&mut self, cond: &Condition, target: JumpTarget) -> Result<(), BackendError> {
        let label = self.target_label(target)?;
        let class = OpClass::of(cond.ty)?;
        match (class, class.float_fmt()) {
            (OpClass::Int { signed, .. }, _) => {
                let lhs = self.int_operand(&cond.lhs, cond.ty)?;
                let rhs = self.int_operand(&cond.rhs, cond.ty)?;
                self.alloc.spill_all()?;
                self.emit(AsmInst::Branch(branch_on(cond.relation, signed), lhs, rhs, label));
            }
            (OpClass::Long { signed }, _) => {
                let lhs = self.long_operand(&cond.lhs)?;
                let rhs = self.long_operand(&cond.rhs)?;
                self.long_compare(cond.relation, signed, lhs, rhs, Reg::S7);
                self.alloc.spill_all()?;
                self.emit(AsmInst::Branch(BranchOp::Bne, Reg::S7, Reg::Zero, label));
            }
            (_, Some(fmt)) => {
                let lhs = self.float_operand(&cond.lhs, fmt)?;
                let rhs = self.float_operand(&cond.rhs, fmt)?;
                let (flag, swap, negate) = float_condition(cond.relation);
                let (lhs, rhs) = if swap { (rhs, lhs) } else { (lhs, rhs) };
                self.emit(AsmInst::FCompare(flag, fmt, lhs.even, rhs.even));
                self.alloc.spill_all()?;
                self.emit(if negate { AsmInst::Bc1f(label) } else { AsmInst::Bc1t(label) });
            }
            (_, None) => {
                return Err(BackendError::Unsupported(format!("branch on {}", cond.ty)));
            }
        }
        Ok(())
    }

    fn lower_binary(&mut self, quad: &Quad) -> Result<(), BackendError> {
        let class = OpClass::of(quad.ty)?;
        match select(quad.op, class)? {
            Template::Int(op) => {
                let lhs = self.int_operand(&quad.arg1, quad.ty)?;
                let rhs = self.int_operand(&quad.arg2, quad.ty)?;
                let rd = self.int_result(&quad.result)?;
                self.emit(AsmInst::Op(op, rd, lhs, rhs));
                self.renormalize(rd, class);
            }
            Template::IntCompare(op) => {
                let lhs = self.int_operand(&quad.arg1, quad.ty)?;
                let rhs = self.int_operand(&quad.arg2, quad.ty)?;
                let rd = self.int_result(&quad.result)?;
                self.emit(AsmInst::Op(op, rd, lhs, rhs));
            }
            Template::Long(op) => {
                let signed = matches!(class, OpClass::Long { signed: true });
                self.lower_long(op, signed, quad)?;
            }
            Template::LongCompare(relation) => {
                let signed = matches!(class, OpClass::Long { signed: true });
                let lhs = self.long_operand(&quad.arg1)?;
                let rhs = self.long_operand(&quad.arg2)?;
                let rd = self.int_result(&quad.result)?;
                self.long_compare(relation, signed, lhs, rhs, rd);
            }
            Template::Float(op, fmt) => {
                let lhs = self.float_operand(&quad.arg1, fmt)?;
                let rhs = self.float_operand(&quad.arg2, fmt)?;
                let fd = self.float_result(&quad.result, fmt)?;
                self.emit(AsmInst::FloatOp(op, fmt, fd.even, lhs.even, rhs.even));
            }
            Template::FloatCompare {
                cond,
                fmt,
                swap,
                negate,
            } => {
                let lhs = self.float_operand(&quad.arg1, fmt)?;
                let rhs = self.float_operand(&quad.arg2, fmt)?;
                let rd = self.int_result(&quad.result)?;
                let (lhs, rhs) = if swap { (rhs, lhs) } else { (lhs, rhs) };
                self.emit(AsmInst::FCompare(cond, fmt, lhs.even, rhs.even));
                self.set_from_flag(rd, negate);
            }
        }
        Ok(())
    }

    fn lower_unary(&mut self, quad: &Quad) -> Result<(), BackendError> {
        let class = OpClass::of(quad.ty)?;
        match (quad.op, class, class.float_fmt()) {
            (Operator::Neg, OpClass::Int { .. }, _) => {
                let value = self.int_operand(&quad.arg1, quad.ty)?;
                let rd = self.int_result(&quad.result)?;
                self.emit(AsmInst::Negu(rd, value));
                self.renormalize(rd, class);
            }
            (Operator::BitNot, OpClass::Int { .. }, _) => {
                let value = self.int_operand(&quad.arg1, quad.ty)?;
                let rd = self.int_result(&quad.result)?;
                self.emit(AsmInst::Not(rd, value));
                self.renormalize(rd, class);
            }
            (Operator::LogicalNot, OpClass::Int { .. }, _) => {
                let value = self.int_operand(&quad.arg1, quad.ty)?;
                let rd = self.int_result(&quad.result)?;
                self.emit(AsmInst::OpImm(ImmOp::Sltiu, rd, value, 1));
            }
            (Operator::Neg, OpClass::Long { .. }, _) => {
                let value = self.long_operand(&quad.arg1)?;
                let dest = self.long_result(&quad.result)?;
                self.long_negate(value, dest);
            }
            (Operator::BitNot, OpClass::Long { .. }, _) => {
                let value = self.long_operand(&quad.arg1)?;
                let dest = self.long_result(&quad.result)?;
                self.long_not(value, dest);
            }
            (Operator::LogicalNot, OpClass::Long { .. }, _) => {
                let value = self.long_operand(&quad.arg1)?;
                let rd = self.int_result(&quad.result)?;
                self.emit(AsmInst::Op(IntOp::Or, Reg::S4, value.lo, value.hi));
                self.emit(AsmInst::OpImm(ImmOp::Sltiu, rd, Reg::S4, 1));
            }
            (Operator::Neg, _, Some(fmt)) => {
                let value = self.float_operand(&quad.arg1, fmt)?;
                let fd = self.float_result(&quad.result, fmt)?;
                self.emit(AsmInst::FNeg(fmt, fd.even, value.even));
            }
            (Operator::LogicalNot, _, Some(fmt)) => self.float_is_zero(quad, fmt)?,
            (op, class, _) => {
                return Err(BackendError::Unsupported(format!("{op:?} on {class:?} operands")));
            }
        }
        Ok(())
    }

    fn float_is_zero(&mut self, quad: &Quad, fmt: FloatFmt) -> Result<(), BackendError> {
        let value = self.float_operand(&quad.arg1, fmt)?;
        let zero = self.float_zero(fmt);
        let rd = self.int_result(&quad.result)?;
        self.emit(AsmInst::FCompare(FloatCond::Eq, fmt, value.even, zero));
        self.set_from_flag(rd, false);
        Ok(())
    }

    /// `rd` = 1 when the coprocessor flag is set (clear when `negate`), else 0
    fn set_from_flag(&mut self, rd: Reg, negate: bool) {
        let done = self.local_labels.new_label();
        self.emit(AsmInst::Li(rd, 1));
        self.emit(if negate {
            AsmInst::Bc1f(done.clone())
        } else {
            AsmInst::Bc1t(done.clone())
        });
        self.emit(AsmInst::Li(rd, 0));
        self.emit(AsmInst::Label(done));
    }
}

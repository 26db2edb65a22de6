//! 64-bit integer sequences
//!
//! A 64-bit value is a (lo, hi) pair of 32-bit words. Intermediate words
//! are built in `$s4..$s7` and copied to the destination pair last, so the
//! destination may overlap an operand.

use super::function::FunctionLowering;
use crate::error::BackendError;
use crate::templates::{set_on, LongOp};
use mcc_codegen::{AsmInst, BranchOp, CallingConvention, ImmOp, IntOp, Reg, RegisterPair};
use mcc_ir::{Quad, Relation};

const LO: Reg = CallingConvention::INT_SCRATCH[4];
const HI: Reg = CallingConvention::INT_SCRATCH[5];
const TMP: Reg = CallingConvention::INT_SCRATCH[6];
const COUNT: Reg = CallingConvention::INT_SCRATCH[7];

impl FunctionLowering<'_> {
    pub(super) fn lower_long(&mut self, op: LongOp, signed: bool, quad: &Quad) -> Result<(), BackendError> {
        let a = self.long_operand(&quad.arg1)?;
        let b = self.long_operand(&quad.arg2)?;
        let d = self.long_result(&quad.result)?;
        match op {
            LongOp::Add => self.long_add(a, b, d),
            LongOp::Sub => self.long_sub(a, b, d),
            LongOp::Mul => self.long_mul(a, b, d),
            LongOp::And => self.long_bitwise(IntOp::And, a, b, d),
            LongOp::Or => self.long_bitwise(IntOp::Or, a, b, d),
            LongOp::Xor => self.long_bitwise(IntOp::Xor, a, b, d),
            LongOp::Div => self.long_divide(if signed { IntOp::Div } else { IntOp::Divu }, signed, a, b, d),
            LongOp::Rem => self.long_divide(if signed { IntOp::Rem } else { IntOp::Remu }, signed, a, b, d),
            LongOp::Shl => self.long_shift(true, signed, a, b.lo, d),
            LongOp::Shr => self.long_shift(false, signed, a, b.lo, d),
        }
        Ok(())
    }

    fn op(&mut self, op: IntOp, rd: Reg, rs: Reg, rt: Reg) {
        self.emit(AsmInst::Op(op, rd, rs, rt));
    }

    /// The carry out of the low words is `lo < b.lo` (unsigned)
    fn long_add(&mut self, a: RegisterPair, b: RegisterPair, d: RegisterPair) {
        self.op(IntOp::Addu, LO, a.lo, b.lo);
        self.op(IntOp::Sltu, HI, LO, b.lo);
        self.op(IntOp::Addu, d.hi, a.hi, b.hi);
        self.op(IntOp::Addu, d.hi, d.hi, HI);
        self.emit(AsmInst::Move(d.lo, LO));
    }

    fn long_sub(&mut self, a: RegisterPair, b: RegisterPair, d: RegisterPair) {
        self.op(IntOp::Sltu, HI, a.lo, b.lo);
        self.op(IntOp::Subu, LO, a.lo, b.lo);
        self.op(IntOp::Subu, d.hi, a.hi, b.hi);
        self.op(IntOp::Subu, d.hi, d.hi, HI);
        self.emit(AsmInst::Move(d.lo, LO));
    }

    /// lo*lo gives the full low product; the cross terms only reach the
    /// high word. ah*bh is left out: it only affects bits above 63.
    fn long_mul(&mut self, a: RegisterPair, b: RegisterPair, d: RegisterPair) {
        self.emit(AsmInst::Multu(a.lo, b.lo));
        self.emit(AsmInst::Mflo(LO));
        self.emit(AsmInst::Mfhi(HI));
        self.op(IntOp::Mul, TMP, a.lo, b.hi);
        self.op(IntOp::Addu, HI, HI, TMP);
        self.op(IntOp::Mul, TMP, a.hi, b.lo);
        self.op(IntOp::Addu, HI, HI, TMP);
        self.emit(AsmInst::Move(d.lo, LO));
        self.emit(AsmInst::Move(d.hi, HI));
    }

    fn long_bitwise(&mut self, op: IntOp, a: RegisterPair, b: RegisterPair, d: RegisterPair) {
        self.op(op, LO, a.lo, b.lo);
        self.op(op, d.hi, a.hi, b.hi);
        self.emit(AsmInst::Move(d.lo, LO));
    }

    /// Only the low words take part; the result is extended from 32 bits
    fn long_divide(&mut self, op: IntOp, signed: bool, a: RegisterPair, b: RegisterPair, d: RegisterPair) {
        self.op(op, LO, a.lo, b.lo);
        self.extend_into(d.hi, LO, signed);
        self.emit(AsmInst::Move(d.lo, LO));
    }

    /// One bit per iteration, `amount & 63` times
    fn long_shift(&mut self, left: bool, signed: bool, a: RegisterPair, amount: Reg, d: RegisterPair) {
        let top = self.local_labels.new_label();
        let done = self.local_labels.new_label();

        self.emit(AsmInst::Move(LO, a.lo));
        self.emit(AsmInst::Move(HI, a.hi));
        self.emit(AsmInst::OpImm(ImmOp::Andi, COUNT, amount, 63));
        self.emit(AsmInst::Label(top.clone()));
        self.emit(AsmInst::Branch(BranchOp::Beq, COUNT, Reg::Zero, done.clone()));
        if left {
            self.emit(AsmInst::OpImm(ImmOp::Srl, TMP, LO, 31));
            self.emit(AsmInst::OpImm(ImmOp::Sll, LO, LO, 1));
            self.emit(AsmInst::OpImm(ImmOp::Sll, HI, HI, 1));
            self.op(IntOp::Or, HI, HI, TMP);
        } else {
            self.emit(AsmInst::OpImm(ImmOp::Sll, TMP, HI, 31));
            self.emit(AsmInst::OpImm(ImmOp::Srl, LO, LO, 1));
            self.op(IntOp::Or, LO, LO, TMP);
            let shift = if signed { ImmOp::Sra } else { ImmOp::Srl };
            self.emit(AsmInst::OpImm(shift, HI, HI, 1));
        }
        self.emit(AsmInst::OpImm(ImmOp::Addiu, COUNT, COUNT, -1));
        self.emit(AsmInst::J(top));
        self.emit(AsmInst::Label(done));
        self.emit(AsmInst::Move(d.lo, LO));
        self.emit(AsmInst::Move(d.hi, HI));
    }

    /// `rd` = `a relation b` as 0 or 1. Uses `$s4..$s6`; `rd` is written
    /// last.
    pub(super) fn long_compare(
        &mut self,
        relation: Relation,
        signed: bool,
        a: RegisterPair,
        b: RegisterPair,
        rd: Reg,
    ) {
        match relation {
            Relation::Lt => self.long_less(signed, a, b, rd),
            Relation::Gt => self.long_less(signed, b, a, rd),
            Relation::Ge => {
                self.long_less(signed, a, b, rd);
                self.emit(AsmInst::OpImm(ImmOp::Xori, rd, rd, 1));
            }
            Relation::Le => {
                self.long_less(signed, b, a, rd);
                self.emit(AsmInst::OpImm(ImmOp::Xori, rd, rd, 1));
            }
            Relation::Eq | Relation::Ne => {
                self.op(IntOp::Xor, LO, a.lo, b.lo);
                self.op(IntOp::Xor, HI, a.hi, b.hi);
                self.op(IntOp::Or, LO, LO, HI);
                if relation == Relation::Eq {
                    self.emit(AsmInst::OpImm(ImmOp::Sltiu, rd, LO, 1));
                } else {
                    self.op(IntOp::Sltu, rd, Reg::Zero, LO);
                }
            }
        }
    }

    /// High words decide (signed or not); equal high words fall back to an
    /// unsigned comparison of the low words
    fn long_less(&mut self, signed: bool, a: RegisterPair, b: RegisterPair, rd: Reg) {
        self.op(set_on(Relation::Lt, signed), LO, a.hi, b.hi);
        self.op(IntOp::Seq, HI, a.hi, b.hi);
        self.op(IntOp::Sltu, TMP, a.lo, b.lo);
        self.op(IntOp::And, HI, HI, TMP);
        self.op(IntOp::Or, rd, LO, HI);
    }

    /// Two's complement: negate both words, borrowing one from the high
    /// word when the low word is nonzero
    pub(super) fn long_negate(&mut self, a: RegisterPair, d: RegisterPair) {
        self.op(IntOp::Subu, LO, Reg::Zero, a.lo);
        self.op(IntOp::Sltu, HI, Reg::Zero, a.lo);
        self.op(IntOp::Subu, d.hi, Reg::Zero, a.hi);
        self.op(IntOp::Subu, d.hi, d.hi, HI);
        self.emit(AsmInst::Move(d.lo, LO));
    }

    pub(super) fn long_not(&mut self, a: RegisterPair, d: RegisterPair) {
        self.emit(AsmInst::Not(LO, a.lo));
        self.emit(AsmInst::Not(d.hi, a.hi));
        self.emit(AsmInst::Move(d.lo, LO));
    }

    /// `rd` = the high word of `rs` extended to 64 bits
    pub(super) fn extend_into(&mut self, rd: Reg, rs: Reg, signed: bool) {
        if signed {
            self.emit(AsmInst::OpImm(ImmOp::Sra, rd, rs, 31));
        } else {
            self.emit(AsmInst::Move(rd, Reg::Zero));
        }
    }
}

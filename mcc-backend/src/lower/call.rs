//! Parameters, calls and returns
//!
//! Arguments are pushed right to left, each in its own 4 or 8 byte slot,
//! so the first argument ends up nearest the stack pointer. The caller
//! pops them after the call. Results come back in `$v0/$v1` or `$f0/$f1`.

use super::function::FunctionLowering;
use crate::error::BackendError;
use crate::templates::OpClass;
use log::debug;
use mcc_codegen::emit::adjust_stack;
use mcc_codegen::{Addr, AsmInst, CallingConvention, FloatFmt, Width};
use mcc_common::ScalarType;
use mcc_ir::{Operand, Quad};

impl FunctionLowering<'_> {
    /// `result = call arg1, arg2` where `arg2` counts the queued parameters
    pub(super) fn lower_call(&mut self, quad: &Quad) -> Result<(), BackendError> {
        let callee = match &quad.arg1 {
            Operand::Label(name) | Operand::Identifier(name) => name.clone(),
            other => return Err(self.malformed(format!("cannot call '{other}'"))),
        };
        let args = std::mem::take(&mut self.pending_params);
        let argc = quad
            .arg2
            .int_value()
            .ok_or_else(|| self.malformed(format!("call to '{callee}' has no argument count")))?;
        if usize::try_from(argc).ok() != Some(args.len()) {
            return Err(self.malformed(format!(
                "call to '{callee}' passes {argc} argument(s) but {} were queued",
                args.len()
            )));
        }
        if let Some(record) = self.symbols.function(&callee) {
            if record.params.len() != args.len() {
                return Err(self.malformed(format!(
                    "'{callee}' takes {} argument(s), {} given",
                    record.params.len(),
                    args.len()
                )));
            }
        }
        debug!("{}: call {} with {} argument(s)", self.layout.function(), callee, args.len());

        self.alloc.flush_named()?;
        let mut pushed = 0;
        for (operand, ty) in args.iter().rev() {
            self.begin_step();
            pushed += self.push_argument(operand, *ty)?;
        }
        self.begin_step();

        let saved = self.alloc.save_for_call();
        self.emit(AsmInst::Jal(callee));
        self.emit_all(adjust_stack(pushed));
        self.alloc.restore_after_call(&saved);
        // the callee may have written any global
        self.alloc.forget_named();

        if !quad.result.is_empty() {
            self.take_result(&quad.result, quad.ty)?;
        }
        Ok(())
    }

    /// Push one argument; returns the bytes pushed
    fn push_argument(&mut self, operand: &Operand, ty: ScalarType) -> Result<i32, BackendError> {
        let size = ty.slot_size() as i32;
        let at = |offset| Addr::Offset(offset, CallingConvention::STACK_PTR);
        let class = OpClass::of(ty)?;
        match (class, class.float_fmt()) {
            (OpClass::Int { .. }, _) => {
                let value = self.int_operand(operand, ty)?;
                self.emit_all(adjust_stack(-size));
                self.emit(AsmInst::Store(Width::Word, value, at(0)));
            }
            (OpClass::Long { .. }, _) => {
                let value = self.long_operand(operand)?;
                self.emit_all(adjust_stack(-size));
                self.emit(AsmInst::Store(Width::Word, value.lo, at(0)));
                self.emit(AsmInst::Store(Width::Word, value.hi, at(4)));
            }
            (_, Some(fmt)) => {
                let value = self.float_operand(operand, fmt)?;
                self.emit_all(adjust_stack(-size));
                self.emit(AsmInst::StoreFloat(value.even, at(0)));
                if fmt == FloatFmt::Double {
                    self.emit(AsmInst::StoreFloat(value.odd, at(4)));
                }
            }
            (_, None) => return Err(BackendError::Unsupported(format!("argument of type {ty}"))),
        }
        Ok(size)
    }

    fn take_result(&mut self, result: &Operand, ty: ScalarType) -> Result<(), BackendError> {
        let class = OpClass::of(ty)?;
        match (class, class.float_fmt()) {
            (OpClass::Int { .. }, _) => {
                let rd = self.int_result(result)?;
                self.emit(AsmInst::Move(rd, CallingConvention::INT_RESULT.lo));
            }
            (OpClass::Long { .. }, _) => {
                let d = self.long_result(result)?;
                self.emit(AsmInst::Move(d.lo, CallingConvention::INT_RESULT.lo));
                self.emit(AsmInst::Move(d.hi, CallingConvention::INT_RESULT.hi));
            }
            (_, Some(fmt)) => {
                let fd = self.float_result(result, fmt)?;
                self.emit(AsmInst::FMov(fmt, fd.even, CallingConvention::FLOAT_RESULT.even));
            }
            (_, None) => return Err(BackendError::Unsupported(format!("result of type {ty}"))),
        }
        Ok(())
    }

    /// `return arg1`; the epilogue is emitted at the function end
    pub(super) fn lower_return(&mut self, quad: &Quad) -> Result<(), BackendError> {
        if quad.arg1.is_empty() {
            return Ok(());
        }
        let class = OpClass::of(quad.ty)?;
        match (class, class.float_fmt()) {
            (OpClass::Int { .. }, _) => {
                let value = self.int_operand(&quad.arg1, quad.ty)?;
                self.emit(AsmInst::Move(CallingConvention::INT_RESULT.lo, value));
            }
            (OpClass::Long { .. }, _) => {
                let value = self.long_operand(&quad.arg1)?;
                self.emit(AsmInst::Move(CallingConvention::INT_RESULT.lo, value.lo));
                self.emit(AsmInst::Move(CallingConvention::INT_RESULT.hi, value.hi));
            }
            (_, Some(fmt)) => {
                let value = self.float_operand(&quad.arg1, fmt)?;
                self.emit(AsmInst::FMov(fmt, CallingConvention::FLOAT_RESULT.even, value.even));
            }
            (_, None) => return Err(BackendError::Unsupported(format!("return of {}", quad.ty))),
        }
        Ok(())
    }
}

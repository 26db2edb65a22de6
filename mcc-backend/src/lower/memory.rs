//! Address-of, loads and stores through pointers
//!
//! Any named variable may be the target of a pointer, so dirty named
//! values are written back before memory is read or written this way,
//! and their register copies are dropped after a store.

use super::function::FunctionLowering;
use crate::error::BackendError;
use crate::templates::OpClass;
use mcc_codegen::{Addr, AsmInst, FloatFmt, Width};
use mcc_common::ScalarType;
use mcc_ir::Quad;

impl FunctionLowering<'_> {
    /// `result = &arg1`
    pub(super) fn lower_address_of(&mut self, quad: &Quad) -> Result<(), BackendError> {
        self.alloc.flush_named()?;
        let var = self.var_of(&quad.arg1)?;
        let home = self.home_of(&var)?;
        let rd = self.int_result(&quad.result)?;
        self.address_into(rd, &home.addr);
        Ok(())
    }

    /// `result = *arg1`, reading a value of type `ty`
    pub(super) fn lower_load(&mut self, quad: &Quad) -> Result<(), BackendError> {
        self.alloc.flush_named()?;
        let ptr = self.int_operand(&quad.arg1, ScalarType::Ptr)?;
        let at = |offset| Addr::Offset(offset, ptr);

        let class = OpClass::of(quad.ty)?;
        match (class, class.float_fmt()) {
            (OpClass::Int { .. }, _) => {
                let rd = self.int_result(&quad.result)?;
                self.emit(AsmInst::Load(Width::of(quad.ty), rd, at(0)));
            }
            (OpClass::Long { .. }, _) => {
                let d = self.long_result(&quad.result)?;
                self.emit(AsmInst::Load(Width::Word, d.lo, at(0)));
                self.emit(AsmInst::Load(Width::Word, d.hi, at(4)));
            }
            (_, Some(fmt)) => {
                let fd = self.float_result(&quad.result, fmt)?;
                self.emit(AsmInst::LoadFloat(fd.even, at(0)));
                if fmt == FloatFmt::Double {
                    self.emit(AsmInst::LoadFloat(fd.odd, at(4)));
                }
            }
            (_, None) => return Err(BackendError::Unsupported(format!("load of {}", quad.ty))),
        }
        Ok(())
    }

    /// `*result = arg1`, storing a value of type `ty`
    pub(super) fn lower_store(&mut self, quad: &Quad) -> Result<(), BackendError> {
        self.alloc.flush_named()?;
        let ptr = self.int_operand(&quad.result, ScalarType::Ptr)?;
        let at = |offset| Addr::Offset(offset, ptr);

        let class = OpClass::of(quad.ty)?;
        match (class, class.float_fmt()) {
            (OpClass::Int { .. }, _) => {
                let value = self.int_operand(&quad.arg1, quad.ty)?;
                self.emit(AsmInst::Store(Width::of(quad.ty), value, at(0)));
            }
            (OpClass::Long { .. }, _) => {
                let value = self.long_operand(&quad.arg1)?;
                self.emit(AsmInst::Store(Width::Word, value.lo, at(0)));
                self.emit(AsmInst::Store(Width::Word, value.hi, at(4)));
            }
            (_, Some(fmt)) => {
                let value = self.float_operand(&quad.arg1, fmt)?;
                self.emit(AsmInst::StoreFloat(value.even, at(0)));
                if fmt == FloatFmt::Double {
                    self.emit(AsmInst::StoreFloat(value.odd, at(4)));
                }
            }
            (_, None) => return Err(BackendError::Unsupported(format!("store of {}", quad.ty))),
        }
        self.alloc.forget_named();
        Ok(())
    }
}

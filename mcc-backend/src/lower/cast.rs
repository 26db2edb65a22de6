//! Assignments and conversions
//!
//! An assignment converts to the declared type of its destination, so
//! `char c = i` narrows and `double d = i` converts without an explicit
//! cast in the TAC.

use super::function::FunctionLowering;
use super::operand::{literal_words, CONVERT_SCRATCH};
use crate::error::BackendError;
use crate::regmgmt::ValueKey;
use crate::templates::OpClass;
use mcc_codegen::{AsmInst, FReg, NumFmt};
use mcc_common::ScalarType;
use mcc_ir::{Operand, Quad};

impl FunctionLowering<'_> {
    pub(super) fn lower_assign(&mut self, quad: &Quad) -> Result<(), BackendError> {
        let dest = self.var_of(&quad.result)?;
        let to = self.home_of(&dest)?.ty;
        let from = self.type_of(&quad.arg1, quad.ty)?;
        self.convert(&quad.result, to, &quad.arg1, from)
    }

    /// `result` (of type `to`) = `source` (of type `from`)
    pub(super) fn convert(
        &mut self,
        result: &Operand,
        to: ScalarType,
        source: &Operand,
        from: ScalarType,
    ) -> Result<(), BackendError> {
        if source.is_constant() {
            return self.load_literal(result, to, source);
        }
        let source_home = self.home_of(&self.var_of(source)?)?;
        if source_home.aggregate {
            // arrays and strings decay to their address
            let rd = self.int_result(result)?;
            self.address_into(rd, &source_home.addr);
            return Ok(());
        }

        let from_class = OpClass::of(from)?;
        let to_class = OpClass::of(to)?;
        if from_class == to_class {
            return self.copy(result, to_class, source);
        }

        match (from_class, to_class, from_class.float_fmt(), to_class.float_fmt()) {
            (OpClass::Int { .. }, OpClass::Int { bits, signed }, _, _) => {
                if bits >= 32 {
                    return self.copy(result, to_class, source);
                }
                let value = self.int_operand(source, from)?;
                let rd = self.int_result(result)?;
                self.narrow(rd, value, bits, signed);
            }
            (OpClass::Int { signed, .. }, OpClass::Long { .. }, _, _) => {
                let value = self.int_operand(source, from)?;
                let d = self.long_result(result)?;
                self.extend_into(d.hi, value, signed);
                self.emit(AsmInst::Move(d.lo, value));
            }
            (OpClass::Long { .. }, OpClass::Int { bits, signed }, _, _) => {
                let value = self.long_operand(source)?;
                let rd = self.int_result(result)?;
                self.narrow(rd, value.lo, bits, signed);
            }
            (OpClass::Long { .. }, OpClass::Long { .. }, _, _) => {
                return self.copy(result, to_class, source);
            }
            (_, _, None, Some(fmt)) => {
                let word = match from_class {
                    OpClass::Long { .. } => self.long_operand(source)?.lo,
                    _ => self.int_operand(source, from)?,
                };
                let fd = self.float_result(result, fmt)?;
                self.emit(AsmInst::Mtc1(word, CONVERT_SCRATCH.even));
                self.emit(AsmInst::Cvt {
                    to: fmt.into(),
                    from: NumFmt::Word,
                    dst: fd.even,
                    src: CONVERT_SCRATCH.even,
                });
            }
            (_, OpClass::Int { bits, signed }, Some(fmt), _) => {
                let value = self.float_operand(source, fmt)?;
                self.truncate_to_word(fmt.into(), value.even);
                let rd = self.int_result(result)?;
                self.emit(AsmInst::Mfc1(rd, CONVERT_SCRATCH.even));
                if bits < 32 {
                    self.narrow(rd, rd, bits, signed);
                }
            }
            (_, OpClass::Long { signed }, Some(fmt), _) => {
                let value = self.float_operand(source, fmt)?;
                self.truncate_to_word(fmt.into(), value.even);
                let d = self.long_result(result)?;
                self.emit(AsmInst::Mfc1(d.lo, CONVERT_SCRATCH.even));
                self.extend_into(d.hi, d.lo, signed);
            }
            (_, _, Some(have), Some(fmt)) => {
                let value = self.float_operand(source, have)?;
                let fd = self.float_result(result, fmt)?;
                self.emit(AsmInst::Cvt {
                    to: fmt.into(),
                    from: have.into(),
                    dst: fd.even,
                    src: value.even,
                });
            }
            (from_class, to_class, _, _) => {
                return Err(BackendError::Unsupported(format!(
                    "conversion from {from_class:?} to {to_class:?}"
                )));
            }
        }
        Ok(())
    }

    fn truncate_to_word(&mut self, from: NumFmt, src: FReg) {
        self.emit(AsmInst::Cvt {
            to: NumFmt::Word,
            from,
            dst: CONVERT_SCRATCH.even,
            src,
        });
    }

    /// The destination takes the register the source already lives in
    fn copy(&mut self, result: &Operand, class: OpClass, source: &Operand) -> Result<(), BackendError> {
        let from = self.var_of(source)?;
        let to = self.var_of(result)?;
        match class {
            OpClass::Int { .. } => {
                let reg = self.alloc.load_int(&ValueKey::lo(&from))?;
                self.int_result_check(result)?;
                self.alloc.copy_int(reg, &ValueKey::lo(&to));
            }
            OpClass::Long { .. } => {
                let lo = self.alloc.load_int(&ValueKey::lo(&from))?;
                let hi = self.alloc.load_int(&ValueKey::hi(&from))?;
                self.long_result_check(result)?;
                self.alloc.copy_int(lo, &ValueKey::lo(&to));
                self.alloc.copy_int(hi, &ValueKey::hi(&to));
            }
            OpClass::Single | OpClass::Double => {
                let pair = self.alloc.load_float(&ValueKey::lo(&from))?;
                let ty = self.home_of(&to)?.ty;
                if ty != self.home_of(&from)?.ty {
                    return Err(self.malformed(format!("'{to}' of type {ty} cannot hold '{from}'")));
                }
                self.alloc.copy_float(pair, &ValueKey::lo(&to));
            }
        }
        Ok(())
    }

    fn int_result_check(&self, result: &Operand) -> Result<(), BackendError> {
        let home = self.home_of(&self.var_of(result)?)?;
        if home.aggregate || !home.ty.is_integral() || home.ty.is_wide() {
            return Err(self.malformed(format!("'{result}' of type {} cannot hold a word", home.ty)));
        }
        Ok(())
    }

    fn long_result_check(&self, result: &Operand) -> Result<(), BackendError> {
        let home = self.home_of(&self.var_of(result)?)?;
        if home.aggregate || !home.ty.is_wide() {
            return Err(self.malformed(format!("'{result}' of type {} cannot hold a 64-bit value", home.ty)));
        }
        Ok(())
    }

    /// A constant stored at type `to`
    fn load_literal(&mut self, result: &Operand, to: ScalarType, constant: &Operand) -> Result<(), BackendError> {
        let words = literal_words(constant, to)
            .ok_or_else(|| self.malformed(format!("'{constant}' cannot be stored as {to}")))?;
        let class = OpClass::of(to)?;
        match (class, class.float_fmt(), words.as_slice()) {
            (OpClass::Int { .. }, _, [word]) => {
                let rd = self.int_result(result)?;
                self.emit(AsmInst::Li(rd, *word));
            }
            (OpClass::Long { .. }, _, [lo, hi]) => {
                let d = self.long_result(result)?;
                self.emit(AsmInst::Li(d.lo, *lo));
                self.emit(AsmInst::Li(d.hi, *hi));
            }
            (_, Some(fmt), words) => {
                let fd = self.float_result(result, fmt)?;
                self.move_words_to_float(words, fd);
            }
            _ => return Err(self.malformed(format!("'{constant}' cannot be stored as {to}"))),
        }
        Ok(())
    }
}

//! Operand access
//!
//! Variables come from the allocator and stay pinned until the current
//! instruction is done. Constants, addresses and converted values go to
//! scratch registers, which are handed out afresh for every instruction.

use super::function::FunctionLowering;
use crate::error::BackendError;
use crate::layout::Home;
use crate::regmgmt::{ValueKey, Var};
use crate::templates::OpClass;
use mcc_codegen::{
    Addr, AsmInst, CallingConvention, FReg, FloatFmt, FloatPair, ImmOp, NumFmt, Reg, RegisterPair,
};
use mcc_common::ScalarType;
use mcc_ir::Operand;

/// Constants and addresses of operands; `$s4..$s7` belong to sequences
const OPERAND_SCRATCH: [Reg; 4] = [
    CallingConvention::INT_SCRATCH[0],
    CallingConvention::INT_SCRATCH[1],
    CallingConvention::INT_SCRATCH[2],
    CallingConvention::INT_SCRATCH[3],
];
const FLOAT_OPERAND_SCRATCH: [FloatPair; 2] = [
    CallingConvention::FLOAT_SCRATCH[0],
    CallingConvention::FLOAT_SCRATCH[1],
];

/// Carries literal bit patterns into coprocessor 1
pub(super) const WORD_SCRATCH: Reg = CallingConvention::INT_SCRATCH[6];
/// Intermediate of int/float conversions
pub(super) const CONVERT_SCRATCH: FloatPair = CallingConvention::FLOAT_SCRATCH[2];

/// The 32-bit words of a constant stored at type `ty`, low word first.
/// Doubles and 64-bit integers give two words; narrow integers are
/// truncated and re-extended the way a store and load of `ty` would.
pub fn literal_words(operand: &Operand, ty: ScalarType) -> Option<Vec<i32>> {
    match ty {
        ScalarType::Void => None,
        ScalarType::F32 => Some(vec![(operand.float_value()? as f32).to_bits() as i32]),
        ScalarType::F64 => {
            let bits = operand.float_value()?.to_bits();
            Some(vec![bits as u32 as i32, (bits >> 32) as u32 as i32])
        }
        ty if ty.is_wide() => {
            let value = operand.int_value()?;
            Some(vec![value as i32, (value >> 32) as i32])
        }
        ty => Some(vec![narrow_value(operand.int_value()?, ty)]),
    }
}

fn narrow_value(value: i64, ty: ScalarType) -> i32 {
    match ty {
        ScalarType::I8 => value as i8 as i32,
        ScalarType::U8 => value as u8 as i32,
        ScalarType::I16 => value as i16 as i32,
        ScalarType::U16 => value as u16 as i32,
        _ => value as i32,
    }
}

pub(super) fn float_type(fmt: FloatFmt) -> ScalarType {
    match fmt {
        FloatFmt::Single => ScalarType::F32,
        FloatFmt::Double => ScalarType::F64,
    }
}

impl FunctionLowering<'_> {
    pub(super) fn var_of(&self, operand: &Operand) -> Result<Var, BackendError> {
        Var::from_operand(operand)
            .ok_or_else(|| self.malformed(format!("expected a variable, found '{operand}'")))
    }

    pub(super) fn home_of(&self, var: &Var) -> Result<Home, BackendError> {
        self.layout.home(var).cloned()
    }

    /// Declared type of a variable operand, or `fallback` for a constant
    pub(super) fn type_of(&self, operand: &Operand, fallback: ScalarType) -> Result<ScalarType, BackendError> {
        match Var::from_operand(operand) {
            Some(var) => Ok(self.home_of(&var)?.ty),
            None => Ok(fallback),
        }
    }

    fn next_scratch(&mut self) -> Result<Reg, BackendError> {
        let reg = OPERAND_SCRATCH
            .get(self.int_scratch)
            .copied()
            .ok_or(BackendError::OutOfRegisters("scratch"))?;
        self.int_scratch += 1;
        Ok(reg)
    }

    fn next_float_scratch(&mut self) -> Result<FloatPair, BackendError> {
        let pair = FLOAT_OPERAND_SCRATCH
            .get(self.float_scratch)
            .copied()
            .ok_or(BackendError::OutOfRegisters("floating scratch"))?;
        self.float_scratch += 1;
        Ok(pair)
    }

    fn int_constant(&self, operand: &Operand) -> Result<i64, BackendError> {
        operand
            .int_value()
            .ok_or_else(|| self.malformed(format!("'{operand}' is not an integer constant")))
    }

    /// A literal word in a scratch register; zero is `$zero`
    fn word(&mut self, value: i32) -> Result<Reg, BackendError> {
        if value == 0 {
            return Ok(Reg::Zero);
        }
        let reg = self.next_scratch()?;
        self.emit(AsmInst::Li(reg, value));
        Ok(reg)
    }

    /// A register holding `operand` as a 32-bit value of type `ty`
    pub(super) fn int_operand(&mut self, operand: &Operand, ty: ScalarType) -> Result<Reg, BackendError> {
        if operand.is_constant() {
            let value = self.int_constant(operand)?;
            return self.word(narrow_value(value, ty));
        }

        let var = self.var_of(operand)?;
        let home = self.home_of(&var)?;
        if home.aggregate {
            let reg = self.next_scratch()?;
            self.address_into(reg, &home.addr);
            return Ok(reg);
        }
        match OpClass::of(home.ty)?.float_fmt() {
            // 64-bit variables give their low word
            None => self.alloc.load_int(&ValueKey::lo(&var)),
            Some(fmt) => {
                let source = self.alloc.load_float(&ValueKey::lo(&var))?;
                self.emit(AsmInst::Cvt {
                    to: NumFmt::Word,
                    from: fmt.into(),
                    dst: CONVERT_SCRATCH.even,
                    src: source.even,
                });
                let reg = self.next_scratch()?;
                self.emit(AsmInst::Mfc1(reg, CONVERT_SCRATCH.even));
                Ok(reg)
            }
        }
    }

    /// Both words of `operand` as a 64-bit integer
    pub(super) fn long_operand(&mut self, operand: &Operand) -> Result<RegisterPair, BackendError> {
        if operand.is_constant() {
            let value = self.int_constant(operand)?;
            let lo = self.word(value as i32)?;
            let hi = self.word((value >> 32) as i32)?;
            return Ok(RegisterPair::new(lo, hi));
        }

        let var = self.var_of(operand)?;
        let home = self.home_of(&var)?;
        let class = OpClass::of(home.ty)?;
        if let (OpClass::Long { .. }, false) = (class, home.aggregate) {
            let lo = self.alloc.load_int(&ValueKey::lo(&var))?;
            let hi = self.alloc.load_int(&ValueKey::hi(&var))?;
            return Ok(RegisterPair::new(lo, hi));
        }

        let lo = self.int_operand(operand, home.ty)?;
        let signed = !home.aggregate && (home.ty.is_signed() || home.ty.is_float());
        let hi = if signed {
            let hi = self.next_scratch()?;
            self.emit(AsmInst::OpImm(ImmOp::Sra, hi, lo, 31));
            hi
        } else {
            Reg::Zero
        };
        Ok(RegisterPair::new(lo, hi))
    }

    /// A register pair holding `operand` in format `fmt`
    pub(super) fn float_operand(&mut self, operand: &Operand, fmt: FloatFmt) -> Result<FloatPair, BackendError> {
        if operand.is_constant() {
            let pair = self.next_float_scratch()?;
            self.load_float_literal(operand, fmt, pair)?;
            return Ok(pair);
        }

        let var = self.var_of(operand)?;
        let home = self.home_of(&var)?;
        let have = if home.aggregate { None } else { OpClass::of(home.ty)?.float_fmt() };
        match have {
            Some(have) => {
                let source = self.alloc.load_float(&ValueKey::lo(&var))?;
                if have == fmt {
                    return Ok(source);
                }
                let pair = self.next_float_scratch()?;
                self.emit(AsmInst::Cvt {
                    to: fmt.into(),
                    from: have.into(),
                    dst: pair.even,
                    src: source.even,
                });
                Ok(pair)
            }
            None => {
                let word = self.int_operand(operand, home.ty)?;
                let pair = self.next_float_scratch()?;
                self.emit(AsmInst::Mtc1(word, pair.even));
                self.emit(AsmInst::Cvt {
                    to: fmt.into(),
                    from: NumFmt::Word,
                    dst: pair.even,
                    src: pair.even,
                });
                Ok(pair)
            }
        }
    }

    /// Put the bits of a floating constant into `pair`
    pub(super) fn load_float_literal(
        &mut self,
        operand: &Operand,
        fmt: FloatFmt,
        pair: FloatPair,
    ) -> Result<(), BackendError> {
        let words = literal_words(operand, float_type(fmt))
            .ok_or_else(|| self.malformed(format!("'{operand}' is not a numeric constant")))?;
        self.move_words_to_float(&words, pair);
        Ok(())
    }

    pub(super) fn move_words_to_float(&mut self, words: &[i32], pair: FloatPair) {
        for (word, reg) in words.iter().zip([pair.even, pair.odd]) {
            if *word == 0 {
                self.emit(AsmInst::Mtc1(Reg::Zero, reg));
            } else {
                self.emit(AsmInst::Li(WORD_SCRATCH, *word));
                self.emit(AsmInst::Mtc1(WORD_SCRATCH, reg));
            }
        }
    }

    /// Destination variable of a result, which must be a scalar of a
    /// type `accepts` allows
    fn result_var(&self, operand: &Operand, accepts: impl Fn(ScalarType) -> bool) -> Result<Var, BackendError> {
        let var = self.var_of(operand)?;
        let home = self.home_of(&var)?;
        if home.aggregate || !accepts(home.ty) {
            return Err(self.malformed(format!("'{var}' of type {} cannot hold this result", home.ty)));
        }
        Ok(var)
    }

    pub(super) fn int_result(&mut self, operand: &Operand) -> Result<Reg, BackendError> {
        let var = self.result_var(operand, |ty| ty.is_integral() && !ty.is_wide())?;
        self.alloc.result_int(&ValueKey::lo(&var))
    }

    pub(super) fn long_result(&mut self, operand: &Operand) -> Result<RegisterPair, BackendError> {
        let var = self.result_var(operand, |ty| ty.is_wide())?;
        let lo = self.alloc.result_int(&ValueKey::lo(&var))?;
        let hi = self.alloc.result_int(&ValueKey::hi(&var))?;
        Ok(RegisterPair::new(lo, hi))
    }

    pub(super) fn float_result(&mut self, operand: &Operand, fmt: FloatFmt) -> Result<FloatPair, BackendError> {
        let wanted = float_type(fmt);
        let var = self.result_var(operand, |ty| ty == wanted)?;
        self.alloc.result_float(&ValueKey::lo(&var))
    }

    /// Bring a sub-word result back to its canonical register form
    pub(super) fn renormalize(&mut self, reg: Reg, class: OpClass) {
        if let OpClass::Int { bits, signed } = class {
            self.narrow(reg, reg, bits, signed);
        }
    }

    /// `rd` = `rs` truncated to `bits` and extended by signedness
    pub(super) fn narrow(&mut self, rd: Reg, rs: Reg, bits: u8, signed: bool) {
        if bits >= 32 {
            if rd != rs {
                self.emit(AsmInst::Move(rd, rs));
            }
        } else if signed {
            let shift = 32 - i32::from(bits);
            self.emit(AsmInst::OpImm(ImmOp::Sll, rd, rs, shift));
            self.emit(AsmInst::OpImm(ImmOp::Sra, rd, rd, shift));
        } else {
            self.emit(AsmInst::OpImm(ImmOp::Andi, rd, rs, (1 << bits) - 1));
        }
    }

    pub(super) fn address_into(&mut self, rd: Reg, addr: &Addr) {
        let inst = match addr {
            Addr::Frame(offset) => AsmInst::OpImm(ImmOp::Addiu, rd, CallingConvention::FRAME_PTR, *offset),
            Addr::Offset(offset, base) => AsmInst::OpImm(ImmOp::Addiu, rd, *base, *offset),
            Addr::Global(name, 0) => AsmInst::La(rd, name.clone()),
            Addr::Global(name, offset) => AsmInst::La(rd, format!("{name}+{offset}")),
        };
        self.emit(inst);
    }

    /// Coprocessor register zeroed for comparisons against 0.0
    pub(super) fn float_zero(&mut self, fmt: FloatFmt) -> FReg {
        self.emit(AsmInst::Mtc1(Reg::Zero, CONVERT_SCRATCH.even));
        if fmt == FloatFmt::Double {
            self.emit(AsmInst::Mtc1(Reg::Zero, CONVERT_SCRATCH.odd));
        }
        CONVERT_SCRATCH.even
    }
}

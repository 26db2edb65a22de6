//! MIPS ABI Implementation
//!
//! This module fixes the register roles the code generator relies on and the
//! stack frame layout, including prologue/epilogue generation.

use crate::asm::{Addr, AsmInst, FReg, FloatPair, ImmOp, Reg, RegisterPair, Width};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("stack frame too large: {0} bytes")]
    FrameTooLarge(u32),

    #[error("offset {0} does not fit a 16-bit displacement")]
    OffsetOutOfRange(i64),
}

/// Register usage
///
/// - `$t0..$t9`: allocatable integer pool, caller-saved
/// - `$f4/$f5 .. $f18/$f19`: allocatable floating pairs, caller-saved
/// - `$s0..$s7`, `$f20..$f25`: scratch inside one lowered instruction
/// - `$v0/$v1`, `$f0/$f1`: results
/// - `$fp`, `$sp`, `$ra`
pub struct CallingConvention;

impl CallingConvention {
    pub const INT_POOL: [Reg; 10] = [
        Reg::T0, Reg::T1, Reg::T2, Reg::T3, Reg::T4,
        Reg::T5, Reg::T6, Reg::T7, Reg::T8, Reg::T9,
    ];

    pub const FLOAT_POOL: [FloatPair; 6] = [
        FloatPair::new(FReg::F4, FReg::F5),
        FloatPair::new(FReg::F6, FReg::F7),
        FloatPair::new(FReg::F8, FReg::F9),
        FloatPair::new(FReg::F10, FReg::F11),
        FloatPair::new(FReg::F16, FReg::F17),
        FloatPair::new(FReg::F18, FReg::F19),
    ];

    pub const INT_SCRATCH: [Reg; 8] = [
        Reg::S0, Reg::S1, Reg::S2, Reg::S3, Reg::S4, Reg::S5, Reg::S6, Reg::S7,
    ];

    pub const FLOAT_SCRATCH: [FloatPair; 3] = [
        FloatPair::new(FReg::F20, FReg::F21),
        FloatPair::new(FReg::F22, FReg::F23),
        FloatPair::new(FReg::F24, FReg::F25),
    ];

    pub const INT_RESULT: RegisterPair = RegisterPair::new(Reg::V0, Reg::V1);
    pub const FLOAT_RESULT: FloatPair = FloatPair::new(FReg::F0, FReg::F1);

    pub const STACK_PTR: Reg = Reg::Sp;
    pub const FRAME_PTR: Reg = Reg::Fp;
    pub const RETURN_ADDR: Reg = Reg::Ra;

    /// Bytes reserved for saving the integer pool around calls
    pub const INT_SAVE_AREA: u32 = 4 * Self::INT_POOL.len() as u32;
    /// Bytes reserved for saving the floating pool around calls
    pub const FLOAT_SAVE_AREA: u32 = 8 * Self::FLOAT_POOL.len() as u32;
    /// Saved `$fp` and `$ra`
    pub const LINKAGE_AREA: u32 = 8;
}

/// Stack Frame Layout
///
/// The stack grows down and `$fp = $sp` once the prologue has run, so every
/// slot has a non-negative offset from `$fp`:
///
/// ```text
/// [0, L)              locals
/// [L, L+T)            temporaries
/// [L+T, +40)          integer pool save slots
/// [.., +48)           floating pool save slots
/// F-8                 saved $fp
/// F-4                 saved $ra
/// F+k                 incoming argument bytes (pushed by the caller)
/// ```
///
/// `F` is the total size rounded up to 8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bytes of locals
    pub locals_size: u32,
    /// Bytes of temporary homes
    pub temps_size: u32,
    /// Total frame size (computed)
    pub total_size: u32,
}

impl Frame {
    pub fn new(locals_size: u32, temps_size: u32) -> Result<Self, AbiError> {
        let raw = locals_size
            + temps_size
            + CallingConvention::INT_SAVE_AREA
            + CallingConvention::FLOAT_SAVE_AREA
            + CallingConvention::LINKAGE_AREA;
        let total_size = raw.div_ceil(8) * 8;
        if total_size > i16::MAX as u32 {
            return Err(AbiError::FrameTooLarge(total_size));
        }
        Ok(Self {
            locals_size,
            temps_size,
            total_size,
        })
    }

    fn int_save_base(&self) -> i32 {
        (self.locals_size + self.temps_size) as i32
    }

    fn float_save_base(&self) -> i32 {
        self.int_save_base() + CallingConvention::INT_SAVE_AREA as i32
    }

    /// Save slot of the `index`-th integer pool register
    pub fn int_save_slot(&self, index: usize) -> Addr {
        Addr::Frame(self.int_save_base() + 4 * index as i32)
    }

    /// Save slot of the `index`-th floating pool pair (8 bytes)
    pub fn float_save_slot(&self, index: usize) -> Addr {
        Addr::Frame(self.float_save_base() + 8 * index as i32)
    }

    pub fn saved_fp_offset(&self) -> i32 {
        self.total_size as i32 - 8
    }

    pub fn saved_ra_offset(&self) -> i32 {
        self.total_size as i32 - 4
    }

    /// Address of the incoming argument bytes at `offset` inside the
    /// caller's argument area. Frame slots always fit a displacement
    /// (`new` caps the frame); arguments above it may not.
    pub fn param_addr(&self, offset: u32) -> Result<Addr, AbiError> {
        let displacement = check_displacement(i64::from(self.total_size) + i64::from(offset))?;
        Ok(Addr::Frame(displacement))
    }

    /// Generate function prologue
    ///
    /// Allocates the frame, saves `$ra` and the caller's `$fp`, then anchors
    /// `$fp` at the new stack pointer.
    pub fn gen_prologue(&self) -> Vec<AsmInst> {
        let size = self.total_size as i32;
        vec![
            AsmInst::OpImm(ImmOp::Addiu, Reg::Sp, Reg::Sp, -size),
            AsmInst::Store(Width::Word, CallingConvention::RETURN_ADDR, Addr::Offset(self.saved_ra_offset(), Reg::Sp)),
            AsmInst::Store(Width::Word, Reg::Fp, Addr::Offset(self.saved_fp_offset(), Reg::Sp)),
            AsmInst::Move(Reg::Fp, Reg::Sp),
        ]
    }

    /// Generate function epilogue
    pub fn gen_epilogue(&self) -> Vec<AsmInst> {
        let size = self.total_size as i32;
        vec![
            AsmInst::Move(Reg::Sp, Reg::Fp),
            AsmInst::Load(Width::Word, CallingConvention::RETURN_ADDR, Addr::Offset(self.saved_ra_offset(), Reg::Sp)),
            AsmInst::Load(Width::Word, Reg::Fp, Addr::Offset(self.saved_fp_offset(), Reg::Sp)),
            AsmInst::OpImm(ImmOp::Addiu, Reg::Sp, Reg::Sp, size),
            AsmInst::Jr(CallingConvention::RETURN_ADDR),
        ]
    }
}

/// Check that a displacement fits the signed 16-bit immediate field
pub fn check_displacement(offset: i64) -> Result<i32, AbiError> {
    if offset < i16::MIN as i64 || offset > i16::MAX as i64 {
        return Err(AbiError::OffsetOutOfRange(offset));
    }
    Ok(offset as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frame_layout() {
        let frame = Frame::new(12, 8).unwrap();
        // 12 + 8 + 40 + 48 + 8 = 116, rounded to 120
        assert_eq!(frame.total_size, 120);
        assert_eq!(frame.int_save_slot(0), Addr::Frame(20));
        assert_eq!(frame.int_save_slot(9), Addr::Frame(56));
        assert_eq!(frame.float_save_slot(0), Addr::Frame(60));
        assert_eq!(frame.float_save_slot(5), Addr::Frame(100));
        assert_eq!(frame.saved_fp_offset(), 112);
        assert_eq!(frame.saved_ra_offset(), 116);
        assert_eq!(frame.param_addr(4), Ok(Addr::Frame(124)));
    }

    #[test]
    fn test_empty_frame_keeps_linkage() {
        let frame = Frame::new(0, 0).unwrap();
        assert_eq!(frame.total_size, 96);
    }

    #[test]
    fn test_prologue_and_epilogue() {
        let frame = Frame::new(0, 0).unwrap();
        let prologue: Vec<String> = frame.gen_prologue().iter().map(|i| i.to_string()).collect();
        assert_eq!(
            prologue,
            vec![
                "addiu $sp, $sp, -96",
                "sw $ra, 92($sp)",
                "sw $fp, 88($sp)",
                "move $fp, $sp",
            ]
        );
        let epilogue: Vec<String> = frame.gen_epilogue().iter().map(|i| i.to_string()).collect();
        assert_eq!(
            epilogue,
            vec![
                "move $sp, $fp",
                "lw $ra, 92($sp)",
                "lw $fp, 88($sp)",
                "addiu $sp, $sp, 96",
                "jr $ra",
            ]
        );
    }

    #[test]
    fn test_argument_beyond_displacement_range() {
        let frame = Frame::new(32_600, 0).unwrap();
        assert_eq!(frame.total_size, 32_696);
        assert_eq!(frame.param_addr(64), Ok(Addr::Frame(32_760)));
        assert_eq!(frame.param_addr(72), Err(AbiError::OffsetOutOfRange(32_768)));
    }

    #[test]
    fn test_oversized_frame() {
        assert_eq!(Frame::new(40_000, 0), Err(AbiError::FrameTooLarge(40_096)));
        assert!(check_displacement(70_000).is_err());
        assert_eq!(check_displacement(-8), Ok(-8));
    }
}

//! MIPS C Compiler - Code Generation Target
//!
//! This crate holds everything about the MIPS32 target that does not depend
//! on the IR:
//!
//! - Register model and assembly instruction records
//! - ABI: register roles, stack frame layout, prologue/epilogue
//! - Data section directives
//! - The assembly printer and the runtime support block

pub mod abi;
pub mod asm;
pub mod data;
pub mod emit;
pub mod runtime;

pub use abi::{AbiError, CallingConvention, Frame};
pub use asm::{
    Addr, AsmInst, BranchOp, FReg, FloatCond, FloatFmt, FloatOp, FloatPair, ImmOp, IntOp, NumFmt, Reg,
    RegisterPair, Width,
};
pub use data::{DataItem, Directive};
pub use emit::{emit_instructions, emit_program, AsmProgram, EmitError};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_code_generation() {
        let frame = Frame::new(4, 0).unwrap();
        let mut text = vec![AsmInst::Label("main".to_string())];
        text.extend(frame.gen_prologue());
        text.push(AsmInst::Li(Reg::T0, 42));
        text.push(AsmInst::Store(Width::Word, Reg::T0, Addr::Frame(0)));
        text.extend(frame.gen_epilogue());

        let asm = emit_program(&AsmProgram::new(Vec::new(), text)).unwrap();
        assert!(asm.contains("\tli $t0, 42\n"));
        assert!(asm.contains("\tsw $t0, 0($fp)\n"));
        assert_eq!(asm.matches("jr $ra").count(), 2);
    }
}

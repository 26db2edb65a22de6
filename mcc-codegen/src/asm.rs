//! MIPS32 Assembly Instruction Definitions
//!
//! This module defines the register model and the instruction records the
//! back end emits. Every record prints in canonical assembler syntax.

use mcc_common::ScalarType;
use std::fmt;

/// MIPS integer registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reg {
    Zero,
    V0, V1,
    A0, A1, A2, A3,
    T0, T1, T2, T3, T4, T5, T6, T7, T8, T9,
    S0, S1, S2, S3, S4, S5, S6, S7,
    Gp,
    Sp,
    Fp,
    Ra,
}

impl Reg {
    pub fn name(&self) -> &'static str {
        match self {
            Reg::Zero => "$zero",
            Reg::V0 => "$v0",
            Reg::V1 => "$v1",
            Reg::A0 => "$a0",
            Reg::A1 => "$a1",
            Reg::A2 => "$a2",
            Reg::A3 => "$a3",
            Reg::T0 => "$t0",
            Reg::T1 => "$t1",
            Reg::T2 => "$t2",
            Reg::T3 => "$t3",
            Reg::T4 => "$t4",
            Reg::T5 => "$t5",
            Reg::T6 => "$t6",
            Reg::T7 => "$t7",
            Reg::T8 => "$t8",
            Reg::T9 => "$t9",
            Reg::S0 => "$s0",
            Reg::S1 => "$s1",
            Reg::S2 => "$s2",
            Reg::S3 => "$s3",
            Reg::S4 => "$s4",
            Reg::S5 => "$s5",
            Reg::S6 => "$s6",
            Reg::S7 => "$s7",
            Reg::Gp => "$gp",
            Reg::Sp => "$sp",
            Reg::Fp => "$fp",
            Reg::Ra => "$ra",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coprocessor 1 (floating point) registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FReg {
    F0, F1, F2, F3, F4, F5, F6, F7,
    F8, F9, F10, F11, F12, F13, F14, F15,
    F16, F17, F18, F19, F20, F21, F22, F23,
    F24, F25, F26, F27, F28, F29, F30, F31,
}

impl fmt::Display for FReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$f{}", *self as u8)
    }
}

/// Two integer registers holding a 64-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterPair {
    pub lo: Reg,
    pub hi: Reg,
}

impl RegisterPair {
    pub const fn new(lo: Reg, hi: Reg) -> Self {
        Self { lo, hi }
    }
}

/// Even/odd floating register pair. A single lives in `even`; a double
/// spans both with the low word in `even`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FloatPair {
    pub even: FReg,
    pub odd: FReg,
}

impl FloatPair {
    pub const fn new(even: FReg, odd: FReg) -> Self {
        Self { even, odd }
    }
}

impl fmt::Display for FloatPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.even)
    }
}

/// Width of an integer memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    ByteUnsigned,
    Half,
    HalfUnsigned,
    Word,
}

impl Width {
    /// Access width for one word (or less) of a value of type `ty`
    pub fn of(ty: ScalarType) -> Self {
        match ty {
            ScalarType::I8 => Width::Byte,
            ScalarType::U8 => Width::ByteUnsigned,
            ScalarType::I16 => Width::Half,
            ScalarType::U16 => Width::HalfUnsigned,
            _ => Width::Word,
        }
    }

    pub fn load_mnemonic(&self) -> &'static str {
        match self {
            Width::Byte => "lb",
            Width::ByteUnsigned => "lbu",
            Width::Half => "lh",
            Width::HalfUnsigned => "lhu",
            Width::Word => "lw",
        }
    }

    pub fn store_mnemonic(&self) -> &'static str {
        match self {
            Width::Byte | Width::ByteUnsigned => "sb",
            Width::Half | Width::HalfUnsigned => "sh",
            Width::Word => "sw",
        }
    }
}

/// Memory operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Addr {
    /// `off($fp)`
    Frame(i32),
    /// `off(reg)`
    Offset(i32, Reg),
    /// `label` or `label+off`
    Global(String, i32),
}

impl Addr {
    /// The same location `bytes` further on
    pub fn offset_by(&self, bytes: i32) -> Addr {
        match self {
            Addr::Frame(off) => Addr::Frame(off + bytes),
            Addr::Offset(off, reg) => Addr::Offset(off + bytes, *reg),
            Addr::Global(name, off) => Addr::Global(name.clone(), off + bytes),
        }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Addr::Frame(off) => write!(f, "{off}($fp)"),
            Addr::Offset(off, reg) => write!(f, "{off}({reg})"),
            Addr::Global(name, 0) => write!(f, "{name}"),
            Addr::Global(name, off) => write!(f, "{name}+{off}"),
        }
    }
}

/// Three-register integer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntOp {
    Addu,
    Subu,
    Mul,
    Div,
    Divu,
    Rem,
    Remu,
    And,
    Or,
    Xor,
    Sllv,
    Srlv,
    Srav,
    Slt,
    Sltu,
    Sgt,
    Sgtu,
    Sle,
    Sleu,
    Sge,
    Sgeu,
    Seq,
    Sne,
}

impl IntOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            IntOp::Addu => "addu",
            IntOp::Subu => "subu",
            IntOp::Mul => "mul",
            IntOp::Div => "div",
            IntOp::Divu => "divu",
            IntOp::Rem => "rem",
            IntOp::Remu => "remu",
            IntOp::And => "and",
            IntOp::Or => "or",
            IntOp::Xor => "xor",
            IntOp::Sllv => "sllv",
            IntOp::Srlv => "srlv",
            IntOp::Srav => "srav",
            IntOp::Slt => "slt",
            IntOp::Sltu => "sltu",
            IntOp::Sgt => "sgt",
            IntOp::Sgtu => "sgtu",
            IntOp::Sle => "sle",
            IntOp::Sleu => "sleu",
            IntOp::Sge => "sge",
            IntOp::Sgeu => "sgeu",
            IntOp::Seq => "seq",
            IntOp::Sne => "sne",
        }
    }
}

/// Register-immediate integer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImmOp {
    Addiu,
    Andi,
    Xori,
    Sll,
    Srl,
    Sra,
    Sltiu,
}

impl ImmOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ImmOp::Addiu => "addiu",
            ImmOp::Andi => "andi",
            ImmOp::Xori => "xori",
            ImmOp::Sll => "sll",
            ImmOp::Srl => "srl",
            ImmOp::Sra => "sra",
            ImmOp::Sltiu => "sltiu",
        }
    }
}

/// Compare-and-branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchOp {
    Beq,
    Bne,
    Blt,
    Ble,
    Bgt,
    Bge,
    Bltu,
    Bleu,
    Bgtu,
    Bgeu,
}

impl BranchOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            BranchOp::Beq => "beq",
            BranchOp::Bne => "bne",
            BranchOp::Blt => "blt",
            BranchOp::Ble => "ble",
            BranchOp::Bgt => "bgt",
            BranchOp::Bge => "bge",
            BranchOp::Bltu => "bltu",
            BranchOp::Bleu => "bleu",
            BranchOp::Bgtu => "bgtu",
            BranchOp::Bgeu => "bgeu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatFmt {
    Single,
    Double,
}

impl FloatFmt {
    pub fn suffix(&self) -> &'static str {
        match self {
            FloatFmt::Single => "s",
            FloatFmt::Double => "d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl FloatOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            FloatOp::Add => "add",
            FloatOp::Sub => "sub",
            FloatOp::Mul => "mul",
            FloatOp::Div => "div",
        }
    }
}

/// Conditions settable by `c.cond.fmt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatCond {
    Eq,
    Lt,
    Le,
}

impl FloatCond {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            FloatCond::Eq => "eq",
            FloatCond::Lt => "lt",
            FloatCond::Le => "le",
        }
    }
}

/// Number formats of `cvt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumFmt {
    Word,
    Single,
    Double,
}

impl NumFmt {
    pub fn suffix(&self) -> &'static str {
        match self {
            NumFmt::Word => "w",
            NumFmt::Single => "s",
            NumFmt::Double => "d",
        }
    }
}

impl From<FloatFmt> for NumFmt {
    fn from(fmt: FloatFmt) -> Self {
        match fmt {
            FloatFmt::Single => NumFmt::Single,
            FloatFmt::Double => NumFmt::Double,
        }
    }
}

/// MIPS32 assembly instructions
///
/// Real instructions and the assembler pseudo-instructions the back end
/// relies on (`li`, `la`, `move`, the three-register compares, the
/// two-register branches).
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    // Integer arithmetic and logic
    Op(IntOp, Reg, Reg, Reg),       // rd = rs op rt
    OpImm(ImmOp, Reg, Reg, i32),    // rt = rs op imm
    Negu(Reg, Reg),
    Not(Reg, Reg),
    Multu(Reg, Reg),                // hi:lo = rs * rt (unsigned)
    Mfhi(Reg),
    Mflo(Reg),

    // Moves and constants
    Li(Reg, i32),
    La(Reg, String),
    Move(Reg, Reg),

    // Memory
    Load(Width, Reg, Addr),
    Store(Width, Reg, Addr),
    LoadFloat(FReg, Addr),          // lwc1
    StoreFloat(FReg, Addr),         // swc1

    // Control flow
    Branch(BranchOp, Reg, Reg, String),
    J(String),
    Jal(String),
    Jr(Reg),
    Syscall,

    // Floating point
    FloatOp(FloatOp, FloatFmt, FReg, FReg, FReg),
    FNeg(FloatFmt, FReg, FReg),
    FMov(FloatFmt, FReg, FReg),
    FCompare(FloatCond, FloatFmt, FReg, FReg),
    Bc1t(String),
    Bc1f(String),
    Cvt { to: NumFmt, from: NumFmt, dst: FReg, src: FReg },
    Mtc1(Reg, FReg),
    Mfc1(Reg, FReg),

    // Assembly pseudo-instructions
    Label(String),
    Comment(String),
}

impl AsmInst {
    /// Label this instruction may transfer control to
    pub fn branch_target(&self) -> Option<&str> {
        match self {
            AsmInst::Branch(_, _, _, label)
            | AsmInst::J(label)
            | AsmInst::Jal(label)
            | AsmInst::Bc1t(label)
            | AsmInst::Bc1f(label) => Some(label),
            _ => None,
        }
    }
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::Op(op, rd, rs, rt) => write!(f, "{} {}, {}, {}", op.mnemonic(), rd, rs, rt),
            AsmInst::OpImm(op, rt, rs, imm) => write!(f, "{} {}, {}, {}", op.mnemonic(), rt, rs, imm),
            AsmInst::Negu(rd, rs) => write!(f, "negu {}, {}", rd, rs),
            AsmInst::Not(rd, rs) => write!(f, "not {}, {}", rd, rs),
            AsmInst::Multu(rs, rt) => write!(f, "multu {}, {}", rs, rt),
            AsmInst::Mfhi(rd) => write!(f, "mfhi {}", rd),
            AsmInst::Mflo(rd) => write!(f, "mflo {}", rd),

            AsmInst::Li(rd, imm) => write!(f, "li {}, {}", rd, imm),
            AsmInst::La(rd, label) => write!(f, "la {}, {}", rd, label),
            AsmInst::Move(rd, rs) => write!(f, "move {}, {}", rd, rs),

            AsmInst::Load(width, rt, addr) => write!(f, "{} {}, {}", width.load_mnemonic(), rt, addr),
            AsmInst::Store(width, rt, addr) => write!(f, "{} {}, {}", width.store_mnemonic(), rt, addr),
            AsmInst::LoadFloat(ft, addr) => write!(f, "lwc1 {}, {}", ft, addr),
            AsmInst::StoreFloat(ft, addr) => write!(f, "swc1 {}, {}", ft, addr),

            AsmInst::Branch(op, rs, rt, label) => write!(f, "{} {}, {}, {}", op.mnemonic(), rs, rt, label),
            AsmInst::J(label) => write!(f, "j {}", label),
            AsmInst::Jal(label) => write!(f, "jal {}", label),
            AsmInst::Jr(rs) => write!(f, "jr {}", rs),
            AsmInst::Syscall => write!(f, "syscall"),

            AsmInst::FloatOp(op, fmt, fd, fs, ft) => {
                write!(f, "{}.{} {}, {}, {}", op.mnemonic(), fmt.suffix(), fd, fs, ft)
            }
            AsmInst::FNeg(fmt, fd, fs) => write!(f, "neg.{} {}, {}", fmt.suffix(), fd, fs),
            AsmInst::FMov(fmt, fd, fs) => write!(f, "mov.{} {}, {}", fmt.suffix(), fd, fs),
            AsmInst::FCompare(cond, fmt, fs, ft) => {
                write!(f, "c.{}.{} {}, {}", cond.mnemonic(), fmt.suffix(), fs, ft)
            }
            AsmInst::Bc1t(label) => write!(f, "bc1t {}", label),
            AsmInst::Bc1f(label) => write!(f, "bc1f {}", label),
            AsmInst::Cvt { to, from, dst, src } => {
                write!(f, "cvt.{}.{} {}, {}", to.suffix(), from.suffix(), dst, src)
            }
            AsmInst::Mtc1(rt, fs) => write!(f, "mtc1 {}, {}", rt, fs),
            AsmInst::Mfc1(rt, fs) => write!(f, "mfc1 {}, {}", rt, fs),

            AsmInst::Label(label) => write!(f, "{}:", label),
            AsmInst::Comment(text) => write!(f, "# {}", text),
        }
    }
}

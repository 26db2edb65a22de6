//! Instruction selection table
//!
//! Binary operators are looked up by (operator, width class). The lowering
//! code only interprets the selected template; it never switches on the
//! operand width itself.

use crate::error::BackendError;
use mcc_codegen::{BranchOp, FloatCond, FloatFmt, FloatOp, IntOp};
use mcc_common::ScalarType;
use mcc_ir::{Operator, Relation};

/// Width class of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// 8, 16 or 32-bit integers and pointers
    Int { bits: u8, signed: bool },
    /// 64-bit integers in a register pair
    Long { signed: bool },
    Single,
    Double,
}

impl OpClass {
    pub fn of(ty: ScalarType) -> Result<Self, BackendError> {
        let class = match ty {
            ScalarType::I8 => OpClass::Int { bits: 8, signed: true },
            ScalarType::U8 => OpClass::Int { bits: 8, signed: false },
            ScalarType::I16 => OpClass::Int { bits: 16, signed: true },
            ScalarType::U16 => OpClass::Int { bits: 16, signed: false },
            ScalarType::I32 => OpClass::Int { bits: 32, signed: true },
            ScalarType::U32 | ScalarType::Ptr => OpClass::Int { bits: 32, signed: false },
            ScalarType::I64 => OpClass::Long { signed: true },
            ScalarType::U64 => OpClass::Long { signed: false },
            ScalarType::F32 => OpClass::Single,
            ScalarType::F64 => OpClass::Double,
            ScalarType::Void => {
                return Err(BackendError::Unsupported("operation on a void value".to_string()))
            }
        };
        Ok(class)
    }

    pub fn float_fmt(&self) -> Option<FloatFmt> {
        match self {
            OpClass::Single => Some(FloatFmt::Single),
            OpClass::Double => Some(FloatFmt::Double),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

/// Code template for a binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// One three-register instruction; sub-word results are renormalized
    Int(IntOp),
    /// A set-on-condition instruction producing 0 or 1
    IntCompare(IntOp),
    Long(LongOp),
    LongCompare(Relation),
    Float(FloatOp, FloatFmt),
    /// `c.cond` on the operands (exchanged when `swap`), true when the flag
    /// is set, or clear when `negate`
    FloatCompare {
        cond: FloatCond,
        fmt: FloatFmt,
        swap: bool,
        negate: bool,
    },
}

pub fn select(op: Operator, class: OpClass) -> Result<Template, BackendError> {
    let unsupported = || BackendError::Unsupported(format!("{op:?} on {class:?} operands"));

    let template = match class {
        OpClass::Int { signed, .. } => match op {
            Operator::Add => Template::Int(IntOp::Addu),
            Operator::Sub => Template::Int(IntOp::Subu),
            Operator::Mul => Template::Int(IntOp::Mul),
            Operator::Div => Template::Int(if signed { IntOp::Div } else { IntOp::Divu }),
            Operator::Mod => Template::Int(if signed { IntOp::Rem } else { IntOp::Remu }),
            Operator::BitAnd => Template::Int(IntOp::And),
            Operator::BitOr => Template::Int(IntOp::Or),
            Operator::BitXor => Template::Int(IntOp::Xor),
            Operator::Shl => Template::Int(IntOp::Sllv),
            Operator::Shr => Template::Int(if signed { IntOp::Srav } else { IntOp::Srlv }),
            Operator::Cmp(relation) => Template::IntCompare(set_on(relation, signed)),
            _ => return Err(unsupported()),
        },
        OpClass::Long { .. } => match op {
            Operator::Add => Template::Long(LongOp::Add),
            Operator::Sub => Template::Long(LongOp::Sub),
            Operator::Mul => Template::Long(LongOp::Mul),
            Operator::Div => Template::Long(LongOp::Div),
            Operator::Mod => Template::Long(LongOp::Rem),
            Operator::BitAnd => Template::Long(LongOp::And),
            Operator::BitOr => Template::Long(LongOp::Or),
            Operator::BitXor => Template::Long(LongOp::Xor),
            Operator::Shl => Template::Long(LongOp::Shl),
            Operator::Shr => Template::Long(LongOp::Shr),
            Operator::Cmp(relation) => Template::LongCompare(relation),
            _ => return Err(unsupported()),
        },
        OpClass::Single | OpClass::Double => {
            let fmt = class.float_fmt().ok_or_else(unsupported)?;
            match op {
                Operator::Add => Template::Float(FloatOp::Add, fmt),
                Operator::Sub => Template::Float(FloatOp::Sub, fmt),
                Operator::Mul => Template::Float(FloatOp::Mul, fmt),
                Operator::Div => Template::Float(FloatOp::Div, fmt),
                Operator::Cmp(relation) => {
                    let (cond, swap, negate) = float_condition(relation);
                    Template::FloatCompare {
                        cond,
                        fmt,
                        swap,
                        negate,
                    }
                }
                _ => return Err(unsupported()),
            }
        }
    };
    Ok(template)
}

/// Set-on-condition instruction for a 32-bit comparison
pub fn set_on(relation: Relation, signed: bool) -> IntOp {
    match (relation, signed) {
        (Relation::Lt, true) => IntOp::Slt,
        (Relation::Lt, false) => IntOp::Sltu,
        (Relation::Gt, true) => IntOp::Sgt,
        (Relation::Gt, false) => IntOp::Sgtu,
        (Relation::Le, true) => IntOp::Sle,
        (Relation::Le, false) => IntOp::Sleu,
        (Relation::Ge, true) => IntOp::Sge,
        (Relation::Ge, false) => IntOp::Sgeu,
        (Relation::Eq, _) => IntOp::Seq,
        (Relation::Ne, _) => IntOp::Sne,
    }
}

/// Compare-and-branch for a 32-bit condition
pub fn branch_on(relation: Relation, signed: bool) -> BranchOp {
    match (relation, signed) {
        (Relation::Lt, true) => BranchOp::Blt,
        (Relation::Lt, false) => BranchOp::Bltu,
        (Relation::Le, true) => BranchOp::Ble,
        (Relation::Le, false) => BranchOp::Bleu,
        (Relation::Gt, true) => BranchOp::Bgt,
        (Relation::Gt, false) => BranchOp::Bgtu,
        (Relation::Ge, true) => BranchOp::Bge,
        (Relation::Ge, false) => BranchOp::Bgeu,
        (Relation::Eq, _) => BranchOp::Beq,
        (Relation::Ne, _) => BranchOp::Bne,
    }
}

/// `c.cond` only tests eq/lt/le: greater-than swaps the operands, not-equal
/// branches on a clear flag
pub fn float_condition(relation: Relation) -> (FloatCond, bool, bool) {
    match relation {
        Relation::Eq => (FloatCond::Eq, false, false),
        Relation::Ne => (FloatCond::Eq, false, true),
        Relation::Lt => (FloatCond::Lt, false, false),
        Relation::Le => (FloatCond::Le, false, false),
        Relation::Gt | Relation::Ge => {
            let (cond, _, _) = float_condition(relation.swap());
            (cond, true, false)
        }
    }
}

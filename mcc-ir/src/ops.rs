//! TAC Operators
//!
//! The operator set is closed; the back end's template table is keyed on it.

use mcc_common::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relational operators, shared by value comparisons and conditional jumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Relation {
    /// The relation that holds exactly when `self` does not
    pub fn negate(self) -> Self {
        match self {
            Relation::Lt => Relation::Ge,
            Relation::Le => Relation::Gt,
            Relation::Gt => Relation::Le,
            Relation::Ge => Relation::Lt,
            Relation::Eq => Relation::Ne,
            Relation::Ne => Relation::Eq,
        }
    }

    /// The relation with its operands exchanged (`a < b` == `b > a`)
    pub fn swap(self) -> Self {
        match self {
            Relation::Lt => Relation::Gt,
            Relation::Le => Relation::Ge,
            Relation::Gt => Relation::Lt,
            Relation::Ge => Relation::Le,
            Relation::Eq | Relation::Ne => self,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
            Relation::Eq => "==",
            Relation::Ne => "!=",
        };
        write!(f, "{symbol}")
    }
}

/// Operator of a plain quadruple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Assign,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,

    /// Value-producing comparison; the result is an `int` 0 or 1
    Cmp(Relation),
    LogicalNot,

    /// Conversion from the carried source type to the quad's type
    Cast(ScalarType),

    // Memory
    AddrOf,
    Deref,
    StoreDeref,

    // Calls
    Param,
    Call,
    Return,

    // Function markers
    FuncBegin,
    FuncEnd,

    Nop,
}

impl Operator {
    /// Infix spelling of binary operators
    pub fn infix(&self) -> Option<&'static str> {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::Shl => "<<",
            Operator::Shr => ">>",
            _ => return None,
        };
        Some(symbol)
    }

    pub fn is_binary(&self) -> bool {
        self.infix().is_some() || matches!(self, Operator::Cmp(_))
    }
}

//! TAC Instructions
//!
//! Three shapes: a plain quadruple, an unconditional jump and a conditional
//! jump. Jumps carry their target separately from the quadruple so a pending
//! target can never be confused with an operand.

use crate::operand::Operand;
use crate::ops::{Operator, Relation};
use mcc_common::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an instruction, issued once by the builder
pub type InstrId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpTarget {
    Pending,
    Resolved(InstrId),
}

impl JumpTarget {
    pub fn resolved(&self) -> Option<InstrId> {
        match self {
            JumpTarget::Resolved(id) => Some(*id),
            JumpTarget::Pending => None,
        }
    }
}

impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpTarget::Pending => write!(f, "_"),
            JumpTarget::Resolved(id) => write!(f, "{id}"),
        }
    }
}

/// `result = arg1 op arg2` with the operation's type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quad {
    pub op: Operator,
    pub ty: ScalarType,
    pub result: Operand,
    pub arg1: Operand,
    pub arg2: Operand,
}

impl Quad {
    pub fn new(op: Operator, ty: ScalarType, result: Operand, arg1: Operand, arg2: Operand) -> Self {
        Self { op, ty, result, arg1, arg2 }
    }

    /// Type of the value written to `result`
    pub fn result_type(&self) -> ScalarType {
        match self.op {
            Operator::Cmp(_) | Operator::LogicalNot => ScalarType::I32,
            Operator::AddrOf => ScalarType::Ptr,
            _ => self.ty,
        }
    }
}

/// Branch condition `lhs relation rhs`, compared at type `ty`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub relation: Relation,
    pub ty: ScalarType,
    pub lhs: Operand,
    pub rhs: Operand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrKind {
    Plain(Quad),
    Jump { target: JumpTarget },
    CondJump { cond: Condition, target: JumpTarget },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: InstrId,
    pub kind: InstrKind,
}

impl Instruction {
    pub fn target(&self) -> Option<JumpTarget> {
        match &self.kind {
            InstrKind::Jump { target } | InstrKind::CondJump { target, .. } => Some(*target),
            InstrKind::Plain(_) => None,
        }
    }

    pub fn is_unconditional_jump(&self) -> bool {
        matches!(self.kind, InstrKind::Jump { .. })
    }

    pub fn quad(&self) -> Option<&Quad> {
        match &self.kind {
            InstrKind::Plain(quad) => Some(quad),
            _ => None,
        }
    }

    /// Operator of a plain instruction
    pub fn op(&self) -> Option<Operator> {
        self.quad().map(|q| q.op)
    }

    /// Name carried by a `FuncBegin`
    pub fn function_begin(&self) -> Option<&str> {
        match self.quad() {
            Some(Quad { op: Operator::FuncBegin, arg1: Operand::Label(name), .. }) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Quad { op, ty, result, arg1, arg2 } = self;
        match op {
            Operator::Assign => write!(f, "{result} = {arg1}"),
            Operator::Cmp(rel) => write!(f, "{result} = {arg1} {rel} {arg2}"),
            Operator::Neg => write!(f, "{result} = -{arg1}"),
            Operator::BitNot => write!(f, "{result} = ~{arg1}"),
            Operator::LogicalNot => write!(f, "{result} = !{arg1}"),
            Operator::Cast(from) => write!(f, "{result} = ({ty}) {arg1} [from {from}]"),
            Operator::AddrOf => write!(f, "{result} = &{arg1}"),
            Operator::Deref => write!(f, "{result} = *{arg1}"),
            Operator::StoreDeref => write!(f, "*{result} = {arg1}"),
            Operator::Param => write!(f, "param {arg1}"),
            Operator::Call if result.is_empty() => write!(f, "call {arg1}, {arg2}"),
            Operator::Call => write!(f, "{result} = call {arg1}, {arg2}"),
            Operator::Return if arg1.is_empty() => write!(f, "return"),
            Operator::Return => write!(f, "return {arg1}"),
            Operator::FuncBegin => write!(f, "begin {arg1}"),
            Operator::FuncEnd => write!(f, "end {arg1}"),
            Operator::Nop => write!(f, "nop"),
            binary => {
                let symbol = binary.infix().unwrap_or("?");
                write!(f, "{result} = {arg1} {symbol} {arg2}")
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InstrKind::Plain(quad) => write!(f, "{quad}"),
            InstrKind::Jump { target } => write!(f, "goto {target}"),
            InstrKind::CondJump { cond, target } => write!(
                f,
                "if {} {} {} goto {}",
                cond.lhs, cond.relation, cond.rhs, target
            ),
        }
    }
}

//! TAC Builder
//!
//! Owns every instruction created during translation. Positions are issued
//! in creation order and never reused; the final program order is chosen
//! later by the statement translator, which is why the builder is an arena
//! rather than an append-only stream.

use crate::error::IrError;
use crate::instructions::{Condition, InstrId, InstrKind, Instruction, JumpTarget, Quad};
use crate::operand::Operand;
use crate::ops::Operator;
use crate::patch::PatchList;
use crate::program::TacProgram;
use log::trace;
use mcc_common::{ScalarType, TempGenerator};
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct TacBuilder {
    instructions: Vec<Instruction>,
    temps: TempGenerator,
}

impl TacBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_temp(&mut self) -> Operand {
        Operand::Temp(self.temps.new_temp())
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn emit(&mut self, kind: InstrKind) -> InstrId {
        let id = self.instructions.len() as InstrId;
        self.instructions.push(Instruction { id, kind });
        id
    }

    pub fn emit_quad(
        &mut self,
        op: Operator,
        ty: ScalarType,
        result: Operand,
        arg1: Operand,
        arg2: Operand,
    ) -> InstrId {
        self.emit(InstrKind::Plain(Quad::new(op, ty, result, arg1, arg2)))
    }

    /// Unconditional jump with a pending target
    pub fn emit_jump(&mut self) -> InstrId {
        self.emit(InstrKind::Jump {
            target: JumpTarget::Pending,
        })
    }

    /// Conditional jump with a pending target
    pub fn emit_cond_jump(&mut self, cond: Condition) -> InstrId {
        self.emit(InstrKind::CondJump {
            cond,
            target: JumpTarget::Pending,
        })
    }

    pub fn emit_nop(&mut self) -> InstrId {
        self.emit_quad(
            Operator::Nop,
            ScalarType::Void,
            Operand::Empty,
            Operand::Empty,
            Operand::Empty,
        )
    }

    pub fn get(&self, id: InstrId) -> Option<&Instruction> {
        self.instructions.get(id as usize)
    }

    /// Point every jump in `list` at `target`.
    ///
    /// Resolving a jump a second time to the same position is a no-op;
    /// resolving it to a different position is an error.
    pub fn backpatch(&mut self, list: &PatchList, target: InstrId) -> Result<(), IrError> {
        if target as usize >= self.instructions.len() {
            return Err(IrError::UnknownInstruction(target));
        }

        for id in list.iter() {
            let instruction = self
                .instructions
                .get_mut(id as usize)
                .ok_or(IrError::UnknownInstruction(id))?;

            let slot = match &mut instruction.kind {
                InstrKind::Jump { target: slot } | InstrKind::CondJump { target: slot, .. } => slot,
                InstrKind::Plain(_) => return Err(IrError::NotAJump(id)),
            };

            match *slot {
                JumpTarget::Resolved(current) if current != target => {
                    return Err(IrError::Retarget {
                        id,
                        current,
                        requested: target,
                    });
                }
                _ => {
                    trace!("backpatch {id} -> {target}");
                    *slot = JumpTarget::Resolved(target);
                }
            }
        }
        Ok(())
    }

    /// Assemble the program from positions in final order
    pub fn build(&self, order: &[InstrId]) -> Result<TacProgram, IrError> {
        let mut seen = BTreeSet::new();
        let mut instructions = Vec::with_capacity(order.len());
        for &id in order {
            if !seen.insert(id) {
                return Err(IrError::DuplicateInstruction(id));
            }
            let instruction = self.get(id).ok_or(IrError::UnknownInstruction(id))?;
            instructions.push(instruction.clone());
        }
        Ok(TacProgram::new(instructions))
    }
}

//! The finished instruction stream

use crate::instructions::{InstrId, Instruction, JumpTarget};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Instructions in final order. Ids are not positions: the translator
/// lays code out independently of the order it was issued in, so an id to
/// position index is kept alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProgramRepr", into = "ProgramRepr")]
pub struct TacProgram {
    instructions: Vec<Instruction>,
    positions: BTreeMap<InstrId, usize>,
}

#[derive(Serialize, Deserialize)]
struct ProgramRepr {
    instructions: Vec<Instruction>,
}

impl From<ProgramRepr> for TacProgram {
    fn from(repr: ProgramRepr) -> Self {
        TacProgram::new(repr.instructions)
    }
}

impl From<TacProgram> for ProgramRepr {
    fn from(program: TacProgram) -> Self {
        ProgramRepr {
            instructions: program.instructions,
        }
    }
}

impl TacProgram {
    /// A repeated id resolves to its first position
    pub fn new(instructions: Vec<Instruction>) -> Self {
        let mut positions = BTreeMap::new();
        for (position, instruction) in instructions.iter().enumerate() {
            positions.entry(instruction.id).or_insert(position);
        }
        Self {
            instructions,
            positions,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Index in the stream of the instruction with the given id
    pub fn position_of(&self, id: InstrId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn get(&self, id: InstrId) -> Option<&Instruction> {
        self.position_of(id).and_then(|position| self.instructions.get(position))
    }

    /// Jumps whose target was never backpatched
    pub fn unresolved(&self) -> Vec<InstrId> {
        self.instructions
            .iter()
            .filter(|i| i.target() == Some(JumpTarget::Pending))
            .map(|i| i.id)
            .collect()
    }
}

impl fmt::Display for TacProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{:>4}: {}", instruction.id, instruction)?;
        }
        Ok(())
    }
}

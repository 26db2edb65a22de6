//! Leader detection and block labels
//!
//! A position starts a basic block when it is the first instruction, a jump
//! target, a function entry, or the instruction right after an
//! unconditional jump. Function entries are labeled with the function name,
//! every other leader with a fresh `_L{n}`.

use crate::error::BackendError;
use log::debug;
use mcc_common::LabelGenerator;
use mcc_ir::{InstrId, JumpTarget, TacProgram};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockLabels {
    by_position: BTreeMap<usize, String>,
    by_id: BTreeMap<InstrId, String>,
}

impl BlockLabels {
    /// Label of the block starting at `position`, if it starts one
    pub fn label_at(&self, position: usize) -> Option<&str> {
        self.by_position.get(&position).map(String::as_str)
    }

    /// Label of the block a jump to `id` lands on
    pub fn label_of(&self, id: InstrId) -> Result<&str, BackendError> {
        self.by_id
            .get(&id)
            .map(String::as_str)
            .ok_or_else(|| BackendError::malformed(id, "jump target does not start a block"))
    }

    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    /// Leader positions in ascending order
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_position.keys().copied()
    }
}

pub fn label_blocks(program: &TacProgram) -> Result<BlockLabels, BackendError> {
    let mut leaders = BTreeSet::new();
    if !program.is_empty() {
        leaders.insert(0);
    }

    for (position, instruction) in program.iter().enumerate() {
        if instruction.function_begin().is_some() {
            leaders.insert(position);
        }
        match instruction.target() {
            Some(JumpTarget::Resolved(target)) => {
                let landing = program.position_of(target).ok_or_else(|| {
                    BackendError::malformed(
                        instruction.id,
                        format!("jump to instruction {target}, which is not in the program"),
                    )
                })?;
                leaders.insert(landing);
            }
            Some(JumpTarget::Pending) => return Err(BackendError::UnresolvedJump(instruction.id)),
            None => {}
        }
        if instruction.is_unconditional_jump() && position + 1 < program.len() {
            leaders.insert(position + 1);
        }
    }

    let mut generator = LabelGenerator::new("_L");
    let mut labels = BlockLabels::default();
    for position in leaders {
        let instruction = &program.instructions()[position];
        let label = match instruction.function_begin() {
            Some(name) => name.to_string(),
            None => generator.new_label(),
        };
        labels.by_id.insert(instruction.id, label.clone());
        labels.by_position.insert(position, label);
    }

    debug!("{} basic block(s) in {} instructions", labels.len(), program.len());
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_common::ScalarType;
    use mcc_ir::{Condition, InstrKind, Instruction, Operand, Operator, Quad, Relation};
    use pretty_assertions::assert_eq;

    fn plain(op: Operator, arg1: Operand) -> InstrKind {
        InstrKind::Plain(Quad::new(op, ScalarType::Void, Operand::Empty, arg1, Operand::Empty))
    }

    fn jump(target: InstrId) -> InstrKind {
        InstrKind::Jump {
            target: JumpTarget::Resolved(target),
        }
    }

    fn branch(target: InstrId) -> InstrKind {
        InstrKind::CondJump {
            cond: Condition {
                relation: Relation::Ge,
                ty: ScalarType::I32,
                lhs: Operand::ident("i"),
                rhs: Operand::constant(10),
            },
            target: JumpTarget::Resolved(target),
        }
    }

    fn program(kinds: Vec<InstrKind>) -> TacProgram {
        TacProgram::new(
            kinds
                .into_iter()
                .enumerate()
                .map(|(id, kind)| Instruction { id: id as InstrId, kind })
                .collect(),
        )
    }

    /// begin main; if i >= 10 goto 4; nop; goto 1; end main
    fn while_loop() -> TacProgram {
        program(vec![
            plain(Operator::FuncBegin, Operand::label("main")),
            branch(4),
            plain(Operator::Nop, Operand::Empty),
            jump(1),
            plain(Operator::FuncEnd, Operand::label("main")),
        ])
    }

    #[test]
    fn test_loop_leaders() {
        let labels = label_blocks(&while_loop()).unwrap();
        assert_eq!(labels.positions().collect::<Vec<_>>(), vec![0, 1, 4]);
        assert_eq!(labels.label_at(0), Some("main"));
        assert_eq!(labels.label_at(1), Some("_L0"));
        assert_eq!(labels.label_at(2), None);
        assert_eq!(labels.label_at(4), Some("_L1"));
        assert_eq!(labels.label_of(1).unwrap(), "_L0");
    }

    #[test]
    fn test_instruction_after_jump_is_a_leader() {
        let labels = label_blocks(&program(vec![
            plain(Operator::FuncBegin, Operand::label("main")),
            jump(3),
            plain(Operator::Nop, Operand::Empty),
            plain(Operator::FuncEnd, Operand::label("main")),
        ]))
        .unwrap();
        assert_eq!(labels.positions().collect::<Vec<_>>(), vec![0, 2, 3]);
        assert_eq!(labels.label_of(3).unwrap(), "_L1");
    }

    #[test]
    fn test_every_function_entry_uses_its_name() {
        let labels = label_blocks(&program(vec![
            plain(Operator::FuncBegin, Operand::label("f")),
            plain(Operator::FuncEnd, Operand::label("f")),
            plain(Operator::FuncBegin, Operand::label("main")),
            plain(Operator::FuncEnd, Operand::label("main")),
        ]))
        .unwrap();
        assert_eq!(labels.label_at(0), Some("f"));
        assert_eq!(labels.label_at(2), Some("main"));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_positions_differ_from_ids() {
        // the translator orders instructions independently of their ids
        let program = TacProgram::new(vec![
            Instruction { id: 7, kind: plain(Operator::FuncBegin, Operand::label("main")) },
            Instruction { id: 2, kind: jump(5) },
            Instruction { id: 9, kind: plain(Operator::Nop, Operand::Empty) },
            Instruction { id: 5, kind: plain(Operator::FuncEnd, Operand::label("main")) },
        ]);
        let labels = label_blocks(&program).unwrap();
        assert_eq!(labels.label_at(3), Some("_L1"));
        assert_eq!(labels.label_of(5).unwrap(), "_L1");
        assert!(labels.label_of(9).is_ok());
        assert!(labels.label_of(2).is_err());
    }

    #[test]
    fn test_pending_jump_is_rejected() {
        let err = label_blocks(&program(vec![
            plain(Operator::FuncBegin, Operand::label("main")),
            InstrKind::Jump {
                target: JumpTarget::Pending,
            },
            plain(Operator::FuncEnd, Operand::label("main")),
        ]))
        .unwrap_err();
        assert_eq!(err, BackendError::UnresolvedJump(1));
    }

    #[test]
    fn test_unknown_target_is_malformed() {
        let err = label_blocks(&program(vec![
            plain(Operator::FuncBegin, Operand::label("main")),
            jump(42),
        ]))
        .unwrap_err();
        assert!(matches!(err, BackendError::MalformedTac { position: 1, .. }));
    }
}

//! IR construction errors

use crate::instructions::InstrId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("instruction {0} does not exist")]
    UnknownInstruction(InstrId),

    #[error("instruction {0} is not a jump and cannot be backpatched")]
    NotAJump(InstrId),

    #[error("jump {id} already targets {current}, cannot retarget it to {requested}")]
    Retarget {
        id: InstrId,
        current: InstrId,
        requested: InstrId,
    },

    #[error("instruction {0} appears more than once in the program")]
    DuplicateInstruction(InstrId),
}

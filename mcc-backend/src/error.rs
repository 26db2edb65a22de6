//! Generation-time errors
//!
//! Any of these aborts the whole unit; no partial assembly is returned.

use mcc_codegen::{AbiError, EmitError};
use mcc_common::CompilerError;
use mcc_ir::{InstrId, IrError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("no symbol '{name}' is visible in function '{function}'")]
    MissingSymbol { function: String, name: String },

    #[error("no function record for '{0}'")]
    MissingFunction(String),

    #[error("malformed TAC at instruction {position}: {message}")]
    MalformedTac { position: InstrId, message: String },

    #[error("jump {0} was never backpatched")]
    UnresolvedJump(InstrId),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("no {0} register is available")]
    OutOfRegisters(&'static str),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl BackendError {
    pub fn malformed(position: InstrId, message: impl Into<String>) -> Self {
        BackendError::MalformedTac {
            position,
            message: message.into(),
        }
    }
}

impl From<BackendError> for CompilerError {
    fn from(err: BackendError) -> Self {
        CompilerError::codegen_error(err.to_string())
    }
}

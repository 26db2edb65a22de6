//! Statement translation diagnostics

use mcc_common::ScalarType;
use mcc_ir::IrError;
use thiserror::Error;

/// Semantic violations found while translating statements.
///
/// These are reported through the `ErrorReporter` rather than returned, so
/// translation can carry on and surface every problem in one run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatementError {
    #[error("condition has non-integer type '{0}'")]
    NonIntegerCondition(ScalarType),

    #[error("switch quantity has non-integer type '{0}'")]
    NonIntegerSwitch(ScalarType),

    #[error("case label does not reduce to an integer constant")]
    NonConstantCase,

    #[error("duplicate case value '{0}'")]
    DuplicateCase(i64),

    #[error("multiple default labels in one switch")]
    MultipleDefaults,

    #[error("'case' label not within a switch statement")]
    CaseOutsideSwitch,

    #[error("'default' label not within a switch statement")]
    DefaultOutsideSwitch,

    #[error("break statement not within loop or switch")]
    BreakOutsideLoop,

    #[error("continue statement not within a loop")]
    ContinueOutsideLoop,

    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),

    #[error("label '{0}' used but not defined")]
    UndefinedLabel(String),

    #[error("'return' with a value in function '{0}' returning void")]
    ReturnValueInVoid(String),

    #[error("'return' with no value in function '{function}' returning '{ty}'")]
    MissingReturnValue { function: String, ty: ScalarType },

    #[error("incompatible types when returning '{found}' from function returning '{expected}'")]
    IncompatibleReturn {
        found: ScalarType,
        expected: ScalarType,
    },

    #[error("internal error: {0}")]
    Internal(#[from] IrError),
}

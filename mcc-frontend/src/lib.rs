//! MIPS C Compiler - Frontend
//! 
//! Statement-level translation of an already-parsed, already-typed program
//! into three-address code. Expressions arrive pre-translated as `ExprCode`
//! fragments; statements are linearized with backpatched jumps.

pub mod ast;
pub mod errors;
pub mod expr;
pub mod translate;

pub use ast::{FunctionDef, Stmt, StmtKind, TranslationUnit};
pub use errors::StatementError;
pub use expr::{ExprBuilder, ExprCode};
pub use translate::{translate_unit, StatementTranslator, StmtCode, Translation};
